//! Diverging change-percent color scale
//!
//! Classification only; the mapping from bucket to an actual terminal
//! color lives in the theme so the scale stays backend-independent.
//! Total and deterministic: every f64, including NaN and infinities,
//! lands in a bucket.

/// Saturation step within one direction of the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    /// |change| below 0.25%
    Faint,
    /// 0.25% to 1%
    Weak,
    /// 1% to 2%
    Medium,
    /// 2% to 3%
    Strong,
    /// 3% and beyond (saturates, never overflows)
    Max,
}

impl Intensity {
    fn from_magnitude(m: f64) -> Self {
        if m < 0.25 {
            Self::Faint
        } else if m < 1.0 {
            Self::Weak
        } else if m < 2.0 {
            Self::Medium
        } else if m < 3.0 {
            Self::Strong
        } else {
            Self::Max
        }
    }

    /// Ordinal rank, 0 = faintest.
    pub fn rank(self) -> u8 {
        match self {
            Self::Faint => 0,
            Self::Weak => 1,
            Self::Medium => 2,
            Self::Strong => 3,
            Self::Max => 4,
        }
    }
}

/// Change magnitudes below this (in percent) render as flat/neutral.
pub const FLAT_EPSILON: f64 = 0.01;

/// Discrete bucket on the diverging scale. Symmetric: the same magnitude
/// thresholds apply to gains and losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeBucket {
    Flat,
    Up(Intensity),
    Down(Intensity),
}

impl ChangeBucket {
    /// Classify a signed percent change. NaN and non-finite inputs map to
    /// `Flat` rather than propagating into a rendered style.
    pub fn classify(change_percent: f64) -> Self {
        if !change_percent.is_finite() {
            return Self::Flat;
        }
        let magnitude = change_percent.abs();
        if magnitude < FLAT_EPSILON {
            return Self::Flat;
        }
        let intensity = Intensity::from_magnitude(magnitude);
        if change_percent > 0.0 {
            Self::Up(intensity)
        } else {
            Self::Down(intensity)
        }
    }

    /// Saturation rank: 0 for flat, 1..=5 with increasing magnitude.
    /// Monotonically non-decreasing in |change| on either side.
    pub fn saturation(self) -> u8 {
        match self {
            Self::Flat => 0,
            Self::Up(i) | Self::Down(i) => i.rank() + 1,
        }
    }

    pub fn is_gain(self) -> bool {
        matches!(self, Self::Up(_))
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Self::Down(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Totality ==========

    #[test]
    fn test_nan_maps_to_flat() {
        assert_eq!(ChangeBucket::classify(f64::NAN), ChangeBucket::Flat);
    }

    #[test]
    fn test_infinities_map_to_flat() {
        assert_eq!(ChangeBucket::classify(f64::INFINITY), ChangeBucket::Flat);
        assert_eq!(
            ChangeBucket::classify(f64::NEG_INFINITY),
            ChangeBucket::Flat
        );
    }

    #[test]
    fn test_zero_is_flat() {
        assert_eq!(ChangeBucket::classify(0.0), ChangeBucket::Flat);
        assert_eq!(ChangeBucket::classify(-0.0), ChangeBucket::Flat);
        assert_eq!(ChangeBucket::classify(0.009), ChangeBucket::Flat);
        assert_eq!(ChangeBucket::classify(-0.009), ChangeBucket::Flat);
    }

    // ========== Bucket thresholds ==========

    #[test]
    fn test_gain_buckets() {
        assert_eq!(
            ChangeBucket::classify(0.1),
            ChangeBucket::Up(Intensity::Faint)
        );
        assert_eq!(
            ChangeBucket::classify(0.5),
            ChangeBucket::Up(Intensity::Weak)
        );
        assert_eq!(
            ChangeBucket::classify(1.5),
            ChangeBucket::Up(Intensity::Medium)
        );
        assert_eq!(
            ChangeBucket::classify(2.5),
            ChangeBucket::Up(Intensity::Strong)
        );
        assert_eq!(ChangeBucket::classify(5.0), ChangeBucket::Up(Intensity::Max));
    }

    #[test]
    fn test_loss_buckets_symmetric() {
        for magnitude in [0.1, 0.5, 1.5, 2.5, 9.0] {
            let up = ChangeBucket::classify(magnitude);
            let down = ChangeBucket::classify(-magnitude);
            assert_eq!(up.saturation(), down.saturation());
            assert!(up.is_gain());
            assert!(down.is_loss());
        }
    }

    #[test]
    fn test_extreme_values_saturate() {
        assert_eq!(
            ChangeBucket::classify(1e12),
            ChangeBucket::Up(Intensity::Max)
        );
        assert_eq!(
            ChangeBucket::classify(-1e12),
            ChangeBucket::Down(Intensity::Max)
        );
    }

    // ========== Determinism / idempotence ==========

    #[test]
    fn test_idempotent() {
        for x in [f64::NAN, -3.7, -0.5, 0.0, 0.3, 2.1, 88.0] {
            assert_eq!(ChangeBucket::classify(x), ChangeBucket::classify(x));
        }
    }

    // ========== Monotonic ordering ==========

    #[test]
    fn test_monotonic_saturation_positive() {
        let xs = [0.02, 0.1, 0.3, 0.9, 1.1, 1.9, 2.4, 3.0, 10.0];
        for pair in xs.windows(2) {
            let a = ChangeBucket::classify(pair[0]).saturation();
            let b = ChangeBucket::classify(pair[1]).saturation();
            assert!(a <= b, "{} -> {} vs {} -> {}", pair[0], a, pair[1], b);
        }
    }

    #[test]
    fn test_monotonic_saturation_negative() {
        let xs = [-10.0, -3.0, -2.4, -1.9, -1.1, -0.9, -0.3, -0.1, -0.02];
        for pair in xs.windows(2) {
            let a = ChangeBucket::classify(pair[0]).saturation();
            let b = ChangeBucket::classify(pair[1]).saturation();
            assert!(a >= b, "{} -> {} vs {} -> {}", pair[0], a, pair[1], b);
        }
    }

    #[test]
    fn test_scenario_colors() {
        // +5.0 lands in the most saturated gain bucket, -0.5 in a light loss.
        assert_eq!(ChangeBucket::classify(5.0), ChangeBucket::Up(Intensity::Max));
        assert_eq!(
            ChangeBucket::classify(-0.5),
            ChangeBucket::Down(Intensity::Weak)
        );
    }
}
