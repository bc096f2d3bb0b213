//! Terminal theme detection and color definitions

use ratatui::style::Color;

use crate::heatmap::color::{ChangeBucket, Intensity};

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (title bar, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (keybinding keys, popup borders)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, hints, status line)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Error/negative indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Sector header strip background
    pub fn header_bg(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(236),
            Self::Light => Color::Indexed(252),
        }
    }

    /// Sector header strip text
    pub fn header_fg(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(250),
            Self::Light => Color::Indexed(238),
        }
    }

    /// Cell background for a change bucket. Green ramp for gains, red
    /// ramp for losses, a neutral gray for flat; each ramp saturates at
    /// the Max step.
    pub fn bucket_bg(self, bucket: ChangeBucket) -> Color {
        match self {
            Self::Dark => match bucket {
                ChangeBucket::Flat => Color::Indexed(241),
                ChangeBucket::Up(i) => match i {
                    Intensity::Faint => Color::Indexed(22),
                    Intensity::Weak => Color::Indexed(28),
                    Intensity::Medium => Color::Indexed(34),
                    Intensity::Strong => Color::Indexed(40),
                    Intensity::Max => Color::Indexed(46),
                },
                ChangeBucket::Down(i) => match i {
                    Intensity::Faint => Color::Indexed(52),
                    Intensity::Weak => Color::Indexed(88),
                    Intensity::Medium => Color::Indexed(124),
                    Intensity::Strong => Color::Indexed(160),
                    Intensity::Max => Color::Indexed(196),
                },
            },
            Self::Light => match bucket {
                ChangeBucket::Flat => Color::Indexed(250),
                ChangeBucket::Up(i) => match i {
                    Intensity::Faint => Color::Indexed(194),
                    Intensity::Weak => Color::Indexed(157),
                    Intensity::Medium => Color::Indexed(114),
                    Intensity::Strong => Color::Indexed(77),
                    Intensity::Max => Color::Indexed(40),
                },
                ChangeBucket::Down(i) => match i {
                    Intensity::Faint => Color::Indexed(224),
                    Intensity::Weak => Color::Indexed(217),
                    Intensity::Medium => Color::Indexed(210),
                    Intensity::Strong => Color::Indexed(203),
                    Intensity::Max => Color::Indexed(196),
                },
            },
        }
    }

    /// Cell label color for a change bucket: black on the brighter fills,
    /// white on the darker ones, so labels stay legible across the ramp.
    pub fn cell_fg(self, bucket: ChangeBucket) -> Color {
        match self {
            Self::Dark => match bucket {
                ChangeBucket::Up(Intensity::Strong | Intensity::Max) => Color::Black,
                ChangeBucket::Down(Intensity::Max) => Color::Black,
                _ => Color::White,
            },
            // Light fills are pastel; black holds up across the ramp.
            Self::Light => Color::Black,
        }
    }
}
