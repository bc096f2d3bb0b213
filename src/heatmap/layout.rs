//! Treemap layout engine
//!
//! Recursive binary-split treemap: at every level the item run is cut at
//! the index that balances cumulative weight closest to half, and the
//! rectangle is cut along its longer axis in the same proportion. Simpler
//! than row-based squarify, and it keeps cells close to square in practice.
//! Pure functions of their inputs; no state, no side effects.

use crate::types::{Sector, Stock};

/// Axis-aligned rectangle in surface units (f64, exact geometry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectf {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rectf {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Overlap test on interiors; shared edges do not count.
    pub fn intersects(&self, other: &Rectf) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// One placed leaf: `index` refers back to the caller's item list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    pub index: usize,
    pub rect: Rectf,
}

/// Layout for one sector container: full region, reserved header strip,
/// and the member cells placed in the remainder.
#[derive(Debug, Clone)]
pub struct SectorLayout {
    pub sector: usize,
    pub rect: Rectf,
    pub header: Rectf,
    pub cells: Vec<LayoutNode>,
}

/// Compute a flat treemap layout of `weights` inside `rect`.
///
/// Non-finite and non-positive weights are filtered out before placement;
/// if nothing survives (or the rectangle is degenerate) the result is
/// empty, not an error. Leaf areas are proportional to weights and tile
/// `rect` exactly.
pub fn layout(weights: &[f64], rect: Rectf) -> Vec<LayoutNode> {
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return Vec::new();
    }

    let items: Vec<(usize, f64)> = weights
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, w)| w.is_finite() && w > 0.0)
        .collect();

    let mut out = Vec::with_capacity(items.len());
    split(&items, rect, &mut out);
    out
}

/// Recursive binary split over a non-empty run of positive-weight items.
fn split(items: &[(usize, f64)], rect: Rectf, out: &mut Vec<LayoutNode>) {
    match items.len() {
        0 => {}
        1 => out.push(LayoutNode {
            index: items[0].0,
            rect,
        }),
        _ => {
            let total: f64 = items.iter().map(|&(_, w)| w).sum();
            if total <= 0.0 {
                return;
            }

            // Cut after index k where the cumulative weight is closest to
            // half the total. Linear scan; k stays strictly inside the run
            // so both partitions are non-empty.
            let half = total / 2.0;
            let mut cum = 0.0;
            let mut best_k = 0;
            let mut best_cum = items[0].1;
            let mut best_dist = f64::INFINITY;
            for (k, &(_, w)) in items[..items.len() - 1].iter().enumerate() {
                cum += w;
                let dist = (cum - half).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best_k = k;
                    best_cum = cum;
                }
            }

            let proportion = best_cum / total;
            let (first, second) = items.split_at(best_k + 1);

            // Cut along the longer axis to keep aspect ratios near square.
            let (rect_a, rect_b) = if rect.w > rect.h {
                let wa = rect.w * proportion;
                (
                    Rectf::new(rect.x, rect.y, wa, rect.h),
                    Rectf::new(rect.x + wa, rect.y, rect.w - wa, rect.h),
                )
            } else {
                let ha = rect.h * proportion;
                (
                    Rectf::new(rect.x, rect.y, rect.w, ha),
                    Rectf::new(rect.x, rect.y + ha, rect.w, rect.h - ha),
                )
            };

            split(first, rect_a, out);
            split(second, rect_b, out);
        }
    }
}

/// Compute a grouped layout: sectors placed as weighted items at the top
/// level, then each sector's members laid out beneath a reserved header
/// strip of `header_h` rows. A sector too short to fit its header keeps a
/// clamped strip and places no members.
///
/// Member `LayoutNode.index` values refer to the flat stock list, not to
/// positions within the sector.
pub fn layout_grouped(
    sectors: &[Sector],
    stocks: &[Stock],
    rect: Rectf,
    header_h: f64,
) -> Vec<SectorLayout> {
    let weights: Vec<f64> = sectors.iter().map(|s| s.total_weight).collect();

    layout(&weights, rect)
        .into_iter()
        .map(|node| {
            let sector = &sectors[node.index];
            let strip = header_h.min(node.rect.h).max(0.0);
            let header = Rectf::new(node.rect.x, node.rect.y, node.rect.w, strip);
            let body = Rectf::new(
                node.rect.x,
                node.rect.y + strip,
                node.rect.w,
                node.rect.h - strip,
            );

            let cells = if body.h > 0.0 {
                let member_weights: Vec<f64> =
                    sector.members.iter().map(|&i| stocks[i].weight).collect();
                layout(&member_weights, body)
                    .into_iter()
                    .map(|n| LayoutNode {
                        index: sector.members[n.index],
                        rect: n.rect,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            SectorLayout {
                sector: node.index,
                rect: node.rect,
                header,
                cells,
            }
        })
        .collect()
}
