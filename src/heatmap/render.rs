//! Headless renderer: paint planning, detail tiers, batched reveal
//!
//! `plan_frame` turns a stock list (optionally sector-grouped) into a
//! `FramePlan`: a handful of sector header strips plus one `CellPlan` per
//! placeable stock. `PaintQueue` then reveals the leaf cells in fixed-size
//! batches, one batch per host tick, so a large snapshot never paints in a
//! single frame. Headers are few and always painted up front.

use crate::types::{Sector, Stock};

use super::color::ChangeBucket;
use super::layout::{layout, layout_grouped, Rectf};
use super::surface::{Surface, TextKind};

/// Cells smaller than this (in surface cells) draw color only, no text.
const MIN_TEXT_AREA: f64 = 4.0;
/// Below this area the change percent line is suppressed.
const MIN_CHANGE_AREA: f64 = 12.0;
/// Below this area (or under 3 rows) the company name line is suppressed.
const MIN_FULL_AREA: f64 = 36.0;

/// Renderer tuning knobs. Defaults match a typical terminal surface;
/// thresholds are policy, not geometry, and are safe to tune per view.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Sector header strip height, in surface rows.
    pub header_height: f64,
    /// Leaf cells revealed per paint batch (per host tick).
    pub batch_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            header_height: 1.0,
            batch_size: 50,
        }
    }
}

/// Label detail tier for a leaf cell, picked once at planning time so
/// painting stays cheap and font/visibility profiles stay discrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Color fill only
    Fill,
    /// Ticker symbol
    Symbol,
    /// Ticker symbol + change percent
    SymbolChange,
    /// Symbol + company name + change percent
    Full,
}

impl Detail {
    fn for_rect(rect: &Rectf) -> Self {
        let area = rect.area();
        if area < MIN_TEXT_AREA || rect.w < 3.0 || rect.h < 1.0 {
            Detail::Fill
        } else if area < MIN_CHANGE_AREA || rect.h < 2.0 {
            Detail::Symbol
        } else if area < MIN_FULL_AREA || rect.h < 3.0 {
            Detail::SymbolChange
        } else {
            Detail::Full
        }
    }
}

/// One leaf cell, fully resolved: geometry, color bucket, detail tier.
#[derive(Debug, Clone)]
pub struct CellPlan {
    /// Index into the stock list handed to `plan_frame`
    pub stock: usize,
    pub rect: Rectf,
    pub bucket: ChangeBucket,
    pub detail: Detail,
}

/// One sector container: full region plus the reserved header strip.
#[derive(Debug, Clone)]
pub struct HeaderPlan {
    /// Index into the sector list handed to `plan_frame`
    pub sector: usize,
    pub region: Rectf,
    pub strip: Rectf,
}

/// What a point on the surface maps back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Stock(usize),
    Sector(usize),
}

/// A computed frame: recomputed from scratch on every layout pass, never
/// patched incrementally.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub rect: Rectf,
    pub headers: Vec<HeaderPlan>,
    pub cells: Vec<CellPlan>,
}

impl FramePlan {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolve a surface coordinate to a cell or sector header. One
    /// delegated lookup over the retained plan; no per-cell listeners.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<HitTarget> {
        for header in &self.headers {
            if header.strip.contains(x, y) {
                return Some(HitTarget::Sector(header.sector));
            }
        }
        self.cells
            .iter()
            .find(|c| c.rect.contains(x, y))
            .map(|c| HitTarget::Stock(c.stock))
    }
}

/// Compute the frame plan for `stocks` inside `rect`. Pass `sectors` to
/// get grouped mode (header strips + per-sector member layout); `None`
/// lays every stock out flat. Degenerate input produces an empty plan,
/// which paints as the "no data" placeholder.
pub fn plan_frame(
    stocks: &[Stock],
    sectors: Option<&[Sector]>,
    rect: Rectf,
    opts: &RenderOptions,
) -> FramePlan {
    let mut headers = Vec::new();
    let mut cells = Vec::new();

    match sectors {
        Some(sectors) => {
            for sl in layout_grouped(sectors, stocks, rect, opts.header_height) {
                headers.push(HeaderPlan {
                    sector: sl.sector,
                    region: sl.rect,
                    strip: sl.header,
                });
                for node in sl.cells {
                    cells.push(make_cell(stocks, node.index, node.rect));
                }
            }
        }
        None => {
            let weights: Vec<f64> = stocks.iter().map(|s| s.weight).collect();
            for node in layout(&weights, rect) {
                cells.push(make_cell(stocks, node.index, node.rect));
            }
        }
    }

    FramePlan {
        rect,
        headers,
        cells,
    }
}

fn make_cell(stocks: &[Stock], index: usize, rect: Rectf) -> CellPlan {
    CellPlan {
        stock: index,
        rect,
        bucket: ChangeBucket::classify(stocks[index].change_percent),
        detail: Detail::for_rect(&rect),
    }
}

/// Format a signed change percent for cell labels and tooltips.
pub fn format_change(change_percent: f64) -> String {
    if change_percent.is_finite() {
        format!("{:+.2}%", change_percent)
    } else {
        "--".to_string()
    }
}

/// A frame plan plus a reveal cursor: leaf cells paint in fixed-size
/// batches across host ticks. The generation tag lets a new layout pass
/// supersede an in-flight one so two renders never interleave.
#[derive(Debug)]
pub struct PaintQueue {
    plan: FramePlan,
    revealed: usize,
    generation: u64,
}

impl PaintQueue {
    pub fn new(plan: FramePlan, generation: u64) -> Self {
        Self {
            plan,
            revealed: 0,
            generation,
        }
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn complete(&self) -> bool {
        self.revealed >= self.plan.cells.len()
    }

    /// Reveal the next batch. Returns true once all cells are revealed.
    pub fn advance(&mut self, batch_size: usize) -> bool {
        self.revealed = (self.revealed + batch_size.max(1)).min(self.plan.cells.len());
        self.complete()
    }

    /// Paint the frame: all sector headers, then every revealed leaf cell.
    /// An empty plan paints the "no data" placeholder instead.
    pub fn paint(&self, stocks: &[Stock], sectors: &[Sector], surface: &mut dyn Surface) {
        if self.plan.is_empty() {
            self.paint_placeholder(surface);
            return;
        }

        for header in &self.plan.headers {
            surface.fill_header(header.strip);
            let name = sectors
                .get(header.sector)
                .map(|s| s.name.as_str())
                .unwrap_or("");
            surface.draw_text(
                header.strip.x + 1.0,
                header.strip.y,
                header.strip.w - 1.0,
                name,
                TextKind::SectorHeader,
            );
        }

        for cell in &self.plan.cells[..self.revealed] {
            surface.fill_cell(cell.rect, cell.bucket);
            if let Some(stock) = stocks.get(cell.stock) {
                paint_labels(cell, stock, surface);
            }
        }
    }

    fn paint_placeholder(&self, surface: &mut dyn Surface) {
        let msg = "No market data";
        let rect = &self.plan.rect;
        let x = rect.x + ((rect.w - msg.len() as f64) / 2.0).max(0.0);
        let y = rect.y + (rect.h / 2.0).floor();
        surface.draw_text(x, y, rect.w, msg, TextKind::Placeholder);
    }
}

fn paint_labels(cell: &CellPlan, stock: &Stock, surface: &mut dyn Surface) {
    let change = format_change(stock.change_percent);
    let mut lines: Vec<(&str, TextKind)> = Vec::with_capacity(3);
    match cell.detail {
        Detail::Fill => return,
        Detail::Symbol => {
            lines.push((stock.symbol.as_str(), TextKind::Symbol));
        }
        Detail::SymbolChange => {
            lines.push((stock.symbol.as_str(), TextKind::Symbol));
            lines.push((change.as_str(), TextKind::Change));
        }
        Detail::Full => {
            lines.push((stock.symbol.as_str(), TextKind::Symbol));
            lines.push((stock.name.as_str(), TextKind::Label));
            lines.push((change.as_str(), TextKind::Change));
        }
    }

    let count = lines.len() as f64;
    let y0 = cell.rect.y + ((cell.rect.h - count) / 2.0).floor().max(0.0);

    for (i, (text, kind)) in lines.iter().enumerate() {
        let width = text.chars().count() as f64;
        let x = cell.rect.x + ((cell.rect.w - width) / 2.0).max(0.0);
        surface.draw_text(x, y0 + i as f64, cell.rect.w, text, *kind);
    }
}
