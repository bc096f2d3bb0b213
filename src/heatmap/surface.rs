//! Drawing surface abstraction
//!
//! The renderer paints through this trait so the core stays headless and
//! testable without a terminal; the TUI provides a ratatui-buffer
//! implementation, tests use [`RecordingSurface`].

use super::color::ChangeBucket;
use super::layout::Rectf;

/// Role of a piece of text, so backends can style each differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    SectorHeader,
    Symbol,
    Label,
    Change,
    Placeholder,
}

pub trait Surface {
    /// Fill a leaf cell rectangle with the bucket's fill color.
    fn fill_cell(&mut self, rect: Rectf, bucket: ChangeBucket);

    /// Fill a sector header strip (chrome, not data).
    fn fill_header(&mut self, rect: Rectf);

    /// Draw one line of text at (x, y), clipped to `max_w` columns.
    fn draw_text(&mut self, x: f64, y: f64, max_w: f64, text: &str, kind: TextKind);
}

/// Records every draw call; backs the headless renderer tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub fills: Vec<(Rectf, ChangeBucket)>,
    pub headers: Vec<Rectf>,
    pub texts: Vec<(f64, f64, String, TextKind)>,
}

impl Surface for RecordingSurface {
    fn fill_cell(&mut self, rect: Rectf, bucket: ChangeBucket) {
        self.fills.push((rect, bucket));
    }

    fn fill_header(&mut self, rect: Rectf) {
        self.headers.push(rect);
    }

    fn draw_text(&mut self, x: f64, y: f64, _max_w: f64, text: &str, kind: TextKind) {
        self.texts.push((x, y, text.to_string(), kind));
    }
}
