//! Treemap widget: paints a frame plan into the ratatui buffer

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::heatmap::color::ChangeBucket;
use crate::heatmap::layout::Rectf;
use crate::heatmap::render::PaintQueue;
use crate::heatmap::surface::{Surface, TextKind};
use crate::tui::theme::Theme;
use crate::types::{Sector, Stock};

/// Terminal-buffer backend for the renderer's drawing surface. Geometry
/// arrives in absolute buffer coordinates; everything is clipped to `area`.
pub struct BufferSurface<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    theme: Theme,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect, theme: Theme) -> Self {
        Self { buf, area, theme }
    }

    /// Snap an f64 rectangle to buffer cells, clipped to the widget area.
    /// Rounding both edges keeps adjacent cells gap-free.
    fn to_cells(&self, rect: Rectf) -> Option<(u16, u16, u16, u16)> {
        let x0 = rect.x.round().max(self.area.x as f64) as u16;
        let y0 = rect.y.round().max(self.area.y as f64) as u16;
        let x1 = ((rect.x + rect.w).round()).min(self.area.right() as f64) as u16;
        let y1 = ((rect.y + rect.h).round()).min(self.area.bottom() as f64) as u16;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn fill(&mut self, rect: Rectf, style: Style) {
        if let Some((x0, y0, x1, y1)) = self.to_cells(rect) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.buf[(x, y)].set_symbol(" ").set_style(style);
                }
            }
        }
    }
}

impl Surface for BufferSurface<'_> {
    fn fill_cell(&mut self, rect: Rectf, bucket: ChangeBucket) {
        let style = Style::default()
            .bg(self.theme.bucket_bg(bucket))
            .fg(self.theme.cell_fg(bucket));
        self.fill(rect, style);
    }

    fn fill_header(&mut self, rect: Rectf) {
        let style = Style::default()
            .bg(self.theme.header_bg())
            .fg(self.theme.header_fg());
        self.fill(rect, style);
    }

    fn draw_text(&mut self, x: f64, y: f64, max_w: f64, text: &str, kind: TextKind) {
        let y = y.round();
        if y < self.area.y as f64 || y >= self.area.bottom() as f64 {
            return;
        }
        let y = y as u16;
        let x0 = x.round().max(self.area.x as f64) as u16;
        let x_end = ((x + max_w).round()).min(self.area.right() as f64);
        if x_end <= x0 as f64 {
            return;
        }
        let budget = (x_end as u16).saturating_sub(x0) as usize;

        let modifier = match kind {
            TextKind::Symbol | TextKind::SectorHeader => Modifier::BOLD,
            _ => Modifier::empty(),
        };
        let placeholder_fg = match kind {
            TextKind::Placeholder => Some(self.theme.muted()),
            _ => None,
        };

        // Patch symbol and modifier per cell so the fill's colors survive;
        // only the placeholder sets its own foreground.
        for (i, ch) in text.chars().take(budget).enumerate() {
            let cell = &mut self.buf[(x0 + i as u16, y)];
            let mut s = String::with_capacity(ch.len_utf8());
            s.push(ch);
            cell.set_symbol(&s);
            let mut style = cell.style().add_modifier(modifier);
            if let Some(fg) = placeholder_fg {
                style = style.fg(fg);
            }
            cell.set_style(style);
        }
    }
}

/// The heatmap proper: renders whatever the paint queue has revealed.
pub struct TreemapView<'a> {
    queue: &'a PaintQueue,
    stocks: &'a [Stock],
    sectors: &'a [Sector],
    theme: Theme,
}

impl<'a> TreemapView<'a> {
    pub fn new(
        queue: &'a PaintQueue,
        stocks: &'a [Stock],
        sectors: &'a [Sector],
        theme: Theme,
    ) -> Self {
        Self {
            queue,
            stocks,
            sectors,
            theme,
        }
    }
}

impl Widget for TreemapView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut surface = BufferSurface::new(buf, area, self.theme);
        self.queue.paint(self.stocks, self.sectors, &mut surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::render::{plan_frame, RenderOptions};
    use ratatui::style::Color;

    fn stock(symbol: &str, weight: f64, change: f64) -> Stock {
        Stock {
            symbol: symbol.into(),
            name: format!("{} Inc", symbol),
            sector: Some("Tech".into()),
            weight,
            change_percent: change,
            volume: 0.0,
        }
    }

    fn area_rectf(area: Rect) -> Rectf {
        Rectf::new(
            area.x as f64,
            area.y as f64,
            area.width as f64,
            area.height as f64,
        )
    }

    #[test]
    fn test_fill_cell_sets_background() {
        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area, Theme::Dark);

        surface.fill_cell(
            Rectf::new(0.0, 0.0, 10.0, 5.0),
            ChangeBucket::classify(5.0),
        );

        let expected = Theme::Dark.bucket_bg(ChangeBucket::classify(5.0));
        assert_eq!(buf[(0, 0)].style().bg, Some(expected));
        assert_eq!(buf[(9, 4)].style().bg, Some(expected));
        // Outside the filled rect: still the empty-buffer default.
        assert_eq!(buf[(10, 0)].style().bg, Some(Color::Reset));
    }

    #[test]
    fn test_fill_clips_to_area() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area, Theme::Dark);

        // Larger than the buffer: must not panic, must stay inside.
        let bucket = ChangeBucket::classify(1.0);
        surface.fill_cell(Rectf::new(-5.0, -5.0, 100.0, 100.0), bucket);
        assert_eq!(buf[(9, 4)].style().bg, Some(Theme::Dark.bucket_bg(bucket)));
    }

    #[test]
    fn test_text_preserves_cell_background() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area, Theme::Dark);

        let bucket = ChangeBucket::classify(-2.5);
        surface.fill_cell(Rectf::new(0.0, 0.0, 20.0, 5.0), bucket);
        surface.draw_text(2.0, 2.0, 10.0, "AAPL", TextKind::Symbol);

        assert_eq!(buf[(2, 2)].symbol(), "A");
        assert_eq!(buf[(2, 2)].style().bg, Some(Theme::Dark.bucket_bg(bucket)));
        assert!(buf[(2, 2)].style().add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_text_clipped_at_max_width() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area, Theme::Dark);

        surface.draw_text(0.0, 0.0, 4.0, "LONGNAME", TextKind::Label);
        assert_eq!(buf[(3, 0)].symbol(), "G");
        assert_eq!(buf[(4, 0)].symbol(), " ");
    }

    #[test]
    fn test_treemap_view_renders_revealed_cells() {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        let stocks = vec![stock("A", 100.0, 2.0), stock("B", 50.0, -1.0)];
        let plan = plan_frame(&stocks, None, area_rectf(area), &RenderOptions::default());
        let mut queue = PaintQueue::new(plan, 1);
        queue.advance(50);

        TreemapView::new(&queue, &stocks, &[], Theme::Dark).render(area, &mut buf);

        // Every cell carries one of the two bucket fills once all revealed.
        let fills = [
            Theme::Dark.bucket_bg(ChangeBucket::classify(2.0)),
            Theme::Dark.bucket_bg(ChangeBucket::classify(-1.0)),
        ];
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let bg = buf[(x, y)].style().bg;
                assert!(
                    bg.is_some_and(|c| fills.contains(&c)),
                    "bare cell at {},{}: {:?}",
                    x,
                    y,
                    bg
                );
            }
        }
    }

    #[test]
    fn test_treemap_view_placeholder_when_empty() {
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let plan = plan_frame(&[], None, area_rectf(area), &RenderOptions::default());
        let queue = PaintQueue::new(plan, 1);

        TreemapView::new(&queue, &[], &[], Theme::Dark).render(area, &mut buf);

        let row: String = (area.x..area.right())
            .map(|x| buf[(x, 4)].symbol().to_string())
            .collect();
        assert!(row.contains("No market data"));
    }

    #[test]
    fn test_offset_area_coordinates() {
        // Widget area not at origin: absolute coordinates still land inside.
        let area = Rect::new(5, 3, 20, 8);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 15));
        let stocks = vec![stock("A", 100.0, 1.0)];
        let plan = plan_frame(&stocks, None, area_rectf(area), &RenderOptions::default());
        let mut queue = PaintQueue::new(plan, 1);
        queue.advance(50);

        TreemapView::new(&queue, &stocks, &[], Theme::Dark).render(area, &mut buf);

        let fill = Theme::Dark.bucket_bg(ChangeBucket::classify(1.0));
        assert_eq!(buf[(5, 3)].style().bg, Some(fill));
        assert_eq!(buf[(0, 0)].style().bg, Some(Color::Reset));
    }
}
