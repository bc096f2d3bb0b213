//! Hover tooltip and stock detail popup

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::heatmap::color::ChangeBucket;
use crate::heatmap::render::format_change;
use crate::tui::theme::Theme;
use crate::types::Stock;

const TOOLTIP_WIDTH: u16 = 30;
const TOOLTIP_HEIGHT: u16 = 4;

const POPUP_WIDTH: u16 = 44;
const POPUP_HEIGHT: u16 = 10;

/// Compact human form of a market cap in dollars.
pub fn format_market_cap(cap: f64) -> String {
    if !cap.is_finite() || cap <= 0.0 {
        "--".to_string()
    } else if cap >= 1e12 {
        format!("${:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("${:.1}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("${:.1}M", cap / 1e6)
    } else {
        format!("${:.0}", cap)
    }
}

fn change_color(theme: Theme, change: f64) -> ratatui::style::Color {
    let bucket = ChangeBucket::classify(change);
    if bucket.is_loss() {
        theme.error()
    } else if bucket.is_gain() {
        theme.accent()
    } else {
        theme.muted()
    }
}

/// Small follow-the-mouse overlay for the hovered cell.
pub struct HoverTooltip<'a> {
    stock: &'a Stock,
    theme: Theme,
}

impl<'a> HoverTooltip<'a> {
    pub fn new(stock: &'a Stock, theme: Theme) -> Self {
        Self { stock, theme }
    }

    /// Place the tooltip next to the pointer, flipped and clamped so it
    /// never leaves `area`.
    pub fn anchored_area(mouse_x: u16, mouse_y: u16, area: Rect) -> Rect {
        let w = TOOLTIP_WIDTH.min(area.width);
        let h = TOOLTIP_HEIGHT.min(area.height);

        let mut x = mouse_x.saturating_add(2);
        if x + w > area.right() {
            x = mouse_x.saturating_sub(w + 1).max(area.x);
        }
        let mut y = mouse_y.saturating_add(1);
        if y + h > area.bottom() {
            y = mouse_y.saturating_sub(h).max(area.y);
        }
        Rect {
            x: x.min(area.right().saturating_sub(w)).max(area.x),
            y: y.min(area.bottom().saturating_sub(h)).max(area.y),
            width: w,
            height: h,
        }
    }
}

impl Widget for HoverTooltip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted()));
        let inner = block.inner(area);
        block.render(area, buf);

        let title = Line::from(vec![
            Span::styled(
                self.stock.symbol.clone(),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ", Style::default()),
            Span::styled(
                format_change(self.stock.change_percent),
                Style::default().fg(change_color(self.theme, self.stock.change_percent)),
            ),
        ]);
        let detail = Line::from(vec![Span::styled(
            format!(
                "{}  {}",
                format_market_cap(self.stock.weight),
                self.stock.sector.as_deref().unwrap_or(""),
            ),
            Style::default().fg(self.theme.muted()),
        )]);

        Paragraph::new(vec![title, detail]).render(inner, buf);
    }
}

/// Centered detail popup shown on click.
pub struct StockDetailPopup<'a> {
    stock: &'a Stock,
    theme: Theme,
}

impl<'a> StockDetailPopup<'a> {
    pub fn new(stock: &'a Stock, theme: Theme) -> Self {
        Self { stock, theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }
}

impl Widget for StockDetailPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let title = format!(" {} ", self.stock.symbol);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let field = |label: &str, value: String, color| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<12}", label),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(value, Style::default().fg(color)),
            ])
        };

        let lines = vec![
            Line::default(),
            field("Name", self.stock.name.clone(), self.theme.text()),
            field(
                "Change",
                format_change(self.stock.change_percent),
                change_color(self.theme, self.stock.change_percent),
            ),
            field(
                "Market cap",
                format_market_cap(self.stock.weight),
                self.theme.text(),
            ),
            field(
                "Sector",
                self.stock.sector.clone().unwrap_or_else(|| "--".into()),
                self.theme.text(),
            ),
            field(
                "Volume",
                if self.stock.volume > 0.0 {
                    format!("{:.0}", self.stock.volume)
                } else {
                    "--".to_string()
                },
                self.theme.text(),
            ),
            Line::default(),
            Line::from(Span::styled(
                "Press Esc to close",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}
