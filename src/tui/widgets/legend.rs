//! Color scale legend widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::heatmap::color::ChangeBucket;
use crate::tui::theme::Theme;

/// Swatch labels, loss side first, mirroring the bucket thresholds.
const STOPS: &[(f64, &str)] = &[
    (-5.0, " -3% "),
    (-2.5, " -2% "),
    (-1.5, " -1% "),
    (-0.5, "     "),
    (0.0, "  0  "),
    (0.5, "     "),
    (1.5, " +1% "),
    (2.5, " +2% "),
    (5.0, " +3% "),
];

/// One-row strip mapping the diverging scale to its terminal colors.
pub struct Legend {
    theme: Theme,
}

impl Legend {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Widget for Legend {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let spans: Vec<Span> = STOPS
            .iter()
            .map(|&(change, label)| {
                let bucket = ChangeBucket::classify(change);
                Span::styled(
                    label,
                    Style::default()
                        .bg(self.theme.bucket_bg(bucket))
                        .fg(self.theme.cell_fg(bucket)),
                )
            })
            .collect();
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
