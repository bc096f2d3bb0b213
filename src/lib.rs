//! marketmap: terminal stock-market heatmap
//!
//! Treemap layout engine, diverging color scale and a headless renderer,
//! wrapped in a ratatui TUI with sector drill-down and hover tooltips.

pub mod cli;
pub mod heatmap;
pub mod services;
pub mod tui;
pub mod types;
