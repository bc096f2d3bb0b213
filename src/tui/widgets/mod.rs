//! TUI widgets

pub mod help;
pub mod legend;
pub mod spinner;
pub mod tooltip;
pub mod treemap;
