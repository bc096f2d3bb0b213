//! Heatmap core: treemap layout engine, diverging color scale, and a
//! headless batched renderer behind the [`surface::Surface`] trait.

pub mod color;
pub mod layout;
pub mod render;
pub mod surface;
