//! Type definitions for marketmap

mod error;
mod stock;

pub use error::*;
pub use stock::*;
