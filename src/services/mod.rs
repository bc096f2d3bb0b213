//! Data services: ingest, snapshot loading, fetch client

pub mod data_loader;
pub mod ingest;
pub mod quotes;

pub use data_loader::{load_market, DataSource};
