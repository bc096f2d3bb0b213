use thiserror::Error;

/// marketmap error types
#[derive(Error, Debug)]
pub enum MarketmapError {
    /// Failed to parse a snapshot JSON payload
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot fetch failed
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for marketmap
pub type Result<T> = std::result::Result<T, MarketmapError>;
