//! Snapshot fetch client
//!
//! Thin blocking client against a configured snapshot endpoint. Scheduling
//! and backoff are deliberately out of scope; a fetch happens when the user
//! asks for one, and the result is cached to disk for the Auto source.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use fs2::FileExt;

use crate::services::data_loader;
use crate::types::{MarketmapError, RawQuote, Result};

/// Endpoint returning a snapshot JSON payload.
pub const API_URL_ENV: &str = "MARKETMAP_API_URL";
/// Optional bearer token for the endpoint.
pub const API_TOKEN_ENV: &str = "MARKETMAP_API_TOKEN";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Blocking snapshot client.
pub struct QuoteClient {
    base_url: String,
    token: Option<String>,
}

impl QuoteClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    /// Build a client from `MARKETMAP_API_URL` / `MARKETMAP_API_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(API_URL_ENV)
            .map_err(|_| MarketmapError::Config(format!("{} is not set", API_URL_ENV)))?;
        let token = std::env::var(API_TOKEN_ENV).ok();
        Ok(Self::new(base_url, token))
    }

    /// Endpoint host for display in the status line.
    pub fn host_label(&self) -> String {
        let trimmed = self
            .base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        trimmed
            .split('/')
            .next()
            .unwrap_or(trimmed)
            .to_string()
    }

    /// Fetch and parse one snapshot.
    pub fn fetch_snapshot(&self) -> Result<Vec<RawQuote>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MarketmapError::Fetch(e.to_string()))?;

        let mut request = client.get(&self.base_url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| MarketmapError::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(MarketmapError::Fetch(format!("HTTP {}", response.status())));
        }

        let mut bytes = response
            .bytes()
            .map_err(|e| MarketmapError::Fetch(e.to_string()))?
            .to_vec();
        data_loader::parse_snapshot(&mut bytes)
    }

    /// Fetch a snapshot and store it in the cache dir; a failed cache write
    /// does not fail the fetch.
    pub fn fetch_and_cache(&self) -> Result<Vec<RawQuote>> {
        let quotes = self.fetch_snapshot()?;
        if let Ok(dir) = data_loader::cache_dir() {
            let _ = save_snapshot(&dir, &quotes);
        }
        Ok(quotes)
    }
}

/// Write a snapshot under an exclusive file lock so two processes
/// refreshing at once cannot interleave writes.
pub fn save_snapshot(dir: &Path, quotes: &[RawQuote]) -> Result<PathBuf> {
    let path = dir.join(format!(
        "snapshot_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    file.lock_exclusive()?;
    let result =
        serde_json::to_writer(&file, quotes).map_err(|e| MarketmapError::Parse(e.to_string()));
    file.unlock()?;
    result?;
    Ok(path)
}
