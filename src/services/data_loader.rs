//! Snapshot loading
//!
//! Reads provider snapshots (a JSON array of quotes, or a `{"stocks":
//! [...]}` wrapper) with simd-json, discovers the newest cached snapshot,
//! and carries the built-in demo dataset used when no source is available.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Deserialize;

use crate::services::{ingest, quotes::QuoteClient};
use crate::types::{MarketData, MarketmapError, RawQuote, Result};

/// Where a snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Configured endpoint if set, else newest cached snapshot, else demo
    Auto,
    /// Built-in demo dataset
    Demo,
    /// Explicit snapshot file
    File(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<RawQuote>),
    Wrapped { stocks: Vec<RawQuote> },
}

/// Parse a snapshot payload. simd-json mutates the buffer in place.
pub fn parse_snapshot(bytes: &mut [u8]) -> Result<Vec<RawQuote>> {
    let snapshot: Snapshot =
        simd_json::serde::from_slice(bytes).map_err(|e| MarketmapError::Parse(e.to_string()))?;
    Ok(match snapshot {
        Snapshot::List(quotes) => quotes,
        Snapshot::Wrapped { stocks } => stocks,
    })
}

/// Read and parse a snapshot file.
pub fn load_file(path: &Path) -> Result<Vec<RawQuote>> {
    let mut bytes = fs::read(path)?;
    parse_snapshot(&mut bytes)
}

/// Platform cache directory for stored snapshots, created on demand.
pub fn cache_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "marketmap")
        .ok_or_else(|| MarketmapError::Config("cannot determine cache directory".into()))?;
    let dir = dirs.cache_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Newest snapshot file in `dir` by modification time.
pub fn latest_snapshot(dir: &Path) -> Option<PathBuf> {
    let pattern = dir.join("*.json");
    glob::glob(&pattern.to_string_lossy())
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .max_by_key(|path| fs::metadata(path).and_then(|m| m.modified()).ok())
}

/// Load, normalize and aggregate a full market snapshot.
pub fn load_market(source: &DataSource) -> Result<MarketData> {
    let (quotes, label) = match source {
        DataSource::Demo => (demo_quotes(), "demo".to_string()),
        DataSource::File(path) => (load_file(path)?, path.display().to_string()),
        DataSource::Auto => match QuoteClient::from_env() {
            Ok(client) => match client.fetch_and_cache() {
                Ok(quotes) => (quotes, client.host_label()),
                Err(_) => local_fallback(),
            },
            Err(_) => local_fallback(),
        },
    };

    let stocks = ingest::normalize(quotes);
    let sectors = ingest::build_sectors(&stocks);
    Ok(MarketData {
        stocks,
        sectors,
        source: label,
        as_of: Local::now(),
    })
}

/// Newest cached snapshot if one parses, else the demo dataset.
fn local_fallback() -> (Vec<RawQuote>, String) {
    if let Ok(dir) = cache_dir() {
        if let Some(path) = latest_snapshot(&dir) {
            if let Ok(quotes) = load_file(&path) {
                return (quotes, path.display().to_string());
            }
        }
    }
    (demo_quotes(), "demo".to_string())
}

fn q(symbol: &str, name: &str, sector: &str, cap_billions: f64, change: f64) -> RawQuote {
    RawQuote {
        symbol: symbol.into(),
        name: Some(name.into()),
        sector: Some(sector.into()),
        market_cap: Some(cap_billions * 1e9),
        change_percent: Some(change),
        volume: Some(cap_billions * 1e5),
    }
}

/// Built-in demo dataset: a plausible large-cap cross-section so the TUI
/// has something to show without a configured provider.
pub fn demo_quotes() -> Vec<RawQuote> {
    vec![
        q("AAPL", "Apple", "Technology", 3400.0, 0.84),
        q("MSFT", "Microsoft", "Technology", 3100.0, -0.32),
        q("NVDA", "NVIDIA", "Technology", 2900.0, 2.41),
        q("GOOGL", "Alphabet", "Technology", 2100.0, 1.12),
        q("AVGO", "Broadcom", "Technology", 780.0, -1.65),
        q("ORCL", "Oracle", "Technology", 390.0, 0.18),
        q("CRM", "Salesforce", "Technology", 260.0, -2.30),
        q("AMD", "AMD", "Technology", 230.0, 3.75),
        q("AMZN", "Amazon", "Consumer Cyclical", 1900.0, 0.55),
        q("TSLA", "Tesla", "Consumer Cyclical", 690.0, -3.48),
        q("HD", "Home Depot", "Consumer Cyclical", 350.0, 0.07),
        q("MCD", "McDonald's", "Consumer Cyclical", 210.0, -0.41),
        q("NKE", "Nike", "Consumer Cyclical", 120.0, 1.88),
        q("BRK.B", "Berkshire Hathaway", "Financial", 880.0, 0.26),
        q("JPM", "JPMorgan Chase", "Financial", 580.0, 1.05),
        q("V", "Visa", "Financial", 560.0, 0.71),
        q("MA", "Mastercard", "Financial", 430.0, 0.64),
        q("BAC", "Bank of America", "Financial", 310.0, -0.89),
        q("LLY", "Eli Lilly", "Healthcare", 740.0, -1.12),
        q("UNH", "UnitedHealth", "Healthcare", 480.0, -2.74),
        q("JNJ", "Johnson & Johnson", "Healthcare", 380.0, 0.33),
        q("ABBV", "AbbVie", "Healthcare", 320.0, 1.41),
        q("MRK", "Merck", "Healthcare", 250.0, 0.005),
        q("XOM", "Exxon Mobil", "Energy", 470.0, 2.15),
        q("CVX", "Chevron", "Energy", 270.0, 1.73),
        q("COP", "ConocoPhillips", "Energy", 130.0, 2.96),
        q("META", "Meta Platforms", "Communication", 1500.0, 1.94),
        q("NFLX", "Netflix", "Communication", 420.0, -0.58),
        q("DIS", "Disney", "Communication", 200.0, 0.92),
        q("TMUS", "T-Mobile US", "Communication", 280.0, -0.15),
        q("PG", "Procter & Gamble", "Consumer Defensive", 400.0, 0.12),
        q("COST", "Costco", "Consumer Defensive", 390.0, -0.77),
        q("WMT", "Walmart", "Consumer Defensive", 680.0, 0.49),
        q("KO", "Coca-Cola", "Consumer Defensive", 290.0, 0.21),
        q("CAT", "Caterpillar", "Industrials", 190.0, 1.27),
        q("GE", "GE Aerospace", "Industrials", 200.0, 3.11),
        q("UPS", "UPS", "Industrials", 110.0, -1.93),
    ]
}
