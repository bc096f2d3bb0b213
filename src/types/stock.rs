//! Stock record types
//!
//! `RawQuote` is the provider-facing shape: field names vary between
//! providers (camelCase, snake_case, localized name columns), so alias
//! resolution happens once here, at the deserialization boundary.
//! `Stock` and `Sector` are the normalized shapes the heatmap core consumes.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

/// A single quote record as delivered by a provider snapshot.
///
/// Numeric fields are decoded leniently: numbers, numeric strings and null
/// are all accepted, anything else becomes missing. A malformed field never
/// fails the whole snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(alias = "ticker", alias = "code")]
    pub symbol: String,

    #[serde(default, alias = "name_zh", alias = "companyName")]
    pub name: Option<String>,

    #[serde(default, alias = "sector_zh")]
    pub sector: Option<String>,

    #[serde(
        default,
        alias = "marketCap",
        alias = "cap",
        deserialize_with = "lenient_f64"
    )]
    pub market_cap: Option<f64>,

    #[serde(
        default,
        alias = "changePercent",
        alias = "pct_change",
        deserialize_with = "lenient_f64"
    )]
    pub change_percent: Option<f64>,

    #[serde(default, alias = "vol", deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
}

/// Accept a number, a numeric string, or null; everything else is None.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Num(f64),
        Str(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Num(n)) => Some(n),
        Some(Lenient::Str(s)) => s.trim().parse().ok(),
        Some(Lenient::Other(_)) | None => None,
    })
}

/// A normalized stock item: the heatmap core's unit of layout.
///
/// `weight` is market capitalization, already coerced non-negative and
/// finite; zero-weight stocks survive normalization but occupy no area.
#[derive(Debug, Clone, PartialEq)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub weight: f64,
    pub change_percent: f64,
    pub volume: f64,
}

/// A derived sector aggregation, rebuilt fresh on every ingest pass.
///
/// Holds indices into the flat stock list rather than owned copies;
/// `total_weight` is the sum of member weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub name: String,
    pub members: Vec<usize>,
    pub total_weight: f64,
}

/// A fully ingested market snapshot ready for rendering.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub stocks: Vec<Stock>,
    pub sectors: Vec<Sector>,
    /// Human-readable origin ("demo", file path, endpoint host)
    pub source: String,
    pub as_of: DateTime<Local>,
}

impl MarketData {
    /// Count of stocks that will actually occupy area in a layout.
    pub fn placeable(&self) -> usize {
        self.stocks.iter().filter(|s| s.weight > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawQuote {
        serde_json::from_str(json).unwrap()
    }

    // ========== Alias resolution ==========

    #[test]
    fn test_symbol_aliases() {
        assert_eq!(parse(r#"{"symbol":"AAPL"}"#).symbol, "AAPL");
        assert_eq!(parse(r#"{"ticker":"MSFT"}"#).symbol, "MSFT");
        assert_eq!(parse(r#"{"code":"2330"}"#).symbol, "2330");
    }

    #[test]
    fn test_name_aliases() {
        assert_eq!(
            parse(r#"{"symbol":"A","companyName":"Alpha"}"#).name.as_deref(),
            Some("Alpha")
        );
        assert_eq!(
            parse(r#"{"symbol":"A","name_zh":"台積電"}"#).name.as_deref(),
            Some("台積電")
        );
    }

    #[test]
    fn test_numeric_aliases() {
        let q = parse(r#"{"symbol":"A","marketCap":100.0,"pct_change":1.5,"vol":42}"#);
        assert_eq!(q.market_cap, Some(100.0));
        assert_eq!(q.change_percent, Some(1.5));
        assert_eq!(q.volume, Some(42.0));
    }

    #[test]
    fn test_snake_case_fields() {
        let q = parse(r#"{"ticker":"B","market_cap":7,"change_percent":-0.5}"#);
        assert_eq!(q.market_cap, Some(7.0));
        assert_eq!(q.change_percent, Some(-0.5));
    }

    // ========== Lenient numeric decoding ==========

    #[test]
    fn test_numeric_string_accepted() {
        let q = parse(r#"{"symbol":"A","market_cap":"123.5"}"#);
        assert_eq!(q.market_cap, Some(123.5));
    }

    #[test]
    fn test_garbage_numeric_becomes_none() {
        let q = parse(r#"{"symbol":"A","market_cap":"n/a","change_percent":{}}"#);
        assert_eq!(q.market_cap, None);
        assert_eq!(q.change_percent, None);
    }

    #[test]
    fn test_null_numeric_becomes_none() {
        let q = parse(r#"{"symbol":"A","market_cap":null}"#);
        assert_eq!(q.market_cap, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let q = parse(r#"{"symbol":"A"}"#);
        assert_eq!(q.name, None);
        assert_eq!(q.sector, None);
        assert_eq!(q.market_cap, None);
        assert_eq!(q.change_percent, None);
        assert_eq!(q.volume, None);
    }

    // ========== MarketData ==========

    #[test]
    fn test_placeable_excludes_zero_weight() {
        let data = MarketData {
            stocks: vec![
                Stock {
                    symbol: "A".into(),
                    name: "A".into(),
                    sector: None,
                    weight: 0.0,
                    change_percent: 1.0,
                    volume: 0.0,
                },
                Stock {
                    symbol: "B".into(),
                    name: "B".into(),
                    sector: None,
                    weight: 50.0,
                    change_percent: 1.0,
                    volume: 0.0,
                },
            ],
            sectors: Vec::new(),
            source: "test".into(),
            as_of: Local::now(),
        };
        assert_eq!(data.placeable(), 1);
    }
}
