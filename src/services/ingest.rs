//! Quote normalization and sector aggregation
//!
//! Turns provider `RawQuote` records into the heatmap's `Stock` items:
//! missing or broken numerics coerce to 0 instead of failing the pass, so
//! one malformed record never takes down the rest of the snapshot.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{RawQuote, Sector, Stock};

/// Bucket for stocks whose snapshot carries no sector.
pub const UNSECTORED: &str = "Other";

/// Normalize raw quotes into stocks, largest weight first.
///
/// Records without a symbol are dropped; everything else survives, with
/// non-finite or negative numerics coerced to 0. Zero-weight stocks are
/// kept in the list (the layout engine filters them), so counts still
/// reflect the input.
pub fn normalize(quotes: Vec<RawQuote>) -> Vec<Stock> {
    let mut stocks: Vec<Stock> = quotes
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol.trim().to_string();
            if symbol.is_empty() {
                return None;
            }
            let name = q
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| symbol.clone());
            Some(Stock {
                name,
                sector: q.sector.filter(|s| !s.trim().is_empty()),
                weight: coerce_non_negative(q.market_cap),
                change_percent: coerce_finite(q.change_percent),
                volume: coerce_non_negative(q.volume),
                symbol,
            })
        })
        .collect();

    // Largest first: binary splits balance better and the big caps land in
    // the first paint batches.
    stocks.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    stocks
}

/// Build the ephemeral sector aggregation for one render pass. Sectors are
/// ordered by total weight descending; members keep the stock ordering.
pub fn build_sectors(stocks: &[Stock]) -> Vec<Sector> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut sectors: Vec<Sector> = Vec::new();

    for (i, stock) in stocks.iter().enumerate() {
        let name = stock.sector.as_deref().unwrap_or(UNSECTORED);
        let idx = *by_name.entry(name).or_insert_with(|| {
            sectors.push(Sector {
                name: name.to_string(),
                members: Vec::new(),
                total_weight: 0.0,
            });
            sectors.len() - 1
        });
        sectors[idx].members.push(i);
        sectors[idx].total_weight += stock.weight;
    }

    sectors.sort_by(|a, b| {
        b.total_weight
            .partial_cmp(&a.total_weight)
            .unwrap_or(Ordering::Equal)
    });
    sectors
}

fn coerce_finite(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

fn coerce_non_negative(v: Option<f64>) -> f64 {
    coerce_finite(v).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, sector: Option<&str>, cap: Option<f64>, change: Option<f64>) -> RawQuote {
        RawQuote {
            symbol: symbol.into(),
            name: None,
            sector: sector.map(Into::into),
            market_cap: cap,
            change_percent: change,
            volume: None,
        }
    }

    // ========== Coercion ==========

    #[test]
    fn test_missing_numerics_coerce_to_zero() {
        let stocks = normalize(vec![quote("A", None, None, None)]);
        assert_eq!(stocks[0].weight, 0.0);
        assert_eq!(stocks[0].change_percent, 0.0);
        assert_eq!(stocks[0].volume, 0.0);
    }

    #[test]
    fn test_nan_and_negative_cap_coerce() {
        let stocks = normalize(vec![
            quote("A", None, Some(f64::NAN), Some(f64::NAN)),
            quote("B", None, Some(-5.0), Some(1.0)),
        ]);
        assert!(stocks.iter().all(|s| s.weight == 0.0 || s.weight > 0.0));
        assert_eq!(stocks.iter().find(|s| s.symbol == "A").unwrap().weight, 0.0);
        assert_eq!(stocks.iter().find(|s| s.symbol == "B").unwrap().weight, 0.0);
    }

    #[test]
    fn test_malformed_record_does_not_abort_rest() {
        let stocks = normalize(vec![
            quote("", None, Some(10.0), None),
            quote("OK", None, Some(10.0), Some(1.0)),
        ]);
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].symbol, "OK");
    }

    #[test]
    fn test_name_falls_back_to_symbol() {
        let stocks = normalize(vec![quote("AAPL", None, Some(1.0), None)]);
        assert_eq!(stocks[0].name, "AAPL");
    }

    // ========== Ordering ==========

    #[test]
    fn test_sorted_by_weight_descending() {
        let stocks = normalize(vec![
            quote("S", None, Some(10.0), None),
            quote("L", None, Some(100.0), None),
            quote("M", None, Some(50.0), None),
        ]);
        let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["L", "M", "S"]);
    }

    #[test]
    fn test_zero_weight_kept() {
        let stocks = normalize(vec![
            quote("A", None, Some(0.0), Some(1.0)),
            quote("B", None, Some(50.0), Some(1.0)),
        ]);
        assert_eq!(stocks.len(), 2);
    }

    // ========== Sector aggregation ==========

    #[test]
    fn test_build_sectors_totals_and_order() {
        let stocks = normalize(vec![
            quote("A", Some("Tech"), Some(100.0), None),
            quote("B", Some("Tech"), Some(50.0), None),
            quote("C", Some("Energy"), Some(400.0), None),
        ]);
        let sectors = build_sectors(&stocks);
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].name, "Energy");
        assert_eq!(sectors[0].total_weight, 400.0);
        assert_eq!(sectors[1].name, "Tech");
        assert_eq!(sectors[1].total_weight, 150.0);
        assert_eq!(sectors[1].members.len(), 2);
    }

    #[test]
    fn test_missing_sector_buckets_to_other() {
        let stocks = normalize(vec![
            quote("A", None, Some(10.0), None),
            quote("B", Some("  "), Some(10.0), None),
        ]);
        let sectors = build_sectors(&stocks);
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].name, UNSECTORED);
        assert_eq!(sectors[0].members.len(), 2);
    }

    #[test]
    fn test_sectors_rebuilt_fresh() {
        // Derived aggregation: totals always reflect current membership.
        let mut stocks = normalize(vec![
            quote("A", Some("Tech"), Some(100.0), None),
            quote("B", Some("Tech"), Some(50.0), None),
        ]);
        assert_eq!(build_sectors(&stocks)[0].total_weight, 150.0);
        stocks.pop();
        assert_eq!(build_sectors(&stocks)[0].total_weight, 100.0);
    }
}
