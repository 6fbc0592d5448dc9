use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::scraper::units::{self, UnitParseError};

/// Canonical output schema, in column order.
pub const COLUMNS: [&str; 5] = [
    "Symbol",
    "Description",
    "Portfolio Weight",
    "Shares Held",
    "Market Value",
];

// ── Holding row ───────────────────────────────────────────────────────────────

/// One holdings row exactly as scraped, styling intact.
///
/// The numeric columns stay text here; typing them at the row level (rather
/// than a loose cell grid) makes an unexpected sixth column a parse-time
/// error instead of a silently shifted CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Portfolio Weight")]
    pub portfolio_weight: String,
    #[serde(rename = "Shares Held")]
    pub shares_held: String,
    #[serde(rename = "Market Value")]
    pub market_value: String,
}

/// A holdings row with the three numeric columns coerced to floats (raw mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedHolding {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Portfolio Weight")]
    pub portfolio_weight: f64,
    #[serde(rename = "Shares Held")]
    pub shares_held: f64,
    #[serde(rename = "Market Value")]
    pub market_value: f64,
}

impl TryFrom<&Holding> for NormalizedHolding {
    type Error = UnitParseError;

    fn try_from(row: &Holding) -> Result<Self, Self::Error> {
        Ok(Self {
            symbol: row.symbol.clone(),
            description: row.description.clone(),
            portfolio_weight: units::to_float(&row.portfolio_weight)?,
            shares_held: units::to_float(&row.shares_held)?,
            market_value: units::to_float(&row.market_value)?,
        })
    }
}

// ── Page snapshot ─────────────────────────────────────────────────────────────

/// One rendered page's worth of rows. Only ever compared against the
/// previous snapshot to detect that a page transition finished.
pub type PageSnapshot = Vec<Holding>;

// ── Holdings table ────────────────────────────────────────────────────────────

/// The consolidated, deduplicated holdings of one ETF.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsTable {
    pub symbol: String,
    pub rows: Vec<Holding>,
    pub scraped_at: NaiveDateTime,
}

impl HoldingsTable {
    /// Concatenate snapshots in collection order and drop exact-duplicate
    /// rows, keeping the first occurrence. A slow page transition can hand
    /// us the same snapshot twice; this guards against that.
    pub fn from_snapshots(symbol: &str, snapshots: Vec<PageSnapshot>) -> Self {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for snapshot in snapshots {
            for row in snapshot {
                if seen.insert(row.clone()) {
                    rows.push(row);
                }
            }
        }
        Self {
            symbol: symbol.to_string(),
            rows,
            scraped_at: Utc::now().naive_utc(),
        }
    }
}

// ── Run summary ───────────────────────────────────────────────────────────────

/// Outcome of one run across all symbols. Appended to only by the
/// sequential pipeline loop.
#[derive(Debug)]
pub struct RunSummary {
    pub files_written: usize,
    pub completed: Vec<String>,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            files_written: 0,
            completed: Vec::new(),
            started_at: Utc::now().naive_utc(),
            finished_at: None,
        }
    }

    pub fn record_success(&mut self, symbol: &str) {
        self.files_written += 1;
        self.completed.push(symbol.to_string());
    }

    pub fn is_completed(&self, symbol: &str) -> bool {
        self.completed.iter().any(|s| s == symbol)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now().naive_utc());
    }

    pub fn print(&self) {
        println!(
            "\n{} file(s) have been generated for {} ETF(s):",
            self.files_written,
            self.completed.len()
        );
        for symbol in &self.completed {
            println!("{}-holdings.csv", symbol);
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, description: &str) -> Holding {
        Holding {
            symbol: symbol.into(),
            description: description.into(),
            portfolio_weight: "1.00%".into(),
            shares_held: "10".into(),
            market_value: "$100".into(),
        }
    }

    #[test]
    fn overlapping_snapshots_dedupe_to_one_row() {
        let page1 = vec![row("AAPL", "Apple Inc"), row("MSFT", "Microsoft")];
        let page2 = vec![row("MSFT", "Microsoft"), row("NVDA", "Nvidia")];

        let table = HoldingsTable::from_snapshots("TEST", vec![page1, page2]);

        let symbols: Vec<&str> = table.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn source_order_is_preserved() {
        let page = vec![row("ZZZ", "Last alphabetically"), row("AAA", "First")];
        let table = HoldingsTable::from_snapshots("TEST", vec![page]);
        assert_eq!(table.rows[0].symbol, "ZZZ");
    }

    #[test]
    fn normalize_applies_unit_conversion() {
        let n = NormalizedHolding::try_from(&row("AAPL", "Apple Inc")).unwrap();
        assert_eq!(n.portfolio_weight, 0.01);
        assert_eq!(n.shares_held, 10.0);
        assert_eq!(n.market_value, 100.0);
    }

    #[test]
    fn normalize_fails_on_malformed_cell() {
        let mut bad = row("AAPL", "Apple Inc");
        bad.market_value = "N/A".into();
        assert!(NormalizedHolding::try_from(&bad).is_err());
    }
}
