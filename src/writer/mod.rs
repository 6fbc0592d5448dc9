//! CSV output, one file per symbol.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::FetchError;
use crate::models::{HoldingsTable, NormalizedHolding};

pub struct HoldingsWriter {
    dir: PathBuf,
    raw_mode: bool,
}

impl HoldingsWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            raw_mode: config.raw_mode,
        }
    }

    fn output_path(&self, symbol: &str) -> PathBuf {
        output_file(&self.dir, symbol)
    }

    /// Serialize a holdings table to `{SYMBOL}-holdings.csv`, overwriting any
    /// existing file. Raw mode coerces the three numeric columns to floats;
    /// otherwise the styled text goes out exactly as scraped.
    pub fn write(&self, table: &HoldingsTable) -> Result<PathBuf, FetchError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.output_path(&table.symbol);
        debug!(
            "{}: writing {} rows scraped at {}",
            table.symbol,
            table.rows.len(),
            table.scraped_at
        );

        let mut writer = csv::Writer::from_path(&path)?;
        if self.raw_mode {
            for row in &table.rows {
                writer.serialize(NormalizedHolding::try_from(row)?)?;
            }
        } else {
            for row in &table.rows {
                writer.serialize(row)?;
            }
        }
        writer.flush()?;

        info!("{}: wrote {}", table.symbol, path.display());
        Ok(path)
    }
}

/// Convenience for tests and callers that only have a directory.
pub fn output_file(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}-holdings.csv"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holding, HoldingsTable};

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("holdings-dl-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_table() -> HoldingsTable {
        HoldingsTable::from_snapshots(
            "SCHB",
            vec![vec![Holding {
                symbol: "AAPL".into(),
                description: "Apple Inc".into(),
                portfolio_weight: "25%".into(),
                shares_held: "3.5K".into(),
                market_value: "$1.2M".into(),
            }]],
        )
    }

    #[test]
    fn styled_mode_preserves_text() {
        let dir = test_dir("styled");
        let writer = HoldingsWriter::new(&OutputConfig {
            dir: dir.clone(),
            raw_mode: false,
        });

        let path = writer.write(&sample_table()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("Symbol,Description,Portfolio Weight,Shares Held,Market Value"));
        assert!(content.contains("AAPL,Apple Inc,25%,3.5K,$1.2M"));
    }

    #[test]
    fn raw_mode_emits_floats() {
        let dir = test_dir("raw");
        let writer = HoldingsWriter::new(&OutputConfig {
            dir: dir.clone(),
            raw_mode: true,
        });

        let path = writer.write(&sample_table()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.contains("AAPL,Apple Inc,0.25,3500.0,1200000.0"));
        assert!(!content.contains('%'));
        assert!(!content.contains('$'));
    }

    #[test]
    fn raw_mode_surfaces_parse_errors() {
        let dir = test_dir("badcell");
        let writer = HoldingsWriter::new(&OutputConfig {
            dir,
            raw_mode: true,
        });

        let mut table = sample_table();
        table.rows[0].shares_held = "N/A".into();
        assert!(matches!(writer.write(&table), Err(FetchError::Parse(_))));
    }

    #[test]
    fn existing_file_is_overwritten() {
        let dir = test_dir("overwrite");
        let path = output_file(&dir, "SCHB");
        std::fs::write(&path, "stale contents").unwrap();

        let writer = HoldingsWriter::new(&OutputConfig {
            dir,
            raw_mode: false,
        });
        writer.write(&sample_table()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale contents"));
        assert!(content.contains("AAPL"));
    }
}
