//! Run orchestrator: symbols in, CSV files out.
//!
//! Strictly sequential — one browser session per symbol, opened and torn
//! down before the next symbol begins. Continuation policy lives here, not
//! in the error types: every per-symbol failure (soft or fatal) is logged
//! and the queue moves on, so one bad ticker never aborts the batch.

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::models::RunSummary;
use crate::scraper::{FetchOutcome, HoldingsSource, SchwabScraper};
use crate::utils::Timer;
use crate::writer::HoldingsWriter;

pub struct Pipeline<S = SchwabScraper> {
    source: S,
    writer: HoldingsWriter,
    symbols: Vec<String>,
    sort_symbols: bool,
}

impl Pipeline<SchwabScraper> {
    pub fn new(config: &AppConfig, symbols: Vec<String>) -> Self {
        Self::with_source(
            SchwabScraper::new(&config.browser, &config.scrape),
            HoldingsWriter::new(&config.output),
            symbols,
            config.pipeline.sort_symbols,
        )
    }
}

impl<S: HoldingsSource> Pipeline<S> {
    /// Construct with any holdings source. Tests drive this with scripted
    /// sources; production uses `Pipeline::new`.
    pub fn with_source(
        source: S,
        writer: HoldingsWriter,
        symbols: Vec<String>,
        sort_symbols: bool,
    ) -> Self {
        Self {
            source,
            writer,
            symbols,
            sort_symbols,
        }
    }

    pub async fn run(mut self) -> Result<RunSummary> {
        if self.sort_symbols {
            self.symbols.sort();
        }

        let mut summary = RunSummary::new();

        for symbol in &self.symbols {
            if summary.is_completed(symbol) {
                debug!("{}: already fetched this run, skipping duplicate", symbol);
                continue;
            }

            let _t = Timer::start(format!("{} fetch", symbol));
            match self.source.fetch_holdings(symbol).await {
                FetchOutcome::Success(table) => match self.writer.write(&table) {
                    Ok(path) => {
                        info!("{}: {} holdings → {}", symbol, table.rows.len(), path.display());
                        summary.record_success(symbol);
                    }
                    Err(e) => error!("{}: write failed: {}", symbol, e),
                },
                FetchOutcome::SoftFailure(reason) => {
                    warn!("{}: skipped ({})", symbol, reason);
                }
                FetchOutcome::FatalFailure(e) => {
                    error!("{}: fetch failed: {}", symbol, e);
                }
            }
        }

        summary.finish();
        debug!(
            "run window: {} → {:?}",
            summary.started_at, summary.finished_at
        );
        Ok(summary)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
