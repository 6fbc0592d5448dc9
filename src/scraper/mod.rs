pub mod tables;
pub mod units;

use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser;
use crate::config::{BrowserConfig, ScrapeConfig};
use crate::error::FetchError;
use crate::models::{HoldingsTable, PageSnapshot};

/// Text filter that picks the holdings table out of the rendered page.
const HOLDINGS_TABLE_FILTER: &str = "Symbol";

const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCRIPTED_CLICK_JS: &str = "arguments[0].click();";

// ── Source trait ──────────────────────────────────────────────────────────────

/// Per-symbol fetch result. Soft failures mean "this ticker has no holdings
/// page" and are expected; fatal failures carry the underlying error so the
/// caller can decide continuation policy explicitly.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(HoldingsTable),
    SoftFailure(String),
    FatalFailure(FetchError),
}

/// Swappable holdings source abstraction.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    async fn fetch_holdings(&self, symbol: &str) -> FetchOutcome;
}

// ── Pagination math ───────────────────────────────────────────────────────────

/// Total result count lives in the fifth whitespace token of the pagination
/// indicator, e.g. "1 - 60 of 123".
pub fn parse_total_results(text: &str) -> Result<f64, FetchError> {
    text.split_whitespace()
        .nth(4)
        .and_then(|tok| tok.parse::<f64>().ok())
        .ok_or_else(|| units::UnitParseError(text.to_string()).into())
}

pub fn page_count(total_results: f64, rows_per_page: u32) -> u32 {
    (total_results / rows_per_page as f64).ceil() as u32
}

// ── Schwab scraper ────────────────────────────────────────────────────────────

pub struct SchwabScraper {
    browser: BrowserConfig,
    scrape: ScrapeConfig,
}

impl SchwabScraper {
    pub fn new(browser: &BrowserConfig, scrape: &ScrapeConfig) -> Self {
        Self {
            browser: browser.clone(),
            scrape: scrape.clone(),
        }
    }

    /// Listing URL for a symbol, validated before navigation so garbage
    /// symbols fail soft instead of confusing the browser.
    fn holdings_url(&self, symbol: &str) -> Result<Url, FetchError> {
        let raw = self.scrape.url_template.replace("{symbol}", symbol);
        Url::parse(&raw).map_err(|e| FetchError::Navigation {
            symbol: symbol.to_string(),
            reason: format!("invalid listing URL {raw:?}: {e}"),
        })
    }

    /// Load the listing page and switch to the large page-size view.
    /// Any failure here classifies as soft: the symbol is most likely not a
    /// real ETF, or the page layout is not the one we know.
    async fn configure_page_size(
        &self,
        driver: &WebDriver,
        symbol: &str,
    ) -> Result<(), FetchError> {
        let soft = |e: WebDriverError| FetchError::Navigation {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        };

        let url = self.holdings_url(symbol)?;
        driver.goto(url.as_str()).await.map_err(soft)?;

        let xpath = format!("//a[@perpage='{}']", self.scrape.rows_per_page);
        let control = driver.find(By::XPath(xpath.as_str())).await.map_err(soft)?;
        control.click().await.map_err(soft)?;
        Ok(())
    }

    /// Wait for the pagination indicator and read its text. The indicator is
    /// re-rendered while the page-size switch settles, so a stale element
    /// reference on the first read is retried exactly once.
    async fn read_pagination_text(&self, driver: &WebDriver) -> Result<String, FetchError> {
        match self.pagination_text_once(driver).await {
            Err(FetchError::WebDriver(WebDriverError::StaleElementReference(_))) => {
                debug!("pagination indicator went stale, retrying once");
                self.pagination_text_once(driver)
                    .await
                    .map_err(|_| FetchError::StalePagination)
            }
            other => other,
        }
    }

    async fn pagination_text_once(&self, driver: &WebDriver) -> Result<String, FetchError> {
        let elem = driver
            .query(By::ClassName("paginationContainer"))
            .wait(
                Duration::from_secs(self.scrape.pagination_wait_secs),
                Duration::from_secs(1),
            )
            .first()
            .await?;
        elem.wait_until().displayed().await?;
        Ok(elem.text().await?)
    }

    /// Parse the currently rendered holdings table.
    fn current_snapshot(html: &str) -> Result<PageSnapshot, FetchError> {
        let table = tables::extract_first_matching(html, HOLDINGS_TABLE_FILTER)
            .ok_or(FetchError::MissingTable)?;
        tables::parse_holdings(&table)
    }

    /// Poll until the rendered table differs from the previous snapshot.
    ///
    /// Page transitions are client-side renders with no completion signal;
    /// content-diffing against the prior snapshot is the only observable one.
    /// Known limitation: a page that renders identically to its predecessor
    /// cannot be told apart from a transition still in flight, and will run
    /// this poll into its timeout.
    async fn wait_for_fresh_snapshot(
        &self,
        driver: &WebDriver,
        previous: &PageSnapshot,
        page: u32,
    ) -> Result<PageSnapshot, FetchError> {
        let interval = Duration::from_millis(self.scrape.poll_interval_ms);
        for _ in 0..self.scrape.poll_max_attempts {
            sleep(interval).await;
            let html = driver.source().await?;
            let snapshot = Self::current_snapshot(&html)?;
            if snapshot != *previous {
                return Ok(snapshot);
            }
        }
        Err(FetchError::StabilityTimeout {
            page,
            attempts: self.scrape.poll_max_attempts,
        })
    }

    /// Collect every page of the holdings listing for one symbol.
    async fn collect_pages(
        &self,
        driver: &WebDriver,
        symbol: &str,
    ) -> Result<Vec<PageSnapshot>, FetchError> {
        self.configure_page_size(driver, symbol).await?;

        let text = self.read_pagination_text(driver).await?;
        let total = parse_total_results(&text)?;
        let pages = page_count(total, self.scrape.rows_per_page);
        info!("{}: {} holdings across {} page(s)", symbol, total, pages);

        // First page: the holdings listing is the second rendered table.
        let html = driver.source().await?;
        let first = tables::extract_tables(&html)
            .into_iter()
            .nth(1)
            .ok_or(FetchError::MissingTable)
            .and_then(|t| tables::parse_holdings(&t))?;

        let mut snapshots = vec![first];

        for page in 2..=pages {
            driver.execute(SCROLL_TO_BOTTOM_JS, vec![]).await?;

            let xpath = format!("//li[@pagenumber='{page}']");
            let control = driver.find(By::XPath(xpath.as_str())).await?;
            // The control sits under a sticky footer; a scripted click avoids
            // the interception error a direct click can raise.
            driver
                .execute(SCRIPTED_CLICK_JS, vec![control.to_json()?])
                .await?;

            let previous = snapshots.last().ok_or(FetchError::MissingTable)?;
            let snapshot = self.wait_for_fresh_snapshot(driver, previous, page).await?;
            debug!("{}: page {} captured ({} rows)", symbol, page, snapshot.len());
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }
}

#[async_trait]
impl HoldingsSource for SchwabScraper {
    async fn fetch_holdings(&self, symbol: &str) -> FetchOutcome {
        let driver = match browser::open_session(&self.browser).await {
            Ok(d) => d,
            Err(e) => return FetchOutcome::FatalFailure(e),
        };

        let result = self.collect_pages(&driver, symbol).await;
        browser::close_session(driver).await;

        match result {
            Ok(snapshots) => {
                FetchOutcome::Success(HoldingsTable::from_snapshots(symbol, snapshots))
            }
            Err(e) if e.is_soft() => {
                warn!("{}: {}", symbol, e);
                FetchOutcome::SoftFailure(e.to_string())
            }
            Err(e) => FetchOutcome::FatalFailure(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn pagination_text_yields_total() {
        assert_eq!(parse_total_results("1 - 60 of 123").unwrap(), 123.0);
    }

    #[test]
    fn pagination_text_without_count_errors() {
        assert!(parse_total_results("loading").is_err());
        assert!(parse_total_results("1 - 60 of many").is_err());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(123.0, 60), 3);
        assert_eq!(page_count(60.0, 60), 1);
        assert_eq!(page_count(61.0, 60), 2);
        assert_eq!(page_count(0.0, 60), 0);
    }

    #[test]
    fn holdings_url_substitutes_symbol() {
        let cfg = AppConfig::default();
        let scraper = SchwabScraper::new(&cfg.browser, &cfg.scrape);
        let url = scraper.holdings_url("SCHB").unwrap();
        assert!(url.as_str().contains("symbol=SCHB"));
    }
}
