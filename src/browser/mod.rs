//! WebDriver session lifetime.
//!
//! One session per symbol, torn down on every exit path. `WebDriver::quit`
//! consumes the handle and must be awaited, so teardown is an explicit call
//! after the scrape body rather than a `Drop` impl; `fetch_holdings` is the
//! single place a session is opened and it always reaches `close_session`.

use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

use crate::config::BrowserConfig;
use crate::error::FetchError;

/// Open a fresh browser session against the configured WebDriver server.
pub async fn open_session(config: &BrowserConfig) -> Result<WebDriver, FetchError> {
    let mut caps = DesiredCapabilities::firefox();
    if config.headless {
        caps.set_headless()?;
    }

    let driver = WebDriver::new(&config.webdriver_url, caps).await?;
    driver
        .set_implicit_wait_timeout(Duration::from_secs(config.wait_time_secs))
        .await?;

    debug!("browser session opened ({})", config.webdriver_url);
    Ok(driver)
}

/// Close a session. A failed quit would leave an orphaned browser process,
/// so it is logged loudly, but it never masks the scrape result.
pub async fn close_session(driver: WebDriver) {
    if let Err(e) = driver.quit().await {
        warn!("browser session teardown failed: {e}");
    } else {
        debug!("browser session closed");
    }
}
