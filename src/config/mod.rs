use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration.
///
/// Built once at startup (file layers + env + CLI overrides) and passed by
/// value into each component; nothing reads configuration ambiently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub browser: BrowserConfig,
    pub scrape: ScrapeConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

/// Browser session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    /// WebDriver server endpoint (geckodriver default).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run without a visible window unless `--window` asks otherwise.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Implicit per-element wait, seconds.
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,
}

/// Scrape configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,

    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: u32,

    /// Bounded wait for the pagination indicator, seconds.
    #[serde(default = "default_pagination_wait_secs")]
    pub pagination_wait_secs: u64,

    /// Fixed interval between page-stability polls, milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stability polls before giving up on a page transition.
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,

    /// Strip currency/percent/magnitude styling into plain floats.
    #[serde(default)]
    pub raw_mode: bool,
}

/// Run-level behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Sort the input symbol list alphabetically before processing.
    /// Output rows keep source order regardless.
    #[serde(default)]
    pub sort_symbols: bool,

    /// Suppress the end-of-run summary.
    #[serde(default)]
    pub quiet: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_wait_time_secs() -> u64 {
    15
}
fn default_url_template() -> String {
    "https://www.schwab.wallst.com/schwab/Prospect/research/etfs/schwabETF/index.asp?type=holdings&symbol={symbol}"
        .to_string()
}
fn default_rows_per_page() -> u32 {
    60
}
fn default_pagination_wait_secs() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_poll_max_attempts() -> u32 {
    120
}
fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("HOLDINGS").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig {
                webdriver_url: default_webdriver_url(),
                headless: true,
                wait_time_secs: default_wait_time_secs(),
            },
            scrape: ScrapeConfig {
                url_template: default_url_template(),
                rows_per_page: default_rows_per_page(),
                pagination_wait_secs: default_pagination_wait_secs(),
                poll_interval_ms: default_poll_interval_ms(),
                poll_max_attempts: default_poll_max_attempts(),
            },
            output: OutputConfig {
                dir: default_out_dir(),
                raw_mode: false,
            },
            pipeline: PipelineConfig {
                sort_symbols: false,
                quiet: false,
            },
        }
    }
}
