mod browser;
mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod utils;
mod writer;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(
    name = "holdings-dl",
    about = "Download ETF holdings into per-symbol CSV files",
    version
)]
struct Cli {
    /// ETF ticker symbols to download
    #[arg(value_name = "SYMBOL")]
    symbols: Vec<String>,

    /// Read additional symbols from a file (one per line, # comments)
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Strip currency/percent/magnitude styling into plain floats
    #[arg(short, long)]
    raw: bool,

    /// Run the browser with a visible window instead of headless
    #[arg(short, long)]
    window: bool,

    /// Sort the symbol list alphabetically before processing
    #[arg(short, long)]
    sort: bool,

    /// Suppress the end-of-run summary
    #[arg(short, long)]
    quiet: bool,

    /// Implicit per-element wait in seconds
    #[arg(short = 't', long = "time", value_name = "SECS")]
    wait_time: Option<u64>,

    /// Directory for the generated CSV files
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Also write logs to holdings-dl.log
    #[arg(short, long)]
    log: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8, log_file: bool) -> Result<()> {
    let filter = match verbose {
        0 => "holdings_dl=info,warn",
        1 => "holdings_dl=debug,info",
        _ => "trace",
    };

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().compact().with_target(false));

    if log_file {
        let file = std::fs::File::create("holdings-dl.log")
            .context("cannot create holdings-dl.log")?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
            .init();
    } else {
        registry.init();
    }
    Ok(())
}

/// Apply CLI flags on top of the file/env configuration. Flags only ever
/// tighten: an unset flag leaves the loaded value alone.
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if cli.raw {
        config.output.raw_mode = true;
    }
    if cli.window {
        config.browser.headless = false;
    }
    if cli.sort {
        config.pipeline.sort_symbols = true;
    }
    if cli.quiet {
        config.pipeline.quiet = true;
    }
    if let Some(secs) = cli.wait_time {
        config.browser.wait_time_secs = secs;
    }
    if let Some(dir) = &cli.out_dir {
        config.output.dir = dir.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log)?;

    let mut config = AppConfig::load()?;
    apply_cli_overrides(&mut config, &cli);

    let mut symbols: Vec<String> = cli
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if let Some(path) = &cli.file {
        symbols.extend(loader::read_symbols_file(path)?);
    }
    if symbols.is_empty() {
        bail!("no symbols given — pass tickers as arguments or use --file");
    }

    let summary = {
        let _t = utils::Timer::start("holdings download");
        Pipeline::new(&config, symbols).run().await?
    };

    if !config.pipeline.quiet {
        summary.print();
    }

    Ok(())
}
