//! morpho - morphing loading-button widget for terminal UIs
//!
//! A pill-shaped text button that collapses into a circular spinner while
//! work is in flight, reports success/failure, and expands back. The
//! widget core is rendering-agnostic; this binary hosts it in a ratatui
//! demo.

mod anim;
mod config;
mod surface;
mod theme;
mod tui;
mod widgets;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "morpho")]
#[command(about = "Morphing loading-button widget demo", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Button label override
    #[arg(short, long)]
    text: Option<String>,

    /// Progress indicator variant override (e.g. "ArcSpinner", ".PulseDot")
    #[arg(short, long)]
    indicator: Option<String>,

    /// Frame tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
}

fn main() -> Result<()> {
    // Initialize logging to file (use RUST_LOG env var to control level,
    // e.g. RUST_LOG=debug). A TUI owns stdout, so logs go to a file.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("morpho.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = config::Config::load(cli.config)?;
    if let Some(text) = cli.text {
        config.button.text = text;
    }
    if let Some(indicator) = cli.indicator {
        config.button.progress_indicator = Some(indicator);
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.demo.tick_ms = tick_ms;
    }

    tracing::info!(text = %config.button.text, "starting morpho demo");
    tui::run(config)
}
