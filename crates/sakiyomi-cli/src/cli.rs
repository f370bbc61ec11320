//! CLI argument definitions for sakiyomi.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run`   | Resolve a session price and submit it through the forecast form |
//! | `price` | Resolve and print the price/amount without opening a browser |
//!
//! # Examples
//!
//! ```bash
//! # Dry run: what would be submitted right now?
//! sakiyomi price
//!
//! # Full run against a local chromedriver
//! SAKIYOMI_IDENTIFIER=user@example.jp SAKIYOMI_SECRET=... \
//!   sakiyomi run --webdriver-url http://localhost:9515
//!
//! # Daily CSV provider, snapped to 10-yen steps
//! sakiyomi price --provider stooq --symbol NY.F --interval 1d --round-unit 10
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Submits one session-price forecast per invocation.
///
/// Exactly one attempt is made per run; there is no in-process retry.
/// Schedule invocations without overlap — concurrent runs against the
/// same account are not defended.
#[derive(Debug, Parser)]
#[command(name = "sakiyomi", version, about = "Session-price forecast submitter")]
pub struct Cli {
    /// Market symbol understood by the selected provider.
    #[arg(long, global = true, default_value = "NK=F")]
    pub symbol: String,

    /// Quote provider backend.
    #[arg(long, global = true, value_enum, default_value_t = ProviderArg::Chart)]
    pub provider: ProviderArg,

    /// Override the provider base URL (tests, mirrors).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Lookback window in days.
    #[arg(long, global = true, default_value_t = 5)]
    pub range_days: u32,

    /// Sampling interval: 5m, 1h or 1d.
    #[arg(long, global = true, default_value = "5m")]
    pub interval: String,

    /// Fixed civil offset in hours for session-window arithmetic.
    #[arg(long, global = true, default_value_t = 9)]
    pub offset_hours: i8,

    /// Snap the resolved price to the nearest unit before formatting
    /// (0 disables).
    #[arg(long, global = true, default_value_t = 0)]
    pub round_unit: u32,

    /// Emit the run summary as JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Quote provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Chart-envelope JSON provider (intraday capable).
    Chart,
    /// Daily-CSV provider.
    Stooq,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a session price and submit it through the forecast form.
    ///
    /// Requires SAKIYOMI_IDENTIFIER and SAKIYOMI_SECRET in the
    /// environment, plus a reachable WebDriver endpoint. Exits non-zero
    /// on any failed stage.
    Run(RunArgs),

    /// Resolve and print the price/amount without opening a browser.
    Price(PriceArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// WebDriver endpoint driving the browser session.
    #[arg(long, default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Login page of the forecast site.
    #[arg(long)]
    pub login_url: Option<String>,

    /// Aggregate element-resolution budget per role, in milliseconds.
    #[arg(long, default_value_t = 8_000)]
    pub probe_timeout_ms: u64,

    /// Enabled-state poll bound for gated controls, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub enable_timeout_ms: u64,

    /// Document-ready bound after navigations, in milliseconds.
    #[arg(long, default_value_t = 20_000)]
    pub navigation_timeout_ms: u64,

    /// Pause between keystrokes when typing into form fields.
    #[arg(long, default_value_t = 60)]
    pub key_pause_ms: u64,

    /// Directory receiving screenshot/HTML dumps on failure.
    #[arg(long, default_value = "diagnostics")]
    pub diagnostics_dir: String,
}

/// Arguments for the `price` command.
#[derive(Debug, Args)]
pub struct PriceArgs {}
