//! SignalLab CLI: analyse daily price histories for reliable buy signals.
//!
//! Commands:
//! - `analyze`: full analysis of one CSV file against a reference date
//! - `batch`: analyse every CSV in a directory, in parallel by default
//! - `stats`: backtest statistics only, per signal type
//! - `track`: follow a published signal over the following days
//! - `config`: print the default configuration as TOML

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signallab_core::tracking::{follow_up, DEFAULT_HORIZON};
use signallab_core::{AnalysisConfig, SignalAnalyzer};
use signallab_runner::export::{export_batch_json, export_json, save_artifacts};
use signallab_runner::reporting::{
    generate_batch_summary, generate_report, render_follow_up, render_stats_table,
};
use signallab_runner::runner::load_series;
use signallab_runner::{
    append_signal_records, jobs_from_dir, run_batch_with_progress, run_csv, signal_records,
    SignalRecord,
};

#[derive(Parser, Debug)]
#[command(
    name = "signallab",
    version,
    about = "SignalLab CLI: technical signal backtesting and daily reports"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse one security from a CSV file.
    Analyze {
        /// CSV with date,open,high,low,close,volume columns.
        csv: PathBuf,

        /// Symbol. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full result as JSON instead of the Markdown report.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Directory to save the JSON and Markdown artifacts in.
        #[arg(long)]
        out: Option<PathBuf>,

        /// CSV signal ledger to merge published signals into.
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Analyse every CSV file in a directory.
    Batch {
        /// Directory of `<symbol>.csv` files.
        dir: PathBuf,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run one security at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the whole batch as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Directory to save per-security artifacts and the summary in.
        #[arg(long)]
        out: Option<PathBuf>,

        /// CSV signal ledger to merge published signals into.
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Backtest statistics per signal type.
    Stats {
        csv: PathBuf,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Include types that never fired.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Follow a published signal over the following bars.
    Track {
        csv: PathBuf,

        /// Signal date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Entry price.
        #[arg(long)]
        price: f64,

        /// Bars to follow after the signal day.
        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the default configuration as TOML.
    Config {
        /// Print the config fingerprint instead.
        #[arg(long, default_value_t = false)]
        fingerprint: bool,

        /// Validate this file and print its effective configuration.
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            csv,
            symbol,
            as_of,
            config,
            json,
            out,
            ledger,
        } => run_analyze(&csv, symbol.as_deref(), as_of, config, json, out, ledger),
        Commands::Batch {
            dir,
            as_of,
            config,
            sequential,
            json,
            out,
            ledger,
        } => run_batch_cmd(&dir, as_of, config, !sequential, json, out, ledger),
        Commands::Stats {
            csv,
            symbol,
            config,
            all,
        } => run_stats(&csv, symbol.as_deref(), config, all),
        Commands::Track {
            csv,
            date,
            price,
            horizon,
            symbol,
            json,
        } => run_track(&csv, symbol.as_deref(), &date, price, horizon, json),
        Commands::Config { fingerprint, check } => run_config(fingerprint, check),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn resolve_as_of(as_of: Option<String>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => parse_date(&s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AnalysisConfig> {
    let config = match path {
        Some(p) => AnalysisConfig::from_file(&p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => AnalysisConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn merge_ledger(ledger: &Path, records: &[SignalRecord]) -> Result<()> {
    let added = append_signal_records(ledger, records)?;
    info!(ledger = %ledger.display(), added, "signal ledger updated");
    Ok(())
}

fn run_analyze(
    csv: &Path,
    symbol: Option<&str>,
    as_of: Option<String>,
    config: Option<PathBuf>,
    json: bool,
    out: Option<PathBuf>,
    ledger: Option<PathBuf>,
) -> Result<()> {
    let as_of = resolve_as_of(as_of)?;
    let config = load_config(config)?;
    let result = run_csv(csv, symbol, &config, as_of)
        .with_context(|| format!("failed to analyse {}", csv.display()))?;

    if json {
        println!("{}", export_json(&result)?);
    } else {
        print!("{}", generate_report(&result));
    }

    if let Some(dir) = out {
        let path = save_artifacts(&result, &dir)?;
        info!(path = %path.display(), "artifacts saved");
    }
    if let Some(ledger) = ledger {
        merge_ledger(&ledger, &signal_records(&result))?;
    }
    Ok(())
}

fn run_batch_cmd(
    dir: &Path,
    as_of: Option<String>,
    config: Option<PathBuf>,
    parallel: bool,
    json: bool,
    out: Option<PathBuf>,
    ledger: Option<PathBuf>,
) -> Result<()> {
    let as_of = resolve_as_of(as_of)?;
    let config = load_config(config)?;
    let jobs = jobs_from_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    if jobs.is_empty() {
        bail!("no CSV files found in {}", dir.display());
    }

    info!(securities = jobs.len(), %as_of, parallel, "starting batch");
    let batch = run_batch_with_progress(&jobs, &config, as_of, parallel, |done, total, symbol| {
        debug!(done, total, symbol, "progress");
    })?;

    if json {
        println!("{}", export_batch_json(&batch)?);
    } else {
        print!("{}", generate_batch_summary(&batch));
    }

    if let Some(out) = out {
        for result in batch.reported() {
            save_artifacts(result, &out)?;
        }
        let summary_path = out.join("summary.md");
        std::fs::create_dir_all(&out)?;
        std::fs::write(&summary_path, generate_batch_summary(&batch))
            .with_context(|| format!("failed to write {}", summary_path.display()))?;
        info!(dir = %out.display(), "artifacts saved");
    }
    if let Some(ledger) = ledger {
        let records: Vec<SignalRecord> = batch.results.iter().flat_map(signal_records).collect();
        merge_ledger(&ledger, &records)?;
    }
    Ok(())
}

fn run_stats(csv: &Path, symbol: Option<&str>, config: Option<PathBuf>, all: bool) -> Result<()> {
    let config = load_config(config)?;
    let series = load_series(csv, symbol)
        .with_context(|| format!("failed to load {}", csv.display()))?;
    let analysis = SignalAnalyzer::new(config.clone()).backtest(&series);

    println!("# Backtest: {} ({} bars)\n", series.symbol(), series.len());
    if series.len() < config.min_history {
        println!("Insufficient history: {} bars, {} required.", series.len(), config.min_history);
        return Ok(());
    }
    print!("{}", render_stats_table(&analysis.stats, !all));
    Ok(())
}

fn run_track(
    csv: &Path,
    symbol: Option<&str>,
    date: &str,
    price: f64,
    horizon: usize,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let series = load_series(csv, symbol)
        .with_context(|| format!("failed to load {}", csv.display()))?;
    let Some(follow) = follow_up(&series, date, price, horizon) else {
        bail!("no bars on or after {date}, or entry price {price} is not positive");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&follow)?);
    } else {
        print!("{}", render_follow_up(series.symbol(), &follow));
    }
    Ok(())
}

fn run_config(fingerprint: bool, check: Option<PathBuf>) -> Result<()> {
    let config = match check {
        Some(path) => load_config(Some(path))?,
        None => AnalysisConfig::default(),
    };
    if fingerprint {
        println!("{}", config.fingerprint());
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
