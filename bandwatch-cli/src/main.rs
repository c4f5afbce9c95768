//! bandwatch CLI — fetch, scan, and check commands.
//!
//! Commands:
//! - `fetch` — download candles and print a preview of the newest bars
//! - `scan` — historical scan: replay every prefix, log surviving signals
//! - `check` — live check of the newest bar, with notification

use anyhow::Result;
use bandwatch_core::data::csv_import::read_candles_csv;
use bandwatch_core::data::okx::OkxProvider;
use bandwatch_core::data::CandleProvider;
use bandwatch_core::enrich::ema;
use bandwatch_core::notify::{Notifier, StdoutNotifier, TelegramNotifier};
use bandwatch_core::report::{FileSignalLog, SignalSink, StdoutSink};
use bandwatch_core::{Enricher, ScanConfig, ScanDriver, Series};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bandwatch", about = "Rule-based candlestick signal scanner")]
struct Cli {
    /// Path to a TOML config file. Defaults are the 15m BTC-USDT deployment.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download candles and print the newest bars.
    Fetch {
        /// Number of bars to show.
        #[arg(long, default_value_t = 5)]
        tail: usize,
    },
    /// Replay history and log every signal that survives the cooldown.
    Scan {
        /// Read candles from a CSV file instead of the exchange.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Evaluate the newest bar and notify on a match.
    Check {
        /// Read candles from a CSV file instead of the exchange.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the notification instead of sending it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Fetch { tail } => run_fetch(&config, tail),
        Commands::Scan { csv } => run_scan(&config, csv),
        Commands::Check { csv, dry_run } => run_check(&config, csv, dry_run),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ScanConfig> {
    let config = match path {
        Some(path) => ScanConfig::load(&path)?,
        None => ScanConfig::default(),
    };
    Ok(config)
}

fn load_series(config: &ScanConfig, csv: Option<PathBuf>) -> Result<Series> {
    let bars = match csv {
        Some(path) => read_candles_csv(&path)?,
        None => {
            let provider = OkxProvider::new(config.tz_offset_hours)?;
            provider.fetch(&config.inst_id, &config.bar, config.limit)?
        }
    };
    let mut enriched = Enricher::new(config.window_length).enrich(&bars);
    ema::attach(&mut enriched);
    Ok(Series::new(enriched))
}

fn build_sink(config: &ScanConfig) -> Result<Box<dyn SignalSink>> {
    let sink: Box<dyn SignalSink> = match &config.log_file {
        Some(path) if config.log_dedup => Box::new(FileSignalLog::with_dedup(path)?),
        Some(path) => Box::new(FileSignalLog::new(path)),
        None => Box::new(StdoutSink::new(&config.inst_id)),
    };
    Ok(sink)
}

fn build_notifier(config: &ScanConfig, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(StdoutNotifier));
    }
    let notifier: Box<dyn Notifier> = match &config.telegram {
        Some(telegram) => Box::new(TelegramNotifier::new(&telegram.token, &telegram.chat_id)?),
        None => Box::new(StdoutNotifier),
    };
    Ok(notifier)
}

fn run_fetch(config: &ScanConfig, tail: usize) -> Result<()> {
    let provider = OkxProvider::new(config.tz_offset_hours)?;
    let bars = provider.fetch(&config.inst_id, &config.bar, config.limit)?;
    println!("{} {} bars, {} fetched", config.inst_id, config.bar, bars.len());

    for bar in bars.iter().rev().take(tail).rev() {
        println!(
            "{}  o {}  h {}  l {}  c {}  v {}",
            bar.ts, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }
    Ok(())
}

fn run_scan(config: &ScanConfig, csv: Option<PathBuf>) -> Result<()> {
    let series = load_series(config, csv)?;
    let mut driver = ScanDriver::new(config.clone(), config.catalog()?);
    let mut sink = build_sink(config)?;

    let records = driver.scan_history(&series, sink.as_mut())?;
    println!(
        "{}: {} signal records over {} bars",
        config.inst_id,
        records,
        series.len()
    );
    Ok(())
}

fn run_check(config: &ScanConfig, csv: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let series = load_series(config, csv)?;
    let mut driver = ScanDriver::new(config.clone(), config.catalog()?);
    let mut sink = build_sink(config)?;
    let notifier = build_notifier(config, dry_run)?;

    let outcome = driver.check_latest(&series, notifier.as_ref(), sink.as_mut())?;
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    if outcome.matched.is_empty() {
        println!("[{now}] {}: no signal", config.inst_id);
    } else {
        println!(
            "[{now}] {}: {} signal(s)",
            config.inst_id,
            outcome.matched.len()
        );
        for name in &outcome.matched {
            println!(" - {name}");
        }
        if outcome.delivered == Some(false) {
            eprintln!("warning: notification delivery failed; signal logged anyway");
        }
    }
    Ok(())
}
