//! Terminal front end of the debt counter
//!
//! Prints the extrapolated debt once, runs the live counter, shows the
//! debt-dynamics indicators or writes their CSV export.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use debt_clock::format::{format_number, format_per_capita};
use debt_clock::indicators::{export_file_name, write_csv, DebtDynamics, SpreadLevel};
use debt_clock::projection::loader::parse_timestamp;
use debt_clock::ticker::SystemClock;
use debt_clock::{spawn_ticker, CounterConfig, EngineFeed, IndicatorStore, Projection, ProjectionEngine};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "run_clock", about = "Real-time public debt counter")]
struct Cli {
    /// JSON config file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Baseline document applied on top of the config
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the projected debt once
    Show {
        /// Query time (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Run the live counter
    Watch {
        /// How long to run
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Print the r-g differential, repayment schedule and spread
    Indicators,
    /// Write the indicator CSV export
    Export {
        /// Output file (defaults to the dated download name)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CounterConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CounterConfig::default(),
    };

    match cli.command {
        Command::Show { at } => {
            let engine = build_engine(&config, cli.data)?;
            let now = match at {
                Some(text) => parse_timestamp(&text).context("parsing --at")?,
                None => Utc::now(),
            };
            print_projection(&engine.extrapolate(now));
        }
        Command::Watch { seconds } => {
            let engine = build_engine(&config, cli.data)?;
            watch(engine, &config, Duration::from_secs(seconds))?;
        }
        Command::Indicators => {
            let store = IndicatorStore::france_2025()?;
            print_indicators(&store)?;
        }
        Command::Export { output } => {
            let store = IndicatorStore::france_2025()?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now().date_naive())));
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(&store.datasets()?, BufWriter::new(file))?;
            println!("Indicators written to {}", path.display());
        }
    }

    Ok(())
}

/// Engine from the config, refreshed by a baseline document when one is given
///
/// A rejected document keeps the configured baseline.
fn build_engine(config: &CounterConfig, data: Option<PathBuf>) -> Result<ProjectionEngine> {
    let mut engine = ProjectionEngine::new(config.baseline().context("building baseline")?);

    if let Some(path) = data.or_else(|| config.baseline_document.clone()) {
        match engine.load_path(&path) {
            Ok(()) => info!("Baseline refreshed from {}", path.display()),
            Err(e) => warn!("Keeping configured baseline, {} rejected: {}", path.display(), e),
        }
    }
    Ok(engine)
}

fn print_projection(p: &Projection) {
    println!("Dette publique     : {} €", format_number(p.total, 0));
    println!("                   : {} Md€", format_number(p.billions, 1));
    println!("Par habitant       : {}", format_per_capita(p.per_capita));
    println!("Augmentation       : {} €/s", format_number(p.per_second, 0));
    println!("                   : {} €/min", format_number(p.per_minute, 0));
    println!("                   : {} €/h", format_number(p.per_hour, 0));
    println!("                   : {} M€/jour", format_number(p.per_day / 1e6, 2));
}

#[derive(Debug, Default)]
struct CounterLine {
    total: String,
    per_capita: String,
}

impl CounterLine {
    fn redraw(&self) {
        let mut out = io::stdout().lock();
        let drawn = write!(out, "\r{} Md€ | {} par habitant   ", self.total, self.per_capita)
            .and_then(|()| out.flush());
        if let Err(e) = drawn {
            debug!("counter redraw failed: {}", e);
        }
    }
}

fn watch(engine: ProjectionEngine, config: &CounterConfig, run_for: Duration) -> Result<()> {
    let total_period = config.total_refresh()?;
    let per_capita_period = config.per_capita_refresh()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting timer runtime")?;

    runtime.block_on(async move {
        let feed = EngineFeed::new(engine);
        let line = Arc::new(Mutex::new(CounterLine::default()));

        let total_line = Arc::clone(&line);
        let total = spawn_ticker(feed.subscribe(), total_period, SystemClock, move |p: &Projection| {
            if let Ok(mut line) = total_line.lock() {
                line.total = format_number(p.billions, 1);
                line.redraw();
            }
        });

        let capita_line = Arc::clone(&line);
        let per_capita =
            spawn_ticker(feed.subscribe(), per_capita_period, SystemClock, move |p: &Projection| {
                if let Ok(mut line) = capita_line.lock() {
                    line.per_capita = format_per_capita(p.per_capita);
                    line.redraw();
                }
            });

        tokio::time::sleep(run_for).await;
        total.stop();
        per_capita.stop();
    });

    println!();
    Ok(())
}

fn print_indicators(store: &IndicatorStore) -> Result<()> {
    if let Some(reading) = store.latest_differential() {
        let status = match reading.dynamics {
            DebtDynamics::Favorable => "favorable",
            DebtDynamics::Unfavorable => "défavorable",
        };
        println!(
            "r-g {} : {:.1}% - {:.1}% = {:+.1}% ({})",
            reading.period, reading.r, reading.g, reading.differential, status
        );
    }

    let diff = store.rate_differential()?;
    let history: Vec<String> = diff.points().map(|(p, v)| format!("{p}: {v:+.1}")).collect();
    println!("  historique : {}", history.join(", "));

    let schedule = store.schedule();
    let total = schedule.total()?;
    println!(
        "\nÉchéancier (Mds€), programme de financement {} Mds€ :",
        schedule.financing_programme()
    );
    for (idx, (year, sum)) in total.points().enumerate() {
        let share = schedule
            .programme_share(sum)
            .map(|s| format!("{:.0}%", s * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {year} : {:>6.1} nominales + {:>5.1} indexées = {:>6.1} ({share} du programme)",
            schedule.nominal().values()[idx],
            schedule.indexed().values()[idx],
            sum
        );
    }

    let spread = store.spread();
    let level = match spread.level() {
        SpreadLevel::Contained => "contenu",
        SpreadLevel::Elevated => "tendu",
        SpreadLevel::High => "élevé",
    };
    println!(
        "\nSpread OAT-Bund 10 ans : {:.0} pb ({}), {:+.0} pb vs moyenne 5 ans [{:.0} - {:.0}], au {}",
        spread.current_bp(),
        level,
        spread.deviation_from_mean_bp(),
        spread.min_5y * 100.0,
        spread.max_5y * 100.0,
        spread.updated
    );

    Ok(())
}
