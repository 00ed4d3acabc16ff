//! Refresh the published debt documents from saved INSEE series responses
//!
//! Meant to run monthly (cron or CI) after the responses have been
//! downloaded. Exits with a failure status when neither series is usable.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use debt_clock::insee::{parse_series_response, refresh, InseeError, Observation};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "update_insee", about = "Build debt documents from INSEE series responses")]
struct Args {
    /// Response of the debt-to-GDP series (001694056)
    #[arg(long)]
    ratio: PathBuf,

    /// Response of the debt amount series (010565708)
    #[arg(long)]
    amount: PathBuf,

    /// Directory receiving dette_data.json and dette_insee_latest.json
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Reading debt-to-GDP series...");
    let ratio = read_series(&args.ratio);
    info!("Reading debt amount series...");
    let amount = read_series(&args.amount);

    let output = match refresh(ratio, amount, Utc::now().naive_utc()) {
        Ok(output) => output,
        Err(InseeError::NoData) => bail!("no usable INSEE series, documents left untouched"),
        Err(e) => return Err(e.into()),
    };

    for path in output.write_to(&args.out_dir)? {
        println!("Updated {}", path.display());
    }
    if output.latest.is_none() {
        warn!("No quarter available, latest baseline document not written");
    }
    Ok(())
}

/// A series that cannot be read is reported and treated as unavailable
fn read_series(path: &Path) -> Option<Vec<Observation>> {
    let parsed = fs::read_to_string(path)
        .map_err(InseeError::from)
        .and_then(|json| parse_series_response(&json));
    match parsed {
        Ok(observations) => {
            info!("{}: {} quarterly observations", path.display(), observations.len());
            Some(observations)
        }
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            None
        }
    }
}
