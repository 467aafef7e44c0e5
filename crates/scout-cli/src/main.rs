//! packscout - label a corpus with the compression strategy that wins on each file
//!
//! Configuration comes from `packscout.toml` (or the file named by
//! `PACKSCOUT_CONFIG`) with `PACKSCOUT_*` environment overrides on top.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use scout_config::{ConfigLoader, ENV_PREFIX, ScoutConfig, Validator};
use tracing::{info, warn};

const CONFIG_ENV: &str = "PACKSCOUT_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "packscout.toml";

fn main() -> Result<()> {
    let config = load_config()?;

    let validation = Validator::new().validate(&config);
    let warnings = validation
        .into_result()
        .context("invalid packscout configuration")?;

    scout_telemetry::init_logging(&config.log).context("failed to initialize logging")?;
    for warning in &warnings {
        warn!("{warning}");
    }

    let summary = scout_core::run(&config)?;
    for skipped in &summary.synthesis_skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "No synthetic sample");
    }
    for skipped in &summary.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipped");
    }
    info!(
        codec_failures = summary.codec_failures,
        synthetic = summary.synthetic_written,
        "Dataset ready"
    );

    println!(
        "Labeled {} of {} files -> {}",
        summary.labeled,
        summary.files_scanned,
        summary.output.display()
    );
    println!("Labels: {}", summary.distribution);
    Ok(())
}

fn load_config() -> Result<ScoutConfig> {
    let mut loader = ConfigLoader::new();
    match std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        Some(path) => {
            if !path.is_file() {
                bail!("{CONFIG_ENV} points to a missing file: {}", path.display());
            }
            loader = loader.with_file(path);
        }
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                loader = loader.with_file(default);
            }
        }
    }

    loader
        .with_env_prefix(ENV_PREFIX)
        .load()
        .context("failed to load configuration")
}
