//! Command handlers

pub mod configure;
pub mod loot;

use crate::cli::OutputFormat;
use crate::config::Config;
use anyhow::{bail, Context, Result};
use nwb_loot::LootDb;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolve the data directory from the argument or the configured default
pub fn data_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = arg {
        return Ok(dir);
    }
    match Config::load()?.data_dir {
        Some(dir) => Ok(dir),
        None => bail!("No data directory given. Use --data DIR or run 'nwb configure --data-dir DIR'"),
    }
}

/// Load the loot database from a data directory
pub fn load_db(dir: &Path) -> Result<LootDb> {
    tracing::info!(dir = %dir.display(), "loading loot data");
    let db = LootDb::load(dir).with_context(|| format!("Failed to load loot data from {}", dir.display()))?;
    tracing::info!(
        tables = db.tables().len(),
        bucket_rows = db.bucket_rows().len(),
        limits = db.limits().len(),
        "loaded loot data"
    );
    Ok(db)
}

/// Write a value as JSON or YAML to stdout
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize JSON")?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value).context("Failed to serialize YAML")?);
        }
        OutputFormat::Table => bail!("Table format has no structured rendering"),
    }
    Ok(())
}
