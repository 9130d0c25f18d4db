//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up nwb CLI defaults.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `data_dir` - Optional loot data directory to set as default
/// * `show` - If true, show current configuration
pub fn handle(data_dir: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if let Some(dir) = data_dir {
        set_data_dir(&mut config, dir)?;
    } else {
        show_usage();
    }

    Ok(())
}

fn show_config(config: &Config) {
    if let Some(dir) = config.data_dir() {
        println!("Data directory: {}", dir.display());
    } else {
        println!("No data directory configured");
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn set_data_dir(config: &mut Config, dir: PathBuf) -> Result<()> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Data directory {} does not exist", dir.display()))?;
    config.set_data_dir(dir.clone());
    config.save()?;

    println!("Data directory configured: {}", dir.display());
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn show_usage() {
    println!("Usage: nwb configure --data-dir PATH_TO_DATATABLES");
    println!("   or: nwb configure --show");
    println!();
    println!("Note: the data directory holds the extracted javelindata_loot*.json tables.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        let result = set_data_dir(&mut config, dir.path().join("missing"));
        assert!(result.is_err());
        assert_eq!(config.data_dir(), None);
    }

    #[test]
    fn test_config_path_exists() {
        assert!(Config::config_path().is_ok());
    }
}
