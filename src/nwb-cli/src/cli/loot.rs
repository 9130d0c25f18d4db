//! Shared arguments of the loot commands

use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Directory with the loot data tables (uses configured default if not provided)
    #[arg(long, env = "NWB_DATA_DIR")]
    pub data: Option<PathBuf>,
}

/// Evaluation context for graph resolution
#[derive(Debug, Args)]
pub struct ContextArgs {
    /// Active tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,

    /// Bound tag value as NAME=VALUE (repeatable, e.g. "Level=60")
    #[arg(long, value_parser = parse_binding)]
    pub value: Vec<(String, String)>,

    /// Chance that the root tables roll at all
    #[arg(long)]
    pub drop_chance: Option<f64>,

    /// Keep entries whose conditions are not met
    #[arg(long)]
    pub show_locked: bool,
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing tag name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
