//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::loot::{ContextArgs, DataArgs, OutputFormat};

#[derive(Parser)]
#[command(name = "nwb")]
#[command(about = "New World loot data inspector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List normalized loot tables
    #[command(visible_alias = "t")]
    Tables {
        /// Only show the table with this id
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[command(flatten)]
        data: DataArgs,
    },

    /// List normalized loot bucket rows
    #[command(visible_alias = "b")]
    Buckets {
        /// Only show rows of this bucket
        #[arg(long)]
        bucket: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[command(flatten)]
        data: DataArgs,
    },

    /// List loot limits
    Limits {
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Resolve the loot graph of one or more tables
    #[command(visible_alias = "g")]
    Graph {
        /// Root loot table ids (e.g., "CreatureLootMaster")
        #[arg(required = true, num_args = 1..)]
        tables: Vec<String>,

        #[command(flatten)]
        context: ContextArgs,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Find every table and bucket that drops an item
    Sources {
        /// Item id to look up
        item: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default loot data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
