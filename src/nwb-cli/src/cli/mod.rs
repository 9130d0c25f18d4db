//! CLI argument definitions for nwb
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod loot;

pub use core::{Cli, Commands};
pub use loot::{ContextArgs, OutputFormat};
