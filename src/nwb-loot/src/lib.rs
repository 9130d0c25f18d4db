//! Loot data normalization and resolution for New World
//!
//! The game ships its loot data as flat, column-suffixed data tables. This
//! crate turns them into structured records and resolves drop chances.
//!
//! # Data Tables
//!
//! ## `LootTables`
//!
//! One record per table plus two companions that share its columns:
//! - `<id>`: `Item<n>` entries (`ItemID`, `LBID:<bucket>` or `LTID:<table>`)
//! - `<id>_Qty`: quantity per column
//! - `<id>_Probs`: probability per column, `MaxRoll`, `GearScoreRange<n>`
//!
//! ## `LootBuckets`
//!
//! One bucket per column. The `FIRSTROW` record names each column's bucket
//! and every other record contributes one item per column with `Tags<n>`,
//! `Quantity<n>` and `MatchOne<n>`.
//!
//! ## `LootLimits`
//!
//! Drop caps referenced by `LIM:<id>`.
//!
//! # Tags
//!
//! Bucket rows and table conditions carry tags of the form `name[:condition]`,
//! evaluated against a [`LootContext`] of active tags and bound values.

pub mod buckets;
pub mod caseless;
pub mod columns;
pub mod context;
pub mod db;
pub mod graph;
pub mod limits;
pub mod reference;
pub mod tables;
pub mod tag;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::path::PathBuf;

#[doc(inline)]
pub use buckets::{convert_loot_buckets, LootBucketRow};
#[doc(inline)]
pub use caseless::{CaseInsensitiveMap, CaseInsensitiveSet};
#[doc(inline)]
pub use columns::RawTableRow;
#[doc(inline)]
pub use context::LootContext;
#[doc(inline)]
pub use db::{read_data_dir, ItemSource, LootDb, LootFileKind, RawLootData};
#[doc(inline)]
pub use graph::{resolve, LootGraph, LootNode, LootNodeKind, NodeId, ResolveOptions};
#[doc(inline)]
pub use limits::{convert_loot_limits, LootLimit};
#[doc(inline)]
pub use reference::{parse_loot_ref, LootRef, LootRefPrefix};
#[doc(inline)]
pub use tables::{convert_loot_tables, LootTable, LootTableEntry, LootTableRow};
#[doc(inline)]
pub use tag::{parse_loot_tag, ParsedLootTag, TagComparator, TagValue};

/// Errors raised while reading loot data
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected an array of records in {}", path.display())]
    NotAnArray { path: PathBuf },

    #[error("No loot data files found in {}", path.display())]
    NoData { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
