//! Loot database for querying normalized loot data

use crate::buckets::{convert_loot_buckets, LootBucketRow};
use crate::columns::RawTableRow;
use crate::limits::{convert_loot_limits, LootLimit};
use crate::tables::{convert_loot_tables, LootTable, LootTableEntry};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Kind of loot data table, detected from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootFileKind {
    Tables,
    Buckets,
    Limits,
}

impl LootFileKind {
    /// Detect the kind from a file name such as `javelindata_loottables.json`
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if !lower.ends_with(".json") {
            return None;
        }
        if lower.contains("loottable") {
            Some(LootFileKind::Tables)
        } else if lower.contains("lootbucket") {
            Some(LootFileKind::Buckets)
        } else if lower.contains("lootlimit") {
            Some(LootFileKind::Limits)
        } else {
            None
        }
    }
}

/// Raw loot records, grouped the way they are normalized.
///
/// Bucket records stay grouped by source file because every file carries its
/// own `FIRSTROW`.
#[derive(Debug, Clone, Default)]
pub struct RawLootData {
    pub tables: Vec<RawTableRow>,
    pub buckets: Vec<Vec<RawTableRow>>,
    pub limits: Vec<RawTableRow>,
}

/// Where an item shows up in the loot data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemSource<'a> {
    Table { table: &'a str, index: usize },
    Bucket { bucket: &'a str, row: usize, column: u32 },
}

/// Normalized loot data with case-insensitive lookups
#[derive(Debug, Clone, Default)]
pub struct LootDb {
    tables: Vec<LootTable>,
    buckets: Vec<LootBucketRow>,
    limits: Vec<LootLimit>,
    /// Index: lowercase table id → table
    by_table: HashMap<String, usize>,
    /// Index: lowercase bucket name → bucket rows
    by_bucket: HashMap<String, Vec<usize>>,
    /// Index: lowercase limit id → limit
    by_limit: HashMap<String, usize>,
}

impl LootDb {
    /// Load every loot table, bucket and limit file below a data directory
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let raw = read_data_dir(dir.as_ref())?;
        Ok(Self::from_raw(&raw))
    }

    /// Normalize raw records
    pub fn from_raw(raw: &RawLootData) -> Self {
        let buckets = raw
            .buckets
            .iter()
            .flat_map(|file| convert_loot_buckets(file))
            .collect();
        Self::from_parts(
            convert_loot_tables(&raw.tables),
            buckets,
            convert_loot_limits(&raw.limits),
        )
    }

    /// Create from already normalized data
    pub fn from_parts(
        tables: Vec<LootTable>,
        buckets: Vec<LootBucketRow>,
        limits: Vec<LootLimit>,
    ) -> Self {
        let mut by_table = HashMap::new();
        for (i, table) in tables.iter().enumerate() {
            by_table.entry(table.id.to_lowercase()).or_insert(i);
        }

        let mut by_bucket: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in buckets.iter().enumerate() {
            by_bucket.entry(row.bucket.to_lowercase()).or_default().push(i);
        }

        let mut by_limit = HashMap::new();
        for (i, limit) in limits.iter().enumerate() {
            by_limit.entry(limit.id.to_lowercase()).or_insert(i);
        }

        Self {
            tables,
            buckets,
            limits,
            by_table,
            by_bucket,
            by_limit,
        }
    }

    pub fn table(&self, id: &str) -> Option<&LootTable> {
        self.by_table.get(&id.to_lowercase()).map(|&i| &self.tables[i])
    }

    /// Rows of a bucket, in source order. `None` if no such bucket exists.
    pub fn bucket(&self, name: &str) -> Option<Vec<&LootBucketRow>> {
        self.by_bucket
            .get(&name.to_lowercase())
            .map(|indices| indices.iter().map(|&i| &self.buckets[i]).collect())
    }

    pub fn limit(&self, id: &str) -> Option<&LootLimit> {
        self.by_limit.get(&id.to_lowercase()).map(|&i| &self.limits[i])
    }

    pub fn tables(&self) -> &[LootTable] {
        &self.tables
    }

    pub fn bucket_rows(&self) -> &[LootBucketRow] {
        &self.buckets
    }

    pub fn limits(&self) -> &[LootLimit] {
        &self.limits
    }

    /// Distinct bucket names, sorted
    pub fn bucket_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_bucket
            .values()
            .filter_map(|indices| indices.first())
            .map(|&i| self.buckets[i].bucket.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Every table entry and bucket row that drops the given item
    pub fn find_item_sources(&self, item_id: &str) -> Vec<ItemSource<'_>> {
        let mut sources = Vec::new();

        for table in &self.tables {
            for (index, row) in table.items.iter().enumerate() {
                if let LootTableEntry::Item(id) = row.entry() {
                    if !id.is_empty() && id.eq_ignore_ascii_case(item_id) {
                        sources.push(ItemSource::Table {
                            table: &table.id,
                            index,
                        });
                    }
                }
            }
        }

        for row in &self.buckets {
            if row.item.eq_ignore_ascii_case(item_id) {
                sources.push(ItemSource::Bucket {
                    bucket: &row.bucket,
                    row: row.row,
                    column: row.column,
                });
            }
        }

        sources
    }
}

/// Read all loot data files below a directory, in path order
pub fn read_data_dir(dir: &Path) -> Result<RawLootData> {
    let mut files: Vec<(PathBuf, LootFileKind)> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let kind = LootFileKind::from_filename(&e.file_name().to_string_lossy())?;
            Some((e.into_path(), kind))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    if files.is_empty() {
        return Err(Error::NoData {
            path: dir.to_path_buf(),
        });
    }

    let mut raw = RawLootData::default();
    for (path, kind) in files {
        let rows = read_rows(&path)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), ?kind, "loaded loot data file");
        match kind {
            LootFileKind::Tables => raw.tables.extend(rows),
            LootFileKind::Buckets => raw.buckets.push(rows),
            LootFileKind::Limits => raw.limits.extend(rows),
        }
    }

    Ok(raw)
}

/// Read a JSON file holding an array of records
pub fn read_rows(path: &Path) -> Result<Vec<RawTableRow>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    rows_from_value(value).ok_or_else(|| Error::NotAnArray {
        path: path.to_path_buf(),
    })
}

/// Extract the object records of a JSON array; non-object entries are skipped
pub fn rows_from_value(value: Value) -> Option<Vec<RawTableRow>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
