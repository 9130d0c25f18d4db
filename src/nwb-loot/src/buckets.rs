//! Loot bucket normalization
//!
//! A `LootBuckets` data table stores one bucket per column. The `FIRSTROW`
//! placeholder record names the bucket of each column (`LootBucket<n>`), and
//! every other record holds one item per column with its tags, quantity and
//! match-one flag.

use crate::caseless::CaseInsensitiveMap;
use crate::columns::{field_str, is_truthy, value_to_string, ColumnCells, ColumnLayout, RawTableRow};
use crate::tag::{parse_loot_tag, ParsedLootTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker in `RowPlaceholders` for the record that names the buckets
pub const FIRST_ROW_MARKER: &str = "FIRSTROW";

/// One item entry of a loot bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LootBucketRow {
    /// Index of the source record
    pub row: usize,
    /// Column index (the numeric key suffix)
    pub column: u32,
    pub item: String,
    /// Bucket name, inherited from the first row unless the record overrides it
    #[serde(rename = "LootBucket")]
    pub bucket: String,
    /// Only one of the tag-scoped entries may be satisfied at a time
    pub match_one: bool,
    /// `[n]` or `[min, max]`
    pub quantity: Vec<i64>,
    pub tags: CaseInsensitiveMap<ParsedLootTag>,
}

impl LootBucketRow {
    /// Quantity range as `(min, max)`, if any quantity is set
    pub fn quantity_range(&self) -> Option<(i64, i64)> {
        let min = *self.quantity.iter().min()?;
        let max = *self.quantity.iter().max()?;
        Some((min, max))
    }
}

/// Convert raw `LootBuckets` records into per-column rows.
///
/// Output is ordered by record, then by ascending column. Rows without an
/// item are dropped.
pub fn convert_loot_buckets(data: &[RawTableRow]) -> Vec<LootBucketRow> {
    let first_row = data
        .iter()
        .find(|row| field_str(row, "RowPlaceholders") == Some(FIRST_ROW_MARKER));
    let layout = ColumnLayout::discover(data);
    let defaults = first_row.map(|row| layout.pivot(row)).unwrap_or_default();
    let buckets = default_buckets(&defaults, &layout);

    let layout = &layout;
    let buckets = &buckets;
    data.iter()
        .enumerate()
        .flat_map(move |(index, row)| {
            layout
                .pivot(row)
                .into_iter()
                .zip(buckets.iter().cloned())
                .map(move |(cells, bucket)| convert_cell(index, &cells, bucket))
        })
        .filter(|row| !row.item.is_empty())
        .collect()
}

fn default_buckets(defaults: &[ColumnCells<'_>], layout: &ColumnLayout) -> Vec<String> {
    layout
        .columns
        .iter()
        .map(|&column| {
            defaults
                .iter()
                .find(|cells| cells.column == column)
                .and_then(|cells| cells.get("LootBucket"))
                .filter(|v| is_truthy(Some(*v)))
                .and_then(value_to_string)
                .unwrap_or_default()
        })
        .collect()
}

fn convert_cell(row: usize, cells: &ColumnCells<'_>, bucket: String) -> LootBucketRow {
    let mut result = LootBucketRow {
        row,
        column: cells.column,
        item: String::new(),
        bucket,
        match_one: false,
        quantity: Vec::new(),
        tags: CaseInsensitiveMap::new(),
    };

    if let Some(item) = cells.get("Item").filter(|v| is_truthy(Some(*v))) {
        result.item = value_to_string(item).unwrap_or_default();
    }
    if let Some(tags) = cells.get("Tags") {
        for tag in tag_strings(tags).filter_map(parse_loot_tag) {
            result.tags.insert(tag.name.clone(), tag);
        }
    }
    if let Some(quantity) = cells.get("Quantity") {
        result.quantity = parse_quantity(quantity);
    }
    if let Some(match_one) = cells.get("MatchOne") {
        result.match_one = value_to_string(match_one)
            .is_some_and(|s| s.eq_ignore_ascii_case("true"));
    }
    if let Some(bucket) = cells.get("LootBucket").filter(|v| is_truthy(Some(*v))) {
        if let Some(name) = value_to_string(bucket) {
            if name != result.bucket {
                result.bucket = name;
            }
        }
    }

    result
}

fn tag_strings(value: &Value) -> Box<dyn Iterator<Item = &str> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_str)),
        Value::String(s) => Box::new(std::iter::once(s.as_str())),
        _ => Box::new(std::iter::empty()),
    }
}

/// `"1-3"` → `[1, 3]`, `5` → `[5]`
fn parse_quantity(value: &Value) -> Vec<i64> {
    match value {
        Value::String(s) => s.split('-').filter_map(parse_int).collect(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}
