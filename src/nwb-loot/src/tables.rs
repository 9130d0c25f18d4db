//! Loot table normalization
//!
//! Each logical loot table is spread over three `LootTables` records:
//!
//! - `<id>`: the table itself, with one entry per `Item<n>` column
//! - `<id>_Qty`: quantity expressions per column
//! - `<id>_Probs`: probability weights per column, `MaxRoll` and
//!   `GearScoreRange<n>`
//!
//! The companions are folded into their parent and never appear as tables.

use crate::caseless::CaseInsensitiveMap;
use crate::columns::{is_truthy, keys_with_prefix, split_suffixed_key, value_to_string, RawTableRow};
use crate::reference::{parse_loot_ref, LootRefPrefix};
use crate::tag::{parse_loot_tag, ParsedLootTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const QTY_SUFFIX: &str = "_Qty";
pub const PROBS_SUFFIX: &str = "_Probs";

/// Columns lifted into typed fields of [`LootTable`]
const TYPED_COLUMNS: &[&str] = &["LootTableID", "Conditions", "AND/OR", "MaxRoll"];

/// One entry of a loot table.
///
/// Exactly one of `item_id`, `loot_bucket_id` and `loot_table_id` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTableRow {
    #[serde(rename = "ItemID", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(rename = "LootBucketID", default, skip_serializing_if = "Option::is_none")]
    pub loot_bucket_id: Option<String>,
    #[serde(rename = "LootTableID", default, skip_serializing_if = "Option::is_none")]
    pub loot_table_id: Option<String>,
    #[serde(rename = "LootLimitID", default, skip_serializing_if = "Option::is_none")]
    pub loot_limit_id: Option<String>,
    /// Quantity expression, not evaluated
    #[serde(rename = "Qty", default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    /// Probability weight against the table's `MaxRoll`, not evaluated
    #[serde(rename = "Prob", default, skip_serializing_if = "Option::is_none")]
    pub prob: Option<String>,
    #[serde(rename = "GearScoreRange", default, skip_serializing_if = "Option::is_none")]
    pub gear_score_range: Option<String>,
}

/// What a loot table entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootTableEntry<'a> {
    Item(&'a str),
    Bucket(&'a str),
    Table(&'a str),
}

impl LootTableRow {
    pub fn entry(&self) -> LootTableEntry<'_> {
        if let Some(id) = &self.loot_bucket_id {
            LootTableEntry::Bucket(id)
        } else if let Some(id) = &self.loot_table_id {
            LootTableEntry::Table(id)
        } else {
            LootTableEntry::Item(self.item_id.as_deref().unwrap_or_default())
        }
    }

    /// Numeric probability weight, if the expression is a plain number
    pub fn prob_weight(&self) -> Option<f64> {
        self.prob
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }
}

/// A normalized loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LootTableRecord")]
pub struct LootTable {
    #[serde(rename = "LootTableID")]
    pub id: String,
    /// Raw condition strings (tags and `LIM:` references)
    #[serde(rename = "Conditions", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    /// Tag conditions parsed from `conditions`
    #[serde(skip)]
    pub tags: CaseInsensitiveMap<ParsedLootTag>,
    #[serde(rename = "AND/OR", default, skip_serializing_if = "Option::is_none")]
    pub and_or: Option<String>,
    /// Roll space that `Prob` weights are measured against
    #[serde(rename = "MaxRoll", default, skip_serializing_if = "Option::is_none")]
    pub max_roll: Option<f64>,
    #[serde(rename = "Items", default)]
    pub items: Vec<LootTableRow>,
    /// Remaining source columns
    #[serde(flatten)]
    pub fields: RawTableRow,
}

/// Serialized form of [`LootTable`]; `tags` are rebuilt from `conditions`
#[derive(Deserialize)]
struct LootTableRecord {
    #[serde(rename = "LootTableID")]
    id: String,
    #[serde(rename = "Conditions", default)]
    conditions: Vec<String>,
    #[serde(rename = "AND/OR", default)]
    and_or: Option<String>,
    #[serde(rename = "MaxRoll", default)]
    max_roll: Option<f64>,
    #[serde(rename = "Items", default)]
    items: Vec<LootTableRow>,
    #[serde(flatten)]
    fields: RawTableRow,
}

impl From<LootTableRecord> for LootTable {
    fn from(record: LootTableRecord) -> Self {
        LootTable {
            tags: condition_tags(&record.conditions),
            id: record.id,
            conditions: record.conditions,
            and_or: record.and_or,
            max_roll: record.max_roll,
            items: record.items,
            fields: record.fields,
        }
    }
}

impl LootTable {
    /// Chance of a row relative to this table: `prob / max_roll`.
    ///
    /// Zero when the table has no roll space.
    pub fn row_chance(&self, row: &LootTableRow) -> f64 {
        match self.max_roll {
            Some(max_roll) if max_roll > 0.0 => row.prob_weight().unwrap_or(0.0) / max_roll,
            _ => 0.0,
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        self.max_roll.is_some_and(|m| m > 0.0)
    }

    /// Names of the `LIM:` references in `conditions`
    pub fn limit_ids(&self) -> Vec<&str> {
        limit_names(&self.conditions)
    }
}

/// Tag conditions of a table, skipping `LIM:` references
fn condition_tags(conditions: &[String]) -> CaseInsensitiveMap<ParsedLootTag> {
    let mut tags = CaseInsensitiveMap::new();
    for tag in conditions
        .iter()
        .filter(|c| parse_loot_ref(c).is_none())
        .filter_map(|c| parse_loot_tag(c))
    {
        tags.insert(tag.name.clone(), tag);
    }
    tags
}

fn limit_names(conditions: &[String]) -> Vec<&str> {
    conditions
        .iter()
        .filter(|c| parse_loot_ref(c).is_some_and(|r| r.is_limit()))
        .filter_map(|c| c.strip_prefix("LIM:"))
        .collect()
}

/// True for `_Qty` / `_Probs` companion ids
pub fn is_companion_id(id: &str) -> bool {
    id.ends_with(QTY_SUFFIX) || id.ends_with(PROBS_SUFFIX)
}

/// Convert raw `LootTables` records into normalized tables.
///
/// Records without a `LootTableID` are skipped.
pub fn convert_loot_tables(data: &[RawTableRow]) -> Vec<LootTable> {
    let mut by_id: HashMap<String, &RawTableRow> = HashMap::new();
    for row in data {
        if let Some(id) = table_id(row) {
            by_id.entry(id.to_lowercase()).or_insert(row);
        }
    }
    let find = |id: String| by_id.get(&id.to_lowercase()).copied();

    data.iter()
        .filter_map(|row| {
            let id = table_id(row)?;
            if is_companion_id(id) {
                return None;
            }
            let qty = find(format!("{}{}", id, QTY_SUFFIX));
            let probs = find(format!("{}{}", id, PROBS_SUFFIX));
            Some(convert_table(id, row, qty, probs))
        })
        .collect()
}

fn table_id(row: &RawTableRow) -> Option<&str> {
    row.get("LootTableID").and_then(Value::as_str)
}

fn convert_table(
    id: &str,
    row: &RawTableRow,
    qty: Option<&RawTableRow>,
    probs: Option<&RawTableRow>,
) -> LootTable {
    let conditions = string_list(row.get("Conditions"));

    let limit_ids = limit_names(&conditions);
    if limit_ids.len() > 1 {
        tracing::warn!(table = id, limits = ?limit_ids, "multiple loot limits on table, using the first");
    }
    let default_limit = limit_ids.first().map(|s| s.to_string());

    let tags = condition_tags(&conditions);

    let items = keys_with_prefix(row, "Item")
        .into_iter()
        .map(|(key, _)| convert_item(key, row, qty, probs, default_limit.as_deref()))
        .collect();

    let fields = row
        .iter()
        .filter(|(key, _)| !is_item_column(key) && !TYPED_COLUMNS.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    LootTable {
        id: id.to_string(),
        and_or: row.get("AND/OR").and_then(value_to_string),
        max_roll: probs.and_then(|p| p.get("MaxRoll")).and_then(number),
        conditions,
        tags,
        items,
        fields,
    }
}

fn convert_item(
    key: &str,
    row: &RawTableRow,
    qty: Option<&RawTableRow>,
    probs: Option<&RawTableRow>,
    default_limit: Option<&str>,
) -> LootTableRow {
    let id = row
        .get(key)
        .filter(|v| is_truthy(Some(*v)))
        .and_then(value_to_string)
        .unwrap_or_default();
    let id_ref = parse_loot_ref(&id);
    let named = |prefix: LootRefPrefix| {
        id_ref
            .as_ref()
            .filter(|r| r.prefix == prefix)
            .map(|r| r.name.clone())
    };

    let loot_bucket_id = named(LootRefPrefix::Lbid);
    // companion rows are data, never a table to recurse into
    let loot_table_id = named(LootRefPrefix::Ltid).filter(|name| !is_companion_id(name));
    let loot_limit_id = named(LootRefPrefix::Lim).or_else(|| default_limit.map(str::to_string));
    let item_id = (loot_bucket_id.is_none() && loot_table_id.is_none()).then_some(id);

    // `Item<n>` and `GearScoreRange<n>` share the suffix
    let gear_score_key = format!("GearScoreRange{}", &key["Item".len()..]);
    let cell = |companion: Option<&RawTableRow>, key: &str| {
        companion.and_then(|c| c.get(key)).and_then(value_to_string)
    };

    LootTableRow {
        item_id,
        loot_bucket_id,
        loot_table_id,
        loot_limit_id,
        qty: cell(qty, key),
        prob: cell(probs, key),
        gear_score_range: cell(probs, &gear_score_key),
    }
}

fn is_item_column(key: &str) -> bool {
    split_suffixed_key(key).is_some_and(|(prefix, _)| {
        prefix.eq_ignore_ascii_case("Item") || prefix.eq_ignore_ascii_case("GearScoreRange")
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
