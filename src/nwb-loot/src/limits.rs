//! Loot limit records
//!
//! Loot limits cap how often a drop may recur for a player. Tables and table
//! rows reference them with `LIM:<id>`.

use crate::columns::{value_to_string, RawTableRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TYPED_COLUMNS: &[&str] = &["LootLimitID", "CountLimit", "TimeBetweenDrops", "LimitExpiresAfter"];

/// A normalized loot limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootLimit {
    #[serde(rename = "LootLimitID")]
    pub id: String,
    /// Drops allowed before the limit kicks in
    #[serde(rename = "CountLimit", default, skip_serializing_if = "Option::is_none")]
    pub count_limit: Option<i64>,
    /// Minimum seconds between two drops
    #[serde(rename = "TimeBetweenDrops", default, skip_serializing_if = "Option::is_none")]
    pub time_between_drops: Option<i64>,
    /// Seconds until the counter resets
    #[serde(rename = "LimitExpiresAfter", default, skip_serializing_if = "Option::is_none")]
    pub limit_expires_after: Option<i64>,
    #[serde(flatten)]
    pub fields: RawTableRow,
}

/// Convert raw `LootLimits` records. Records without an id are skipped.
pub fn convert_loot_limits(data: &[RawTableRow]) -> Vec<LootLimit> {
    data.iter().filter_map(convert_limit).collect()
}

fn convert_limit(row: &RawTableRow) -> Option<LootLimit> {
    let id = row
        .get("LootLimitID")
        .and_then(value_to_string)
        .filter(|id| !id.is_empty())?;

    Some(LootLimit {
        id,
        count_limit: row.get("CountLimit").and_then(integer),
        time_between_drops: row.get("TimeBetweenDrops").and_then(integer),
        limit_expires_after: row.get("LimitExpiresAfter").and_then(integer),
        fields: row
            .iter()
            .filter(|(k, _)| !TYPED_COLUMNS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
