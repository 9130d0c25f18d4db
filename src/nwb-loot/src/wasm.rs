//! WebAssembly bindings for nwb-loot
//!
//! Records go in and come out as JSON strings.

use crate::columns::RawTableRow;
use crate::context::LootContext;
use crate::db::{LootDb, RawLootData};
use crate::graph::ResolveOptions;
use crate::tag::TagValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

/// Normalize raw `LootTables` records
#[wasm_bindgen(js_name = convertLootTables)]
pub fn convert_loot_tables(json: &str) -> Result<String, JsValue> {
    let rows = parse_rows(json)?;
    to_json(&crate::tables::convert_loot_tables(&rows))
}

/// Normalize raw `LootBuckets` records
#[wasm_bindgen(js_name = convertLootBuckets)]
pub fn convert_loot_buckets(json: &str) -> Result<String, JsValue> {
    let rows = parse_rows(json)?;
    to_json(&crate::buckets::convert_loot_buckets(&rows))
}

/// Normalize raw `LootLimits` records
#[wasm_bindgen(js_name = convertLootLimits)]
pub fn convert_loot_limits(json: &str) -> Result<String, JsValue> {
    let rows = parse_rows(json)?;
    to_json(&crate::limits::convert_loot_limits(&rows))
}

/// Resolve a loot graph
///
/// # Arguments
/// * `tables` - Raw `LootTables` records
/// * `buckets` - Raw `LootBuckets` records
/// * `root` - Root loot table id
/// * `context` - `{"tags": [...], "values": {...}, "dropChance": 1.0, "showLocked": false}`
#[wasm_bindgen(js_name = resolveLootGraph)]
pub fn resolve_loot_graph(
    tables: &str,
    buckets: &str,
    root: &str,
    context: &str,
) -> Result<String, JsValue> {
    let raw = RawLootData {
        tables: parse_rows(tables)?,
        buckets: vec![parse_rows(buckets)?],
        limits: Vec::new(),
    };
    let input: ContextInput = serde_json::from_str(context)
        .map_err(|e| JsValue::from_str(&format!("Invalid context: {}", e)))?;

    let db = LootDb::from_raw(&raw);
    let options = ResolveOptions {
        show_locked: input.show_locked,
    };
    let graph = db.resolve_graph(&[root], &input.into_context(), options);
    to_json(&graph)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextInput {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    values: BTreeMap<String, TagValue>,
    drop_chance: Option<f64>,
    #[serde(default)]
    show_locked: bool,
}

impl ContextInput {
    fn into_context(self) -> LootContext {
        let mut context = LootContext::new().with_tags(self.tags);
        for (name, value) in self.values {
            context = context.with_value(name, value);
        }
        if let Some(drop_chance) = self.drop_chance {
            context = context.with_drop_chance(drop_chance);
        }
        context
    }
}

fn parse_rows(json: &str) -> Result<Vec<RawTableRow>, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Parse failed: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialize failed: {}", e)))
}
