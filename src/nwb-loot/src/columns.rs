//! Wide-row column discovery
//!
//! Loot data tables repeat a group of fields per column using numeric key
//! suffixes (`Item0`, `Tags0`, `Quantity0`, `Item1`, ...). The number of
//! columns is not fixed, so it is discovered by inspecting the keys, and each
//! row is pivoted into an ordered list of per-column cells before any typed
//! conversion happens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// A raw data table record, as loaded from JSON
pub type RawTableRow = serde_json::Map<String, Value>;

static SUFFIXED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^0-9]+)(\d+)$").expect("valid suffixed key pattern"));

/// Split `Item12` into `("Item", 12)`
pub fn split_suffixed_key(key: &str) -> Option<(&str, u32)> {
    let caps = SUFFIXED_KEY.captures(key)?;
    let prefix = caps.get(1)?.as_str();
    let column = caps.get(2)?.as_str().parse().ok()?;
    Some((prefix, column))
}

/// Field prefixes and column indices found across a set of rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Distinct field prefixes, in first-seen order
    pub prefixes: Vec<String>,
    /// Distinct column indices, ascending
    pub columns: Vec<u32>,
}

impl ColumnLayout {
    pub fn discover<'a>(rows: impl IntoIterator<Item = &'a RawTableRow>) -> Self {
        let mut prefixes: Vec<String> = Vec::new();
        let mut columns = BTreeSet::new();

        for row in rows {
            for key in row.keys() {
                if let Some((prefix, column)) = split_suffixed_key(key) {
                    if !prefixes.iter().any(|p| p == prefix) {
                        prefixes.push(prefix.to_string());
                    }
                    columns.insert(column);
                }
            }
        }

        Self {
            prefixes,
            columns: columns.into_iter().collect(),
        }
    }

    /// Pivot a row into one cell group per discovered column.
    ///
    /// Columns the row has no fields for still produce an empty group.
    pub fn pivot<'a>(&self, row: &'a RawTableRow) -> Vec<ColumnCells<'a>> {
        let mut by_column: HashMap<u32, HashMap<String, &'a Value>> = HashMap::new();
        for (key, value) in row {
            if let Some((prefix, column)) = split_suffixed_key(key) {
                by_column
                    .entry(column)
                    .or_default()
                    .insert(prefix.to_string(), value);
            }
        }

        self.columns
            .iter()
            .map(|&column| ColumnCells {
                column,
                cells: by_column.remove(&column).unwrap_or_default(),
            })
            .collect()
    }
}

/// The fields of one column of a wide row, keyed by prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCells<'a> {
    pub column: u32,
    cells: HashMap<String, &'a Value>,
}

impl<'a> ColumnCells<'a> {
    pub fn get(&self, prefix: &str) -> Option<&'a Value> {
        self.cells.get(prefix).copied()
    }
}

/// Keys matching `<prefix><digits>` (prefix compared case-insensitively),
/// ordered by column number
pub fn keys_with_prefix<'a>(row: &'a RawTableRow, prefix: &str) -> Vec<(&'a str, u32)> {
    let mut keys: Vec<(&str, u32)> = row
        .keys()
        .filter_map(|key| {
            let (p, column) = split_suffixed_key(key)?;
            p.eq_ignore_ascii_case(prefix).then_some((key.as_str(), column))
        })
        .collect();
    keys.sort_by_key(|&(_, column)| column);
    keys
}

/// Render a scalar cell as text. Null, arrays and objects yield `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Truthiness of a cell: absent, null, false, zero and empty strings are falsy
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// String field of a row, if present and a string
pub fn field_str<'a>(row: &'a RawTableRow, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawTableRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_split_suffixed_key() {
        assert_eq!(split_suffixed_key("Item0"), Some(("Item", 0)));
        assert_eq!(split_suffixed_key("LootBucket12"), Some(("LootBucket", 12)));
        assert_eq!(split_suffixed_key("RowPlaceholders"), None);
        assert_eq!(split_suffixed_key("42"), None);
    }

    #[test]
    fn test_columns_sorted_numerically() {
        let r = row(json!({"Item0": "a", "Item1": "b", "Item10": "c", "Item2": "d"}));
        let layout = ColumnLayout::discover([&r]);
        assert_eq!(layout.columns, vec![0, 1, 2, 10]);
        assert_eq!(layout.prefixes, vec!["Item".to_string()]);
    }

    #[test]
    fn test_discover_across_rows() {
        let a = row(json!({"Item0": "a", "Tags0": []}));
        let b = row(json!({"Item3": "b", "Quantity3": 1}));
        let layout = ColumnLayout::discover([&a, &b]);
        assert_eq!(layout.columns, vec![0, 3]);
        assert_eq!(layout.prefixes.len(), 3);
    }

    #[test]
    fn test_pivot_fills_missing_columns() {
        let a = row(json!({"Item0": "a", "Item2": "c"}));
        let layout = ColumnLayout {
            prefixes: vec!["Item".into()],
            columns: vec![0, 1, 2],
        };
        let cells = layout.pivot(&a);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].get("Item"), Some(&json!("a")));
        assert_eq!(cells[1].get("Item"), None);
        assert_eq!(cells[2].column, 2);
    }

    #[test]
    fn test_keys_with_prefix() {
        let r = row(json!({"Item10": "x", "item2": "y", "GearScoreRange2": "z", "LootTableID": "T"}));
        assert_eq!(keys_with_prefix(&r, "Item"), vec![("item2", 2), ("Item10", 10)]);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(is_truthy(Some(&json!("ITEM"))));
        assert!(is_truthy(Some(&json!(5))));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("50")), Some("50".to_string()));
        assert_eq!(value_to_string(&json!(50)), Some("50".to_string()));
        assert_eq!(value_to_string(&json!(null)), None);
    }
}
