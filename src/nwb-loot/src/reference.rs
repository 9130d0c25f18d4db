//! Encoded loot references
//!
//! Loot table cells reference other loot entities with a prefixed id:
//! `LTID:<table>`, `LBID:<bucket>` and `LIM:<limit>`. Anything else is a
//! plain item id.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static LOOT_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(LTID|LBID|LIM):(.+)$").expect("valid loot ref pattern"));

/// Kind of entity a reference points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootRefPrefix {
    /// Nested loot table
    #[serde(rename = "LTID")]
    Ltid,
    /// Loot bucket
    #[serde(rename = "LBID")]
    Lbid,
    /// Loot limit
    #[serde(rename = "LIM")]
    Lim,
}

impl LootRefPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            LootRefPrefix::Ltid => "LTID",
            LootRefPrefix::Lbid => "LBID",
            LootRefPrefix::Lim => "LIM",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "LTID" => Some(LootRefPrefix::Ltid),
            "LBID" => Some(LootRefPrefix::Lbid),
            "LIM" => Some(LootRefPrefix::Lim),
            _ => None,
        }
    }
}

impl fmt::Display for LootRefPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `PREFIX:name` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootRef {
    pub prefix: LootRefPrefix,
    pub name: String,
}

impl LootRef {
    pub fn new(prefix: LootRefPrefix, name: impl Into<String>) -> Self {
        Self {
            prefix,
            name: name.into(),
        }
    }

    pub fn is_table(&self) -> bool {
        self.prefix == LootRefPrefix::Ltid
    }

    pub fn is_bucket(&self) -> bool {
        self.prefix == LootRefPrefix::Lbid
    }

    pub fn is_limit(&self) -> bool {
        self.prefix == LootRefPrefix::Lim
    }
}

impl fmt::Display for LootRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.name)
    }
}

/// Parse an encoded reference.
///
/// Returns `None` for empty input and for plain item ids.
pub fn parse_loot_ref(value: &str) -> Option<LootRef> {
    let caps = LOOT_REF.captures(value)?;
    let prefix = LootRefPrefix::from_str(caps.get(1)?.as_str())?;
    Some(LootRef::new(prefix, caps.get(2)?.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(
            parse_loot_ref("LTID:Something"),
            Some(LootRef::new(LootRefPrefix::Ltid, "Something"))
        );
        assert_eq!(
            parse_loot_ref("LBID:Other"),
            Some(LootRef::new(LootRefPrefix::Lbid, "Other"))
        );
        assert_eq!(
            parse_loot_ref("LIM:Limit1"),
            Some(LootRef::new(LootRefPrefix::Lim, "Limit1"))
        );
    }

    #[test]
    fn test_plain_item_ids() {
        assert_eq!(parse_loot_ref(""), None);
        assert_eq!(parse_loot_ref("OreT1"), None);
        assert_eq!(parse_loot_ref("LTID:"), None);
        assert_eq!(parse_loot_ref("XYZ:Thing"), None);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(parse_loot_ref("ltid:Something"), None);
        assert_eq!(parse_loot_ref("Lbid:Other"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["A", "Boss_Named_T5", "ZoneLoot 01"] {
            let encoded = format!("LTID:{}", name);
            let parsed = parse_loot_ref(&encoded).unwrap();
            assert_eq!(parsed.prefix, LootRefPrefix::Ltid);
            assert_eq!(parsed.name, name);
            assert_eq!(parsed.to_string(), encoded);
        }
    }

    #[test]
    fn test_predicates() {
        let r = parse_loot_ref("LIM:Weekly").unwrap();
        assert!(r.is_limit());
        assert!(!r.is_table());
        assert!(!r.is_bucket());
    }
}
