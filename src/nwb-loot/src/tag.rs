//! Loot tag conditions
//!
//! Loot bucket rows and loot table conditions are gated by tags. A tag is a
//! name optionally followed by a condition on a value bound in the
//! [`LootContext`](crate::LootContext):
//!
//! ```text
//! Named              tag must be present
//! Level:>=10         comparator and single value
//! MinContLevel:20-60 inclusive numeric range
//! Zone:Ebonscale,Reekwater   any of the listed values
//! ```

use crate::context::LootContext;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Value carried by a tag condition or bound in a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl TagValue {
    /// Numbers become [`TagValue::Number`], everything else is text
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => TagValue::Number(n),
            _ => TagValue::Text(s.trim().to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(n) => Some(*n),
            TagValue::Text(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    fn loose_eq(&self, other: &TagValue) -> bool {
        match (self, other) {
            (TagValue::Text(a), TagValue::Text(b)) => a.eq_ignore_ascii_case(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
                _ => false,
            },
        }
    }

    fn numeric_cmp(&self, other: &TagValue) -> Option<Ordering> {
        self.as_number()?.partial_cmp(&other.as_number()?)
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Number(n) => write!(f, "{}", n),
            TagValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for TagValue {
    fn from(n: f64) -> Self {
        TagValue::Number(n)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

/// Comparison applied between the context value and the tag value list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagComparator {
    /// Tag is present, no value involved
    Exists,
    /// Context value equals any listed value
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Inclusive `[min, max]`
    Range,
}

impl TagComparator {
    pub fn symbol(self) -> &'static str {
        match self {
            TagComparator::Exists | TagComparator::Eq | TagComparator::Range => "",
            TagComparator::Ne => "!=",
            TagComparator::Lt => "<",
            TagComparator::Lte => "<=",
            TagComparator::Gt => ">",
            TagComparator::Gte => ">=",
        }
    }
}

// Longest symbols first so `>=` is not read as `>`
const COMPARATORS: &[(&str, TagComparator)] = &[
    (">=", TagComparator::Gte),
    ("<=", TagComparator::Lte),
    ("!=", TagComparator::Ne),
    (">", TagComparator::Gt),
    ("<", TagComparator::Lt),
    ("=", TagComparator::Eq),
];

/// A parsed tag condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLootTag {
    pub name: String,
    pub comparator: TagComparator,
    pub value: Vec<TagValue>,
}

impl ParsedLootTag {
    pub fn exists(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: TagComparator::Exists,
            value: Vec::new(),
        }
    }

    /// Evaluate this condition against a context.
    ///
    /// Conditions other than [`TagComparator::Exists`] require a value bound
    /// under the tag name; unbound names never match.
    pub fn matches(&self, context: &LootContext) -> bool {
        if self.comparator == TagComparator::Exists {
            return context.has_tag(&self.name) || context.value(&self.name).is_some();
        }
        let Some(bound) = context.value(&self.name) else {
            return false;
        };
        self.matches_value(bound)
    }

    /// Evaluate the value part of this condition against a single value
    pub fn matches_value(&self, bound: &TagValue) -> bool {
        let ordered = |accept: fn(Ordering) -> bool| {
            self.value
                .first()
                .and_then(|v| bound.numeric_cmp(v))
                .is_some_and(accept)
        };

        match self.comparator {
            TagComparator::Exists => true,
            TagComparator::Eq => self.value.iter().any(|v| bound.loose_eq(v)),
            TagComparator::Ne => self.value.iter().all(|v| !bound.loose_eq(v)),
            TagComparator::Lt => ordered(|o| o == Ordering::Less),
            TagComparator::Lte => ordered(|o| o != Ordering::Greater),
            TagComparator::Gt => ordered(|o| o == Ordering::Greater),
            TagComparator::Gte => ordered(|o| o != Ordering::Less),
            TagComparator::Range => {
                let (Some(n), Some(lo), Some(hi)) = (
                    bound.as_number(),
                    self.value.first().and_then(TagValue::as_number),
                    self.value.get(1).and_then(TagValue::as_number),
                ) else {
                    return false;
                };
                n >= lo.min(hi) && n <= lo.max(hi)
            }
        }
    }
}

impl fmt::Display for ParsedLootTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match self.comparator {
            TagComparator::Exists => Ok(()),
            TagComparator::Range => match self.value.as_slice() {
                [lo, hi] => write!(f, ":{}-{}", lo, hi),
                _ => Ok(()),
            },
            comparator => {
                let values: Vec<String> = self.value.iter().map(ToString::to_string).collect();
                write!(f, ":{}{}", comparator.symbol(), values.join(","))
            }
        }
    }
}

/// Parse an encoded tag.
///
/// Returns `None` for anything that does not follow the tag grammar.
pub fn parse_loot_tag(value: &str) -> Option<ParsedLootTag> {
    let value = value.trim();
    let (name, condition) = match value.split_once(':') {
        Some((name, condition)) => (name.trim(), Some(condition.trim())),
        None => (value, None),
    };

    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }

    let Some(condition) = condition else {
        return Some(ParsedLootTag::exists(name));
    };
    if condition.is_empty() || condition.contains(':') {
        return None;
    }

    let (comparator, value) = parse_condition(condition)?;
    Some(ParsedLootTag {
        name: name.to_string(),
        comparator,
        value,
    })
}

fn parse_condition(condition: &str) -> Option<(TagComparator, Vec<TagValue>)> {
    for (symbol, comparator) in COMPARATORS {
        if let Some(rest) = condition.strip_prefix(symbol) {
            let rest = rest.trim();
            if rest.is_empty() || rest.contains(',') {
                return None;
            }
            return Some((*comparator, vec![TagValue::parse(rest)]));
        }
    }

    if let Some(range) = parse_range(condition) {
        return Some((TagComparator::Range, range));
    }

    let values = condition
        .split(',')
        .map(str::trim)
        .map(|v| (!v.is_empty()).then(|| TagValue::parse(v)))
        .collect::<Option<Vec<_>>>()?;
    Some((TagComparator::Eq, values))
}

fn parse_range(condition: &str) -> Option<Vec<TagValue>> {
    // skip the first char so a leading minus sign is not taken as separator
    let split = condition.char_indices().skip(1).find(|&(_, c)| c == '-')?.0;
    let lo = condition[..split].trim().parse::<f64>().ok()?;
    let hi = condition[split + 1..].trim().parse::<f64>().ok()?;
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    Some(vec![TagValue::Number(lo), TagValue::Number(hi)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LootContext {
        LootContext::new()
            .with_tag("Named")
            .with_value("Level", 60.0)
            .with_value("Zone", "Ebonscale")
    }

    #[test]
    fn test_parse_bare_name() {
        let tag = parse_loot_tag("Named").unwrap();
        assert_eq!(tag.name, "Named");
        assert_eq!(tag.comparator, TagComparator::Exists);
        assert!(tag.value.is_empty());
    }

    #[test]
    fn test_parse_comparators() {
        let tag = parse_loot_tag("Level:>=10").unwrap();
        assert_eq!(tag.comparator, TagComparator::Gte);
        assert_eq!(tag.value, vec![TagValue::Number(10.0)]);

        assert_eq!(parse_loot_tag("Level:<5").unwrap().comparator, TagComparator::Lt);
        assert_eq!(parse_loot_tag("Level:<=5").unwrap().comparator, TagComparator::Lte);
        assert_eq!(parse_loot_tag("Level:>5").unwrap().comparator, TagComparator::Gt);
        assert_eq!(parse_loot_tag("Level:!=5").unwrap().comparator, TagComparator::Ne);
        assert_eq!(parse_loot_tag("Level:=5").unwrap().comparator, TagComparator::Eq);
    }

    #[test]
    fn test_parse_range() {
        let tag = parse_loot_tag("MinContLevel:20-60").unwrap();
        assert_eq!(tag.comparator, TagComparator::Range);
        assert_eq!(tag.value, vec![TagValue::Number(20.0), TagValue::Number(60.0)]);

        let tag = parse_loot_tag("Offset:-5-5").unwrap();
        assert_eq!(tag.value, vec![TagValue::Number(-5.0), TagValue::Number(5.0)]);
    }

    #[test]
    fn test_parse_value_list() {
        let tag = parse_loot_tag("Zone:Ebonscale,Reekwater").unwrap();
        assert_eq!(tag.comparator, TagComparator::Eq);
        assert_eq!(
            tag.value,
            vec![TagValue::from("Ebonscale"), TagValue::from("Reekwater")]
        );

        // non-numeric dash-separated text is a plain value
        let tag = parse_loot_tag("Zone:Ebonscale-Reach").unwrap();
        assert_eq!(tag.comparator, TagComparator::Eq);
        assert_eq!(tag.value, vec![TagValue::from("Ebonscale-Reach")]);
    }

    #[test]
    fn test_parse_malformed_returns_none() {
        for input in ["", ":", ":5", "Level:", "Level:>=", "Level:>=1,2", "Level:a,,b", "Two Words", "A:b:c"] {
            assert_eq!(parse_loot_tag(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_matches_exists() {
        assert!(parse_loot_tag("Named").unwrap().matches(&ctx()));
        assert!(parse_loot_tag("named").unwrap().matches(&ctx()));
        // bound values count as present
        assert!(parse_loot_tag("Level").unwrap().matches(&ctx()));
        assert!(!parse_loot_tag("Elite").unwrap().matches(&ctx()));
    }

    #[test]
    fn test_matches_comparisons() {
        let c = ctx();
        assert!(parse_loot_tag("Level:>=60").unwrap().matches(&c));
        assert!(!parse_loot_tag("Level:>60").unwrap().matches(&c));
        assert!(parse_loot_tag("Level:<=60").unwrap().matches(&c));
        assert!(!parse_loot_tag("Level:<60").unwrap().matches(&c));
        assert!(parse_loot_tag("Level:55-65").unwrap().matches(&c));
        assert!(!parse_loot_tag("Level:20-59").unwrap().matches(&c));
        assert!(parse_loot_tag("Level:60").unwrap().matches(&c));
        assert!(parse_loot_tag("Level:!=59").unwrap().matches(&c));
    }

    #[test]
    fn test_matches_text_values() {
        let c = ctx();
        assert!(parse_loot_tag("Zone:ebonscale,Reekwater").unwrap().matches(&c));
        assert!(!parse_loot_tag("Zone:Reekwater").unwrap().matches(&c));
        assert!(!parse_loot_tag("Zone:>=3").unwrap().matches(&c));
    }

    #[test]
    fn test_unbound_value_never_matches() {
        assert!(!parse_loot_tag("GearScore:>=100").unwrap().matches(&ctx()));
        assert!(!parse_loot_tag("GearScore:!=100").unwrap().matches(&ctx()));
    }

    #[test]
    fn test_display() {
        for input in ["Named", "Level:>=10", "MinContLevel:20-60", "Zone:A,B"] {
            assert_eq!(parse_loot_tag(input).unwrap().to_string(), input);
        }
    }
}
