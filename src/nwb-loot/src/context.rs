//! Runtime evaluation context for loot tags

use crate::caseless::{CaseInsensitiveMap, CaseInsensitiveSet};
use crate::tag::{ParsedLootTag, TagValue};

/// Active tags and bound tag values used to decide which loot rows apply
#[derive(Debug, Clone, PartialEq)]
pub struct LootContext {
    tags: CaseInsensitiveSet,
    values: CaseInsensitiveMap<TagValue>,
    drop_chance: f64,
}

impl Default for LootContext {
    fn default() -> Self {
        Self {
            tags: CaseInsensitiveSet::new(),
            values: CaseInsensitiveMap::new(),
            drop_chance: 1.0,
        }
    }
}

impl LootContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        for tag in tags {
            self.tags.insert(tag);
        }
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Chance that the root tables roll at all (1.0 by default)
    pub fn with_drop_chance(mut self, drop_chance: f64) -> Self {
        self.drop_chance = drop_chance;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn value(&self, name: &str) -> Option<&TagValue> {
        self.values.get(name)
    }

    pub fn tags(&self) -> &CaseInsensitiveSet {
        &self.tags
    }

    pub fn values(&self) -> &CaseInsensitiveMap<TagValue> {
        &self.values
    }

    pub fn drop_chance(&self) -> f64 {
        self.drop_chance
    }

    /// True when every condition in the map is satisfied
    pub fn matches_all(&self, conditions: &CaseInsensitiveMap<ParsedLootTag>) -> bool {
        conditions.values().all(|tag| tag.matches(self))
    }
}
