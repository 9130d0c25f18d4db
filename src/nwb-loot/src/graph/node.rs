//! Loot graph node types

use crate::buckets::LootBucketRow;
use crate::tables::{LootTable, LootTableRow};
use serde::Serialize;
use std::fmt;

/// Index of a node inside its [`LootGraph`](super::LootGraph)
pub type NodeId = usize;

/// Why a reference could not be expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The referenced table or bucket does not exist
    Missing,
    /// The referenced table is already being expanded on this path
    Cycle,
}

/// What a node stands for
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LootNodeKind<'a> {
    /// A loot table, expanded into its rows
    Table {
        id: &'a str,
        max_roll: Option<f64>,
        #[serde(skip)]
        table: &'a LootTable,
    },
    /// A loot bucket reference, expanded into its matching rows
    Bucket { id: &'a str },
    /// An item from a loot bucket
    BucketItem { row: &'a LootBucketRow },
    /// An item entry of a loot table
    Item { id: &'a str },
    /// A reference that could not be expanded
    Unresolved {
        reference: String,
        reason: UnresolvedReason,
    },
}

/// A node of a resolved loot graph
#[derive(Debug, Clone, Serialize)]
pub struct LootNode<'a> {
    pub kind: LootNodeKind<'a>,
    /// Table row this node was reached through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<&'a LootTableRow>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Chance relative to the parent
    pub chance: f64,
    /// Chance from the root, `chance * parent.chance_cumulative`
    pub chance_cumulative: f64,
    /// False for entries whose conditions the context does not satisfy
    pub unlocked: bool,
    pub depth: usize,
}

impl<'a> LootNode<'a> {
    /// Item id for item leaves
    pub fn item_id(&self) -> Option<&'a str> {
        match &self.kind {
            LootNodeKind::Item { id } => Some(id),
            LootNodeKind::BucketItem { row } => Some(row.item.as_str()),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.kind, LootNodeKind::Unresolved { .. })
    }

    /// Match-one flag of bucket items
    pub fn match_one(&self) -> bool {
        match &self.kind {
            LootNodeKind::BucketItem { row } => row.match_one,
            _ => false,
        }
    }
}

impl fmt::Display for LootNodeKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LootNodeKind::Table { id, .. } => write!(f, "LTID:{}", id),
            LootNodeKind::Bucket { id } => write!(f, "LBID:{}", id),
            LootNodeKind::BucketItem { row } => f.write_str(&row.item),
            LootNodeKind::Item { id } if id.is_empty() => f.write_str("(empty)"),
            LootNodeKind::Item { id } => f.write_str(id),
            LootNodeKind::Unresolved { reference, reason } => {
                let reason = match reason {
                    UnresolvedReason::Missing => "no data",
                    UnresolvedReason::Cycle => "cycle",
                };
                write!(f, "{} ({})", reference, reason)
            }
        }
    }
}
