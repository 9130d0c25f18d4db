//! Expansion of loot tables into a [`LootGraph`]

use super::node::{LootNode, LootNodeKind, NodeId, UnresolvedReason};
use super::LootGraph;
use crate::context::LootContext;
use crate::db::LootDb;
use crate::tables::{LootTable, LootTableEntry, LootTableRow};

/// Resolver switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Keep entries whose conditions are unmet as locked, unexpanded nodes
    pub show_locked: bool,
}

/// Expand the given root tables against a context.
///
/// Roots that do not exist become unresolved nodes. The context's drop
/// chance becomes the chance of every unlocked root; locked roots get 0 and
/// are not expanded.
pub fn resolve<'a>(
    db: &'a LootDb,
    table_ids: &[&str],
    context: &LootContext,
    options: ResolveOptions,
) -> LootGraph<'a> {
    let mut resolver = Resolver {
        db,
        context,
        options,
        nodes: Vec::new(),
        path: Vec::new(),
    };

    let roots = table_ids.iter().map(|id| resolver.root(id)).collect();
    tracing::debug!(
        roots = table_ids.len(),
        nodes = resolver.nodes.len(),
        "resolved loot graph"
    );

    LootGraph {
        nodes: resolver.nodes,
        roots,
    }
}

struct Resolver<'a, 'c> {
    db: &'a LootDb,
    context: &'c LootContext,
    options: ResolveOptions,
    nodes: Vec<LootNode<'a>>,
    /// Lowercase ids of the tables being expanded, root first
    path: Vec<String>,
}

impl<'a> Resolver<'a, '_> {
    fn root(&mut self, id: &str) -> NodeId {
        let chance = self.context.drop_chance();
        let Some(table) = self.db.table(id) else {
            tracing::warn!(table = id, "root loot table not found");
            return self.push(
                None,
                None,
                unresolved("LTID", id, UnresolvedReason::Missing),
                0.0,
                true,
            );
        };

        let unlocked = self.context.matches_all(&table.tags);
        let chance = if unlocked { chance } else { 0.0 };
        let node = self.push(None, None, table_kind(table), chance, unlocked);
        if unlocked {
            self.expand_table(node, table);
        }
        node
    }

    fn expand_table(&mut self, node: NodeId, table: &'a LootTable) {
        self.path.push(table.id.to_lowercase());
        for row in &table.items {
            let chance = table.row_chance(row);
            match row.entry() {
                LootTableEntry::Item(id) => {
                    self.push(Some(node), Some(row), LootNodeKind::Item { id }, chance, true);
                }
                LootTableEntry::Bucket(name) => self.bucket(node, row, name, chance),
                LootTableEntry::Table(id) => self.nested_table(node, row, id, chance),
            }
        }
        self.path.pop();
    }

    fn bucket(&mut self, parent: NodeId, row: &'a LootTableRow, name: &'a str, chance: f64) {
        let Some(items) = self.db.bucket(name) else {
            self.push(
                Some(parent),
                Some(row),
                unresolved("LBID", name, UnresolvedReason::Missing),
                0.0,
                true,
            );
            return;
        };

        let node = self.push(Some(parent), Some(row), LootNodeKind::Bucket { id: name }, chance, true);
        for item in items {
            let unlocked = self.context.matches_all(&item.tags);
            if unlocked || self.options.show_locked {
                let chance = if unlocked { 1.0 } else { 0.0 };
                self.push(Some(node), None, LootNodeKind::BucketItem { row: item }, chance, unlocked);
            }
        }
    }

    fn nested_table(&mut self, parent: NodeId, row: &'a LootTableRow, id: &'a str, chance: f64) {
        if self.path.contains(&id.to_lowercase()) {
            tracing::debug!(table = id, "loot table cycle");
            self.push(
                Some(parent),
                Some(row),
                unresolved("LTID", id, UnresolvedReason::Cycle),
                0.0,
                true,
            );
            return;
        }

        let Some(table) = self.db.table(id) else {
            self.push(
                Some(parent),
                Some(row),
                unresolved("LTID", id, UnresolvedReason::Missing),
                0.0,
                true,
            );
            return;
        };

        let unlocked = self.context.matches_all(&table.tags);
        if !unlocked && !self.options.show_locked {
            return;
        }

        let chance = if unlocked { chance } else { 0.0 };
        let node = self.push(Some(parent), Some(row), table_kind(table), chance, unlocked);
        if unlocked {
            self.expand_table(node, table);
        }
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        row: Option<&'a LootTableRow>,
        kind: LootNodeKind<'a>,
        chance: f64,
        unlocked: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        let (depth, base) = match parent {
            Some(p) => (self.nodes[p].depth + 1, self.nodes[p].chance_cumulative),
            None => (0, 1.0),
        };

        self.nodes.push(LootNode {
            kind,
            row,
            parent,
            children: Vec::new(),
            chance,
            chance_cumulative: chance * base,
            unlocked,
            depth,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }
}

fn table_kind(table: &LootTable) -> LootNodeKind<'_> {
    LootNodeKind::Table {
        id: &table.id,
        max_roll: table.max_roll,
        table,
    }
}

fn unresolved<'a>(prefix: &str, name: &str, reason: UnresolvedReason) -> LootNodeKind<'a> {
    LootNodeKind::Unresolved {
        reference: format!("{}:{}", prefix, name),
        reason,
    }
}
