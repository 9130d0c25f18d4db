//! Loot graph resolution
//!
//! Expands loot tables recursively into a tree of tables, buckets and items
//! with per-node and cumulative drop chances. Nodes live in an arena and
//! refer to each other by [`NodeId`].

mod node;
mod resolve;

pub use node::{LootNode, LootNodeKind, NodeId, UnresolvedReason};
pub use resolve::{resolve, ResolveOptions};

use serde::Serialize;
use std::collections::HashMap;

/// A resolved loot graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct LootGraph<'a> {
    nodes: Vec<LootNode<'a>>,
    roots: Vec<NodeId>,
}

impl<'a> LootGraph<'a> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&LootNode<'a>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[LootNode<'a>] {
        &self.nodes
    }

    /// Root node ids, one per requested table
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Ids from the root down to `id`, inclusive
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id).map(|_| id);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }
        path.reverse();
        path
    }

    /// Ids of all nodes without children, in arena order
    pub fn leaves(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Product of the chances along the path to `id`
    pub fn path_chance(&self, id: NodeId) -> f64 {
        self.path(id).iter().map(|&id| self.nodes[id].chance).product()
    }

    /// Summed cumulative chance per item, highest first.
    ///
    /// Locked nodes and empty item ids are left out.
    pub fn item_chances(&self) -> Vec<(&'a str, f64)> {
        let mut order: Vec<&'a str> = Vec::new();
        let mut totals: HashMap<&'a str, f64> = HashMap::new();

        for node in self.nodes.iter().filter(|n| n.unlocked) {
            let Some(item) = node.item_id().filter(|id| !id.is_empty()) else {
                continue;
            };
            let total = totals.entry(item).or_insert_with(|| {
                order.push(item);
                0.0
            });
            *total += node.chance_cumulative;
        }

        let mut chances: Vec<(&'a str, f64)> = order.into_iter().map(|id| (id, totals[id])).collect();
        chances.sort_by(|a, b| b.1.total_cmp(&a.1));
        chances
    }

    /// Depth-first walk from every root, yielding `(depth, node id)`
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push((self.nodes[id].depth, id));
            stack.extend(self.nodes[id].children.iter().rev());
        }
        out
    }
}

impl crate::db::LootDb {
    /// Resolve a loot graph rooted at the given tables
    pub fn resolve_graph(
        &self,
        table_ids: &[&str],
        context: &crate::context::LootContext,
        options: ResolveOptions,
    ) -> LootGraph<'_> {
        resolve(self, table_ids, context, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::RawTableRow;
    use crate::context::LootContext;
    use crate::db::{LootDb, RawLootData};
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<RawTableRow> {
        serde_json::from_value(value).unwrap()
    }

    fn db(tables: Value, buckets: Value) -> LootDb {
        LootDb::from_raw(&RawLootData {
            tables: rows(tables),
            buckets: vec![rows(buckets)],
            limits: Vec::new(),
        })
    }

    fn scenario() -> LootDb {
        db(
            json!([
                {"LootTableID": "Root", "Item0": "LTID:Inner", "Item1": "Coin"},
                {"LootTableID": "Root_Probs", "Item0": "25", "Item1": "75", "MaxRoll": 100},
                {"LootTableID": "Inner", "Item0": "LBID:Ores"},
                {"LootTableID": "Inner_Probs", "Item0": "10", "MaxRoll": 10}
            ]),
            json!([
                {"RowPlaceholders": "FIRSTROW", "LootBucket0": "Ores"},
                {"Item0": "IronOre"},
                {"Item0": "StarmetalOre", "Tags0": ["Level:>=40"]}
            ]),
        )
    }

    fn find<'g, 'a>(graph: &'g LootGraph<'a>, label: &str) -> Option<&'g LootNode<'a>> {
        graph.nodes().iter().find(|n| n.kind.to_string() == label)
    }

    #[test]
    fn test_chances_sum_to_one() {
        let db = scenario();
        let ctx = LootContext::new().with_value("Level", 60.0);
        let graph = resolve(&db, &["Root"], &ctx, ResolveOptions::default());

        let root = graph.roots()[0];
        let sum: f64 = graph
            .children(root)
            .iter()
            .map(|&id| graph.node(id).unwrap().chance)
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let coin = find(&graph, "Coin").unwrap();
        assert!((coin.chance - 0.75).abs() < 1e-9);

        let chances = graph.item_chances();
        assert_eq!(chances[0].0, "Coin");
        assert!(chances.iter().any(|&(id, c)| id == "IronOre" && (c - 0.25).abs() < 1e-9));
        assert!(chances.iter().any(|&(id, _)| id == "StarmetalOre"));
    }

    #[test]
    fn test_cumulative_is_path_product() {
        let db = scenario();
        let ctx = LootContext::new().with_value("Level", 60.0);
        let graph = resolve(&db, &["Root"], &ctx, ResolveOptions::default());

        for (id, node) in graph.nodes().iter().enumerate() {
            assert!((node.chance_cumulative - graph.path_chance(id)).abs() < 1e-9);
        }
        let root = graph.node(graph.roots()[0]).unwrap();
        assert_eq!(root.chance, 1.0);
        assert_eq!(root.chance_cumulative, 1.0);
    }

    #[test]
    fn test_bucket_items_filtered_by_context() {
        let db = scenario();
        let graph = resolve(&db, &["Root"], &LootContext::new(), ResolveOptions::default());
        assert!(find(&graph, "IronOre").is_some());
        assert!(find(&graph, "StarmetalOre").is_none());
    }

    #[test]
    fn test_show_locked_keeps_locked_nodes() {
        let db = scenario();
        let options = ResolveOptions { show_locked: true };
        let graph = resolve(&db, &["Root"], &LootContext::new(), options);

        let locked = find(&graph, "StarmetalOre").unwrap();
        assert!(!locked.unlocked);
        assert_eq!(locked.chance, 0.0);
        assert!(graph.item_chances().iter().all(|&(id, _)| id != "StarmetalOre"));
    }

    #[test]
    fn test_locked_table_is_pruned() {
        let db = db(
            json!([
                {"LootTableID": "Root", "Item0": "LTID:Named", "Item1": "Coin"},
                {"LootTableID": "Root_Probs", "Item0": "50", "Item1": "50", "MaxRoll": 100},
                {"LootTableID": "Named", "Conditions": ["Named"], "Item0": "Trophy"},
                {"LootTableID": "Named_Probs", "Item0": "1", "MaxRoll": 1}
            ]),
            json!([]),
        );

        let graph = resolve(&db, &["Root"], &LootContext::new(), ResolveOptions::default());
        assert!(find(&graph, "LTID:Named").is_none());

        let ctx = LootContext::new().with_tag("named");
        let graph = resolve(&db, &["Root"], &ctx, ResolveOptions::default());
        let trophy = find(&graph, "Trophy").unwrap();
        assert!((trophy.chance_cumulative - 0.5).abs() < 1e-9);

        let options = ResolveOptions { show_locked: true };
        let graph = resolve(&db, &["Root"], &LootContext::new(), options);
        let named = find(&graph, "LTID:Named").unwrap();
        assert!(!named.unlocked);
        assert!(named.children.is_empty());
    }

    #[test]
    fn test_locked_root_has_zero_chance() {
        let db = db(
            json!([
                {"LootTableID": "Named", "Conditions": ["Named"], "Item0": "Trophy"},
                {"LootTableID": "Named_Probs", "Item0": "1", "MaxRoll": 1}
            ]),
            json!([]),
        );

        for show_locked in [false, true] {
            let options = ResolveOptions { show_locked };
            let graph = resolve(&db, &["Named"], &LootContext::new(), options);
            let root = graph.node(graph.roots()[0]).unwrap();
            assert!(!root.unlocked);
            assert_eq!(root.chance, 0.0);
            assert_eq!(root.chance_cumulative, 0.0);
            assert!(root.children.is_empty());
            assert!(graph.item_chances().is_empty());
        }

        let ctx = LootContext::new().with_tag("Named").with_drop_chance(0.5);
        let graph = resolve(&db, &["Named"], &ctx, ResolveOptions::default());
        let root = graph.node(graph.roots()[0]).unwrap();
        assert!(root.unlocked);
        assert_eq!(root.chance, 0.5);
        assert_eq!(graph.item_chances(), vec![("Trophy", 0.5)]);
    }

    #[test]
    fn test_dangling_references_are_zero_chance_leaves() {
        let db = db(
            json!([
                {"LootTableID": "Root", "Item0": "LTID:Nowhere", "Item1": "LBID:Nothing"},
                {"LootTableID": "Root_Probs", "Item0": "50", "Item1": "50", "MaxRoll": 100}
            ]),
            json!([]),
        );

        let graph = resolve(&db, &["Root", "Missing"], &LootContext::new(), ResolveOptions::default());
        let unresolved: Vec<_> = graph.nodes().iter().filter(|n| n.is_unresolved()).collect();
        assert_eq!(unresolved.len(), 3);
        assert!(unresolved.iter().all(|n| n.chance == 0.0 && n.is_leaf()));
        assert!(find(&graph, "LTID:Nowhere (no data)").is_some());
        assert!(find(&graph, "LBID:Nothing (no data)").is_some());
    }

    #[test]
    fn test_cycle_detected() {
        let db = db(
            json!([
                {"LootTableID": "A", "Item0": "LTID:B"},
                {"LootTableID": "A_Probs", "Item0": "1", "MaxRoll": 1},
                {"LootTableID": "B", "Item0": "LTID:a"},
                {"LootTableID": "B_Probs", "Item0": "1", "MaxRoll": 1}
            ]),
            json!([]),
        );

        let graph = resolve(&db, &["A"], &LootContext::new(), ResolveOptions::default());
        assert_eq!(graph.len(), 3);
        let leaf = graph.node(graph.leaves()[0]).unwrap();
        assert!(matches!(
            leaf.kind,
            LootNodeKind::Unresolved { reason: UnresolvedReason::Cycle, .. }
        ));
        assert_eq!(graph.path(graph.leaves()[0]).len(), 3);
    }

    #[test]
    fn test_shared_table_is_not_a_cycle() {
        let db = db(
            json!([
                {"LootTableID": "Root", "Item0": "LTID:Shared", "Item1": "LTID:Shared"},
                {"LootTableID": "Root_Probs", "Item0": "1", "Item1": "1", "MaxRoll": 2},
                {"LootTableID": "Shared", "Item0": "Gem"},
                {"LootTableID": "Shared_Probs", "Item0": "1", "MaxRoll": 1}
            ]),
            json!([]),
        );

        let graph = resolve(&db, &["Root"], &LootContext::new(), ResolveOptions::default());
        assert!(graph.nodes().iter().all(|n| !n.is_unresolved()));
        assert_eq!(graph.item_chances(), vec![("Gem", 1.0)]);
    }

    #[test]
    fn test_drop_chance_scales_roots() {
        let db = scenario();
        let ctx = LootContext::new().with_drop_chance(0.5);
        let graph = resolve(&db, &["Root"], &ctx, ResolveOptions::default());
        let coin = find(&graph, "Coin").unwrap();
        assert!((coin.chance_cumulative - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_companions_are_not_reachable() {
        let db = scenario();
        let graph = resolve(&db, &["Root_Probs"], &LootContext::new(), ResolveOptions::default());
        let root = graph.node(graph.roots()[0]).unwrap();
        assert!(root.is_unresolved());
    }

    #[test]
    fn test_walk_is_depth_first() {
        let db = scenario();
        let graph = resolve(&db, &["Root"], &LootContext::new(), ResolveOptions::default());
        let labels: Vec<String> = graph
            .walk()
            .into_iter()
            .map(|(depth, id)| format!("{}{}", depth, graph.node(id).unwrap().kind))
            .collect();
        assert_eq!(labels, vec!["0LTID:Root", "1LTID:Inner", "2LBID:Ores", "3IronOre", "1Coin"]);
    }

    #[test]
    fn test_serializes_arena() {
        let db = scenario();
        let graph = resolve(&db, &["Root"], &LootContext::new(), ResolveOptions::default());
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["roots"], json!([0]));
        assert_eq!(value["nodes"][0]["kind"]["type"], json!("table"));
        assert_eq!(value["nodes"][0]["kind"]["id"], json!("Root"));
        assert_eq!(value["nodes"][1]["parent"], json!(0));
    }
}
