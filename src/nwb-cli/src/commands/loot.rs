//! Loot data command handlers

use super::{data_dir, load_db, print_structured};
use crate::cli::{ContextArgs, OutputFormat};
use anyhow::{bail, Result};
use nwb_loot::{LootContext, LootDb, LootGraph, ResolveOptions, TagValue};
use std::path::PathBuf;

pub fn tables(id: Option<&str>, format: OutputFormat, data: Option<PathBuf>) -> Result<()> {
    let db = load_db(&data_dir(data)?)?;

    if let Some(id) = id {
        let Some(table) = db.table(id) else {
            bail!("Loot table '{}' not found", id);
        };
        if format != OutputFormat::Table {
            return print_structured(table, format);
        }

        println!("{}", table.id);
        if let Some(max_roll) = table.max_roll {
            println!("MaxRoll: {}", max_roll);
        }
        if !table.conditions.is_empty() {
            println!("Conditions: {}", table.conditions.join(", "));
        }
        println!();
        println!("{:<4} {:<50} {:>8} {:>8} {:<12}", "#", "Entry", "Prob", "Qty", "Limit");
        println!("{}", "-".repeat(86));
        for (i, row) in table.items.iter().enumerate() {
            println!(
                "{:<4} {:<50} {:>8} {:>8} {:<12}",
                i,
                entry_label(row),
                row.prob.as_deref().unwrap_or("-"),
                row.qty.as_deref().unwrap_or("-"),
                row.loot_limit_id.as_deref().unwrap_or("-"),
            );
        }
        return Ok(());
    }

    if format != OutputFormat::Table {
        return print_structured(db.tables(), format);
    }

    println!("{:<50} {:>8} {:>8} {:<30}", "LootTableID", "MaxRoll", "Entries", "Conditions");
    println!("{}", "-".repeat(100));
    for table in db.tables() {
        println!(
            "{:<50} {:>8} {:>8} {:<30}",
            table.id,
            table.max_roll.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string()),
            table.items.len(),
            table.conditions.join(", "),
        );
    }
    println!("\n{} tables", db.tables().len());

    Ok(())
}

pub fn buckets(bucket: Option<&str>, format: OutputFormat, data: Option<PathBuf>) -> Result<()> {
    let db = load_db(&data_dir(data)?)?;

    let rows = match bucket {
        Some(name) => match db.bucket(name) {
            Some(rows) => rows,
            None => bail!("Loot bucket '{}' not found", name),
        },
        None => db.bucket_rows().iter().collect(),
    };

    if format != OutputFormat::Table {
        return print_structured(&rows, format);
    }

    println!("{:<40} {:<45} {:>8} {:<6} {:<30}", "LootBucket", "Item", "Qty", "One", "Tags");
    println!("{}", "-".repeat(133));
    for row in &rows {
        let quantity = match row.quantity_range() {
            Some((min, max)) if min == max => min.to_string(),
            Some((min, max)) => format!("{}-{}", min, max),
            None => "-".to_string(),
        };
        let tags: Vec<String> = row.tags.values().map(|t| t.to_string()).collect();
        println!(
            "{:<40} {:<45} {:>8} {:<6} {:<30}",
            row.bucket,
            row.item,
            quantity,
            if row.match_one { "yes" } else { "" },
            tags.join(", "),
        );
    }
    println!("\n{} rows", rows.len());

    Ok(())
}

pub fn limits(format: OutputFormat, data: Option<PathBuf>) -> Result<()> {
    let db = load_db(&data_dir(data)?)?;

    if format != OutputFormat::Table {
        return print_structured(db.limits(), format);
    }

    let cell = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    println!("{:<40} {:>10} {:>18} {:>18}", "LootLimitID", "Count", "TimeBetweenDrops", "ExpiresAfter");
    println!("{}", "-".repeat(89));
    for limit in db.limits() {
        println!(
            "{:<40} {:>10} {:>18} {:>18}",
            limit.id,
            cell(limit.count_limit),
            cell(limit.time_between_drops),
            cell(limit.limit_expires_after),
        );
    }

    Ok(())
}

pub fn graph(
    tables: &[String],
    context: ContextArgs,
    format: OutputFormat,
    data: Option<PathBuf>,
) -> Result<()> {
    let db = load_db(&data_dir(data)?)?;
    let options = ResolveOptions {
        show_locked: context.show_locked,
    };
    let context = build_context(context);

    let roots: Vec<&str> = tables.iter().map(String::as_str).collect();
    let graph = db.resolve_graph(&roots, &context, options);

    if format != OutputFormat::Table {
        return print_structured(&graph, format);
    }

    print_tree(&graph);
    print_item_chances(&graph);
    Ok(())
}

pub fn sources(item: &str, data: Option<PathBuf>) -> Result<()> {
    let db = load_db(&data_dir(data)?)?;
    print_sources(&db, item);
    Ok(())
}

fn print_sources(db: &LootDb, item: &str) {
    let sources = db.find_item_sources(item);
    if sources.is_empty() {
        println!("No loot sources found for '{}'", item);
        return;
    }

    println!("Sources of '{}':\n", item);
    for source in &sources {
        match source {
            nwb_loot::ItemSource::Table { table, index } => {
                println!("  LTID:{:<50} entry {}", table, index);
            }
            nwb_loot::ItemSource::Bucket { bucket, row, column } => {
                println!("  LBID:{:<50} row {}, column {}", bucket, row, column);
            }
        }
    }
}

fn build_context(args: ContextArgs) -> LootContext {
    let mut context = LootContext::new().with_tags(args.tag);
    for (name, value) in args.value {
        context = context.with_value(name, TagValue::parse(&value));
    }
    if let Some(drop_chance) = args.drop_chance {
        context = context.with_drop_chance(drop_chance);
    }
    context
}

fn entry_label(row: &nwb_loot::LootTableRow) -> String {
    match row.entry() {
        nwb_loot::LootTableEntry::Item("") => "(empty)".to_string(),
        nwb_loot::LootTableEntry::Item(id) => id.to_string(),
        nwb_loot::LootTableEntry::Bucket(id) => format!("LBID:{}", id),
        nwb_loot::LootTableEntry::Table(id) => format!("LTID:{}", id),
    }
}

fn print_tree(graph: &LootGraph<'_>) {
    for (depth, id) in graph.walk() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let lock = if node.unlocked { "" } else { " [locked]" };
        println!(
            "{}{}{}  {}  ({})",
            "  ".repeat(depth),
            node.kind,
            lock,
            percent(node.chance),
            percent(node.chance_cumulative),
        );
    }
}

fn print_item_chances(graph: &LootGraph<'_>) {
    let chances = graph.item_chances();
    if chances.is_empty() {
        return;
    }

    println!("\n{:<50} {:>10}", "Item", "Chance");
    println!("{}", "-".repeat(61));
    for (item, chance) in chances {
        println!("{:<50} {:>10}", item, percent(chance));
    }
}

fn percent(chance: f64) -> String {
    if chance >= 0.01 {
        format!("{:.2}%", chance * 100.0)
    } else {
        format!("{:.4}%", chance * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context() {
        let context = build_context(ContextArgs {
            tag: vec!["Named".to_string()],
            value: vec![
                ("Level".to_string(), "60".to_string()),
                ("Zone".to_string(), "Ebonscale".to_string()),
            ],
            drop_chance: Some(0.5),
            show_locked: false,
        });

        assert!(context.has_tag("named"));
        assert_eq!(context.value("level"), Some(&TagValue::Number(60.0)));
        assert_eq!(context.value("zone"), Some(&TagValue::Text("Ebonscale".to_string())));
        assert_eq!(context.drop_chance(), 0.5);
    }

    #[test]
    fn test_entry_label() {
        let row = nwb_loot::LootTableRow {
            loot_bucket_id: Some("Ores".to_string()),
            ..Default::default()
        };
        assert_eq!(entry_label(&row), "LBID:Ores");
        assert_eq!(entry_label(&nwb_loot::LootTableRow::default()), "(empty)");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.25), "25.00%");
        assert_eq!(percent(0.0001), "0.0100%");
        assert_eq!(percent(1.0), "100.00%");
    }

    #[test]
    fn test_loads_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("javelindata_loottables.json"),
            r#"[{"LootTableID": "Root", "Item0": "Coin"},
                {"LootTableID": "Root_Probs", "Item0": "1", "MaxRoll": 1}]"#,
        )
        .unwrap();

        let db = load_db(dir.path()).unwrap();
        assert_eq!(db.tables().len(), 1);
        let graph = db.resolve_graph(&["Root"], &LootContext::new(), ResolveOptions::default());
        assert_eq!(graph.item_chances(), vec![("Coin", 1.0)]);
    }
}
