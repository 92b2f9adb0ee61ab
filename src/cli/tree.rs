//! `tree` command.

use anyhow::Result;
use owo_colors::OwoColorize;

use sitetree::Structure;
use sitetree::core::Locale;
use sitetree::model::Node;

pub fn run_tree(structure: &Structure, locale: &Locale, json: bool) -> Result<()> {
    if json {
        let menu = structure.tree().menu_tree(locale);
        println!("{}", serde_json::to_string_pretty(&menu)?);
        return Ok(());
    }

    let snap = structure.database().read();
    let mut nodes: Vec<&Node> = snap.nodes().collect();
    nodes.sort_by_key(|n| (n.root, n.left, n.id));

    for node in nodes {
        let slug = snap
            .translation(node.id, locale)
            .map(|t| format!("/{}", t.slug))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}{} {} {}{}",
            "  ".repeat(node.level as usize),
            node.id.dimmed(),
            node.identifier,
            slug.cyan(),
            flags(node).yellow(),
        );
    }
    Ok(())
}

fn flags(node: &Node) -> String {
    let mut flags = Vec::new();
    if node.is_home_page {
        flags.push("home");
    }
    if node.is_system {
        flags.push("system");
    }
    if node.is_hidden {
        flags.push("hidden");
    }
    if !node.is_active {
        flags.push("inactive");
    }
    if node.is_regex {
        flags.push("regex");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    }
}
