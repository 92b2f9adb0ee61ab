//! Front-end menu tree.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::core::Locale;
use crate::model::{Node, NodeId};
use crate::store::Snapshot;

/// One visible entry of the menu with its translated label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: NodeId,
    pub identifier: String,
    /// Translated name, or the identifier when the node is untranslated.
    pub name: String,
    pub slug: Option<String>,
    pub level: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

/// Listed (active, non-hidden) content nodes in tree order.
///
/// A hidden or inactive node hides its whole subtree.
pub fn menu_tree(snap: &Snapshot, locale: &Locale) -> Vec<MenuItem> {
    let mut by_parent: FxHashMap<Option<NodeId>, Vec<&Node>> = FxHashMap::default();
    for node in snap.nodes().filter(|n| !n.is_system && n.is_listed()) {
        by_parent.entry(node.parent).or_default().push(node);
    }
    for list in by_parent.values_mut() {
        list.sort_by_key(|n| (n.root, n.left));
    }
    build_level(snap, locale, &by_parent, None)
}

fn build_level(
    snap: &Snapshot,
    locale: &Locale,
    by_parent: &FxHashMap<Option<NodeId>, Vec<&Node>>,
    parent: Option<NodeId>,
) -> Vec<MenuItem> {
    let Some(nodes) = by_parent.get(&parent) else {
        return Vec::new();
    };
    nodes
        .iter()
        .map(|node| {
            let translation = snap.translation(node.id, locale);
            MenuItem {
                id: node.id,
                identifier: node.identifier.clone(),
                name: translation
                    .map(|t| t.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| node.identifier.clone()),
                slug: translation.map(|t| t.slug.clone()),
                level: node.level,
                children: build_level(snap, locale, by_parent, Some(node.id)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{build_tree, translation};

    #[test]
    fn test_menu_skips_hidden_subtrees() {
        let (mut snap, _) = build_tree(&[(1, None), (2, Some(1)), (3, Some(2)), (4, Some(1))]);
        snap.node_mut(NodeId(2)).unwrap().is_hidden = true;
        snap.upsert_translation(translation(4, "en", "contact"));

        let menu = menu_tree(&snap, &Locale::new("en"));
        assert_eq!(menu.len(), 1);
        let root = &menu[0];
        assert_eq!(root.name, "n1");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id, NodeId(4));
        assert_eq!(root.children[0].slug.as_deref(), Some("contact"));
    }

    #[test]
    fn test_menu_excludes_system_roots() {
        let (mut snap, _) = build_tree(&[(1, None), (2, None)]);
        snap.node_mut(NodeId(2)).unwrap().is_system = true;
        let menu = menu_tree(&snap, &Locale::new("en"));
        assert_eq!(menu.iter().map(|m| m.id).collect::<Vec<_>>(), [NodeId(1)]);
    }
}
