//! Hierarchical placement of nodes (nested-set model).
//!
//! # Module Structure
//!
//! ```text
//! tree/
//! ├── nested.rs   # insert, move, re-parent, remove on a write snapshot
//! ├── recover.rs  # verify() and recover()
//! ├── menu.rs     # front-end menu tree
//! └── mod.rs      # TreeStore (this file)
//! ```
//!
//! [`TreeStore`] wraps each operation in one database write, so readers
//! see either the old or the new numbering and never anything between.

mod menu;
pub mod nested;
mod recover;

pub use menu::{MenuItem, menu_tree};
pub use nested::Direction;
pub use recover::{RecoverReport, TreeIssue, recover, verify};

use std::sync::Arc;

use crate::core::Locale;
use crate::error::Result;
use crate::hash::ParameterHasher;
use crate::model::{Descriptor, NewNode, Node, NodeId, NodePatch, Placement};
use crate::store::Database;
use crate::{debug, log};

/// Node CRUD, reorder, re-parent and repair.
#[derive(Clone)]
pub struct TreeStore {
    db: Arc<Database>,
    hasher: ParameterHasher,
}

impl TreeStore {
    pub fn new(db: Arc<Database>, hasher: ParameterHasher) -> Self {
        Self { db, hasher }
    }

    // ========================================================================
    // reads
    // ========================================================================

    pub fn get(&self, id: NodeId) -> Result<Node> {
        self.db.read().require_node(id).cloned()
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<Node> {
        self.db.read().find_by_identifier(identifier).cloned()
    }

    /// Ancestors of `id` from the root down to `id` itself.
    pub fn get_path(&self, id: NodeId) -> Result<Vec<Node>> {
        nested::path(&self.db.read(), id)
    }

    /// Same as [`get_path`](Self::get_path); named for the admin breadcrumb bar.
    pub fn breadcrumbs(&self, id: NodeId) -> Result<Vec<Node>> {
        self.get_path(id)
    }

    pub fn children(&self, parent: Option<NodeId>, is_system: bool) -> Vec<Node> {
        nested::children(&self.db.read(), parent, is_system)
    }

    pub fn menu_tree(&self, locale: &Locale) -> Vec<MenuItem> {
        menu_tree(&self.db.read(), locale)
    }

    pub fn verify(&self) -> Vec<TreeIssue> {
        verify(&self.db.read())
    }

    // ========================================================================
    // inserts
    // ========================================================================

    pub fn create(&self, new: NewNode, placement: Placement) -> Result<NodeId> {
        let identifier = new.identifier.clone();
        let id = self
            .db
            .write(|snap| nested::insert(snap, &self.hasher, new, placement))?;
        debug!("tree"; "created {} `{}` at {:?}", id, identifier, placement);
        Ok(id)
    }

    pub fn insert_as_last_child_of(&self, new: NewNode, parent: NodeId) -> Result<NodeId> {
        self.create(new, Placement::LastChildOf(parent))
    }

    pub fn insert_as_next_sibling_of(&self, new: NewNode, sibling: NodeId) -> Result<NodeId> {
        self.create(new, Placement::NextSiblingOf(sibling))
    }

    // ========================================================================
    // moves
    // ========================================================================

    /// Move `id` up by `steps` siblings. Returns whether anything moved.
    pub fn move_up(&self, id: NodeId, steps: usize) -> Result<bool> {
        self.move_by(id, steps, Direction::Up)
    }

    /// Move `id` down by `steps` siblings. Returns whether anything moved.
    pub fn move_down(&self, id: NodeId, steps: usize) -> Result<bool> {
        self.move_by(id, steps, Direction::Down)
    }

    fn move_by(&self, id: NodeId, steps: usize, direction: Direction) -> Result<bool> {
        let moved = self
            .db
            .write(|snap| nested::move_by(snap, id, steps, direction))?;
        if moved {
            debug!("tree"; "moved {} {:?} by {}", id, direction, steps);
        }
        Ok(moved)
    }

    pub fn move_as_last_child_of(&self, id: NodeId, parent: NodeId) -> Result<bool> {
        let moved = self
            .db
            .write(|snap| nested::move_as_last_child_of(snap, id, parent))?;
        if moved {
            debug!("tree"; "moved {} under {}", id, parent);
        }
        Ok(moved)
    }

    pub fn make_root(&self, id: NodeId) -> Result<bool> {
        let moved = self.db.write(|snap| nested::make_root(snap, id))?;
        if moved {
            debug!("tree"; "{} is now a root", id);
        }
        Ok(moved)
    }

    // ========================================================================
    // updates
    // ========================================================================

    pub fn update(&self, id: NodeId, patch: NodePatch) -> Result<()> {
        self.db
            .write(|snap| nested::update(snap, &self.hasher, id, patch))?;
        debug!("tree"; "updated {}", id);
        Ok(())
    }

    /// Point `id` at a presenter action, optionally replacing its static parameters.
    pub fn save_presenter_action(
        &self,
        id: NodeId,
        descriptor: Descriptor,
        parameters: Option<crate::core::Parameters>,
    ) -> Result<()> {
        self.update(
            id,
            NodePatch {
                descriptor: Some(Some(descriptor)),
                parameters,
                ..NodePatch::default()
            },
        )
    }

    /// Set the page-body template and layout of `id`.
    pub fn save_template(&self, id: NodeId, layout: &str, template: Option<String>) -> Result<()> {
        self.db.write(|snap| {
            let node = snap.node_mut(id)?;
            node.layout_name = layout.to_string();
            node.template = template;
            Ok(())
        })
    }

    pub fn set_home_page(&self, id: NodeId) -> Result<()> {
        self.db.write(|snap| nested::set_home_page(snap, id))?;
        debug!("tree"; "home page is now {}", id);
        Ok(())
    }

    pub fn reset_home_page(&self) -> Result<()> {
        self.db.write(|snap| {
            nested::reset_home_page(snap);
            Ok(())
        })
    }

    // ========================================================================
    // removal and repair
    // ========================================================================

    /// Delete `id` with its subtree, translations and content associations.
    pub fn remove(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let removed = self.db.write(|snap| nested::remove(snap, id))?;
        debug!("tree"; "removed {} ({} with descendants)", id, removed.len());
        Ok(removed)
    }

    /// Renumber the whole tree from parent links.
    pub fn recover(&self) -> Result<RecoverReport> {
        let report = self.db.write(|snap| Ok(recover(snap)))?;
        if report.changed > 0 || !report.detached.is_empty() {
            log!(
                "recover";
                "renumbered {}, detached {}",
                crate::utils::plural_count(report.changed, "node"),
                report.detached.len()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Conflict, StructureError};

    fn store() -> TreeStore {
        TreeStore::new(Arc::new(Database::in_memory()), ParameterHasher::new())
    }

    #[test]
    fn test_scenario_root_move_up_keeps_subtrees() {
        let tree = store();
        let a = tree.create(NewNode::new("a"), Placement::Root).unwrap();
        let b = tree.create(NewNode::new("b"), Placement::Root).unwrap();
        let c = tree.create(NewNode::new("c"), Placement::Root).unwrap();
        let b1 = tree.insert_as_last_child_of(NewNode::new("b1"), b).unwrap();
        let before_b1 = tree.get(b1).unwrap();

        assert!(tree.move_up(b, 1).unwrap());
        let order: Vec<_> = tree.children(None, false).iter().map(|n| n.id).collect();
        assert_eq!(order, [b, a, c]);

        let after_b1 = tree.get(b1).unwrap();
        assert_eq!((after_b1.left, after_b1.right), (before_b1.left, before_b1.right));
        assert_eq!(after_b1.root, tree.get(b).unwrap().root);
        assert!(tree.verify().is_empty());
    }

    #[test]
    fn test_failed_reparent_leaves_tree_untouched() {
        let tree = store();
        let a = tree.create(NewNode::new("a"), Placement::Root).unwrap();
        let b = tree.insert_as_last_child_of(NewNode::new("b"), a).unwrap();
        let before: Vec<Node> = tree.children(Some(a), false);

        let err = tree.move_as_last_child_of(a, b).unwrap_err();
        assert!(matches!(err, StructureError::Conflict(Conflict::Cycle { .. })));
        assert_eq!(tree.children(Some(a), false), before);
    }

    #[test]
    fn test_invariants_hold_after_mixed_operations() {
        let tree = store();
        let root = tree.create(NewNode::new("root"), Placement::Root).unwrap();
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(
                tree.insert_as_last_child_of(NewNode::new(format!("c{i}")), root)
                    .unwrap(),
            );
        }
        tree.move_as_last_child_of(ids[1], ids[0]).unwrap();
        tree.move_as_last_child_of(ids[2], ids[1]).unwrap();
        tree.insert_as_next_sibling_of(NewNode::new("x"), ids[2]).unwrap();
        tree.move_down(ids[3], 2).unwrap();
        tree.move_up(ids[5], 3).unwrap();
        tree.make_root(ids[1]).unwrap();
        tree.remove(ids[4]).unwrap();
        assert!(tree.verify().is_empty(), "{:?}", tree.verify());

        // Containment and parent links agree
        for node in tree.children(Some(ids[1]), false) {
            let path = tree.get_path(node.id).unwrap();
            assert_eq!(path.first().map(|n| n.id), Some(ids[1]));
        }
        assert_eq!(tree.recover().unwrap(), RecoverReport::default());
    }

    #[test]
    fn test_save_template_and_presenter_action() {
        let tree = store();
        let id = tree.create(NewNode::new("page"), Placement::Root).unwrap();
        tree.save_template(id, "wide", Some("page.html".into())).unwrap();
        tree.save_presenter_action(id, Descriptor::new("Front:Page", "default"), None)
            .unwrap();

        let node = tree.get(id).unwrap();
        assert_eq!(node.layout_name, "wide");
        assert_eq!(node.template.as_deref(), Some("page.html"));
        assert!(node.has_descriptor("Front:Page", "default"));
    }
}
