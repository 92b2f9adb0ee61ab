//! Nested-set operations on a snapshot being written.
//!
//! Every function here runs inside one `Database::write` closure, so a
//! renumbering is published all at once or not at all.
//!
//! Numbering is per root group: the root node of a group spans
//! `1..=2k` where `k` is the group size, and a node's descendants are the
//! nodes of the same group whose bounds lie strictly inside its own.

use rustc_hash::FxHashSet;

use crate::error::{Conflict, Result, StructureError};
use crate::hash::ParameterHasher;
use crate::model::{NewNode, Node, NodeId, NodePatch, Placement};
use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

// ============================================================================
// queries
// ============================================================================

/// Ancestors of `id` from its root down to the node itself.
///
/// Derived from interval containment in the node's group, not from
/// parent links.
pub fn path(snap: &Snapshot, id: NodeId) -> Result<Vec<Node>> {
    let node = snap.require_node(id)?;
    let mut ancestors: Vec<Node> = snap
        .nodes()
        .filter(|n| n.root == node.root && n.left <= node.left && node.right <= n.right)
        .cloned()
        .collect();
    ancestors.sort_by_key(|n| n.left);
    Ok(ancestors)
}

/// Direct children of `parent` (or root nodes for `None`) with the given
/// system flag, ordered by root group then left bound.
pub fn children(snap: &Snapshot, parent: Option<NodeId>, is_system: bool) -> Vec<Node> {
    let mut children: Vec<Node> = snap
        .nodes()
        .filter(|n| n.parent == parent && n.is_system == is_system)
        .cloned()
        .collect();
    children.sort_by_key(|n| (n.root, n.left));
    children
}

/// Ids of `node` and all its descendants.
pub fn subtree_ids(snap: &Snapshot, node: &Node) -> FxHashSet<NodeId> {
    snap.nodes()
        .filter(|n| n.root == node.root && node.left <= n.left && n.right <= node.right)
        .map(|n| n.id)
        .collect()
}

fn next_root_key(snap: &Snapshot) -> u32 {
    snap.nodes().map(|n| n.root).max().map_or(1, |r| r + 1)
}

fn sorted_siblings(snap: &Snapshot, node: &Node) -> Vec<Node> {
    let mut siblings: Vec<Node> = snap
        .nodes()
        .filter(|n| n.parent == node.parent && n.root == node.root)
        .cloned()
        .collect();
    siblings.sort_by_key(|n| (n.left, n.id));
    siblings
}

// ============================================================================
// renumbering primitives
// ============================================================================

/// Shift every bound `>= at` in group `root` by `width`, skipping `skip`.
fn open_gap(snap: &mut Snapshot, root: u32, at: i64, width: i64, skip: &FxHashSet<NodeId>) {
    for node in snap.nodes_mut() {
        if node.root != root || skip.contains(&node.id) {
            continue;
        }
        if node.left >= at {
            node.left += width;
        }
        if node.right >= at {
            node.right += width;
        }
    }
}

/// Pull every bound `> after` in group `root` back by `width`, skipping `skip`.
fn close_gap(snap: &mut Snapshot, root: u32, after: i64, width: i64, skip: &FxHashSet<NodeId>) {
    for node in snap.nodes_mut() {
        if node.root != root || skip.contains(&node.id) {
            continue;
        }
        if node.left > after {
            node.left -= width;
        }
        if node.right > after {
            node.right -= width;
        }
    }
}

fn shift_root_keys(snap: &mut Snapshot, from: u32) {
    for node in snap.nodes_mut() {
        if node.root >= from {
            node.root += 1;
        }
    }
}

/// Take `node`'s subtree out of its group's numbering.
///
/// The subtree keeps its old bounds until [`attach`] relocates it.
fn detach(snap: &mut Snapshot, node: &Node) -> FxHashSet<NodeId> {
    let subtree = subtree_ids(snap, node);
    close_gap(snap, node.root, node.right, node.width(), &subtree);
    subtree
}

/// Place a detached subtree so that its top node starts at `left`.
fn attach(
    snap: &mut Snapshot,
    top: &Node,
    subtree: &FxHashSet<NodeId>,
    root: u32,
    left: i64,
    level: u32,
) {
    let offset = left - top.left;
    let level_delta = i64::from(level) - i64::from(top.level);
    for node in snap.nodes_mut() {
        if subtree.contains(&node.id) {
            node.left += offset;
            node.right += offset;
            node.root = root;
            node.level = u32::try_from(i64::from(node.level) + level_delta).unwrap_or(0);
        }
    }
}

/// Exchange two sibling intervals. `a` must precede `b` in the same group.
///
/// Nodes between the two siblings shift by the width difference.
fn swap_intervals(snap: &mut Snapshot, a: &Node, b: &Node) {
    let shift_a = b.right - a.right;
    let shift_b = a.left - b.left;
    let shift_between = b.width() - a.width();

    for node in snap.nodes_mut() {
        if node.root != a.root {
            continue;
        }
        let shift = if a.left <= node.left && node.right <= a.right {
            shift_a
        } else if b.left <= node.left && node.right <= b.right {
            shift_b
        } else if a.right < node.left && node.right < b.left {
            shift_between
        } else {
            continue;
        };
        node.left += shift;
        node.right += shift;
    }
}

// ============================================================================
// writes
// ============================================================================

fn check_identifier(snap: &Snapshot, identifier: &str, except: Option<NodeId>) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(StructureError::Invalid("node identifier must not be blank".into()));
    }
    if snap
        .nodes()
        .any(|n| n.identifier == identifier && Some(n.id) != except)
    {
        return Err(Conflict::IdentifierTaken(identifier.to_string()).into());
    }
    Ok(())
}

fn check_priority(priority: f32) -> Result<()> {
    if (0.0..=1.0).contains(&priority) {
        Ok(())
    } else {
        Err(StructureError::Invalid(format!(
            "sitemap priority {priority} is outside 0.0..=1.0"
        )))
    }
}

fn clear_home_page(snap: &mut Snapshot) {
    for node in snap.nodes_mut() {
        node.is_home_page = false;
    }
}

/// Create a node at `placement`.
pub fn insert(
    snap: &mut Snapshot,
    hasher: &ParameterHasher,
    new: NewNode,
    placement: Placement,
) -> Result<NodeId> {
    check_identifier(snap, &new.identifier, None)?;
    check_priority(new.sitemap_priority)?;

    let none = FxHashSet::default();
    let (parent, root, left, level) = match placement {
        Placement::Root => (None, next_root_key(snap), 1, 0),
        Placement::LastChildOf(parent_id) => {
            let parent = snap.require_node(parent_id)?.clone();
            open_gap(snap, parent.root, parent.right, 2, &none);
            (Some(parent_id), parent.root, parent.right, parent.level + 1)
        }
        Placement::NextSiblingOf(sibling_id) => {
            let sibling = snap.require_node(sibling_id)?.clone();
            match sibling.parent {
                None => {
                    let root = sibling.root + 1;
                    shift_root_keys(snap, root);
                    (None, root, 1, 0)
                }
                Some(parent_id) => {
                    let at = sibling.right + 1;
                    open_gap(snap, sibling.root, at, 2, &none);
                    (Some(parent_id), sibling.root, at, sibling.level)
                }
            }
        }
    };

    if new.is_home_page {
        clear_home_page(snap);
    }

    let id = snap.allocate_node_id();
    let parameters_sum = hasher.hash(&new.parameters);
    snap.insert_node(Node {
        id,
        identifier: new.identifier,
        parent,
        left,
        right: left + 1,
        level,
        root,
        is_system: new.is_system,
        is_active: new.is_active,
        is_hidden: new.is_hidden,
        is_home_page: new.is_home_page,
        is_regex: new.is_regex,
        is_regex_match_arguments: new.is_regex_match_arguments,
        is_autogenerate_slug: new.is_autogenerate_slug,
        descriptor: new.descriptor,
        parameters: new.parameters,
        parameters_sum,
        target: new.target,
        layout_name: new.layout_name,
        template: new.template,
        meta_robots: new.meta_robots,
        sitemap_priority: new.sitemap_priority,
        is_sitemap: new.is_sitemap,
        is_show_h1: new.is_show_h1,
    });
    Ok(id)
}

/// Move a node `steps` positions among its siblings.
///
/// Child nodes swap intervals with the `steps`-th sibling in `direction`
/// (clamped to the first/last one). Root nodes swap root keys with the
/// adjacent root of the same system flag; only single steps are accepted
/// there. Returns whether anything moved.
pub fn move_by(snap: &mut Snapshot, id: NodeId, steps: usize, direction: Direction) -> Result<bool> {
    let node = snap.require_node(id)?.clone();

    if node.parent.is_none() {
        if steps != 1 {
            return Err(StructureError::Unsupported(format!(
                "moving root-level node {id} by {steps} positions (only 1 is supported)"
            )));
        }
        return Ok(swap_root_groups(snap, &node, direction));
    }

    let siblings = sorted_siblings(snap, &node);
    let Some(index) = siblings.iter().position(|n| n.id == id) else {
        return Err(StructureError::InvariantViolation(format!(
            "node {id} is missing from its own sibling list"
        )));
    };
    let target = match direction {
        Direction::Up => index.saturating_sub(steps),
        Direction::Down => index.saturating_add(steps).min(siblings.len() - 1),
    };
    if target == index {
        return Ok(false);
    }

    let other = &siblings[target];
    if target < index {
        swap_intervals(snap, other, &node);
    } else {
        swap_intervals(snap, &node, other);
    }
    Ok(true)
}

fn swap_root_groups(snap: &mut Snapshot, node: &Node, direction: Direction) -> bool {
    let neighbours = snap
        .nodes()
        .filter(|n| n.parent.is_none() && n.is_system == node.is_system);
    let neighbour = match direction {
        Direction::Up => neighbours
            .filter(|n| n.root < node.root)
            .max_by_key(|n| n.root),
        Direction::Down => neighbours
            .filter(|n| n.root > node.root)
            .min_by_key(|n| n.root),
    };
    let Some(other_root) = neighbour.map(|n| n.root) else {
        return false;
    };

    let own_root = node.root;
    for n in snap.nodes_mut() {
        if n.root == own_root {
            n.root = other_root;
        } else if n.root == other_root {
            n.root = own_root;
        }
    }
    true
}

/// Re-parent `id` as the last child of `parent_id`.
pub fn move_as_last_child_of(snap: &mut Snapshot, id: NodeId, parent_id: NodeId) -> Result<bool> {
    let node = snap.require_node(id)?.clone();
    let parent = snap.require_node(parent_id)?.clone();

    if id == parent_id || node.contains(&parent) {
        return Err(Conflict::Cycle {
            node: id,
            target: parent_id,
        }
        .into());
    }
    if node.parent == Some(parent_id) && node.right + 1 == parent.right {
        return Ok(false);
    }

    let subtree = detach(snap, &node);
    let parent = snap.require_node(parent_id)?.clone();
    open_gap(snap, parent.root, parent.right, node.width(), &subtree);
    attach(snap, &node, &subtree, parent.root, parent.right, parent.level + 1);
    snap.node_mut(id)?.parent = Some(parent_id);
    Ok(true)
}

/// Detach `id` with its subtree into a new root group after all others.
pub fn make_root(snap: &mut Snapshot, id: NodeId) -> Result<bool> {
    let node = snap.require_node(id)?.clone();
    if node.parent.is_none() {
        return Ok(false);
    }

    let subtree = detach(snap, &node);
    let root = next_root_key(snap);
    attach(snap, &node, &subtree, root, 1, 0);
    snap.node_mut(id)?.parent = None;
    Ok(true)
}

/// Delete `id` and its whole subtree. Returns the removed ids.
pub fn remove(snap: &mut Snapshot, id: NodeId) -> Result<Vec<NodeId>> {
    let node = snap.require_node(id)?.clone();
    let subtree = detach(snap, &node);
    let mut removed: Vec<NodeId> = subtree.into_iter().collect();
    removed.sort();
    for child in &removed {
        snap.remove_node(*child);
    }
    Ok(removed)
}

pub fn set_home_page(snap: &mut Snapshot, id: NodeId) -> Result<()> {
    snap.require_node(id)?;
    clear_home_page(snap);
    snap.node_mut(id)?.is_home_page = true;
    Ok(())
}

pub fn reset_home_page(snap: &mut Snapshot) {
    clear_home_page(snap);
}

/// Apply `patch` to node `id`.
///
/// Switching a regex node back to literal slugs re-checks its slugs for
/// collisions.
pub fn update(
    snap: &mut Snapshot,
    hasher: &ParameterHasher,
    id: NodeId,
    patch: NodePatch,
) -> Result<()> {
    let was_regex = snap.require_node(id)?.is_regex;
    if let Some(identifier) = &patch.identifier {
        check_identifier(snap, identifier, Some(id))?;
    }
    if let Some(priority) = patch.sitemap_priority {
        check_priority(priority)?;
    }

    let node = snap.node_mut(id)?;
    macro_rules! apply {
        ($($field:ident),* $(,)?) => {
            $(if let Some(value) = patch.$field { node.$field = value; })*
        };
    }
    apply!(
        identifier,
        is_system,
        is_active,
        is_hidden,
        is_regex,
        is_regex_match_arguments,
        is_autogenerate_slug,
        descriptor,
        target,
        layout_name,
        meta_robots,
        sitemap_priority,
        is_sitemap,
        is_show_h1,
    );
    if let Some(parameters) = patch.parameters {
        node.parameters_sum = hasher.hash(&parameters);
        node.parameters = parameters;
    }

    if was_regex && !node.is_regex {
        crate::translation::check_literal_slugs(snap, id)?;
    }
    Ok(())
}
