//! Tree verification and repair.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{Node, NodeId};
use crate::store::Snapshot;

/// One nested-set inconsistency found by [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeIssue {
    EmptyInterval(NodeId),
    MissingParent { node: NodeId, parent: NodeId },
    OutsideParent { node: NodeId, parent: NodeId },
    WrongLevel { node: NodeId, expected: u32, found: u32 },
    /// Bounds of a root group are not exactly `1..=2k`.
    Gapped { root: u32 },
    SharedRootGroup { root: u32, roots: Vec<NodeId> },
    MultipleHomePages(Vec<NodeId>),
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInterval(id) => write!(f, "node {id} has left >= right"),
            Self::MissingParent { node, parent } => {
                write!(f, "node {node} points at missing parent {parent}")
            }
            Self::OutsideParent { node, parent } => {
                write!(f, "node {node} lies outside the interval of its parent {parent}")
            }
            Self::WrongLevel {
                node,
                expected,
                found,
            } => write!(f, "node {node} has level {found}, expected {expected}"),
            Self::Gapped { root } => write!(f, "root group {root} is not numbered 1..=2k"),
            Self::SharedRootGroup { root, roots } => {
                write!(f, "root group {root} holds {} root nodes", roots.len())
            }
            Self::MultipleHomePages(ids) => write!(f, "{} nodes are flagged as home page", ids.len()),
        }
    }
}

/// Check every nested-set invariant. An empty result means the tree is sound.
pub fn verify(snap: &Snapshot) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    let mut groups: BTreeMap<u32, Vec<&Node>> = BTreeMap::new();

    for node in snap.nodes() {
        groups.entry(node.root).or_default().push(node);

        if node.left >= node.right {
            issues.push(TreeIssue::EmptyInterval(node.id));
        }

        let expected_level = match node.parent {
            None => 0,
            Some(parent_id) => match snap.node(parent_id) {
                None => {
                    issues.push(TreeIssue::MissingParent {
                        node: node.id,
                        parent: parent_id,
                    });
                    continue;
                }
                Some(parent) => {
                    if !parent.contains(node) {
                        issues.push(TreeIssue::OutsideParent {
                            node: node.id,
                            parent: parent_id,
                        });
                    }
                    parent.level + 1
                }
            },
        };
        if node.level != expected_level {
            issues.push(TreeIssue::WrongLevel {
                node: node.id,
                expected: expected_level,
                found: node.level,
            });
        }
    }

    for (root, members) in &groups {
        let roots: Vec<NodeId> = members
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect();
        if roots.len() > 1 {
            issues.push(TreeIssue::SharedRootGroup {
                root: *root,
                roots,
            });
        }

        let mut bounds: Vec<i64> = members.iter().flat_map(|n| [n.left, n.right]).collect();
        bounds.sort_unstable();
        if bounds.iter().zip(1..).any(|(b, expected)| *b != expected) {
            issues.push(TreeIssue::Gapped { root: *root });
        }
    }

    let homes: Vec<NodeId> = snap.nodes().filter(|n| n.is_home_page).map(|n| n.id).collect();
    if homes.len() > 1 {
        issues.push(TreeIssue::MultipleHomePages(homes));
    }

    issues
}

/// Outcome of [`recover`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoverReport {
    /// Nodes whose bounds, level, root key or parent changed.
    pub changed: usize,
    /// Nodes cut loose from a missing or cyclic parent.
    pub detached: Vec<NodeId>,
}

#[derive(Clone, Copy)]
struct Placed {
    left: i64,
    right: i64,
    level: u32,
    root: u32,
}

/// Recompute every bound, level and root key from parent links alone.
///
/// Roots are ordered by their old `(root, left, id)` and renumbered
/// `1..=k`; children are visited depth-first in old `(left, id)` order.
/// Nodes with a dangling parent, or caught in a parent cycle, become
/// roots. Root keys left sparse by removals are compacted even though
/// [`verify`] accepts them; a second run changes nothing.
pub fn recover(snap: &mut Snapshot) -> RecoverReport {
    let mut report = RecoverReport::default();
    let parents = effective_parents(snap, &mut report.detached);

    let mut children: FxHashMap<NodeId, Vec<&Node>> = FxHashMap::default();
    let mut roots: Vec<&Node> = Vec::new();
    for node in snap.nodes() {
        match parents.get(&node.id).copied().flatten() {
            Some(parent) => children.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }
    roots.sort_by_key(|n| (n.root, n.left, n.id));
    for list in children.values_mut() {
        list.sort_by_key(|n| (n.left, n.id));
    }

    let mut placed: FxHashMap<NodeId, Placed> = FxHashMap::default();
    for (index, top) in roots.iter().enumerate() {
        let root = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let mut counter = 0i64;
        // (node, level, children visited)
        let mut stack: Vec<(NodeId, u32, bool)> = vec![(top.id, 0, false)];
        while let Some((id, level, visited)) = stack.pop() {
            counter += 1;
            if visited {
                if let Some(p) = placed.get_mut(&id) {
                    p.right = counter;
                }
                continue;
            }
            placed.insert(
                id,
                Placed {
                    left: counter,
                    right: counter,
                    level,
                    root,
                },
            );
            stack.push((id, level, true));
            if let Some(kids) = children.get(&id) {
                for kid in kids.iter().rev() {
                    stack.push((kid.id, level + 1, false));
                }
            }
        }
    }

    for node in snap.nodes_mut() {
        let parent = parents.get(&node.id).copied().flatten();
        let Some(p) = placed.get(&node.id).copied() else {
            continue;
        };
        if node.left != p.left
            || node.right != p.right
            || node.level != p.level
            || node.root != p.root
            || node.parent != parent
        {
            report.changed += 1;
            node.left = p.left;
            node.right = p.right;
            node.level = p.level;
            node.root = p.root;
            node.parent = parent;
        }
    }

    report
}

/// Parent links with dangling references and cycles cut.
///
/// A cycle is broken at its lowest node id.
fn effective_parents(snap: &Snapshot, detached: &mut Vec<NodeId>) -> FxHashMap<NodeId, Option<NodeId>> {
    let mut parents: FxHashMap<NodeId, Option<NodeId>> = snap
        .nodes()
        .map(|n| {
            let parent = n.parent.filter(|p| snap.node(*p).is_some());
            if n.parent.is_some() && parent.is_none() {
                detached.push(n.id);
            }
            (n.id, parent)
        })
        .collect();

    let mut settled: FxHashSet<NodeId> = FxHashSet::default();
    for start in snap.nodes().map(|n| n.id) {
        let mut trail: Vec<NodeId> = Vec::new();
        let mut on_trail: FxHashSet<NodeId> = FxHashSet::default();
        let mut current = Some(start);
        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if !on_trail.insert(id) {
                // `id` closes a cycle: cut it at its lowest member
                let cycle_start = trail.iter().position(|t| *t == id).unwrap_or(0);
                if let Some(lowest) = trail[cycle_start..].iter().min().copied() {
                    parents.insert(lowest, None);
                    detached.push(lowest);
                }
                break;
            }
            trail.push(id);
            current = parents.get(&id).copied().flatten();
        }
        settled.extend(trail);
    }

    detached.sort();
    detached.dedup();
    parents
}
