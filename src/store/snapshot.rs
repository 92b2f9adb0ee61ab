//! An immutable-once-published view of the whole structure.

use std::collections::BTreeMap;

use super::index::{
    self, ContentIndex, Indexes, NodeIndex, SlugIndex, build_content_index, build_node_index,
    build_slug_index,
};
use crate::core::Locale;
use crate::error::{Result, StructureError};
use crate::hash::ParamSum;
use crate::model::{ContentAssociation, ContentId, Descriptor, Node, NodeId, Translation};

/// All nodes, translations and content associations at one point in time.
///
/// Readers hold an `Arc<Snapshot>` and never observe a write in progress.
/// Writers mutate a private clone inside [`Database::write`].
///
/// [`Database::write`]: super::Database::write
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub(super) next_node: u64,
    pub(super) next_content: u64,
    pub(super) nodes: BTreeMap<NodeId, Node>,
    pub(super) translations: BTreeMap<NodeId, BTreeMap<Locale, Translation>>,
    pub(super) contents: BTreeMap<ContentId, ContentAssociation>,
    pub(super) index: Indexes,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            next_node: 1,
            next_content: 1,
            ..Self::default()
        }
    }

    // ========================================================================
    // nodes
    // ========================================================================

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Like [`node`](Self::node) but a missing id is an error.
    pub fn require_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| StructureError::node_not_found(id))
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.identifier == identifier)
    }

    pub fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node.max(1));
        self.next_node = id.0 + 1;
        id
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.index.reset_all();
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| StructureError::node_not_found(id))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.index.reset_all();
        self.nodes.values_mut()
    }

    pub fn insert_node(&mut self, node: Node) {
        self.index.reset_all();
        self.next_node = self.next_node.max(node.id.0 + 1);
        self.nodes.insert(node.id, node);
    }

    /// Remove a node with its translations and content associations.
    ///
    /// Tree bounds of the remaining nodes are left to the caller.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        self.index.reset_all();
        self.translations.remove(&id);
        self.contents.retain(|_, c| c.node != id);
        self.nodes.remove(&id)
    }

    // ========================================================================
    // translations
    // ========================================================================

    pub fn translation(&self, id: NodeId, locale: &Locale) -> Option<&Translation> {
        self.translations.get(&id)?.get(locale)
    }

    /// Translations of one node, ordered by locale code.
    pub fn translations_of(&self, id: NodeId) -> impl Iterator<Item = &Translation> {
        self.translations.get(&id).into_iter().flat_map(|m| m.values())
    }

    /// Every translation, grouped by ascending node id.
    pub fn translations(&self) -> impl Iterator<Item = &Translation> {
        self.translations.values().flat_map(|m| m.values())
    }

    pub fn upsert_translation(&mut self, translation: Translation) {
        self.index.reset_slugs();
        self.translations
            .entry(translation.node)
            .or_default()
            .insert(translation.locale.clone(), translation);
    }

    pub fn remove_translation(&mut self, id: NodeId, locale: &Locale) -> Option<Translation> {
        self.index.reset_slugs();
        let per_node = self.translations.get_mut(&id)?;
        let removed = per_node.remove(locale);
        if per_node.is_empty() {
            self.translations.remove(&id);
        }
        removed
    }

    // ========================================================================
    // content associations
    // ========================================================================

    pub fn contents(&self) -> impl Iterator<Item = &ContentAssociation> {
        self.contents.values()
    }

    pub fn contents_of(&self, id: NodeId) -> impl Iterator<Item = &ContentAssociation> {
        self.contents.values().filter(move |c| c.node == id)
    }

    pub fn allocate_content_id(&mut self) -> ContentId {
        let id = ContentId(self.next_content.max(1));
        self.next_content = id.0 + 1;
        id
    }

    /// Insert an association, updating a built content index in place.
    pub fn insert_content(&mut self, content: ContentAssociation) {
        self.next_content = self.next_content.max(content.id.0 + 1);
        if let Some(node) = self.nodes.get(&content.node)
            && let Some(contents) = self.index.contents.get_mut()
            && node.is_active
        {
            contents
                .entry(index::content_key(&content, node.is_system))
                .or_insert(node.id);
        }
        self.contents.insert(content.id, content);
    }

    pub fn remove_contents_of(&mut self, id: NodeId) -> usize {
        let before = self.contents.len();
        self.contents.retain(|_, c| c.node != id);
        let removed = before - self.contents.len();
        if removed > 0 {
            self.index.reset_contents();
        }
        removed
    }

    // ========================================================================
    // indexes
    // ========================================================================

    fn slug_index(&self) -> &SlugIndex {
        self.index
            .slugs
            .get_or_init(|| build_slug_index(&self.nodes, &self.translations))
    }

    fn node_index(&self) -> &NodeIndex {
        self.index.nodes.get_or_init(|| build_node_index(&self.nodes))
    }

    fn content_index(&self) -> &ContentIndex {
        self.index
            .contents
            .get_or_init(|| build_content_index(&self.nodes, &self.contents))
    }

    /// Owner of a literal slug in `locale`.
    pub fn slug_owner(&self, locale: &Locale, slug_sum: ParamSum) -> Option<NodeId> {
        self.slug_index()
            .literal
            .get(&(locale.clone(), slug_sum))
            .copied()
    }

    /// Regex nodes translated into `locale`, in ascending id order.
    pub fn regex_candidates(&self, locale: &Locale) -> &[NodeId] {
        self.slug_index()
            .regex
            .get(locale)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nodes carrying `presenter:action`, in ascending id order.
    pub fn by_descriptor(&self, presenter: &str, action: &str) -> &[NodeId] {
        self.node_index()
            .descriptors
            .get(&Descriptor::new(presenter, action))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn home_page(&self) -> Option<NodeId> {
        self.node_index().home_page
    }

    /// Active node owning `(factory, parameter sum)` with the given flag.
    pub fn content_node(&self, factory: &str, sum: ParamSum, is_system: bool) -> Option<NodeId> {
        self.content_index()
            .get(&(factory.to_string(), sum, is_system))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{content, node, translation};

    #[test]
    fn test_allocate_ids_are_monotonic() {
        let mut snap = Snapshot::new();
        let a = snap.allocate_node_id();
        snap.insert_node(node(a.0, 1, 2));
        let b = snap.allocate_node_id();
        assert!(b > a);

        snap.insert_node(node(10, 1, 2));
        assert_eq!(snap.allocate_node_id(), NodeId(11));
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut snap = Snapshot::new();
        snap.insert_node(node(1, 1, 2));
        snap.upsert_translation(translation(1, "en", "about"));
        snap.insert_content(content(1, 1, "Article", &[("id", "3")]));

        snap.remove_node(NodeId(1));
        assert!(snap.translation(NodeId(1), &Locale::new("en")).is_none());
        assert_eq!(snap.contents().count(), 0);
    }

    #[test]
    fn test_slug_index_follows_writes() {
        let mut snap = Snapshot::new();
        snap.insert_node(node(1, 1, 2));
        let en = Locale::new("en");
        let t = translation(1, "en", "about");
        let sum = t.slug_sum;
        assert_eq!(snap.slug_owner(&en, sum), None);

        snap.upsert_translation(t);
        assert_eq!(snap.slug_owner(&en, sum), Some(NodeId(1)));

        snap.remove_translation(NodeId(1), &en);
        assert_eq!(snap.slug_owner(&en, sum), None);
    }

    #[test]
    fn test_regex_candidates_in_id_order() {
        let mut snap = Snapshot::new();
        for id in [3, 1, 2] {
            let mut n = node(id, 1, 2);
            n.root = id as u32;
            n.is_regex = true;
            snap.insert_node(n);
            snap.upsert_translation(translation(id, "en", &format!("p{id}-(\\d+)")));
        }
        let ids: Vec<_> = snap.regex_candidates(&Locale::new("en")).to_vec();
        assert_eq!(ids, [NodeId(1), NodeId(2), NodeId(3)]);
        assert!(snap.regex_candidates(&Locale::new("cs")).is_empty());
    }

    #[test]
    fn test_content_index_incremental() {
        let mut snap = Snapshot::new();
        snap.insert_node(node(1, 1, 2));
        let c = content(1, 1, "Article", &[("id", "3")]);
        let sum = c.parameters_sum;

        // Build the index before inserting so the incremental path runs
        assert_eq!(snap.content_node("Article", sum, false), None);
        snap.insert_content(c);
        assert_eq!(snap.content_node("Article", sum, false), Some(NodeId(1)));
        assert_eq!(snap.content_node("Article", sum, true), None);
    }

    #[test]
    fn test_content_index_skips_inactive_nodes() {
        let mut snap = Snapshot::new();
        let mut n = node(1, 1, 2);
        n.is_active = false;
        snap.insert_node(n);
        let c = content(1, 1, "Article", &[]);
        let sum = c.parameters_sum;
        snap.insert_content(c);
        assert_eq!(snap.content_node("Article", sum, false), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut snap = Snapshot::new();
        snap.insert_node(node(1, 1, 2));
        let before = snap.clone();
        snap.node_mut(NodeId(1)).unwrap().identifier = "changed".into();
        assert_eq!(before.node(NodeId(1)).unwrap().identifier, "n1");
    }
}
