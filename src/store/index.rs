//! Lookup indexes derived from a snapshot.
//!
//! Each index is built on first use and lives as long as the snapshot it
//! was built from. Writers reset the indexes their change affects, so a
//! published snapshot never carries a stale index.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::core::Locale;
use crate::hash::ParamSum;
use crate::model::{ContentAssociation, ContentId, Descriptor, Node, NodeId, Translation};

/// Literal slugs and regex candidates per locale.
#[derive(Debug, Clone, Default)]
pub struct SlugIndex {
    /// `(locale, slug sum)` → owner, non-regex nodes only.
    pub literal: FxHashMap<(Locale, ParamSum), NodeId>,
    /// Regex nodes with a translation in the locale, ascending id.
    pub regex: FxHashMap<Locale, Vec<NodeId>>,
}

/// Node lookups by descriptor and home-page flag.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    /// Descriptor → nodes carrying it, ascending id.
    pub descriptors: FxHashMap<Descriptor, Vec<NodeId>>,
    pub home_page: Option<NodeId>,
}

/// `(factory, parameter sum, is_system)` key of the content cache.
pub type ContentKey = (String, ParamSum, bool);

/// Content associations of active nodes, first association wins.
pub type ContentIndex = FxHashMap<ContentKey, NodeId>;

#[derive(Debug, Clone, Default)]
pub struct Indexes {
    pub slugs: OnceLock<SlugIndex>,
    pub nodes: OnceLock<NodeIndex>,
    pub contents: OnceLock<ContentIndex>,
}

impl Indexes {
    /// Node attributes changed: every index may be affected.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Only translations changed.
    pub fn reset_slugs(&mut self) {
        self.slugs = OnceLock::new();
    }

    pub fn reset_contents(&mut self) {
        self.contents = OnceLock::new();
    }
}

pub fn build_slug_index(
    nodes: &BTreeMap<NodeId, Node>,
    translations: &BTreeMap<NodeId, BTreeMap<Locale, Translation>>,
) -> SlugIndex {
    let mut index = SlugIndex::default();
    for (id, per_locale) in translations {
        let Some(node) = nodes.get(id) else { continue };
        for (locale, translation) in per_locale {
            if node.is_regex {
                index.regex.entry(locale.clone()).or_default().push(*id);
            } else {
                index
                    .literal
                    .entry((locale.clone(), translation.slug_sum))
                    .or_insert(*id);
            }
        }
    }
    index
}

pub fn build_node_index(nodes: &BTreeMap<NodeId, Node>) -> NodeIndex {
    let mut index = NodeIndex::default();
    for node in nodes.values() {
        if let Some(descriptor) = &node.descriptor {
            index
                .descriptors
                .entry(descriptor.clone())
                .or_default()
                .push(node.id);
        }
        if node.is_home_page && index.home_page.is_none() {
            index.home_page = Some(node.id);
        }
    }
    index
}

pub fn build_content_index(
    nodes: &BTreeMap<NodeId, Node>,
    contents: &BTreeMap<ContentId, ContentAssociation>,
) -> ContentIndex {
    let mut index = ContentIndex::default();
    for content in contents.values() {
        if let Some(node) = nodes.get(&content.node)
            && node.is_active
        {
            index
                .entry(content_key(content, node.is_system))
                .or_insert(node.id);
        }
    }
    index
}

pub fn content_key(content: &ContentAssociation, is_system: bool) -> ContentKey {
    (content.factory.clone(), content.parameters_sum, is_system)
}
