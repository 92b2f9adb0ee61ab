//! Shared test fixtures.

use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::core::{ConfiguredLocales, Locale, LocaleProvider, Parameters, params};
use crate::hash::ParameterHasher;
use crate::model::{ContentAssociation, ContentId, NewNode, Node, NodeId, Placement, Translation};
use crate::router::Router;
use crate::slug::SlugGenerator;
use crate::store::{Database, Snapshot};
use crate::structure::Structure;
use crate::translation::TranslationStore;
use crate::tree::{TreeStore, nested};

pub fn en() -> Locale {
    Locale::new("en")
}

pub fn cs() -> Locale {
    Locale::new("cs")
}

/// A bare root-group node with default attributes and identifier `n{id}`.
pub fn node(id: u64, left: i64, right: i64) -> Node {
    let new = NewNode::new(format!("n{id}"));
    Node {
        id: NodeId(id),
        identifier: new.identifier,
        parent: None,
        left,
        right,
        level: 0,
        root: 1,
        is_system: new.is_system,
        is_active: new.is_active,
        is_hidden: new.is_hidden,
        is_home_page: new.is_home_page,
        is_regex: new.is_regex,
        is_regex_match_arguments: new.is_regex_match_arguments,
        is_autogenerate_slug: new.is_autogenerate_slug,
        descriptor: new.descriptor,
        parameters_sum: ParameterHasher::new().hash(&new.parameters),
        parameters: new.parameters,
        target: new.target,
        layout_name: new.layout_name,
        template: new.template,
        meta_robots: new.meta_robots,
        sitemap_priority: new.sitemap_priority,
        is_sitemap: new.is_sitemap,
        is_show_h1: new.is_show_h1,
    }
}

/// Translation whose name equals its slug.
pub fn translation(node: u64, locale: &str, slug: &str) -> Translation {
    Translation {
        node: NodeId(node),
        locale: Locale::new(locale),
        slug: slug.to_string(),
        slug_sum: ParameterHasher::new().hash_str(slug),
        name: slug.to_string(),
        title: String::new(),
        meta_description: String::new(),
        meta_keywords: String::new(),
        h1: String::new(),
        custom_url: None,
    }
}

pub fn content(id: u64, node: u64, factory: &str, pairs: &[(&str, &str)]) -> ContentAssociation {
    let parameters: Parameters = params::from_pairs(pairs.iter().copied());
    ContentAssociation {
        id: ContentId(id),
        node: NodeId(node),
        factory: factory.to_string(),
        parameters_sum: ParameterHasher::new().hash(&parameters),
        parameters,
    }
}

/// Build a tree from `(id, parent)` pairs.
///
/// Parents must precede their children. Roots are placed in list order
/// and each child becomes the last child of its parent.
pub fn build_tree(layout: &[(u64, Option<u64>)]) -> (Snapshot, ParameterHasher) {
    let hasher = ParameterHasher::new();
    let mut snap = Snapshot::new();
    for &(id, parent) in layout {
        let placement = match parent {
            Some(parent) => Placement::LastChildOf(NodeId(parent)),
            None => Placement::Root,
        };
        let allocated = nested::insert(&mut snap, &hasher, NewNode::new(format!("n{id}")), placement)
            .expect("tree fixture insert");
        // Re-key to the requested id
        let mut node = snap.remove_node(allocated).expect("inserted node");
        node.id = NodeId(id);
        snap.insert_node(node);
    }
    (snap, hasher)
}

/// In-memory stores over one database with locales `en` (default) and `cs`.
pub struct Fixture {
    pub structure: Structure,
    pub tree: TreeStore,
    pub translations: TranslationStore,
    pub router: Router,
}

impl Fixture {
    pub fn new() -> Self {
        let db = Arc::new(Database::in_memory());
        let locales: Arc<dyn LocaleProvider> =
            Arc::new(ConfiguredLocales::new(["en", "cs"], "en").expect("fixture locales"));
        let structure = Structure::with_parts(
            db.clone(),
            locales.clone(),
            SlugGenerator::default(),
            LayoutConfig::default(),
            true,
        );
        Self {
            tree: structure.tree().clone(),
            translations: structure.translations().clone(),
            router: Router::new(db, ParameterHasher::new(), locales, true),
            structure,
        }
    }
}
