//! Service facade wiring the stores, the router and the component registry.
//!
//! Also hosts the two operations that span several stores: component
//! auto-creation and structure repair.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{LayoutConfig, StructureConfig};
use crate::content::ContentStore;
use crate::core::{ConfiguredLocales, Locale, LocaleProvider, Parameters};
use crate::error::Result;
use crate::hash::ParameterHasher;
use crate::model::{NewNode, Node, NodeId, Placement, TranslationInput};
use crate::registry::{ActionOption, ComponentRegistry, ResolvedAction};
use crate::router::Router;
use crate::slug::SlugGenerator;
use crate::store::{Database, Snapshot};
use crate::translation::TranslationStore;
use crate::tree::{self, TreeIssue, TreeStore, nested};
use crate::log;

/// Priority given to auto-created pages.
const AUTO_SITEMAP_PRIORITY: f32 = 0.4;

/// Hex digits of the content hash appended to auto-created identifiers.
const IDENTIFIER_HASH_LEN: usize = 32;

pub struct Structure {
    db: Arc<Database>,
    hasher: ParameterHasher,
    locales: Arc<dyn LocaleProvider>,
    layout: LayoutConfig,
    tree: TreeStore,
    translations: TranslationStore,
    contents: ContentStore,
    router: Router,
    registry: Arc<ComponentRegistry>,
}

/// Outcome of [`Structure::fix`].
#[derive(Debug, Default)]
pub struct FixReport {
    /// Nodes lacking a translation in an active locale.
    pub missing: Vec<(NodeId, Locale)>,
    /// System nodes removed because of a missing translation.
    pub purged: Vec<NodeId>,
    /// Tree inconsistencies left after purging.
    pub issues: Vec<TreeIssue>,
}

impl Structure {
    /// Open the snapshot file named by `[store] path`.
    pub fn open(config: &StructureConfig) -> Result<Self> {
        let db = Database::open(&config.store.path)?;
        Self::new(config, Arc::new(db))
    }

    pub fn new(config: &StructureConfig, db: Arc<Database>) -> Result<Self> {
        let locales: Arc<dyn LocaleProvider> =
            Arc::new(ConfiguredLocales::from_config(&config.locale)?);
        Ok(Self::with_parts(
            db,
            locales,
            SlugGenerator::new(&config.slug),
            config.layout.clone(),
            config.router.regex_case_insensitive,
        ))
    }

    pub fn with_parts(
        db: Arc<Database>,
        locales: Arc<dyn LocaleProvider>,
        slugs: SlugGenerator,
        layout: LayoutConfig,
        regex_case_insensitive: bool,
    ) -> Self {
        let hasher = ParameterHasher::new();
        Self {
            tree: TreeStore::new(db.clone(), hasher),
            translations: TranslationStore::new(db.clone(), hasher, slugs),
            contents: ContentStore::new(db.clone(), hasher),
            router: Router::new(db.clone(), hasher, locales.clone(), regex_case_insensitive),
            registry: Arc::new(ComponentRegistry::new()),
            db,
            hasher,
            locales,
            layout,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn locales(&self) -> &dyn LocaleProvider {
        self.locales.as_ref()
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.translations
    }

    pub fn contents(&self) -> &ContentStore {
        &self.contents
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // ========================================================================
    // auto-creation
    // ========================================================================

    /// Node hosting component action `name` (`Module\Component\action`)
    /// with `parameters`, created on first use.
    ///
    /// Placements made by the system are preferred over editor-made ones.
    /// Concurrent callers for the same key all get the same node: the
    /// lookup is repeated inside the write before anything is inserted.
    pub fn find_component_action_presenter(&self, name: &str, parameters: &Parameters) -> Result<Node> {
        let resolved = self.registry.resolve(name)?;
        if let Some(node) = self.find_placement(&resolved.factory, parameters) {
            return Ok(node);
        }

        let option = resolved.provider.action_option(&resolved.action, parameters);
        let identifier = self.auto_identifier(&option, &resolved, parameters);
        let sum = self.hasher.hash(parameters);

        let (id, created) = self.db.write(|snap| {
            if let Some(existing) = placement_in(snap, &resolved.factory, sum) {
                return Ok((existing, false));
            }
            let id = self.create_component_page(snap, &identifier, &option)?;
            self.contents
                .attach_in(snap, id, &resolved.factory, parameters.clone())?;
            Ok((id, true))
        })?;

        if created {
            log!("structure"; "created {} `{}` for {}", id, identifier, name);
        } else {
            log!("structure"; "{} was created concurrently, reusing {}", name, id);
        }
        self.tree.get(id)
    }

    fn find_placement(&self, factory: &str, parameters: &Parameters) -> Option<Node> {
        self.contents
            .get_one_by_factory_and_parameters(factory, parameters, true)
            .or_else(|| {
                self.contents
                    .get_one_by_factory_and_parameters(factory, parameters, false)
            })
    }

    fn auto_identifier(
        &self,
        option: &ActionOption,
        resolved: &ResolvedAction,
        parameters: &Parameters,
    ) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let encoded = serde_json::to_string(parameters).unwrap_or_default();
        let digest = self
            .hasher
            .hash_str(&format!("{nanos}{}{encoded}", resolved.action))
            .to_hex();
        format!("{}-{}", option.identifier, &digest[..IDENTIFIER_HASH_LEN])
    }

    fn create_component_page(
        &self,
        snap: &mut Snapshot,
        identifier: &str,
        option: &ActionOption,
    ) -> Result<NodeId> {
        let mut new = NewNode::new(identifier).system().hidden();
        new.layout_name = self.layout.default.clone();
        new.sitemap_priority = AUTO_SITEMAP_PRIORITY;
        new.is_show_h1 = false;
        let id = nested::insert(snap, &self.hasher, new, Placement::Root)?;

        let slugs = self.translations.slug_generator();
        if option.translations.is_empty() {
            let label = &option.identifier;
            for locale in self.locales.active() {
                let slug = self
                    .translations
                    .unique_slug(snap, &locale, &slugs.webalize(label));
                let input = TranslationInput::named(label.as_str()).with_slug(slug);
                self.translations.translate_in(snap, id, &locale, input)?;
            }
        } else {
            for text in &option.translations {
                let base = text
                    .slug
                    .clone()
                    .unwrap_or_else(|| slugs.webalize(&text.name));
                let input = TranslationInput {
                    name: text.name.clone(),
                    title: text.title.clone(),
                    meta_description: text.meta_description.clone(),
                    meta_keywords: text.meta_keywords.clone(),
                    h1: text.name.clone(),
                    slug: Some(self.translations.unique_slug(snap, &text.locale, &base)),
                    custom_url: None,
                };
                self.translations
                    .translate_in(snap, id, &text.locale, input)?;
            }
        }
        Ok(id)
    }

    // ========================================================================
    // repair
    // ========================================================================

    /// Report untranslated nodes and purge untranslated system nodes.
    pub fn fix(&self) -> Result<FixReport> {
        let active = self.locales.active();
        let missing = self.translations.missing(&active);

        let purged = self.db.write(|snap| {
            let mut purged: Vec<NodeId> = Vec::new();
            for (id, _) in &missing {
                let is_system = snap.node(*id).is_some_and(|n| n.is_system);
                if is_system && !purged.contains(id) {
                    purged.extend(nested::remove(snap, *id)?);
                }
            }
            purged.sort();
            purged.dedup();
            Ok(purged)
        })?;

        for (id, locale) in &missing {
            log!("fix"; "{} has no translation in `{}`", id, locale);
        }
        if !purged.is_empty() {
            log!("fix"; "purged {}", crate::utils::plural_count(purged.len(), "system node"));
        }

        Ok(FixReport {
            missing,
            purged,
            issues: tree::verify(&self.db.read()),
        })
    }
}

/// Node already hosting `(factory, sum)`, system placements first.
fn placement_in(snap: &Snapshot, factory: &str, sum: crate::hash::ParamSum) -> Option<NodeId> {
    snap.content_node(factory, sum, true)
        .or_else(|| snap.content_node(factory, sum, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::from_pairs;
    use crate::registry::{ActionOptionTranslation, ComponentProvider};
    use crate::testing::{Fixture, cs, en};

    struct Articles;

    impl ComponentProvider for Articles {
        fn action_option(&self, action: &str, parameters: &Parameters) -> ActionOption {
            match action {
                "Detail" => {
                    let id = parameters
                        .get("id")
                        .map(crate::core::params::value_to_string)
                        .unwrap_or_default();
                    ActionOption::new(format!("Article {id}")).with_translation(
                        ActionOptionTranslation {
                            locale: en(),
                            name: format!("Article {id}"),
                            title: format!("Article {id}"),
                            meta_description: String::new(),
                            meta_keywords: String::new(),
                            slug: None,
                        },
                    )
                }
                _ => ActionOption::new("Search"),
            }
        }
    }

    fn fixture() -> Fixture {
        let f = Fixture::new();
        let registry = f.structure.registry();
        registry.add_component("Article", "Article", Arc::new(Articles));
        registry
            .add_action("Article", "Article", "Detail", "article.detail")
            .unwrap();
        registry
            .add_action("Article", "Article", "Search", "article.search")
            .unwrap();
        f
    }

    #[test]
    fn test_auto_creation_is_idempotent() {
        let f = fixture();
        let params = from_pairs([("id", "7")]);

        let first = f
            .structure
            .find_component_action_presenter("Article\\Article\\Detail", &params)
            .unwrap();
        assert!(first.is_system);
        assert!(first.is_hidden);
        assert!(first.is_active);
        assert!(!first.is_show_h1);
        assert_eq!(first.sitemap_priority, AUTO_SITEMAP_PRIORITY);
        assert!(first.identifier.starts_with("Article 7-"));
        assert_eq!(first.identifier.len(), "Article 7-".len() + IDENTIFIER_HASH_LEN);

        let again = f
            .structure
            .find_component_action_presenter("Article\\Article\\Detail", &params)
            .unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(f.structure.database().read().node_count(), 1);

        let slug = f.structure.translations().get_slug(first.id, &en());
        assert_eq!(slug.as_deref(), Some("article-7"));
        let hit = f.router.match_path("article-7", &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, first.id);
    }

    #[test]
    fn test_auto_creation_uses_label_in_every_locale() {
        let f = fixture();
        let node = f
            .structure
            .find_component_action_presenter("Article\\Article\\Search", &Parameters::new())
            .unwrap();
        for locale in [en(), cs()] {
            let t = f.structure.translations().get_translation(node.id, &locale).unwrap();
            assert_eq!(t.name, "Search");
            assert_eq!(t.slug, "search");
        }

        // A second placement with other parameters gets a suffixed slug
        let other = f
            .structure
            .find_component_action_presenter("Article\\Article\\Search", &from_pairs([("q", "x")]))
            .unwrap();
        assert_ne!(other.id, node.id);
        assert_eq!(
            f.structure.translations().get_slug(other.id, &en()).as_deref(),
            Some("search-2")
        );
    }

    #[test]
    fn test_existing_editor_placement_is_reused() {
        let f = fixture();
        let page = f
            .tree
            .create(NewNode::new("articles"), Placement::Root)
            .unwrap();
        let params = from_pairs([("id", "1")]);
        f.structure
            .contents()
            .attach(page, "article.detail", params.clone())
            .unwrap();

        let node = f
            .structure
            .find_component_action_presenter("Article\\Article\\Detail", &params)
            .unwrap();
        assert_eq!(node.id, page);
    }

    #[test]
    fn test_unknown_component_action_fails() {
        let f = fixture();
        assert!(
            f.structure
                .find_component_action_presenter("Article\\Article\\Nope", &Parameters::new())
                .is_err()
        );
        assert_eq!(f.structure.database().read().node_count(), 0);
    }

    #[test]
    fn test_concurrent_auto_creation_converges() {
        let f = fixture();
        let params = from_pairs([("id", "42")]);
        let ids: Vec<NodeId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        f.structure
                            .find_component_action_presenter("Article\\Article\\Detail", &params)
                            .unwrap()
                            .id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(f.structure.database().read().node_count(), 1);
    }

    #[test]
    fn test_fix_purges_untranslated_system_nodes() {
        let f = fixture();
        let system = f
            .tree
            .create(NewNode::new("sys").system(), Placement::Root)
            .unwrap();
        let content = f.tree.create(NewNode::new("page"), Placement::Root).unwrap();
        f.translations
            .translate(system, &en(), TranslationInput::named("Sys"))
            .unwrap();

        let report = f.structure.fix().unwrap();
        assert_eq!(report.purged, [system]);
        assert!(report.missing.contains(&(content, en())));
        assert!(report.issues.is_empty());
        assert!(f.tree.get(system).is_err());
        assert!(f.tree.get(content).is_ok());
    }
}
