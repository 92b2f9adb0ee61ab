//! Path ⇄ node resolution.
//!
//! # Matching order
//!
//! 1. Split an optional leading locale segment off the path. An unknown
//!    first segment keeps the whole path as the slug, in the default locale.
//! 2. Exact literal slug in that locale.
//! 3. Regex slugs of that locale, in ascending node id.
//! 4. Home page, for an empty slug.
//!
//! Parameters merge as `static < regex captures < query`.

mod sitemap;

pub use sitemap::{Sitemap, SitemapEntry};

use std::borrow::Cow;
use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::ConfigError;
use crate::core::params::{self, merge, to_query_string};
use crate::core::{Locale, LocaleProvider, Parameters, RequestPath};
use crate::error::{Result, StructureError};
use crate::hash::ParameterHasher;
use crate::model::{Descriptor, Node, NodeId};
use crate::store::{Database, Snapshot};
use crate::{debug, log};

/// Keys that name the route itself and never reach the query string.
const RESERVED_KEYS: [&str; 4] = ["presenter", "action", "locale", "slug"];

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Exact,
    Regex,
    HomePage,
}

/// A resolved request.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMatch {
    pub node: Node,
    pub locale: Locale,
    pub parameters: Parameters,
    pub kind: MatchKind,
}

impl RouteMatch {
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.node.descriptor.as_ref()
    }
}

pub struct Router {
    db: Arc<Database>,
    hasher: ParameterHasher,
    locales: Arc<dyn LocaleProvider>,
    case_insensitive: bool,
    /// Compiled, anchored patterns keyed by their source slug.
    patterns: DashMap<String, Regex>,
}

impl Router {
    pub fn new(
        db: Arc<Database>,
        hasher: ParameterHasher,
        locales: Arc<dyn LocaleProvider>,
        case_insensitive: bool,
    ) -> Self {
        Self {
            db,
            hasher,
            locales,
            case_insensitive,
            patterns: DashMap::new(),
        }
    }

    pub fn locales(&self) -> &dyn LocaleProvider {
        self.locales.as_ref()
    }

    // ========================================================================
    // matching
    // ========================================================================

    /// Match a browser path. A query part in `path` is parsed too; keys in
    /// `query` win over it.
    pub fn match_path(&self, path: &str, query: &Parameters) -> Result<RouteMatch> {
        let mut merged = match path.split_once('?') {
            Some((_, inline)) => params::from_query_string(inline.split('#').next().unwrap_or_default()),
            None => Parameters::new(),
        };
        merge(&mut merged, query);
        self.match_request(&RequestPath::from_browser(path), &merged)
    }

    pub fn match_request(&self, path: &RequestPath, query: &Parameters) -> Result<RouteMatch> {
        self.ensure_locales()?;
        let (code, slug) = path.split_locale(|code| self.locales.is_active(code));
        let locale = match code {
            Some(code) => Locale::new(code),
            None => self.locales.default_locale(),
        };
        self.match_slug(&locale, slug, query)
    }

    /// Resolve `slug` (no locale segment) in `locale`.
    pub fn match_slug(&self, locale: &Locale, slug: &str, query: &Parameters) -> Result<RouteMatch> {
        let snap = self.db.read();
        let slug = slug.trim_matches('/');

        if let Some(id) = snap.slug_owner(locale, self.hasher.hash_str(slug))
            && let Some(node) = snap.node(id)
        {
            debug!("route"; "exact `{}` [{}] -> {}", slug, locale, id);
            return Ok(found(node, locale, Parameters::new(), query, MatchKind::Exact));
        }

        if let Some(hit) = self.match_regex(&snap, locale, slug, query) {
            return Ok(hit);
        }

        if slug.is_empty()
            && let Some(node) = snap.home_page().and_then(|id| snap.node(id))
        {
            debug!("route"; "home page [{}] -> {}", locale, node.id);
            return Ok(found(node, locale, Parameters::new(), query, MatchKind::HomePage));
        }

        Err(StructureError::NotFound(format!("path `{slug}` in `{locale}`")))
    }

    fn match_regex(
        &self,
        snap: &Snapshot,
        locale: &Locale,
        slug: &str,
        query: &Parameters,
    ) -> Option<RouteMatch> {
        for id in snap.regex_candidates(locale) {
            let (Some(node), Some(translation)) = (snap.node(*id), snap.translation(*id, locale)) else {
                continue;
            };
            let pattern = match self.pattern(&translation.slug) {
                Ok(pattern) => pattern,
                Err(err) => {
                    log!("route"; "skipping {}: {}", id, err);
                    continue;
                }
            };

            let subject: Cow<'_, str> = if node.is_regex_match_arguments && !query.is_empty() {
                Cow::Owned(format!("{slug}?{}", to_query_string(query)))
            } else {
                Cow::Borrowed(slug)
            };
            let Some(captures) = pattern.captures(&subject) else {
                continue;
            };

            let mut captured = Parameters::new();
            for name in pattern.capture_names().flatten() {
                if let Some(value) = captures.name(name) {
                    captured.insert(name.to_string(), Value::String(value.as_str().to_string()));
                }
            }
            debug!("route"; "regex `{}` [{}] -> {}", slug, locale, id);
            return Some(found(node, locale, captured, query, MatchKind::Regex));
        }
        None
    }

    /// Anchored, compiled form of a regex slug, cached across snapshots.
    fn pattern(&self, source: &str) -> Result<Regex> {
        if let Some(cached) = self.patterns.get(source) {
            return Ok(cached.clone());
        }
        let flags = if self.case_insensitive { "(?i)" } else { "" };
        let compiled = Regex::new(&format!("{flags}^(?:{source})$")).map_err(|source_err| {
            StructureError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            }
        })?;
        self.patterns.insert(source.to_string(), compiled.clone());
        Ok(compiled)
    }

    // ========================================================================
    // construction
    // ========================================================================

    /// Canonical path of the node carrying `presenter:action`.
    ///
    /// Among several such nodes the one whose static parameters all appear
    /// in `params` wins, preferring the most specific; ties and misses go
    /// to the lowest id.
    pub fn construct_path(
        &self,
        presenter: &str,
        action: &str,
        params: &Parameters,
        locale: Option<&str>,
    ) -> Result<String> {
        self.ensure_locales()?;
        let snap = self.db.read();
        let candidates = snap.by_descriptor(presenter, action);
        let node = pick_candidate(&snap, candidates, params).ok_or_else(|| {
            StructureError::NotConstructible(format!("no node for {presenter}:{action}"))
        })?;
        let locale = self.target_locale(locale, params);
        self.build_path(&snap, node, params, &locale)
    }

    /// Canonical path of node `id`.
    pub fn construct_node_path(
        &self,
        id: NodeId,
        params: &Parameters,
        locale: Option<&str>,
    ) -> Result<String> {
        self.ensure_locales()?;
        let snap = self.db.read();
        let node = snap.require_node(id)?;
        let locale = self.target_locale(locale, params);
        self.build_path(&snap, node, params, &locale)
    }

    fn target_locale(&self, explicit: Option<&str>, params: &Parameters) -> Locale {
        let requested = explicit.or_else(|| params.get("locale").and_then(Value::as_str));
        self.locales.resolve(requested)
    }

    fn build_path(
        &self,
        snap: &Snapshot,
        node: &Node,
        params: &Parameters,
        locale: &Locale,
    ) -> Result<String> {
        let is_default = *locale == self.locales.default_locale();

        let path = if node.is_home_page {
            if is_default { "/".to_string() } else { format!("/{locale}") }
        } else {
            let translation = snap.translation(node.id, locale).ok_or_else(|| {
                StructureError::NotConstructible(format!(
                    "node {} has no translation in `{locale}`",
                    node.id
                ))
            })?;
            if let Some(url) = &translation.custom_url {
                return Ok(url.clone());
            }
            if node.is_regex {
                return Err(StructureError::NotConstructible(format!(
                    "node {} has a pattern slug and no custom URL",
                    node.id
                )));
            }
            let slug = RequestPath::from_decoded(&translation.slug);
            // A leading locale code would be read back as the locale segment
            let (shadowed, _) = slug.split_locale(|code| self.locales.is_active(code));
            if is_default && shadowed.is_none() {
                slug.to_encoded()
            } else {
                format!("/{locale}{}", slug.to_encoded())
            }
        };

        let residual: Parameters = params
            .iter()
            .filter(|(key, value)| {
                !RESERVED_KEYS.contains(&key.as_str()) && node.parameters.get(*key) != Some(*value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(if residual.is_empty() {
            path
        } else {
            format!("{path}?{}", to_query_string(&residual))
        })
    }

    fn ensure_locales(&self) -> Result<()> {
        if self.locales.active().is_empty() {
            return Err(ConfigError::Validation("active locale set is empty".into()).into());
        }
        Ok(())
    }

    // ========================================================================
    // sitemap
    // ========================================================================

    /// Constructible active nodes flagged for the sitemap, in tree order.
    pub fn sitemap(&self, locale: &Locale) -> Vec<SitemapEntry> {
        let snap = self.db.read();
        let mut nodes: Vec<&Node> = snap
            .nodes()
            .filter(|n| n.is_active && n.is_sitemap)
            .collect();
        nodes.sort_by_key(|n| (n.root, n.left));

        nodes
            .into_iter()
            .filter_map(|node| {
                let path = self
                    .build_path(&snap, node, &Parameters::new(), locale)
                    .ok()?;
                Some(SitemapEntry {
                    node: node.id,
                    path,
                    priority: node.sitemap_priority,
                })
            })
            .collect()
    }
}

fn found(
    node: &Node,
    locale: &Locale,
    captured: Parameters,
    query: &Parameters,
    kind: MatchKind,
) -> RouteMatch {
    let mut parameters = node.parameters.clone();
    merge(&mut parameters, &captured);
    merge(&mut parameters, query);
    RouteMatch {
        node: node.clone(),
        locale: locale.clone(),
        parameters,
        kind,
    }
}

fn pick_candidate<'a>(snap: &'a Snapshot, candidates: &[NodeId], params: &Parameters) -> Option<&'a Node> {
    let mut best: Option<&Node> = None;
    for node in candidates.iter().filter_map(|id| snap.node(*id)) {
        let satisfied = node
            .parameters
            .iter()
            .all(|(key, value)| params.get(key) == Some(value));
        if satisfied && best.is_none_or(|b| node.parameters.len() > b.parameters.len()) {
            best = Some(node);
        }
    }
    best.or_else(|| candidates.iter().find_map(|id| snap.node(*id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::from_pairs;
    use crate::model::{NewNode, Placement, TranslationInput};
    use crate::testing::{Fixture, cs, en};

    fn page(f: &Fixture, identifier: &str, slug: &str) -> NodeId {
        let id = f
            .tree
            .create(
                NewNode::new(identifier).with_descriptor("Front:Page", identifier),
                Placement::Root,
            )
            .unwrap();
        f.translations
            .translate(id, &en(), TranslationInput::named(identifier).with_slug(slug))
            .unwrap();
        id
    }

    fn regex_page(f: &Fixture, identifier: &str, pattern: &str, match_arguments: bool) -> NodeId {
        let id = f
            .tree
            .create(NewNode::new(identifier).regex(match_arguments), Placement::Root)
            .unwrap();
        f.translations
            .translate(id, &en(), TranslationInput::named(identifier).with_slug(pattern))
            .unwrap();
        id
    }

    #[test]
    fn test_scenario_exact_match() {
        let f = Fixture::new();
        let id = page(&f, "about", "about-us");

        let hit = f.router.match_path("/about-us", &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, id);
        assert_eq!(hit.kind, MatchKind::Exact);
        assert!(hit.parameters.is_empty());
        assert_eq!(hit.locale, en());
    }

    #[test]
    fn test_scenario_regex_capture() {
        let f = Fixture::new();
        let id = regex_page(&f, "product", r"product-(?P<id>\d+)", false);

        let hit = f.router.match_path("product-42", &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, id);
        assert_eq!(hit.kind, MatchKind::Regex);
        assert_eq!(hit.parameters["id"], "42");

        // Full match only
        assert!(f.router.match_path("product-42/extra", &Parameters::new()).is_err());
    }

    #[test]
    fn test_scenario_home_page_fallback() {
        let f = Fixture::new();
        let home = page(&f, "home", "welcome");
        f.tree.set_home_page(home).unwrap();

        let hit = f.router.match_path("", &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, home);
        assert_eq!(hit.kind, MatchKind::HomePage);

        let hit = f.router.match_path("/cs/", &Parameters::new()).unwrap();
        assert_eq!(hit.locale, cs());
        assert_eq!(hit.kind, MatchKind::HomePage);
    }

    #[test]
    fn test_exact_beats_regex_and_regex_order_is_stable() {
        let f = Fixture::new();
        let first = regex_page(&f, "first", r"item-.*", false);
        let _second = regex_page(&f, "second", r"item-(?P<n>\d+)", false);
        let literal = page(&f, "literal", "item-7");

        for _ in 0..3 {
            let hit = f.router.match_path("item-99", &Parameters::new()).unwrap();
            assert_eq!(hit.node.id, first);
        }
        assert_eq!(f.router.match_path("item-7", &Parameters::new()).unwrap().node.id, literal);
    }

    #[test]
    fn test_parameter_precedence() {
        let f = Fixture::new();
        let id = f
            .tree
            .create(
                NewNode::new("list")
                    .regex(false)
                    .with_parameters(from_pairs([("page", "1"), ("id", "0"), ("sort", "asc")])),
                Placement::Root,
            )
            .unwrap();
        f.translations
            .translate(id, &en(), TranslationInput::named("list").with_slug(r"list-(?P<id>\d+)"))
            .unwrap();

        let hit = f
            .router
            .match_path("list-5?sort=desc", &from_pairs([("page", "3")]))
            .unwrap();
        assert_eq!(hit.parameters["id"], "5");
        assert_eq!(hit.parameters["page"], "3");
        assert_eq!(hit.parameters["sort"], "desc");
    }

    #[test]
    fn test_regex_matches_arguments_when_flagged() {
        let f = Fixture::new();
        let id = regex_page(&f, "search", r"search\?q=(?P<term>\w+)", true);

        let hit = f
            .router
            .match_path("search", &from_pairs([("q", "shoes")]))
            .unwrap();
        assert_eq!(hit.node.id, id);
        assert_eq!(hit.parameters["term"], "shoes");
        assert!(f.router.match_path("search", &Parameters::new()).is_err());
    }

    #[test]
    fn test_unknown_first_segment_uses_default_locale() {
        let f = Fixture::new();
        let id = page(&f, "docs", "de/docs");
        let hit = f.router.match_path("/de/docs", &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, id);
        assert_eq!(hit.locale, en());
    }

    #[test]
    fn test_slug_named_after_active_locale_keeps_prefix() {
        let f = Fixture::new();
        let id = f
            .tree
            .create(NewNode::new("cs-page").with_descriptor("Front:Page", "cs"), Placement::Root)
            .unwrap();
        let stored = f.translations.translate(id, &en(), TranslationInput::named("CS")).unwrap();
        assert_eq!(stored.slug, "cs");

        let path = f.router.construct_node_path(id, &Parameters::new(), None).unwrap();
        assert_eq!(path, "/en/cs");
        let hit = f.router.match_path(&path, &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, id);
        assert_eq!(hit.locale, en());

        let nested = page(&f, "nested", "cs/about");
        let path = f.router.construct_node_path(nested, &Parameters::new(), None).unwrap();
        assert_eq!(path, "/en/cs/about");
        assert_eq!(f.router.match_path(&path, &Parameters::new()).unwrap().node.id, nested);
    }

    #[test]
    fn test_repeated_slashes_in_slug_round_trip() {
        let f = Fixture::new();
        let id = page(&f, "ab", "/a//b/");
        assert_eq!(f.structure.database().read().translation(id, &en()).unwrap().slug, "a/b");

        let path = f.router.construct_node_path(id, &Parameters::new(), None).unwrap();
        assert_eq!(path, "/a/b");
        assert_eq!(f.router.match_path(&path, &Parameters::new()).unwrap().node.id, id);
    }

    #[test]
    fn test_not_found() {
        let f = Fixture::new();
        let err = f.router.match_path("/nowhere", &Parameters::new()).unwrap_err();
        assert!(err.is_not_found());
        // No home page configured
        assert!(f.router.match_path("/", &Parameters::new()).is_err());
    }

    #[test]
    fn test_construct_path_with_locale_prefix_and_query() {
        let f = Fixture::new();
        let id = page(&f, "about", "about-us");
        f.translations
            .translate(id, &cs(), TranslationInput::named("o-nas"))
            .unwrap();

        let en_path = f
            .router
            .construct_path("Front:Page", "about", &Parameters::new(), None)
            .unwrap();
        assert_eq!(en_path, "/about-us");

        let cs_path = f
            .router
            .construct_path("Front:Page", "about", &from_pairs([("ref", "mail box")]), Some("cs"))
            .unwrap();
        assert_eq!(cs_path, "/cs/o-nas?ref=mail+box");
    }

    #[test]
    fn test_construct_home_page_and_custom_url() {
        let f = Fixture::new();
        let home = page(&f, "home", "welcome");
        f.tree.set_home_page(home).unwrap();
        let ext = page(&f, "ext", "external");
        f.translations
            .translate(
                ext,
                &en(),
                TranslationInput::named("ext").with_custom_url("https://example.org/x"),
            )
            .unwrap();

        let p = Parameters::new();
        assert_eq!(f.router.construct_path("Front:Page", "home", &p, None).unwrap(), "/");
        assert_eq!(f.router.construct_path("Front:Page", "home", &p, Some("cs")).unwrap(), "/cs");
        assert_eq!(
            f.router.construct_path("Front:Page", "ext", &p, Some("cs")).unwrap_err().to_string(),
            StructureError::NotConstructible(format!("node {ext} has no translation in `cs`"))
                .to_string()
        );
        assert_eq!(
            f.router.construct_path("Front:Page", "ext", &p, None).unwrap(),
            "https://example.org/x"
        );
    }

    #[test]
    fn test_construct_unknown_descriptor_is_not_constructible() {
        let f = Fixture::new();
        let err = f
            .router
            .construct_path("Front:Nope", "default", &Parameters::new(), None)
            .unwrap_err();
        assert!(matches!(err, StructureError::NotConstructible(_)));
    }

    #[test]
    fn test_construct_picks_node_by_static_parameters() {
        let f = Fixture::new();
        let mut ids = Vec::new();
        for (identifier, article) in [("a1", "1"), ("a2", "2")] {
            let id = f
                .tree
                .create(
                    NewNode::new(identifier)
                        .with_descriptor("Article:Article", "detail")
                        .with_parameters(from_pairs([("id", article)])),
                    Placement::Root,
                )
                .unwrap();
            f.translations
                .translate(id, &en(), TranslationInput::named(identifier))
                .unwrap();
            ids.push(id);
        }

        let path = f
            .router
            .construct_path("Article:Article", "detail", &from_pairs([("id", "2")]), None)
            .unwrap();
        assert_eq!(path, "/a2");
        let hit = f.router.match_path(&path, &Parameters::new()).unwrap();
        assert_eq!(hit.node.id, ids[1]);
        assert_eq!(hit.parameters, from_pairs([("id", "2")]));
    }

    #[test]
    fn test_round_trip_for_literal_nodes() {
        let f = Fixture::new();
        let parent = page(&f, "blog", "blog");
        let child = f
            .tree
            .insert_as_last_child_of(
                NewNode::new("post")
                    .with_descriptor("Blog:Post", "detail")
                    .with_parameters(from_pairs([("id", "9")])),
                parent,
            )
            .unwrap();
        for locale in [en(), cs()] {
            f.translations
                .translate(child, &locale, TranslationInput::named("Hello Wörld"))
                .unwrap();
        }

        for locale in ["en", "cs"] {
            let node = f.tree.get(child).unwrap();
            let path = f
                .router
                .construct_path("Blog:Post", "detail", &node.parameters, Some(locale))
                .unwrap();
            let hit = f.router.match_path(&path, &Parameters::new()).unwrap();
            assert_eq!(hit.node.id, child);
            assert_eq!(hit.parameters, node.parameters);
            assert_eq!(hit.locale, Locale::new(locale));
        }
    }

    #[test]
    fn test_regex_node_is_not_constructible() {
        let f = Fixture::new();
        let id = regex_page(&f, "product", r"product-(?P<id>\d+)", false);
        let err = f
            .router
            .construct_node_path(id, &Parameters::new(), None)
            .unwrap_err();
        assert!(matches!(err, StructureError::NotConstructible(_)));
    }

    #[test]
    fn test_sitemap_lists_constructible_nodes() {
        let f = Fixture::new();
        let a = page(&f, "a", "a");
        let _pattern = regex_page(&f, "p", r"p-\d+", false);
        let hidden = page(&f, "b", "b");
        f.tree
            .update(
                hidden,
                crate::model::NodePatch {
                    is_sitemap: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let entries = f.router.sitemap(&en());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node, a);
        assert_eq!(entries[0].path, "/a");
    }
}
