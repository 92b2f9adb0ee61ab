//! Per-locale translations and slug management.
//!
//! Literal slugs are unique per locale, keyed by the hash of the slug.
//! Regex nodes store a pattern in `slug` and are exempt from uniqueness,
//! since overlapping patterns are resolved by creation order.

use std::sync::Arc;

use regex::Regex;

use crate::core::{Locale, RequestPath};
use crate::debug;
use crate::error::{Conflict, Result, StructureError};
use crate::hash::ParameterHasher;
use crate::model::{Node, NodeId, Translation, TranslationInput};
use crate::slug::SlugGenerator;
use crate::store::{Database, Snapshot};

#[derive(Clone)]
pub struct TranslationStore {
    db: Arc<Database>,
    hasher: ParameterHasher,
    slugs: SlugGenerator,
}

impl TranslationStore {
    pub fn new(db: Arc<Database>, hasher: ParameterHasher, slugs: SlugGenerator) -> Self {
        Self { db, hasher, slugs }
    }

    // ========================================================================
    // reads
    // ========================================================================

    /// Slug of `id` in `locale`.
    ///
    /// Served from the published snapshot, which is rebuilt only when a
    /// write commits.
    pub fn get_slug(&self, id: NodeId, locale: &Locale) -> Option<String> {
        self.db.read().translation(id, locale).map(|t| t.slug.clone())
    }

    pub fn get_translation(&self, id: NodeId, locale: &Locale) -> Option<Translation> {
        self.db.read().translation(id, locale).cloned()
    }

    pub fn translations_of(&self, id: NodeId) -> Vec<Translation> {
        self.db.read().translations_of(id).cloned().collect()
    }

    /// True iff no sibling under `parent` is named `name` in `locale`.
    ///
    /// `exclude` is skipped, so a node being edited does not clash with
    /// itself.
    pub fn is_name_free(
        &self,
        name: &str,
        locale: &Locale,
        parent: Option<NodeId>,
        exclude: Option<NodeId>,
    ) -> bool {
        let snap = self.db.read();
        !snap
            .nodes()
            .filter(|n| n.parent == parent && Some(n.id) != exclude)
            .filter_map(|n| snap.translation(n.id, locale))
            .any(|t| t.name == name)
    }

    /// Slug `id` would get in `locale` if it were named `name`.
    pub fn generate_slug(&self, id: NodeId, locale: &Locale, name: &str) -> Result<String> {
        let snap = self.db.read();
        let node = snap.require_node(id)?;
        Ok(self.slug_for(&snap, node, locale, name))
    }

    /// Translations of active content nodes mentioning `query`, highest
    /// sitemap priority first.
    pub fn search(
        &self,
        locale: &Locale,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<Translation> {
        let snap = self.db.read();
        let mut hits: Vec<(&Node, &Translation)> = snap
            .nodes()
            .filter(|n| n.is_active && snap.contents_of(n.id).next().is_some())
            .filter_map(|n| Some((n, snap.translation(n.id, locale)?)))
            .filter(|(_, t)| t.mentions(query))
            .collect();
        hits.sort_by(|(a, _), (b, _)| {
            b.sitemap_priority
                .total_cmp(&a.sitemap_priority)
                .then(a.id.cmp(&b.id))
        });
        hits.into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// `(node, locale)` pairs with no translation, in node order.
    pub fn missing(&self, locales: &[Locale]) -> Vec<(NodeId, Locale)> {
        let snap = self.db.read();
        snap.nodes()
            .flat_map(|n| locales.iter().map(move |l| (n.id, l)))
            .filter(|(id, locale)| snap.translation(*id, locale).is_none())
            .map(|(id, locale)| (id, locale.clone()))
            .collect()
    }

    // ========================================================================
    // writes
    // ========================================================================

    /// Create or update the translation of `id` in `locale`.
    ///
    /// An explicit slug in `input` always wins. Otherwise the slug is
    /// generated when the node auto-generates slugs or has none yet.
    pub fn translate(&self, id: NodeId, locale: &Locale, input: TranslationInput) -> Result<Translation> {
        let translation = self
            .db
            .write(|snap| self.translate_in(snap, id, locale, input))?;
        debug!("translate"; "{} [{}] -> `{}`", id, locale, translation.slug);
        Ok(translation)
    }

    /// Rebuild the slug of `id` in `locale` from its current name.
    ///
    /// Descendants keep their slugs.
    pub fn regenerate_slug(&self, id: NodeId, locale: &Locale) -> Result<Translation> {
        self.db.write(|snap| {
            let existing = snap.translation(id, locale).cloned().ok_or_else(|| {
                StructureError::NotFound(format!("translation of {id} in `{locale}`"))
            })?;
            let node = snap.require_node(id)?.clone();
            let slug = self.slug_for(snap, &node, locale, &existing.name);
            self.store(snap, &node, existing.with_slug(slug, &self.hasher))
        })
    }

    pub fn remove(&self, id: NodeId, locale: &Locale) -> Result<bool> {
        self.db
            .write(|snap| Ok(snap.remove_translation(id, locale).is_some()))
    }

    /// [`translate`](Self::translate) on a snapshot that is already being written.
    pub(crate) fn translate_in(
        &self,
        snap: &mut Snapshot,
        id: NodeId,
        locale: &Locale,
        input: TranslationInput,
    ) -> Result<Translation> {
        let node = snap.require_node(id)?.clone();
        let existing_slug = snap.translation(id, locale).map(|t| t.slug.clone());

        let slug = match (input.slug, existing_slug) {
            (Some(explicit), _) => normalize_slug(&node, &explicit),
            (None, Some(existing)) if !node.is_autogenerate_slug && !existing.is_empty() => {
                existing
            }
            (None, _) => self.slug_for(snap, &node, locale, &input.name),
        };

        let translation = Translation {
            node: id,
            locale: locale.clone(),
            slug_sum: self.hasher.hash_str(&slug),
            slug,
            name: input.name,
            title: input.title,
            meta_description: input.meta_description,
            meta_keywords: input.meta_keywords,
            h1: input.h1,
            custom_url: input.custom_url.filter(|url| !url.trim().is_empty()),
        };
        self.store(snap, &node, translation)
    }

    pub(crate) fn slug_generator(&self) -> &SlugGenerator {
        &self.slugs
    }

    /// `base`, or `base-2`, `base-3`, ... whichever is still free in `locale`.
    pub(crate) fn unique_slug(&self, snap: &Snapshot, locale: &Locale, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        while snap
            .slug_owner(locale, self.hasher.hash_str(&candidate))
            .is_some()
        {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }

    fn slug_for(&self, snap: &Snapshot, node: &Node, locale: &Locale, name: &str) -> String {
        let parent_slug = node
            .parent
            .and_then(|parent| snap.translation(parent, locale))
            .map(|t| t.slug.as_str());
        self.slugs.generate(name, parent_slug)
    }

    fn store(&self, snap: &mut Snapshot, node: &Node, translation: Translation) -> Result<Translation> {
        if node.is_regex {
            compile_check(&translation.slug)?;
        } else if let Some(owner) = snap.slug_owner(&translation.locale, translation.slug_sum)
            && owner != node.id
        {
            return Err(Conflict::SlugTaken {
                slug: translation.slug,
                locale: translation.locale,
                owner,
            }
            .into());
        }
        snap.upsert_translation(translation.clone());
        Ok(translation)
    }
}

impl Translation {
    fn with_slug(mut self, slug: String, hasher: &ParameterHasher) -> Self {
        self.slug_sum = hasher.hash_str(&slug);
        self.slug = slug;
        self
    }
}

/// Literal slugs are stored the way a request path reads them back, with
/// no surrounding or repeated slashes; patterns verbatim.
fn normalize_slug(node: &Node, slug: &str) -> String {
    if node.is_regex {
        slug.to_string()
    } else {
        RequestPath::from_decoded(slug).as_str().to_string()
    }
}

fn compile_check(pattern: &str) -> Result<()> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|source| StructureError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Reject literal slugs of `id` that another literal node already uses.
///
/// Runs when a regex node turns literal. Scans translations directly,
/// because the slug index keeps only one owner per slug.
pub(crate) fn check_literal_slugs(snap: &Snapshot, id: NodeId) -> Result<()> {
    for own in snap.translations_of(id) {
        let clash = snap.translations().find(|other| {
            other.node != id
                && other.locale == own.locale
                && other.slug_sum == own.slug_sum
                && snap.node(other.node).is_some_and(|n| !n.is_regex)
        });
        if let Some(other) = clash {
            return Err(Conflict::SlugTaken {
                slug: own.slug.clone(),
                locale: own.locale.clone(),
                owner: other.node,
            }
            .into());
        }
    }
    Ok(())
}
