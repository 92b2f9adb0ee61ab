//! Per-locale node attributes.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::core::Locale;
use crate::hash::ParamSum;

/// The per-(node, locale) bundle of user-facing text and slug.
///
/// For regex nodes `slug` holds a pattern instead of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub node: NodeId,
    pub locale: Locale,
    pub slug: String,
    pub slug_sum: ParamSum,
    pub name: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub h1: String,
    /// Overrides slug-based link generation when set.
    pub custom_url: Option<String>,
}

impl Translation {
    /// True if `query` occurs (case-insensitively) in any searchable field.
    pub fn mentions(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [
            &self.name,
            &self.slug,
            &self.meta_description,
            &self.meta_keywords,
            &self.title,
            &self.h1,
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Attributes supplied when translating a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationInput {
    pub name: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub h1: String,
    /// Explicit slug; overrides auto-generation.
    pub slug: Option<String>,
    pub custom_url: Option<String>,
}

impl TranslationInput {
    /// Use `name` for every text field.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            meta_description: name.clone(),
            meta_keywords: name.clone(),
            h1: name.clone(),
            name,
            slug: None,
            custom_url: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_custom_url(mut self, url: impl Into<String>) -> Self {
        self.custom_url = Some(url.into());
        self
    }
}
