//! Slug generation for translated node names.
//!
//! A node's slug is its parent's slug in the same locale followed by `/`
//! and the webalized name. Root nodes use the webalized name alone.

use deunicode::deunicode;

use crate::config::{SlugCase, SlugConfig, SlugSeparator};

/// Slug strategy injected into the translation store.
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    separator: SlugSeparator,
    case: SlugCase,
    max_length: usize,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(&SlugConfig::default())
    }
}

impl SlugGenerator {
    pub fn new(config: &SlugConfig) -> Self {
        Self {
            separator: config.separator,
            case: config.case,
            max_length: config.max_length.max(1),
        }
    }

    /// Build a slug from a name and the parent's slug, if any.
    pub fn generate(&self, name: &str, parent_slug: Option<&str>) -> String {
        let own = self.webalize(name);
        match parent_slug.map(|s| s.trim_matches('/')) {
            Some(parent) if !parent.is_empty() => format!("{parent}/{own}"),
            _ => own,
        }
    }

    /// ASCII-fold, case-normalize and collapse everything that is not
    /// alphanumeric into a single separator.
    ///
    /// `"Příliš žluťoučký kůň"` → `"prilis-zlutoucky-kun"`
    pub fn webalize(&self, text: &str) -> String {
        let sep = self.separator.as_char();
        let folded = deunicode(text);
        let mut result = String::with_capacity(folded.len());
        let mut pending_sep = false;

        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_sep && !result.is_empty() {
                    result.push(sep);
                }
                pending_sep = false;
                match self.case {
                    SlugCase::Lower => result.push(c.to_ascii_lowercase()),
                    SlugCase::Preserve => result.push(c),
                }
            } else {
                pending_sep = true;
            }
        }

        self.truncate(result)
    }

    /// Cut to `max_length`, preferring the last separator inside the limit.
    fn truncate(&self, mut slug: String) -> String {
        if slug.len() <= self.max_length {
            return slug;
        }
        // Webalized output is ASCII, so any byte index is a char boundary
        let cut = slug[..=self.max_length]
            .rfind(self.separator.as_char())
            .filter(|&at| at > 0)
            .unwrap_or(self.max_length);
        slug.truncate(cut);
        slug
    }
}
