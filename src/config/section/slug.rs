//! `[slug]` section configuration.
//!
//! ```toml
//! [slug]
//! separator = "dash"   # dash | underscore
//! case = "lower"       # lower | preserve
//! max_length = 255     # per path segment
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Longest webalized segment stored by default.
pub const DEFAULT_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugCase {
    /// Fold ASCII letters to lowercase.
    #[default]
    Lower,
    /// Keep letters as the name spells them.
    Preserve,
}

/// What runs of non-alphanumeric characters collapse into.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugSeparator {
    #[default]
    Dash,
    Underscore,
}

impl SlugSeparator {
    pub const fn as_char(self) -> char {
        match self {
            Self::Dash => '-',
            Self::Underscore => '_',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlugConfig {
    pub separator: SlugSeparator,
    pub case: SlugCase,
    /// Upper bound on one webalized segment; longer ones are cut at a
    /// separator where possible.
    pub max_length: usize,
}

pub struct SlugConfigFields {
    pub max_length: FieldPath,
}

impl SlugConfig {
    pub const FIELDS: SlugConfigFields = SlugConfigFields {
        max_length: FieldPath::new("slug.max_length"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.max_length == 0 {
            diag.error_with_hint(
                Self::FIELDS.max_length,
                format!("{} must be positive", Self::FIELDS.max_length),
                format!("omit it to use {DEFAULT_MAX_LENGTH}"),
            );
        }
    }
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            separator: SlugSeparator::default(),
            case: SlugCase::default(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StructureConfig, test_parse_config};

    #[test]
    fn test_defaults() {
        let slug = test_parse_config("").slug;
        assert_eq!(slug, SlugConfig::default());
        assert_eq!(slug.separator.as_char(), '-');
        assert_eq!(slug.max_length, DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn test_section_parsing() {
        let slug = test_parse_config(
            "[slug]\nseparator = \"underscore\"\ncase = \"preserve\"\nmax_length = 40",
        )
        .slug;
        assert_eq!(slug.separator, SlugSeparator::Underscore);
        assert_eq!(slug.case, SlugCase::Preserve);
        assert_eq!(slug.max_length, 40);
    }

    #[test]
    fn test_zero_max_length_rejected() {
        let config = StructureConfig::from_str("[slug]\nmax_length = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
