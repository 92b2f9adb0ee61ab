//! `[locale]` section configuration.
//!
//! ```toml
//! [locale]
//! active = ["en", "cs"]   # ordered, first entries listed first in menus
//! default = "en"          # URLs in this locale carry no prefix
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocaleConfig {
    /// Active locale codes, in display order.
    pub active: Vec<String>,
    /// Default locale code. Must be listed in `active`.
    pub default: String,
}

pub struct LocaleConfigFields {
    pub active: FieldPath,
    pub default: FieldPath,
}

impl LocaleConfig {
    pub const FIELDS: LocaleConfigFields = LocaleConfigFields {
        active: FieldPath::new("locale.active"),
        default: FieldPath::new("locale.default"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.active.is_empty() {
            diag.error_with_hint(
                Self::FIELDS.active,
                format!("{} must not be empty", Self::FIELDS.active),
                "e.g.: active = [\"en\"]",
            );
            return;
        }

        let mut seen = FxHashSet::default();
        for code in &self.active {
            let code = code.trim();
            if code.is_empty() {
                diag.error(Self::FIELDS.active, "locale codes must not be blank");
            } else if code.contains('/') {
                diag.error(
                    Self::FIELDS.active,
                    format!("locale code `{code}` must not contain `/`"),
                );
            } else if !seen.insert(code) {
                diag.error(Self::FIELDS.active, format!("duplicate locale code `{code}`"));
            }
        }

        if !self.active.iter().any(|c| c.trim() == self.default.trim()) {
            diag.error_with_hint(
                Self::FIELDS.default,
                format!("default locale `{}` is not active", self.default),
                format!("add it to {}", Self::FIELDS.active),
            );
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            active: vec!["en".to_string()],
            default: "en".to_string(),
        }
    }
}
