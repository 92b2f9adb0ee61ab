//! `[router]` section configuration.
//!
//! ```toml
//! [router]
//! base_url = "https://example.com"   # absolute prefix for sitemap entries
//! regex_case_insensitive = true      # regex slugs ignore case
//! ```

use serde::{Deserialize, Serialize};

use crate::config::util::normalize_base_url;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    /// Site base URL. Sitemap locations are relative when unset.
    pub base_url: Option<String>,
    /// Compile regex slugs case-insensitively.
    pub regex_case_insensitive: bool,
}

pub struct RouterConfigFields {
    pub base_url: FieldPath,
    pub regex_case_insensitive: FieldPath,
}

impl RouterConfig {
    pub const FIELDS: RouterConfigFields = RouterConfigFields {
        base_url: FieldPath::new("router.base_url"),
        regex_case_insensitive: FieldPath::new("router.regex_case_insensitive"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.base_url
            && normalize_base_url(url).is_none()
        {
            diag.error_with_hint(
                Self::FIELDS.base_url,
                format!("`{url}` is not a valid http(s) URL"),
                format!("set {}, e.g.: \"https://example.com\"", Self::FIELDS.base_url),
            );
        }
    }

    /// Normalized base URL without a trailing slash.
    pub fn base_url(&self) -> Option<String> {
        self.base_url.as_deref().and_then(normalize_base_url)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            regex_case_insensitive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(config.router.base_url.is_none());
        assert!(config.router.regex_case_insensitive);
    }

    #[test]
    fn test_base_url_normalized() {
        let config = test_parse_config("[router]\nbase_url = \"https://example.com/\"");
        assert_eq!(config.router.base_url().as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = test_parse_config("[router]\nbase_url = \"example.com\"");
        let mut diag = ConfigDiagnostics::new();
        config.router.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
