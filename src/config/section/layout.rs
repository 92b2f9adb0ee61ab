//! `[layout]` section configuration.
//!
//! ```toml
//! [layout]
//! default = "layout"         # layout for auto-created pages
//! default_block = "content"  # block receiving the placed component
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub default: String,
    pub default_block: String,
}

pub struct LayoutConfigFields {
    pub default: FieldPath,
    pub default_block: FieldPath,
}

impl LayoutConfig {
    pub const FIELDS: LayoutConfigFields = LayoutConfigFields {
        default: FieldPath::new("layout.default"),
        default_block: FieldPath::new("layout.default_block"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.default.trim().is_empty() {
            diag.error(Self::FIELDS.default, format!("{} must not be empty", Self::FIELDS.default));
        }
        if self.default_block.trim().is_empty() {
            diag.error(
                Self::FIELDS.default_block,
                format!("{} must not be empty", Self::FIELDS.default_block),
            );
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default: "layout".to_string(),
            default_block: "content".to_string(),
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
        assert_eq!(config.layout.default, "layout");
        assert_eq!(config.layout.default_block, "content");
    }

    #[test]
    fn test_empty_layout_rejected() {
        let config = test_parse_config("[layout]\ndefault = \" \"");
        let mut diag = ConfigDiagnostics::new();
        config.layout.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
