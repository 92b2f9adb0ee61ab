//! Structure configuration management for `structure.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── layout     # [layout]
//! │   ├── locale     # [locale]
//! │   ├── router     # [router]
//! │   ├── slug       # [slug]
//! │   └── store      # [store]
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── util.rs        # Config discovery and path helpers
//! └── mod.rs         # StructureConfig (this file)
//! ```

pub mod section;
pub mod types;
mod util;

pub use section::{
    LayoutConfig, LocaleConfig, RouterConfig, SlugCase, SlugConfig, SlugSeparator, StoreConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::{find_config_file, normalize_base_url, resolve_path};

use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "structure.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `structure.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub slug: SlugConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

impl StructureConfig {
    /// Locate `config_name` upward from `start` and load it.
    ///
    /// Falls back to defaults rooted at `start` when no file exists. The
    /// optional `store` override replaces `[store] path` before paths are
    /// resolved.
    pub fn load(
        config_name: &Path,
        start: &Path,
        store: Option<&PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(config_name, start) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", config_name.display());
                Self {
                    root: start.to_path_buf(),
                    ..Self::default()
                }
            }
        };

        Self::update_option(&mut config.store.path, store);
        config.finalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without touching the disk.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::unknown_fields_diagnostics(&ignored).print_warnings();
        }
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}", display_path);
            Self::unknown_fields_diagnostics(&ignored).print_warnings();
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn unknown_fields_diagnostics(fields: &[String]) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        for field in fields {
            diag.warn(field.as_str(), "unknown field");
        }
        diag
    }

    /// Resolve relative paths against the config root.
    fn finalize(&mut self) {
        self.store.path = resolve_path(&self.store.path, &self.root);
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, collecting all errors at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.locale.validate(&mut diag);
        self.slug.validate(&mut diag);
        self.router.validate(&mut diag);
        self.store.validate(&mut diag);
        self.layout.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from `extra`, panicking on unknown fields to catch typos.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> StructureConfig {
    let (parsed, ignored) = StructureConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = StructureConfig::from_str("[locale\nactive = []");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[locale]\ndefault = \"en\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = StructureConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.locale.default, "en");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[locale]\nactive = [\"en\"]\ndefault = \"en\"";
        let (_, ignored) = StructureConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            StructureConfig::load(Path::new("no-such-structure.toml"), dir.path(), None).unwrap();
        assert!(config.config_path.is_none());
        assert_eq!(config.store.path, dir.path().join("structure.json"));
    }

    #[test]
    fn test_load_resolves_store_relative_to_config() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[locale]\nactive = [\"en\", \"cs\"]\ndefault = \"en\"\n[store]\npath = \"data/tree.json\"",
        )
        .unwrap();

        let config = StructureConfig::load(Path::new(CONFIG_FILE), &nested, None).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.store.path, dir.path().join("data/tree.json"));
        assert_eq!(config.locale.active, ["en", "cs"]);
    }

    #[test]
    fn test_store_override() {
        let dir = TempDir::new().unwrap();
        let override_path = PathBuf::from("/tmp/override.json");
        let config = StructureConfig::load(
            Path::new("no-such-structure.toml"),
            dir.path(),
            Some(&override_path),
        )
        .unwrap();
        assert_eq!(config.store.path, override_path);
    }

    #[test]
    fn test_load_reports_all_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[locale]\nactive = []\n[layout]\ndefault = \"\"",
        )
        .unwrap();

        let err = StructureConfig::load(Path::new(CONFIG_FILE), dir.path(), None).unwrap_err();
        match err {
            ConfigError::Diagnostics(diag) => assert_eq!(diag.len(), 2),
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }
}
