//! `[store]` section configuration.
//!
//! ```toml
//! [store]
//! path = "structure.json"   # snapshot file, relative to structure.toml
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot file. `~` is expanded; relative paths resolve against the
    /// directory holding the config file.
    pub path: PathBuf,
}

pub struct StoreConfigFields {
    pub path: FieldPath,
}

impl StoreConfig {
    pub const FIELDS: StoreConfigFields = StoreConfigFields {
        path: FieldPath::new("store.path"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.path.as_os_str().is_empty() {
            diag.error(Self::FIELDS.path, format!("{} must not be empty", Self::FIELDS.path));
        } else if self.path.is_dir() {
            diag.error(
                Self::FIELDS.path,
                format!("{} is a directory: {}", Self::FIELDS.path, self.path.display()),
            );
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("structure.json"),
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
        assert_eq!(config.store.path, PathBuf::from("structure.json"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = StoreConfig {
            path: dir.path().to_path_buf(),
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
