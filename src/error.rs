//! Error types for the structure engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::Locale;
use crate::model::NodeId;

pub type Result<T, E = StructureError> = std::result::Result<T, E>;

/// Errors surfaced by the tree, translation, content and routing layers.
#[derive(Debug, Error)]
pub enum StructureError {
    /// No node resolves a path, an id or an action descriptor.
    #[error("not found: {0}")]
    NotFound(String),

    /// A node exists but no link can be built for it.
    #[error("cannot construct a path for {0}")]
    NotConstructible(String),

    /// A write was rejected; nothing was persisted.
    #[error("conflict: {0}")]
    Conflict(#[from] Conflict),

    /// Nested-set numbering has drifted. Run `recover()`.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),

    /// Input rejected before any write (blank identifier, bad priority).
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Operation is deliberately unsupported for this input.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A regex slug failed to compile.
    #[error("invalid slug pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("snapshot (de)serialization failed")]
    Snapshot(#[from] serde_json::Error),
}

/// The concrete reason a write was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("slug `{slug}` is already used in locale `{locale}` by node {owner}")]
    SlugTaken {
        slug: String,
        locale: Locale,
        owner: NodeId,
    },

    #[error("identifier `{0}` is already used")]
    IdentifierTaken(String),

    #[error("node {node} cannot be moved under its own descendant {target}")]
    Cycle { node: NodeId, target: NodeId },
}

impl StructureError {
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NotFound(format!("node {id}"))
    }

    /// True for routing misses the caller may turn into a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NotConstructible(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display() {
        let err = StructureError::from(Conflict::SlugTaken {
            slug: "about-us".into(),
            locale: Locale::new("en"),
            owner: NodeId(3),
        });
        let display = err.to_string();
        assert!(display.contains("about-us"));
        assert!(display.contains("`en`"));
        assert!(display.contains('3'));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(StructureError::node_not_found(NodeId(1)).is_not_found());
        assert!(StructureError::NotConstructible("x".into()).is_not_found());
        assert!(!StructureError::Unsupported("x".into()).is_not_found());
    }
}
