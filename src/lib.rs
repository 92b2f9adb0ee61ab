//! Sitetree - content routing and tree resolution for a localized CMS.
//!
//! Nodes form a nested-set tree. Each node carries per-locale slugs and
//! may host component placements. The [`Router`](router::Router) maps
//! request paths to nodes and builds canonical paths back from a
//! presenter action, while [`Structure`] wires the stores together and
//! creates pages for component actions on first use.

pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod hash;
pub mod logger;
pub mod model;
pub mod registry;
pub mod router;
pub mod slug;
pub mod store;
pub mod structure;
pub mod translation;
pub mod tree;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{Conflict, Result, StructureError};
pub use structure::{FixReport, Structure};
