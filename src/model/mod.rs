//! Persistent entities: nodes, translations and content associations.

mod content;
mod node;
mod translation;

pub use content::{ContentAssociation, ContentId};
pub use node::{Descriptor, LinkTarget, NewNode, Node, NodeId, NodePatch, Placement};
pub use translation::{Translation, TranslationInput};
