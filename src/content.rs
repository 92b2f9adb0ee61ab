//! Content-association cache.
//!
//! Maps `(factory, parameter sum, is_system)` to the active node that
//! hosts that component placement. The index is built on the first lookup
//! against a snapshot and updated in place by [`ContentStore::attach`].

use std::sync::Arc;

use crate::core::Parameters;
use crate::debug;
use crate::error::Result;
use crate::hash::ParameterHasher;
use crate::model::{ContentAssociation, ContentId, Node, NodeId};
use crate::store::{Database, Snapshot};

#[derive(Clone)]
pub struct ContentStore {
    db: Arc<Database>,
    hasher: ParameterHasher,
}

impl ContentStore {
    pub fn new(db: Arc<Database>, hasher: ParameterHasher) -> Self {
        Self { db, hasher }
    }

    /// Active node hosting `factory` with exactly these parameters.
    pub fn get_one_by_factory_and_parameters(
        &self,
        factory: &str,
        parameters: &Parameters,
        is_system: bool,
    ) -> Option<Node> {
        let snap = self.db.read();
        let id = snap.content_node(factory, self.hasher.hash(parameters), is_system)?;
        snap.node(id).cloned()
    }

    pub fn get_by_node_factory_parameters(
        &self,
        node: NodeId,
        factory: &str,
        parameters: &Parameters,
    ) -> Option<ContentAssociation> {
        let sum = self.hasher.hash(parameters);
        self.db
            .read()
            .contents_of(node)
            .find(|c| c.factory == factory && c.parameters_sum == sum)
            .cloned()
    }

    pub fn contents_of(&self, node: NodeId) -> Vec<ContentAssociation> {
        self.db.read().contents_of(node).cloned().collect()
    }

    /// A node is a content node when it hosts at least one placement.
    pub fn is_content(&self, node: NodeId) -> bool {
        self.db.read().contents_of(node).next().is_some()
    }

    pub fn attach(&self, node: NodeId, factory: &str, parameters: Parameters) -> Result<ContentId> {
        let id = self
            .db
            .write(|snap| self.attach_in(snap, node, factory, parameters))?;
        debug!("content"; "attached {} to {} as {}", factory, node, id);
        Ok(id)
    }

    /// Drop every placement of `node`. Returns how many were removed.
    pub fn clear(&self, node: NodeId) -> Result<usize> {
        self.db.write(|snap| {
            snap.require_node(node)?;
            Ok(snap.remove_contents_of(node))
        })
    }

    pub(crate) fn attach_in(
        &self,
        snap: &mut Snapshot,
        node: NodeId,
        factory: &str,
        parameters: Parameters,
    ) -> Result<ContentId> {
        snap.require_node(node)?;
        let id = snap.allocate_content_id();
        snap.insert_content(ContentAssociation {
            id,
            node,
            factory: factory.to_string(),
            parameters_sum: self.hasher.hash(&parameters),
            parameters,
        });
        Ok(id)
    }
}
