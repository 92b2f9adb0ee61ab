//! Component placements attached to nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::core::Parameters;
use crate::hash::ParamSum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A dynamically placed component: factory key plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAssociation {
    pub id: ContentId,
    pub node: NodeId,
    pub factory: String,
    pub parameters: Parameters,
    pub parameters_sum: ParamSum,
}
