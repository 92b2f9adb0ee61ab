//! Tree nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Parameters;
use crate::hash::ParamSum;

/// Stable node identifier. Allocated once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a rendered link should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTarget {
    #[serde(rename = "_blank")]
    NewWindow,
    #[serde(rename = "_self")]
    SameFrame,
    #[serde(rename = "_parent")]
    ParentFrame,
    #[serde(rename = "_top")]
    TopFrame,
}

impl LinkTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewWindow => "_blank",
            Self::SameFrame => "_self",
            Self::ParentFrame => "_parent",
            Self::TopFrame => "_top",
        }
    }
}

/// The handler a node resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Descriptor {
    pub presenter: String,
    pub action: String,
}

impl Descriptor {
    pub fn new(presenter: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            presenter: presenter.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.presenter, self.action)
    }
}

/// One entry of the content tree.
///
/// `left`/`right` are nested-set bounds inside the node's `root` group:
/// a node's descendants are exactly the nodes of the same group whose
/// interval lies strictly inside its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub identifier: String,
    pub parent: Option<NodeId>,

    pub left: i64,
    pub right: i64,
    pub level: u32,
    pub root: u32,

    pub is_system: bool,
    pub is_active: bool,
    pub is_hidden: bool,
    pub is_home_page: bool,
    pub is_regex: bool,
    pub is_regex_match_arguments: bool,
    pub is_autogenerate_slug: bool,

    pub descriptor: Option<Descriptor>,
    pub parameters: Parameters,
    pub parameters_sum: ParamSum,

    pub target: Option<LinkTarget>,
    pub layout_name: String,
    /// Page-body template reference.
    pub template: Option<String>,

    pub meta_robots: String,
    pub sitemap_priority: f32,
    pub is_sitemap: bool,
    pub is_show_h1: bool,
}

impl Node {
    /// True if `other` is a strict descendant of `self`.
    #[inline]
    pub fn contains(&self, other: &Node) -> bool {
        self.root == other.root && self.left < other.left && other.right < self.right
    }

    /// Interval width; a leaf has width 2.
    #[inline]
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    /// Number of descendants derived from the interval alone.
    pub fn descendant_count(&self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    pub fn has_descriptor(&self, presenter: &str, action: &str) -> bool {
        self.descriptor
            .as_ref()
            .is_some_and(|d| d.presenter == presenter && d.action == action)
    }

    /// Visible in front-end menus.
    pub fn is_listed(&self) -> bool {
        self.is_active && !self.is_hidden
    }
}

/// Attributes of a node about to be created.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub identifier: String,
    pub is_system: bool,
    pub is_active: bool,
    pub is_hidden: bool,
    pub is_home_page: bool,
    pub is_regex: bool,
    pub is_regex_match_arguments: bool,
    pub is_autogenerate_slug: bool,
    pub descriptor: Option<Descriptor>,
    pub parameters: Parameters,
    pub target: Option<LinkTarget>,
    pub layout_name: String,
    pub template: Option<String>,
    pub meta_robots: String,
    pub sitemap_priority: f32,
    pub is_sitemap: bool,
    pub is_show_h1: bool,
}

impl NewNode {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_descriptor(mut self, presenter: &str, action: &str) -> Self {
        self.descriptor = Some(Descriptor::new(presenter, action));
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn regex(mut self, match_arguments: bool) -> Self {
        self.is_regex = true;
        self.is_regex_match_arguments = match_arguments;
        self.is_autogenerate_slug = false;
        self
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

impl Default for NewNode {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            is_system: false,
            is_active: true,
            is_hidden: false,
            is_home_page: false,
            is_regex: false,
            is_regex_match_arguments: false,
            is_autogenerate_slug: true,
            descriptor: None,
            parameters: Parameters::new(),
            target: None,
            layout_name: "layout".to_string(),
            template: None,
            meta_robots: "index, follow".to_string(),
            sitemap_priority: 0.5,
            is_sitemap: true,
            is_show_h1: true,
        }
    }
}

/// A partial update of node attributes. `None` leaves a field unchanged.
///
/// Home-page status and tree placement have dedicated operations.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub identifier: Option<String>,
    pub is_system: Option<bool>,
    pub is_active: Option<bool>,
    pub is_hidden: Option<bool>,
    pub is_regex: Option<bool>,
    pub is_regex_match_arguments: Option<bool>,
    pub is_autogenerate_slug: Option<bool>,
    pub descriptor: Option<Option<Descriptor>>,
    pub parameters: Option<Parameters>,
    pub target: Option<Option<LinkTarget>>,
    pub layout_name: Option<String>,
    pub meta_robots: Option<String>,
    pub sitemap_priority: Option<f32>,
    pub is_sitemap: Option<bool>,
    pub is_show_h1: Option<bool>,
}

/// Where a new node goes in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A new root group after all existing ones.
    Root,
    LastChildOf(NodeId),
    NextSiblingOf(NodeId),
}
