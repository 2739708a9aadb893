//! Solo DOM - Document Object Model
//!
//! Arena-backed document tree used by the menu state engine. Nodes are
//! addressed by generational [`NodeId`]s so a handle to a destroyed node can
//! never alias a newer one.

mod classlist;
mod document;
mod events;
mod geometry;
mod node;
mod selector;
mod tree;

pub use classlist::ClassList;
pub use document::{Document, TextDirection, Window};
pub use events::{DomEvent, EventDetail, EventListener, EventListeners, ListenerId};
pub use geometry::DOMRect;
pub use node::{Attribute, ElementData, Node, NodeData};
pub use selector::Selector;
pub use tree::DomTree;

/// Node identifier (arena slot plus generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId { index: 0, generation: 0 };

    /// Build an ID from its raw parts
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot insert {child} under {parent}: hierarchy request error")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
