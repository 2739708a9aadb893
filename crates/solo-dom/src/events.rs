//! DOM Events
//!
//! Custom events dispatched on elements and the listener table that
//! receives them. Listeners observe events; they cannot mutate the tree.

use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Payload carried by a custom event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
    /// Attribute (or logical property) that changed
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Who caused the change
    pub source: String,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub detail: Option<EventDetail>,
    pub bubbles: bool,
    pub timestamp: f64,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create a custom event
    pub fn custom(event_type: &str, target: NodeId, detail: EventDetail, timestamp: f64) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: Some(target),
            detail: Some(detail),
            bubbles: true,
            timestamp,
            propagation_stopped: false,
        }
    }

    /// Create a plain, non-bubbling event
    pub fn simple(event_type: &str, target: NodeId, timestamp: f64) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: Some(target),
            detail: None,
            bubbles: false,
            timestamp,
            propagation_stopped: false,
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener callback
pub type EventListener = Rc<dyn Fn(&DomEvent)>;

/// Listener handle returned on registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    event_type: String,
    callback: EventListener,
}

/// Per-element listener table
#[derive(Default)]
pub struct EventListeners {
    by_node: HashMap<NodeId, Vec<Registration>>,
    next_id: u64,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on a node
    pub fn add(&mut self, node: NodeId, event_type: &str, callback: EventListener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_node.entry(node).or_default().push(Registration {
            id,
            event_type: event_type.to_string(),
            callback,
        });
        id
    }

    /// Remove a listener by handle
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for regs in self.by_node.values_mut() {
            if let Some(pos) = regs.iter().position(|r| r.id == id) {
                regs.remove(pos);
                return true;
            }
        }
        false
    }

    /// Drop every listener on a node
    pub fn clear_node(&mut self, node: NodeId) {
        self.by_node.remove(&node);
    }

    /// Listeners on a node for an event type
    pub fn matching(&self, node: NodeId, event_type: &str) -> Vec<EventListener> {
        self.by_node
            .get(&node)
            .map(|regs| {
                regs.iter()
                    .filter(|r| r.event_type == event_type)
                    .map(|r| Rc::clone(&r.callback))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total registered listeners
    pub fn len(&self) -> usize {
        self.by_node.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("nodes", &self.by_node.len())
            .field("listeners", &self.len())
            .finish()
    }
}
