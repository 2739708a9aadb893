//! Menu Operation Coordinator
//!
//! One operation slot per menu element. A slot held by another component
//! can only be taken by a strictly higher priority; anything else is
//! dropped on the floor, never queued.

use std::collections::HashMap;

use serde::Serialize;
use solo_dom::NodeId;

use crate::component::ComponentId;
use crate::scheduler::Millis;

/// Requested transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Open,
    Close,
    Toggle,
}

impl OperationKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "close" => Some(Self::Close),
            "toggle" => Some(Self::Toggle),
            _ => None,
        }
    }

    /// Resolve a toggle against the current open state
    pub fn resolve(self, is_open: bool) -> Self {
        match self {
            Self::Toggle if is_open => Self::Close,
            Self::Toggle => Self::Open,
            other => other,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Toggle => "toggle",
        };
        f.write_str(name)
    }
}

/// Slot record for an in-flight operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveOperation {
    pub component: ComponentId,
    pub kind: OperationKind,
    pub started_at: Millis,
    #[serde(skip)]
    pub op_id: u64,
}

impl ActiveOperation {
    pub fn age(&self, now: Millis) -> Millis {
        now.saturating_sub(self.started_at)
    }
}

/// Result of a coordinated operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Opened,
    Closed,
    /// Dropped, the slot holder was not outranked
    Blocked { holder: ComponentId },
    /// Target was not a live, connected element
    Invalid,
}

impl OperationOutcome {
    pub fn took_effect(&self) -> bool {
        matches!(self, Self::Opened | Self::Closed)
    }
}

/// Per-element operation slots
#[derive(Debug, Default)]
pub struct OperationCoordinator {
    active: HashMap<NodeId, ActiveOperation>,
    next_op: u64,
    dropped: u64,
}

impl OperationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `component` may act on `key` right now. Err carries the holder.
    pub fn should_proceed(&self, key: NodeId, component: &ComponentId) -> Result<(), ComponentId> {
        match self.active.get(&key) {
            None => Ok(()),
            Some(op) if &op.component == component => Ok(()),
            Some(op) if component.priority() > op.component.priority() => Ok(()),
            Some(op) => Err(op.component.clone()),
        }
    }

    /// Take the slot, returning the operation id used to release it
    pub fn begin(&mut self, key: NodeId, component: &ComponentId, kind: OperationKind, now: Millis) -> u64 {
        self.next_op += 1;
        let op_id = self.next_op;
        if let Some(previous) = self.active.insert(
            key,
            ActiveOperation {
                component: component.clone(),
                kind,
                started_at: now,
                op_id,
            },
        ) {
            if &previous.component != component {
                tracing::debug!("{} preempted {} on {}", component, previous.component, key);
            }
        }
        op_id
    }

    /// Note a dropped request
    pub fn record_drop(&mut self, key: NodeId, component: &ComponentId, holder: &ComponentId, verbose: bool) {
        self.dropped += 1;
        if verbose {
            tracing::debug!("Dropped operation on {} from {}: slot held by {}", key, component, holder);
        }
    }

    /// Free the slot if it still belongs to `op_id`
    pub fn release(&mut self, key: NodeId, op_id: u64) -> bool {
        match self.active.get(&key) {
            Some(op) if op.op_id == op_id => {
                self.active.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Remove and return every operation older than `threshold` ms
    pub fn purge_older_than(&mut self, now: Millis, threshold: Millis) -> Vec<(NodeId, ActiveOperation)> {
        let stale: Vec<NodeId> = self
            .active
            .iter()
            .filter(|(_, op)| op.age(now) > threshold)
            .map(|(key, _)| *key)
            .collect();
        let mut purged: Vec<(NodeId, ActiveOperation)> = stale
            .into_iter()
            .filter_map(|key| self.active.remove(&key).map(|op| (key, op)))
            .collect();
        purged.sort_by_key(|(key, _)| *key);
        purged
    }

    /// Forget every slot held by a component
    pub fn release_component(&mut self, component: &ComponentId) -> usize {
        let before = self.active.len();
        self.active.retain(|_, op| &op.component != component);
        before - self.active.len()
    }

    pub fn get(&self, key: NodeId) -> Option<&ActiveOperation> {
        self.active.get(&key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Requests dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Snapshot of every slot, sorted by element
    pub fn active(&self) -> Vec<(NodeId, ActiveOperation)> {
        let mut ops: Vec<_> = self.active.iter().map(|(k, op)| (*k, op.clone())).collect();
        ops.sort_by_key(|(key, _)| *key);
        ops
    }
}
