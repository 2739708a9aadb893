//! Attribute Ownership Ledger
//!
//! Records which component last wrote an accessibility attribute or a
//! tabindex value on an element. Attribute writes are last-write-wins;
//! tabindex writes are gated by priority tier. The ledger is advisory:
//! nothing stops code from writing the DOM directly.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use solo_dom::{Document, DomEvent, EventDetail, NodeId};

use crate::component::{ComponentId, PriorityTier};
use crate::error::{check_element, MenuError};
use crate::scheduler::Millis;

/// Custom event dispatched for every applied ledger write
pub const STATE_CHANGE_EVENT: &str = "solo:state-change";

/// How a write from a component other than the current owner is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictPolicy {
    /// The new write always lands; the conflict is only reported
    LastWriteWins,
    /// Foreign writes land only with a strictly higher tier
    OwnerProtected,
}

/// Active conflict policy for attribute writes
pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::LastWriteWins;

/// Ownership of one (element, attribute) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipRecord {
    pub owner: ComponentId,
    /// None when the last write removed the attribute
    pub value: Option<String>,
    pub timestamp: Millis,
}

/// Tabindex claim on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabIndexClaim {
    pub owner: ComponentId,
    pub tier: PriorityTier,
    pub value: i32,
    pub timestamp: Millis,
}

/// Two components wrote the same attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEvent {
    pub element: String,
    pub attribute: String,
    pub previous_owner: ComponentId,
    pub new_owner: ComponentId,
    pub value: Option<String>,
    pub timestamp: Millis,
}

/// A tabindex write refused for insufficient priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedClaim {
    pub element: String,
    pub requester: ComponentId,
    pub holder: ComponentId,
    pub requested_tier: PriorityTier,
    pub holder_tier: PriorityTier,
    pub timestamp: Millis,
}

/// Result of a ledger write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// Applied over another component's ownership
    AppliedWithConflict { previous: ComponentId },
    /// Refused, the holder outranks the requester
    Blocked { holder: ComponentId },
    /// Target was not a live, connected element
    Invalid,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied | Self::AppliedWithConflict { .. })
    }
}

/// Ownership store keyed by element handle
#[derive(Debug)]
pub struct AttributeLedger {
    ownership: HashMap<(NodeId, String), OwnershipRecord>,
    tab_claims: HashMap<NodeId, TabIndexClaim>,
    conflicts: VecDeque<ConflictEvent>,
    blocked: VecDeque<BlockedClaim>,
    conflict_count: u64,
    blocked_count: u64,
    verbose: bool,
    capacity: usize,
}

impl AttributeLedger {
    /// Create a ledger; `verbose` keeps conflict and blocked-claim logs
    pub fn new(verbose: bool, capacity: usize) -> Self {
        Self {
            ownership: HashMap::new(),
            tab_claims: HashMap::new(),
            conflicts: VecDeque::new(),
            blocked: VecDeque::new(),
            conflict_count: 0,
            blocked_count: 0,
            verbose,
            capacity: capacity.max(1),
        }
    }

    /// Write an attribute and take ownership of it
    pub fn set_attribute(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        name: &str,
        value: &str,
        component: &ComponentId,
        now: Millis,
    ) -> WriteOutcome {
        self.write(doc, element, name, Some(value), component, now)
    }

    /// Remove an attribute and take ownership of the removal
    pub fn remove_attribute(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        name: &str,
        component: &ComponentId,
        now: Millis,
    ) -> WriteOutcome {
        self.write(doc, element, name, None, component, now)
    }

    fn write(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        name: &str,
        value: Option<&str>,
        component: &ComponentId,
        now: Millis,
    ) -> WriteOutcome {
        if let Err(err) = check_element(doc, element) {
            tracing::warn!("Ignoring {} write from {}: {}", name, component, err);
            return WriteOutcome::Invalid;
        }

        let key = (element, name.to_string());
        let previous = self
            .ownership
            .get(&key)
            .map(|r| r.owner.clone())
            .filter(|owner| owner != component);

        if let Some(prev) = &previous {
            if CONFLICT_POLICY == ConflictPolicy::OwnerProtected && component.priority() <= prev.priority() {
                return self.block(element, component, prev.clone(), prev.priority(), now);
            }
        }

        let old = match value {
            Some(v) => doc.tree.set_attribute(element, name, v),
            None => doc.tree.remove_attribute(element, name),
        };
        let old = match old {
            Ok(old) => old,
            Err(err) => {
                let err = MenuError::from(err);
                tracing::warn!("Ignoring {} write from {}: {}", name, component, err);
                return WriteOutcome::Invalid;
            }
        };

        self.ownership.insert(
            key,
            OwnershipRecord {
                owner: component.clone(),
                value: value.map(str::to_string),
                timestamp: now,
            },
        );

        if old.as_deref() != value {
            notify(doc, element, name, old, value, component, now);
        }

        match previous {
            Some(prev) => {
                self.record_conflict(element, name, prev.clone(), component, value, now);
                WriteOutcome::AppliedWithConflict { previous: prev }
            }
            None => WriteOutcome::Applied,
        }
    }

    /// Write tabindex if the caller's tier is at least the current claim's
    pub fn set_tab_index(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        value: i32,
        component: &ComponentId,
        now: Millis,
    ) -> WriteOutcome {
        if let Err(err) = check_element(doc, element) {
            tracing::warn!("Ignoring tabindex write from {}: {}", component, err);
            return WriteOutcome::Invalid;
        }

        let tier = component.priority();
        if let Some(claim) = self.tab_claims.get(&element) {
            if tier < claim.tier {
                let (holder, holder_tier) = (claim.owner.clone(), claim.tier);
                return self.block(element, component, holder, holder_tier, now);
            }
        }

        let rendered = value.to_string();
        let old = match doc.tree.set_attribute(element, "tabindex", &rendered) {
            Ok(old) => old,
            Err(err) => {
                tracing::warn!("Ignoring tabindex write from {}: {}", component, err);
                return WriteOutcome::Invalid;
            }
        };

        let previous = self
            .tab_claims
            .insert(
                element,
                TabIndexClaim {
                    owner: component.clone(),
                    tier,
                    value,
                    timestamp: now,
                },
            )
            .map(|c| c.owner)
            .filter(|owner| owner != component);

        if old.as_deref() != Some(rendered.as_str()) {
            notify(doc, element, "tabindex", old, Some(&rendered), component, now);
        }

        match previous {
            Some(prev) => WriteOutcome::AppliedWithConflict { previous: prev },
            None => WriteOutcome::Applied,
        }
    }

    fn block(
        &mut self,
        element: NodeId,
        requester: &ComponentId,
        holder: ComponentId,
        holder_tier: PriorityTier,
        now: Millis,
    ) -> WriteOutcome {
        self.blocked_count += 1;
        if self.verbose {
            tracing::debug!(
                "Blocked write on {} from {} (tier {}): held by {} (tier {})",
                element,
                requester,
                requester.priority().value(),
                holder,
                holder_tier.value()
            );
            push_bounded(
                &mut self.blocked,
                BlockedClaim {
                    element: element.to_string(),
                    requester: requester.clone(),
                    holder: holder.clone(),
                    requested_tier: requester.priority(),
                    holder_tier,
                    timestamp: now,
                },
                self.capacity,
            );
        }
        WriteOutcome::Blocked { holder }
    }

    fn record_conflict(
        &mut self,
        element: NodeId,
        name: &str,
        previous: ComponentId,
        component: &ComponentId,
        value: Option<&str>,
        now: Millis,
    ) {
        self.conflict_count += 1;
        if !self.verbose {
            return;
        }
        tracing::debug!("Ownership conflict on {} {}: {} -> {}", element, name, previous, component);
        push_bounded(
            &mut self.conflicts,
            ConflictEvent {
                element: element.to_string(),
                attribute: name.to_string(),
                previous_owner: previous,
                new_owner: component.clone(),
                value: value.map(str::to_string),
                timestamp: now,
            },
            self.capacity,
        );
    }

    /// Current owner of an attribute
    pub fn owner_of(&self, element: NodeId, name: &str) -> Option<&OwnershipRecord> {
        self.ownership.get(&(element, name.to_string()))
    }

    /// Current tabindex claim
    pub fn claim_of(&self, element: NodeId) -> Option<&TabIndexClaim> {
        self.tab_claims.get(&element)
    }

    /// Ownership records plus tabindex claims held for an element
    pub fn record_count_for(&self, element: NodeId) -> usize {
        let owned = self.ownership.keys().filter(|(e, _)| *e == element).count();
        owned + usize::from(self.tab_claims.contains_key(&element))
    }

    /// Ownership records plus tabindex claims
    pub fn record_count(&self) -> usize {
        self.ownership.len() + self.tab_claims.len()
    }

    /// Attribute ownership records only
    pub fn ownership_count(&self) -> usize {
        self.ownership.len()
    }

    /// Tabindex claims only
    pub fn claim_count(&self) -> usize {
        self.tab_claims.len()
    }

    /// Every element with at least one record
    pub fn tracked_elements(&self) -> Vec<NodeId> {
        let mut elements: Vec<NodeId> = self
            .ownership
            .keys()
            .map(|(e, _)| *e)
            .chain(self.tab_claims.keys().copied())
            .collect();
        elements.sort();
        elements.dedup();
        elements
    }

    /// Drop all records for an element, returns how many were dropped
    pub fn release_element(&mut self, element: NodeId) -> usize {
        let before = self.record_count();
        self.ownership.retain(|(e, _), _| *e != element);
        self.tab_claims.remove(&element);
        before - self.record_count()
    }

    /// Drop all records owned by a component
    pub fn release_component(&mut self, component: &ComponentId) -> usize {
        let before = self.record_count();
        self.ownership.retain(|_, r| &r.owner != component);
        self.tab_claims.retain(|_, c| &c.owner != component);
        before - self.record_count()
    }

    /// Recorded conflicts, oldest first (verbose mode only)
    pub fn conflicts(&self) -> impl Iterator<Item = &ConflictEvent> {
        self.conflicts.iter()
    }

    /// Recorded blocked claims, oldest first (verbose mode only)
    pub fn blocked_claims(&self) -> impl Iterator<Item = &BlockedClaim> {
        self.blocked.iter()
    }

    /// Conflicts seen, logged or not
    pub fn conflict_count(&self) -> u64 {
        self.conflict_count
    }

    /// Blocked writes seen, logged or not
    pub fn blocked_count(&self) -> u64 {
        self.blocked_count
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, item: T, capacity: usize) {
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(item);
}

fn notify(
    doc: &Document,
    element: NodeId,
    name: &str,
    old: Option<String>,
    new: Option<&str>,
    component: &ComponentId,
    now: Millis,
) {
    let detail = EventDetail {
        name: name.to_string(),
        old_value: old,
        new_value: new.map(str::to_string),
        source: component.name().to_string(),
    };
    doc.dispatch_event(DomEvent::custom(STATE_CHANGE_EVENT, element, detail, now as f64));
}
