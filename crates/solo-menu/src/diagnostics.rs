//! Diagnostics
//!
//! Debugging entry point: a serializable report, conflict and orphan
//! listings, and a manual validation trigger. Not meant for control flow.

use serde::Serialize;

use crate::component::ComponentId;
use crate::context::MenuContext;
use crate::coordinator::ActiveOperation;
use crate::ledger::{BlockedClaim, ConflictEvent, ConflictPolicy, CONFLICT_POLICY};
use crate::scheduler::Millis;
use crate::validator::ValidationReport;
use crate::viewport::{ObservationMode, ScreenSizeSnapshot};

/// In-flight operation as reported
#[derive(Debug, Clone, Serialize)]
pub struct OperationEntry {
    pub element: String,
    #[serde(flatten)]
    pub operation: ActiveOperation,
}

/// Point-in-time state of the engine
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub generated_at: Millis,
    pub conflict_policy: ConflictPolicy,
    pub components: Vec<ComponentId>,
    pub snapshot: ScreenSizeSnapshot,
    pub observation: Option<ObservationMode>,
    pub ownership_records: usize,
    pub tab_index_claims: usize,
    pub active_operations: Vec<OperationEntry>,
    pub dropped_operations: u64,
    pub conflict_count: u64,
    pub blocked_count: u64,
    pub conflicts: Vec<ConflictEvent>,
    pub blocked_claims: Vec<BlockedClaim>,
    pub orphans: Vec<String>,
    pub running_animations: usize,
    pub pending_timers: usize,
    pub last_validation: Option<ValidationReport>,
}

/// Diagnostic view over a context
pub struct Diagnostics<'a> {
    ctx: &'a mut MenuContext,
}

impl<'a> Diagnostics<'a> {
    pub fn new(ctx: &'a mut MenuContext) -> Self {
        Self { ctx }
    }

    /// Build the full report
    pub fn report(&self) -> DiagnosticReport {
        let ctx = &*self.ctx;
        DiagnosticReport {
            generated_at: ctx.now(),
            conflict_policy: CONFLICT_POLICY,
            components: ctx.registry.ids(),
            snapshot: *ctx.snapshot(),
            observation: ctx.viewport.observation_mode(),
            ownership_records: ctx.ledger.ownership_count(),
            tab_index_claims: ctx.ledger.claim_count(),
            active_operations: ctx
                .coordinator
                .active()
                .into_iter()
                .map(|(element, operation)| OperationEntry {
                    element: element.to_string(),
                    operation,
                })
                .collect(),
            dropped_operations: ctx.coordinator.dropped(),
            conflict_count: ctx.ledger.conflict_count(),
            blocked_count: ctx.ledger.blocked_count(),
            conflicts: self.conflicts(),
            blocked_claims: ctx.ledger.blocked_claims().cloned().collect(),
            orphans: self.orphans(),
            running_animations: ctx.animations.running_count(),
            pending_timers: ctx.scheduler.pending(),
            last_validation: ctx.last_validation.clone(),
        }
    }

    /// Logged conflicts, oldest first (debug mode only)
    pub fn conflicts(&self) -> Vec<ConflictEvent> {
        self.ctx.ledger.conflicts().cloned().collect()
    }

    /// Tracked elements that have left the document, not yet reclaimed
    pub fn orphans(&self) -> Vec<String> {
        let tree = self.ctx.doc.tree();
        self.ctx
            .ledger
            .tracked_elements()
            .into_iter()
            .filter(|&e| !tree.is_connected(e))
            .map(|e| e.to_string())
            .collect()
    }

    /// Run a validation sweep now
    pub fn validate_now(&mut self) -> ValidationReport {
        self.ctx.validate_state()
    }

    /// Report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }
}
