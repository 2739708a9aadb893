//! State Validator and Leak Detector
//!
//! Reclaims ledger records of elements that left the document and purges
//! operation slots that were never released.

use serde::{Serialize, Serializer};
use solo_dom::NodeId;

use crate::component::ComponentId;
use crate::context::MenuContext;
use crate::coordinator::OperationKind;
use crate::scheduler::Millis;

/// Problem found by a validation sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Records held for an element no longer in the document
    OrphanedState {
        #[serde(serialize_with = "display")]
        element: NodeId,
        records: usize,
    },
    /// Operation slot older than the staleness threshold
    StaleOperation {
        #[serde(serialize_with = "display")]
        element: NodeId,
        component: ComponentId,
        operation: OperationKind,
        age_ms: Millis,
    },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedState { element, records } => {
                write!(f, "Orphaned state: {} record(s) for detached element {}", records, element)
            }
            Self::StaleOperation { element, component, operation, age_ms } => write!(
                f,
                "Stale operation: {} on {} by {} ({}ms old)",
                operation, element, component, age_ms
            ),
        }
    }
}

/// Result of one sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub all_clear: bool,
    pub issues: Vec<ValidationIssue>,
    pub checked_at: Millis,
}

impl ValidationReport {
    /// Human-readable issue lines
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

pub(crate) fn display<T: std::fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Sweep the context once
pub(crate) fn validate(ctx: &mut MenuContext) -> ValidationReport {
    let now = ctx.now();
    let mut issues = Vec::new();

    for element in ctx.ledger.tracked_elements() {
        if ctx.doc.tree().is_connected(element) {
            continue;
        }
        let records = ctx.ledger.release_element(element);
        issues.push(ValidationIssue::OrphanedState { element, records });
    }

    let threshold = ctx.config.stale_operation_ms;
    for (element, op) in ctx.coordinator.purge_older_than(now, threshold) {
        issues.push(ValidationIssue::StaleOperation {
            element,
            component: op.component.clone(),
            operation: op.kind,
            age_ms: op.age(now),
        });
    }

    for element in ctx.animations.elements() {
        if !ctx.doc.tree().is_connected(element) {
            ctx.animations.cancel(&mut ctx.doc, &mut ctx.scheduler, element);
        }
    }

    if ctx.is_verbose() {
        if issues.is_empty() {
            tracing::debug!("State validation passed");
        }
        for issue in &issues {
            tracing::debug!("{}", issue);
        }
    }

    ValidationReport {
        all_clear: issues.is_empty(),
        issues,
        checked_at: now,
    }
}
