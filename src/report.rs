//! Outcome reporting.
//!
//! The reconciler records what it did; the reporter turns that into the
//! single [`ReconciliationResult`] of a run. No I/O and no decisions here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::IndexState;
use crate::planner::{ActionType, AttributeChange};

/// Collects the operations issued during one run.
#[derive(Debug)]
pub struct OutcomeReporter {
    /// Name of the index being reconciled.
    index: String,
    /// Requested intent.
    state: IndexState,
    /// Operations issued, in order.
    actions: Vec<ActionType>,
    /// Per-attribute before/after values.
    changed_state: BTreeMap<String, AttributeChange>,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// Whether any mutating operation was issued.
    pub changed: bool,
    /// Name of the index.
    pub index: String,
    /// Requested intent.
    pub state: IndexState,
    /// Operations issued, in order.
    pub actions: Vec<ActionType>,
    /// Per-attribute before/after values.
    pub changed_state: BTreeMap<String, AttributeChange>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl OutcomeReporter {
    /// Creates a reporter for one run.
    #[must_use]
    pub fn new(index: impl Into<String>, state: IndexState) -> Self {
        Self {
            index: index.into(),
            state,
            actions: Vec::new(),
            changed_state: BTreeMap::new(),
        }
    }

    /// Records an issued operation.
    pub fn record(&mut self, action: ActionType) {
        self.actions.push(action);
    }

    /// Records an attribute change.
    pub fn record_change(&mut self, change: AttributeChange) {
        self.changed_state.insert(change.attribute.clone(), change);
    }

    /// Produces the final result.
    #[must_use]
    pub fn finish(self) -> ReconciliationResult {
        ReconciliationResult {
            changed: !self.actions.is_empty(),
            index: self.index,
            state: self.state,
            actions: self.actions,
            changed_state: self.changed_state,
            finished_at: Utc::now(),
        }
    }
}

impl ReconciliationResult {
    /// Result of a run that issued nothing, such as a check-mode run.
    #[must_use]
    pub fn unchanged(index: impl Into<String>, state: IndexState) -> Self {
        OutcomeReporter::new(index, state).finish()
    }

    /// Returns true if the given operation was issued.
    #[must_use]
    pub fn performed(&self, action: ActionType) -> bool {
        self.actions.contains(&action)
    }
}

impl std::fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.changed { "changed" } else { "unchanged" };
        writeln!(f, "Index '{}' ({}): {status}", self.index, self.state)?;

        if !self.actions.is_empty() {
            let actions: Vec<String> = self.actions.iter().map(ToString::to_string).collect();
            writeln!(f, "  Actions: {}", actions.join(", "))?;
        }

        for change in self.changed_state.values() {
            writeln!(f, "  {change}")?;
        }

        Ok(())
    }
}
