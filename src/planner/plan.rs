//! Sync plan types and construction.
//!
//! This module turns a diff into an ordered list of operations. Creates and
//! updates come first, in the order inputs are declared, followed by
//! deletions in the order the server reported them.

use chrono::{DateTime, Utc};

use crate::config::InputSpec;
use crate::graylog::ObservedInput;

use super::diff::{DiffDetail, DiffEngine, DiffResult, DiffType, ResourceDiff};

/// A single mutation of the remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a new input.
    Create(InputSpec),
    /// Replace the input with the given id.
    Update(String, InputSpec),
    /// Delete the input with the given id.
    Delete(String),
}

/// A planned operation with display context.
#[derive(Debug, Clone)]
pub struct PlannedAction {
    /// Operation to perform.
    pub operation: Operation,
    /// Title of the affected input.
    pub title: String,
    /// Reason for this action.
    pub reason: String,
    /// Fields that differ, for updates.
    pub details: Vec<DiffDetail>,
}

/// A complete sync plan.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the desired input set this plan is based on.
    pub config_hash: String,
    /// Planned actions in execution order.
    pub actions: Vec<PlannedAction>,
    /// Number of inputs already in sync.
    pub unchanged: usize,
    /// Title ambiguities detected while planning.
    pub warnings: Vec<String>,
}

/// Computes the operations that converge `observed` onto `desired`.
///
/// For each desired input the first observed input with the same title is
/// its match: no match yields a create, a differing match yields an update.
/// Observed inputs whose title is not declared are deleted.
#[must_use]
pub fn reconcile(desired: &[InputSpec], observed: &[ObservedInput]) -> Vec<Operation> {
    DiffEngine::compute_diff(desired, observed)
        .diffs
        .into_iter()
        .filter_map(into_operation)
        .collect()
}

/// Converts one diff decision into an operation, if it needs one.
fn into_operation(diff: ResourceDiff) -> Option<Operation> {
    match (diff.diff_type, diff.observed_id, diff.desired) {
        (DiffType::Create, _, Some(input)) => Some(Operation::Create(input)),
        (DiffType::Update, Some(id), Some(input)) => Some(Operation::Update(id, input)),
        (DiffType::Delete, Some(id), _) => Some(Operation::Delete(id)),
        _ => None,
    }
}

impl Operation {
    /// Short verb naming the operation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(..) => "update",
            Self::Delete(_) => "delete",
        }
    }

    /// Identifier of the input acted upon, if it already exists.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(id, _) | Self::Delete(id) => Some(id),
        }
    }

    /// Desired definition carried by the operation.
    #[must_use]
    pub const fn input(&self) -> Option<&InputSpec> {
        match self {
            Self::Create(input) | Self::Update(_, input) => Some(input),
            Self::Delete(_) => None,
        }
    }
}

impl SyncPlan {
    /// Creates a new plan from a diff result.
    #[must_use]
    pub fn from_diff(diff: &DiffResult, config_hash: &str) -> Self {
        let actions = diff
            .diffs
            .iter()
            .filter_map(|d| {
                let reason = match d.diff_type {
                    DiffType::Create => String::from("Input declared but not on server"),
                    DiffType::Update => format!(
                        "Configuration differs ({})",
                        d.details
                            .iter()
                            .map(|x| x.field.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    DiffType::Delete => String::from("Input not declared in configuration"),
                    DiffType::NoChange => return None,
                };

                into_operation(d.clone()).map(|operation| PlannedAction {
                    operation,
                    title: d.title.clone(),
                    reason,
                    details: d.details.clone(),
                })
            })
            .collect();

        Self {
            created_at: Utc::now(),
            config_hash: config_hash.to_string(),
            actions,
            unchanged: diff.unchanged,
            warnings: diff.warnings.clone(),
        }
    }

    /// Creates an empty plan (no changes needed).
    #[must_use]
    pub fn empty(config_hash: &str) -> Self {
        Self {
            created_at: Utc::now(),
            config_hash: config_hash.to_string(),
            actions: vec![],
            unchanged: 0,
            warnings: vec![],
        }
    }

    /// Returns true if the plan is empty (no changes).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions.
    #[must_use]
    pub const fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns the number of actions of the given kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.actions
            .iter()
            .filter(|a| a.operation.kind() == kind)
            .count()
    }

    /// Returns the operations in execution order.
    #[must_use]
    pub fn operations(&self) -> Vec<&Operation> {
        self.actions.iter().map(|a| &a.operation).collect()
    }
}

impl PlannedAction {
    /// Returns a human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match &self.operation {
            Operation::Create(_) => format!("Create input '{}'", self.title),
            Operation::Update(id, _) => format!("Update input '{}' ({id})", self.title),
            Operation::Delete(id) => format!("Delete input '{}' ({id})", self.title),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(input) => write!(f, "create {}", input.title),
            Self::Update(id, input) => write!(f, "update {} ({id})", input.title),
            Self::Delete(id) => write!(f, "delete {id}"),
        }
    }
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())?;
        if !self.reason.is_empty() {
            write!(f, " ({})", self.reason)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.actions.is_empty() {
            write!(f, "No changes required")?;
        } else {
            writeln!(f, "Sync Plan ({} actions):", self.actions.len())?;
            for (i, action) in self.actions.iter().enumerate() {
                writeln!(f, "  {i}. {action}")?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "\nWarnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }

        Ok(())
    }
}
