//! Planning module for input reconciliation.
//!
//! This module handles the comparison between desired and observed inputs,
//! generating sync plans and applying them to a remote.

mod compare;
mod diff;
mod executor;
mod plan;
mod value;

pub use compare::values_equal;
pub use diff::{DiffDetail, DiffEngine, DiffResult, DiffType, ResourceDiff};
pub use executor::{ActionResult, ExecutionResult, PlanExecutor};
pub use plan::{Operation, PlannedAction, SyncPlan, reconcile};
pub use value::{AttrValue, AttributeMap, FieldValue};
