//! Plan executor for applying sync plans.
//!
//! Actions run one at a time, in plan order. The first failure stops the
//! pass; actions already applied stay applied.

use tracing::{error, info};

use crate::error::{ReconcileError, Result};
use crate::remote::RemoteState;

use super::plan::{Operation, SyncPlan};

/// Executor for sync plans.
#[derive(Debug)]
pub struct PlanExecutor<'a, R: RemoteState + ?Sized> {
    /// Remote state being mutated.
    remote: &'a R,
}

/// Result of executing a single action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// Action index.
    pub index: usize,
    /// Operation kind.
    pub operation: &'static str,
    /// Input title, or identifier for deletions without a known title.
    pub target: String,
    /// Identifier of the affected input.
    pub input_id: String,
}

/// Result of executing an entire plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Individual action results.
    pub results: Vec<ActionResult>,
    /// Number of inputs created.
    pub created: usize,
    /// Number of inputs updated.
    pub updated: usize,
    /// Number of inputs deleted.
    pub deleted: usize,
    /// Identifiers assigned to created inputs.
    pub created_ids: Vec<String>,
}

impl<'a, R: RemoteState + ?Sized> PlanExecutor<'a, R> {
    /// Creates a new plan executor.
    #[must_use]
    pub const fn new(remote: &'a R) -> Self {
        Self { remote }
    }

    /// Executes a sync plan.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::OperationFailed`] for the first action that
    /// fails. No further actions are attempted.
    pub async fn execute(&self, plan: &SyncPlan) -> Result<ExecutionResult> {
        info!(
            "Executing sync plan with {} actions against {}",
            plan.actions.len(),
            self.remote.backend_type()
        );

        let mut result = ExecutionResult::default();
        for (index, action) in plan.actions.iter().enumerate() {
            self.apply(index, &action.operation, &action.title, &mut result)
                .await?;
        }
        Ok(result)
    }

    /// Executes a bare operation list, as returned by
    /// [`reconcile`](super::reconcile).
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::OperationFailed`] for the first operation
    /// that fails.
    pub async fn execute_operations(&self, operations: &[Operation]) -> Result<ExecutionResult> {
        let mut result = ExecutionResult::default();
        for (index, operation) in operations.iter().enumerate() {
            let target = operation
                .input()
                .map_or_else(|| operation.target_id().unwrap_or_default(), |i| i.title.as_str())
                .to_string();
            self.apply(index, operation, &target, &mut result).await?;
        }
        Ok(result)
    }

    /// Applies one operation and records its outcome.
    async fn apply(
        &self,
        index: usize,
        operation: &Operation,
        target: &str,
        result: &mut ExecutionResult,
    ) -> Result<()> {
        let outcome = match operation {
            Operation::Create(input) => self.remote.create(input).await,
            Operation::Update(id, input) => self.remote.update(id, input).await.map(|()| id.clone()),
            Operation::Delete(id) => self.remote.delete(id).await.map(|()| id.clone()),
        };

        let input_id = match outcome {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to {} input {target:?}: {e}", operation.kind());
                return Err(ReconcileError::OperationFailed {
                    operation: operation.kind(),
                    target: target.to_string(),
                    applied: result.results.len(),
                    source: Box::new(e),
                }
                .into());
            }
        };

        match operation {
            Operation::Create(_) => {
                info!("Input created {target:?}");
                result.created += 1;
                result.created_ids.push(input_id.clone());
            }
            Operation::Update(..) => {
                info!("Input updated {target:?}");
                result.updated += 1;
            }
            Operation::Delete(_) => {
                info!("Input deleted {target:?}");
                result.deleted += 1;
            }
        }

        result.results.push(ActionResult {
            index,
            operation: operation.kind(),
            target: target.to_string(),
            input_id,
        });
        Ok(())
    }
}

impl ExecutionResult {
    /// Returns the total number of applied actions.
    #[must_use]
    pub const fn total_applied(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Applied {} actions: {} created, {} updated, {} deleted",
            self.total_applied(),
            self.created,
            self.updated,
            self.deleted
        )
    }
}
