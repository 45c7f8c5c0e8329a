//! Reconciler for maintaining desired state.
//!
//! This module implements one reconciliation pass: the observed inputs are
//! fetched once, diffed against the declared inputs, and the resulting plan
//! is applied. Nothing is retained between passes.

use tracing::{debug, info};

use crate::config::{ConfigHasher, InputSpec};
use crate::error::Result;
use crate::graylog::ObservedInput;
use crate::planner::{DiffEngine, DiffResult, DiffType, PlanExecutor, SyncPlan};
use crate::remote::RemoteState;

/// Reconciler for a declared input set.
pub struct Reconciler<'a, R: RemoteState + ?Sized> {
    /// Desired inputs.
    desired: &'a [InputSpec],
    /// Remote state.
    remote: &'a R,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReconciliationResult {
    /// Number of inputs created.
    pub created: usize,
    /// Number of inputs updated.
    pub updated: usize,
    /// Number of inputs deleted.
    pub deleted: usize,
    /// Number of inputs unchanged.
    pub unchanged: usize,
    /// Identifiers assigned to created inputs.
    pub created_ids: Vec<String>,
    /// Title ambiguities found while planning.
    pub warnings: Vec<String>,
}

/// Report of drift detection.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DriftReport {
    /// Whether drift was detected.
    pub has_drift: bool,
    /// Titles of inputs that would change, with the pending action.
    pub drifted_resources: Vec<String>,
    /// Number of declared inputs.
    pub total_resources: usize,
    /// Number of inputs observed on the server.
    pub observed_count: usize,
}

impl<'a, R: RemoteState + ?Sized> Reconciler<'a, R> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(desired: &'a [InputSpec], remote: &'a R) -> Self {
        Self { desired, remote }
    }

    /// Fetches the observed inputs and computes the diff.
    async fn observe(&self) -> Result<(Vec<ObservedInput>, DiffResult)> {
        let observed = self.remote.fetch_all().await?;
        debug!(
            "Found {} inputs on {}",
            observed.len(),
            self.remote.backend_type()
        );

        let diff = DiffEngine::compute_diff(self.desired, &observed);
        info!(
            "Diff: {} creates, {} updates, {} deletes, {} unchanged",
            diff.creates, diff.updates, diff.deletes, diff.unchanged
        );
        Ok((observed, diff))
    }

    /// Computes the plan for one pass without applying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the observed inputs cannot be fetched.
    pub async fn plan(&self) -> Result<SyncPlan> {
        let (_, diff) = self.observe().await?;
        Ok(SyncPlan::from_diff(&diff, &ConfigHasher::hash_inputs(self.desired)))
    }

    /// Performs a full reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or if any operation fails. In the
    /// latter case operations applied before the failure are not undone.
    pub async fn reconcile(&self) -> Result<ReconciliationResult> {
        info!("Starting reconciliation of {} inputs", self.desired.len());

        let plan = self.plan().await?;
        self.apply(&plan).await
    }

    /// Applies a previously computed plan.
    ///
    /// # Errors
    ///
    /// Returns an error at the first failing operation.
    pub async fn apply(&self, plan: &SyncPlan) -> Result<ReconciliationResult> {
        if plan.is_empty() {
            info!("No changes required - state is converged");
            return Ok(ReconciliationResult {
                unchanged: plan.unchanged,
                warnings: plan.warnings.clone(),
                ..ReconciliationResult::default()
            });
        }

        let executed = PlanExecutor::new(self.remote).execute(plan).await?;

        Ok(ReconciliationResult {
            created: executed.created,
            updated: executed.updated,
            deleted: executed.deleted,
            unchanged: plan.unchanged,
            created_ids: executed.created_ids,
            warnings: plan.warnings.clone(),
        })
    }

    /// Checks for drift without applying changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the observed inputs cannot be fetched.
    pub async fn check_drift(&self) -> Result<DriftReport> {
        info!("Checking for drift");

        let (observed, diff) = self.observe().await?;

        let drifted_resources = diff
            .diffs
            .iter()
            .filter(|d| d.diff_type != DiffType::NoChange)
            .map(|d| format!("{} ({})", d.title, d.diff_type))
            .collect();

        Ok(DriftReport {
            has_drift: diff.has_changes(),
            drifted_resources,
            total_resources: self.desired.len(),
            observed_count: observed.len(),
        })
    }
}

impl ReconciliationResult {
    /// Returns the number of applied changes.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

impl DriftReport {
    /// Returns true if the state is converged (no drift).
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        !self.has_drift
    }
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_drift {
            writeln!(f, "Drift detected:")?;
            for resource in &self.drifted_resources {
                writeln!(f, "  - {resource}")?;
            }
        } else {
            write!(f, "No drift detected - state is converged")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Reconciliation complete:")?;
        writeln!(f, "  Created: {}", self.created)?;
        writeln!(f, "  Updated: {}", self.updated)?;
        writeln!(f, "  Deleted: {}", self.deleted)?;
        writeln!(f, "  Unchanged: {}", self.unchanged)?;

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        Ok(())
    }
}
