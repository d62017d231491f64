// crates/testgrid-core/src/interfaces/mod.rs
// ============================================================================
// Module: TestGrid Interfaces
// Description: Backend-agnostic interfaces for job execution.
// Purpose: Define the contract surface between plans and execution backends.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how TestGrid hands jobs to execution environments
//! without embedding backend-specific details. Implementations must execute
//! the fixed step sequence in order, stop a job at its first failing step,
//! keep jobs mutually independent, and never cancel sibling jobs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::JobReport;
use crate::core::JobSpec;
use crate::core::RunId;
use crate::core::TriggerKind;
use crate::core::WorkflowId;

// ============================================================================
// SECTION: Job Context
// ============================================================================

/// Context handed to runners alongside each job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    /// Run identifier.
    pub run_id: RunId,
    /// Workflow the plan was built from.
    pub workflow_id: WorkflowId,
    /// Trigger event that produced the plan.
    pub trigger: TriggerKind,
}

// ============================================================================
// SECTION: Job Runner
// ============================================================================

/// Runner errors for environment-level faults.
///
/// A failing step is not a runner error: it is reported as a failed step in
/// the job report. Runner errors cover faults that prevent the job's
/// environment from being provisioned or driven at all.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Execution environment could not be provisioned or driven.
    #[error("job environment failure: {0}")]
    Environment(String),
}

/// Executes one job in an isolated environment.
pub trait JobRunner: Send + Sync {
    /// Executes the job's fixed step sequence and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the execution environment itself fails;
    /// step failures are reported inside the returned [`JobReport`].
    fn execute(&self, job: &JobSpec, ctx: &JobContext) -> Result<JobReport, RunnerError>;
}
