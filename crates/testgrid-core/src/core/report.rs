// crates/testgrid-core/src/core/report.rs
// ============================================================================
// Module: TestGrid Run Reports
// Description: Per-step, per-job, and per-run outcome records.
// Purpose: Capture independent job results with no cross-job propagation.
// Dependencies: crate::core::{hashing, identifiers, job}, serde
// ============================================================================

//! ## Overview
//! Run reports record the outcome of executing a plan. Each job reports
//! independently: a failed step fails its job and ends it, later steps of
//! that job do not run, and sibling jobs are unaffected. There is no retry
//! policy and no cancellation propagation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::JobId;
use crate::core::identifiers::RunId;
use crate::core::job::JobStep;

// ============================================================================
// SECTION: Step Outcomes
// ============================================================================

/// Outcome status for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step completed successfully.
    Passed,
    /// Step failed.
    Failed,
}

/// Recorded outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Step that was executed.
    pub step: JobStep,
    /// Outcome status.
    pub status: StepStatus,
    /// Optional human-readable detail (exit status, fault description).
    pub detail: Option<String>,
}

// ============================================================================
// SECTION: Job Reports
// ============================================================================

/// Job lifecycle outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Every step of the job passed.
    Passed,
    /// A step failed or the environment could not be provisioned.
    Failed,
}

/// Outcome record for one executed job.
///
/// # Invariants
/// - `steps` preserves execution order; steps after the first failure are
///   absent because they did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    /// Job the report belongs to.
    pub job_id: JobId,
    /// Derived job status.
    pub status: JobStatus,
    /// Executed steps in order.
    pub steps: Vec<StepOutcome>,
}

impl JobReport {
    /// Builds a report from executed steps, deriving the job status.
    #[must_use]
    pub fn from_steps(job_id: JobId, steps: Vec<StepOutcome>) -> Self {
        let status = if steps.iter().any(|outcome| outcome.status == StepStatus::Failed) {
            JobStatus::Failed
        } else {
            JobStatus::Passed
        };
        Self {
            job_id,
            status,
            steps,
        }
    }

    /// Returns true when the job passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == JobStatus::Passed
    }
}

// ============================================================================
// SECTION: Run Reports
// ============================================================================

/// Outcome record for one plan execution.
///
/// # Invariants
/// - `jobs` holds exactly one report per planned job, in plan order,
///   regardless of individual outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: RunId,
    /// Canonical digest of the executed plan.
    pub plan_digest: HashDigest,
    /// Per-job reports in plan order.
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    /// Returns true when every job in the run passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.jobs.iter().all(JobReport::passed)
    }

    /// Returns the number of failed jobs.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.jobs.iter().filter(|job| !job.passed()).count()
    }
}
