// crates/testgrid-core/src/runtime/dispatcher.rs
// ============================================================================
// Module: TestGrid Plan Dispatcher
// Description: Deterministic plan execution against a job runner.
// Purpose: Execute every planned job independently and collect run reports.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The dispatcher drives a plan to completion: every job is handed to the
//! runner, reports are collected in plan order, and no outcome affects a
//! sibling job. Environment-level runner faults are folded into failed job
//! reports so a run report always covers the full plan. Dispatch here is
//! sequential and deterministic; concurrent execution is an outer-layer
//! concern that must preserve report order by job index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::HashError;
use crate::core::JobReport;
use crate::core::JobSpec;
use crate::core::RunId;
use crate::core::RunReport;
use crate::core::StepOutcome;
use crate::core::StepStatus;
use crate::core::TestPlan;
use crate::interfaces::JobContext;
use crate::interfaces::JobRunner;
use crate::interfaces::RunnerError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatch errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Plan digest computation failed.
    #[error("plan digest failed: {0}")]
    Digest(#[from] HashError),
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Executes test plans against a job runner.
#[derive(Debug)]
pub struct Dispatcher<R> {
    /// Runner implementation jobs are handed to.
    runner: R,
}

impl<R: JobRunner> Dispatcher<R> {
    /// Creates a dispatcher around the provided runner.
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self {
            runner,
        }
    }

    /// Returns the wrapped runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Executes every job in the plan and collects a run report.
    ///
    /// Jobs are mutually independent: a failed job never stops, retries, or
    /// cancels siblings, and the report covers every planned job in plan
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the plan digest cannot be computed.
    pub fn run(&self, plan: &TestPlan, run_id: RunId) -> Result<RunReport, DispatchError> {
        let plan_digest = plan.digest()?;
        let ctx = JobContext {
            run_id: run_id.clone(),
            workflow_id: plan.workflow_id.clone(),
            trigger: plan.trigger,
        };
        let mut jobs = Vec::with_capacity(plan.jobs.len());
        for job in &plan.jobs {
            jobs.push(execute_job(&self.runner, job, &ctx));
        }
        Ok(RunReport {
            run_id,
            plan_digest,
            jobs,
        })
    }
}

// ============================================================================
// SECTION: Execution Helpers
// ============================================================================

/// Executes one job, folding environment faults into a failed report.
///
/// Exposed for outer layers that parallelize per-job execution and need the
/// same fault-folding behavior as the sequential dispatcher.
pub fn execute_job<R: JobRunner>(runner: &R, job: &JobSpec, ctx: &JobContext) -> JobReport {
    match runner.execute(job, ctx) {
        Ok(report) => report,
        Err(error) => environment_failure_report(job, &error),
    }
}

/// Builds a failed report for a job whose environment never came up.
///
/// The fault is recorded on the job's first step so the report shape stays
/// uniform for consumers.
fn environment_failure_report(job: &JobSpec, error: &RunnerError) -> JobReport {
    let steps = job.steps();
    let first = steps.into_iter().next();
    let outcomes = first
        .map(|step| {
            vec![StepOutcome {
                step,
                status: StepStatus::Failed,
                detail: Some(error.to_string()),
            }]
        })
        .unwrap_or_default();
    JobReport::from_steps(job.job_id.clone(), outcomes)
}
