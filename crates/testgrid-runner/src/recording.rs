// crates/testgrid-runner/src/recording.rs
// ============================================================================
// Module: Recording Job Runner
// Description: In-memory runner recording executions with scripted outcomes.
// Purpose: Support dry runs and deterministic tests without spawning work.
// Dependencies: testgrid-core, std
// ============================================================================

//! ## Overview
//! The recording runner executes nothing: it records every job it is handed,
//! in order, and reports scripted outcomes. By default every step passes;
//! individual jobs can be scripted to fail at a given step, after which the
//! remaining steps are reported as not run, matching the runner contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use testgrid_core::JobContext;
use testgrid_core::JobId;
use testgrid_core::JobReport;
use testgrid_core::JobRunner;
use testgrid_core::JobSpec;
use testgrid_core::RunnerError;
use testgrid_core::StepOutcome;
use testgrid_core::StepStatus;

// ============================================================================
// SECTION: Recording Runner
// ============================================================================

/// In-memory runner for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    /// Jobs scripted to fail, keyed by job identifier, with the failing
    /// step index.
    failures: BTreeMap<String, usize>,
    /// Executed job identifiers in execution order.
    executed: Mutex<Vec<JobId>>,
}

impl RecordingRunner {
    /// Creates a recording runner where every job passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a job to fail at the provided step index.
    #[must_use]
    pub fn with_failure(mut self, job_id: impl Into<String>, step_index: usize) -> Self {
        self.failures.insert(job_id.into(), step_index);
        self
    }

    /// Returns the executed job identifiers in execution order.
    #[must_use]
    pub fn executed(&self) -> Vec<JobId> {
        self.executed.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl JobRunner for RecordingRunner {
    fn execute(&self, job: &JobSpec, _ctx: &JobContext) -> Result<JobReport, RunnerError> {
        let mut guard = self
            .executed
            .lock()
            .map_err(|_| RunnerError::Environment("recording lock poisoned".to_string()))?;
        guard.push(job.job_id.clone());
        drop(guard);

        let failing_index = self.failures.get(job.job_id.as_str()).copied();
        let mut outcomes = Vec::new();
        for (index, step) in job.steps().into_iter().enumerate() {
            if failing_index == Some(index) {
                outcomes.push(StepOutcome {
                    step,
                    status: StepStatus::Failed,
                    detail: Some("scripted failure".to_string()),
                });
                break;
            }
            outcomes.push(StepOutcome {
                step,
                status: StepStatus::Passed,
                detail: None,
            });
        }
        Ok(JobReport::from_steps(job.job_id.clone(), outcomes))
    }
}
