// crates/testgrid-runner/src/process.rs
// ============================================================================
// Module: Process Job Runner
// Description: Shell-backed runner executing the fixed job steps locally.
// Purpose: Drive checkout, toolchain install, and tests as local commands.
// Dependencies: testgrid-core, std
// ============================================================================

//! ## Overview
//! The process runner renders a command template per step and spawns it
//! through the platform shell. A non-zero exit fails the step and ends the
//! job; later steps do not run. Spawn failures are environment faults rather
//! than step failures. Jobs share no mutable state, so the runner may be
//! called from concurrent workers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Command;

use testgrid_core::JobContext;
use testgrid_core::JobReport;
use testgrid_core::JobRunner;
use testgrid_core::JobSpec;
use testgrid_core::JobStep;
use testgrid_core::RunnerError;
use testgrid_core::StepOutcome;
use testgrid_core::StepStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum stderr bytes preserved in a failed step's detail.
const MAX_DETAIL_BYTES: usize = 512;

// ============================================================================
// SECTION: Command Templates
// ============================================================================

/// Command templates for the fixed step sequence.
///
/// Templates may reference `{channel}` (the job's toolchain channel) and
/// `{flag}` (the job's extra flag, empty when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    /// Template for the checkout step.
    pub checkout: String,
    /// Template for the toolchain install step.
    pub toolchain: String,
    /// Template for the test invocation step.
    pub test: String,
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// Runner executing job steps as local shell commands.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Command templates rendered per step.
    commands: CommandSet,
}

impl ProcessRunner {
    /// Creates a process runner with the provided command templates.
    #[must_use]
    pub fn new(commands: CommandSet) -> Self {
        Self {
            commands,
        }
    }

    /// Returns the rendered command line for one step of a job.
    #[must_use]
    pub fn command_line(&self, job: &JobSpec, step: &JobStep) -> String {
        let template = match step {
            JobStep::Checkout => &self.commands.checkout,
            JobStep::InstallToolchain {
                ..
            } => &self.commands.toolchain,
            JobStep::RunTests {
                ..
            } => &self.commands.test,
        };
        render(template, job.toolchain_channel.as_str(), job.extra_flag.as_deref())
    }
}

impl JobRunner for ProcessRunner {
    fn execute(&self, job: &JobSpec, _ctx: &JobContext) -> Result<JobReport, RunnerError> {
        let mut outcomes = Vec::new();
        for step in job.steps() {
            let line = self.command_line(job, &step);
            let outcome = run_step(step, &line)?;
            let failed = outcome.status == StepStatus::Failed;
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        Ok(JobReport::from_steps(job.job_id.clone(), outcomes))
    }
}

// ============================================================================
// SECTION: Execution Helpers
// ============================================================================

/// Renders a command template for the provided channel and flag.
///
/// An absent flag substitutes as the empty string and the rendered line is
/// whitespace-normalized so templates like `cargo +{channel} test {flag}`
/// stay well formed either way.
fn render(template: &str, channel: &str, flag: Option<&str>) -> String {
    let rendered =
        template.replace("{channel}", channel).replace("{flag}", flag.unwrap_or_default());
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Runs one rendered command line and records the step outcome.
fn run_step(step: JobStep, line: &str) -> Result<StepOutcome, RunnerError> {
    let output = shell_command(line)
        .output()
        .map_err(|err| RunnerError::Environment(format!("failed to spawn `{line}`: {err}")))?;
    if output.status.success() {
        return Ok(StepOutcome {
            step,
            status: StepStatus::Passed,
            detail: None,
        });
    }
    let mut detail = match output.status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        let mut end = trimmed.len().min(MAX_DETAIL_BYTES);
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        detail.push_str(": ");
        detail.push_str(&trimmed[.. end]);
    }
    Ok(StepOutcome {
        step,
        status: StepStatus::Failed,
        detail: Some(detail),
    })
}

/// Builds the platform shell invocation for a rendered command line.
#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

/// Builds the platform shell invocation for a rendered command line.
#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}
