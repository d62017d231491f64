// crates/testgrid-cli/src/main.rs
// ============================================================================
// Module: TestGrid CLI Entry Point
// Description: Command dispatcher for workflow validation, planning, and runs.
// Purpose: Provide a safe, localized CLI for local matrix workflows.
// Dependencies: clap, testgrid-config, testgrid-core, testgrid-runner, tokio.
// ============================================================================

//! ## Overview
//! The TestGrid CLI loads declarative workflow files, expands their matrix
//! into deterministic test plans, and executes plans against the local
//! process runner. All user-facing strings are routed through the i18n
//! catalog to prepare for future localization. Workflow and config inputs
//! are untrusted and validated fail-closed before use.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod i18n;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use testgrid_config::TestgridConfig;
use testgrid_config::WorkflowConfig;
use testgrid_config::verify_workflow_docs;
use testgrid_config::workflow_yaml_example;
use testgrid_config::write_workflow_docs;
use testgrid_core::HashAlgorithm;
use testgrid_core::HashDigest;
use testgrid_core::JobContext;
use testgrid_core::JobId;
use testgrid_core::JobReport;
use testgrid_core::JobRunner;
use testgrid_core::JobSpec;
use testgrid_core::JobStatus;
use testgrid_core::JobStep;
use testgrid_core::RunId;
use testgrid_core::RunReport;
use testgrid_core::StepOutcome;
use testgrid_core::StepStatus;
use testgrid_core::TestPlan;
use testgrid_core::TriggerKind;
use testgrid_core::runtime::execute_job;
use testgrid_runner::CommandSet;
use testgrid_runner::ProcessRunner;
use testgrid_runner::RecordingRunner;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::i18n::t;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Minimum accepted value for the `--jobs` override.
const MIN_JOBS_OVERRIDE: usize = 1;
/// Maximum accepted value for the `--jobs` override.
const MAX_JOBS_OVERRIDE: usize = 64;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "testgrid", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a workflow definition.
    Validate(ValidateCommand),
    /// Expand a workflow into its test plan.
    Plan(PlanCommand),
    /// Execute a workflow's test plan with the local runner.
    Run(RunCommand),
    /// Print canonical example inputs.
    Example(ExampleCommand),
    /// Workflow documentation utilities.
    Docs {
        /// Selected docs subcommand.
        #[command(subcommand)]
        command: DocsCommand,
    },
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Path to the workflow definition.
    workflow: PathBuf,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Path to the workflow definition.
    workflow: PathBuf,
    /// Trigger event to plan for.
    #[arg(long, value_enum, default_value_t = EventArg::Push)]
    event: EventArg,
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
struct RunCommand {
    /// Path to the workflow definition.
    workflow: PathBuf,
    /// Trigger event to plan for.
    #[arg(long, value_enum, default_value_t = EventArg::Push)]
    event: EventArg,
    /// Optional path to `testgrid.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report the plan without spawning any commands.
    #[arg(long)]
    dry_run: bool,
    /// Override the configured parallel job bound.
    #[arg(long)]
    jobs: Option<usize>,
}

/// Arguments for the `example` subcommand.
#[derive(Args, Debug)]
struct ExampleCommand {
    /// Print the `testgrid.toml` example instead of the workflow example.
    #[arg(long)]
    config: bool,
}

/// Documentation subcommands.
#[derive(Subcommand, Debug)]
enum DocsCommand {
    /// Write the workflow reference markdown to a path.
    Write {
        /// Output path for the generated docs.
        output: PathBuf,
    },
    /// Verify committed docs match the generated output.
    Verify {
        /// Path of the committed docs file.
        path: PathBuf,
    },
}

/// Trigger event argument mapping to [`TriggerKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EventArg {
    /// Source push event.
    #[value(name = "push")]
    Push,
    /// Pull request opened or updated.
    #[value(name = "pull_request")]
    PullRequest,
}

impl From<EventArg> for TriggerKind {
    fn from(value: EventArg) -> Self {
        match value {
            EventArg::Push => Self::Push,
            EventArg::PullRequest => Self::PullRequest,
        }
    }
}

/// Output format argument for the `plan` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Human-readable job table.
    Text,
    /// Canonical JSON plan.
    Json,
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// CLI error carrying a user-facing message.
#[derive(Debug)]
struct CliError {
    /// Localized error message.
    message: String,
}

impl CliError {
    /// Creates a CLI error from a localized message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Plan(command) => command_plan(&command),
        Commands::Run(command) => command_run(command).await,
        Commands::Example(command) => command_example(&command),
        Commands::Docs {
            command,
        } => command_docs(&command),
    }
}

/// Prints top-level help when no subcommand is given.
fn show_help() -> CliResult<()> {
    let mut command = <Cli as clap::CommandFactory>::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let workflow = load_workflow(&command.workflow)?;
    write_stdout_line(&format_validate_summary(&workflow))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats the validation summary line for a workflow.
fn format_validate_summary(workflow: &WorkflowConfig) -> String {
    let triggers =
        workflow.on.iter().map(ToString::to_string).collect::<Vec<String>>().join(", ");
    t!(
        "validate.ok",
        name = workflow.name,
        os = workflow.matrix.os.len(),
        test = workflow.matrix.test.len(),
        triggers = triggers
    )
}

// ============================================================================
// SECTION: Plan Command
// ============================================================================

/// Executes the `plan` command.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let workflow = load_workflow(&command.workflow)?;
    let plan = workflow
        .plan(command.event.into())
        .map_err(|err| CliError::new(t!("plan.build_failed", error = err)))?;
    let output = match command.format {
        FormatArg::Text => format_plan_text(&plan)?,
        FormatArg::Json => serde_json::to_string_pretty(&plan)
            .map_err(|err| CliError::new(t!("plan.serialize_failed", error = err)))?,
    };
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats the human-readable plan listing with its digest.
fn format_plan_text(plan: &TestPlan) -> CliResult<String> {
    let mut out = t!(
        "plan.header",
        workflow = plan.workflow_id,
        trigger = plan.trigger,
        count = plan.jobs.len()
    );
    for job in &plan.jobs {
        out.push('\n');
        out.push_str(&format_job_line(job));
    }
    let digest =
        plan.digest().map_err(|err| CliError::new(t!("plan.build_failed", error = err)))?;
    out.push('\n');
    out.push_str(&t!("plan.digest", digest = digest_label(&digest)));
    Ok(out)
}

/// Formats one job listing line.
fn format_job_line(job: &JobSpec) -> String {
    let mut line = format!(
        "  {}: {} ({}), {}, toolchain {}",
        job.job_id, job.os_name, job.os_image, job.test_name, job.toolchain_channel
    );
    if let Some(flag) = &job.extra_flag {
        line.push_str(", flag ");
        line.push_str(flag);
    }
    line
}

/// Formats a digest as `algorithm:value`.
fn digest_label(digest: &HashDigest) -> String {
    let algorithm = match digest.algorithm {
        HashAlgorithm::Sha256 => "sha256",
    };
    format!("{algorithm}:{}", digest.value)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let workflow = load_workflow(&command.workflow)?;
    let plan = workflow
        .plan(command.event.into())
        .map_err(|err| CliError::new(t!("plan.build_failed", error = err)))?;
    let config = TestgridConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let parallelism = resolve_parallelism(command.jobs, &config)?;
    let run_id = next_run_id(&plan);

    let report = if command.dry_run {
        execute_plan(Arc::new(RecordingRunner::new()), &plan, run_id, parallelism).await?
    } else {
        let runner = ProcessRunner::new(CommandSet {
            checkout: config.runner.checkout_command.clone(),
            toolchain: config.runner.toolchain_command.clone(),
            test: config.runner.test_command.clone(),
        });
        execute_plan(Arc::new(runner), &plan, run_id, parallelism).await?
    };

    write_stdout_line(&format_run_text(&report))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if report.passed() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

/// Resolves the parallel job bound from the override and config.
fn resolve_parallelism(jobs: Option<usize>, config: &TestgridConfig) -> CliResult<usize> {
    match jobs {
        None => Ok(config.runner.max_parallel_jobs),
        Some(value) if (MIN_JOBS_OVERRIDE ..= MAX_JOBS_OVERRIDE).contains(&value) => Ok(value),
        Some(_) => Err(CliError::new(t!(
            "run.jobs_out_of_bounds",
            min = MIN_JOBS_OVERRIDE,
            max = MAX_JOBS_OVERRIDE
        ))),
    }
}

/// Derives a run identifier from the workflow and wall-clock seconds.
fn next_run_id(plan: &TestPlan) -> RunId {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());
    RunId::new(format!("{}-{seconds}", plan.workflow_id))
}

/// Executes every planned job concurrently, bounded by `parallelism`.
///
/// Report order follows plan order regardless of completion order, and a
/// worker fault never affects sibling jobs.
async fn execute_plan<R>(
    runner: Arc<R>,
    plan: &TestPlan,
    run_id: RunId,
    parallelism: usize,
) -> CliResult<RunReport>
where
    R: JobRunner + 'static,
{
    let plan_digest =
        plan.digest().map_err(|err| CliError::new(t!("plan.build_failed", error = err)))?;
    let ctx = JobContext {
        run_id: run_id.clone(),
        workflow_id: plan.workflow_id.clone(),
        trigger: plan.trigger,
    };
    let semaphore = Arc::new(Semaphore::new(parallelism.max(MIN_JOBS_OVERRIDE)));
    let mut workers: JoinSet<(usize, JobReport)> = JoinSet::new();

    for (index, job) in plan.jobs.iter().enumerate() {
        let job = job.clone();
        let fallback_id = job.job_id.clone();
        let fallback_step = job.steps().into_iter().next();
        let runner = Arc::clone(&runner);
        let ctx = ctx.clone();
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            let permit = semaphore.acquire_owned().await;
            let joined =
                tokio::task::spawn_blocking(move || execute_job(runner.as_ref(), &job, &ctx))
                    .await;
            drop(permit);
            let report = match joined {
                Ok(report) => report,
                Err(err) => worker_failure_report(
                    fallback_id,
                    fallback_step,
                    &t!("run.worker_failed", error = err),
                ),
            };
            (index, report)
        });
    }

    let mut slots: Vec<Option<JobReport>> = plan.jobs.iter().map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        if let Ok((index, report)) = joined
            && let Some(slot) = slots.get_mut(index)
        {
            *slot = Some(report);
        }
    }

    let jobs = slots
        .into_iter()
        .zip(&plan.jobs)
        .map(|(slot, job)| {
            slot.unwrap_or_else(|| {
                worker_failure_report(
                    job.job_id.clone(),
                    job.steps().into_iter().next(),
                    &t!("run.worker_failed", error = "worker vanished"),
                )
            })
        })
        .collect();

    Ok(RunReport {
        run_id,
        plan_digest,
        jobs,
    })
}

/// Builds a failed report for a job whose worker never returned.
fn worker_failure_report(job_id: JobId, first_step: Option<JobStep>, detail: &str) -> JobReport {
    let steps = first_step
        .map(|step| {
            vec![StepOutcome {
                step,
                status: StepStatus::Failed,
                detail: Some(detail.to_string()),
            }]
        })
        .unwrap_or_default();
    JobReport {
        job_id,
        status: JobStatus::Failed,
        steps,
    }
}

/// Formats the per-job run listing and summary.
fn format_run_text(report: &RunReport) -> String {
    let mut out = String::new();
    for job in &report.jobs {
        if job.passed() {
            out.push_str(&t!("run.job.passed", job = job.job_id));
        } else {
            match failed_step_detail(job) {
                Some(detail) => {
                    out.push_str(&t!("run.job.failed", job = job.job_id, detail = detail));
                }
                None => out.push_str(&t!("run.job.failed_no_detail", job = job.job_id)),
            }
        }
        out.push('\n');
    }
    let failed = report.failed_count();
    if failed == 0 {
        out.push_str(&t!("run.summary.passed", count = report.jobs.len()));
    } else {
        out.push_str(&t!("run.summary.failed", failed = failed, count = report.jobs.len()));
    }
    out.push('\n');
    out.push_str(&t!("plan.digest", digest = digest_label(&report.plan_digest)));
    out
}

/// Returns the failing step's label and detail for a failed job.
fn failed_step_detail(job: &JobReport) -> Option<String> {
    let outcome = job.steps.iter().find(|outcome| outcome.status == StepStatus::Failed)?;
    let label = outcome.step.label();
    match &outcome.detail {
        Some(detail) => Some(format!("{label}: {detail}")),
        None => Some(label.to_string()),
    }
}

// ============================================================================
// SECTION: Example Command
// ============================================================================

/// Executes the `example` command.
fn command_example(command: &ExampleCommand) -> CliResult<ExitCode> {
    let output = if command.config {
        testgrid_config::config_toml_example()
    } else {
        workflow_yaml_example()
    };
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Docs Command
// ============================================================================

/// Executes the `docs` command.
fn command_docs(command: &DocsCommand) -> CliResult<ExitCode> {
    match command {
        DocsCommand::Write {
            output,
        } => {
            write_workflow_docs(output)
                .map_err(|err| CliError::new(t!("docs.write_failed", error = err)))?;
            write_stdout_line(&t!("docs.write.ok", path = output.display()))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        DocsCommand::Verify {
            path,
        } => {
            verify_workflow_docs(path)
                .map_err(|err| CliError::new(t!("docs.verify_failed", error = err)))?;
            write_stdout_line(&t!("docs.verify.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates a workflow file, localizing failures.
fn load_workflow(path: &std::path::Path) -> CliResult<WorkflowConfig> {
    WorkflowConfig::load(path).map_err(|err| {
        CliError::new(t!("workflow.load_failed", path = path.display(), error = err))
    })
}

/// Writes raw bytes to stdout.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
