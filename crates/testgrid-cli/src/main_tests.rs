// crates/testgrid-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, formatting, and dispatch.
// Purpose: Ensure CLI surfaces stay deterministic and fail closed.
// ============================================================================

//! ## Overview
//! Validates argument mapping, plan/run formatting, parallelism bounds, and
//! concurrent execution ordering for the CLI entry point.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use clap::Parser;
use testgrid_config::TestgridConfig;
use testgrid_config::WorkflowConfig;
use testgrid_config::workflow_yaml_example;
use testgrid_core::TestPlan;
use testgrid_core::TriggerKind;
use testgrid_runner::RecordingRunner;

use super::Cli;
use super::Commands;
use super::EventArg;
use super::FormatArg;
use super::digest_label;
use super::execute_plan;
use super::format_job_line;
use super::format_plan_text;
use super::format_run_text;
use super::format_validate_summary;
use super::resolve_parallelism;
use super::worker_failure_report;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn canonical_workflow() -> WorkflowConfig {
    WorkflowConfig::from_yaml(&workflow_yaml_example())
        .unwrap_or_else(|err| panic!("example must parse: {err}"))
}

fn canonical_plan() -> TestPlan {
    canonical_workflow()
        .plan(TriggerKind::Push)
        .unwrap_or_else(|err| panic!("example must plan: {err}"))
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn plan_arguments_parse_with_event_and_format() {
    let cli = Cli::try_parse_from([
        "testgrid",
        "plan",
        "ci.yml",
        "--event",
        "pull_request",
        "--format",
        "json",
    ])
    .unwrap_or_else(|err| panic!("parse: {err}"));
    match cli.command {
        Some(Commands::Plan(command)) => {
            assert_eq!(command.event, EventArg::PullRequest);
            assert_eq!(command.format, FormatArg::Json);
        }
        other => panic!("expected plan command, got {other:?}"),
    }
}

#[test]
fn run_arguments_default_to_push_and_process_runner() {
    let cli = Cli::try_parse_from(["testgrid", "run", "ci.yml"])
        .unwrap_or_else(|err| panic!("parse: {err}"));
    match cli.command {
        Some(Commands::Run(command)) => {
            assert_eq!(command.event, EventArg::Push);
            assert!(!command.dry_run);
            assert_eq!(command.jobs, None);
            assert_eq!(command.config, None);
        }
        other => panic!("expected run command, got {other:?}"),
    }
}

#[test]
fn event_arguments_map_to_trigger_kinds() {
    assert_eq!(TriggerKind::from(EventArg::Push), TriggerKind::Push);
    assert_eq!(TriggerKind::from(EventArg::PullRequest), TriggerKind::PullRequest);
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

#[test]
fn validate_summary_counts_variants_and_triggers() {
    let summary = format_validate_summary(&canonical_workflow());
    assert!(summary.contains("Workflow ci is valid"), "unexpected summary: {summary}");
    assert!(summary.contains("3 os variant(s)"), "unexpected summary: {summary}");
    assert!(summary.contains("2 test variant(s)"), "unexpected summary: {summary}");
    assert!(summary.contains("push, pull_request"), "unexpected summary: {summary}");
}

#[test]
fn plan_text_lists_jobs_and_digest() {
    let plan = canonical_plan();
    let text = format_plan_text(&plan).unwrap_or_else(|err| panic!("format: {err}"));
    assert!(text.starts_with("Plan for workflow ci on push: 6 job(s)"), "unexpected: {text}");
    assert!(text.contains("linux-stable: linux (ubuntu-latest), Stable, toolchain stable"));
    assert!(text.contains("flag --all-features"));
    assert!(text.contains("Plan digest: sha256:"));
}

#[test]
fn job_lines_omit_the_flag_suffix_when_absent() {
    let plan = canonical_plan();
    let line = format_job_line(&plan.jobs[0]);
    assert!(!line.contains("flag"), "unexpected line: {line}");
}

#[test]
fn digest_labels_prefix_the_algorithm() {
    let plan = canonical_plan();
    let digest = plan.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    let label = digest_label(&digest);
    assert!(label.starts_with("sha256:"), "unexpected label: {label}");
    assert_eq!(label.len(), "sha256:".len() + 64);
}

// ============================================================================
// SECTION: Parallelism Bounds
// ============================================================================

#[test]
fn parallelism_defaults_to_the_configured_bound() {
    let config = TestgridConfig::default();
    let resolved = resolve_parallelism(None, &config)
        .unwrap_or_else(|err| panic!("resolve: {err}"));
    assert_eq!(resolved, config.runner.max_parallel_jobs);
}

#[test]
fn parallelism_override_is_bounded() {
    let config = TestgridConfig::default();
    assert!(resolve_parallelism(Some(0), &config).is_err());
    assert!(resolve_parallelism(Some(65), &config).is_err());
    let resolved = resolve_parallelism(Some(2), &config)
        .unwrap_or_else(|err| panic!("resolve: {err}"));
    assert_eq!(resolved, 2);
}

// ============================================================================
// SECTION: Concurrent Execution
// ============================================================================

#[tokio::test]
async fn concurrent_execution_preserves_plan_order() {
    let plan = canonical_plan();
    let runner = Arc::new(RecordingRunner::new());
    let report = execute_plan(Arc::clone(&runner), &plan, "run-1".into(), 4)
        .await
        .unwrap_or_else(|err| panic!("execute: {err}"));

    assert!(report.passed());
    let reported: Vec<String> = report.jobs.iter().map(|job| job.job_id.to_string()).collect();
    let planned: Vec<String> = plan.jobs.iter().map(|job| job.job_id.to_string()).collect();
    assert_eq!(reported, planned);
    assert_eq!(runner.executed().len(), 6);
}

#[tokio::test]
async fn concurrent_failures_stay_independent() {
    let plan = canonical_plan();
    let runner = Arc::new(RecordingRunner::new().with_failure("windows-stable", 2));
    let report = execute_plan(runner, &plan, "run-2".into(), 2)
        .await
        .unwrap_or_else(|err| panic!("execute: {err}"));

    assert!(!report.passed());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.jobs.len(), 6);
    let text = format_run_text(&report);
    assert!(text.contains("FAIL windows-stable: run_tests: scripted failure"), "{text}");
    assert!(text.contains("PASS linux-stable"), "{text}");
    assert!(text.contains("1 of 6 job(s) failed."), "{text}");
}

#[tokio::test]
async fn serial_execution_matches_the_plan_order_too() {
    let plan = canonical_plan();
    let runner = Arc::new(RecordingRunner::new());
    let report = execute_plan(Arc::clone(&runner), &plan, "run-3".into(), 1)
        .await
        .unwrap_or_else(|err| panic!("execute: {err}"));
    assert!(report.passed());
    let executed: Vec<String> =
        runner.executed().iter().map(std::string::ToString::to_string).collect();
    let planned: Vec<String> = plan.jobs.iter().map(|job| job.job_id.to_string()).collect();
    assert_eq!(executed, planned);
}

// ============================================================================
// SECTION: Worker Failure Shape
// ============================================================================

#[test]
fn worker_failure_reports_fail_on_the_first_step() {
    let plan = canonical_plan();
    let job = &plan.jobs[0];
    let report = worker_failure_report(
        job.job_id.clone(),
        job.steps().into_iter().next(),
        "worker vanished",
    );
    assert!(!report.passed());
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].detail.as_deref(), Some("worker vanished"));
}

// ============================================================================
// SECTION: Workflow Loading
// ============================================================================

#[test]
fn load_workflow_reads_a_workflow_from_disk() {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let path = dir.path().join("ci.yml");
    std::fs::write(&path, workflow_yaml_example())
        .unwrap_or_else(|err| panic!("write workflow: {err}"));
    let workflow =
        super::load_workflow(&path).unwrap_or_else(|err| panic!("load must succeed: {err}"));
    assert_eq!(workflow.name, "ci");
}

#[test]
fn load_workflow_localizes_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let path = dir.path().join("absent.yml");
    let error = match super::load_workflow(&path) {
        Err(error) => error,
        Ok(_) => panic!("missing workflow must fail"),
    };
    let message = error.to_string();
    assert!(message.contains("Failed to load workflow"), "unexpected message: {message}");
    assert!(message.contains("absent.yml"), "unexpected message: {message}");
}

// ============================================================================
// SECTION: Run Text Summary
// ============================================================================

#[test]
fn run_text_reports_an_all_passed_summary() {
    let plan = canonical_plan();
    let digest = plan.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    let report = testgrid_core::RunReport {
        run_id: "run-4".into(),
        plan_digest: digest,
        jobs: Vec::new(),
    };
    let text = format_run_text(&report);
    assert!(text.contains("All 0 job(s) passed."), "{text}");
    assert!(text.contains("Plan digest: sha256:"), "{text}");
}
