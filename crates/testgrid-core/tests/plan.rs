//! Test plan construction tests for testgrid-core.
// crates/testgrid-core/tests/plan.rs
// =============================================================================
// Module: Test Plan Tests
// Description: Validate projection, job identity, and plan determinism.
// Purpose: Ensure plans are exactly the Cartesian product of the axes.
// =============================================================================

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

use serde_json::json;
use testgrid_core::AxisSpec;
use testgrid_core::JobStep;
use testgrid_core::MatrixSpec;
use testgrid_core::OsName;
use testgrid_core::PlanError;
use testgrid_core::TestPlan;
use testgrid_core::TriggerKind;

mod common;

fn build_canonical_plan() -> TestPlan {
    TestPlan::build("ci".into(), TriggerKind::Push, &common::canonical_matrix())
        .unwrap_or_else(|err| panic!("canonical plan must build: {err}"))
}

#[test]
fn canonical_matrix_expands_to_six_jobs() {
    let plan = build_canonical_plan();
    assert_eq!(plan.jobs.len(), 6);

    let linux_stable = &plan.jobs[0];
    assert_eq!(linux_stable.job_id.as_str(), "linux-stable");
    assert_eq!(linux_stable.os_name, OsName::Linux);
    assert_eq!(linux_stable.os_image.as_str(), "ubuntu-latest");
    assert_eq!(linux_stable.test_name, "Stable");
    assert_eq!(linux_stable.toolchain_channel.as_str(), "stable");
    assert_eq!(linux_stable.extra_flag, None);

    let macos_all = &plan.jobs[5];
    assert_eq!(macos_all.job_id.as_str(), "macos-stable-all-features");
    assert_eq!(macos_all.os_name, OsName::Macos);
    assert_eq!(macos_all.os_image.as_str(), "macos-latest");
    assert_eq!(macos_all.test_name, "Stable (--all-features)");
    assert_eq!(macos_all.extra_flag.as_deref(), Some("--all-features"));
}

#[test]
fn dropping_one_os_variant_preserves_surviving_jobs() {
    let full = build_canonical_plan();
    let mut matrix = common::canonical_matrix();
    matrix.axes[0].variants.retain(|variant| variant.variant_id.as_str() != "windows");
    let reduced = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .unwrap_or_else(|err| panic!("reduced plan must build: {err}"));

    assert_eq!(reduced.jobs.len(), 4);
    let survivors: Vec<_> =
        full.jobs.into_iter().filter(|job| job.os_name != OsName::Windows).collect();
    assert_eq!(reduced.jobs, survivors);
}

#[test]
fn job_steps_follow_the_fixed_sequence() {
    let plan = build_canonical_plan();
    let steps = plan.jobs[5].steps();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0], JobStep::Checkout);
    assert_eq!(steps[1], JobStep::InstallToolchain {
        channel: "stable".into(),
    });
    assert_eq!(steps[2], JobStep::RunTests {
        extra_flag: Some("--all-features".to_string()),
    });
    assert_eq!(steps[0].label(), "checkout");
    assert_eq!(steps[1].label(), "install_toolchain");
    assert_eq!(steps[2].label(), "run_tests");
}

#[test]
fn plan_digest_is_stable_across_rebuilds() {
    let first = build_canonical_plan();
    let second = build_canonical_plan();
    let first_digest = first.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    let second_digest = second.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    assert_eq!(first_digest, second_digest);
}

#[test]
fn plan_digest_changes_when_the_matrix_changes() {
    let full = build_canonical_plan();
    let mut matrix = common::canonical_matrix();
    matrix.axes[0].variants.pop();
    let reduced = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .unwrap_or_else(|err| panic!("reduced plan must build: {err}"));
    let full_digest = full.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    let reduced_digest = reduced.digest().unwrap_or_else(|err| panic!("digest: {err}"));
    assert_ne!(full_digest, reduced_digest);
}

#[test]
fn missing_projection_field_is_a_load_time_fault() {
    let mut matrix = common::canonical_matrix();
    matrix.axes[0].variants[0].fields.remove("image");
    let error = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .err()
        .unwrap_or_else(|| panic!("expected projection failure"));
    assert!(matches!(error, PlanError::Projection { .. }));
    assert!(error.to_string().contains("missing field `image`"));
}

#[test]
fn unknown_os_name_is_a_load_time_fault() {
    let mut matrix = common::canonical_matrix();
    matrix.axes[0].variants[0].fields.insert("os".to_string(), json!("beos"));
    let error = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .err()
        .unwrap_or_else(|| panic!("expected projection failure"));
    assert!(error.to_string().contains("not a known operating system name"));
}

#[test]
fn mistyped_projection_field_is_a_load_time_fault() {
    let mut matrix = common::canonical_matrix();
    matrix.axes[1].variants[0].fields.insert("toolchain".to_string(), json!(7));
    let error = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .err()
        .unwrap_or_else(|| panic!("expected projection failure"));
    assert!(error.to_string().contains("field `toolchain` must be a string"));
}

#[test]
fn blank_extra_flag_is_a_load_time_fault() {
    let mut matrix = common::canonical_matrix();
    matrix.axes[1].variants[1].fields.insert("flag".to_string(), json!("  "));
    let error = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .err()
        .unwrap_or_else(|| panic!("expected projection failure"));
    assert!(error.to_string().contains("field `flag` must not be blank"));
}

#[test]
fn null_extra_flag_means_no_flag() {
    let mut matrix = common::canonical_matrix();
    matrix.axes[1].variants[0].fields.insert("flag".to_string(), json!(null));
    let plan = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .unwrap_or_else(|err| panic!("plan must build: {err}"));
    assert_eq!(plan.jobs[0].extra_flag, None);
}

#[test]
fn colliding_job_identifiers_are_rejected() {
    let os_fields = [
        ("os", json!("linux")),
        ("image", json!("ubuntu-latest")),
        ("name", json!("Stable")),
        ("toolchain", json!("stable")),
    ];
    let matrix = MatrixSpec {
        axes: vec![
            AxisSpec {
                axis_id: "first".into(),
                variants: vec![
                    common::variant("a", "A", &os_fields),
                    common::variant("a-b", "AB", &os_fields),
                ],
            },
            AxisSpec {
                axis_id: "second".into(),
                variants: vec![
                    common::variant("b-c", "BC", &[]),
                    common::variant("c", "C", &[]),
                ],
            },
        ],
    };
    let error = TestPlan::build("ci".into(), TriggerKind::Push, &matrix)
        .err()
        .unwrap_or_else(|| panic!("expected duplicate job identifier"));
    assert!(error.to_string().contains("duplicate job identifier: a-b-c"));
}

#[test]
fn trigger_kinds_have_stable_labels() {
    assert_eq!(TriggerKind::Push.to_string(), "push");
    assert_eq!(TriggerKind::PullRequest.to_string(), "pull_request");
}
