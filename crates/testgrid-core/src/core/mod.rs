// crates/testgrid-core/src/core/mod.rs
// ============================================================================
// Module: TestGrid Core Types
// Description: Canonical TestGrid matrix, plan, and report structures.
// Purpose: Provide stable, serializable types for workflow expansion and runs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! TestGrid core types define matrix specifications, expanded job
//! specifications, test plans, and run reports. These types are the canonical
//! source of truth for any derived surfaces (CLI output, JSON plans, runner
//! adapters).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod expander;
pub mod hashing;
pub mod identifiers;
pub mod job;
pub mod matrix;
pub mod plan;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use expander::Combination;
pub use expander::Selection;
pub use expander::expand;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::AxisId;
pub use identifiers::ImageId;
pub use identifiers::JobId;
pub use identifiers::RunId;
pub use identifiers::ToolchainChannel;
pub use identifiers::VariantId;
pub use identifiers::WorkflowId;
pub use job::JobSpec;
pub use job::JobStep;
pub use job::OsName;
pub use matrix::AxisSpec;
pub use matrix::MatrixError;
pub use matrix::MatrixSpec;
pub use matrix::VariantSpec;
pub use plan::FIELD_FLAG;
pub use plan::FIELD_IMAGE;
pub use plan::FIELD_OS;
pub use plan::FIELD_TEST_NAME;
pub use plan::FIELD_TOOLCHAIN;
pub use plan::PlanError;
pub use plan::TestPlan;
pub use plan::TriggerKind;
pub use report::JobReport;
pub use report::JobStatus;
pub use report::RunReport;
pub use report::StepOutcome;
pub use report::StepStatus;
