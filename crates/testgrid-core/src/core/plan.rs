// crates/testgrid-core/src/core/plan.rs
// ============================================================================
// Module: TestGrid Test Plan
// Description: Plan construction from expanded matrix combinations.
// Purpose: Project combinations into job specifications with stable order.
// Dependencies: crate::core::{expander, hashing, identifiers, job, matrix}, serde
// ============================================================================

//! ## Overview
//! A test plan is the ordered set of job specifications produced by expanding
//! a workflow matrix for one trigger event. Plan building validates the
//! matrix, expands it, and projects each combination into a typed job
//! specification by reading the well-known fields contributed by the OS and
//! test axes. Projection failures are load-time faults, not runtime errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::expander::Combination;
use crate::core::expander::expand;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::ImageId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::ToolchainChannel;
use crate::core::identifiers::WorkflowId;
use crate::core::job::JobSpec;
use crate::core::job::OsName;
use crate::core::matrix::MatrixError;
use crate::core::matrix::MatrixSpec;

// ============================================================================
// SECTION: Well-Known Fields
// ============================================================================

/// Field contributed by the OS axis naming the operating system.
pub const FIELD_OS: &str = "os";
/// Field contributed by the OS axis naming the execution image.
pub const FIELD_IMAGE: &str = "image";
/// Field contributed by the test axis carrying the variant label.
pub const FIELD_TEST_NAME: &str = "name";
/// Field contributed by the test axis naming the toolchain channel.
pub const FIELD_TOOLCHAIN: &str = "toolchain";
/// Optional field contributed by the test axis carrying the extra flag.
pub const FIELD_FLAG: &str = "flag";

// ============================================================================
// SECTION: Trigger Events
// ============================================================================

/// Trigger events that start a workflow.
///
/// # Invariants
/// - Variants are stable for serialization. No branch or path filtering is
///   attached to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Source push event.
    Push,
    /// Pull request opened or updated.
    PullRequest,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Test Plan
// ============================================================================

/// Ordered set of job specifications for one workflow trigger.
///
/// # Invariants
/// - `jobs` preserves expansion order (outer axis major).
/// - Job identifiers are unique within the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    /// Workflow the plan was built from.
    pub workflow_id: WorkflowId,
    /// Trigger event the plan answers.
    pub trigger: TriggerKind,
    /// Expanded job specifications in deterministic order.
    pub jobs: Vec<JobSpec>,
}

impl TestPlan {
    /// Builds a plan by expanding the matrix and projecting each combination.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the matrix is invalid, a combination lacks
    /// the well-known projection fields, or two combinations collapse to the
    /// same job identifier.
    pub fn build(
        workflow_id: WorkflowId,
        trigger: TriggerKind,
        matrix: &MatrixSpec,
    ) -> Result<Self, PlanError> {
        matrix.validate()?;
        let combinations = expand(matrix);
        let mut jobs = Vec::with_capacity(combinations.len());
        for combination in &combinations {
            jobs.push(project_job(combination)?);
        }
        let plan = Self {
            workflow_id,
            trigger,
            jobs,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Validates plan invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DuplicateJobId`] when two jobs share an
    /// identifier, which would mean two distinct combinations collapsed.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (index, job) in self.jobs.iter().enumerate() {
            if self.jobs.iter().skip(index + 1).any(|other| other.job_id == job.job_id) {
                return Err(PlanError::DuplicateJobId(job.job_id.to_string()));
            }
        }
        Ok(())
    }

    /// Computes the canonical digest of the plan.
    ///
    /// Equal workflows expand to equal digests; the digest is the observable
    /// determinism surface for expansion.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn digest(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan construction and validation errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Matrix validation failed.
    #[error("matrix validation failed: {0}")]
    Matrix(#[from] MatrixError),
    /// Combination could not be projected into a job specification.
    #[error("job {job} projection failed: {reason}")]
    Projection {
        /// Job identifier derived from the combination.
        job: String,
        /// Description of the missing or mistyped field.
        reason: String,
    },
    /// Two distinct combinations collapsed to the same job identifier.
    #[error("duplicate job identifier: {0}")]
    DuplicateJobId(String),
}

// ============================================================================
// SECTION: Projection Helpers
// ============================================================================

/// Projects one combination into a typed job specification.
fn project_job(combination: &Combination) -> Result<JobSpec, PlanError> {
    let job_id = derive_job_id(combination);
    let os_value = require_field(combination, &job_id, FIELD_OS)?;
    let os_name: OsName = serde_json::from_value(os_value.clone()).map_err(|_| {
        PlanError::Projection {
            job: job_id.to_string(),
            reason: format!("field `{FIELD_OS}` is not a known operating system name"),
        }
    })?;
    let os_image = ImageId::new(require_string(combination, &job_id, FIELD_IMAGE)?);
    let test_name = require_string(combination, &job_id, FIELD_TEST_NAME)?.to_string();
    let toolchain_channel =
        ToolchainChannel::new(require_string(combination, &job_id, FIELD_TOOLCHAIN)?);
    let extra_flag = optional_string(combination, &job_id, FIELD_FLAG)?;

    Ok(JobSpec {
        job_id,
        os_name,
        os_image,
        test_name,
        toolchain_channel,
        extra_flag,
    })
}

/// Derives the job identifier from the combination's variant identifiers.
fn derive_job_id(combination: &Combination) -> JobId {
    let parts: Vec<&str> =
        combination.selections.iter().map(|selection| selection.variant_id.as_str()).collect();
    JobId::new(parts.join("-"))
}

/// Returns a required field value from the combination.
fn require_field<'a>(
    combination: &'a Combination,
    job_id: &JobId,
    key: &str,
) -> Result<&'a Value, PlanError> {
    combination.fields.get(key).ok_or_else(|| PlanError::Projection {
        job: job_id.to_string(),
        reason: format!("missing field `{key}`"),
    })
}

/// Returns a required string field from the combination.
fn require_string<'a>(
    combination: &'a Combination,
    job_id: &JobId,
    key: &str,
) -> Result<&'a str, PlanError> {
    match require_field(combination, job_id, key)? {
        Value::String(value) if !value.trim().is_empty() => Ok(value),
        Value::String(_) => Err(PlanError::Projection {
            job: job_id.to_string(),
            reason: format!("field `{key}` must not be blank"),
        }),
        _ => Err(PlanError::Projection {
            job: job_id.to_string(),
            reason: format!("field `{key}` must be a string"),
        }),
    }
}

/// Returns an optional string field from the combination.
///
/// An absent key or an explicit null both mean "no value".
fn optional_string(
    combination: &Combination,
    job_id: &JobId,
    key: &str,
) -> Result<Option<String>, PlanError> {
    match combination.fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(Some(value.clone())),
        Some(Value::String(_)) => Err(PlanError::Projection {
            job: job_id.to_string(),
            reason: format!("field `{key}` must not be blank"),
        }),
        Some(_) => Err(PlanError::Projection {
            job: job_id.to_string(),
            reason: format!("field `{key}` must be a string"),
        }),
    }
}
