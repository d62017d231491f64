// crates/testgrid-config/src/workflow.rs
// ============================================================================
// Module: TestGrid Workflow Definition
// Description: Declarative workflow file model, loading, and validation.
// Purpose: Provide strict, fail-closed workflow parsing with hard limits.
// Dependencies: testgrid-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! A workflow file declares the trigger events it answers, the matrix axes
//! to expand, and nothing else: the per-job steps are fixed and identical
//! across all jobs. Workflow files are untrusted input and are loaded with
//! strict size limits, unknown fields denied, and fail-closed validation.
//! Malformed definitions are configuration-authoring mistakes surfaced as
//! descriptive faults at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use testgrid_core::AxisSpec;
use testgrid_core::FIELD_FLAG;
use testgrid_core::FIELD_IMAGE;
use testgrid_core::FIELD_OS;
use testgrid_core::FIELD_TEST_NAME;
use testgrid_core::FIELD_TOOLCHAIN;
use testgrid_core::MatrixSpec;
use testgrid_core::OsName;
use testgrid_core::PlanError;
use testgrid_core::TestPlan;
use testgrid_core::TriggerKind;
use testgrid_core::VariantSpec;
use testgrid_core::WorkflowId;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Axis identifier for the operating-system axis.
pub const OS_AXIS_ID: &str = "os";
/// Axis identifier for the test-variant axis.
pub const TEST_AXIS_ID: &str = "test";
/// Maximum workflow file size in bytes.
pub(crate) const MAX_WORKFLOW_FILE_SIZE: usize = 256 * 1024;
/// Maximum length of a workflow name.
pub(crate) const MAX_WORKFLOW_NAME_LENGTH: usize = 128;
/// Maximum number of variants per axis.
pub(crate) const MAX_AXIS_VARIANTS: usize = 64;
/// Maximum number of jobs a matrix may expand into.
pub(crate) const MAX_MATRIX_JOBS: u64 = 128;
/// Maximum length of an execution image identifier.
pub(crate) const MAX_IMAGE_LENGTH: usize = 128;
/// Maximum length of a test variant name.
pub(crate) const MAX_TEST_NAME_LENGTH: usize = 128;
/// Maximum length of a toolchain channel.
pub(crate) const MAX_TOOLCHAIN_LENGTH: usize = 64;
/// Maximum length of an extra test flag.
pub(crate) const MAX_FLAG_LENGTH: usize = 256;

// ============================================================================
// SECTION: Workflow Types
// ============================================================================

/// Declarative workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Workflow name used as the plan's workflow identifier.
    pub name: String,
    /// Trigger events the workflow answers, in declaration order.
    pub on: Vec<TriggerKind>,
    /// Matrix axes expanded into jobs.
    pub matrix: WorkflowMatrix,
}

/// Matrix axes declared by a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowMatrix {
    /// Operating-system axis variants in declaration order. May be empty.
    #[serde(default)]
    pub os: Vec<OsVariantConfig>,
    /// Test axis variants in declaration order. May be empty.
    #[serde(default)]
    pub test: Vec<TestVariantConfig>,
}

/// One operating-system axis variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsVariantConfig {
    /// Operating system name.
    pub name: OsName,
    /// Execution image identifier for the platform.
    pub image: String,
}

/// One test axis variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestVariantConfig {
    /// Human-readable test variant name.
    pub name: String,
    /// Toolchain release channel installed before tests.
    pub toolchain: String,
    /// Optional flag appended to the test invocation.
    #[serde(default)]
    pub flag: Option<String>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl WorkflowConfig {
    /// Loads and validates a workflow definition from disk.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when reading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, WorkflowError> {
        let bytes = fs::read(path).map_err(|err| WorkflowError::Io(err.to_string()))?;
        if bytes.len() > MAX_WORKFLOW_FILE_SIZE {
            return Err(WorkflowError::Invalid("workflow file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| WorkflowError::Invalid("workflow file must be utf-8".to_string()))?;
        let config = Self::from_yaml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a workflow definition from a YAML string without validating.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Parse`] when the document is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, WorkflowError> {
        serde_yaml::from_str(content).map_err(|err| WorkflowError::Parse(err.to_string()))
    }

    /// Validates the workflow definition invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the definition is invalid.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Invalid("workflow name must not be empty".to_string()));
        }
        if self.name.len() > MAX_WORKFLOW_NAME_LENGTH {
            return Err(WorkflowError::Invalid("workflow name exceeds length limit".to_string()));
        }
        validate_triggers(&self.on)?;
        validate_os_axis(&self.matrix.os)?;
        validate_test_axis(&self.matrix.test)?;

        let combinations = (self.matrix.os.len() as u64) * (self.matrix.test.len() as u64);
        if combinations > MAX_MATRIX_JOBS {
            return Err(WorkflowError::Invalid(format!(
                "matrix expands to {combinations} jobs, exceeding the limit of {MAX_MATRIX_JOBS}"
            )));
        }
        Ok(())
    }

    /// Lowers the typed workflow axes into a generic matrix specification.
    ///
    /// The OS axis contributes the `os` and `image` fields; the test axis
    /// contributes `name`, `toolchain`, and (when present) `flag`.
    #[must_use]
    pub fn matrix_spec(&self) -> MatrixSpec {
        let os_variants = self
            .matrix
            .os
            .iter()
            .map(|variant| VariantSpec {
                variant_id: variant.name.to_string().into(),
                label: variant.name.to_string(),
                fields: BTreeMap::from([
                    (FIELD_OS.to_string(), json!(variant.name)),
                    (FIELD_IMAGE.to_string(), json!(variant.image)),
                ]),
            })
            .collect();
        let test_variants = self
            .matrix
            .test
            .iter()
            .map(|variant| {
                let mut fields = BTreeMap::from([
                    (FIELD_TEST_NAME.to_string(), json!(variant.name)),
                    (FIELD_TOOLCHAIN.to_string(), json!(variant.toolchain)),
                ]);
                if let Some(flag) = &variant.flag {
                    fields.insert(FIELD_FLAG.to_string(), json!(flag));
                }
                VariantSpec {
                    variant_id: slugify(&variant.name).into(),
                    label: variant.name.clone(),
                    fields,
                }
            })
            .collect();
        MatrixSpec {
            axes: vec![
                AxisSpec {
                    axis_id: OS_AXIS_ID.into(),
                    variants: os_variants,
                },
                AxisSpec {
                    axis_id: TEST_AXIS_ID.into(),
                    variants: test_variants,
                },
            ],
        }
    }

    /// Builds the test plan answering the provided trigger.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TriggerNotSubscribed`] when the workflow does
    /// not answer the trigger, or a plan fault when expansion fails.
    pub fn plan(&self, trigger: TriggerKind) -> Result<TestPlan, WorkflowError> {
        if !self.on.contains(&trigger) {
            return Err(WorkflowError::TriggerNotSubscribed {
                workflow: self.name.clone(),
                trigger: trigger.to_string(),
            });
        }
        let plan = TestPlan::build(WorkflowId::new(&self.name), trigger, &self.matrix_spec())?;
        Ok(plan)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Workflow definition errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Reading the workflow file failed.
    #[error("workflow io error: {0}")]
    Io(String),
    /// Parsing the workflow document failed.
    #[error("workflow parse error: {0}")]
    Parse(String),
    /// Workflow definition violates an invariant.
    #[error("invalid workflow: {0}")]
    Invalid(String),
    /// Workflow does not answer the requested trigger.
    #[error("workflow {workflow} is not subscribed to trigger {trigger}")]
    TriggerNotSubscribed {
        /// Workflow name.
        workflow: String,
        /// Requested trigger label.
        trigger: String,
    },
    /// Plan construction failed.
    #[error("plan construction failed: {0}")]
    Plan(#[from] PlanError),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures the trigger list is non-empty and free of duplicates.
fn validate_triggers(triggers: &[TriggerKind]) -> Result<(), WorkflowError> {
    if triggers.is_empty() {
        return Err(WorkflowError::Invalid(
            "workflow must subscribe to at least one trigger".to_string(),
        ));
    }
    for (index, trigger) in triggers.iter().enumerate() {
        if triggers.iter().skip(index + 1).any(|other| other == trigger) {
            return Err(WorkflowError::Invalid(format!("duplicate trigger: {trigger}")));
        }
    }
    Ok(())
}

/// Ensures OS variants are bounded, unique, and well formed.
fn validate_os_axis(variants: &[OsVariantConfig]) -> Result<(), WorkflowError> {
    if variants.len() > MAX_AXIS_VARIANTS {
        return Err(WorkflowError::Invalid("os axis exceeds variant limit".to_string()));
    }
    for (index, variant) in variants.iter().enumerate() {
        if variant.image.trim().is_empty() {
            return Err(WorkflowError::Invalid(format!(
                "os variant {} has an empty image",
                variant.name
            )));
        }
        if variant.image.len() > MAX_IMAGE_LENGTH {
            return Err(WorkflowError::Invalid(format!(
                "os variant {} image exceeds length limit",
                variant.name
            )));
        }
        if variants.iter().skip(index + 1).any(|other| other.name == variant.name) {
            return Err(WorkflowError::Invalid(format!("duplicate os variant: {}", variant.name)));
        }
    }
    Ok(())
}

/// Ensures test variants are bounded, unique, and well formed.
fn validate_test_axis(variants: &[TestVariantConfig]) -> Result<(), WorkflowError> {
    if variants.len() > MAX_AXIS_VARIANTS {
        return Err(WorkflowError::Invalid("test axis exceeds variant limit".to_string()));
    }
    for (index, variant) in variants.iter().enumerate() {
        if variant.name.trim().is_empty() {
            return Err(WorkflowError::Invalid("test variant name must not be empty".to_string()));
        }
        if variant.name.len() > MAX_TEST_NAME_LENGTH {
            return Err(WorkflowError::Invalid(format!(
                "test variant {} name exceeds length limit",
                variant.name
            )));
        }
        if variant.toolchain.trim().is_empty() {
            return Err(WorkflowError::Invalid(format!(
                "test variant {} has an empty toolchain",
                variant.name
            )));
        }
        if variant.toolchain.len() > MAX_TOOLCHAIN_LENGTH {
            return Err(WorkflowError::Invalid(format!(
                "test variant {} toolchain exceeds length limit",
                variant.name
            )));
        }
        if let Some(flag) = &variant.flag {
            if flag.trim().is_empty() {
                return Err(WorkflowError::Invalid(format!(
                    "test variant {} has a blank flag",
                    variant.name
                )));
            }
            if flag.len() > MAX_FLAG_LENGTH {
                return Err(WorkflowError::Invalid(format!(
                    "test variant {} flag exceeds length limit",
                    variant.name
                )));
            }
        }
        let slug = slugify(&variant.name);
        if slug.is_empty() {
            return Err(WorkflowError::Invalid(format!(
                "test variant {} yields an empty identifier",
                variant.name
            )));
        }
        if variants.iter().skip(index + 1).any(|other| slugify(&other.name) == slug) {
            return Err(WorkflowError::Invalid(format!(
                "test variants collapse to the same identifier: {slug}"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Identifier Derivation
// ============================================================================

/// Derives a stable variant identifier from a human-readable name.
///
/// Lowercases the name, maps every non-alphanumeric run to a single `-`, and
/// trims leading and trailing separators, so `Stable (--all-features)`
/// becomes `stable-all-features`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}
