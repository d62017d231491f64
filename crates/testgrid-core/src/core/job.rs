// crates/testgrid-core/src/core/job.rs
// ============================================================================
// Module: TestGrid Job Specification
// Description: Immutable job specifications and the fixed per-job steps.
// Purpose: Define the concrete execution record produced by plan building.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A job specification is one fully-resolved combination of matrix variants,
//! created once at plan-build time and never mutated. Every job executes the
//! same fixed step sequence: source checkout, toolchain installation for the
//! job's channel, and the test invocation with the job's extra flag appended
//! when present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ImageId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::ToolchainChannel;

// ============================================================================
// SECTION: Operating System Names
// ============================================================================

/// Operating system variants supported by the OS axis.
///
/// # Invariants
/// - Variants are stable for serialization and plan matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsName {
    /// Linux execution environments.
    Linux,
    /// Windows execution environments.
    Windows,
    /// macOS execution environments.
    Macos,
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "macos",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Job Specification
// ============================================================================

/// One concrete, fully-resolved job produced by matrix expansion.
///
/// # Invariants
/// - Created once at plan-build time; never mutated afterwards.
/// - `job_id` depends only on the job's own variant identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Job identifier derived from the combination's variant identifiers.
    pub job_id: JobId,
    /// Operating system selected by the OS axis.
    pub os_name: OsName,
    /// Execution image selected by the OS axis.
    pub os_image: ImageId,
    /// Human-readable test variant label.
    pub test_name: String,
    /// Toolchain release channel installed before tests.
    pub toolchain_channel: ToolchainChannel,
    /// Optional flag appended to the test invocation.
    pub extra_flag: Option<String>,
}

impl JobSpec {
    /// Returns the fixed ordered step sequence for this job.
    ///
    /// Steps are identical across all jobs and parameterized only by the
    /// job's toolchain channel and optional extra flag.
    #[must_use]
    pub fn steps(&self) -> Vec<JobStep> {
        vec![
            JobStep::Checkout,
            JobStep::InstallToolchain {
                channel: self.toolchain_channel.clone(),
            },
            JobStep::RunTests {
                extra_flag: self.extra_flag.clone(),
            },
        ]
    }
}

// ============================================================================
// SECTION: Job Steps
// ============================================================================

/// Fixed per-job steps, executed in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobStep {
    /// Check out the source tree.
    Checkout,
    /// Install the toolchain for the job's release channel.
    InstallToolchain {
        /// Toolchain release channel to install.
        channel: ToolchainChannel,
    },
    /// Invoke the test command, appending the extra flag when present.
    RunTests {
        /// Optional flag appended to the invocation.
        extra_flag: Option<String>,
    },
}

impl JobStep {
    /// Returns a stable short label for the step.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::InstallToolchain {
                ..
            } => "install_toolchain",
            Self::RunTests {
                ..
            } => "run_tests",
        }
    }
}
