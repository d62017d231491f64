// crates/testgrid-config/src/docs.rs
// ============================================================================
// Module: Workflow Docs Generator
// Description: Markdown generator for workflow file documentation.
// Purpose: Keep workflow schema docs in sync with validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Generates the workflow file reference as deterministic markdown. The
//! verify helper compares the generated output byte-for-byte against a
//! committed file so docs drift fails loudly in CI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::examples::workflow_yaml_example;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying workflow docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while reading or writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the workflow file markdown reference.
#[must_use]
pub fn workflow_docs_markdown() -> String {
    let mut out = String::new();

    out.push_str("# Workflow File Reference\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("A workflow file declares the trigger events it answers and the matrix\n");
    out.push_str("axes to expand. Per-job steps are fixed and identical across all jobs:\n");
    out.push_str("checkout, toolchain install, test invocation. All inputs are validated\n");
    out.push_str("and fail closed on errors.\n\n");

    out.push_str("## Fields\n\n");
    out.push_str("| Field | Type | Description |\n");
    out.push_str("| --- | --- | --- |\n");
    out.push_str("| `name` | string | Workflow name, used as the plan's workflow id. |\n");
    out.push_str(
        "| `on` | list | Trigger events answered: `push`, `pull_request`. No branch or \
         path filtering. |\n",
    );
    out.push_str("| `matrix.os` | list | Operating-system axis variants. May be empty. |\n");
    out.push_str(
        "| `matrix.os[].name` | `linux` \\| `windows` \\| `macos` | Operating system \
         name; doubles as the variant identifier. |\n",
    );
    out.push_str("| `matrix.os[].image` | string | Platform execution image identifier. |\n");
    out.push_str("| `matrix.test` | list | Test axis variants. May be empty. |\n");
    out.push_str(
        "| `matrix.test[].name` | string | Human-readable variant name; its slug is the \
         variant identifier. |\n",
    );
    out.push_str(
        "| `matrix.test[].toolchain` | string | Toolchain release channel installed \
         before tests. |\n",
    );
    out.push_str(
        "| `matrix.test[].flag` | string (optional) | Extra flag appended to the test \
         invocation. |\n\n",
    );

    out.push_str("## Expansion\n\n");
    out.push_str("The job set is the full Cartesian product of the axes, enumerated with\n");
    out.push_str("the OS axis outermost, both axes in declaration order. An axis with\n");
    out.push_str("zero variants yields zero jobs. Job identifiers join the selected\n");
    out.push_str("variant identifiers with `-`, for example `linux-stable`.\n\n");

    out.push_str("## Example\n\n");
    out.push_str("```yaml\n");
    out.push_str(&workflow_yaml_example());
    out.push_str("```\n");

    out
}

/// Writes the workflow docs to the provided path.
///
/// # Errors
///
/// Returns [`DocsError::Io`] when writing fails.
pub fn write_workflow_docs(path: &Path) -> Result<(), DocsError> {
    fs::write(path, workflow_docs_markdown()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the committed docs match the generated output byte-for-byte.
///
/// # Errors
///
/// Returns [`DocsError`] when reading fails or the file has drifted.
pub fn verify_workflow_docs(path: &Path) -> Result<(), DocsError> {
    let committed = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if committed != workflow_docs_markdown() {
        return Err(DocsError::Drift(path.display().to_string()));
    }
    Ok(())
}
