// crates/testgrid-config/src/lib.rs
// ============================================================================
// Module: TestGrid Config Library
// Description: Workflow definition model, tool config, and docs generation.
// Purpose: Single source of truth for workflow and testgrid.toml semantics.
// Dependencies: testgrid-core, serde, serde_yaml, toml
// ============================================================================

//! ## Overview
//! `testgrid-config` defines the declarative workflow file format and the
//! `testgrid.toml` tool configuration. Both are untrusted inputs parsed with
//! strict size limits and fail-closed validation, plus deterministic
//! generators for canonical examples and schema docs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod examples;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use docs::DocsError;
pub use docs::verify_workflow_docs;
pub use docs::workflow_docs_markdown;
pub use docs::write_workflow_docs;
pub use examples::config_toml_example;
pub use examples::workflow_yaml_example;
pub use workflow::*;
