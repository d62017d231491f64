// crates/testgrid-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for workflow and config validation tests.
// Purpose: Reduce duplication across integration tests for testgrid-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use testgrid_config::TestgridConfig;
use testgrid_config::WorkflowConfig;
use testgrid_config::WorkflowError;
use testgrid_config::workflow_yaml_example;

/// Parses a YAML string into a `WorkflowConfig` for tests.
pub fn workflow_from_yaml(yaml: &str) -> Result<WorkflowConfig, WorkflowError> {
    WorkflowConfig::from_yaml(yaml)
}

/// Returns the canonical example workflow, parsed but not yet validated.
pub fn canonical_workflow() -> Result<WorkflowConfig, WorkflowError> {
    workflow_from_yaml(&workflow_yaml_example())
}

/// Parses a TOML string into a `TestgridConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<TestgridConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<TestgridConfig, toml::de::Error> {
    config_from_toml("")
}
