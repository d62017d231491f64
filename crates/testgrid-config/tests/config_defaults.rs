//! Config defaults and validation tests for testgrid-config.
// crates/testgrid-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate default behavior and testgrid.toml invariants.
// Purpose: Ensure minimal config is valid and bounds are enforced.
// =============================================================================

use std::fs;

use testgrid_config::ConfigError;
use testgrid_config::TestgridConfig;
use testgrid_config::config_toml_example;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn example_config_matches_defaults() -> TestResult {
    let example = common::config_from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    example.validate().map_err(|err| err.to_string())?;
    if example != TestgridConfig::default() {
        return Err("example config should spell out the defaults".to_string());
    }
    Ok(())
}

#[test]
fn default_commands_reference_known_placeholders() -> TestResult {
    let config = TestgridConfig::default();
    if !config.runner.toolchain_command.contains("{channel}") {
        return Err("toolchain command should install the job channel".to_string());
    }
    if !config.runner.test_command.contains("{flag}") {
        return Err("test command should append the extra flag".to_string());
    }
    Ok(())
}

#[test]
fn blank_command_template_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.runner.test_command = "  ".to_string();
    assert_invalid(config.validate(), "runner.test_command must not be empty")
}

#[test]
fn unknown_placeholder_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.runner.checkout_command = "git clone {repository}".to_string();
    assert_invalid(config.validate(), "unknown placeholder `{repository}`")
}

#[test]
fn unterminated_placeholder_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.runner.toolchain_command = "rustup toolchain install {channel".to_string();
    assert_invalid(config.validate(), "unterminated placeholder")
}

#[test]
fn parallel_jobs_bounds_are_enforced() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.runner.max_parallel_jobs = 0;
    assert_invalid(config.validate(), "runner.max_parallel_jobs")?;
    config.runner.max_parallel_jobs = 65;
    assert_invalid(config.validate(), "runner.max_parallel_jobs")?;
    config.runner.max_parallel_jobs = 64;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn unknown_config_fields_are_rejected() -> TestResult {
    match common::config_from_toml("[notifications]\nenabled = true\n") {
        Err(_) => Ok(()),
        Ok(_) => Err("unknown sections must be rejected".to_string()),
    }
}

#[test]
fn load_reads_explicit_paths() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("testgrid.toml");
    fs::write(&path, config_toml_example()).map_err(|err| err.to_string())?;
    let config = TestgridConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config != TestgridConfig::default() {
        return Err("loaded example should equal defaults".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_missing_explicit_paths() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match TestgridConfig::load(Some(&path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("missing explicit path must fail".to_string()),
    }
}

#[test]
fn load_rejects_invalid_files() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("testgrid.toml");
    fs::write(&path, "[runner]\nmax_parallel_jobs = 0\n").map_err(|err| err.to_string())?;
    match TestgridConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(_)) => Ok(()),
        Err(other) => Err(format!("expected invalid error, got {other}")),
        Ok(_) => Err("out-of-bounds config must fail".to_string()),
    }
}
