// crates/testgrid-config/src/config.rs
// ============================================================================
// Module: TestGrid Tool Configuration
// Description: Configuration loading and validation for testgrid.toml.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Tool configuration is loaded from a TOML file with strict size and path
//! limits. A missing default file yields built-in defaults so the CLI works
//! out of the box; a present but invalid file fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "testgrid.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TESTGRID_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a runner command template.
pub(crate) const MAX_COMMAND_TEMPLATE_LENGTH: usize = 1024;
/// Minimum allowed parallel job bound.
pub(crate) const MIN_PARALLEL_JOBS: usize = 1;
/// Maximum allowed parallel job bound.
pub(crate) const MAX_PARALLEL_JOBS: usize = 64;
/// Default parallel job bound.
pub(crate) const DEFAULT_PARALLEL_JOBS: usize = 4;
/// Placeholders command templates may reference.
const ALLOWED_PLACEHOLDERS: &[&str] = &["channel", "flag"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// TestGrid tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestgridConfig {
    /// Local runner configuration.
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Local process-runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Command template for the checkout step.
    #[serde(default = "default_checkout_command")]
    pub checkout_command: String,
    /// Command template for the toolchain install step.
    #[serde(default = "default_toolchain_command")]
    pub toolchain_command: String,
    /// Command template for the test invocation step.
    #[serde(default = "default_test_command")]
    pub test_command: String,
    /// Upper bound on concurrently executing jobs.
    #[serde(default = "default_max_parallel_jobs")]
    pub max_parallel_jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            checkout_command: default_checkout_command(),
            toolchain_command: default_toolchain_command(),
            test_command: default_test_command(),
            max_parallel_jobs: default_max_parallel_jobs(),
        }
    }
}

/// Default checkout command verifying the source tree is present.
fn default_checkout_command() -> String {
    "git rev-parse --verify HEAD".to_string()
}

/// Default toolchain install command.
fn default_toolchain_command() -> String {
    "rustup toolchain install {channel}".to_string()
}

/// Default test invocation command.
fn default_test_command() -> String {
    "cargo +{channel} test {flag}".to_string()
}

/// Default parallel job bound.
fn default_max_parallel_jobs() -> usize {
    DEFAULT_PARALLEL_JOBS
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl TestgridConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// An explicit path or an environment override must name an existing
    /// file. When neither is given and the default file is absent, built-in
    /// defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path);
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_template("runner.checkout_command", &self.runner.checkout_command)?;
        validate_template("runner.toolchain_command", &self.runner.toolchain_command)?;
        validate_template("runner.test_command", &self.runner.test_command)?;
        if self.runner.max_parallel_jobs < MIN_PARALLEL_JOBS
            || self.runner.max_parallel_jobs > MAX_PARALLEL_JOBS
        {
            return Err(ConfigError::Invalid(format!(
                "runner.max_parallel_jobs must be between {MIN_PARALLEL_JOBS} and \
                 {MAX_PARALLEL_JOBS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("config io error: {0}")]
    Io(String),
    /// Parsing the configuration file failed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration violates an invariant.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the config path and whether it was explicitly requested.
///
/// Resolution order: explicit path, `TESTGRID_CONFIG`, default filename.
fn resolve_path(path: Option<&Path>) -> (PathBuf, bool) {
    if let Some(explicit) = path {
        return (explicit.to_path_buf(), true);
    }
    if let Ok(value) = env::var(CONFIG_ENV_VAR)
        && !value.trim().is_empty()
    {
        return (PathBuf::from(value), true);
    }
    (PathBuf::from(DEFAULT_CONFIG_NAME), false)
}

/// Validates path component and total length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let total = path.as_os_str().len();
    if total > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(ConfigError::Invalid(
                "config path component exceeds length limit".to_string(),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Template Validation
// ============================================================================

/// Validates a command template's shape and placeholder references.
fn validate_template(label: &str, template: &str) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{label} must not be empty")));
    }
    if template.len() > MAX_COMMAND_TEMPLATE_LENGTH {
        return Err(ConfigError::Invalid(format!("{label} exceeds length limit")));
    }
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1 ..];
        let Some(close) = after.find('}') else {
            return Err(ConfigError::Invalid(format!("{label} has an unterminated placeholder")));
        };
        let name = &after[.. close];
        if !ALLOWED_PLACEHOLDERS.contains(&name) {
            return Err(ConfigError::Invalid(format!(
                "{label} references unknown placeholder `{{{name}}}`"
            )));
        }
        rest = &after[close + 1 ..];
    }
    if rest.contains('}') {
        return Err(ConfigError::Invalid(format!("{label} has an unmatched `}}`")));
    }
    Ok(())
}
