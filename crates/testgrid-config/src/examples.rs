// crates/testgrid-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example workflow and configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for TestGrid inputs. Outputs are deterministic and
//! kept in sync with validation and docs: the example workflow parses,
//! validates, and expands to exactly six jobs.

/// Returns the canonical example workflow definition.
#[must_use]
pub fn workflow_yaml_example() -> String {
    String::from(
        r#"name: ci
on:
  - push
  - pull_request

matrix:
  os:
    - name: linux
      image: ubuntu-latest
    - name: windows
      image: windows-latest
    - name: macos
      image: macos-latest
  test:
    - name: Stable
      toolchain: stable
    - name: Stable (--all-features)
      toolchain: stable
      flag: --all-features
"#,
    )
}

/// Returns a canonical example `testgrid.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[runner]
checkout_command = "git rev-parse --verify HEAD"
toolchain_command = "rustup toolchain install {channel}"
test_command = "cargo +{channel} test {flag}"
max_parallel_jobs = 4
"#,
    )
}
