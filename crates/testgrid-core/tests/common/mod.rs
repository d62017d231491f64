// crates/testgrid-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared matrix builders for core integration tests.
// Purpose: Reduce duplication across expander, plan, and dispatcher suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;

use serde_json::Value;
use serde_json::json;
use testgrid_core::AxisSpec;
use testgrid_core::MatrixSpec;
use testgrid_core::VariantSpec;

/// Builds a variant with the provided identifier, label, and fields.
pub fn variant(id: &str, label: &str, fields: &[(&str, Value)]) -> VariantSpec {
    let fields: BTreeMap<String, Value> =
        fields.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect();
    VariantSpec {
        variant_id: id.into(),
        label: label.to_string(),
        fields,
    }
}

/// Builds the canonical OS axis: linux, windows, macos.
pub fn os_axis() -> AxisSpec {
    AxisSpec {
        axis_id: "os".into(),
        variants: vec![
            variant("linux", "Linux", &[("os", json!("linux")), ("image", json!("ubuntu-latest"))]),
            variant(
                "windows",
                "Windows",
                &[("os", json!("windows")), ("image", json!("windows-latest"))],
            ),
            variant("macos", "macOS", &[("os", json!("macos")), ("image", json!("macos-latest"))]),
        ],
    }
}

/// Builds the canonical test axis: stable, stable with all features.
pub fn test_axis() -> AxisSpec {
    AxisSpec {
        axis_id: "test".into(),
        variants: vec![
            variant(
                "stable",
                "Stable",
                &[("name", json!("Stable")), ("toolchain", json!("stable"))],
            ),
            variant(
                "stable-all-features",
                "Stable (--all-features)",
                &[
                    ("name", json!("Stable (--all-features)")),
                    ("toolchain", json!("stable")),
                    ("flag", json!("--all-features")),
                ],
            ),
        ],
    }
}

/// Builds the canonical two-axis matrix (3 OS variants by 2 test variants).
pub fn canonical_matrix() -> MatrixSpec {
    MatrixSpec {
        axes: vec![os_axis(), test_axis()],
    }
}
