// crates/testgrid-core/src/core/matrix.rs
// ============================================================================
// Module: TestGrid Matrix Specification
// Description: Axis and variant specifications for test-matrix expansion.
// Purpose: Define canonical matrix specs with load-time validation helpers.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! A matrix specification is an ordered list of independent axes, each an
//! ordered sequence of named variant records carrying arbitrary key-value
//! fields. Specs are validated at load time to enforce invariants such as
//! unique identifiers; expansion itself has no error conditions. A
//! zero-variant axis is well formed and yields an empty product.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::AxisId;
use crate::core::identifiers::VariantId;

// ============================================================================
// SECTION: Matrix Specification
// ============================================================================

/// Canonical matrix specification.
///
/// # Invariants
/// - Axis order is the declaration order and drives enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSpec {
    /// Matrix axes in deterministic order.
    pub axes: Vec<AxisSpec>,
}

impl MatrixSpec {
    /// Validates the matrix specification invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError`] when an authoring mistake is detected.
    pub fn validate(&self) -> Result<(), MatrixError> {
        ensure_axis_ids_well_formed(&self.axes)?;
        ensure_unique_axis_ids(&self.axes)?;
        for axis in &self.axes {
            ensure_variants_well_formed(axis)?;
            ensure_unique_variant_ids(axis)?;
        }
        Ok(())
    }

    /// Returns the number of combinations the matrix expands into.
    ///
    /// The count is the product of axis lengths and saturates at `u64::MAX`.
    /// A matrix with no axes yields exactly one empty combination.
    #[must_use]
    pub fn combination_count(&self) -> u64 {
        self.axes
            .iter()
            .fold(1_u64, |product, axis| product.saturating_mul(axis.variants.len() as u64))
    }
}

/// Axis specification holding an ordered sequence of variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Axis identifier.
    pub axis_id: AxisId,
    /// Variants in deterministic order. May be empty.
    pub variants: Vec<VariantSpec>,
}

/// Variant record within an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    /// Variant identifier, unique within its axis.
    pub variant_id: VariantId,
    /// Human-readable variant label.
    pub label: String,
    /// Arbitrary key-value fields contributed to expanded combinations.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Matrix specification validation errors.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Axis identifier is empty or blank.
    #[error("axis identifier must not be empty")]
    EmptyAxisId,
    /// Duplicate axis identifiers detected.
    #[error("duplicate axis identifier: {0}")]
    DuplicateAxisId(String),
    /// Variant identifier is empty or blank.
    #[error("axis {0} contains a variant with an empty identifier")]
    EmptyVariantId(String),
    /// Duplicate variant identifiers within one axis.
    #[error("axis {axis} contains duplicate variant identifier: {variant}")]
    DuplicateVariantId {
        /// Axis containing the duplicate.
        axis: String,
        /// Duplicated variant identifier.
        variant: String,
    },
    /// Variant label is empty or blank.
    #[error("variant {variant} in axis {axis} has an empty label")]
    EmptyVariantLabel {
        /// Axis containing the variant.
        axis: String,
        /// Variant with the empty label.
        variant: String,
    },
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures axis identifiers are non-blank.
fn ensure_axis_ids_well_formed(axes: &[AxisSpec]) -> Result<(), MatrixError> {
    for axis in axes {
        if axis.axis_id.as_str().trim().is_empty() {
            return Err(MatrixError::EmptyAxisId);
        }
    }
    Ok(())
}

/// Ensures axis identifiers are unique within the matrix.
fn ensure_unique_axis_ids(axes: &[AxisSpec]) -> Result<(), MatrixError> {
    for (index, axis) in axes.iter().enumerate() {
        if axes.iter().skip(index + 1).any(|other| other.axis_id == axis.axis_id) {
            return Err(MatrixError::DuplicateAxisId(axis.axis_id.to_string()));
        }
    }
    Ok(())
}

/// Ensures variant identifiers and labels are non-blank.
fn ensure_variants_well_formed(axis: &AxisSpec) -> Result<(), MatrixError> {
    for variant in &axis.variants {
        if variant.variant_id.as_str().trim().is_empty() {
            return Err(MatrixError::EmptyVariantId(axis.axis_id.to_string()));
        }
        if variant.label.trim().is_empty() {
            return Err(MatrixError::EmptyVariantLabel {
                axis: axis.axis_id.to_string(),
                variant: variant.variant_id.to_string(),
            });
        }
    }
    Ok(())
}

/// Ensures variant identifiers are unique within one axis.
fn ensure_unique_variant_ids(axis: &AxisSpec) -> Result<(), MatrixError> {
    for (index, variant) in axis.variants.iter().enumerate() {
        if axis.variants.iter().skip(index + 1).any(|other| other.variant_id == variant.variant_id)
        {
            return Err(MatrixError::DuplicateVariantId {
                axis: axis.axis_id.to_string(),
                variant: variant.variant_id.to_string(),
            });
        }
    }
    Ok(())
}
