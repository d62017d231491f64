// crates/testgrid-core/src/core/expander.rs
// ============================================================================
// Module: TestGrid Matrix Expander
// Description: Cartesian-product expansion of matrix axes into combinations.
// Purpose: Produce the deterministic, ordered combination set for a matrix.
// Dependencies: crate::core::{identifiers, matrix}, serde, serde_json
// ============================================================================

//! ## Overview
//! The expander is a pure function of its input: given an ordered list of
//! axes it produces the full Cartesian product as an ordered sequence of
//! combinations, outer axis major and inner axis minor, both in declaration
//! order. The combination count equals the product of axis lengths, so any
//! zero-variant axis yields an empty product. Expansion has no error
//! conditions and no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AxisId;
use crate::core::identifiers::VariantId;
use crate::core::matrix::MatrixSpec;

// ============================================================================
// SECTION: Combination Types
// ============================================================================

/// One axis choice recorded in a combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Axis the choice was made on.
    pub axis_id: AxisId,
    /// Variant selected from the axis.
    pub variant_id: VariantId,
}

/// One fully-resolved combination of axis variants.
///
/// # Invariants
/// - `selections` holds exactly one entry per axis, in axis declaration
///   order.
/// - `fields` is the union of the selected variants' fields; on key
///   collision the later axis wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    /// Ordered axis selections.
    pub selections: Vec<Selection>,
    /// Merged key-value fields from the selected variants.
    pub fields: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Expands a matrix into the full Cartesian product of its axes.
///
/// The result preserves a deterministic enumeration order: the first axis is
/// the outermost loop and the last axis the innermost, each iterated in
/// variant declaration order. Repeated expansion of the same input yields an
/// identical sequence.
#[must_use]
pub fn expand(matrix: &MatrixSpec) -> Vec<Combination> {
    let mut combinations = vec![Combination {
        selections: Vec::new(),
        fields: BTreeMap::new(),
    }];

    for axis in &matrix.axes {
        let mut next = Vec::with_capacity(combinations.len().saturating_mul(axis.variants.len()));
        for combination in &combinations {
            for variant in &axis.variants {
                let mut extended = combination.clone();
                extended.selections.push(Selection {
                    axis_id: axis.axis_id.clone(),
                    variant_id: variant.variant_id.clone(),
                });
                extended
                    .fields
                    .extend(variant.fields.iter().map(|(key, value)| (key.clone(), value.clone())));
                next.push(extended);
            }
        }
        combinations = next;
    }

    combinations
}
