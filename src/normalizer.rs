//! Allocation normalization
//!
//! Jointly predicted fractions are rescaled to sum to 1. Sequential slices
//! are already disjoint shares of the surplus and pass through bounded only.

use crate::models::AllocationSet;
use crate::predictor::{AllocationBasis, Prediction};

/// Normalized fractions for a prediction
pub fn normalize(prediction: &Prediction) -> AllocationSet {
    match prediction.basis {
        AllocationBasis::Joint => normalize_joint(&prediction.allocations),
        AllocationBasis::Sequential => bound(&prediction.allocations),
    }
}

/// Rescale to a unit sum; an all-zero set stays all zero
pub fn normalize_joint(raw: &AllocationSet) -> AllocationSet {
    let bounded = bound(raw);
    let total = bounded.total();

    if total <= 0.0 {
        return AllocationSet::zero();
    }

    AllocationSet::from_fn(|b| bounded.get(b) / total)
}

fn bound(raw: &AllocationSet) -> AllocationSet {
    AllocationSet::from_fn(|b| {
        let v = raw.get(b);
        if v.is_finite() {
            v.clamp(0.0, 1.0)
        } else {
            0.0
        }
    })
}
