// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A confidence score clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const ONE: Confidence = Confidence(1.0);

    /// Clamps `value` into `[0, 1]` per the "confidence products clamped"
    /// boundary behavior.
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn min(self, other: Confidence) -> Confidence {
        Confidence(self.0.min(other.0))
    }

    pub fn product(self, other: Confidence) -> Confidence {
        Confidence::new(self.0 * other.0)
    }

    pub fn at_least(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Confidence::new(1.5).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
    }

    #[test]
    fn product_stays_clamped() {
        let a = Confidence::new(0.9);
        let b = Confidence::new(0.8);
        assert!((a.product(b).value() - 0.72).abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn new_is_always_within_unit_interval(raw in -1000.0f64..1000.0) {
            let c = Confidence::new(raw);
            proptest::prop_assert!(c.value() >= 0.0 && c.value() <= 1.0);
        }

        #[test]
        fn product_of_two_confidences_is_always_within_unit_interval(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let product = Confidence::new(a).product(Confidence::new(b));
            proptest::prop_assert!(product.value() >= 0.0 && product.value() <= 1.0);
        }
    }
}
