// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Monetary amounts, stored as integer minor units to avoid floating-point
//! drift across corrections and reconciliation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
}

impl Money {
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// Builds from a decimal amount, e.g. `3140.00`. Rounds to the nearest
    /// cent; bank statement amounts never carry sub-cent precision.
    pub fn from_decimal(amount: f64) -> Self {
        Self {
            minor_units: (amount * 100.0).round() as i64,
        }
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn as_decimal(&self) -> f64 {
        self.minor_units as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_round_trips() {
        let m = Money::from_decimal(3140.00);
        assert_eq!(m.minor_units(), 314000);
        assert_eq!(m.to_string(), "3140.00");
    }
}
