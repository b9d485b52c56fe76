//! The per-year cost inputs.
use crate::units::{Dimensionless, Money};

/// The cost figures entered for a single fiscal year.
///
/// All values are expected to have been sanitised before they get here: amounts are finite and
/// non-negative and `rd_share` is a percentage between 0 and 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearRecord {
    /// Number of staff working on R&D
    pub staff_count: u32,
    /// Average annual cost per member of staff
    pub average_annual_cost: Money,
    /// Percentage (0-100) of staff cost attributable to R&D
    pub rd_share: f64,
    /// Total eligible personnel costs, replacing the calculated figure if present
    pub personnel_override: Option<Money>,
    /// Costs of contract research carried out by third parties
    pub external_cost: Money,
    /// Depreciation of assets used for R&D
    pub depreciation_cost: Money,
}

impl Default for YearRecord {
    fn default() -> Self {
        Self {
            staff_count: 1,
            average_annual_cost: Money(60_000.0),
            rd_share: 50.0,
            personnel_override: None,
            external_cost: Money(0.0),
            depreciation_cost: Money(0.0),
        }
    }
}

impl YearRecord {
    /// A record with all costs set to zero
    pub fn zero() -> Self {
        Self {
            staff_count: 0,
            average_annual_cost: Money(0.0),
            rd_share: 0.0,
            personnel_override: None,
            external_cost: Money(0.0),
            depreciation_cost: Money(0.0),
        }
    }

    /// The personnel costs calculated from staff numbers, cost per head and R&D share
    pub fn calculated_personnel_cost(&self) -> Money {
        self.average_annual_cost
            * Dimensionless(self.staff_count as f64)
            * Dimensionless(self.rd_share / 100.0)
    }

    /// The personnel base: the override if set, otherwise the calculated figure
    pub fn personnel_cost(&self) -> Money {
        match self.personnel_override {
            Some(value) => value.max(Money(0.0)),
            None => self.calculated_personnel_cost().max(Money(0.0)),
        }
    }
}
