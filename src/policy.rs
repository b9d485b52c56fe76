//! Policy constants which apply to every year's calculation, independent of company size.
use crate::units::{Dimensionless, Money};
use anyhow::{Result, ensure};
use serde::Deserialize;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_max_base_per_year, Money, 10_000_000.0);
define_param_default!(default_overhead_effective_from_year, u32, 2026);
define_unit_param_default!(default_overhead_surcharge_rate, Dimensionless, 0.2);
define_unit_param_default!(default_external_cost_weighting, Dimensionless, 1.0);

/// Funding rules shared by all years and company sizes.
///
/// Read from the `[policy]` table of `scenario.toml`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct FundingPolicy {
    /// The maximum eligible base per year, across all cost categories
    #[serde(default = "default_max_base_per_year")]
    pub max_base_per_year: Money,
    /// The first year in which the overhead surcharge applies
    #[serde(default = "default_overhead_effective_from_year")]
    pub overhead_effective_from_year: u32,
    /// The overhead surcharge, as a proportion of the other eligible costs
    #[serde(default = "default_overhead_surcharge_rate")]
    pub overhead_surcharge_rate: Dimensionless,
    /// Weighting applied to external costs before they enter the base.
    ///
    /// Some product revisions only counted 70% of contract research costs.
    #[serde(default = "default_external_cost_weighting")]
    pub external_cost_weighting: Dimensionless,
}

impl Default for FundingPolicy {
    fn default() -> Self {
        Self {
            max_base_per_year: default_max_base_per_year(),
            overhead_effective_from_year: default_overhead_effective_from_year(),
            overhead_surcharge_rate: default_overhead_surcharge_rate(),
            external_cost_weighting: default_external_cost_weighting(),
        }
    }
}

/// Check that the `max_base_per_year` parameter is valid
fn check_max_base_per_year(value: Money) -> Result<()> {
    ensure!(
        value.is_finite() && value > Money(0.0),
        "max_base_per_year must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that a parameter is a proportion (between 0 and 1)
fn check_proportion(name: &str, value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && (0.0..=1.0).contains(&value.value()),
        "{name} must be between 0 and 1"
    );

    Ok(())
}

impl FundingPolicy {
    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_max_base_per_year(self.max_base_per_year)?;
        check_proportion("overhead_surcharge_rate", self.overhead_surcharge_rate)?;
        check_proportion("external_cost_weighting", self.external_cost_weighting)?;

        Ok(())
    }

    /// Whether the overhead surcharge applies in the given year
    pub fn overhead_applies(&self, year: u32) -> bool {
        year >= self.overhead_effective_from_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[test]
    fn test_default_policy() {
        let policy = FundingPolicy::default();
        assert_eq!(policy.max_base_per_year, Money(10_000_000.0));
        assert_eq!(policy.overhead_effective_from_year, 2026);
        assert_eq!(policy.overhead_surcharge_rate, Dimensionless(0.2));
        assert_eq!(policy.external_cost_weighting, Dimensionless(1.0));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_from_empty_toml() {
        let policy: FundingPolicy = toml::from_str("").unwrap();
        assert_eq!(policy, FundingPolicy::default());
    }

    #[rstest]
    #[case(2025, false)]
    #[case(2026, true)]
    #[case(2030, true)]
    fn test_overhead_applies(#[case] year: u32, #[case] expected: bool) {
        assert_eq!(FundingPolicy::default().overhead_applies(year), expected);
    }

    #[rstest]
    #[case(1.0, true)]
    #[case(1e7, true)]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_max_base_per_year(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(
            check_max_base_per_year(Money(value)).is_ok(),
            expected_valid
        );
    }

    #[test]
    fn test_validate_bad_weighting() {
        let policy = FundingPolicy {
            external_cost_weighting: Dimensionless(1.5),
            ..FundingPolicy::default()
        };
        assert_error!(
            policy.validate(),
            "external_cost_weighting must be between 0 and 1"
        );
    }
}
