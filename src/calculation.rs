//! Calculation of the eligible base and grant for a single year.
//!
//! The calculation proceeds as follows:
//!
//! 1. The personnel, external and depreciation bases are taken from the [`YearRecord`]
//! 2. If the overhead surcharge applies in this year, it is added as a proportion of the other
//!    three categories
//! 3. If the total exceeds the per-year cap, every category is scaled down by the same factor
//! 4. The grant is the sum of each category multiplied by its rate. Overhead is granted at the
//!    personnel rate.
use crate::policy::FundingPolicy;
use crate::rates::{CompanySize, RateTable};
use crate::record::YearRecord;
use crate::units::{Dimensionless, Money};
use log::debug;
use serde::Serialize;

/// The eligible base and grant for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearResult {
    /// The fiscal year
    pub year: u32,
    /// Eligible personnel costs (after capping)
    pub personnel_base: Money,
    /// Eligible external costs (after capping)
    pub external_base: Money,
    /// Eligible depreciation (after capping)
    pub depreciation_base: Money,
    /// Overhead surcharge (after capping)
    pub overhead_base: Money,
    /// Sum of all categories, never more than the per-year cap
    pub total_base: Money,
    /// The subsidy for this year
    pub grant: Money,
}

/// The eligible amount in each cost category
#[derive(Debug, Clone, Copy, PartialEq)]
struct CategoryBases {
    personnel: Money,
    external: Money,
    depreciation: Money,
    overhead: Money,
}

impl CategoryBases {
    fn total(&self) -> Money {
        self.personnel + self.external + self.depreciation + self.overhead
    }

    fn scale(&self, factor: Dimensionless) -> Self {
        Self {
            personnel: self.personnel * factor,
            external: self.external * factor,
            depreciation: self.depreciation * factor,
            overhead: self.overhead * factor,
        }
    }
}

/// Calculate the bases before the cap is applied
fn uncapped_bases(record: &YearRecord, year: u32, policy: &FundingPolicy) -> CategoryBases {
    let personnel = record.personnel_cost();
    let external = record.external_cost.max(Money(0.0)) * policy.external_cost_weighting;
    let depreciation = record.depreciation_cost.max(Money(0.0));

    let overhead = if policy.overhead_applies(year) {
        (personnel + external + depreciation) * policy.overhead_surcharge_rate
    } else {
        Money(0.0)
    };

    CategoryBases {
        personnel,
        external,
        depreciation,
        overhead,
    }
}

/// Calculate the eligible base and grant for a single year.
///
/// The result depends only on the arguments: the current date plays no part.
///
/// # Arguments
///
/// * `record` - The cost figures for the year
/// * `size` - The company size, which determines the rates
/// * `year` - The fiscal year, which determines whether the overhead surcharge applies
/// * `rates` - Subsidy rates for each company size
/// * `policy` - Cap and overhead rules
pub fn compute_year(
    record: &YearRecord,
    size: CompanySize,
    year: u32,
    rates: &RateTable,
    policy: &FundingPolicy,
) -> YearResult {
    let raw = uncapped_bases(record, year, policy);
    let raw_total = raw.total();

    let (bases, total_base) = if raw_total > policy.max_base_per_year {
        let factor = policy.max_base_per_year / raw_total;
        debug!("Base for {year} of {raw_total} exceeds cap; scaling by {factor}");
        (raw.scale(factor), policy.max_base_per_year)
    } else {
        (raw, raw_total)
    };

    let rates = rates.rates_for(size);
    let grant = bases.personnel * rates.personnel_rate
        + bases.external * rates.external_rate
        + bases.depreciation * rates.depreciation_rate
        + bases.overhead * rates.personnel_rate;

    YearResult {
        year,
        personnel_base: bases.personnel,
        external_base: bases.external,
        depreciation_base: bases.depreciation,
        overhead_base: bases.overhead,
        total_base,
        grant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{default_policy, default_rates, year_record};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn record_with(personnel: f64, external: f64, depreciation: f64) -> YearRecord {
        YearRecord {
            personnel_override: Some(Money(personnel)),
            external_cost: Money(external),
            depreciation_cost: Money(depreciation),
            ..YearRecord::zero()
        }
    }

    #[rstest]
    fn test_sme_without_overhead(
        year_record: YearRecord,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let result = compute_year(
            &year_record,
            CompanySize::Sme,
            2025,
            &default_rates,
            &default_policy,
        );
        assert_eq!(result.year, 2025);
        assert_eq!(result.personnel_base, Money(60_000.0));
        assert_eq!(result.external_base, Money(0.0));
        assert_eq!(result.depreciation_base, Money(0.0));
        assert_eq!(result.overhead_base, Money(0.0));
        assert_eq!(result.total_base, Money(60_000.0));
        assert_approx_eq!(Money, result.grant, Money(21_000.0), epsilon = 1e-8);
    }

    #[rstest]
    fn test_sme_with_overhead(
        year_record: YearRecord,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let result = compute_year(
            &year_record,
            CompanySize::Sme,
            2026,
            &default_rates,
            &default_policy,
        );
        assert_eq!(result.personnel_base, Money(60_000.0));
        assert_approx_eq!(Money, result.overhead_base, Money(12_000.0));
        assert_approx_eq!(Money, result.total_base, Money(72_000.0));
        assert_approx_eq!(Money, result.grant, Money(25_200.0), epsilon = 1e-8);
    }

    #[rstest]
    fn test_large_without_override(default_rates: RateTable, default_policy: FundingPolicy) {
        let record = YearRecord {
            staff_count: 1,
            average_annual_cost: Money(100_000.0),
            rd_share: 100.0,
            personnel_override: None,
            external_cost: Money(50_000.0),
            depreciation_cost: Money(10_000.0),
        };
        let result = compute_year(
            &record,
            CompanySize::Large,
            2023,
            &default_rates,
            &default_policy,
        );
        assert_eq!(result.personnel_base, Money(100_000.0));
        assert_eq!(result.total_base, Money(160_000.0));
        assert_approx_eq!(Money, result.grant, Money(35_000.0), epsilon = 1e-8);
    }

    #[rstest]
    fn test_cap_scales_proportionally(default_rates: RateTable, default_policy: FundingPolicy) {
        let record = record_with(9_000_000.0, 2_000_000.0, 0.0);
        let result = compute_year(
            &record,
            CompanySize::Sme,
            2024,
            &default_rates,
            &default_policy,
        );

        assert_approx_eq!(
            Money,
            result.personnel_base,
            Money(90_000_000.0 / 11.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Money,
            result.external_base,
            Money(20_000_000.0 / 11.0),
            epsilon = 1e-6
        );
        assert_eq!(result.depreciation_base, Money(0.0));
        assert_eq!(result.total_base, Money(10_000_000.0));

        let expected_grant = result.personnel_base * Dimensionless(0.35)
            + result.external_base * Dimensionless(0.245);
        assert_approx_eq!(Money, result.grant, expected_grant, epsilon = 1e-6);
    }

    #[rstest]
    fn test_cap_includes_overhead(default_rates: RateTable, default_policy: FundingPolicy) {
        // 9m + 20% overhead = 10.8m, so the cap only bites because of the overhead
        let record = record_with(9_000_000.0, 0.0, 0.0);
        let result = compute_year(
            &record,
            CompanySize::Large,
            2027,
            &default_rates,
            &default_policy,
        );

        assert_eq!(result.total_base, Money(10_000_000.0));
        let ratio = result.overhead_base / result.personnel_base;
        assert_approx_eq!(Dimensionless, ratio, Dimensionless(0.2), epsilon = 1e-12);
        assert_approx_eq!(
            Money,
            result.personnel_base + result.overhead_base,
            Money(10_000_000.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(Money, result.grant, Money(2_500_000.0), epsilon = 1e-6);
    }

    #[rstest]
    #[case(1.0, 2.0, 3.0, 2020)]
    #[case(5e6, 5e6, 5e6, 2025)]
    #[case(5e6, 5e6, 5e6, 2026)]
    #[case(1e9, 1.0, 0.0, 2030)]
    #[case(0.0, 0.0, 3e7, 2022)]
    fn test_cap_invariants(
        #[case] personnel: f64,
        #[case] external: f64,
        #[case] depreciation: f64,
        #[case] year: u32,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let record = record_with(personnel, external, depreciation);
        let result = compute_year(
            &record,
            CompanySize::Sme,
            year,
            &default_rates,
            &default_policy,
        );
        assert!(result.total_base <= default_policy.max_base_per_year);

        // Category ratios must be preserved by the cap
        let raw = uncapped_bases(&record, year, &default_policy);
        let raw_total = raw.total();
        for (scaled, unscaled) in [
            (result.personnel_base, raw.personnel),
            (result.external_base, raw.external),
            (result.depreciation_base, raw.depreciation),
            (result.overhead_base, raw.overhead),
        ] {
            assert_approx_eq!(
                Dimensionless,
                scaled / result.total_base,
                unscaled / raw_total,
                epsilon = 1e-9
            );
        }
    }

    #[rstest]
    fn test_no_scaling_below_cap(default_rates: RateTable, default_policy: FundingPolicy) {
        let record = record_with(4_000_000.0, 3_000_000.0, 3_000_000.0);
        let result = compute_year(
            &record,
            CompanySize::Sme,
            2024,
            &default_rates,
            &default_policy,
        );

        // Exactly at the cap: nothing is scaled
        assert_eq!(result.personnel_base, Money(4_000_000.0));
        assert_eq!(result.external_base, Money(3_000_000.0));
        assert_eq!(result.depreciation_base, Money(3_000_000.0));
        assert_eq!(result.total_base, Money(10_000_000.0));
    }

    #[rstest]
    fn test_zero_total(default_rates: RateTable, default_policy: FundingPolicy) {
        let result = compute_year(
            &YearRecord::zero(),
            CompanySize::Large,
            2026,
            &default_rates,
            &default_policy,
        );
        assert_eq!(result.total_base, Money(0.0));
        assert_eq!(result.grant, Money(0.0));
        assert!(result.overhead_base.is_finite());
    }

    #[rstest]
    #[case(2025, 0.0)]
    #[case(2026, 0.2 * 16_000.0)]
    fn test_overhead_is_step_function(
        #[case] year: u32,
        #[case] expected_overhead: f64,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let record = record_with(10_000.0, 5_000.0, 1_000.0);
        let result = compute_year(
            &record,
            CompanySize::Sme,
            year,
            &default_rates,
            &default_policy,
        );
        assert_approx_eq!(
            Money,
            result.overhead_base,
            Money(expected_overhead),
            epsilon = 1e-9
        );
    }

    #[rstest]
    #[case(1, 50_000.0, 10.0)]
    #[case(30, 90_000.0, 100.0)]
    #[case(0, 0.0, 0.0)]
    fn test_override_ignores_staff_fields(
        #[case] staff_count: u32,
        #[case] average_annual_cost: f64,
        #[case] rd_share: f64,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let record = YearRecord {
            staff_count,
            average_annual_cost: Money(average_annual_cost),
            rd_share,
            personnel_override: Some(Money(250_000.0)),
            external_cost: Money(0.0),
            depreciation_cost: Money(0.0),
        };
        let result = compute_year(
            &record,
            CompanySize::Sme,
            2024,
            &default_rates,
            &default_policy,
        );
        assert_eq!(result.personnel_base, Money(250_000.0));
        assert_approx_eq!(Money, result.grant, Money(87_500.0), epsilon = 1e-8);
    }

    #[rstest]
    fn test_external_cost_weighting(default_rates: RateTable) {
        let policy = FundingPolicy {
            external_cost_weighting: Dimensionless(0.7),
            ..FundingPolicy::default()
        };
        let record = record_with(0.0, 100_000.0, 0.0);
        let result = compute_year(&record, CompanySize::Large, 2024, &default_rates, &policy);
        assert_approx_eq!(Money, result.external_base, Money(70_000.0), epsilon = 1e-8);
        assert_approx_eq!(Money, result.grant, Money(10_500.0), epsilon = 1e-8);
    }

    #[rstest]
    fn test_compute_year_is_deterministic(
        year_record: YearRecord,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        let first = compute_year(
            &year_record,
            CompanySize::Sme,
            2026,
            &default_rates,
            &default_policy,
        );
        let second = compute_year(
            &year_record,
            CompanySize::Sme,
            2026,
            &default_rates,
            &default_policy,
        );
        assert_eq!(first, second);
    }
}
