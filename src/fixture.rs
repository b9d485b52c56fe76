//! Fixtures for tests
use crate::policy::FundingPolicy;
use crate::portfolio::Portfolio;
use crate::rates::{CompanySize, RateTable};
use crate::record::YearRecord;
use crate::units::Money;
use crate::year::{DEFAULT_MAX_YEARS_AHEAD, DEFAULT_MIN_YEAR, YearRange};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn year_record() -> YearRecord {
    YearRecord {
        staff_count: 2,
        average_annual_cost: Money(60_000.0),
        rd_share: 50.0,
        personnel_override: None,
        external_cost: Money(0.0),
        depreciation_cost: Money(0.0),
    }
}

#[fixture]
pub fn default_rates() -> RateTable {
    RateTable::default()
}

#[fixture]
pub fn default_policy() -> FundingPolicy {
    FundingPolicy::default()
}

#[fixture]
pub fn year_range() -> YearRange {
    YearRange::from_current_year(2026, DEFAULT_MIN_YEAR, DEFAULT_MAX_YEARS_AHEAD)
}

#[fixture]
pub fn portfolio(year_range: YearRange) -> Portfolio {
    Portfolio::new(year_range, 2025, CompanySize::Sme)
}
