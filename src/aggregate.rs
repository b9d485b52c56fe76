//! Aggregation of per-year results into multi-year totals.
use crate::calculation::{YearResult, compute_year};
use crate::policy::FundingPolicy;
use crate::rates::{CompanySize, RateTable};
use crate::record::YearRecord;
use crate::units::Money;
use log::debug;

/// Totals across a set of years.
///
/// The per-year cap is never applied to these sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioTotals {
    /// Sum of personnel bases
    pub total_personnel: Money,
    /// Sum of external bases
    pub total_external: Money,
    /// Sum of depreciation bases
    pub total_depreciation: Money,
    /// Sum of overhead bases
    pub total_overhead: Money,
    /// Sum of total bases
    pub total_base: Money,
    /// Sum of grants
    pub total_grant: Money,
}

impl PortfolioTotals {
    /// Sum the given per-year results
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a YearResult>,
    {
        results
            .into_iter()
            .fold(Self::default(), |mut totals, result| {
                totals.total_personnel += result.personnel_base;
                totals.total_external += result.external_base;
                totals.total_depreciation += result.depreciation_base;
                totals.total_overhead += result.overhead_base;
                totals.total_base += result.total_base;
                totals.total_grant += result.grant;
                totals
            })
    }
}

/// The results for each selected year, along with totals
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    /// Results for each year, in the order supplied
    pub per_year: Vec<YearResult>,
    /// Totals across all years
    pub totals: PortfolioTotals,
}

impl PortfolioResult {
    /// The years included in the result
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.per_year.iter().map(|result| result.year)
    }
}

/// Calculate results for every year and the totals across them.
///
/// Everything is recalculated from scratch on each call.
///
/// # Arguments
///
/// * `records` - Pairs of year and the cost figures for that year
/// * `size` - The company size
/// * `rates` - Subsidy rates for each company size
/// * `policy` - Cap and overhead rules
pub fn compute_portfolio<'a, I>(
    records: I,
    size: CompanySize,
    rates: &RateTable,
    policy: &FundingPolicy,
) -> PortfolioResult
where
    I: IntoIterator<Item = (u32, &'a YearRecord)>,
{
    let per_year: Vec<_> = records
        .into_iter()
        .map(|(year, record)| compute_year(record, size, year, rates, policy))
        .collect();
    let totals = PortfolioTotals::from_results(&per_year);
    debug!(
        "Calculated grant of {} over {} year(s)",
        totals.total_grant,
        per_year.len()
    );

    PortfolioResult { per_year, totals }
}
