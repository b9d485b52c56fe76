//! The set of fiscal years under consideration and the cost figures for each.
use crate::aggregate::{PortfolioResult, compute_portfolio};
use crate::policy::FundingPolicy;
use crate::rates::{CompanySize, RateTable};
use crate::record::YearRecord;
use crate::year::YearRange;
use anyhow::{Context, Result, bail, ensure};
use log::debug;
use std::collections::BTreeMap;

/// The years being claimed for, their cost figures, the active year and the company size.
///
/// There is always at least one year and the active year is always one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    records: BTreeMap<u32, YearRecord>,
    active_year: u32,
    company_size: CompanySize,
    year_range: YearRange,
}

impl Portfolio {
    /// Create a new [`Portfolio`] containing a single year with default cost figures.
    ///
    /// The year is the current year, or the nearest year in `year_range` if it lies outside it.
    pub fn new(year_range: YearRange, current_year: u32, company_size: CompanySize) -> Self {
        let year = year_range.default_year(current_year);
        Self {
            records: BTreeMap::from([(year, YearRecord::default())]),
            active_year: year,
            company_size,
            year_range,
        }
    }

    /// Create a [`Portfolio`] from existing records.
    ///
    /// Years are clamped to `year_range`. It is an error for two records to end up with the same
    /// year or for there to be no records.
    pub fn from_records<I>(
        year_range: YearRange,
        records: I,
        company_size: CompanySize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, YearRecord)>,
    {
        let mut map = BTreeMap::new();
        for (year, record) in records {
            let clamped = year_range.clamp(year);
            ensure!(
                map.insert(clamped, record).is_none(),
                "Duplicate entry for year {clamped}"
            );
        }

        let Some(&latest) = map.keys().next_back() else {
            bail!("At least one year must be provided");
        };

        Ok(Self {
            records: map,
            active_year: latest,
            company_size,
            year_range,
        })
    }

    /// The years in the portfolio, in ascending order
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.keys().copied()
    }

    /// The number of years in the portfolio
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: a portfolio contains at least one year
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `year` is in the portfolio
    pub fn contains(&self, year: u32) -> bool {
        self.records.contains_key(&year)
    }

    /// The currently selected year
    pub fn active_year(&self) -> u32 {
        self.active_year
    }

    /// The company size used for all years
    pub fn company_size(&self) -> CompanySize {
        self.company_size
    }

    /// The cost figures for `year`, if present
    pub fn record(&self, year: u32) -> Option<&YearRecord> {
        self.records.get(&year)
    }

    /// The cost figures for the active year
    pub fn active_record(&self) -> &YearRecord {
        &self.records[&self.active_year]
    }

    /// Iterate over years and their cost figures, in ascending order of year
    pub fn iter(&self) -> impl Iterator<Item = (u32, &YearRecord)> {
        self.records.iter().map(|(year, record)| (*year, record))
    }

    /// Add a year (with default cost figures) and make it the active year.
    ///
    /// The year is clamped to the allowed range. If it is already present, the existing figures
    /// are kept.
    ///
    /// # Returns
    ///
    /// The year which was actually added or selected.
    pub fn add_year(&mut self, year: u32) -> u32 {
        let year = self.year_range.clamp(year);
        self.records.entry(year).or_default();
        self.active_year = year;
        debug!("Active year is now {year}");

        year
    }

    /// Add the year after the latest one (or select the latest year, if already at the limit)
    pub fn add_next_year(&mut self) -> u32 {
        let latest = self.records.keys().next_back().copied().unwrap_or(self.active_year);
        self.add_year(latest.saturating_add(1))
    }

    /// Add the year before the earliest one (or select the earliest year, if already at the limit)
    pub fn add_previous_year(&mut self) -> u32 {
        let earliest = self.records.keys().next().copied().unwrap_or(self.active_year);
        self.add_year(earliest.saturating_sub(1))
    }

    /// Remove a year.
    ///
    /// Nothing happens if the year is absent or is the only remaining year. If the active year is
    /// removed, the latest remaining year becomes active.
    ///
    /// # Returns
    ///
    /// Whether the year was removed.
    pub fn remove_year(&mut self, year: u32) -> bool {
        if self.records.len() <= 1 || self.records.remove(&year).is_none() {
            return false;
        }

        if self.active_year == year
            && let Some(&latest) = self.records.keys().next_back()
        {
            self.active_year = latest;
        }

        true
    }

    /// Select the active year.
    ///
    /// The year must already be in the portfolio; nothing is substituted if it isn't.
    pub fn set_active_year(&mut self, year: u32) -> Result<()> {
        ensure!(
            self.contains(year),
            "Year {year} is not part of the portfolio"
        );
        self.active_year = year;

        Ok(())
    }

    /// Change the company size. Cost figures are unaffected.
    pub fn set_company_size(&mut self, size: CompanySize) {
        self.company_size = size;
    }

    /// Replace the cost figures for a year which is already in the portfolio
    pub fn set_record(&mut self, year: u32, record: YearRecord) -> Result<()> {
        let Some(entry) = self.records.get_mut(&year) else {
            bail!("Year {year} is not part of the portfolio");
        };
        *entry = record;

        Ok(())
    }

    /// Calculate results for every year in the portfolio
    pub fn compute(&self, rates: &RateTable, policy: &FundingPolicy) -> PortfolioResult {
        compute_portfolio(self.iter(), self.company_size, rates, policy)
    }

    /// Calculate results for the given subset of years.
    ///
    /// Every year in `years` must be in the portfolio.
    pub fn compute_selected(
        &self,
        years: &[u32],
        rates: &RateTable,
        policy: &FundingPolicy,
    ) -> Result<PortfolioResult> {
        let records: Vec<_> = years
            .iter()
            .map(|&year| {
                self.record(year)
                    .map(|record| (year, record))
                    .with_context(|| format!("Year {year} is not part of the portfolio"))
            })
            .collect::<Result<_>>()?;

        Ok(compute_portfolio(records, self.company_size, rates, policy))
    }
}
