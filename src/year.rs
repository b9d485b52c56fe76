//! Code for working with fiscal years.
use anyhow::{Context, Result, ensure};
use chrono::Datelike;
use itertools::Itertools;

/// The earliest year for which a subsidy can be claimed
pub const DEFAULT_MIN_YEAR: u32 = 2022;

/// How many years beyond the current one can be planned for
pub const DEFAULT_MAX_YEARS_AHEAD: u32 = 10;

/// The current calendar year.
///
/// Only used for picking defaults and bounds, never inside a calculation.
pub fn current_year() -> u32 {
    chrono::Local::now().year().try_into().unwrap_or(DEFAULT_MIN_YEAR)
}

/// The range of years which can be included in a portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    min: u32,
    max: u32,
}

impl YearRange {
    /// Create a new [`YearRange`]
    pub fn new(min: u32, max: u32) -> Result<Self> {
        ensure!(min <= max, "Invalid year range: {min} is after {max}");
        Ok(Self { min, max })
    }

    /// The range from `min_year` to `years_ahead` years after `current_year`.
    ///
    /// If `current_year` is before `min_year`, the range only contains `min_year`.
    pub fn from_current_year(current_year: u32, min_year: u32, years_ahead: u32) -> Self {
        let max = current_year.saturating_add(years_ahead).max(min_year);
        Self { min: min_year, max }
    }

    /// The first year in the range
    pub fn min(&self) -> u32 {
        self.min
    }

    /// The last year in the range
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether `year` is in the range
    pub fn contains(&self, year: u32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Clamp `year` to lie within the range
    pub fn clamp(&self, year: u32) -> u32 {
        year.clamp(self.min, self.max)
    }

    /// The year to start with: the current year, unless it is outside the range
    pub fn default_year(&self, current_year: u32) -> u32 {
        self.clamp(current_year)
    }
}

/// Parse a string of years separated by semicolons into a vector of u32 years.
///
/// The string can be either "all" (case-insensitive), a single year, or a semicolon-separated list
/// of years (e.g. "2022;2023;2024" or "2022; 2023; 2024")
///
/// # Arguments
///
/// - `s` - Input string to parse
/// - `valid_years` - The possible years which can be referenced in `s`
///
/// # Returns
///
/// A [`Vec`] of years or an error.
pub fn parse_year_str<I, J>(s: &str, valid_years: I) -> Result<Vec<u32>>
where
    I: IntoIterator<Item = u32, IntoIter = J> + Clone,
    J: Iterator<Item = u32> + Clone,
{
    let s = s.trim();
    ensure!(!s.is_empty(), "No years provided");
    let valid_years = valid_years.into_iter();

    if s.eq_ignore_ascii_case("all") {
        return Ok(Vec::from_iter(valid_years));
    }

    let parse_and_validate_year = |s: &str| {
        let year = s.trim().parse::<u32>().ok()?;
        valid_years.clone().contains(&year).then_some(year)
    };
    let years: Vec<_> = s
        .split(';')
        .map(|y| parse_and_validate_year(y).with_context(|| format!("Invalid year: {y}")))
        .try_collect()?;

    ensure!(
        is_sorted_and_unique(&years),
        "Years must be in order and unique"
    );

    Ok(years)
}

/// Check that a slice of years is sorted in ascending order with no duplicates
pub fn is_sorted_and_unique(years: &[u32]) -> bool {
    years.iter().tuple_windows().all(|(a, b)| a < b)
}
