//! Subsidy rates, keyed by company size.
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// The size classification of a company, which determines which subsidy rates apply
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
    clap::ValueEnum,
)]
pub enum CompanySize {
    /// Small or medium-sized enterprise
    #[default]
    #[string = "sme"]
    #[value(name = "sme")]
    Sme,
    /// Large enterprise
    #[string = "large"]
    #[value(name = "large")]
    Large,
}

impl CompanySize {
    /// The short code used in input files and on the command line
    pub fn code(self) -> &'static str {
        match self {
            Self::Sme => "sme",
            Self::Large => "large",
        }
    }

    /// A human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Sme => "SME",
            Self::Large => "Large enterprise",
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The subsidy rates applied to each cost category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryRates {
    /// Rate for personnel costs (and the overhead surcharge)
    pub personnel_rate: Dimensionless,
    /// Rate for contract research carried out by third parties
    pub external_rate: Dimensionless,
    /// Rate for depreciation of R&D assets
    pub depreciation_rate: Dimensionless,
}

impl CategoryRates {
    /// Create a new set of rates
    pub const fn new(personnel_rate: f64, external_rate: f64, depreciation_rate: f64) -> Self {
        Self {
            personnel_rate: Dimensionless::new(personnel_rate),
            external_rate: Dimensionless::new(external_rate),
            depreciation_rate: Dimensionless::new(depreciation_rate),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, Dimensionless)> {
        [
            ("personnel_rate", self.personnel_rate),
            ("external_rate", self.external_rate),
            ("depreciation_rate", self.depreciation_rate),
        ]
        .into_iter()
    }
}

/// Default rates for SMEs
pub const DEFAULT_SME_RATES: CategoryRates = CategoryRates::new(0.35, 0.245, 0.35);

/// Default rates for large enterprises
pub const DEFAULT_LARGE_RATES: CategoryRates = CategoryRates::new(0.25, 0.15, 0.25);

/// Subsidy rates for every company size.
///
/// A [`RateTable`] always has an entry for every [`CompanySize`], so lookups cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable(IndexMap<CompanySize, CategoryRates>);

impl RateTable {
    /// Create a new [`RateTable`], checking that every company size is covered and that all rates
    /// are proportions.
    pub fn new(rates: IndexMap<CompanySize, CategoryRates>) -> Result<Self> {
        for size in CompanySize::iter() {
            let entry = rates
                .get(&size)
                .with_context(|| format!("Missing rates for company size {}", size.code()))?;

            for (name, rate) in entry.iter() {
                ensure!(
                    rate.is_finite() && (0.0..=1.0).contains(&rate.value()),
                    "{name} for company size {} must be between 0 and 1",
                    size.code()
                );
            }
        }

        Ok(Self(rates))
    }

    /// Get the rates which apply to companies of the given size
    pub fn rates_for(&self, size: CompanySize) -> &CategoryRates {
        // Guaranteed to be present by RateTable::new
        &self.0[&size]
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self(IndexMap::from([
            (CompanySize::Sme, DEFAULT_SME_RATES),
            (CompanySize::Large, DEFAULT_LARGE_RATES),
        ]))
    }
}
