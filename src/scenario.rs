//! Code for loading scenarios: a company's cost figures along with the rules to apply to them.
use crate::enquiry::Enquiry;
use crate::input::{input_err_msg, read_rate_table, read_year_records};
use crate::policy::FundingPolicy;
use crate::portfolio::Portfolio;
use crate::rates::RateTable;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

pub mod parameters;
use parameters::ScenarioParameters;

/// Everything needed to calculate and report on a company's subsidy
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// The years, cost figures and company size
    pub portfolio: Portfolio,
    /// Subsidy rates for each company size
    pub rates: RateTable,
    /// Cap and overhead rules
    pub policy: FundingPolicy,
    /// Contact details and questionnaire answers
    pub enquiry: Enquiry,
}

impl Scenario {
    /// Read a scenario from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario configuration files
    /// * `current_year` - The current calendar year, which determines the latest permitted year
    pub fn from_path<P: AsRef<Path>>(scenario_dir: P, current_year: u32) -> Result<Self> {
        let scenario_dir = scenario_dir.as_ref();
        let parameters = ScenarioParameters::from_path(scenario_dir, current_year)?;
        let year_range = parameters.year_range(current_year);

        let records = read_year_records(scenario_dir)?;
        for (year, _) in &records {
            if !year_range.contains(*year) {
                warn!(
                    "Year {year} is outside the permitted range {}-{}; using {}",
                    year_range.min(),
                    year_range.max(),
                    year_range.clamp(*year)
                );
            }
        }

        let mut portfolio = Portfolio::from_records(year_range, records, parameters.company_size)
            .with_context(|| input_err_msg(scenario_dir.join("year_records.csv")))?;
        if let Some(active_year) = parameters.active_year {
            portfolio
                .set_active_year(active_year)
                .context("Invalid value for active_year")?;
        }

        let rates = read_rate_table(scenario_dir)?;
        let enquiry = Enquiry::from_path(scenario_dir)?;
        info!(
            "Loaded {} year(s) for company size {}",
            portfolio.len(),
            portfolio.company_size()
        );

        Ok(Self {
            portfolio,
            rates,
            policy: parameters.policy,
            enquiry,
        })
    }
}
