//! Defines the `ScenarioParameters` struct, which represents the contents of `scenario.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::policy::FundingPolicy;
use crate::rates::CompanySize;
use crate::year::{DEFAULT_MAX_YEARS_AHEAD, DEFAULT_MIN_YEAR, YearRange};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const SCENARIO_PARAMETERS_FILE_NAME: &str = "scenario.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_min_year, u32, DEFAULT_MIN_YEAR);
define_param_default!(default_max_years_ahead, u32, DEFAULT_MAX_YEARS_AHEAD);

/// Represents the contents of the entire scenario file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ScenarioParameters {
    /// The size classification of the company
    #[serde(default)]
    pub company_size: CompanySize,
    /// The year to select initially. Defaults to the latest year.
    pub active_year: Option<u32>,
    /// The earliest year which can be claimed for
    #[serde(default = "default_min_year")]
    pub min_year: u32,
    /// How many years after the current one can be planned for
    #[serde(default = "default_max_years_ahead")]
    pub max_years_ahead: u32,
    /// Cap and overhead rules
    #[serde(default)]
    pub policy: FundingPolicy,
}

/// Check that the `min_year` parameter is valid
fn check_min_year(min_year: u32, current_year: u32) -> Result<()> {
    ensure!(min_year > 0, "min_year cannot be zero");
    if min_year > current_year {
        warn!("min_year ({min_year}) is after the current year ({current_year})");
    }

    Ok(())
}

impl ScenarioParameters {
    /// Read a scenario file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario configuration files
    /// * `current_year` - The current calendar year, used for checking the year bounds
    ///
    /// # Returns
    ///
    /// The file contents as a [`ScenarioParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(
        scenario_dir: P,
        current_year: u32,
    ) -> Result<ScenarioParameters> {
        let file_path = scenario_dir.as_ref().join(SCENARIO_PARAMETERS_FILE_NAME);
        let params: ScenarioParameters = read_toml(&file_path)?;

        params
            .validate(current_year)
            .with_context(|| input_err_msg(file_path))?;

        Ok(params)
    }

    /// Validate parameters after reading in file
    fn validate(&self, current_year: u32) -> Result<()> {
        check_min_year(self.min_year, current_year)?;
        self.policy.validate()?;

        Ok(())
    }

    /// The range of years which can be included, given the current year
    pub fn year_range(&self, current_year: u32) -> YearRange {
        YearRange::from_current_year(current_year, self.min_year, self.max_years_ahead)
    }
}
