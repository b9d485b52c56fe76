//! Code for reading the per-year cost figures from the year records CSV file.
//!
//! This is the boundary at which user-entered figures are sanitised. Anything which is not a
//! finite, non-negative number is treated as zero, amounts are limited to
//! [`MAX_INPUT_VALUE`](super::MAX_INPUT_VALUE) and R&D shares are clamped to 0-100%.
use super::{input_err_msg, parse_count, parse_non_negative, parse_percentage, read_csv};
use crate::record::YearRecord;
use crate::units::Money;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const YEAR_RECORDS_FILE_NAME: &str = "year_records.csv";

/// A row of the year records CSV file, as entered by the user
#[derive(PartialEq, Debug, Deserialize, Clone, Default)]
struct YearRecordRaw {
    year: u32,
    #[serde(default)]
    staff_count: String,
    #[serde(default)]
    average_annual_cost: String,
    #[serde(default)]
    rd_share: String,
    #[serde(default)]
    personnel_override: String,
    #[serde(default)]
    external_cost: String,
    #[serde(default)]
    depreciation_cost: String,
}

impl YearRecordRaw {
    /// Convert to a [`YearRecord`], coercing invalid values
    fn sanitise(&self) -> YearRecord {
        let year = self.year;
        let override_raw = self.personnel_override.trim();
        let personnel_override = (!override_raw.is_empty()).then(|| {
            Money(parse_non_negative(
                "personnel_override",
                year,
                override_raw,
            ))
        });

        YearRecord {
            staff_count: parse_count("staff_count", year, &self.staff_count),
            average_annual_cost: Money(parse_non_negative(
                "average_annual_cost",
                year,
                &self.average_annual_cost,
            )),
            rd_share: parse_percentage("rd_share", year, &self.rd_share),
            personnel_override,
            external_cost: Money(parse_non_negative(
                "external_cost",
                year,
                &self.external_cost,
            )),
            depreciation_cost: Money(parse_non_negative(
                "depreciation_cost",
                year,
                &self.depreciation_cost,
            )),
        }
    }
}

/// Read the cost figures for each year from the year records CSV file.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario configuration files
///
/// # Returns
///
/// Pairs of year and sanitised cost figures, in the order they appear in the file. Years have not
/// yet been checked against the permitted range.
pub fn read_year_records(scenario_dir: &Path) -> Result<Vec<(u32, YearRecord)>> {
    let file_path = scenario_dir.join(YEAR_RECORDS_FILE_NAME);
    let records = read_csv::<YearRecordRaw>(&file_path).with_context(|| input_err_msg(&file_path))?;

    Ok(records.map(|raw| (raw.year, raw.sanitise())).collect())
}
