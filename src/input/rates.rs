//! Code for reading the optional rates CSV file.
use super::{deserialise_proportion, input_err_msg, read_csv_optional};
use crate::rates::{CategoryRates, CompanySize, RateTable};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use std::path::Path;

const RATES_FILE_NAME: &str = "rates.csv";

/// A row of the rates CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct RatesRaw {
    company_size: CompanySize,
    #[serde(deserialize_with = "deserialise_proportion")]
    personnel_rate: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    external_rate: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    depreciation_rate: f64,
}

/// Read the subsidy rates from the rates CSV file.
///
/// If the file is not present, the default rates are used.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario configuration files
pub fn read_rate_table(scenario_dir: &Path) -> Result<RateTable> {
    let file_path = scenario_dir.join(RATES_FILE_NAME);
    let Some(iter) = read_csv_optional::<RatesRaw>(&file_path)? else {
        info!("No rates file provided; using default rates");
        return Ok(RateTable::default());
    };

    read_rate_table_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_rate_table_from_iter<I>(iter: I) -> Result<RateTable>
where
    I: Iterator<Item = RatesRaw>,
{
    let mut map = IndexMap::new();
    for raw in iter {
        let rates = CategoryRates::new(raw.personnel_rate, raw.external_rate, raw.depreciation_rate);
        ensure!(
            map.insert(raw.company_size, rates).is_none(),
            "Rates for company size {} defined more than once",
            raw.company_size.code()
        );
    }

    RateTable::new(map)
}
