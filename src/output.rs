//! The module responsible for writing output data to disk.
use crate::aggregate::PortfolioResult;
use crate::calculation::YearResult;
use crate::rates::CompanySize;
use crate::units::Money;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
pub mod report;

/// The root folder in which scenario-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "rd_grant_results";

/// The output file name for per-year results
const YEAR_RESULTS_FILE_NAME: &str = "year_results.csv";

/// The output file name for totals
const TOTALS_FILE_NAME: &str = "totals.csv";

/// Get the default output directory for the scenario at the specified path
pub fn get_output_dir(scenario_dir: &Path) -> Result<PathBuf> {
    // Get the scenario name from the dir path
    let scenario_dir = scenario_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to scenario")?;

    let scenario_name = scenario_dir
        .file_name()
        .context("Scenario cannot be in root folder")?
        .to_str()
        .context("Invalid chars in scenario dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, scenario_name].iter().collect())
}

/// Create a new output directory, optionally replacing an existing one.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether an existing, non-empty folder may be replaced
///
/// # Returns
///
/// Whether an existing folder was replaced.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the totals CSV file
#[derive(Serialize, Debug, PartialEq)]
struct TotalsRow {
    company_size: String,
    years: String,
    personnel_base: Money,
    external_base: Money,
    depreciation_base: Money,
    overhead_base: Money,
    total_base: Money,
    grant: Money,
}

impl TotalsRow {
    fn new(company_size: CompanySize, result: &PortfolioResult) -> Self {
        let totals = &result.totals;
        Self {
            company_size: company_size.code().to_string(),
            years: result.years().join(";"),
            personnel_base: totals.total_personnel,
            external_base: totals.total_external,
            depreciation_base: totals.total_depreciation,
            overhead_base: totals.total_overhead,
            total_base: totals.total_base,
            grant: totals.total_grant,
        }
    }
}

/// An object for writing calculation results to file
pub struct DataWriter {
    year_results_writer: csv::Writer<File>,
    totals_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            year_results_writer: new_writer(YEAR_RESULTS_FILE_NAME)?,
            totals_writer: new_writer(TOTALS_FILE_NAME)?,
        })
    }

    /// Write per-year results and totals
    pub fn write_results(
        &mut self,
        company_size: CompanySize,
        result: &PortfolioResult,
    ) -> Result<()> {
        self.write_year_results(&result.per_year)?;
        self.totals_writer
            .serialize(TotalsRow::new(company_size, result))?;

        Ok(())
    }

    /// Write per-year results to file
    fn write_year_results(&mut self, results: &[YearResult]) -> Result<()> {
        for result in results {
            self.year_results_writer.serialize(result)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.year_results_writer.flush()?;
        self.totals_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{default_policy, default_rates, portfolio};
    use crate::policy::FundingPolicy;
    use crate::portfolio::Portfolio;
    use crate::rates::RateTable;
    use std::io::{BufRead, BufReader};
    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<String> {
        let file = File::open(path).unwrap();
        BufReader::new(file).lines().map_while(Result::ok).collect()
    }

    #[rstest::rstest]
    fn test_write_results(
        mut portfolio: Portfolio,
        default_rates: RateTable,
        default_policy: FundingPolicy,
    ) {
        portfolio.add_year(2024);
        let result = portfolio.compute(&default_rates, &default_policy);

        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer
                .write_results(portfolio.company_size(), &result)
                .unwrap();
            writer.flush().unwrap();
        }

        let lines = read_lines(&dir.path().join(YEAR_RESULTS_FILE_NAME));
        assert_eq!(
            lines,
            [
                "year,personnel_base,external_base,depreciation_base,overhead_base,total_base,grant",
                "2024,30000.0,0.0,0.0,0.0,30000.0,10500.0",
                "2025,30000.0,0.0,0.0,0.0,30000.0,10500.0",
            ]
        );

        let lines = read_lines(&dir.path().join(TOTALS_FILE_NAME));
        assert_eq!(
            lines,
            [
                "company_size,years,personnel_base,external_base,depreciation_base,overhead_base,total_base,grant",
                "sme,2024;2025,60000.0,0.0,0.0,0.0,60000.0,21000.0",
            ]
        );
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");

        // Create a new directory should succeed
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");

        fs::create_dir(&output_dir).unwrap();
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");

        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("existing_file.txt"), "some contents").unwrap();

        // Fails without overwrite
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("existing_file.txt").exists());

        // Succeeds with overwrite, removing the old contents
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("existing_file.txt").exists());
    }

    #[test]
    fn test_get_output_dir() {
        let temp_dir = tempdir().unwrap();
        let scenario_dir = temp_dir.path().join("my_scenario");
        fs::create_dir(&scenario_dir).unwrap();

        let output_dir = get_output_dir(&scenario_dir).unwrap();
        assert_eq!(
            output_dir,
            PathBuf::from(OUTPUT_DIRECTORY_ROOT).join("my_scenario")
        );
    }
}
