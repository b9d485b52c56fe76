//! Calculation of the German R&D tax subsidy (Forschungszulage) over several fiscal years.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod calculation;
pub mod cli;
pub mod enquiry;
pub mod input;
pub mod lead;
pub mod log;
pub mod output;
pub mod policy;
pub mod portfolio;
pub mod rates;
pub mod record;
pub mod scenario;
pub mod settings;
pub mod units;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get the config dir for the program
pub fn get_rd_grant_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform: use the working directory instead
        return PathBuf::new();
    };
    config_dir.push("rd-grant");

    config_dir
}
