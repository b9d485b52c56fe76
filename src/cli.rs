//! The command line interface for the calculator.
use crate::aggregate::PortfolioResult;
use crate::lead::{FormFileChannel, LeadChannel, LeadRecord};
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::report::Report;
use crate::output::{DataWriter, create_output_directory, get_output_dir};
use crate::rates::CompanySize;
use crate::scenario::Scenario;
use crate::settings::Settings;
use crate::year::{current_year, parse_year_str};
use ::log::{info, warn};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the calculator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Years to include, separated by semicolons (e.g. "2024;2025"), or "all"
    #[arg(long)]
    pub years: Option<String>,
    /// Use the rates for this company size instead of the one in the scenario
    #[arg(long, value_enum)]
    pub company_size: Option<CompanySize>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate the subsidy for a scenario.
    Run {
        /// Path to the scenario directory.
        scenario_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example scenarios.
    Example {
        /// The available subcommands for managing example scenarios.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a scenario.
    Validate {
        /// The path to the scenario directory.
        scenario_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { scenario_dir, opts } => handle_run_command(&scenario_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { scenario_dir } => handle_validate_command(&scenario_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ rd-grant --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(
    scenario_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(scenario_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(settings.log_level.as_str()), Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let scenario =
        Scenario::from_path(scenario_path, current_year()).context("Failed to load scenario.")?;
    info!("Loaded scenario from {}", scenario_path.display());
    info!("Output folder: {}", output_path.display());

    let result = run_calculation(scenario, scenario_path, output_path, opts)?;
    info!(
        "Calculation complete! Estimated grant for {}: {}",
        result.years().join(", "),
        result.totals.total_grant
    );

    Ok(())
}

/// Calculate results for a loaded scenario and write them to the output folder.
///
/// The output folder must already exist.
fn run_calculation(
    mut scenario: Scenario,
    scenario_path: &Path,
    output_path: &Path,
    opts: &RunOpts,
) -> Result<PortfolioResult> {
    if let Some(size) = opts.company_size {
        info!("Using rates for company size {size}");
        scenario.portfolio.set_company_size(size);
    }

    let portfolio = &scenario.portfolio;
    let years = match opts.years.as_deref() {
        Some(years) => parse_year_str(years, portfolio.years().collect_vec())
            .context("Invalid value for --years")?,
        None => portfolio.years().collect(),
    };
    let result = portfolio.compute_selected(&years, &scenario.rates, &scenario.policy)?;

    let company_size = portfolio.company_size();
    let mut writer = DataWriter::create(output_path)?;
    writer.write_results(company_size, &result)?;
    writer.flush()?;

    Report {
        date: Local::now().date_naive(),
        company_size,
        rates: scenario.rates.rates_for(company_size),
        result: &result,
        answers: &scenario.enquiry.answers,
    }
    .write(output_path)?;
    write_metadata(output_path, scenario_path, company_size, &years)?;

    if let Some(contact) = &scenario.enquiry.contact {
        let lead = LeadRecord::new(contact, company_size, &result, &scenario.enquiry.answers);
        submit_lead(&mut FormFileChannel::new(output_path), &lead);
    }

    Ok(result)
}

/// Submit a lead, logging a warning if it could not be delivered
fn submit_lead<C: LeadChannel>(channel: &mut C, lead: &LeadRecord) {
    if let Err(err) = channel.submit(lead) {
        warn!("Could not submit enquiry; please try again later: {err:#}");
    }
}

/// Handle the `validate` command.
pub fn handle_validate_command(scenario_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    // Load/validate the scenario
    Scenario::from_path(scenario_path, current_year()).context("Failed to validate scenario.")?;
    info!("Scenario validation successful!");

    Ok(())
}
