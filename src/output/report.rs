//! Plain-text summary report of a calculation run.
use crate::aggregate::PortfolioResult;
use crate::enquiry::Answers;
use crate::rates::{CategoryRates, CompanySize};
use crate::units::{Dimensionless, Money};
use anyhow::Result;
use chrono::NaiveDate;
use itertools::Itertools;
use std::fmt;
use std::fs;
use std::path::Path;

/// The output file name for the report
const REPORT_FILE_NAME: &str = "report.txt";

/// Width of the label column
const LABEL_WIDTH: usize = 24;

const DISCLAIMER: &str = "This is a non-binding estimate based on the figures provided. \
Whether costs are eligible and the final amount of the subsidy are decided by the responsible \
tax office. It does not constitute tax advice.";

/// Format a monetary amount rounded to whole euros, e.g. `1.234.567 €`.
///
/// Negative and non-finite amounts are shown as zero.
pub fn format_money(amount: Money) -> String {
    let rounded = amount.value().round().max(0.0);
    let digits = if rounded.is_finite() {
        (rounded as u64).to_string()
    } else {
        "0".to_string()
    };

    // Group digits in threes from the right
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out.push_str(" €");

    out
}

/// Format a rate as a percentage with no trailing zeros, e.g. `24.5%`
fn format_rate(rate: Dimensionless) -> String {
    let percent = format!("{:.2}", rate.value() * 100.0);
    let percent = percent.trim_end_matches('0').trim_end_matches('.');
    format!("{percent}%")
}

/// Everything shown in the report
pub struct Report<'a> {
    /// The date the report was created
    pub date: NaiveDate,
    /// The company size classification
    pub company_size: CompanySize,
    /// The rates applied for this company size
    pub rates: &'a CategoryRates,
    /// Results for the selected years
    pub result: &'a PortfolioResult,
    /// Answers to the eligibility questions
    pub answers: &'a Answers,
}

impl Report<'_> {
    /// The years covered, e.g. `2024, 2025`
    fn years(&self) -> String {
        self.result.years().join(", ")
    }

    /// Write the report to `report.txt` in the output folder
    pub fn write(&self, output_path: &Path) -> Result<()> {
        fs::write(output_path.join(REPORT_FILE_NAME), self.to_string())?;
        Ok(())
    }
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(title.chars().count()))
}

fn line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "{:<LABEL_WIDTH$}{value}", format!("{label}:"))
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R&D tax subsidy estimate")?;
        writeln!(f, "Created: {}", self.date.format("%d.%m.%Y"))?;
        writeln!(f)?;

        let totals = &self.result.totals;
        heading(f, "Summary")?;
        line(f, "Company size", self.company_size.label())?;
        line(
            f,
            "Rates",
            &format!(
                "P {} / E {}",
                format_rate(self.rates.personnel_rate),
                format_rate(self.rates.external_rate)
            ),
        )?;
        line(f, "Years", &self.years())?;
        line(f, "Total base", &format_money(totals.total_base))?;
        line(f, "Estimated grant", &format_money(totals.total_grant))?;

        if self.answers.any() {
            writeln!(f)?;
            heading(f, "Eligibility questions")?;
            for (_, question, answer) in self.answers.iter_answered() {
                writeln!(f, "{question}: {answer}")?;
            }
            if !self.answers.notes().is_empty() {
                writeln!(f, "Notes: {}", self.answers.notes())?;
            }
        }

        writeln!(f)?;
        heading(f, "Details per year")?;
        for year in &self.result.per_year {
            writeln!(f, "{}", year.year)?;
            line(f, "  Personnel", &format_money(year.personnel_base))?;
            line(f, "  External", &format_money(year.external_base))?;
            line(f, "  Depreciation", &format_money(year.depreciation_base))?;
            line(f, "  Overhead", &format_money(year.overhead_base))?;
            line(f, "  Total base", &format_money(year.total_base))?;
            line(f, "  Grant", &format_money(year.grant))?;
        }

        writeln!(f)?;
        writeln!(f, "{DISCLAIMER}")
    }
}
