//! Enquiries passed on to an advisor, carrying a copy of the calculated results.
//!
//! A lead is only ever an output: submitting it happens after the results have been written and
//! a failed submission never changes them.
use crate::aggregate::PortfolioResult;
use crate::enquiry::{Answers, ContactDetails};
use crate::rates::CompanySize;
use crate::units::Money;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// The file name used by [`FormFileChannel`]
pub const LEAD_FILE_NAME: &str = "lead_submission.txt";

/// Sent along with every lead so the recipient knows how the figures were produced
const RULE_NOTE: &str =
    "Simplified rates and per-year cap; overhead surcharge applied from its effective year.";

/// Round to whole currency units for transmission
fn rounded(amount: Money) -> String {
    (amount.value().round() as i64).to_string()
}

/// A flat, ordered set of key/value pairs describing an enquiry
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord(IndexMap<&'static str, String>);

impl LeadRecord {
    /// Assemble a lead from the contact details, results and questionnaire answers.
    ///
    /// # Arguments
    ///
    /// * `contact` - How to get in touch with the enquirer
    /// * `company_size` - The company size the results were calculated for
    /// * `result` - The calculated results
    /// * `answers` - Answers to the eligibility questions
    pub fn new(
        contact: &ContactDetails,
        company_size: CompanySize,
        result: &PortfolioResult,
        answers: &Answers,
    ) -> Self {
        let totals = &result.totals;
        let mut fields = IndexMap::new();
        fields.insert("email", contact.email.trim().to_string());
        fields.insert("company", contact.company.trim().to_string());
        fields.insert("name", contact.name.trim().to_string());
        fields.insert("company_size", company_size.label().to_string());
        fields.insert("years", result.years().join(", "));
        fields.insert("size_code", company_size.code().to_string());
        fields.insert("base_personnel", rounded(totals.total_personnel));
        fields.insert("base_external", rounded(totals.total_external));
        fields.insert("base_depreciation", rounded(totals.total_depreciation));
        fields.insert("base_overhead", rounded(totals.total_overhead));
        fields.insert("base_total", rounded(totals.total_base));
        fields.insert("grant_total", rounded(totals.total_grant));
        for (key, _, answer) in answers.iter_all() {
            fields.insert(key, answer.to_string());
        }
        fields.insert("notes", answers.notes().to_string());
        fields.insert("rule_note", RULE_NOTE.to_string());

        Self(fields)
    }

    /// Get the value for the given key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over the key/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Encode as an `application/x-www-form-urlencoded` body
    pub fn to_form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// Somewhere leads can be sent
pub trait LeadChannel {
    /// Submit a lead. An error means the lead was not delivered and may be retried.
    fn submit(&mut self, lead: &LeadRecord) -> Result<()>;
}

/// A [`LeadChannel`] which writes the encoded form body to a file, ready to be posted
#[derive(Debug, Clone)]
pub struct FormFileChannel {
    file_path: PathBuf,
}

impl FormFileChannel {
    /// Create a channel writing to [`LEAD_FILE_NAME`] in the given folder
    pub fn new(output_path: &Path) -> Self {
        Self {
            file_path: output_path.join(LEAD_FILE_NAME),
        }
    }

    /// The file leads are written to
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl LeadChannel for FormFileChannel {
    fn submit(&mut self, lead: &LeadRecord) -> Result<()> {
        fs::write(&self.file_path, lead.to_form_body())
            .with_context(|| format!("Could not write lead to {}", self.file_path.display()))?;
        info!("Enquiry saved to {}", self.file_path.display());

        Ok(())
    }
}
