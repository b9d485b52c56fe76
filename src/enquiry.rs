//! Contact details and answers to the eligibility questionnaire.
//!
//! These are passed through to the report and the lead record unchanged; they play no part in
//! the calculation.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const ENQUIRY_FILE_NAME: &str = "enquiry.toml";

/// How to get in touch with the enquirer
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ContactDetails {
    /// Email address (required)
    pub email: String,
    /// Name of the contact person
    #[serde(default)]
    pub name: String,
    /// Company name
    #[serde(default)]
    pub company: String,
}

impl ContactDetails {
    /// Check that the contact details are usable
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        ensure!(
            !email.is_empty() && email.contains('@'),
            "Please provide a valid email address"
        );

        Ok(())
    }
}

/// Free-text answers to the eligibility questions. Any of them may be left blank.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Answers {
    /// Did the project start after 1 January 2020?
    pub project_started_after_2020: String,
    /// Is the company liable to tax in Germany?
    pub taxable_in_germany: String,
    /// Is there a project plan with milestones?
    pub has_milestones: String,
    /// Does the project go beyond the state of the art?
    pub novel_approach: String,
    /// Is the technical outcome open?
    pub technical_risk: String,
    /// Is there technical uncertainty?
    pub technical_uncertainty: String,
    /// Any other notes for the advisor
    pub notes: String,
}

impl Answers {
    /// The answered questions, as pairs of form key, question text and answer
    pub fn iter_answered(&self) -> impl Iterator<Item = (&'static str, &'static str, &str)> {
        self.iter_all()
            .filter(|(_, _, answer)| !answer.is_empty())
    }

    /// All questions, as pairs of form key, question text and (trimmed) answer
    pub fn iter_all(&self) -> impl Iterator<Item = (&'static str, &'static str, &str)> {
        [
            (
                "project_started_after_2020",
                "Project started after 1 January 2020",
                &self.project_started_after_2020,
            ),
            (
                "taxable_in_germany",
                "Liable to tax in Germany",
                &self.taxable_in_germany,
            ),
            (
                "has_milestones",
                "Project plan with milestones",
                &self.has_milestones,
            ),
            (
                "novel_approach",
                "Beyond the state of the art",
                &self.novel_approach,
            ),
            (
                "technical_risk",
                "Technical outcome open",
                &self.technical_risk,
            ),
            (
                "technical_uncertainty",
                "Technical uncertainty present",
                &self.technical_uncertainty,
            ),
        ]
        .into_iter()
        .map(|(key, question, answer)| (key, question, answer.trim()))
    }

    /// The notes, trimmed
    pub fn notes(&self) -> &str {
        self.notes.trim()
    }

    /// Whether any question has been answered or any notes given
    pub fn any(&self) -> bool {
        self.iter_answered().next().is_some() || !self.notes().is_empty()
    }
}

/// The contents of the enquiry file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Enquiry {
    /// Contact details, if the user wants to be contacted
    pub contact: Option<ContactDetails>,
    /// Answers to the eligibility questions
    #[serde(default)]
    pub answers: Answers,
}

impl Enquiry {
    /// Read the enquiry file from the scenario directory.
    ///
    /// If the file is not present, an empty enquiry is returned.
    pub fn from_path(scenario_dir: &Path) -> Result<Self> {
        let file_path = scenario_dir.join(ENQUIRY_FILE_NAME);
        if !file_path.is_file() {
            return Ok(Self::default());
        }

        let enquiry: Enquiry = read_toml(&file_path)?;
        if let Some(contact) = &enquiry.contact {
            contact
                .validate()
                .with_context(|| input_err_msg(&file_path))?;
        }

        Ok(enquiry)
    }
}
