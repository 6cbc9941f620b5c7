use std::env;

use thiserror::Error;

/// Read-only knobs for result aggregation, passed explicitly into services.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsSettings {
    grade_percentage: f64,
    contribution_percentage: f64,
    results_warning_percentage: f64,
    min_answer_count: u32,
    min_answer_percentage: f64,
    institution_email_domains: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ResultsSettingsDraft {
    pub grade_percentage: Option<f64>,
    pub contribution_percentage: Option<f64>,
    pub results_warning_percentage: Option<f64>,
    pub min_answer_count: Option<u32>,
    pub min_answer_percentage: Option<f64>,
    pub institution_email_domains: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("{field} must be within [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

pub const DEFAULT_GRADE_PERCENTAGE: f64 = 0.8;
pub const DEFAULT_CONTRIBUTION_PERCENTAGE: f64 = 0.5;
pub const DEFAULT_RESULTS_WARNING_PERCENTAGE: f64 = 0.333;
pub const DEFAULT_MIN_ANSWER_COUNT: u32 = 2;
pub const DEFAULT_MIN_ANSWER_PERCENTAGE: f64 = 0.2;

impl ResultsSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a draft from `RESULTS_*` environment variables. Unset variables stay `None`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidNumber` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Self::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidNumber` if a value is present but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let domains = lookup("RESULTS_INSTITUTION_EMAIL_DOMAINS")
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            grade_percentage: parse_var(&lookup, "RESULTS_GRADE_PERCENTAGE")?,
            contribution_percentage: parse_var(&lookup, "RESULTS_CONTRIBUTION_PERCENTAGE")?,
            results_warning_percentage: parse_var(&lookup, "RESULTS_WARNING_PERCENTAGE")?,
            min_answer_count: parse_var(&lookup, "RESULTS_MIN_ANSWER_COUNT")?,
            min_answer_percentage: parse_var(&lookup, "RESULTS_MIN_ANSWER_PERCENTAGE")?,
            institution_email_domains: domains,
        })
    }

    /// Validate fractions, fill defaults and normalize e-mail domains.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::FractionOutOfRange` if any percentage is outside [0, 1].
    pub fn validate(self) -> Result<ResultsSettings, SettingsError> {
        let grade_percentage = fraction(
            "grade_percentage",
            self.grade_percentage.unwrap_or(DEFAULT_GRADE_PERCENTAGE),
        )?;
        let contribution_percentage = fraction(
            "contribution_percentage",
            self.contribution_percentage
                .unwrap_or(DEFAULT_CONTRIBUTION_PERCENTAGE),
        )?;
        let results_warning_percentage = fraction(
            "results_warning_percentage",
            self.results_warning_percentage
                .unwrap_or(DEFAULT_RESULTS_WARNING_PERCENTAGE),
        )?;
        let min_answer_percentage = fraction(
            "min_answer_percentage",
            self.min_answer_percentage
                .unwrap_or(DEFAULT_MIN_ANSWER_PERCENTAGE),
        )?;

        let mut institution_email_domains: Vec<String> = Vec::new();
        for domain in self
            .institution_email_domains
            .into_iter()
            .filter_map(normalize_domain)
        {
            if !institution_email_domains.contains(&domain) {
                institution_email_domains.push(domain);
            }
        }

        Ok(ResultsSettings {
            grade_percentage,
            contribution_percentage,
            results_warning_percentage,
            min_answer_count: self.min_answer_count.unwrap_or(DEFAULT_MIN_ANSWER_COUNT),
            min_answer_percentage,
            institution_email_domains,
        })
    }
}

impl ResultsSettings {
    /// Weight of grade answers against Likert answers in combined scores.
    #[must_use]
    pub fn grade_percentage(&self) -> f64 {
        self.grade_percentage
    }

    /// Weight of contributor sections against general sections in the final grade.
    #[must_use]
    pub fn contribution_percentage(&self) -> f64 {
        self.contribution_percentage
    }

    /// Fraction of the peer median below which an answer count raises a warning.
    #[must_use]
    pub fn results_warning_percentage(&self) -> f64 {
        self.results_warning_percentage
    }

    #[must_use]
    pub fn min_answer_count(&self) -> u32 {
        self.min_answer_count
    }

    #[must_use]
    pub fn min_answer_percentage(&self) -> f64 {
        self.min_answer_percentage
    }

    #[must_use]
    pub fn institution_email_domains(&self) -> &[String] {
        &self.institution_email_domains
    }

    #[must_use]
    pub fn is_external_email(&self, email: &str) -> bool {
        crate::email::is_external_email(email, self.institution_email_domains.as_slice())
    }
}

impl Default for ResultsSettings {
    fn default() -> Self {
        Self {
            grade_percentage: DEFAULT_GRADE_PERCENTAGE,
            contribution_percentage: DEFAULT_CONTRIBUTION_PERCENTAGE,
            results_warning_percentage: DEFAULT_RESULTS_WARNING_PERCENTAGE,
            min_answer_count: DEFAULT_MIN_ANSWER_COUNT,
            min_answer_percentage: DEFAULT_MIN_ANSWER_PERCENTAGE,
            institution_email_domains: Vec::new(),
        }
    }
}

fn fraction(field: &'static str, value: f64) -> Result<f64, SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SettingsError::FractionOutOfRange { field, value })
    }
}

fn normalize_domain(value: String) -> Option<String> {
    let trimmed = value.trim().trim_start_matches('@').to_ascii_lowercase();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, SettingsError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| SettingsError::InvalidNumber {
            var,
            value: raw.to_string(),
        })
}
