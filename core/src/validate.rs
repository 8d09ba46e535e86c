//! Parse-validate-commit pipeline for weight and goal input.
//!
//! Forms keep the raw text the user typed. Numbers are only parsed at submit time, and
//! only a fully validated canonical pounds value ever leaves this module.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::NewWeightEntry;
use crate::units::{pounds_to_stones, stones_to_pounds};

/// A user-correctable input problem, tied to the field it should be shown next to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Stones must be a positive number")]
    Stones,
    #[error("Pounds must be between 0 and 13.99")]
    Pounds,
    #[error("Date is required")]
    DateRequired,
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Date cannot be in the future")]
    FutureDate,
}

impl ValidationError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Stones => "stones",
            Self::Pounds => "pounds",
            Self::DateRequired | Self::InvalidDate(_) | Self::FutureDate => "date",
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_stones(raw: &str) -> Result<f64, ValidationError> {
    match parse_number(raw) {
        Some(v) if v >= 0.0 => Ok(v),
        _ => Err(ValidationError::Stones),
    }
}

pub fn parse_pounds(raw: &str) -> Result<f64, ValidationError> {
    match parse_number(raw) {
        Some(v) if (0.0..14.0).contains(&v) => Ok(v),
        _ => Err(ValidationError::Pounds),
    }
}

/// Stones first, then pounds; the first failure wins.
pub fn validate_stones_and_pounds(stones: &str, pounds: &str) -> Result<f64, ValidationError> {
    let stones = parse_stones(stones)?;
    let pounds = parse_pounds(pounds)?;
    Ok(stones_to_pounds(stones, pounds))
}

pub fn parse_entry_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::DateRequired);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
    if date > today {
        return Err(ValidationError::FutureDate);
    }
    Ok(date)
}

/// Raw add entry form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightForm {
    pub date: String,
    pub stones: String,
    pub pounds: String,
}

impl WeightForm {
    pub fn submit(&self, today: NaiveDate) -> Result<NewWeightEntry, ValidationError> {
        let pounds = validate_stones_and_pounds(&self.stones, &self.pounds)?;
        let date = parse_entry_date(&self.date, today)?;
        Ok(NewWeightEntry { date, pounds })
    }
}

/// Changes to an existing entry. A field left as `None` keeps the stored value exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightEdit {
    pub date: Option<String>,
    pub stones: Option<String>,
    pub pounds: Option<String>,
}

impl WeightEdit {
    /// Apply the changes to a stored `date` and `pounds`. When only one of stones and
    /// pounds is given, the other comes from the stored value without rounding.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(
        &self,
        date: NaiveDate,
        pounds: f64,
        today: NaiveDate,
    ) -> Result<NewWeightEntry, ValidationError> {
        let pounds = match (self.stones.as_deref(), self.pounds.as_deref()) {
            (None, None) => pounds,
            (stones, lbs) => {
                let current = pounds_to_stones(pounds);
                let stones = stones.map_or(Ok(current.stones as f64), parse_stones)?;
                let lbs = lbs.map_or(Ok(current.pounds), parse_pounds)?;
                stones_to_pounds(stones, lbs)
            }
        };
        let date = match self.date.as_deref() {
            Some(raw) => parse_entry_date(raw, today)?,
            None => date,
        };
        Ok(NewWeightEntry { date, pounds })
    }
}

/// Raw goal form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalForm {
    pub stones: String,
    pub pounds: String,
}

impl GoalForm {
    pub fn submit(&self) -> Result<f64, ValidationError> {
        validate_stones_and_pounds(&self.stones, &self.pounds)
    }
}
