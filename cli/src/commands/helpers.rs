use anyhow::{Context, Result, anyhow};
use chrono::{Days, NaiveDate};
use std::io::{self, BufRead, Write};

use weighin_core::units::Unit;
use weighin_core::validate::ValidationError;

/// Expand `today`/`yesterday`/`tomorrow` to `YYYY-MM-DD`; anything else is passed through
/// untouched for the validator to judge. `None` means today.
pub(crate) fn date_text(date: Option<&str>, today: NaiveDate) -> String {
    let resolved = match date.map(str::trim) {
        None | Some("today") => Some(today),
        Some("yesterday") => today.checked_sub_days(Days::new(1)),
        Some("tomorrow") => today.checked_add_days(Days::new(1)),
        Some(other) => return other.to_string(),
    };
    resolved.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

/// Attach the offending field to a validation failure.
pub(crate) fn invalid(err: &ValidationError) -> anyhow::Error {
    anyhow!("{}: {err}", err.field())
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` declines.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = match stdin.lock().lines().next() {
        Some(line) => line.context("Failed to read confirmation")?,
        None => return Ok(false),
    };
    Ok(is_yes(&line))
}

/// A value already in chart scale: decimal stones or kilograms.
pub(crate) fn format_scaled(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Imperial => format!("{:.2} st", no_neg_zero(value)),
        Unit::Metric => format!("{:.1} kg", no_neg_zero(value)),
    }
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_date_text_keywords() {
        assert_eq!(date_text(None, today()), "2024-03-15");
        assert_eq!(date_text(Some("today"), today()), "2024-03-15");
        assert_eq!(date_text(Some("yesterday"), today()), "2024-03-14");
        assert_eq!(date_text(Some("tomorrow"), today()), "2024-03-16");
    }

    #[test]
    fn test_date_text_passthrough() {
        assert_eq!(date_text(Some("2024-01-10"), today()), "2024-01-10");
        assert_eq!(date_text(Some("10/01/2024"), today()), "10/01/2024");
        assert_eq!(date_text(Some(""), today()), "");
    }

    #[test]
    fn test_invalid_names_field() {
        let err = invalid(&ValidationError::Pounds);
        assert_eq!(err.to_string(), "pounds: Pounds must be between 0 and 13.99");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES \n"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("sure"));
    }

    #[test]
    fn test_format_scaled() {
        assert_eq!(format_scaled(12.14, Unit::Imperial), "12.14 st");
        assert_eq!(format_scaled(77.11, Unit::Metric), "77.1 kg");
        assert_eq!(format_scaled(-0.0, Unit::Metric), "0.0 kg");
    }
}
