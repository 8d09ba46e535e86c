//! Named relative date windows used to filter the displayed series.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeToken {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "9m")]
    NineMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "all")]
    All,
}

pub const RANGE_TOKENS: &[&str] = &["7d", "1m", "3m", "6m", "9m", "1y", "all"];

impl RangeToken {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::NineMonths => "9m",
            Self::OneYear => "1y",
            Self::All => "all",
        }
    }

    /// Resolve against the local calendar date at the moment of the call.
    ///
    /// Never cache the result across calls: "today" moves.
    #[must_use]
    pub fn resolve(self) -> DateWindow {
        self.resolve_at(Local::now().date_naive())
    }

    /// Resolve against a caller-supplied "today".
    ///
    /// Month and year offsets clamp to the last valid day of the target month, so
    /// 31 March minus one month is the last day of February.
    #[must_use]
    pub fn resolve_at(self, today: NaiveDate) -> DateWindow {
        let start = match self {
            Self::All => return DateWindow::Unbounded,
            Self::SevenDays => today.checked_sub_days(Days::new(7)),
            Self::OneMonth => today.checked_sub_months(Months::new(1)),
            Self::ThreeMonths => today.checked_sub_months(Months::new(3)),
            Self::SixMonths => today.checked_sub_months(Months::new(6)),
            Self::NineMonths => today.checked_sub_months(Months::new(9)),
            Self::OneYear => today.checked_sub_months(Months::new(12)),
        };
        DateWindow::Bounded {
            // Only fails near NaiveDate::MIN; fall back to the earliest representable day.
            start: start.unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeToken {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "7d" => Ok(Self::SevenDays),
            "1m" => Ok(Self::OneMonth),
            "3m" => Ok(Self::ThreeMonths),
            "6m" => Ok(Self::SixMonths),
            "9m" => Ok(Self::NineMonths),
            "1y" => Ok(Self::OneYear),
            "all" => Ok(Self::All),
            _ => bail!(
                "Invalid range '{s}'. Must be one of: {}",
                RANGE_TOKENS.join(", ")
            ),
        }
    }
}

/// A resolved `[start, end]` window (inclusive), or no bounds at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Unbounded,
    Bounded { start: NaiveDate, end: NaiveDate },
}

impl DateWindow {
    #[must_use]
    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Unbounded => None,
            Self::Bounded { start, .. } => Some(*start),
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            Self::Unbounded => None,
            Self::Bounded { end, .. } => Some(*end),
        }
    }

    /// `start_date`/`end_date` as `yyyy-MM-dd`, or empty strings when unbounded.
    #[must_use]
    pub fn as_query_strings(&self) -> (String, String) {
        let text = |date: Option<NaiveDate>| {
            date.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
        };
        (text(self.start()), text(self.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_seven_days() {
        let w = RangeToken::SevenDays.resolve_at(d(2024, 3, 15));
        assert_eq!(
            w,
            DateWindow::Bounded {
                start: d(2024, 3, 8),
                end: d(2024, 3, 15)
            }
        );
        assert_eq!(
            w.as_query_strings(),
            ("2024-03-08".to_string(), "2024-03-15".to_string())
        );
    }

    #[test]
    fn test_all_is_unbounded() {
        let w = RangeToken::All.resolve_at(d(2024, 3, 15));
        assert_eq!(w, DateWindow::Unbounded);
        assert!(w.start().is_none());
        assert!(w.end().is_none());
        assert_eq!(w.as_query_strings(), (String::new(), String::new()));
    }

    #[test]
    fn test_months_same_day() {
        let today = d(2024, 3, 15);
        assert_eq!(RangeToken::OneMonth.resolve_at(today).start(), Some(d(2024, 2, 15)));
        assert_eq!(RangeToken::ThreeMonths.resolve_at(today).start(), Some(d(2023, 12, 15)));
        assert_eq!(RangeToken::SixMonths.resolve_at(today).start(), Some(d(2023, 9, 15)));
        assert_eq!(RangeToken::NineMonths.resolve_at(today).start(), Some(d(2023, 6, 15)));
        assert_eq!(RangeToken::OneYear.resolve_at(today).start(), Some(d(2023, 3, 15)));
    }

    #[test]
    fn test_month_end_clamps() {
        assert_eq!(
            RangeToken::OneMonth.resolve_at(d(2024, 3, 31)).start(),
            Some(d(2024, 2, 29))
        );
        assert_eq!(
            RangeToken::OneMonth.resolve_at(d(2023, 3, 31)).start(),
            Some(d(2023, 2, 28))
        );
        assert_eq!(
            RangeToken::OneYear.resolve_at(d(2024, 2, 29)).start(),
            Some(d(2023, 2, 28))
        );
    }

    #[test]
    fn test_end_is_today() {
        let today = d(2024, 1, 1);
        for token in [
            RangeToken::SevenDays,
            RangeToken::OneMonth,
            RangeToken::OneYear,
        ] {
            assert_eq!(token.resolve_at(today).end(), Some(today));
        }
    }

    #[test]
    fn test_resolve_uses_current_date() {
        let today = Local::now().date_naive();
        assert_eq!(RangeToken::SevenDays.resolve().end(), Some(today));
    }

    #[test]
    fn test_parse_tokens() {
        for token in RANGE_TOKENS {
            let parsed: RangeToken = token.parse().unwrap();
            assert_eq!(parsed.as_str(), *token);
        }
        assert!("2w".parse::<RangeToken>().is_err());
    }
}
