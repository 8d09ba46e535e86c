use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored measurement. `pounds` is the single source of truth for the weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub pounds: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated values ready to be written as a new entry or to replace an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeightEntry {
    pub date: NaiveDate,
    pub pounds: f64,
}

/// Wire body for `POST /weights` and `PUT /weights/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightInput {
    pub date: String,
    pub pounds: f64,
}

impl From<&NewWeightEntry> for WeightInput {
    fn from(entry: &NewWeightEntry) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            pounds: entry.pounds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsResponse {
    pub weights: Vec<WeightEntry>,
}

/// The goal singleton. `pounds: None` means no goal is set, which is distinct from a
/// goal of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub pounds: Option<f64>,
    pub updated_at: Option<String>,
}

/// Wire body for `PUT /goal`. A missing or null `pounds` clears the goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalInput {
    #[serde(default)]
    pub pounds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn parse_iso_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{date}'. Use YYYY-MM-DD"))
}

/// Validate a canonical pounds value arriving at the storage boundary.
pub fn validate_pounds(pounds: f64) -> Result<()> {
    if !pounds.is_finite() {
        bail!("pounds must be a number");
    }
    if pounds < 0.0 {
        bail!("pounds must not be negative");
    }
    Ok(())
}

/// Validate a wire weight body: ISO date not after `today`, finite non-negative pounds.
pub fn validate_weight_input(input: &WeightInput, today: NaiveDate) -> Result<NewWeightEntry> {
    let date = parse_iso_date(&input.date)?;
    if date > today {
        bail!("Date '{}' is in the future", input.date);
    }
    validate_pounds(input.pounds)?;
    Ok(NewWeightEntry {
        date,
        pounds: input.pounds,
    })
}

pub fn validate_goal_input(input: &GoalInput) -> Result<Option<f64>> {
    if let Some(pounds) = input.pounds {
        validate_pounds(pounds)?;
    }
    Ok(input.pounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_validate_weight_input_valid() {
        let input = WeightInput {
            date: "2024-01-10".to_string(),
            pounds: 170.0,
        };
        let entry = validate_weight_input(&input, today()).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(entry.pounds, 170.0);
    }

    #[test]
    fn test_validate_weight_input_today_allowed() {
        let input = WeightInput {
            date: "2024-03-15".to_string(),
            pounds: 0.0,
        };
        assert!(validate_weight_input(&input, today()).is_ok());
    }

    #[test]
    fn test_validate_weight_input_future_date() {
        let input = WeightInput {
            date: "2024-03-16".to_string(),
            pounds: 170.0,
        };
        assert!(validate_weight_input(&input, today()).is_err());
    }

    #[test]
    fn test_validate_weight_input_bad_date() {
        let input = WeightInput {
            date: "15/03/2024".to_string(),
            pounds: 170.0,
        };
        let err = validate_weight_input(&input, today()).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_validate_weight_input_negative_pounds() {
        let input = WeightInput {
            date: "2024-01-10".to_string(),
            pounds: -1.0,
        };
        assert!(validate_weight_input(&input, today()).is_err());
    }

    #[test]
    fn test_validate_weight_input_nan_pounds() {
        let input = WeightInput {
            date: "2024-01-10".to_string(),
            pounds: f64::NAN,
        };
        assert!(validate_weight_input(&input, today()).is_err());
    }

    #[test]
    fn test_validate_goal_input() {
        assert_eq!(validate_goal_input(&GoalInput { pounds: None }).unwrap(), None);
        assert_eq!(
            validate_goal_input(&GoalInput { pounds: Some(0.0) }).unwrap(),
            Some(0.0)
        );
        assert!(validate_goal_input(&GoalInput { pounds: Some(-3.0) }).is_err());
    }

    #[test]
    fn test_goal_input_null_and_missing_both_clear() {
        let null: GoalInput = serde_json::from_str(r#"{"pounds":null}"#).unwrap();
        assert!(null.pounds.is_none());
        let missing: GoalInput = serde_json::from_str("{}").unwrap();
        assert!(missing.pounds.is_none());
        let zero: GoalInput = serde_json::from_str(r#"{"pounds":0}"#).unwrap();
        assert_eq!(zero.pounds, Some(0.0));
    }

    #[test]
    fn test_weight_entry_wire_format() {
        let entry = WeightEntry {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            pounds: 170.0,
            created_at: "2024-01-10T08:00:00Z".to_string(),
            updated_at: "2024-01-10T08:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-01-10");
        assert_eq!(json["pounds"], 170.0);
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn test_weight_input_from_new_entry() {
        let entry = NewWeightEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            pounds: 173.5,
        };
        let input = WeightInput::from(&entry);
        assert_eq!(input.date, "2024-01-10");
        assert_eq!(input.pounds, 173.5);
    }
}
