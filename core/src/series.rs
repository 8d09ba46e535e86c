//! Projection of stored entries into display-ready chart points and table rows.
//!
//! Date filtering happens upstream in the query; this module only orders and converts.
//! Everything is recomputed from the full entry list on each unit or data change.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::WeightEntry;
use crate::units::{Unit, chart_value, pounds_to_decimal_stones, pounds_to_kg, pounds_to_stones};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub id: i64,
    pub date: NaiveDate,
    pub label: String,
    /// Kilograms for metric, decimal stones for imperial.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum TableValue {
    Imperial {
        stones: i64,
        pounds: f64,
        decimal_stones: f64,
    },
    Metric {
        kg: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: i64,
    pub date: NaiveDate,
    pub label: String,
    #[serde(flatten)]
    pub value: TableValue,
}

/// `dd MMM yyyy`, e.g. `10 Jan 2024`.
#[must_use]
pub fn display_label(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Entries in ascending date order. The sort is stable, so entries sharing a date keep
/// their input order.
#[must_use]
pub fn sorted_by_date(entries: &[WeightEntry]) -> Vec<&WeightEntry> {
    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    // NaiveDate orders the same way as its yyyy-MM-dd text.
    sorted.sort_by_key(|e| e.date);
    sorted
}

#[must_use]
pub fn chart_series(entries: &[WeightEntry], unit: Unit) -> Vec<SeriesPoint> {
    sorted_by_date(entries)
        .into_iter()
        .map(|e| SeriesPoint {
            id: e.id,
            date: e.date,
            label: display_label(e.date),
            value: chart_value(e.pounds, unit),
        })
        .collect()
}

#[must_use]
pub fn table_value(pounds: f64, unit: Unit) -> TableValue {
    match unit {
        Unit::Metric => TableValue::Metric {
            kg: pounds_to_kg(pounds),
        },
        Unit::Imperial => {
            let sp = pounds_to_stones(pounds);
            TableValue::Imperial {
                stones: sp.stones,
                pounds: sp.pounds,
                decimal_stones: pounds_to_decimal_stones(pounds),
            }
        }
    }
}

#[must_use]
pub fn table_rows(entries: &[WeightEntry], unit: Unit) -> Vec<TableRow> {
    sorted_by_date(entries)
        .into_iter()
        .map(|e| TableRow {
            id: e.id,
            date: e.date,
            label: display_label(e.date),
            value: table_value(e.pounds, unit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, date: &str, pounds: f64) -> WeightEntry {
        WeightEntry {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            pounds,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_sorts_ascending() {
        let entries = vec![entry(2, "2024-02-01", 168.0), entry(1, "2024-01-01", 170.0)];
        let points = chart_series(&entries, Unit::Metric);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date.to_string(), "2024-01-01");
        assert_eq!(points[1].date.to_string(), "2024-02-01");
    }

    #[test]
    fn test_same_day_entries_kept_in_input_order() {
        let entries = vec![
            entry(5, "2024-01-02", 171.0),
            entry(3, "2024-01-01", 170.0),
            entry(4, "2024-01-01", 169.0),
        ];
        let ids: Vec<i64> = table_rows(&entries, Unit::Imperial)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_chart_values_per_unit() {
        let entries = vec![entry(1, "2024-01-10", 14.0)];
        assert!((chart_series(&entries, Unit::Imperial)[0].value - 1.0).abs() < 1e-9);
        assert!((chart_series(&entries, Unit::Metric)[0].value - 6.350_288).abs() < 1e-9);
    }

    #[test]
    fn test_label_format() {
        let points = chart_series(&[entry(1, "2024-01-10", 170.0)], Unit::Imperial);
        assert_eq!(points[0].label, "10 Jan 2024");
    }

    #[test]
    fn test_imperial_table_row() {
        let rows = table_rows(&[entry(1, "2024-01-10", 170.0)], Unit::Imperial);
        match rows[0].value {
            TableValue::Imperial {
                stones,
                pounds,
                decimal_stones,
            } => {
                assert_eq!(stones, 12);
                assert!((pounds - 2.0).abs() < 1e-9);
                assert!((decimal_stones - 12.14).abs() < 1e-9);
            }
            TableValue::Metric { .. } => panic!("expected imperial row"),
        }
    }

    #[test]
    fn test_metric_table_row() {
        let rows = table_rows(&[entry(1, "2024-01-10", 100.0)], Unit::Metric);
        match rows[0].value {
            TableValue::Metric { kg } => assert!((kg - 45.3592).abs() < 1e-9),
            TableValue::Imperial { .. } => panic!("expected metric row"),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(chart_series(&[], Unit::Imperial).is_empty());
        assert!(table_rows(&[], Unit::Metric).is_empty());
    }

    #[test]
    fn test_table_row_json_shape() {
        let rows = table_rows(&[entry(1, "2024-01-10", 170.0)], Unit::Imperial);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["unit"], "imperial");
        assert_eq!(json["stones"], 12);
        assert_eq!(json["date"], "2024-01-10");
    }
}
