//! Goal overlay: the optional goal weight projected into the series' unit.

use crate::models::Goal;
use crate::units::{Unit, chart_value};

/// The goal in the same scale as [`crate::series::SeriesPoint::value`], or `None` when
/// no goal is set. A goal of zero is a real goal and yields `Some(0.0)`.
#[must_use]
pub fn goal_overlay(goal_pounds: Option<f64>, unit: Unit) -> Option<f64> {
    goal_pounds.map(|p| chart_value(p, unit))
}

/// Signed distance from `current_pounds` to the goal, in display units
/// (positive means above goal).
#[must_use]
pub fn distance_to_goal(goal_pounds: Option<f64>, current_pounds: f64, unit: Unit) -> Option<f64> {
    goal_overlay(goal_pounds, unit).map(|g| chart_value(current_pounds, unit) - g)
}

impl Goal {
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.pounds.is_some()
    }

    #[must_use]
    pub fn overlay(&self, unit: Unit) -> Option<f64> {
        goal_overlay(self.pounds, unit)
    }
}
