use serde::Serialize;

use crate::goal::{distance_to_goal, goal_overlay};
use crate::models::WeightEntry;
use crate::range::{DateWindow, RangeToken};
use crate::series::{SeriesPoint, TableRow, chart_series, sorted_by_date, table_rows};
use crate::units::Unit;

/// Client-held view state: the selected unit and range plus the last loaded series
/// and goal. Owned by the top-level view and passed to whatever renders it.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub unit: Unit,
    pub range: RangeToken,
    entries: Vec<WeightEntry>,
    goal: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub unit: Unit,
    pub range: RangeToken,
    pub points: Vec<SeriesPoint>,
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub unit: Unit,
    pub range: RangeToken,
    pub rows: Vec<TableRow>,
    pub goal: Option<f64>,
}

impl Dashboard {
    #[must_use]
    pub fn new(unit: Unit, range: RangeToken) -> Self {
        Self {
            unit,
            range,
            ..Self::default()
        }
    }

    /// The query window for the selected range, resolved against today on every call.
    #[must_use]
    pub fn window(&self) -> DateWindow {
        self.range.resolve()
    }

    pub fn set_entries(&mut self, entries: Vec<WeightEntry>) {
        self.entries = entries;
    }

    pub fn set_goal(&mut self, goal: Option<f64>) {
        self.goal = goal;
    }

    /// Drop loaded data, e.g. after a failed fetch, leaving an empty view.
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn goal(&self) -> Option<f64> {
        self.goal
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn chart(&self) -> ChartView {
        ChartView {
            unit: self.unit,
            range: self.range,
            points: chart_series(&self.entries, self.unit),
            goal: goal_overlay(self.goal, self.unit),
        }
    }

    #[must_use]
    pub fn table(&self) -> TableView {
        TableView {
            unit: self.unit,
            range: self.range,
            rows: table_rows(&self.entries, self.unit),
            goal: goal_overlay(self.goal, self.unit),
        }
    }

    /// Most recent entry by date; among same-day entries the last one loaded wins.
    #[must_use]
    pub fn latest(&self) -> Option<&WeightEntry> {
        sorted_by_date(&self.entries).last().copied()
    }

    /// Distance from the latest entry to the goal, in display units.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        let latest = self.latest()?;
        distance_to_goal(self.goal, latest.pounds, self.unit)
    }
}
