use anyhow::Result;
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use weighin_core::dashboard::{ChartView, Dashboard, TableView};
use weighin_core::range::RangeToken;
use weighin_core::series::{TableValue, display_label};
use weighin_core::units::{FormatStyle, Unit, format_weight};
use weighin_core::validate::{WeightEdit, WeightForm};

use super::helpers::{confirm, date_text, format_scaled, invalid};
use super::load_dashboard;
use crate::api::ApiClient;

const BAR_WIDTH: u32 = 40;

pub(crate) async fn cmd_add(
    api: &ApiClient,
    stones: String,
    pounds: String,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let form = WeightForm {
        date: date_text(date, today),
        stones,
        pounds,
    };
    let entry = form.submit(today).map_err(|e| invalid(&e))?;

    let created = api.create_weight(&entry).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!(
            "Logged {} for {} (entry {})",
            format_weight(created.pounds, Unit::Imperial, FormatStyle::Long),
            created.date.format("%Y-%m-%d"),
            created.id
        );
    }

    Ok(())
}

pub(crate) async fn cmd_edit(
    api: &ApiClient,
    id: i64,
    stones: Option<String>,
    pounds: Option<String>,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let existing = api.get_weight(id).await?;
    let today = Local::now().date_naive();

    let edit = WeightEdit {
        date: date.map(|d| date_text(Some(d), today)),
        stones,
        pounds,
    };
    let entry = edit
        .apply(existing.date, existing.pounds, today)
        .map_err(|e| invalid(&e))?;

    let updated = api.update_weight(id, &entry).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!(
            "Updated entry {}: {} on {}",
            updated.id,
            format_weight(updated.pounds, Unit::Imperial, FormatStyle::Long),
            updated.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) async fn cmd_delete(api: &ApiClient, id: i64, yes: bool, json: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to delete this entry?")? {
        eprintln!("Cancelled");
        return Ok(());
    }

    api.delete_weight(id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted weight entry {id}");
    }

    Ok(())
}

pub(crate) async fn cmd_show(api: &ApiClient, id: i64, unit: Unit, json: bool) -> Result<()> {
    let entry = api.get_weight(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "{}: {}",
            display_label(entry.date),
            format_weight(entry.pounds, unit, FormatStyle::Long)
        );
    }

    Ok(())
}

pub(crate) async fn cmd_list(
    api: &ApiClient,
    unit: Unit,
    range: RangeToken,
    json: bool,
) -> Result<()> {
    let dashboard = load_dashboard(api, unit, range).await;
    let view = dashboard.table();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.rows.is_empty() {
        eprintln!("No weight entries in range {range}. Use `weighin add` to record your weight.");
    } else {
        println!("{}", render_table(&view));
    }
    print_goal_line(&dashboard);

    Ok(())
}

pub(crate) async fn cmd_chart(
    api: &ApiClient,
    unit: Unit,
    range: RangeToken,
    json: bool,
) -> Result<()> {
    let dashboard = load_dashboard(api, unit, range).await;
    let view = dashboard.chart();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.points.is_empty() {
        eprintln!("No weight entries in range {range}. Use `weighin add` to record your weight.");
    } else {
        for line in render_chart(&view) {
            println!("{line}");
        }
    }
    print_goal_line(&dashboard);

    Ok(())
}

fn print_goal_line(dashboard: &Dashboard) {
    let Some(goal) = dashboard.goal() else {
        return;
    };
    println!(
        "Goal: {}",
        format_weight(goal, dashboard.unit, FormatStyle::Long)
    );
    if let Some(distance) = dashboard.progress() {
        let position = if distance > 0.0 {
            "above"
        } else if distance < 0.0 {
            "below"
        } else {
            "at"
        };
        println!(
            "Latest entry is {} {position} goal",
            format_scaled(distance.abs(), dashboard.unit)
        );
    }
}

#[derive(Tabled)]
struct ImperialRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Stones")]
    stones: i64,
    #[tabled(rename = "Pounds")]
    pounds: String,
    #[tabled(rename = "Decimal st")]
    decimal_stones: String,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Weight (kg)")]
    kg: String,
}

fn render_table(view: &TableView) -> String {
    match view.unit {
        Unit::Imperial => {
            let rows: Vec<ImperialRow> = view
                .rows
                .iter()
                .filter_map(|r| match r.value {
                    TableValue::Imperial {
                        stones,
                        pounds,
                        decimal_stones,
                    } => Some(ImperialRow {
                        id: r.id,
                        date: r.label.clone(),
                        stones,
                        pounds: format!("{pounds:.1}"),
                        decimal_stones: format!("{decimal_stones:.2}"),
                    }),
                    TableValue::Metric { .. } => None,
                })
                .collect();
            Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
                .to_string()
        }
        Unit::Metric => {
            let rows: Vec<MetricRow> = view
                .rows
                .iter()
                .filter_map(|r| match r.value {
                    TableValue::Metric { kg } => Some(MetricRow {
                        id: r.id,
                        date: r.label.clone(),
                        kg: format!("{kg:.1}"),
                    }),
                    TableValue::Imperial { .. } => None,
                })
                .collect();
            Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
                .to_string()
        }
    }
}

/// Column of a value on a `0..=BAR_WIDTH` scale spanning `lo..=hi`.
#[allow(clippy::cast_sign_loss)]
fn scale(value: f64, lo: f64, hi: f64) -> usize {
    if hi > lo {
        ((value - lo) / (hi - lo) * f64::from(BAR_WIDTH)).round() as usize
    } else {
        BAR_WIDTH as usize
    }
}

/// One horizontal bar per point, with the goal column marked on every row.
fn render_chart(view: &ChartView) -> Vec<String> {
    let values = view.points.iter().map(|p| p.value).chain(view.goal);
    let lo = values.clone().fold(f64::INFINITY, f64::min);
    let hi = values.fold(f64::NEG_INFINITY, f64::max);
    let goal_col = view.goal.map(|g| scale(g, lo, hi));

    view.points
        .iter()
        .map(|p| {
            let filled = scale(p.value, lo, hi);
            let bar: String = (0..=BAR_WIDTH as usize)
                .map(|col| match (col <= filled, Some(col) == goal_col) {
                    (true, true) => '╋',
                    (false, true) => '┃',
                    (true, false) => '█',
                    (false, false) => ' ',
                })
                .collect();
            format!(
                "{}  {}  {}",
                p.label,
                bar,
                format_scaled(p.value, view.unit)
            )
        })
        .collect()
}
