use anyhow::Result;

use weighin_core::units::{FormatStyle, Unit, format_weight};
use weighin_core::validate::GoalForm;

use super::helpers::{confirm, format_scaled, invalid};
use crate::api::ApiClient;

pub(crate) async fn cmd_goal_show(api: &ApiClient, unit: Unit, json: bool) -> Result<()> {
    let goal = api.get_goal().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "pounds": goal.pounds,
                "updated_at": goal.updated_at,
                "unit": unit,
                "value": goal.overlay(unit),
            }))?
        );
        return Ok(());
    }

    if !goal.is_set() {
        eprintln!("No goal set. Use `weighin goal set <stones> <pounds>` to set one.");
        return Ok(());
    }
    if let (Some(pounds), Some(value)) = (goal.pounds, goal.overlay(unit)) {
        println!(
            "Goal: {} ({})",
            format_weight(pounds, unit, FormatStyle::Long),
            format_scaled(value, unit)
        );
    }

    Ok(())
}

pub(crate) async fn cmd_goal_set(
    api: &ApiClient,
    stones: String,
    pounds: String,
    json: bool,
) -> Result<()> {
    let form = GoalForm { stones, pounds };
    let total = form.submit().map_err(|e| invalid(&e))?;

    let goal = api.set_goal(Some(total)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else if let Some(pounds) = goal.pounds {
        println!(
            "Goal set to {}",
            format_weight(pounds, Unit::Imperial, FormatStyle::Long)
        );
    }

    Ok(())
}

pub(crate) async fn cmd_goal_clear(api: &ApiClient, yes: bool, json: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to clear your goal?")? {
        eprintln!("Cancelled");
        return Ok(());
    }

    let goal = api.set_goal(None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        println!("Goal cleared");
    }

    Ok(())
}
