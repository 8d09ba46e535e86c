mod goal;
mod helpers;
mod weight;

use weighin_core::dashboard::Dashboard;
use weighin_core::range::RangeToken;
use weighin_core::units::Unit;

use crate::api::ApiClient;

pub(crate) use goal::{cmd_goal_clear, cmd_goal_set, cmd_goal_show};
pub(crate) use weight::{cmd_add, cmd_chart, cmd_delete, cmd_edit, cmd_list, cmd_show};

/// Fetch the series for the selected range plus the goal. A failed fetch is logged and
/// leaves that part of the view empty rather than aborting the command.
pub(super) async fn load_dashboard(api: &ApiClient, unit: Unit, range: RangeToken) -> Dashboard {
    let mut dashboard = Dashboard::new(unit, range);

    match api.list_weights(&dashboard.window()).await {
        Ok(entries) => dashboard.set_entries(entries),
        Err(e) => {
            tracing::warn!("could not load weights: {e:#}");
            dashboard.clear_entries();
        }
    }

    match api.get_goal().await {
        Ok(goal) => dashboard.set_goal(goal.pounds),
        Err(e) => tracing::warn!("could not load goal: {e:#}"),
    }

    dashboard
}
