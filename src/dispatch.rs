//! Reacts to an edit of the workbook by running the automation the edited cells call for.
//!
//! Rules are checked in order:
//! 1. Edits outside the Monthly sheet are ignored.
//! 2. An edit of the debug toggle applies debug mode and nothing else.
//! 3. An edit touching a source range recolors the expenses chart, the earnings chart when there is
//!    one, and recomputes the investment plan chart.
//! 4. An edit of the plan dropdown recomputes the investment plan chart.
//!
//! A failing action is logged and recorded in the outcome. It never stops later actions.

use crate::api::Host;
use crate::charts::{data_range, find_chart, recolor_pie_chart};
use crate::debug::toggle_debug_visibility;
use crate::layout::{ChartKind, SourceKind, DEBUG_TOGGLE_CELL, MONTHLY, PLAN_DROPDOWN_CELL};
use crate::model::{CellRange, ColorScheme, PlanBook, GREEN_TO_LIGHT_GREEN, RED_TO_YELLOW};
use crate::plans::{investment_plan_chart, PlanChartOutcome};
use crate::ranges::configured_source_ranges;
use crate::{sheet_log, Config, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A cell or range that was edited.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EditEvent {
    pub sheet_name: String,
    /// The edited cells in A1 notation.
    pub address: String,
}

impl EditEvent {
    pub fn new(sheet_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            address: address.into(),
        }
    }
}

/// The settings the automation runs with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    pub expenses_scheme: ColorScheme,
    pub earnings_scheme: ColorScheme,
    pub plans: PlanBook,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expenses_scheme: RED_TO_YELLOW,
            earnings_scheme: GREEN_TO_LIGHT_GREEN,
            plans: PlanBook::default(),
        }
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            expenses_scheme: config.expenses_scheme(),
            earnings_scheme: config.earnings_scheme(),
            plans: config.plans().clone(),
        }
    }
}

/// A rule that matched an edit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    DebugToggle,
    SourceRange(SourceKind),
    PlanDropdown,
}

/// Something the dispatcher did in response to an edit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ToggleDebug,
    RecolorExpenses,
    RecolorEarnings,
    InvestmentPlan,
}

serde_plain::derive_display_from_serialize!(Action);

/// How an action went.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: Action,
    /// Set when the action failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything that happened for one edit.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub rules: Vec<Rule>,
    pub actions: Vec<ActionResult>,
}

impl DispatchOutcome {
    /// True when no rule matched.
    pub fn is_ignored(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ActionResult> {
        self.actions.iter().filter(|a| !a.is_ok())
    }

    fn record(&mut self, action: Action, result: Result<Option<String>>) {
        let (error, detail) = match result {
            Ok(detail) => (None, detail),
            Err(e) => (Some(format!("{e:#}")), None),
        };
        self.actions.push(ActionResult {
            action,
            error,
            detail,
        });
    }
}

/// Runs the rules for one edit. Never fails: problems end up in the outcome and the sheet log.
pub async fn dispatch<H>(host: &mut H, settings: &Settings, event: &EditEvent) -> DispatchOutcome
where
    H: Host + ?Sized,
{
    let mut outcome = DispatchOutcome::default();
    if event.sheet_name != MONTHLY {
        trace!("Ignoring an edit on {}", event.sheet_name);
        return outcome;
    }
    let edited = match CellRange::parse(&event.address) {
        Ok(range) => range,
        Err(e) => {
            debug!("Ignoring an edit with an unusable address: {e}");
            return outcome;
        }
    };

    if is_cell(&edited, DEBUG_TOGGLE_CELL) {
        outcome.rules.push(Rule::DebugToggle);
        let result = toggle_debug_visibility(host).await.map(|enabled| {
            Some(if enabled {
                "Debug mode enabled".to_string()
            } else {
                "Debug mode disabled".to_string()
            })
        });
        report(host, &mut outcome, Action::ToggleDebug, result).await;
        return outcome;
    }

    let sources = match configured_source_ranges(host).await {
        Ok(sources) => sources,
        Err(e) => {
            sheet_log::error(host, "Unable to read the source ranges", &e).await;
            Vec::new()
        }
    };
    let touched: Vec<SourceKind> = sources
        .iter()
        .filter(|(_, range)| range.intersects(&edited))
        .map(|(kind, _)| *kind)
        .collect();
    if !touched.is_empty() {
        outcome
            .rules
            .extend(touched.iter().map(|kind| Rule::SourceRange(*kind)));
        sheet_log::log(host, format!("Budget data edited at {edited}")).await;

        let result = recolor_pie_chart(host, ChartKind::Expenses, &settings.expenses_scheme)
            .await
            .map(Some);
        report(host, &mut outcome, Action::RecolorExpenses, result).await;

        match earnings_chart_exists(host).await {
            Ok(true) => {
                let result =
                    recolor_pie_chart(host, ChartKind::Earnings, &settings.earnings_scheme)
                        .await
                        .map(Some);
                report(host, &mut outcome, Action::RecolorEarnings, result).await;
            }
            Ok(false) => debug!("There is no earnings chart to recolor"),
            Err(e) => report(host, &mut outcome, Action::RecolorEarnings, Err(e)).await,
        }

        let result = plan_chart(host, &settings.plans).await;
        report(host, &mut outcome, Action::InvestmentPlan, result).await;
    }

    if is_cell(&edited, PLAN_DROPDOWN_CELL) {
        outcome.rules.push(Rule::PlanDropdown);
        let result = plan_chart(host, &settings.plans).await;
        report(host, &mut outcome, Action::InvestmentPlan, result).await;
    }

    outcome
}

fn is_cell(edited: &CellRange, address: &str) -> bool {
    CellRange::parse(address).is_ok_and(|cell| cell == *edited)
}

async fn earnings_chart_exists<H>(host: &mut H) -> Result<bool>
where
    H: Host + ?Sized,
{
    let range = data_range(host, ChartKind::Earnings).await?;
    Ok(find_chart(host, MONTHLY, &range).await?.is_some())
}

async fn plan_chart<H>(host: &mut H, plans: &PlanBook) -> Result<Option<String>>
where
    H: Host + ?Sized,
{
    let detail = match investment_plan_chart(host, plans).await? {
        PlanChartOutcome::NoSelection => "No plan selected".to_string(),
        PlanChartOutcome::UnknownPlan { plan } => format!("Unknown plan '{plan}'"),
        PlanChartOutcome::Updated { allocation, .. } => {
            format!("Chart updated for {}", allocation.plan)
        }
        PlanChartOutcome::NoChart { allocation } => {
            format!("Allocation written for {}, no chart to update", allocation.plan)
        }
    };
    Ok(Some(detail))
}

async fn report<H>(
    host: &mut H,
    outcome: &mut DispatchOutcome,
    action: Action,
    result: Result<Option<String>>,
) where
    H: Host + ?Sized,
{
    if let Err(e) = &result {
        sheet_log::error(host, &format!("{action} failed"), e).await;
    }
    outcome.record(action, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CellStore, ChartHost, MemoryWorkbook};
    use crate::layout::{LOG_CELL, PLAN_TAGLINE_CELL};

    async fn run(wb: &mut MemoryWorkbook, sheet: &str, address: &str) -> DispatchOutcome {
        dispatch(wb, &Settings::default(), &EditEvent::new(sheet, address)).await
    }

    fn actions(outcome: &DispatchOutcome) -> Vec<Action> {
        outcome.actions.iter().map(|a| a.action).collect()
    }

    #[tokio::test]
    async fn test_other_sheets_are_ignored() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let outcome = run(&mut wb, "Recurring", "G5").await;
        assert!(outcome.is_ignored());
        assert!(outcome.actions.is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_address_is_ignored() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        assert!(run(&mut wb, MONTHLY, "not-a-cell").await.is_ignored());
    }

    #[tokio::test]
    async fn test_debug_toggle_stops_after_toggling() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, DEBUG_TOGGLE_CELL, "Enabled").await.unwrap();
        let outcome = run(&mut wb, MONTHLY, "Y4").await;
        assert_eq!(outcome.rules, vec![Rule::DebugToggle]);
        assert_eq!(actions(&outcome), vec![Action::ToggleDebug]);
        assert_eq!(
            outcome.actions[0].detail.as_deref(),
            Some("Debug mode enabled")
        );
        let images = wb.images(MONTHLY).await.unwrap();
        assert_eq!(images[0].anchor.to_string(), "A100");
    }

    #[tokio::test]
    async fn test_source_edit_runs_recolors_then_plan() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let outcome = run(&mut wb, MONTHLY, "G16").await;
        assert_eq!(outcome.rules, vec![Rule::SourceRange(SourceKind::Earnings)]);
        assert_eq!(
            actions(&outcome),
            vec![
                Action::RecolorExpenses,
                Action::RecolorEarnings,
                Action::InvestmentPlan
            ]
        );
        assert_eq!(outcome.failures().count(), 0);
        assert_eq!(wb.value(MONTHLY, "K45").await.unwrap(), "Emergency Fund");
    }

    #[tokio::test]
    async fn test_edit_below_source_range_matches_nothing() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let outcome = run(&mut wb, MONTHLY, "G17").await;
        assert!(outcome.is_ignored());
    }

    #[tokio::test]
    async fn test_multi_cell_edit_touching_two_sources() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let outcome = run(&mut wb, MONTHLY, "G10:L10").await;
        assert_eq!(
            outcome.rules,
            vec![
                Rule::SourceRange(SourceKind::Earnings),
                Rule::SourceRange(SourceKind::FixedExpenses)
            ]
        );
        // Still one pass of the actions
        assert_eq!(outcome.actions.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_source_setting_is_no_match() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, "Y13", "L5:").await.unwrap();
        assert!(run(&mut wb, MONTHLY, "L6").await.is_ignored());
        // The other sources still work
        assert!(!run(&mut wb, MONTHLY, "Q6").await.is_ignored());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_and_later_actions_run() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, DEBUG_TOGGLE_CELL, "Enabled").await.unwrap();
        let expenses = find_chart(&mut wb, MONTHLY, &CellRange::parse("AE5").unwrap())
            .await
            .unwrap()
            .unwrap();
        wb.remove_chart(MONTHLY, expenses.id()).await.unwrap();

        let outcome = run(&mut wb, MONTHLY, "Q5").await;
        let failures: Vec<Action> = outcome.failures().map(|a| a.action).collect();
        assert_eq!(failures, vec![Action::RecolorExpenses]);
        assert_eq!(
            actions(&outcome),
            vec![
                Action::RecolorExpenses,
                Action::RecolorEarnings,
                Action::InvestmentPlan
            ]
        );
        let feed = wb.value(MONTHLY, LOG_CELL).await.unwrap();
        assert!(feed.contains("recolor_expenses failed: No expenses chart"));
    }

    #[tokio::test]
    async fn test_missing_earnings_chart_is_skipped() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let earnings = find_chart(&mut wb, MONTHLY, &CellRange::parse("AB5").unwrap())
            .await
            .unwrap()
            .unwrap();
        wb.remove_chart(MONTHLY, earnings.id()).await.unwrap();
        let outcome = run(&mut wb, MONTHLY, "G5").await;
        assert_eq!(
            actions(&outcome),
            vec![Action::RecolorExpenses, Action::InvestmentPlan]
        );
        assert_eq!(outcome.failures().count(), 0);
    }

    #[tokio::test]
    async fn test_plan_dropdown_edit() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, PLAN_DROPDOWN_CELL, "Family Plan").await.unwrap();
        let outcome = run(&mut wb, MONTHLY, "K35").await;
        assert_eq!(outcome.rules, vec![Rule::PlanDropdown]);
        assert_eq!(actions(&outcome), vec![Action::InvestmentPlan]);
        assert_eq!(
            outcome.actions[0].detail.as_deref(),
            Some("Chart updated for Family Plan")
        );
        assert_eq!(
            wb.value(MONTHLY, PLAN_TAGLINE_CELL).await.unwrap(),
            "Moderate risk with diversified investments"
        );
    }

    #[tokio::test]
    async fn test_workbook_without_monthly_sheet() {
        let mut wb = MemoryWorkbook::new();
        let outcome = run(&mut wb, MONTHLY, "K35").await;
        assert_eq!(outcome.rules, vec![Rule::PlanDropdown]);
        assert_eq!(outcome.failures().count(), 1);
    }
}
