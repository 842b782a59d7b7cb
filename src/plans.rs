//! The investment plan dropdown, its description cells and the allocation pie chart.

use crate::api::{CellStore, ChartOptions, ChartSpec, Host, SliceText};
use crate::charts::{data_range, find_chart};
use crate::layout::{
    ChartKind, LegendPosition, INVESTABLE_FUNDS_CELL, INVESTMENT_PLANS_CHART, MONTHLY,
    PLAN_DESCRIPTION_CELL, PLAN_DROPDOWN_CELL, PLAN_TAGLINE_CELL, SLICE_BORDER_COLOR,
    SLICE_BORDER_WIDTH,
};
use crate::model::{Allocation, Amount, CellRange, CellRef, PlanBook, PLACEHOLDER};
use crate::{sheet_log, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The plan chosen in the dropdown, if any.
pub async fn selected_plan<H>(host: &mut H) -> Result<Option<String>>
where
    H: CellStore + ?Sized,
{
    let value = host.value(MONTHLY, PLAN_DROPDOWN_CELL).await?;
    let value = value.trim();
    if value.is_empty() || value == PLACEHOLDER {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Shows the tagline and description of `plan`, or blanks both when the plan is unknown or none
/// is given.
pub async fn update_plan_description<H>(
    host: &mut H,
    plans: &PlanBook,
    plan: Option<&str>,
) -> Result<()>
where
    H: CellStore + ?Sized,
{
    let (tagline, description) = match plan.and_then(|name| plans.get(name)) {
        Some(definition) => (
            definition.tagline.as_str(),
            definition.description.as_str(),
        ),
        None => ("", ""),
    };
    host.set_value(MONTHLY, PLAN_TAGLINE_CELL, tagline).await?;
    host.set_value(MONTHLY, PLAN_DESCRIPTION_CELL, description)
        .await?;
    Ok(())
}

/// Restricts the dropdown cell to the plan names. An empty dropdown gets the first plan.
pub async fn create_plan_dropdown<H>(host: &mut H, plans: &PlanBook) -> Result<()>
where
    H: CellStore + ?Sized,
{
    let names = plans.names();
    let cell = CellRange::from(CellRef::parse(PLAN_DROPDOWN_CELL)?);
    host.set_validation(MONTHLY, &cell, &names).await?;

    let selected = match selected_plan(host).await? {
        Some(name) => name,
        None => {
            let Some(first) = names.first() else {
                bail!("There are no investment plans to choose from");
            };
            host.set_value(MONTHLY, PLAN_DROPDOWN_CELL, first).await?;
            first.clone()
        }
    };
    update_plan_description(host, plans, Some(&selected)).await?;
    sheet_log::log(host, format!("Plan dropdown ready with {} plans", names.len())).await;
    Ok(())
}

/// Chooses `name` in the dropdown and shows its description.
pub async fn select_plan<H>(host: &mut H, plans: &PlanBook, name: &str) -> Result<()>
where
    H: CellStore + ?Sized,
{
    ensure!(
        plans.get(name).is_some(),
        "Unknown plan '{name}', choose one of: {}",
        plans.names().join(", ")
    );
    host.set_value(MONTHLY, PLAN_DROPDOWN_CELL, name).await?;
    update_plan_description(host, plans, Some(name)).await
}

/// What happened when the investment plan chart was recomputed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum PlanChartOutcome {
    /// Nothing is selected in the dropdown.
    NoSelection,
    /// The dropdown holds a name that is not a known plan.
    UnknownPlan { plan: String },
    /// The allocation was written and the chart replaced.
    Updated {
        allocation: Allocation,
        chart_id: String,
    },
    /// The allocation was written but there is no chart on its range.
    NoChart { allocation: Allocation },
}

/// Splits the investable funds according to the selected plan, writes the allocation table into
/// the chart's data range and replaces the chart with one colored per category.
pub async fn investment_plan_chart<H>(host: &mut H, plans: &PlanBook) -> Result<PlanChartOutcome>
where
    H: Host + ?Sized,
{
    let Some(plan) = selected_plan(host).await? else {
        update_plan_description(host, plans, None).await?;
        sheet_log::log(host, "No investment plan selected").await;
        return Ok(PlanChartOutcome::NoSelection);
    };
    if plans.get(&plan).is_none() {
        update_plan_description(host, plans, None).await?;
        sheet_log::log(host, format!("Unknown investment plan '{plan}'")).await;
        return Ok(PlanChartOutcome::UnknownPlan { plan });
    }
    update_plan_description(host, plans, Some(&plan)).await?;

    let funds = investable_funds(host).await?;
    let Some(allocation) = plans.allocate(&plan, funds.value()) else {
        return Ok(PlanChartOutcome::UnknownPlan { plan });
    };
    debug!("{plan} splits {funds} into {} rows", allocation.rows.len());

    let range = data_range(host, ChartKind::InvestmentPlans).await?;
    write_allocation(host, &range, &allocation).await?;

    let Some(old) = find_chart(host, MONTHLY, &range).await? else {
        sheet_log::log(
            host,
            format!(
                "No investment plan chart found on {range}. Insert a pie chart over {range} to \
                see the allocation."
            ),
        )
        .await;
        return Ok(PlanChartOutcome::NoChart { allocation });
    };

    let chart = &INVESTMENT_PLANS_CHART;
    let spec = ChartSpec {
        ranges: old.spec().ranges.clone(),
        anchor: CellRef::parse(chart.anchor)?,
        offset_x: 0,
        offset_y: 0,
        options: ChartOptions {
            title: Some(format!("{plan} ({funds} Investable)")),
            title_centered: true,
            slice_text: SliceText::Value,
            legend: LegendPosition::Bottom,
            legend_font_size: Some(chart.font_size),
            colors: allocation.colors(),
            slice_border_color: Some(SLICE_BORDER_COLOR.to_string()),
            slice_border_width: Some(SLICE_BORDER_WIDTH),
            width: Some(chart.width),
            height: Some(chart.height),
        },
        ..old.spec().clone()
    };
    let chart_id = host.insert_chart(MONTHLY, spec).await?;
    host.remove_chart(MONTHLY, old.id()).await?;
    sheet_log::log(host, format!("Investment plan chart updated for {plan}")).await;
    Ok(PlanChartOutcome::Updated {
        allocation,
        chart_id,
    })
}

/// The investable funds cell. A blank cell means nothing to invest.
async fn investable_funds<H>(host: &mut H) -> Result<Amount>
where
    H: CellStore + ?Sized,
{
    let text = host.value(MONTHLY, INVESTABLE_FUNDS_CELL).await?;
    if text.trim().is_empty() {
        return Ok(Amount::ZERO);
    }
    text.parse()
        .with_context(|| format!("The investable funds in {INVESTABLE_FUNDS_CELL} are not a number"))
}

/// Clears `range` and writes the allocation rows into its first two columns.
async fn write_allocation<H>(host: &mut H, range: &CellRange, allocation: &Allocation) -> Result<()>
where
    H: CellStore + ?Sized,
{
    let rows = allocation.rows.len() as u32;
    ensure!(
        range.cols() >= 2,
        "The investment plan range {range} needs two columns"
    );
    ensure!(
        rows <= range.rows(),
        "The investment plan range {range} has {} rows but the allocation needs {rows}",
        range.rows()
    );
    host.clear(MONTHLY, range).await?;
    if rows == 0 {
        return Ok(());
    }
    let target = CellRange::new(
        range.start_row(),
        range.start_col(),
        range.start_row() + rows - 1,
        range.start_col() + 1,
    );
    host.set(MONTHLY, &target, &allocation.to_cells()).await
}
