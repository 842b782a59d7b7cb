//! Pie chart maintenance on the Monthly sheet.
//!
//! A chart cannot be recolored in place, so recoloring inserts a replacement with the same data,
//! anchor and offsets and then removes the original.

use crate::api::{CellStore, Chart, ChartOptions, ChartSpec, Host, SliceText};
use crate::layout::{
    self, ChartKind, LegendPosition, CHARTS, DTI_CHART_COL, DTI_CHART_ROW, DTI_COLORS,
    DTI_EARNINGS_CELL, DTI_EXPENSES_CELL, DTI_INVESTABLE_CELL, DTI_RATIO_CELL, DTI_TABLE_RANGE,
    DTI_TITLE, MAX_CHART_COLS, MAX_CHART_ROWS, MONTHLY, SLICE_BORDER_COLOR, SLICE_BORDER_WIDTH,
};
use crate::model::{compute_colors, Amount, CellRange, CellRef, ColorScheme, ValueSample};
use crate::{sheet_log, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The data range of a maintained chart as configured in its data range cell. An empty, unparsable
/// or oversized setting falls back to the default range.
pub async fn data_range<H>(host: &mut H, kind: ChartKind) -> Result<CellRange>
where
    H: CellStore + ?Sized,
{
    let chart = kind.layout();
    let configured = host.value(MONTHLY, chart.data_range_cell).await?;
    let configured = configured.trim();
    if configured.is_empty() {
        debug!("No data range set for the {kind} chart, using {}", chart.default_data_range);
        return layout::fixed_range(chart.default_data_range);
    }
    match parse_chart_range(configured) {
        Ok(range) => Ok(range),
        Err(e) => {
            warn!(
                "Ignoring the {kind} chart data range in {}: {e}",
                chart.data_range_cell
            );
            layout::fixed_range(chart.default_data_range)
        }
    }
}

/// Parses a chart data range and checks that it fits the label and amount columns a chart reads.
pub(crate) fn parse_chart_range(address: &str) -> Result<CellRange> {
    let range = CellRange::parse(address)?;
    if range.cols() > MAX_CHART_COLS || range.rows() > MAX_CHART_ROWS {
        bail!("{range} is larger than {MAX_CHART_ROWS} rows of {MAX_CHART_COLS} columns");
    }
    Ok(range)
}

/// The chart on `sheet` whose first data range starts at the same cell as `range`.
pub async fn find_chart<H>(host: &mut H, sheet: &str, range: &CellRange) -> Result<Option<Chart>>
where
    H: Host + ?Sized,
{
    let top_left = range.top_left();
    Ok(host
        .charts(sheet)
        .await?
        .into_iter()
        .find(|chart| chart.first_range().map(CellRange::top_left) == Some(top_left)))
}

/// Colors the slices of a maintained pie chart by magnitude. Returns the id of the replacement
/// chart.
pub async fn recolor_pie_chart<H>(host: &mut H, kind: ChartKind, scheme: &ColorScheme) -> Result<String>
where
    H: Host + ?Sized,
{
    let range = data_range(host, kind).await?;
    let Some(chart) = find_chart(host, MONTHLY, &range).await? else {
        bail!("No {kind} chart uses the data range {range}");
    };

    let rows = host.get(MONTHLY, &range).await?;
    let samples = samples(&rows);
    let colors = compute_colors(&samples, scheme)
        .with_context(|| format!("Unable to color the {kind} chart from {range}"))?;

    let old = chart.spec();
    let spec = ChartSpec {
        options: ChartOptions {
            slice_text: SliceText::Value,
            legend: LegendPosition::Bottom,
            colors,
            slice_border_color: Some(SLICE_BORDER_COLOR.to_string()),
            slice_border_width: Some(SLICE_BORDER_WIDTH),
            ..old.options.clone()
        },
        ..old.clone()
    };
    let slices = spec.options.colors.len();
    let id = host.insert_chart(MONTHLY, spec).await?;
    host.remove_chart(MONTHLY, chart.id()).await?;
    sheet_log::log(host, format!("Recolored the {kind} chart ({slices} slices)")).await;
    Ok(id)
}

/// Turns `[label, amount]` rows into samples. Rows whose amount does not parse are left out.
pub(crate) fn samples(rows: &[Vec<String>]) -> Vec<ValueSample> {
    rows.iter()
        .filter_map(|row| {
            let label = row.first()?.trim();
            let amount: Amount = row.get(1)?.parse().ok()?;
            Some(ValueSample::new(label, amount.to_f64()))
        })
        .collect()
}

/// Where a maintained chart's data lives and whether the chart was found there.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChartLocation {
    pub kind: ChartKind,
    pub data_range: CellRange,
    pub chart_id: Option<String>,
}

/// Looks up each maintained chart by its configured data range.
pub async fn locate_charts<H>(host: &mut H) -> Result<Vec<ChartLocation>>
where
    H: Host + ?Sized,
{
    let mut locations = Vec::new();
    for chart in CHARTS {
        let range = data_range(host, chart.kind).await?;
        let found = find_chart(host, MONTHLY, &range).await?;
        match &found {
            Some(c) => debug!("Found the {} chart {} on {range}", chart.kind, c.id()),
            None => debug!("No {} chart on {range}", chart.kind),
        }
        locations.push(ChartLocation {
            kind: chart.kind,
            data_range: range,
            chart_id: found.map(|c| c.id().to_string()),
        });
    }
    Ok(locations)
}

/// The figures behind the debt-to-income chart.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DebtToIncome {
    pub earnings: Amount,
    pub expenses: Amount,
    pub investable_funds: Amount,
    pub ratio: String,
    pub chart_id: String,
}

/// Writes the expenses and investable funds into a small table and draws it as a pie chart. A
/// chart left over from an earlier run is replaced.
pub async fn debt_to_income_chart<H>(host: &mut H) -> Result<DebtToIncome>
where
    H: Host + ?Sized,
{
    let earnings = amount_cell(host, DTI_EARNINGS_CELL).await?;
    let expenses = amount_cell(host, DTI_EXPENSES_CELL).await?.abs();
    let investable_funds = amount_cell(host, DTI_INVESTABLE_CELL).await?;
    let ratio = host.value(MONTHLY, DTI_RATIO_CELL).await?;

    let table = layout::fixed_range(DTI_TABLE_RANGE)?;
    let values = vec![
        vec!["Category".to_string(), "Amount".to_string()],
        vec!["Expenses".to_string(), expenses.to_cell_string()],
        vec![
            "Investable Funds".to_string(),
            investable_funds.to_cell_string(),
        ],
    ];
    host.set(MONTHLY, &table, &values).await?;

    if let Some(old) = find_chart(host, MONTHLY, &table).await? {
        host.remove_chart(MONTHLY, old.id()).await?;
    }
    let mut spec = ChartSpec::pie(table, CellRef::new(DTI_CHART_ROW, DTI_CHART_COL));
    spec.options = ChartOptions {
        title: Some(DTI_TITLE.to_string()),
        slice_text: SliceText::Percentage,
        legend: LegendPosition::Bottom,
        colors: DTI_COLORS.iter().map(|c| c.to_string()).collect(),
        ..ChartOptions::default()
    };
    let chart_id = host.insert_chart(MONTHLY, spec).await?;
    sheet_log::log(
        host,
        format!("Debt-to-income chart: expenses {expenses}, investable {investable_funds}"),
    )
    .await;

    Ok(DebtToIncome {
        earnings,
        expenses,
        investable_funds,
        ratio,
        chart_id,
    })
}

/// Reads a money cell of the Monthly sheet. A blank cell is zero.
async fn amount_cell<H>(host: &mut H, address: &str) -> Result<Amount>
where
    H: CellStore + ?Sized,
{
    let text = host.value(MONTHLY, address).await?;
    if text.trim().is_empty() {
        return Ok(Amount::ZERO);
    }
    text.parse()
        .with_context(|| format!("{MONTHLY}!{address} does not hold an amount"))
}
