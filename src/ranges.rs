//! The user-editable range settings on the Monthly sheet, and the routines that set up or reset the
//! sheet's controls.
//!
//! Each maintained chart has a cell holding the A1 address of its data, and each source block has a
//! cell holding the address of the cells whose edits trigger recoloring.

use crate::api::{CellStore, Host};
use crate::charts::{locate_charts, parse_chart_range, ChartLocation};
use crate::debug::setup_debug_mode;
use crate::layout::{ChartKind, SourceKind, CHARTS, MONTHLY, SOURCES};
use crate::model::{CellRange, PlanBook};
use crate::plans::create_plan_dropdown;
use crate::recurring::setup_recurring_sheet;
use crate::{sheet_log, Result};
use anyhow::Context;
use tracing::warn;

/// The text of a chart's data range cell.
pub async fn chart_range<H>(host: &mut H, kind: ChartKind) -> Result<String>
where
    H: CellStore + ?Sized,
{
    host.value(MONTHLY, kind.layout().data_range_cell).await
}

/// Sets a chart's data range. The address must parse, fit the chart's label and amount columns and
/// is stored in normalized form.
pub async fn update_chart_range<H>(host: &mut H, kind: ChartKind, address: &str) -> Result<CellRange>
where
    H: CellStore + ?Sized,
{
    let range = parse_chart_range(address.trim())
        .with_context(|| format!("Unable to use '{address}' as the {kind} chart range"))?;
    host.set_value(MONTHLY, kind.layout().data_range_cell, &range.to_string())
        .await?;
    sheet_log::log(host, format!("The {kind} chart now reads {range}")).await;
    Ok(range)
}

/// Restores a chart's default data range.
pub async fn reset_chart_range<H>(host: &mut H, kind: ChartKind) -> Result<()>
where
    H: CellStore + ?Sized,
{
    let chart = kind.layout();
    host.set_value(MONTHLY, chart.data_range_cell, chart.default_data_range)
        .await
}

/// The text of a source range cell.
pub async fn source_range<H>(host: &mut H, kind: SourceKind) -> Result<String>
where
    H: CellStore + ?Sized,
{
    host.value(MONTHLY, kind.layout().value_cell).await
}

/// Sets a source range. The address must parse and is stored in normalized form.
pub async fn update_source_range<H>(
    host: &mut H,
    kind: SourceKind,
    address: &str,
) -> Result<CellRange>
where
    H: CellStore + ?Sized,
{
    let range = CellRange::parse(address.trim())
        .with_context(|| format!("Unable to use '{address}' as the {kind} range"))?;
    host.set_value(MONTHLY, kind.layout().value_cell, &range.to_string())
        .await?;
    sheet_log::log(host, format!("The {kind} range is now {range}")).await;
    Ok(range)
}

/// Restores a source range's default.
pub async fn reset_source_range<H>(host: &mut H, kind: SourceKind) -> Result<()>
where
    H: CellStore + ?Sized,
{
    let source = kind.layout();
    host.set_value(MONTHLY, source.value_cell, source.default_range)
        .await
}

/// The source ranges as currently configured. An empty or unparsable setting matches nothing and
/// is left out with a warning.
pub async fn configured_source_ranges<H>(host: &mut H) -> Result<Vec<(SourceKind, CellRange)>>
where
    H: CellStore + ?Sized,
{
    let mut ranges = Vec::new();
    for source in SOURCES {
        let text = source_range(host, source.kind).await?;
        let text = text.trim();
        if text.is_empty() {
            warn!("No {} range is set in {}", source.kind, source.value_cell);
            continue;
        }
        match CellRange::parse(text) {
            Ok(range) => ranges.push((source.kind, range)),
            Err(e) => warn!(
                "Ignoring the {} range in {}: {e}",
                source.kind, source.value_cell
            ),
        }
    }
    Ok(ranges)
}

/// Writes the labels of all range settings. A setting is filled with its default when it is empty,
/// or always when `overwrite` is set. Reports where the maintained charts were found.
pub async fn setup_range_cells<H>(host: &mut H, overwrite: bool) -> Result<Vec<ChartLocation>>
where
    H: Host + ?Sized,
{
    let settings = CHARTS
        .iter()
        .map(|c| (c.label_cell, c.label, c.data_range_cell, c.default_data_range))
        .chain(
            SOURCES
                .iter()
                .map(|s| (s.label_cell, s.label, s.value_cell, s.default_range)),
        );
    for (label_cell, label, value_cell, default) in settings {
        host.set_value(MONTHLY, label_cell, label).await?;
        if overwrite || host.value(MONTHLY, value_cell).await?.trim().is_empty() {
            host.set_value(MONTHLY, value_cell, default).await?;
        }
    }

    let locations = locate_charts(host).await?;
    for location in &locations {
        let message = match &location.chart_id {
            Some(id) => format!(
                "Found the {} chart ({id}) on {}",
                location.kind, location.data_range
            ),
            None => format!("No {} chart on {}", location.kind, location.data_range),
        };
        sheet_log::log(host, message).await;
    }
    Ok(locations)
}

/// Puts the debug controls, the plan dropdown and the range settings back to their defaults.
/// Budget data is left alone.
pub async fn reset_sheet_setup<H>(host: &mut H, plans: &PlanBook) -> Result<Vec<ChartLocation>>
where
    H: Host + ?Sized,
{
    sheet_log::log(host, "Resetting the sheet setup").await;
    setup_debug_mode(host)
        .await
        .context("Unable to reset debug mode")?;
    sheet_log::clear(host).await?;
    create_plan_dropdown(host, plans)
        .await
        .context("Unable to reset the plan dropdown")?;
    let locations = setup_range_cells(host, true)
        .await
        .context("Unable to reset the range settings")?;
    sheet_log::log(host, "Sheet setup reset").await;
    Ok(locations)
}

/// Sets up a workbook for the first time: debug mode, the plan dropdown, the range settings and
/// the Recurring sheet. Settings the user already filled in are kept.
pub async fn initialize_budget_system<H>(
    host: &mut H,
    plans: &PlanBook,
) -> Result<Vec<ChartLocation>>
where
    H: Host + ?Sized,
{
    sheet_log::log(host, "Initializing the budget system").await;
    host.ensure_sheet(MONTHLY).await?;
    setup_debug_mode(host)
        .await
        .context("Unable to set up debug mode")?;
    create_plan_dropdown(host, plans)
        .await
        .context("Unable to set up the plan dropdown")?;
    let locations = setup_range_cells(host, false)
        .await
        .context("Unable to set up the range settings")?;
    setup_recurring_sheet(host)
        .await
        .context("Unable to set up the Recurring sheet")?;
    sheet_log::log(host, "Budget system initialized").await;
    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryWorkbook;
    use crate::layout::{DEBUG_TOGGLE_CELL, LOG_CELL, PLAN_DROPDOWN_CELL, RECURRING};
    use crate::model::builtin_plans;

    #[tokio::test]
    async fn test_chart_range_round_trip() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        assert_eq!(
            chart_range(&mut wb, ChartKind::Expenses).await.unwrap(),
            "AE5:AF24"
        );
        let err = update_chart_range(&mut wb, ChartKind::Expenses, "af12:ae5")
            .await
            .unwrap_err();
        // Lowercase letters are not A1 notation
        assert!(err.to_string().contains("af12:ae5"));

        let range = update_chart_range(&mut wb, ChartKind::Expenses, "AF12:AE5")
            .await
            .unwrap();
        assert_eq!(range.to_string(), "AE5:AF12");
        assert_eq!(wb.value(MONTHLY, "Y7").await.unwrap(), "AE5:AF12");

        reset_chart_range(&mut wb, ChartKind::Expenses).await.unwrap();
        assert_eq!(wb.value(MONTHLY, "Y7").await.unwrap(), "AE5:AF24");
    }

    #[tokio::test]
    async fn test_update_chart_range_rejects_oversized_range() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        for address in ["A1:XFD1048576", "AE5:AG24", "AE5:AF1005"] {
            let err = update_chart_range(&mut wb, ChartKind::Expenses, address)
                .await
                .unwrap_err();
            assert!(format!("{err:#}").contains("larger than 1000 rows of 2 columns"));
        }
        assert_eq!(wb.value(MONTHLY, "Y7").await.unwrap(), "AE5:AF24");
        let range = update_chart_range(&mut wb, ChartKind::Expenses, " AE5:AF30 ")
            .await
            .unwrap();
        assert_eq!(range.to_string(), "AE5:AF30");
    }

    #[tokio::test]
    async fn test_source_range_round_trip() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        update_source_range(&mut wb, SourceKind::Earnings, "G5:G20")
            .await
            .unwrap();
        assert_eq!(
            source_range(&mut wb, SourceKind::Earnings).await.unwrap(),
            "G5:G20"
        );
        assert!(update_source_range(&mut wb, SourceKind::Earnings, "G5:")
            .await
            .is_err());
        reset_source_range(&mut wb, SourceKind::Earnings).await.unwrap();
        assert_eq!(
            source_range(&mut wb, SourceKind::Earnings).await.unwrap(),
            "G5:G16"
        );
    }

    #[tokio::test]
    async fn test_configured_source_ranges_skip_bad_settings() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        assert_eq!(configured_source_ranges(&mut wb).await.unwrap().len(), 3);
        wb.set_value(MONTHLY, "Y13", "garbage").await.unwrap();
        wb.set_value(MONTHLY, "Y14", "").await.unwrap();
        wb.set_value(MONTHLY, "Y12", " G5:G16 ").await.unwrap();
        let ranges = configured_source_ranges(&mut wb).await.unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].0, SourceKind::Earnings);
        assert_eq!(ranges[0].1.to_string(), "G5:G16");
    }

    #[tokio::test]
    async fn test_setup_range_cells_keeps_user_settings() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, "Y12", "G5:G10").await.unwrap();
        wb.set_value(MONTHLY, "Y13", "").await.unwrap();
        wb.set_value(MONTHLY, "X6", "").await.unwrap();
        let locations = setup_range_cells(&mut wb, false).await.unwrap();
        assert_eq!(locations.len(), 3);
        assert_eq!(wb.value(MONTHLY, "X6").await.unwrap(), "Earnings Chart");
        assert_eq!(wb.value(MONTHLY, "Y12").await.unwrap(), "G5:G10");
        assert_eq!(wb.value(MONTHLY, "Y13").await.unwrap(), "L5:L16");

        setup_range_cells(&mut wb, true).await.unwrap();
        assert_eq!(wb.value(MONTHLY, "Y12").await.unwrap(), "G5:G16");
    }

    #[tokio::test]
    async fn test_reset_sheet_setup() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        let plans = builtin_plans();
        wb.set_value(MONTHLY, DEBUG_TOGGLE_CELL, "Enabled").await.unwrap();
        wb.set_value(MONTHLY, LOG_CELL, "old lines").await.unwrap();
        wb.set_value(MONTHLY, "Y8", "A1:B2").await.unwrap();
        let locations = reset_sheet_setup(&mut wb, &plans).await.unwrap();
        assert!(locations.iter().all(|l| l.chart_id.is_some()));
        assert_eq!(wb.value(MONTHLY, DEBUG_TOGGLE_CELL).await.unwrap(), "Disabled");
        assert_eq!(wb.value(MONTHLY, LOG_CELL).await.unwrap(), "");
        assert_eq!(wb.value(MONTHLY, "Y8").await.unwrap(), "K45:L51");
        // Budget data is untouched
        assert_eq!(wb.value(MONTHLY, "G5").await.unwrap(), "Salary");
    }

    #[tokio::test]
    async fn test_initialize_empty_workbook() {
        let mut wb = MemoryWorkbook::new();
        let plans = builtin_plans();
        let locations = initialize_budget_system(&mut wb, &plans).await.unwrap();
        assert!(locations.iter().all(|l| l.chart_id.is_none()));
        assert_eq!(wb.value(MONTHLY, "X4").await.unwrap(), "Debug Mode:");
        assert_eq!(
            wb.value(MONTHLY, PLAN_DROPDOWN_CELL).await.unwrap(),
            "Conservative Plan"
        );
        assert_eq!(wb.value(MONTHLY, "Y6").await.unwrap(), "AB5:AC24");
        assert_eq!(wb.value(RECURRING, "A1").await.unwrap(), "Description");
    }
}
