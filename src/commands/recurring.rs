//! Recurring sheet command handlers.

use crate::args::{MonthArgs, PopulateArgs, UpdateDueArgs};
use crate::commands::{commit, plural, Out};
use crate::model::{RecurringPreview, RecurringSummary};
use crate::recurring::{
    populate_monthly, recurring_preview as preview_month, recurring_summary as summarize_month,
    setup_recurring_sheet, update_next_due_dates, PopulateReport,
};
use crate::{Config, Result};
use chrono::{Datelike, Local, NaiveDate};

/// Creates the Recurring sheet, or refreshes its headers and dropdowns.
pub async fn recurring_setup(config: Config) -> Result<Out<()>> {
    let mut workbook = config.load_workbook().await?;
    let created = setup_recurring_sheet(&mut workbook).await?;
    commit(&config, &workbook).await?;
    Ok(if created {
        "Created the Recurring sheet".into()
    } else {
        "Refreshed the Recurring sheet headers and dropdowns".into()
    })
}

/// Writes the items due in a month into the Monthly sheet.
pub async fn recurring_populate(config: Config, args: PopulateArgs) -> Result<Out<PopulateReport>> {
    let (month, year) = month_or_current(args.month());
    let mut workbook = config.load_workbook().await?;
    let report = populate_monthly(&mut workbook, month, year, args.clear()).await?;
    commit(&config, &workbook).await?;

    let mut message = format!(
        "Wrote {month}/{year}: {} earnings, {} fixed and {} variable expenses",
        report.earnings, report.fixed_expenses, report.variable_expenses
    );
    if report.overflow > 0 {
        message.push_str(&format!(
            " ({} did not fit)",
            plural(report.overflow, "item")
        ));
    }
    Ok(Out::new(message, report))
}

/// Shows what `populate` would write for a month.
pub async fn recurring_preview(config: Config, args: MonthArgs) -> Result<Out<RecurringPreview>> {
    let (month, year) = month_or_current(&args);
    let mut workbook = config.load_workbook().await?;
    let preview = preview_month(&mut workbook, month, year).await?;
    let message = format!(
        "{month}/{year}: {} totaling {}, {} totaling {}, {} totaling {}",
        plural(preview.earnings.len(), "earning"),
        preview.total_earnings,
        plural(preview.fixed_expenses.len(), "fixed expense"),
        preview.total_fixed_expenses,
        plural(preview.variable_expenses.len(), "variable expense"),
        preview.total_variable_expenses,
    );
    Ok(Out::new(message, preview))
}

/// Totals the items due in a month.
pub async fn recurring_summary(config: Config, args: MonthArgs) -> Result<Out<RecurringSummary>> {
    let (month, year) = month_or_current(&args);
    let mut workbook = config.load_workbook().await?;
    let summary = summarize_month(&mut workbook, month, year).await?;
    let message = format!(
        "{month}/{year}: {} due, net {}",
        plural(summary.item_count, "item"),
        summary.net_amount
    );
    Ok(Out::new(message, summary))
}

/// Fills in the Next Due column.
pub async fn recurring_update_due(config: Config, args: UpdateDueArgs) -> Result<Out<usize>> {
    let today = args.today().unwrap_or_else(today);
    let mut workbook = config.load_workbook().await?;
    let updated = update_next_due_dates(&mut workbook, today).await?;
    commit(&config, &workbook).await?;
    Ok(Out::new(
        format!("Updated the next due date of {}", plural(updated, "item")),
        updated,
    ))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn month_or_current(args: &MonthArgs) -> (u32, i32) {
    let today = today();
    (
        args.month().unwrap_or_else(|| today.month()),
        args.year().unwrap_or_else(|| today.year()),
    )
}
