//! The Recurring sheet and how its items are written into the Monthly sheet.

use crate::api::CellStore;
use crate::layout::{
    recurring_column, MonthlyBlock, BLOCK_FIRST_ROW, BLOCK_ROWS, EARNINGS_BLOCK,
    FIXED_EXPENSES_BLOCK, FIXED_EXPENSE_CATEGORIES, MONTHLY, RECURRING, RECURRING_FIRST_DATA_ROW,
    RECURRING_FREQUENCY_COL, RECURRING_HEADERS, RECURRING_HEADER_ROW, RECURRING_NEXT_DUE_COL,
    RECURRING_SPLIT_COL, RECURRING_STATUS_COL, VARIABLE_EXPENSES_BLOCK,
};
use crate::model::{
    classify, format_date, items_due_in_month, month_bounds, preview, summarize,
    Amount, CellRange, Frequency, RecurringItem, RecurringPreview, RecurringSummary, Section,
    Status,
};
use crate::{sheet_log, Result};
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Creates the Recurring sheet when missing and writes its headers and dropdowns. Returns `true`
/// when the sheet was created.
pub async fn setup_recurring_sheet<H>(host: &mut H) -> Result<bool>
where
    H: CellStore + ?Sized,
{
    let created = host.ensure_sheet(RECURRING).await?;
    let headers = CellRange::new(
        RECURRING_HEADER_ROW,
        1,
        RECURRING_HEADER_ROW,
        RECURRING_HEADERS.len() as u32,
    );
    let values: Vec<Vec<String>> = vec![RECURRING_HEADERS.iter().map(|h| h.to_string()).collect()];
    host.set(RECURRING, &headers, &values).await?;

    let frequencies: Vec<String> = Frequency::ALL.iter().map(|f| f.to_string()).collect();
    let yes_no = vec!["Yes".to_string(), "No".to_string()];
    let statuses = vec![Status::Active.to_string(), Status::Inactive.to_string()];
    for (col, allowed) in [
        (RECURRING_FREQUENCY_COL, frequencies),
        (RECURRING_SPLIT_COL, yes_no),
        (RECURRING_STATUS_COL, statuses),
    ] {
        let range = CellRange::parse(&recurring_column(col))?;
        host.set_validation(RECURRING, &range, &allowed).await?;
    }

    let message = if created {
        "Created the Recurring sheet"
    } else {
        "Recurring sheet headers and dropdowns are up to date"
    };
    sheet_log::log(host, message).await;
    Ok(created)
}

/// Every valid item on the Recurring sheet, in sheet order.
///
/// Rows without a description, amount or frequency are blank or unfinished and are passed over
/// quietly. Rows that have those but fail validation are skipped with a warning.
pub async fn recurring_items<H>(host: &mut H) -> Result<Vec<RecurringItem>>
where
    H: CellStore + ?Sized,
{
    Ok(item_rows(host)
        .await?
        .into_iter()
        .map(|(_, item)| item)
        .collect())
}

/// Items paired with their sheet row.
async fn item_rows<H>(host: &mut H) -> Result<Vec<(u32, RecurringItem)>>
where
    H: CellStore + ?Sized,
{
    ensure!(
        host.has_sheet(RECURRING).await?,
        "There is no {RECURRING} sheet, run 'budget recurring setup' first"
    );
    let last_row = host.last_row(RECURRING).await?;
    if last_row < RECURRING_FIRST_DATA_ROW {
        return Ok(Vec::new());
    }
    let range = CellRange::new(
        RECURRING_FIRST_DATA_ROW,
        1,
        last_row,
        RECURRING_HEADERS.len() as u32,
    );
    let rows = host.get(RECURRING, &range).await?;

    let mut items = Vec::new();
    for (row_number, row) in (RECURRING_FIRST_DATA_ROW..).zip(rows) {
        let filled = |ix: usize| row.get(ix).is_some_and(|v| !v.trim().is_empty());
        if !(filled(0) && filled(1) && filled(3)) {
            continue;
        }
        match RecurringItem::from_row(row.as_slice()) {
            Ok(item) => items.push((row_number, item)),
            Err(errors) => warn!(
                "Skipping {RECURRING} row {row_number}: {}",
                errors.join(", ")
            ),
        }
    }
    debug!("Read {} recurring items", items.len());
    Ok(items)
}

/// Writes the next due date after `today` for every active item. Returns how many were written.
pub async fn update_next_due_dates<H>(host: &mut H, today: NaiveDate) -> Result<usize>
where
    H: CellStore + ?Sized,
{
    let mut updated = 0;
    for (row, item) in item_rows(host).await? {
        if !item.is_active() {
            continue;
        }
        let Some(next) = item.next_due_after(today) else {
            continue;
        };
        let address = format!("{RECURRING_NEXT_DUE_COL}{row}");
        host.set_value(RECURRING, &address, &format_date(next))
            .await?;
        updated += 1;
    }
    sheet_log::log(host, format!("Updated the next due date of {updated} items")).await;
    Ok(updated)
}

const BLOCKS: [MonthlyBlock; 3] = [EARNINGS_BLOCK, FIXED_EXPENSES_BLOCK, VARIABLE_EXPENSES_BLOCK];

/// Blanks the earnings, fixed expenses and variable expenses blocks of the Monthly sheet.
pub async fn clear_monthly_blocks<H>(host: &mut H) -> Result<()>
where
    H: CellStore + ?Sized,
{
    for block in BLOCKS {
        let range = CellRange::parse(&block.range())?;
        host.clear(MONTHLY, &range).await?;
    }
    Ok(())
}

/// How many rows were written into each block of the Monthly sheet.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PopulateReport {
    pub month: u32,
    pub year: i32,
    pub earnings: usize,
    pub fixed_expenses: usize,
    pub variable_expenses: usize,
    /// Items that did not fit into their block.
    pub overflow: usize,
}

/// Writes the items due in `month` of `year` into the Monthly sheet blocks, optionally clearing
/// the blocks first. Amounts are written as positive numbers.
pub async fn populate_monthly<H>(
    host: &mut H,
    month: u32,
    year: i32,
    clear: bool,
) -> Result<PopulateReport>
where
    H: CellStore + ?Sized,
{
    check_month(month, year)?;
    let items = recurring_items(host).await?;
    let due = items_due_in_month(&items, month, year);

    if clear {
        clear_monthly_blocks(host).await?;
    }

    let mut earnings = Vec::new();
    let mut fixed = Vec::new();
    let mut variable = Vec::new();
    for item in &due {
        let (description, amount) = item.monthly_entry();
        let entry = (description, amount.abs());
        match classify(&item.category, amount, &FIXED_EXPENSE_CATEGORIES) {
            Some(Section::Earnings) => earnings.push(entry),
            Some(Section::FixedExpenses) => fixed.push(entry),
            Some(Section::VariableExpenses) => variable.push(entry),
            None => debug!("Skipping '{}' with a zero amount", item.description),
        }
    }

    let mut report = PopulateReport {
        month,
        year,
        ..PopulateReport::default()
    };
    report.earnings = write_block(host, &EARNINGS_BLOCK, &earnings).await?;
    report.fixed_expenses = write_block(host, &FIXED_EXPENSES_BLOCK, &fixed).await?;
    report.variable_expenses = write_block(host, &VARIABLE_EXPENSES_BLOCK, &variable).await?;
    report.overflow = earnings.len() + fixed.len() + variable.len()
        - report.earnings
        - report.fixed_expenses
        - report.variable_expenses;

    sheet_log::log(
        host,
        format!(
            "Populated {month}/{year}: {} earnings, {} fixed expenses, {} variable expenses",
            report.earnings, report.fixed_expenses, report.variable_expenses
        ),
    )
    .await;
    if report.overflow > 0 {
        warn!(
            "{} recurring items did not fit into the Monthly sheet",
            report.overflow
        );
    }
    Ok(report)
}

/// Writes up to `BLOCK_ROWS` description and amount pairs from the top of `block`.
async fn write_block<H>(
    host: &mut H,
    block: &MonthlyBlock,
    entries: &[(String, Amount)],
) -> Result<usize>
where
    H: CellStore + ?Sized,
{
    let count = entries.len().min(BLOCK_ROWS);
    if count == 0 {
        return Ok(0);
    }
    let address = format!(
        "{}{}:{}{}",
        block.description_col,
        BLOCK_FIRST_ROW,
        block.amount_col,
        BLOCK_FIRST_ROW + count as u32 - 1
    );
    let range = CellRange::parse(&address)?;
    let values: Vec<Vec<String>> = entries[..count]
        .iter()
        .map(|(description, amount)| vec![description.clone(), amount.to_cell_string()])
        .collect();
    host.set(MONTHLY, &range, &values)
        .await
        .with_context(|| format!("Unable to write recurring items into {address}"))?;
    Ok(count)
}

/// Totals of the items due in `month` of `year`.
pub async fn recurring_summary<H>(host: &mut H, month: u32, year: i32) -> Result<RecurringSummary>
where
    H: CellStore + ?Sized,
{
    check_month(month, year)?;
    let items = recurring_items(host).await?;
    let due = items_due_in_month(&items, month, year);
    Ok(summarize(&due, &FIXED_EXPENSE_CATEGORIES))
}

/// The items due in `month` of `year`, grouped the way they would be written.
pub async fn recurring_preview<H>(host: &mut H, month: u32, year: i32) -> Result<RecurringPreview>
where
    H: CellStore + ?Sized,
{
    check_month(month, year)?;
    let items = recurring_items(host).await?;
    let due = items_due_in_month(&items, month, year);
    Ok(preview(&due, &FIXED_EXPENSE_CATEGORIES))
}

fn check_month(month: u32, year: i32) -> Result<()> {
    ensure!(
        month_bounds(month, year).is_some(),
        "{month}/{year} is not a valid month, use a month from 1 to 12"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryWorkbook;
    use crate::model::CellRef;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(values: &[&str]) -> Vec<String> {
        let mut row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        row.resize(RECURRING_HEADERS.len(), String::new());
        row
    }

    /// A seeded workbook with a set up Recurring sheet holding `rows` from row 2.
    async fn workbook(rows: &[Vec<String>]) -> MemoryWorkbook {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        setup_recurring_sheet(&mut wb).await.unwrap();
        if !rows.is_empty() {
            let range = CellRange::new(2, 1, rows.len() as u32 + 1, RECURRING_HEADERS.len() as u32);
            wb.set(RECURRING, &range, rows).await.unwrap();
        }
        wb
    }

    fn sample_rows() -> Vec<Vec<String>> {
        vec![
            row(&["Paycheck", "2600", "Salary", "Bi-weekly", "2024-01-05"]),
            row(&["Rent", "-1650", "Housing", "Monthly", "2024-01-01"]),
            row(&["Car Insurance", "-720", "Insurance", "Semi-annual", "2024-03-15", "", "Yes"]),
            row(&["Gym", "-45", "Health", "Monthly", "2024-01-10", "", "", "", "Inactive"]),
            row(&["Streaming", "-15.99", "Entertainment", "Monthly", "2024-02-01"]),
            row(&[]),
            row(&["Broken", "lots", "Misc", "Monthly", "2024-01-01"]),
            row(&["Tax Refund", "1200", "Income", "Annual", "2024-04-20"]),
        ]
    }

    #[tokio::test]
    async fn test_setup_recurring_sheet() {
        let mut wb = MemoryWorkbook::new();
        assert!(setup_recurring_sheet(&mut wb).await.unwrap());
        assert_eq!(wb.value(RECURRING, "A1").await.unwrap(), "Description");
        assert_eq!(wb.value(RECURRING, "I1").await.unwrap(), "Status");
        let frequencies = wb
            .validation_for(RECURRING, CellRef::parse("D1001").unwrap())
            .unwrap();
        assert_eq!(frequencies.len(), 5);
        assert_eq!(frequencies[1], "Bi-weekly");
        assert!(wb
            .validation_for(RECURRING, CellRef::parse("D1002").unwrap())
            .is_none());
        assert_eq!(
            wb.validation_for(RECURRING, CellRef::parse("G2").unwrap()),
            Some(&["Yes".to_string(), "No".to_string()][..])
        );
        // A second run only refreshes
        assert!(!setup_recurring_sheet(&mut wb).await.unwrap());
    }

    #[tokio::test]
    async fn test_recurring_items_skips_blank_and_invalid_rows() {
        let mut wb = workbook(&sample_rows()).await;
        let items = recurring_items(&mut wb).await.unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            names,
            vec!["Paycheck", "Rent", "Car Insurance", "Gym", "Streaming", "Tax Refund"]
        );
    }

    #[tokio::test]
    async fn test_recurring_items_without_sheet() {
        let mut wb = MemoryWorkbook::new();
        assert!(recurring_items(&mut wb).await.is_err());
    }

    #[tokio::test]
    async fn test_recurring_items_empty_sheet() {
        let mut wb = workbook(&[]).await;
        assert!(recurring_items(&mut wb).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_next_due_dates() {
        let mut wb = workbook(&sample_rows()).await;
        let updated = update_next_due_dates(&mut wb, date("2024-03-20")).await.unwrap();
        // Gym is inactive
        assert_eq!(updated, 5);
        assert_eq!(wb.value(RECURRING, "H2").await.unwrap(), "2024-03-29");
        assert_eq!(wb.value(RECURRING, "H3").await.unwrap(), "2024-04-01");
        assert_eq!(wb.value(RECURRING, "H4").await.unwrap(), "2024-09-15");
        assert_eq!(wb.value(RECURRING, "H5").await.unwrap(), "");
        assert_eq!(wb.value(RECURRING, "H9").await.unwrap(), "2024-04-20");
    }

    #[tokio::test]
    async fn test_populate_monthly() {
        let mut wb = workbook(&sample_rows()).await;
        let report = populate_monthly(&mut wb, 3, 2024, true).await.unwrap();
        assert_eq!(report.earnings, 1);
        assert_eq!(report.fixed_expenses, 2);
        assert_eq!(report.variable_expenses, 1);
        assert_eq!(report.overflow, 0);

        let earnings = wb.get(MONTHLY, &CellRange::parse("G5:H6").unwrap()).await.unwrap();
        assert_eq!(earnings, vec![vec!["Paycheck", "2600"], vec!["", ""]]);
        let fixed = wb.get(MONTHLY, &CellRange::parse("L5:M7").unwrap()).await.unwrap();
        assert_eq!(
            fixed,
            vec![
                vec!["Rent", "1650"],
                vec!["Car Insurance (semi-annual - split)", "120"],
                vec!["", ""],
            ]
        );
        assert_eq!(wb.value(MONTHLY, "Q5").await.unwrap(), "Streaming");
        assert_eq!(wb.value(MONTHLY, "R5").await.unwrap(), "15.99");
        // Seeded variable rows below were cleared
        assert_eq!(wb.value(MONTHLY, "Q6").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_populate_without_clear_keeps_other_rows() {
        let mut wb = workbook(&sample_rows()).await;
        populate_monthly(&mut wb, 3, 2024, false).await.unwrap();
        assert_eq!(wb.value(MONTHLY, "G5").await.unwrap(), "Paycheck");
        assert_eq!(wb.value(MONTHLY, "G6").await.unwrap(), "Side Project");
    }

    #[tokio::test]
    async fn test_populate_caps_each_block() {
        let rows: Vec<Vec<String>> = (1..=14)
            .map(|i| {
                let name = format!("Bill {i}");
                row(&[name.as_str(), "-10", "Misc", "Monthly", "2024-01-01"])
            })
            .collect();
        let mut wb = workbook(&rows).await;
        let report = populate_monthly(&mut wb, 5, 2024, true).await.unwrap();
        assert_eq!(report.variable_expenses, 12);
        assert_eq!(report.overflow, 2);
        assert_eq!(wb.value(MONTHLY, "Q16").await.unwrap(), "Bill 12");
        assert_eq!(wb.value(MONTHLY, "Q17").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_populate_rejects_bad_month() {
        let mut wb = workbook(&sample_rows()).await;
        assert!(populate_monthly(&mut wb, 13, 2024, true).await.is_err());
        assert!(populate_monthly(&mut wb, 0, 2024, true).await.is_err());
    }

    #[tokio::test]
    async fn test_summary_and_preview() {
        let mut wb = workbook(&sample_rows()).await;
        let summary = recurring_summary(&mut wb, 4, 2024).await.unwrap();
        // Paycheck twice in April counts once as an item; Tax Refund falls due
        assert_eq!(summary.item_count, 4);
        assert_eq!(summary.total_earnings.to_cell_string(), "3800");
        assert_eq!(summary.total_fixed_expenses.to_cell_string(), "1650");
        assert_eq!(summary.total_variable_expenses.to_cell_string(), "15.99");
        assert_eq!(summary.net_amount.to_cell_string(), "2134.01");

        let preview = recurring_preview(&mut wb, 4, 2024).await.unwrap();
        assert_eq!(preview.earnings.len(), 2);
        assert_eq!(preview.fixed_expenses.len(), 1);
        assert_eq!(preview.variable_expenses.len(), 1);
    }
}
