use crate::api::{CellStore, MemoryWorkbook};
use crate::charts::ChartLocation;
use crate::commands::Out;
use crate::layout::{MONTHLY, RECURRING};
use crate::ranges::initialize_budget_system;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::path::Path;

/// Creates the budget directory, its `.backups` subdirectory, `config.json` and the workbook, and
/// then sets up the workbook's controls.
///
/// # Arguments
/// - `budget_home` - The directory that will hold everything, e.g. `$HOME/budget`
/// - `empty` - Start from blank Monthly and Recurring sheets instead of the demo budget.
///
/// # Errors
/// - Returns an error if a workbook already exists in `budget_home`.
/// - Returns an error if any file operations fail.
pub async fn init(budget_home: &Path, empty: bool) -> Result<Out<Vec<ChartLocation>>> {
    if budget_home.join("workbook.json").is_file() {
        bail!(
            "A workbook already exists in {}, refusing to overwrite it",
            budget_home.display()
        );
    }
    let config = Config::create(budget_home)
        .await
        .context("Unable to create the budget directory and config")?;

    let mut workbook = if empty {
        let mut workbook = MemoryWorkbook::new();
        workbook.ensure_sheet(MONTHLY).await?;
        workbook.ensure_sheet(RECURRING).await?;
        workbook
    } else {
        MemoryWorkbook::seeded()?
    };
    let charts = initialize_budget_system(&mut workbook, config.plans()).await?;
    config.save_workbook(&workbook).await?;

    Ok(Out::new(
        format!(
            "Successfully created the budget directory at {}",
            config.root().display()
        ),
        charts,
    ))
}
