//! Commands that work on the Monthly sheet as a whole.

use crate::args::OnOff;
use crate::charts::{debt_to_income_chart, ChartLocation, DebtToIncome};
use crate::commands::{commit, Out};
use crate::debug::set_debug_mode;
use crate::ranges::reset_sheet_setup;
use crate::{Config, Result};

/// Draws the debt-to-income chart from the summary cells.
pub async fn debt_to_income(config: Config) -> Result<Out<DebtToIncome>> {
    let mut workbook = config.load_workbook().await?;
    let dti = debt_to_income_chart(&mut workbook).await?;
    commit(&config, &workbook).await?;
    Ok(Out::new(
        format!(
            "Expenses {} and investable funds {} of {} earnings",
            dti.expenses, dti.investable_funds, dti.earnings
        ),
        dti,
    ))
}

/// Restores the debug controls, the plan dropdown and the range settings. Budget data is kept.
pub async fn reset(config: Config) -> Result<Out<Vec<ChartLocation>>> {
    let mut workbook = config.load_workbook().await?;
    let locations = reset_sheet_setup(&mut workbook, config.plans()).await?;
    commit(&config, &workbook).await?;
    let found = locations.iter().filter(|l| l.chart_id.is_some()).count();
    Ok(Out::new(
        format!(
            "Sheet setup reset, found {found} of {} charts",
            locations.len()
        ),
        locations,
    ))
}

/// Turns debug mode on or off.
pub async fn debug_mode(config: Config, state: OnOff) -> Result<Out<()>> {
    let mut workbook = config.load_workbook().await?;
    set_debug_mode(&mut workbook, state == OnOff::On).await?;
    commit(&config, &workbook).await?;
    Ok(format!("Debug mode is {state}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CellStore, ChartHost};
    use crate::layout::{DEBUG_TOGGLE_CELL, MONTHLY};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_debt_to_income() {
        let env = TestEnv::new().await;
        let out = debt_to_income(env.config()).await.unwrap();
        assert_eq!(
            out.message(),
            "Expenses $2,880.00 and investable funds $2,970.00 of $5,850.00 earnings"
        );
        let mut workbook = env.workbook().await;
        assert_eq!(workbook.value(MONTHLY, "Z2").await.unwrap(), "Expenses");
        assert_eq!(workbook.charts(MONTHLY).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_debug_on_and_off() {
        let env = TestEnv::new().await;
        let out = debug_mode(env.config(), OnOff::On).await.unwrap();
        assert_eq!(out.message(), "Debug mode is on");
        let mut workbook = env.workbook().await;
        assert_eq!(
            workbook.value(MONTHLY, DEBUG_TOGGLE_CELL).await.unwrap(),
            "Enabled"
        );
        assert_eq!(
            workbook.images(MONTHLY).await.unwrap()[0].anchor.to_string(),
            "A100"
        );

        debug_mode(env.config(), OnOff::Off).await.unwrap();
        let mut workbook = env.workbook().await;
        assert_eq!(
            workbook.value(MONTHLY, DEBUG_TOGGLE_CELL).await.unwrap(),
            "Disabled"
        );
    }

    #[tokio::test]
    async fn test_reset() {
        let env = TestEnv::new().await;
        let mut workbook = env.workbook().await;
        workbook.set_value(MONTHLY, "Y6", "garbage").await.unwrap();
        env.set_workbook(&workbook).await;
        let out = reset(env.config()).await.unwrap();
        assert_eq!(out.message(), "Sheet setup reset, found 3 of 3 charts");
        let mut workbook = env.workbook().await;
        assert_eq!(workbook.value(MONTHLY, "Y6").await.unwrap(), "AB5:AC24");
    }
}
