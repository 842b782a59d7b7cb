use crate::commands::{commit, Out};
use crate::plans::{investment_plan_chart, select_plan, PlanChartOutcome};
use crate::{Config, Result};

/// Recomputes the investment plan chart from the investable funds, selecting `name` first when
/// given.
pub async fn plan(config: Config, name: Option<&str>) -> Result<Out<PlanChartOutcome>> {
    let mut workbook = config.load_workbook().await?;
    if let Some(name) = name {
        select_plan(&mut workbook, config.plans(), name).await?;
    }
    let outcome = investment_plan_chart(&mut workbook, config.plans()).await?;
    commit(&config, &workbook).await?;

    let message = match &outcome {
        PlanChartOutcome::NoSelection => "No investment plan is selected".to_string(),
        PlanChartOutcome::UnknownPlan { plan } => format!("'{plan}' is not a known plan"),
        PlanChartOutcome::Updated { allocation, .. } => {
            let lines: Vec<String> = allocation
                .rows
                .iter()
                .map(|row| format!("  {}: {}", row.category, row.amount))
                .collect();
            format!(
                "{} for {} investable:\n{}",
                allocation.plan,
                allocation.funds,
                lines.join("\n")
            )
        }
        PlanChartOutcome::NoChart { allocation } => format!(
            "{} allocation written, but there is no chart to show it",
            allocation.plan
        ),
    };
    Ok(Out::new(message, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CellStore;
    use crate::layout::{MONTHLY, PLAN_DROPDOWN_CELL};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_plan_with_name() {
        let env = TestEnv::new().await;
        let out = plan(env.config(), Some("Risktaker Plan")).await.unwrap();
        assert!(out.message().starts_with("Risktaker Plan for $2,970.00 investable:"));
        assert!(matches!(
            out.structure(),
            Some(PlanChartOutcome::Updated { .. })
        ));
        let mut workbook = env.workbook().await;
        assert_eq!(
            workbook.value(MONTHLY, PLAN_DROPDOWN_CELL).await.unwrap(),
            "Risktaker Plan"
        );
        // Risktaker puts 35% into crypto: 1039.50 rounds down to 1000
        assert_eq!(workbook.value(MONTHLY, "K45").await.unwrap(), "Cryptocurrencies");
        assert_eq!(workbook.value(MONTHLY, "L45").await.unwrap(), "1000");
    }

    #[tokio::test]
    async fn test_plan_unknown_name() {
        let env = TestEnv::new().await;
        assert!(plan(env.config(), Some("Nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_plan_without_selection() {
        let env = TestEnv::new().await;
        let mut workbook = env.workbook().await;
        workbook
            .set_value(MONTHLY, PLAN_DROPDOWN_CELL, "")
            .await
            .unwrap();
        env.set_workbook(&workbook).await;
        let out = plan(env.config(), None).await.unwrap();
        assert_eq!(out.structure(), Some(&PlanChartOutcome::NoSelection));
    }
}
