use crate::charts::ChartLocation;
use crate::commands::{commit, Out};
use crate::layout::{ChartKind, SourceKind, CHARTS, MONTHLY, SOURCES};
use crate::ranges::{
    chart_range, setup_range_cells, source_range, update_chart_range, update_source_range,
};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

/// One range setting cell of the Monthly sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RangeSetting {
    pub label: String,
    pub cell: String,
    pub value: String,
    pub default: String,
}

/// Lists every chart data range and source range setting.
pub async fn range_show(config: Config) -> Result<Out<Vec<RangeSetting>>> {
    let mut workbook = config.load_workbook().await?;
    let mut settings = Vec::new();
    for chart in CHARTS {
        settings.push(RangeSetting {
            label: chart.label.to_string(),
            cell: chart.data_range_cell.to_string(),
            value: chart_range(&mut workbook, chart.kind).await?,
            default: chart.default_data_range.to_string(),
        });
    }
    for source in SOURCES {
        settings.push(RangeSetting {
            label: source.label.to_string(),
            cell: source.value_cell.to_string(),
            value: source_range(&mut workbook, source.kind).await?,
            default: source.default_range.to_string(),
        });
    }
    let lines: Vec<String> = settings
        .iter()
        .map(|s| format!("{MONTHLY}!{} {}: {}", s.cell, s.label, s.value))
        .collect();
    Ok(Out::new(lines.join("\n"), settings))
}

/// Points a chart at a new data range.
pub async fn range_chart(config: Config, kind: ChartKind, address: &str) -> Result<Out<()>> {
    let mut workbook = config.load_workbook().await?;
    let range = update_chart_range(&mut workbook, kind, address).await?;
    commit(&config, &workbook).await?;
    Ok(format!("The {kind} chart now reads {range}").into())
}

/// Changes the cells whose edits trigger recoloring.
pub async fn range_source(config: Config, kind: SourceKind, address: &str) -> Result<Out<()>> {
    let mut workbook = config.load_workbook().await?;
    let range = update_source_range(&mut workbook, kind, address).await?;
    commit(&config, &workbook).await?;
    Ok(format!("The {kind} range is now {range}").into())
}

/// Restores every range setting to its default.
pub async fn range_reset(config: Config) -> Result<Out<Vec<ChartLocation>>> {
    let mut workbook = config.load_workbook().await?;
    let locations = setup_range_cells(&mut workbook, true).await?;
    commit(&config, &workbook).await?;
    Ok(Out::new("Range settings restored to their defaults", locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CellStore;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_range_show() {
        let env = TestEnv::new().await;
        let out = range_show(env.config()).await.unwrap();
        let settings = out.structure().unwrap();
        assert_eq!(settings.len(), 6);
        assert!(settings.iter().all(|s| s.value == s.default));
        assert!(out.message().contains("Monthly!Y8 Investment Plans Chart: K45:L51"));
    }

    #[tokio::test]
    async fn test_range_update_and_reset() {
        let env = TestEnv::new().await;
        range_chart(env.config(), ChartKind::Earnings, "AB5:AC10")
            .await
            .unwrap();
        let out = range_source(env.config(), SourceKind::FixedExpenses, "L5:M16")
            .await
            .unwrap();
        assert_eq!(out.message(), "The fixed_expenses range is now L5:M16");
        let mut workbook = env.workbook().await;
        assert_eq!(workbook.value(MONTHLY, "Y6").await.unwrap(), "AB5:AC10");
        assert_eq!(workbook.value(MONTHLY, "Y13").await.unwrap(), "L5:M16");

        assert!(range_chart(env.config(), ChartKind::Earnings, "nope")
            .await
            .is_err());

        range_reset(env.config()).await.unwrap();
        let mut workbook = env.workbook().await;
        assert_eq!(workbook.value(MONTHLY, "Y6").await.unwrap(), "AB5:AC24");
        assert_eq!(workbook.value(MONTHLY, "Y13").await.unwrap(), "L5:L16");
    }
}
