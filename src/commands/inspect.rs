//! Read-only commands that expose the coloring and range overlap logic.

use crate::api::CellStore;
use crate::args::{ColorsArgs, IntersectsArgs};
use crate::charts::samples;
use crate::commands::{plural, Out};
use crate::model::{compute_colors, CellRange};
use crate::{Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One colored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceColor {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// Computes the gradient colors for a block of `(label, value)` rows in the workbook. Rows without
/// a label or a positive amount are left out, as they are when a chart is recolored.
pub async fn colors(config: Config, args: ColorsArgs) -> Result<Out<Vec<SliceColor>>> {
    let range = CellRange::parse(args.range())
        .with_context(|| format!("Unable to read colors from '{}'", args.range()))?;
    let scheme = match args.scheme() {
        Some(preset) => preset.scheme(),
        None => config.expenses_scheme(),
    };
    let mut workbook = config.load_workbook().await?;
    let rows = workbook.get(args.sheet(), &range).await?;

    let valid: Vec<_> = samples(&rows).into_iter().filter(|s| s.is_valid()).collect();
    let colors = compute_colors(&valid, &scheme)
        .with_context(|| format!("Unable to color {}!{range}", args.sheet()))?;
    let slices: Vec<SliceColor> = valid
        .into_iter()
        .zip(colors)
        .map(|(sample, color)| SliceColor {
            label: sample.label,
            value: sample.value,
            color,
        })
        .collect();

    let lines: Vec<String> = slices
        .iter()
        .map(|s| format!("{} {} ({})", s.color, s.label, s.value))
        .collect();
    Ok(Out::new(
        format!("{}:\n{}", plural(slices.len(), "color"), lines.join("\n")),
        slices,
    ))
}

/// Reports whether two ranges overlap.
pub async fn intersects(args: IntersectsArgs) -> Result<Out<bool>> {
    let a = CellRange::parse(args.a()).context("Unable to parse the first range")?;
    let b = CellRange::parse(args.b()).context("Unable to parse the second range")?;
    let overlap = a.intersects(&b);
    let message = if overlap {
        format!("{a} and {b} intersect")
    } else {
        format!("{a} and {b} do not intersect")
    };
    Ok(Out::new(message, overlap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MONTHLY;
    use crate::model::SchemePreset;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_colors_for_earnings() {
        let env = TestEnv::new().await;
        let args = ColorsArgs::new("AB5:AC24", Some(SchemePreset::GreenToLightGreen), MONTHLY);
        let out = colors(env.config(), args).await.unwrap();
        let slices = out.structure().unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Salary");
        assert_eq!(slices[0].color, "#32cd32");
        assert_eq!(slices[1].color, "#adff2f");
        assert!(out.message().starts_with("2 colors:"));
    }

    #[tokio::test]
    async fn test_colors_default_scheme() {
        let env = TestEnv::new().await;
        let args = ColorsArgs::new("AE5:AF12", None, MONTHLY);
        let out = colors(env.config(), args).await.unwrap();
        let slices = out.structure().unwrap();
        assert_eq!(slices.len(), 8);
        assert_eq!(slices[3].color, "#ffffcc");
    }

    #[tokio::test]
    async fn test_colors_empty_block_fails() {
        let env = TestEnv::new().await;
        let args = ColorsArgs::new("A1:B3", None, MONTHLY);
        assert!(colors(env.config(), args).await.is_err());
    }

    #[tokio::test]
    async fn test_intersects() {
        let out = intersects(IntersectsArgs::new("G5:G16", "G16")).await.unwrap();
        assert_eq!(out.structure(), Some(&true));
        assert_eq!(out.message(), "G5:G16 and G16 intersect");

        let out = intersects(IntersectsArgs::new("G5:G16", "G17")).await.unwrap();
        assert_eq!(out.structure(), Some(&false));

        assert!(intersects(IntersectsArgs::new("G5:", "G17")).await.is_err());
    }
}
