//! The gateway between the budget automation and whatever hosts the workbook.
//!
//! Everything the automation does to a workbook goes through two traits: `CellStore` for cell
//! values and dropdowns, and `ChartHost` for embedded charts and images. The only host shipped
//! here is `MemoryWorkbook`, which keeps the workbook in memory and persists it as JSON.

mod workbook;

pub use workbook::MemoryWorkbook;

use crate::layout::LegendPosition;
use crate::model::{CellRange, CellRef};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Reads and writes cell values on named sheets.
///
/// Values are text, exactly as a user would type them. A read always returns the exact shape of
/// the requested range with empty strings for blank cells.
#[async_trait::async_trait]
pub trait CellStore: Send {
    /// Reads the rows of `range` on `sheet`.
    async fn get(&mut self, sheet: &str, range: &CellRange) -> Result<Vec<Vec<String>>>;

    /// Writes `values` into `range`. The values must have the same shape as the range. Writing an
    /// empty string blanks the cell.
    async fn set(&mut self, sheet: &str, range: &CellRange, values: &[Vec<String>]) -> Result<()>;

    /// Blanks every cell in `range`.
    async fn clear(&mut self, sheet: &str, range: &CellRange) -> Result<()>;

    /// Restricts the cells of `range` to a dropdown of `allowed` values, replacing any earlier
    /// restriction on the same range.
    async fn set_validation(
        &mut self,
        sheet: &str,
        range: &CellRange,
        allowed: &[String],
    ) -> Result<()>;

    /// Creates `sheet` if it does not exist. Returns `true` when it was created.
    async fn ensure_sheet(&mut self, sheet: &str) -> Result<bool>;

    async fn has_sheet(&mut self, sheet: &str) -> Result<bool>;

    /// The last row of `sheet` that holds a value, or zero for an empty sheet.
    async fn last_row(&mut self, sheet: &str) -> Result<u32>;

    /// Reads a single cell given in A1 notation.
    async fn value(&mut self, sheet: &str, address: &str) -> Result<String> {
        let cell = CellRef::parse(address)?;
        let rows = self.get(sheet, &CellRange::from(cell)).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    /// Writes a single cell given in A1 notation.
    async fn set_value(&mut self, sheet: &str, address: &str, value: &str) -> Result<()> {
        let cell = CellRef::parse(address)?;
        self.set(sheet, &CellRange::from(cell), &[vec![value.to_string()]])
            .await
            .with_context(|| format!("Unable to write {sheet}!{address}"))
    }
}

/// Embedded charts and images of a sheet.
#[async_trait::async_trait]
pub trait ChartHost: Send {
    /// Every chart on `sheet`, in insertion order.
    async fn charts(&mut self, sheet: &str) -> Result<Vec<Chart>>;

    /// Adds a chart and returns its new id.
    async fn insert_chart(&mut self, sheet: &str, spec: ChartSpec) -> Result<String>;

    async fn remove_chart(&mut self, sheet: &str, id: &str) -> Result<()>;

    /// Every image on `sheet`, in insertion order.
    async fn images(&mut self, sheet: &str) -> Result<Vec<Image>>;

    /// Moves the image at `index` so that its top-left corner sits on `anchor`.
    async fn anchor_image(&mut self, sheet: &str, index: usize, anchor: CellRef) -> Result<()>;
}

/// Anything that can hold the budget workbook.
pub trait Host: CellStore + ChartHost {}

impl<T> Host for T where T: CellStore + ChartHost {}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Pie,
}

/// What is printed on each pie slice.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceText {
    #[default]
    Percentage,
    Value,
    Label,
    None,
}

serde_plain::derive_display_from_serialize!(SliceText);
serde_plain::derive_fromstr_from_deserialize!(SliceText);

/// Display options of a chart.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub title_centered: bool,
    #[serde(default)]
    pub slice_text: SliceText,
    #[serde(default)]
    pub legend: LegendPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_font_size: Option<u32>,
    /// Slice colors in data row order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_border_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Everything needed to insert a chart.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default)]
    pub chart_type: ChartType,
    /// The data of the chart. The first range drives a pie chart.
    pub ranges: Vec<CellRange>,
    /// The cell the top-left corner of the chart sits on.
    pub anchor: CellRef,
    #[serde(default)]
    pub offset_x: u32,
    #[serde(default)]
    pub offset_y: u32,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartSpec {
    /// A pie chart over `range` at `anchor` with default options.
    pub fn pie(range: CellRange, anchor: CellRef) -> Self {
        Self {
            chart_type: ChartType::Pie,
            ranges: vec![range],
            anchor,
            offset_x: 0,
            offset_y: 0,
            options: ChartOptions::default(),
        }
    }
}

/// A chart that exists on a sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    id: String,
    #[serde(flatten)]
    spec: ChartSpec,
}

impl Chart {
    pub fn new(id: impl Into<String>, spec: ChartSpec) -> Self {
        Self {
            id: id.into(),
            spec,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn first_range(&self) -> Option<&CellRange> {
        self.spec.ranges.first()
    }

    /// True when any of the chart's ranges overlaps `range`.
    pub fn uses(&self, range: &CellRange) -> bool {
        self.spec.ranges.iter().any(|r| r.intersects(range))
    }
}

/// An image placed over the cells of a sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub anchor: CellRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
