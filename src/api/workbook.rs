//! Implements `CellStore` and `ChartHost` over an in-memory workbook that is saved as JSON.
//!
//! There is no formula engine. A cell holds exactly the text that was written to it, so totals
//! such as the investable funds are whatever the last writer put there.

use crate::api::{CellStore, Chart, ChartHost, ChartOptions, ChartSpec, Image, SliceText};
use crate::layout;
use crate::model::{builtin_plans, CellRange, CellRef};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use tracing::trace;
use uuid::Uuid;

/// A workbook of named sheets held in memory.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MemoryWorkbook {
    sheets: BTreeMap<String, SheetData>,
}

/// The contents of one sheet.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct SheetData {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    cells: BTreeMap<CellRef, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    validations: Vec<Validation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    charts: Vec<Chart>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<Image>,
}

/// A dropdown restriction on a range of cells.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct Validation {
    range: CellRange,
    allowed: Vec<String>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a workbook from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .with_context(|| format!("Unable to load the workbook from {}", path.display()))
    }

    /// Writes the workbook to a JSON file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Unable to serialize workbook")?;
        utils::write(path, json).await
    }

    /// A demo budget: a filled-in Monthly sheet with its charts, controls and debug cover image,
    /// and an empty Recurring sheet.
    pub fn seeded() -> Result<Self> {
        let mut workbook = Self::new();
        let monthly = workbook.sheets.entry(layout::MONTHLY.to_string()).or_default();
        for seed in load_seed(MONTHLY_SEED)? {
            monthly.cells.insert(seed.address, seed.value);
        }
        monthly.validations.push(Validation {
            range: layout::fixed_range(layout::DEBUG_TOGGLE_CELL)?,
            allowed: vec![
                layout::DEBUG_ENABLED.to_string(),
                layout::DEBUG_DISABLED.to_string(),
            ],
        });
        monthly.validations.push(Validation {
            range: layout::fixed_range(layout::PLAN_DROPDOWN_CELL)?,
            allowed: builtin_plans().names(),
        });
        for chart in layout::CHARTS {
            let range = layout::fixed_range(chart.default_data_range)?;
            let anchor = CellRef::parse(chart.anchor)?;
            let mut spec = ChartSpec::pie(range, anchor);
            spec.options = ChartOptions {
                title: Some(chart.label.to_string()),
                slice_text: SliceText::Value,
                legend: chart.legend,
                width: Some(chart.width),
                height: Some(chart.height),
                ..ChartOptions::default()
            };
            monthly.charts.push(Chart::new(new_chart_id(), spec));
        }
        monthly.images.push(Image {
            anchor: CellRef::parse(layout::DEBUG_COVER_ANCHOR)?,
            description: Some("Debug cover".to_string()),
        });
        workbook
            .sheets
            .entry(layout::RECURRING.to_string())
            .or_default();
        Ok(workbook)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    /// The dropdown values `cell` is restricted to, if any.
    pub fn validation_for(&self, sheet: &str, cell: CellRef) -> Option<&[String]> {
        self.sheets.get(sheet)?.validations.iter().rev().find_map(|v| {
            if v.range.contains(cell) {
                Some(v.allowed.as_slice())
            } else {
                None
            }
        })
    }

    /// Writes a value the way a person editing the sheet would: a value outside the cell's dropdown
    /// is rejected. Blanking a cell is always allowed.
    pub fn edit(&mut self, sheet: &str, cell: CellRef, value: &str) -> Result<()> {
        if !value.is_empty() {
            if let Some(allowed) = self.validation_for(sheet, cell) {
                ensure!(
                    allowed.iter().any(|a| a == value),
                    "'{value}' is not allowed in {sheet}!{cell}, choose one of: {}",
                    allowed.join(", ")
                );
            }
        }
        let data = self.sheet_mut(sheet)?;
        write_cell(data, cell, value);
        Ok(())
    }

    fn sheet(&self, sheet: &str) -> Result<&SheetData> {
        self.sheets
            .get(sheet)
            .with_context(|| format!("Sheet \"{sheet}\" not found"))
    }

    fn sheet_mut(&mut self, sheet: &str) -> Result<&mut SheetData> {
        self.sheets
            .get_mut(sheet)
            .with_context(|| format!("Sheet \"{sheet}\" not found"))
    }
}

fn write_cell(data: &mut SheetData, cell: CellRef, value: &str) {
    if value.is_empty() {
        data.cells.remove(&cell);
    } else {
        data.cells.insert(cell, value.to_string());
    }
}

fn new_chart_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait::async_trait]
impl CellStore for MemoryWorkbook {
    async fn get(&mut self, sheet: &str, range: &CellRange) -> Result<Vec<Vec<String>>> {
        trace!("get {sheet}!{range}");
        let data = self.sheet(sheet)?;
        Ok((range.start_row()..=range.end_row())
            .map(|row| {
                (range.start_col()..=range.end_col())
                    .map(|col| {
                        data.cells
                            .get(&CellRef::new(row, col))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect())
    }

    async fn set(&mut self, sheet: &str, range: &CellRange, values: &[Vec<String>]) -> Result<()> {
        trace!("set {sheet}!{range}");
        ensure!(
            values.len() == range.rows() as usize
                && values.iter().all(|row| row.len() == range.cols() as usize),
            "The values do not fit {range}: expected {} rows of {} columns",
            range.rows(),
            range.cols()
        );
        let data = self.sheet_mut(sheet)?;
        for (row, row_values) in (range.start_row()..).zip(values) {
            for (col, value) in (range.start_col()..).zip(row_values) {
                write_cell(data, CellRef::new(row, col), value);
            }
        }
        Ok(())
    }

    async fn clear(&mut self, sheet: &str, range: &CellRange) -> Result<()> {
        trace!("clear {sheet}!{range}");
        let data = self.sheet_mut(sheet)?;
        data.cells.retain(|cell, _| !range.contains(*cell));
        Ok(())
    }

    async fn set_validation(
        &mut self,
        sheet: &str,
        range: &CellRange,
        allowed: &[String],
    ) -> Result<()> {
        let data = self.sheet_mut(sheet)?;
        data.validations.retain(|v| v.range != *range);
        data.validations.push(Validation {
            range: *range,
            allowed: allowed.to_vec(),
        });
        Ok(())
    }

    async fn ensure_sheet(&mut self, sheet: &str) -> Result<bool> {
        if self.sheets.contains_key(sheet) {
            return Ok(false);
        }
        self.sheets.insert(sheet.to_string(), SheetData::default());
        Ok(true)
    }

    async fn has_sheet(&mut self, sheet: &str) -> Result<bool> {
        Ok(self.sheets.contains_key(sheet))
    }

    async fn last_row(&mut self, sheet: &str) -> Result<u32> {
        let data = self.sheet(sheet)?;
        Ok(data.cells.keys().map(CellRef::row).max().unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl ChartHost for MemoryWorkbook {
    async fn charts(&mut self, sheet: &str) -> Result<Vec<Chart>> {
        Ok(self.sheet(sheet)?.charts.clone())
    }

    async fn insert_chart(&mut self, sheet: &str, spec: ChartSpec) -> Result<String> {
        ensure!(!spec.ranges.is_empty(), "A chart needs at least one data range");
        let data = self.sheet_mut(sheet)?;
        let id = new_chart_id();
        trace!("insert chart {id} on {sheet}");
        data.charts.push(Chart::new(id.clone(), spec));
        Ok(id)
    }

    async fn remove_chart(&mut self, sheet: &str, id: &str) -> Result<()> {
        let data = self.sheet_mut(sheet)?;
        let before = data.charts.len();
        data.charts.retain(|c| c.id() != id);
        if data.charts.len() == before {
            bail!("Chart '{id}' not found on sheet \"{sheet}\"");
        }
        Ok(())
    }

    async fn images(&mut self, sheet: &str) -> Result<Vec<Image>> {
        Ok(self.sheet(sheet)?.images.clone())
    }

    async fn anchor_image(&mut self, sheet: &str, index: usize, anchor: CellRef) -> Result<()> {
        let data = self.sheet_mut(sheet)?;
        let image = data
            .images
            .get_mut(index)
            .with_context(|| format!("Image {index} not found on sheet \"{sheet}\""))?;
        image.anchor = anchor;
        Ok(())
    }
}

/// One seeded cell.
#[derive(Debug, Deserialize)]
struct SeedCell {
    address: CellRef,
    value: String,
}

/// Loads `address,value` records from a CSV-formatted string.
fn load_seed(csv_data: &str) -> Result<Vec<SeedCell>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));
    let mut cells = Vec::new();
    for result in rdr.deserialize() {
        let cell: SeedCell = result.context("Bad seed record")?;
        cells.push(cell);
    }
    Ok(cells)
}

/// Seed data for the Monthly sheet.
const MONTHLY_SEED: &str = r##"address,value
G4,Earnings
H4,Amount
G5,Salary
H5,5200
G6,Side Project
H6,650
L4,Fixed Expenses
M4,Amount
L5,Rent
M5,1650
L6,Electric
M6,95
L7,Internet
M7,70
L8,Car Insurance
M8,120
L9,Streaming
M9,25
Q4,Variable Expenses
R4,Amount
Q5,Groceries
R5,480
Q6,Dining Out
R6,210
Q7,Gas
R7,140
Q8,Entertainment
R8,90
C18,Estimated Earnings
F18,5850
C19,Estimated Expenses
F19,-2880
C20,Investable Funds
F20,2970
C21,Debt-to-Income
F21,0.49
N22,Investable Funds
O22,2970
J35,Investment Plan
K35,Conservative Plan
X4,Debug Mode:
Y4,Disabled
X6,Earnings Chart
Y6,AB5:AC24
X7,Expenses Chart
Y7,AE5:AF24
X8,Investment Plans Chart
Y8,K45:L51
X12,Earnings Range
Y12,G5:G16
X13,Fixed Expenses
Y13,L5:L16
X14,Variable Expenses
Y14,Q5:Q16
AB4,Earnings
AC4,Amount
AB5,Salary
AC5,5200
AB6,Side Project
AC6,650
AE4,Category
AF4,Amount
AE5,Housing
AF5,1650
AE6,Utilities
AF6,165
AE7,Insurance
AF7,120
AE8,Subscriptions
AF8,25
AE9,Groceries
AF9,480
AE10,Dining Out
AF10,210
AE11,Transportation
AF11,140
AE12,Entertainment
AF12,90
"##;
