//! Where things live in the budget workbook: sheet names, control cells, chart placement and the
//! columns of the Recurring sheet.

use crate::model::CellRange;
use serde::{Deserialize, Serialize};

/// The sheet that holds the budget, its charts and its controls.
pub const MONTHLY: &str = "Monthly";

/// The sheet that holds recurring income and expense items.
pub const RECURRING: &str = "Recurring";

/// Computed by the workbook: earnings minus expenses.
pub const INVESTABLE_FUNDS_CELL: &str = "O22";

pub const PLAN_DROPDOWN_CELL: &str = "K35";
pub const PLAN_TAGLINE_CELL: &str = "K37";
pub const PLAN_DESCRIPTION_CELL: &str = "K39";

pub const DEBUG_LABEL_CELL: &str = "X4";
pub const DEBUG_LABEL: &str = "Debug Mode:";
pub const DEBUG_TOGGLE_CELL: &str = "Y4";
pub const DEBUG_ENABLED: &str = "Enabled";
pub const DEBUG_DISABLED: &str = "Disabled";
pub const LOG_CELL: &str = "U20";

/// Where the cover image sits while debug mode is off. It hides the control and log cells.
pub const DEBUG_COVER_ANCHOR: &str = "X3";
/// Where the cover image is parked while debug mode is on.
pub const DEBUG_PARKED_ANCHOR: &str = "A100";

/// Debt-to-income summary cells: estimated earnings, expenses, investable funds and the ratio.
pub const DTI_EARNINGS_CELL: &str = "F18";
pub const DTI_EXPENSES_CELL: &str = "F19";
pub const DTI_INVESTABLE_CELL: &str = "F20";
pub const DTI_RATIO_CELL: &str = "F21";
pub const DTI_TABLE_RANGE: &str = "Z1:AA3";
pub const DTI_CHART_ROW: u32 = 5;
pub const DTI_CHART_COL: u32 = 25;
pub const DTI_TITLE: &str = "Income Allocation";
pub const DTI_COLORS: [&str; 2] = ["#ff6b6b", "#4ecdc4"];

/// A chart reads `(label, amount)` pairs, so a data range may be at most this many columns wide.
pub const MAX_CHART_COLS: u32 = 2;
pub const MAX_CHART_ROWS: u32 = 1000;

/// Slice borders on every pie chart.
pub const SLICE_BORDER_COLOR: &str = "white";
pub const SLICE_BORDER_WIDTH: u32 = 2;

/// The three charts the automation maintains.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Earnings,
    Expenses,
    InvestmentPlans,
}

serde_plain::derive_display_from_serialize!(ChartKind);
serde_plain::derive_fromstr_from_deserialize!(ChartKind);

/// The legend placement of a chart.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    #[default]
    Auto,
    Bottom,
    Right,
    None,
}

serde_plain::derive_display_from_serialize!(LegendPosition);
serde_plain::derive_fromstr_from_deserialize!(LegendPosition);

/// Fixed settings for one of the maintained charts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ChartLayout {
    pub kind: ChartKind,
    pub label: &'static str,
    pub label_cell: &'static str,
    /// Holds the A1 address of the chart's data, editable by the user.
    pub data_range_cell: &'static str,
    pub default_data_range: &'static str,
    pub anchor: &'static str,
    pub width: u32,
    pub height: u32,
    pub legend: LegendPosition,
    pub font_size: u32,
}

pub const EARNINGS_CHART: ChartLayout = ChartLayout {
    kind: ChartKind::Earnings,
    label: "Earnings Chart",
    label_cell: "X6",
    data_range_cell: "Y6",
    default_data_range: "AB5:AC24",
    anchor: "C19",
    width: 377,
    height: 210,
    legend: LegendPosition::Auto,
    font_size: 10,
};

pub const EXPENSES_CHART: ChartLayout = ChartLayout {
    kind: ChartKind::Expenses,
    label: "Expenses Chart",
    label_cell: "X7",
    data_range_cell: "Y7",
    default_data_range: "AE5:AF24",
    anchor: "H19",
    width: 377,
    height: 210,
    legend: LegendPosition::Auto,
    font_size: 10,
};

pub const INVESTMENT_PLANS_CHART: ChartLayout = ChartLayout {
    kind: ChartKind::InvestmentPlans,
    label: "Investment Plans Chart",
    label_cell: "X8",
    data_range_cell: "Y8",
    default_data_range: "K45:L51",
    anchor: "D37",
    width: 402,
    height: 350,
    legend: LegendPosition::Bottom,
    font_size: 12,
};

pub const CHARTS: [ChartLayout; 3] = [EARNINGS_CHART, EXPENSES_CHART, INVESTMENT_PLANS_CHART];

impl ChartKind {
    pub fn layout(&self) -> &'static ChartLayout {
        match self {
            ChartKind::Earnings => &EARNINGS_CHART,
            ChartKind::Expenses => &EXPENSES_CHART,
            ChartKind::InvestmentPlans => &INVESTMENT_PLANS_CHART,
        }
    }
}

/// The blocks of the Monthly sheet whose edits trigger recomputation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Earnings,
    FixedExpenses,
    VariableExpenses,
}

serde_plain::derive_display_from_serialize!(SourceKind);
serde_plain::derive_fromstr_from_deserialize!(SourceKind);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SourceRangeLayout {
    pub kind: SourceKind,
    pub label: &'static str,
    pub label_cell: &'static str,
    /// Holds the A1 address of the source range, editable by the user.
    pub value_cell: &'static str,
    pub default_range: &'static str,
}

pub const EARNINGS_SOURCE: SourceRangeLayout = SourceRangeLayout {
    kind: SourceKind::Earnings,
    label: "Earnings Range",
    label_cell: "X12",
    value_cell: "Y12",
    default_range: "G5:G16",
};

pub const FIXED_EXPENSES_SOURCE: SourceRangeLayout = SourceRangeLayout {
    kind: SourceKind::FixedExpenses,
    label: "Fixed Expenses",
    label_cell: "X13",
    value_cell: "Y13",
    default_range: "L5:L16",
};

pub const VARIABLE_EXPENSES_SOURCE: SourceRangeLayout = SourceRangeLayout {
    kind: SourceKind::VariableExpenses,
    label: "Variable Expenses",
    label_cell: "X14",
    value_cell: "Y14",
    default_range: "Q5:Q16",
};

pub const SOURCES: [SourceRangeLayout; 3] =
    [EARNINGS_SOURCE, FIXED_EXPENSES_SOURCE, VARIABLE_EXPENSES_SOURCE];

impl SourceKind {
    pub fn layout(&self) -> &'static SourceRangeLayout {
        match self {
            SourceKind::Earnings => &EARNINGS_SOURCE,
            SourceKind::FixedExpenses => &FIXED_EXPENSES_SOURCE,
            SourceKind::VariableExpenses => &VARIABLE_EXPENSES_SOURCE,
        }
    }
}

/// A block on the Monthly sheet that recurring items are written into: description in the first
/// column and amount in the second.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MonthlyBlock {
    pub description_col: &'static str,
    pub amount_col: &'static str,
}

impl MonthlyBlock {
    /// The description and amount columns over the block's rows.
    pub fn range(&self) -> String {
        format!(
            "{}{}:{}{}",
            self.description_col, BLOCK_FIRST_ROW, self.amount_col, BLOCK_LAST_ROW
        )
    }
}

pub const BLOCK_FIRST_ROW: u32 = 5;
pub const BLOCK_LAST_ROW: u32 = 16;
pub const BLOCK_ROWS: usize = (BLOCK_LAST_ROW - BLOCK_FIRST_ROW + 1) as usize;

pub const EARNINGS_BLOCK: MonthlyBlock = MonthlyBlock {
    description_col: "G",
    amount_col: "H",
};
pub const FIXED_EXPENSES_BLOCK: MonthlyBlock = MonthlyBlock {
    description_col: "L",
    amount_col: "M",
};
pub const VARIABLE_EXPENSES_BLOCK: MonthlyBlock = MonthlyBlock {
    description_col: "Q",
    amount_col: "R",
};

/// Columns of the Recurring sheet, in order.
pub const RECURRING_HEADERS: [&str; 9] = [
    "Description",
    "Amount",
    "Category",
    "Frequency",
    "Start Date",
    "End Date",
    "Split Amount",
    "Next Due",
    "Status",
];
pub const RECURRING_HEADER_ROW: u32 = 1;
pub const RECURRING_FIRST_DATA_ROW: u32 = 2;
/// How many rows the Recurring sheet dropdowns cover.
pub const RECURRING_VALIDATION_ROWS: u32 = 1000;
pub const RECURRING_FREQUENCY_COL: &str = "D";
pub const RECURRING_SPLIT_COL: &str = "G";
pub const RECURRING_NEXT_DUE_COL: &str = "H";
pub const RECURRING_STATUS_COL: &str = "I";

pub const FIXED_EXPENSE_CATEGORIES: [&str; 5] = [
    "Housing",
    "Utilities",
    "Insurance",
    "Subscriptions",
    "Transportation",
];

/// A whole-column range of the Recurring sheet covering the validated rows.
pub fn recurring_column(col: &str) -> String {
    format!(
        "{col}{}:{col}{}",
        RECURRING_FIRST_DATA_ROW,
        RECURRING_FIRST_DATA_ROW + RECURRING_VALIDATION_ROWS - 1
    )
}

/// Parses one of the fixed addresses above.
pub(crate) fn fixed_range(address: &str) -> crate::Result<CellRange> {
    CellRange::parse(address)
        .map_err(|e| anyhow::anyhow!("Built-in address '{address}' does not parse: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_addresses_parse() {
        let cells = [
            INVESTABLE_FUNDS_CELL,
            PLAN_DROPDOWN_CELL,
            PLAN_TAGLINE_CELL,
            PLAN_DESCRIPTION_CELL,
            DEBUG_LABEL_CELL,
            DEBUG_TOGGLE_CELL,
            LOG_CELL,
            DEBUG_COVER_ANCHOR,
            DEBUG_PARKED_ANCHOR,
            DTI_EARNINGS_CELL,
            DTI_EXPENSES_CELL,
            DTI_INVESTABLE_CELL,
            DTI_RATIO_CELL,
            DTI_TABLE_RANGE,
        ];
        for cell in cells {
            assert!(CellRange::parse(cell).is_ok(), "{cell}");
        }
        for chart in CHARTS {
            for cell in [
                chart.label_cell,
                chart.data_range_cell,
                chart.default_data_range,
                chart.anchor,
            ] {
                assert!(CellRange::parse(cell).is_ok(), "{cell}");
            }
        }
        for source in SOURCES {
            for cell in [source.label_cell, source.value_cell, source.default_range] {
                assert!(CellRange::parse(cell).is_ok(), "{cell}");
            }
        }
        for block in [EARNINGS_BLOCK, FIXED_EXPENSES_BLOCK, VARIABLE_EXPENSES_BLOCK] {
            assert!(CellRange::parse(&block.range()).is_ok());
        }
    }

    #[test]
    fn test_blocks_and_columns() {
        assert_eq!(EARNINGS_BLOCK.range(), "G5:H16");
        assert_eq!(BLOCK_ROWS, 12);
        assert_eq!(recurring_column(RECURRING_FREQUENCY_COL), "D2:D1001");
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(ChartKind::Expenses.layout().data_range_cell, "Y7");
        assert_eq!(SourceKind::VariableExpenses.layout().default_range, "Q5:Q16");
        assert_eq!(ChartKind::InvestmentPlans.to_string(), "investment_plans");
    }
}
