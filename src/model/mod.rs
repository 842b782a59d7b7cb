//! Types that represent the core data model: cell addresses, amounts, color gradients, investment
//! plans and recurring items. Nothing in here touches a workbook.
mod amount;
mod cell_range;
mod color;
mod gradient;
mod plan;
mod recurring;

pub use amount::{Amount, AmountError};
pub use cell_range::{column_letters, column_number, intersects, CellRange, CellRef, RangeError};
pub use color::{ColorScheme, ColorStop, SchemePreset, GREEN_TO_LIGHT_GREEN, RED_TO_YELLOW};
pub use gradient::{compute_colors, compute_stops, median, ColorError, ValueSample};
pub use plan::{
    builtin as builtin_plans, Allocation, AllocationRow, PlanBook, PlanDefinition, PlanError,
    Share, GRAY, PLACEHOLDER, REMAINDER,
};
pub use recurring::{
    classify, format_date, items_due_in_month, month_bounds, next_due_date, parse_date, preview,
    summarize, Frequency, RecurringItem, RecurringPreview, RecurringSummary, Section, Status,
};
