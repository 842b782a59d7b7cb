//! These structs provide the CLI interface for the budget CLI.

use crate::layout::{ChartKind, SourceKind, MONTHLY};
use crate::model::SchemePreset;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// budget: Automation for a personal budgeting workbook.
///
/// The workbook lives in `$BUDGET_HOME/workbook.json`. Edits made through this program are
/// dispatched the way a spreadsheet would react to them: charts are recolored when budget data
/// changes and the investment plan chart follows the selected plan and the investable funds.
/// Recurring income and expenses can be kept on their own sheet and written into any month.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the budget directory, its configuration and a workbook.
    ///
    /// By default the workbook is seeded with a demo budget: earnings, fixed and variable
    /// expenses, charts and controls. Pass --empty to start from blank sheets.
    Init(InitArgs),
    /// Write a value into a cell and run whatever the edit triggers.
    Edit(EditArgs),
    /// Print the gradient colors for a block of (label, value) rows.
    Colors(ColorsArgs),
    /// Print whether two A1 ranges overlap.
    Intersects(IntersectsArgs),
    /// Recompute the investment plan chart, optionally choosing a plan first.
    Plan(PlanArgs),
    /// Work with the Recurring sheet.
    Recurring(RecurringArgs),
    /// Show or change the chart data ranges and the source ranges.
    Range(RangeArgs),
    /// Draw the debt-to-income chart.
    DebtToIncome,
    /// Put the debug controls, plan dropdown and range settings back to their defaults.
    Reset,
    /// Turn debug mode on or off.
    Debug(DebugArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the workbook and configuration are held. Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// Args for the `budget init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Start with blank sheets instead of the demo budget.
    #[arg(long)]
    empty: bool,
}

impl InitArgs {
    pub fn new(empty: bool) -> Self {
        Self { empty }
    }

    pub fn empty(&self) -> bool {
        self.empty
    }
}

/// Args for the `budget edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The cell to write, e.g. H5.
    address: String,

    /// The new value. An empty string blanks the cell.
    value: String,

    /// The sheet the cell is on.
    #[arg(long, default_value = MONTHLY)]
    sheet: String,
}

impl EditArgs {
    pub fn new(
        address: impl Into<String>,
        value: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
            sheet: sheet.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

/// Args for the `budget colors` command.
#[derive(Debug, Parser, Clone)]
pub struct ColorsArgs {
    /// The rows to color: labels in the first column, values in the second, e.g. AE5:AF24.
    range: String,

    /// The color scheme, red-to-yellow or green-to-light-green. Defaults to the expenses scheme
    /// from the configuration.
    #[arg(long)]
    scheme: Option<SchemePreset>,

    /// The sheet the rows are on.
    #[arg(long, default_value = MONTHLY)]
    sheet: String,
}

impl ColorsArgs {
    pub fn new(
        range: impl Into<String>,
        scheme: Option<SchemePreset>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            range: range.into(),
            scheme,
            sheet: sheet.into(),
        }
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn scheme(&self) -> Option<SchemePreset> {
        self.scheme
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

/// Args for the `budget intersects` command.
#[derive(Debug, Parser, Clone)]
pub struct IntersectsArgs {
    a: String,
    b: String,
}

impl IntersectsArgs {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn a(&self) -> &str {
        &self.a
    }

    pub fn b(&self) -> &str {
        &self.b
    }
}

/// Args for the `budget plan` command.
#[derive(Debug, Parser, Clone)]
pub struct PlanArgs {
    /// Select this plan before recomputing, e.g. "Family Plan".
    #[arg(long)]
    name: Option<String>,
}

impl PlanArgs {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Args for the `budget recurring` command.
#[derive(Debug, Parser, Clone)]
pub struct RecurringArgs {
    #[command(subcommand)]
    command: RecurringSubcommand,
}

impl RecurringArgs {
    pub fn new(command: RecurringSubcommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &RecurringSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurringSubcommand {
    /// Create the Recurring sheet with its headers and dropdowns.
    Setup,
    /// Write the items due in a month into the Monthly sheet.
    Populate(PopulateArgs),
    /// Show the items due in a month grouped by section.
    Preview(MonthArgs),
    /// Show the totals of the items due in a month.
    Summary(MonthArgs),
    /// Fill in the Next Due column for every active item.
    UpdateDue(UpdateDueArgs),
}

/// A month of a year. Both default to the current month.
#[derive(Debug, Parser, Clone, Default)]
pub struct MonthArgs {
    /// The month, 1 to 12.
    #[arg(long)]
    month: Option<u32>,

    #[arg(long)]
    year: Option<i32>,
}

impl MonthArgs {
    pub fn new(month: Option<u32>, year: Option<i32>) -> Self {
        Self { month, year }
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Args for the `budget recurring populate` command.
#[derive(Debug, Parser, Clone)]
pub struct PopulateArgs {
    #[clap(flatten)]
    month: MonthArgs,

    /// Blank the earnings and expense blocks before writing.
    #[arg(long)]
    clear: bool,
}

impl PopulateArgs {
    pub fn new(month: MonthArgs, clear: bool) -> Self {
        Self { month, clear }
    }

    pub fn month(&self) -> &MonthArgs {
        &self.month
    }

    pub fn clear(&self) -> bool {
        self.clear
    }
}

/// Args for the `budget recurring update-due` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateDueArgs {
    /// Compute due dates after this day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<NaiveDate>,
}

impl UpdateDueArgs {
    pub fn new(today: Option<NaiveDate>) -> Self {
        Self { today }
    }

    pub fn today(&self) -> Option<NaiveDate> {
        self.today
    }
}

/// Args for the `budget range` command.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    #[command(subcommand)]
    command: RangeSubcommand,
}

impl RangeArgs {
    pub fn new(command: RangeSubcommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &RangeSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RangeSubcommand {
    /// Print every range setting.
    Show,
    /// Set the data range of a chart: earnings, expenses or investment_plans.
    Chart { kind: ChartKind, address: String },
    /// Set a source range: earnings, fixed_expenses or variable_expenses.
    Source { kind: SourceKind, address: String },
    /// Restore every range setting to its default.
    Reset,
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnOff {
    On,
    #[default]
    Off,
}

serde_plain::derive_display_from_serialize!(OnOff);
serde_plain::derive_fromstr_from_deserialize!(OnOff);

/// Args for the `budget debug` command.
#[derive(Debug, Parser, Clone)]
pub struct DebugArgs {
    /// "on" or "off"
    state: OnOff,
}

impl DebugArgs {
    pub fn new(state: OnOff) -> Self {
        Self { state }
    }

    pub fn state(&self) -> OnOff {
        self.state
    }
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("budget")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
