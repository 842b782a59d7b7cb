//! Recurring income and expense items, and the date arithmetic for when they fall due.

use crate::model::Amount;
use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a recurring item repeats.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Weekly,
    #[serde(rename = "Bi-weekly")]
    BiWeekly,
    Monthly,
    #[serde(rename = "Semi-annual")]
    SemiAnnual,
    Annual,
}

serde_plain::derive_display_from_serialize!(Frequency);
serde_plain::derive_fromstr_from_deserialize!(Frequency);

enum Step {
    Days(u64),
    Months(u32),
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Weekly,
        Frequency::BiWeekly,
        Frequency::Monthly,
        Frequency::SemiAnnual,
        Frequency::Annual,
    ];

    fn step(&self) -> Step {
        match self {
            Frequency::Weekly => Step::Days(7),
            Frequency::BiWeekly => Step::Days(14),
            Frequency::Monthly => Step::Months(1),
            Frequency::SemiAnnual => Step::Months(6),
            Frequency::Annual => Step::Months(12),
        }
    }

    /// The number of months a split amount is spread across, for frequencies that are split.
    pub fn split_months(&self) -> Option<u32> {
        match self {
            Frequency::SemiAnnual => Some(6),
            Frequency::Annual => Some(12),
            _ => None,
        }
    }

    /// The `n`th occurrence counted from `start` (the 0th occurrence is `start` itself).
    ///
    /// Month steps are computed from `start` each time, so an item starting on the 31st lands on
    /// the last day of shorter months without drifting earlier in later months.
    pub fn occurrence(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self.step() {
            Step::Days(days) => start.checked_add_days(Days::new(days * u64::from(n))),
            Step::Months(months) => start.checked_add_months(Months::new(months.checked_mul(n)?)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

serde_plain::derive_display_from_serialize!(Status);
serde_plain::derive_fromstr_from_deserialize!(Status);

/// One row of the Recurring sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub description: String,
    /// Positive for income, negative for expenses.
    pub amount: Amount,
    pub category: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Spread semi-annual and annual amounts evenly across the months of their period.
    pub split_amount: bool,
    pub next_due: Option<NaiveDate>,
    pub status: Status,
}

impl RecurringItem {
    /// Parses a sheet row laid out as Description, Amount, Category, Frequency, Start Date,
    /// End Date, Split Amount, Next Due, Status. Missing trailing cells count as empty.
    ///
    /// # Errors
    /// Returns every validation problem found in the row.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, Vec<String>> {
        let cell = |ix: usize| row.get(ix).map(|s| s.as_ref().trim()).unwrap_or("");
        let mut errors = Vec::new();

        let description = cell(0);
        if description.is_empty() {
            errors.push("Description is required".to_string());
        }

        let amount = cell(1).parse::<Amount>().ok();
        if amount.is_none() {
            errors.push("Amount must be a valid number".to_string());
        }

        let frequency = match cell(3) {
            "" => {
                errors.push("Frequency is required".to_string());
                None
            }
            s => match s.parse::<Frequency>() {
                Ok(f) => Some(f),
                Err(_) => {
                    errors.push(format!("Unknown frequency: {s}"));
                    None
                }
            },
        };

        let start_date = match cell(4) {
            "" => {
                errors.push("Start date is required".to_string());
                None
            }
            s => {
                let parsed = parse_date(s);
                if parsed.is_none() {
                    errors.push(format!("Start date '{s}' is not a date"));
                }
                parsed
            }
        };

        let end_date = match cell(5) {
            "" => None,
            s => {
                let parsed = parse_date(s);
                if parsed.is_none() {
                    errors.push(format!("End date '{s}' is not a date"));
                }
                parsed
            }
        };

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end <= start {
                errors.push("End date must be after start date".to_string());
            }
        }

        let status = match cell(8) {
            "" => Status::Active,
            s => s.parse::<Status>().unwrap_or_else(|_| {
                errors.push(format!("Unknown status: {s}"));
                Status::Inactive
            }),
        };

        match (amount, frequency, start_date) {
            (Some(amount), Some(frequency), Some(start_date)) if errors.is_empty() => Ok(Self {
                description: description.to_string(),
                amount,
                category: cell(2).to_string(),
                frequency,
                start_date,
                end_date,
                split_amount: parse_yes_no(cell(6)),
                next_due: parse_date(cell(7)),
                status,
            }),
            _ => Err(errors),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// The first occurrence strictly after `today`.
    pub fn next_due_after(&self, today: NaiveDate) -> Option<NaiveDate> {
        next_due_date(self.start_date, self.frequency, today)
    }

    /// True when the item is active and has an occurrence within `month` (1-12) of `year` that is
    /// not after its end date.
    pub fn is_due_in(&self, month: u32, year: i32) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some((first, last)) = month_bounds(month, year) else {
            return false;
        };
        let last = match self.end_date {
            Some(end) if end < last => end,
            _ => last,
        };
        let mut n = 0;
        while let Some(date) = self.frequency.occurrence(self.start_date, n) {
            if date > last {
                return false;
            }
            if date >= first {
                return true;
            }
            n += 1;
        }
        false
    }

    /// The amount and description to show on the Monthly sheet. Split items are divided across
    /// their period and tagged in the description.
    pub fn monthly_entry(&self) -> (String, Amount) {
        match self.frequency.split_months() {
            Some(months) if self.split_amount => {
                let per_month = (self.amount.value() / Decimal::from(months)).round_dp(2);
                (
                    format!(
                        "{} ({} - split)",
                        self.description,
                        self.frequency.to_string().to_lowercase()
                    ),
                    Amount::new(per_month),
                )
            }
            _ => (self.description.clone(), self.amount),
        }
    }
}

/// Which block of the Monthly sheet an item belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Earnings,
    FixedExpenses,
    VariableExpenses,
}

/// Earnings are positive amounts; expenses are fixed when their category is one of
/// `fixed_categories`. Zero amounts belong nowhere.
pub fn classify<S: AsRef<str>>(
    category: &str,
    amount: Amount,
    fixed_categories: &[S],
) -> Option<Section> {
    if amount.is_positive() {
        Some(Section::Earnings)
    } else if amount.is_negative() {
        if fixed_categories.iter().any(|c| c.as_ref() == category) {
            Some(Section::FixedExpenses)
        } else {
            Some(Section::VariableExpenses)
        }
    } else {
        None
    }
}

/// Totals of a set of recurring items.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecurringSummary {
    pub total_earnings: Amount,
    pub total_fixed_expenses: Amount,
    pub total_variable_expenses: Amount,
    pub net_amount: Amount,
    pub item_count: usize,
    /// Categories in order of first appearance.
    pub categories: Vec<String>,
}

pub fn summarize<S: AsRef<str>>(items: &[RecurringItem], fixed_categories: &[S]) -> RecurringSummary {
    let mut earnings = Decimal::ZERO;
    let mut fixed = Decimal::ZERO;
    let mut variable = Decimal::ZERO;
    let mut categories: Vec<String> = Vec::new();
    for item in items {
        if !categories.contains(&item.category) {
            categories.push(item.category.clone());
        }
        let value = item.amount.value();
        match classify(&item.category, item.amount, fixed_categories) {
            Some(Section::Earnings) => earnings += value,
            Some(Section::FixedExpenses) => fixed += value.abs(),
            Some(Section::VariableExpenses) => variable += value.abs(),
            None => {}
        }
    }
    RecurringSummary {
        total_earnings: Amount::new(earnings),
        total_fixed_expenses: Amount::new(fixed),
        total_variable_expenses: Amount::new(variable),
        net_amount: Amount::new(earnings - fixed - variable),
        item_count: items.len(),
        categories,
    }
}

/// Items grouped by section with per-section totals.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecurringPreview {
    pub earnings: Vec<RecurringItem>,
    pub fixed_expenses: Vec<RecurringItem>,
    pub variable_expenses: Vec<RecurringItem>,
    pub total_earnings: Amount,
    pub total_fixed_expenses: Amount,
    pub total_variable_expenses: Amount,
}

pub fn preview<S: AsRef<str>>(items: &[RecurringItem], fixed_categories: &[S]) -> RecurringPreview {
    let mut out = RecurringPreview::default();
    for item in items {
        match classify(&item.category, item.amount, fixed_categories) {
            Some(Section::Earnings) => out.earnings.push(item.clone()),
            Some(Section::FixedExpenses) => out.fixed_expenses.push(item.clone()),
            Some(Section::VariableExpenses) => out.variable_expenses.push(item.clone()),
            None => {}
        }
    }
    let total = |items: &[RecurringItem]| {
        Amount::new(items.iter().map(|i| i.amount.value().abs()).sum::<Decimal>())
    };
    out.total_earnings = total(&out.earnings);
    out.total_fixed_expenses = total(&out.fixed_expenses);
    out.total_variable_expenses = total(&out.variable_expenses);
    out
}

/// Items that fall due in `month` (1-12) of `year`, in sheet order.
pub fn items_due_in_month(items: &[RecurringItem], month: u32, year: i32) -> Vec<RecurringItem> {
    items
        .iter()
        .filter(|item| item.is_due_in(month, year))
        .cloned()
        .collect()
}

/// The first occurrence of a schedule strictly after `today`.
pub fn next_due_date(start: NaiveDate, frequency: Frequency, today: NaiveDate) -> Option<NaiveDate> {
    let mut n = 0;
    loop {
        let date = frequency.occurrence(start, n)?;
        if date > today {
            return Some(date);
        }
        n += 1;
    }
}

/// First and last day of `month` (1-12) in `year`.
pub fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Accepts `2024-01-31`, `1/31/2024` and `01/31/2024`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Formats a date the way it is written into cells.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn parse_yes_no(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "yes" | "y" | "true")
}
