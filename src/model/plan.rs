//! Investment plans: named percentage splits of the month's investable funds.

use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The category name of the unallocated leftover.
pub const REMAINDER: &str = "Remainder";

/// Color for the remainder and for any category that rounds down to nothing.
pub const GRAY: &str = "#E0E0E0";

/// Allocations are rounded down to a multiple of this many dollars.
const ROUND_TO: i64 = 50;

/// The text shown in an unselected plan dropdown.
pub const PLACEHOLDER: &str = "Select a plan...";

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("A plan has an empty name")]
    EmptyName,
    #[error("Plan '{0}' is defined more than once")]
    DuplicatePlan(String),
    #[error("Plan '{plan}' lists category '{category}' more than once")]
    DuplicateCategory { plan: String, category: String },
    #[error("Plan '{plan}' allocates {total}%, which is more than 100%")]
    OverAllocated { plan: String, total: u32 },
    #[error("No investment plans are defined")]
    NoPlans,
}

/// One category's share of a plan, in whole percent.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub category: String,
    pub percent: u32,
}

/// A named investment plan.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub name: String,
    /// Category shares in display order.
    pub allocations: Vec<Share>,
    pub tagline: String,
    pub description: String,
}

impl PlanDefinition {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::EmptyName);
        }
        let mut seen = HashSet::new();
        for share in &self.allocations {
            if !seen.insert(share.category.as_str()) {
                return Err(PlanError::DuplicateCategory {
                    plan: self.name.clone(),
                    category: share.category.clone(),
                });
            }
        }
        let total: u32 = self.allocations.iter().map(|s| s.percent).sum();
        if total > 100 {
            return Err(PlanError::OverAllocated {
                plan: self.name.clone(),
                total,
            });
        }
        Ok(())
    }

    /// Splits `funds` across this plan's categories.
    ///
    /// Each category gets `floor(funds * percent / 100 / 50) * 50`. Whatever is left over becomes a
    /// trailing `Remainder` row when positive. Category rows are sorted by amount, largest first;
    /// ties keep their definition order.
    pub fn allocate(&self, funds: Decimal, colors: &BTreeMap<String, String>) -> Allocation {
        let hundred = Decimal::from(100);
        let step = Decimal::from(ROUND_TO);
        let mut rows: Vec<AllocationRow> = self
            .allocations
            .iter()
            .map(|share| {
                let raw = funds * Decimal::from(share.percent) / hundred;
                let amount = (raw / step).floor() * step;
                AllocationRow {
                    category: share.category.clone(),
                    amount: Amount::new(amount),
                    color: String::new(),
                }
            })
            .collect();

        let allocated: Decimal = rows
            .iter()
            .map(|r| r.amount.value())
            .filter(|v| *v > Decimal::ZERO)
            .sum();

        rows.sort_by(|a, b| b.amount.cmp(&a.amount));

        let remainder = funds - allocated;
        if remainder > Decimal::ZERO {
            rows.push(AllocationRow {
                category: REMAINDER.to_string(),
                amount: Amount::new(remainder),
                color: String::new(),
            });
        }

        for row in rows.iter_mut() {
            row.color = if row.amount.is_positive() {
                colors
                    .get(&row.category)
                    .cloned()
                    .unwrap_or_else(|| GRAY.to_string())
            } else {
                GRAY.to_string()
            };
        }

        Allocation {
            plan: self.name.clone(),
            funds: Amount::new(funds),
            rows,
        }
    }
}

/// One row of an allocation table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub category: String,
    pub amount: Amount,
    pub color: String,
}

/// The result of splitting funds according to a plan.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub plan: String,
    pub funds: Amount,
    pub rows: Vec<AllocationRow>,
}

impl Allocation {
    pub fn colors(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.color.clone()).collect()
    }

    /// Rows as `[category, amount]` cell text.
    pub fn to_cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![r.category.clone(), r.amount.to_cell_string()])
            .collect()
    }
}

/// The full set of plans and per-category slice colors.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlanBook {
    plans: Vec<PlanDefinition>,
    category_colors: BTreeMap<String, String>,
}

impl PlanBook {
    /// Validates every plan and returns the book.
    pub fn new(
        plans: Vec<PlanDefinition>,
        category_colors: BTreeMap<String, String>,
    ) -> Result<Self, PlanError> {
        let book = Self {
            plans,
            category_colors,
        };
        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.plans.is_empty() {
            return Err(PlanError::NoPlans);
        }
        let mut names = HashSet::new();
        for plan in &self.plans {
            plan.validate()?;
            if !names.insert(plan.name.as_str()) {
                return Err(PlanError::DuplicatePlan(plan.name.clone()));
            }
        }
        Ok(())
    }

    pub fn plans(&self) -> &[PlanDefinition] {
        &self.plans
    }

    pub fn names(&self) -> Vec<String> {
        self.plans.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&PlanDefinition> {
        self.plans.iter().find(|p| p.name == name)
    }

    pub fn category_colors(&self) -> &BTreeMap<String, String> {
        &self.category_colors
    }

    pub fn allocate(&self, name: &str, funds: Decimal) -> Option<Allocation> {
        self.get(name)
            .map(|plan| plan.allocate(funds, &self.category_colors))
    }
}

impl Default for PlanBook {
    fn default() -> Self {
        builtin()
    }
}

const CATEGORIES: [&str; 6] = [
    "Emergency Fund",
    "Brokerage Account",
    "Precious Metals",
    "Cryptocurrencies",
    "Vacation Fund",
    "Education Fund",
];

fn plan(name: &str, percents: [u32; 6], tagline: &str, description: &str) -> PlanDefinition {
    PlanDefinition {
        name: name.to_string(),
        allocations: CATEGORIES
            .iter()
            .zip(percents)
            .map(|(category, percent)| Share {
                category: category.to_string(),
                percent,
            })
            .collect(),
        tagline: tagline.to_string(),
        description: description.to_string(),
    }
}

/// The four built-in plans.
pub fn builtin() -> PlanBook {
    let plans = vec![
        plan(
            "Conservative Plan",
            [50, 10, 10, 0, 10, 20],
            "Minimal risk with steady, predictable growth",
            "Safe, conservative approach focused on building a strong emergency fund and \
            education savings. Recommended for those with less than 6 months of living expenses \
            saved.",
        ),
        plan(
            "Risktaker Plan",
            [10, 20, 10, 35, 10, 15],
            "High-risk, high-reward strategy",
            "Strong focus on cryptocurrencies and aggressive growth investments. Suitable for \
            those comfortable with volatility that already have 6 months of living expenses saved.",
        ),
        plan(
            "Family Plan",
            [20, 10, 10, 5, 25, 30],
            "Moderate risk with diversified investments",
            "Balanced approach prioritizing family needs with strong education funding and \
            vacation savings. Services such as Acorns Early or Henry are great for education \
            fund management.",
        ),
        plan(
            "Baller Plan",
            [0, 10, 25, 15, 50, 0],
            "For those who want to ball out!",
            "Luxury-focused strategy emphasizing lifestyle and experiences. Heavy investment in \
            vacation funding and precious metals. Live your best life in the moment!",
        ),
    ];
    let category_colors = [
        ("Emergency Fund", "#FF6B6B"),
        ("Brokerage Account", "#00A651"),
        ("Precious Metals", "#FFD93D"),
        ("Cryptocurrencies", "#6C5CE7"),
        ("Vacation Fund", "#A8E6CF"),
        ("Education Fund", "#FF6B35"),
        (REMAINDER, GRAY),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    PlanBook {
        plans,
        category_colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_builtin_plans_are_valid() {
        let book = builtin();
        book.validate().unwrap();
        assert_eq!(
            book.names(),
            vec![
                "Conservative Plan",
                "Risktaker Plan",
                "Family Plan",
                "Baller Plan"
            ]
        );
        for plan in book.plans() {
            let total: u32 = plan.allocations.iter().map(|s| s.percent).sum();
            assert_eq!(total, 100, "{}", plan.name);
        }
    }

    #[test]
    fn test_allocate_rounds_down_to_fifty_and_adds_remainder() {
        let book = builtin();
        let allocation = book.allocate("Conservative Plan", dec("1234")).unwrap();
        let rows: Vec<(&str, Decimal)> = allocation
            .rows
            .iter()
            .map(|r| (r.category.as_str(), r.amount.value()))
            .collect();
        // 617 -> 600, 123.4 -> 100 (x3), 0, 246.8 -> 200; total 1100, remainder 134
        assert_eq!(
            rows,
            vec![
                ("Emergency Fund", dec("600")),
                ("Education Fund", dec("200")),
                ("Brokerage Account", dec("100")),
                ("Precious Metals", dec("100")),
                ("Vacation Fund", dec("100")),
                ("Cryptocurrencies", dec("0")),
                (REMAINDER, dec("134")),
            ]
        );
    }

    #[test]
    fn test_allocate_colors() {
        let book = builtin();
        let allocation = book.allocate("Conservative Plan", dec("1234")).unwrap();
        assert_eq!(
            allocation.colors(),
            vec!["#FF6B6B", "#FF6B35", "#00A651", "#FFD93D", "#A8E6CF", GRAY, GRAY]
        );
    }

    #[test]
    fn test_allocate_exact_multiple_has_no_remainder() {
        let book = builtin();
        let allocation = book.allocate("Family Plan", dec("1000")).unwrap();
        assert!(allocation.rows.iter().all(|r| r.category != REMAINDER));
        assert_eq!(allocation.rows[0].category, "Education Fund");
        assert_eq!(allocation.rows[0].amount.value(), dec("300"));
        assert_eq!(allocation.rows.len(), 6);
    }

    #[test]
    fn test_allocate_zero_funds() {
        let book = builtin();
        let allocation = book.allocate("Baller Plan", Decimal::ZERO).unwrap();
        assert_eq!(allocation.rows.len(), 6);
        assert!(allocation.rows.iter().all(|r| r.color == GRAY));
    }

    #[test]
    fn test_allocate_unknown_plan() {
        assert!(builtin().allocate("Nope", dec("100")).is_none());
    }

    #[test]
    fn test_allocation_cells() {
        let book = builtin();
        let allocation = book.allocate("Family Plan", dec("1000")).unwrap();
        let cells = allocation.to_cells();
        assert_eq!(cells[0], vec!["Education Fund", "300"]);
    }

    #[test]
    fn test_validation_errors() {
        let mut bad = builtin().plans()[0].clone();
        bad.allocations[0].percent = 90;
        assert!(matches!(
            bad.validate(),
            Err(PlanError::OverAllocated { total: 140, .. })
        ));

        let mut dup = builtin().plans()[0].clone();
        dup.allocations[1].category = "Emergency Fund".to_string();
        assert!(matches!(
            dup.validate(),
            Err(PlanError::DuplicateCategory { .. })
        ));

        let plans = vec![builtin().plans()[0].clone(), builtin().plans()[0].clone()];
        assert_eq!(
            PlanBook::new(plans, BTreeMap::new()),
            Err(PlanError::DuplicatePlan("Conservative Plan".to_string()))
        );
        assert_eq!(
            PlanBook::new(Vec::new(), BTreeMap::new()),
            Err(PlanError::NoPlans)
        );
    }

    #[test]
    fn test_plan_book_serde() {
        let book = builtin();
        let json = serde_json::to_string(&book).unwrap();
        let back: PlanBook = serde_json::from_str(&json).unwrap();
        assert_eq!(book, back);
    }
}
