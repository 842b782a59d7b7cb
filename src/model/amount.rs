//! Monetary values read from, and written to, spreadsheet cells.
//!
//! Cells hold text such as `$1,234.50`, `-$60.00`, `(45.00)` or just `75`. `Amount` parses all of
//! these into a `Decimal` and always writes back in one canonical form.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A dollar amount parsed from cell text.
///
/// ```
/// # use budget_sheet::model::Amount;
/// let amount: Amount = "-$1,200.00".parse().unwrap();
/// assert_eq!(amount.to_string(), "-$1,200.00");
/// assert_eq!(amount.to_f64(), -1200.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Converts from `f64`, returning `None` for NaN or infinite values.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Plain numeric text without dollar sign or separators, e.g. `-1200.5`. Used when writing
    /// numbers back into cells.
    pub fn to_cell_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

/// Returned when cell text is not a number.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("'{text}' is not a dollar amount: {reason}")]
pub struct AmountError {
    text: String,
    reason: String,
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = |reason: &str| AmountError {
            text: s.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(err("empty cell"));
        }

        // Accounting style negatives: (45.00)
        let (negative, body) = match trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => match trimmed.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, trimmed),
            },
        };
        let body = body.strip_prefix('$').unwrap_or(body);
        let digits = body.replace(',', "");
        if digits.starts_with('-') || digits.starts_with('+') {
            return Err(err("misplaced sign"));
        }
        let value = Decimal::from_str(&digits).map_err(|e| err(&e.to_string()))?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", magnitude))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(Amount::from_str("75").unwrap().value(), dec("75"));
        assert_eq!(Amount::from_str(" 12.5 ").unwrap().value(), dec("12.5"));
    }

    #[test]
    fn test_parse_dollar_and_commas() {
        assert_eq!(Amount::from_str("$1,234.50").unwrap().value(), dec("1234.50"));
        assert_eq!(Amount::from_str("-$60,000.00").unwrap().value(), dec("-60000"));
    }

    #[test]
    fn test_parse_accounting_negative() {
        assert_eq!(Amount::from_str("(45.00)").unwrap().value(), dec("-45"));
        assert_eq!(Amount::from_str("($1,000)").unwrap().value(), dec("-1000"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Amount::from_str("").is_err());
        assert!(Amount::from_str("Rent").is_err());
        assert!(Amount::from_str("--5").is_err());
        assert!(Amount::from_str("$-5").is_err());
        let err = Amount::from_str("abc").unwrap_err();
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("1234.5")).to_string(), "$1,234.50");
        assert_eq!(Amount::new(dec("-50")).to_string(), "-$50.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_cell_string() {
        assert_eq!(Amount::new(dec("1200.50")).to_cell_string(), "1200.5");
        assert_eq!(Amount::new(dec("100.00")).to_cell_string(), "100");
    }

    #[test]
    fn test_sign_helpers() {
        let negative = Amount::from_str("-$5").unwrap();
        assert!(negative.is_negative());
        assert!(!negative.is_positive());
        assert_eq!(negative.abs().value(), dec("5"));
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::ZERO.is_positive() && !Amount::ZERO.is_negative());
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50"));
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""$50.00""#);
        let back: Amount = serde_json::from_str(r#""-$50.00""#).unwrap();
        assert_eq!(back.value(), dec("-50"));
    }
}
