//! A1-notation cell references and rectangular ranges.
//!
//! Rows and columns are 1-based, so `A1` is `(1, 1)` and `AA10` is row 10, column 27.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Returned when text is not a single cell (`G5`) or a cell range (`G5:G16`).
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RangeError {
    #[error("Invalid range format '{0}', expected something like 'A1' or 'A1:B2'")]
    InvalidFormat(String),
}

/// A single cell position, e.g. `G5`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CellRef {
    row: u32,
    col: u32,
}

impl CellRef {
    /// Creates a cell reference. Both `row` and `col` are 1-based and must not be zero.
    pub fn new(row: u32, col: u32) -> Self {
        debug_assert!(row >= 1 && col >= 1, "cell references are 1-based");
        Self { row, col }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// Parses a single-cell address. A range such as `A1:B2` is rejected.
    pub fn parse(address: &str) -> Result<Self, RangeError> {
        parse_cell(address).ok_or_else(|| RangeError::InvalidFormat(address.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

// Serialized as its A1 string so that it can be used as a JSON map key.
impl Serialize for CellRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CellRef::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A rectangular block of cells with inclusive bounds. A single cell is a range whose start and
/// end are equal.
///
/// ```
/// # use budget_sheet::model::CellRange;
/// let range = CellRange::parse("G5:G16").unwrap();
/// assert_eq!(range.start_row(), 5);
/// assert_eq!(range.start_col(), 7);
/// assert_eq!(range.end_row(), 16);
/// assert_eq!(range.end_col(), 7);
/// assert!(range.intersects(&CellRange::parse("G16").unwrap()));
/// assert!(!range.intersects(&CellRange::parse("G17").unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CellRange {
    start_row: u32,
    start_col: u32,
    end_row: u32,
    end_col: u32,
}

impl CellRange {
    /// Creates a range from two corners given in any order.
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::from_corners(CellRef::new(start_row, start_col), CellRef::new(end_row, end_col))
    }

    pub fn from_corners(a: CellRef, b: CellRef) -> Self {
        Self {
            start_row: a.row.min(b.row),
            start_col: a.col.min(b.col),
            end_row: a.row.max(b.row),
            end_col: a.col.max(b.col),
        }
    }

    /// Parses `A1` or `A1:B2` notation.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidFormat` for anything that is not uppercase column letters
    /// followed by a non-zero row number, optionally twice separated by a colon.
    pub fn parse(address: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidFormat(address.to_string());
        let mut parts = address.split(':');
        let first = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }
        let start = parse_cell(first).ok_or_else(invalid)?;
        let end = match second {
            Some(s) => parse_cell(s).ok_or_else(invalid)?,
            None => start,
        };
        Ok(Self::from_corners(start, end))
    }

    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    pub fn end_row(&self) -> u32 {
        self.end_row
    }

    pub fn end_col(&self) -> u32 {
        self.end_col
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.start_row, self.start_col)
    }

    /// Number of rows covered.
    pub fn rows(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// Number of columns covered.
    pub fn cols(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// True when the two rectangles share at least one cell. Bounds are inclusive, so ranges that
    /// touch on a row or column intersect.
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && self.end_row >= other.start_row
            && self.start_col <= other.end_col
            && self.end_col >= other.start_col
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start_row..=self.end_row).contains(&cell.row)
            && (self.start_col..=self.end_col).contains(&cell.col)
    }
}

/// Free-function form of [`CellRange::intersects`].
pub fn intersects(a: &CellRange, b: &CellRange) -> bool {
    a.intersects(b)
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.top_left())
        } else {
            write!(
                f,
                "{}:{}",
                self.top_left(),
                CellRef::new(self.end_row, self.end_col)
            )
        }
    }
}

impl FromStr for CellRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRange::parse(s)
    }
}

impl From<CellRef> for CellRange {
    fn from(cell: CellRef) -> Self {
        Self::from_corners(cell, cell)
    }
}

impl Serialize for CellRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CellRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CellRange::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Converts column letters to a 1-based column number: `A` = 1, `Z` = 26, `AA` = 27.
///
/// Returns `None` for an empty string, any character outside `A..=Z`, or overflow.
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0u32, |acc, b| {
        if !b.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
    })
}

/// Converts a 1-based column number to letters: 1 = `A`, 27 = `AA`. Zero yields an empty string.
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parses `[A-Z]+[0-9]+` with a non-zero row.
fn parse_cell(s: &str) -> Option<CellRef> {
    let split = s.find(|c: char| !c.is_ascii_uppercase())?;
    let (letters, digits) = s.split_at(split);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let col = column_number(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(CellRef::new(row, col))
}
