//! Typed spreadsheet cell values.
//!
//! Cells arrive from the tabular store as one of a handful of shapes. Rules
//! read them through the coercions here instead of guessing at the type.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TypeCoercionWarning;

/// Accepted text forms for date cells, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Number of trailing digits kept when normalizing a request identifier.
pub const REQUEST_ID_DIGITS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Cell read from raw text, as found in a delimited file.
    ///
    /// The text is kept verbatim so that rules compare, and saves write, what
    /// the sheet holds. Typed reads coerce on demand through
    /// [`CellValue::as_date`] and [`RequestId::from_cell`].
    pub fn from_raw(raw: &str) -> Self {
        let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text(text.to_string())
        }
    }

    /// `Empty`, or text that is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering used for value comparisons.
    ///
    /// Dates and empty cells have no comparable text.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(value) => Some(Cow::Borrowed(value.as_str())),
            Self::Integer(value) => Some(Cow::Owned(value.to_string())),
            Self::Decimal(value) => Some(Cow::Owned(value.to_string())),
            Self::Empty | Self::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Text(value) => parse_date_text(value.trim()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Role request identifier, reduced to its last six digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u32);

impl RequestId {
    pub fn new(value: u64) -> Self {
        let modulus = 10u64.pow(REQUEST_ID_DIGITS);
        // Remainder is below 10^6, so it always fits.
        Self((value % modulus) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Normalize a request cell.
    ///
    /// Integers keep their last six digits; text keeps the last six of the
    /// ASCII digits it contains (`"REQ-123456"` becomes `123456`).
    pub fn from_cell(cell: &CellValue) -> Result<Self, TypeCoercionWarning> {
        match cell {
            CellValue::Integer(value) => Ok(Self::new(value.unsigned_abs())),
            CellValue::Text(text) => {
                let digits: Vec<u8> = text
                    .bytes()
                    .filter(u8::is_ascii_digit)
                    .map(|byte| byte - b'0')
                    .collect();
                if digits.is_empty() {
                    return Err(TypeCoercionWarning::new("a request id", text.as_str()));
                }
                let start = digits.len().saturating_sub(REQUEST_ID_DIGITS as usize);
                let value = digits[start..]
                    .iter()
                    .fold(0u64, |acc, digit| acc * 10 + u64::from(*digit));
                Ok(Self::new(value))
            }
            other => Err(TypeCoercionWarning::new("a request id", other.to_string())),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
