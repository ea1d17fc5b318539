//! Loosely-typed cell values and their coercions
//!
//! Spreadsheet columns do not carry reliable types: a date column may hold
//! day serials, formatted strings, native dates or error markers depending
//! on how the file was produced. Coercions here are deliberately permissive
//! and never fail; anything unusable becomes the field's zero value.

use canteiro_core::{serial, Serial};
use chrono::NaiveDateTime;

/// Day serials outside (1, 100000) are not plausible schedule dates
const PLAUSIBLE_SERIAL: (f64, f64) = (1.0, 100_000.0);

/// One cell as delivered by a workbook loader
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Native date/time value
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text rendering; numbers without a fractional part print as integers
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Date(dt) => dt.date().to_string(),
        }
    }

    /// Day serial, or 0 when the cell does not hold a usable date.
    ///
    /// - native dates convert through the serial codec
    /// - numbers pass through when they are plausible serials
    /// - numeric strings without an error marker (`#`) are parsed, then
    ///   checked like numbers
    pub fn as_serial(&self) -> Serial {
        match self {
            CellValue::Date(dt) => serial::from_datetime(dt.and_utc()),
            CellValue::Number(n) => plausible_serial(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s.contains('#') {
                    return 0.0;
                }
                parse_number(s).map(plausible_serial).unwrap_or(0.0)
            }
            CellValue::Empty | CellValue::Bool(_) => 0.0,
        }
    }

    /// Percent complete exactly as written; "75%" and "75,5" are accepted
    pub fn as_percent(&self) -> f64 {
        match self {
            CellValue::Number(n) if n.is_finite() => *n,
            CellValue::Text(s) => {
                let s = s.trim();
                let s = s.strip_suffix('%').unwrap_or(s).trim_end();
                parse_number(s).unwrap_or(0.0)
            }
            _ => 0.0,
        }
    }

    /// Outline level; negative or unparseable values become 0
    pub fn as_level(&self) -> u32 {
        let value = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s.trim()),
            _ => None,
        };
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => v.round().min(f64::from(u32::MAX)) as u32,
            _ => 0,
        }
    }

    /// Milestone flag: "SIM" in any case
    pub fn as_flag(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().eq_ignore_ascii_case("sim"),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

fn plausible_serial(value: f64) -> Serial {
    if value > PLAUSIBLE_SERIAL.0 && value < PLAUSIBLE_SERIAL.1 {
        value
    } else {
        0.0
    }
}

/// Parse a number written with either decimal separator
fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let value = text
        .parse::<f64>()
        .ok()
        .or_else(|| text.replace(',', ".").parse::<f64>().ok())?;
    value.is_finite().then_some(value)
}
