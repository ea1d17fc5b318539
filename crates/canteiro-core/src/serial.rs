//! Day-serial date codec
//!
//! Spreadsheets store calendar dates as a count of days since 1899-12-30,
//! which puts the Unix epoch at serial 25569. Everything past extraction
//! works on these serials; this module converts them to and from calendar
//! dates and provides the comparisons the dashboard needs.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use canteiro_core::serial;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let s = serial::from_date(date);
//! assert_eq!(s, 45306.0);
//! assert_eq!(serial::to_date(s), Some(date));
//! ```

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::Serial;

/// Serial of 1970-01-01
pub const UNIX_EPOCH_SERIAL: i64 = 25_569;

/// Serials at or above this value are rejected as garbage
pub const MAX_SERIAL: Serial = 3_000_000.0;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// `NaiveDate::num_days_from_ce` of 1899-12-30
const CE_DAYS_AT_SERIAL_ZERO: i64 = 693_594;

// ============================================================================
// Conversions
// ============================================================================

/// Serial for a calendar date
pub fn from_date(date: NaiveDate) -> Serial {
    (i64::from(date.num_days_from_ce()) - CE_DAYS_AT_SERIAL_ZERO) as Serial
}

/// Serial for an instant, truncated to the UTC day it falls on
pub fn from_datetime(instant: DateTime<Utc>) -> Serial {
    (instant.timestamp_millis().div_euclid(MILLIS_PER_DAY) + UNIX_EPOCH_SERIAL) as Serial
}

/// Calendar date for a serial; `None` when the serial is not valid.
///
/// Fractional serials carry a time of day, which is dropped.
pub fn to_date(serial: Serial) -> Option<NaiveDate> {
    if !is_valid(serial) {
        return None;
    }
    let days = serial.floor() as i64 + CE_DAYS_AT_SERIAL_ZERO;
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Instant for a serial, keeping the fractional time of day
pub fn to_datetime(serial: Serial) -> Option<DateTime<Utc>> {
    if !is_valid(serial) {
        return None;
    }
    let millis = ((serial - UNIX_EPOCH_SERIAL as Serial) * MILLIS_PER_DAY as Serial).round();
    DateTime::from_timestamp_millis(millis as i64)
}

/// A serial is valid iff it is finite and strictly between 0 and [`MAX_SERIAL`]
pub fn is_valid(serial: Serial) -> bool {
    serial.is_finite() && serial > 0.0 && serial < MAX_SERIAL
}

// ============================================================================
// Comparisons
// ============================================================================

/// Serial of the local calendar day
pub fn today() -> Serial {
    from_date(Local::now().date_naive())
}

/// Whole days from `b` to `a`
pub fn diff_days(a: Serial, b: Serial) -> i64 {
    (a - b).round() as i64
}

/// Within one day of `today`
pub fn is_today(serial: Serial, today: Serial) -> bool {
    (serial - today).abs() < 1.0
}

/// At least one day before `today`
pub fn is_past(serial: Serial, today: Serial) -> bool {
    today - serial >= 1.0
}

/// At least one day after `today`
pub fn is_future(serial: Serial, today: Serial) -> bool {
    serial - today >= 1.0
}

/// Inclusive range from `start` to `end` every `step` days.
///
/// The last element is always exactly `end`, even when the step does not
/// land on it. An inverted range yields nothing; a step shorter than one
/// day yields just the two endpoints.
pub fn range(start: Serial, end: Serial, step: Serial) -> Vec<Serial> {
    if start.is_nan() || end.is_nan() || start > end {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }
    if step.is_nan() || step < 1.0 || step.is_infinite() {
        return vec![start, end];
    }

    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
        let value = start + f64::from(i) * step;
        if value >= end {
            break;
        }
        values.push(value);
        i += 1;
    }
    values.push(end);
    values
}

// ============================================================================
// Tests
// ============================================================================
