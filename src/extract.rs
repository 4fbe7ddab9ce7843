// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Typed field extraction
//!
//! Validated accessors over one section (or one pivoted row) of a
//! [`StatsTree`]. Each `get_*` accessor treats the field as required and fails
//! with [`ExtractError::MissingField`] when the label is absent or blank; each
//! `opt_*` accessor returns the supplied default instead. A value that is
//! present but cannot be parsed always fails, whatever the presence rule.
//!
//! The device lays its tables out one row per metric and one column per
//! line or port. [`pivot_rows`] transposes a section into one [`Row`] per
//! column so mappers address fields by label only.

use crate::error::ExtractError;
use crate::table::{Section, StatsTree};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::time::Duration;

/// Result type alias for extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// One column of a section: label to the value at that column
pub type Row = BTreeMap<String, String>;

/// `2024-01-15T10:30:00`
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// `2024/01/15 10:30:00`
pub const SLASH_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Seconds per duration field, least significant first
const DURATION_UNITS: [f64; 4] = [1.0, 60.0, 3_600.0, 86_400.0];

/// Anything fields can be read from by label
pub trait FieldSource {
    /// First raw value for a label, untrimmed
    fn first_value(&self, label: &str) -> Option<&str>;
}

impl FieldSource for Section {
    fn first_value(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(|values| values.first()).map(String::as_str)
    }
}

impl FieldSource for Row {
    fn first_value(&self, label: &str) -> Option<&str> {
        self.get(label).map(String::as_str)
    }
}

fn lookup<'a, S: FieldSource + ?Sized>(data: &'a S, label: &str) -> Option<&'a str> {
    data.first_value(label)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required<S, T, F>(data: &S, label: &str, parse: F) -> ExtractResult<T>
where
    S: FieldSource + ?Sized,
    F: FnOnce(&str) -> ExtractResult<T>,
{
    match lookup(data, label) {
        Some(value) => parse(value),
        None => Err(ExtractError::missing(label)),
    }
}

fn optional<S, T, F>(
    data: &S,
    label: &str,
    default: Option<T>,
    parse: F,
) -> ExtractResult<Option<T>>
where
    S: FieldSource + ?Sized,
    F: FnOnce(&str) -> ExtractResult<T>,
{
    match lookup(data, label) {
        Some(value) => parse(value).map(Some),
        None => Ok(default),
    }
}

/// Parse a base-10 integer
pub fn parse_int(label: &str, value: &str) -> ExtractResult<i64> {
    value
        .parse::<i64>()
        .map_err(|e| ExtractError::invalid(label, value, e))
}

/// Parse one of the two datetime layouts the firmware emits.
///
/// The layout is picked from the characters present; a string that picks
/// neither, or does not parse under the one it picked, is unsupported.
pub fn parse_datetime(label: &str, value: &str) -> ExtractResult<NaiveDateTime> {
    let format = if value.contains('T') && value.contains('-') && value.contains(':') {
        ISO_DATETIME_FORMAT
    } else if value.contains(' ') && value.contains('/') && value.contains(':') {
        SLASH_DATETIME_FORMAT
    } else {
        return Err(ExtractError::unsupported(label, value));
    };
    NaiveDateTime::parse_from_str(value, format)
        .map_err(|_| ExtractError::unsupported(label, value))
}

/// Parse `[[[days:]hours:]minutes:]seconds`, each field a decimal number
pub fn parse_duration(label: &str, value: &str) -> ExtractResult<Duration> {
    let fields: Vec<&str> = value.split(':').collect();
    if fields.len() > DURATION_UNITS.len() {
        return Err(ExtractError::unsupported(label, value));
    }

    let mut seconds = 0.0;
    for (field, unit) in fields.iter().rev().zip(DURATION_UNITS) {
        let magnitude: f64 = field
            .trim()
            .parse()
            .map_err(|e| ExtractError::invalid(label, value, e))?;
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(ExtractError::invalid(label, value, "negative or non-finite field"));
        }
        seconds += magnitude * unit;
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| ExtractError::invalid(label, value, e))
}

/// Required string, trimmed
pub fn get_string<S: FieldSource + ?Sized>(data: &S, label: &str) -> ExtractResult<String> {
    required(data, label, |v| Ok(v.to_string()))
}

/// Required string, upper-cased
pub fn get_string_upper<S: FieldSource + ?Sized>(data: &S, label: &str) -> ExtractResult<String> {
    required(data, label, |v| Ok(v.to_uppercase()))
}

/// Required string, lower-cased
pub fn get_string_lower<S: FieldSource + ?Sized>(data: &S, label: &str) -> ExtractResult<String> {
    required(data, label, |v| Ok(v.to_lowercase()))
}

/// Required integer
pub fn get_int<S: FieldSource + ?Sized>(data: &S, label: &str) -> ExtractResult<i64> {
    required(data, label, |v| parse_int(label, v))
}

/// Required timestamp
pub fn get_datetime<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
) -> ExtractResult<NaiveDateTime> {
    required(data, label, |v| parse_datetime(label, v))
}

/// Required duration
pub fn get_duration<S: FieldSource + ?Sized>(data: &S, label: &str) -> ExtractResult<Duration> {
    required(data, label, |v| parse_duration(label, v))
}

/// Optional string, trimmed
pub fn opt_string<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<String>,
) -> ExtractResult<Option<String>> {
    optional(data, label, default, |v| Ok(v.to_string()))
}

/// Optional string, upper-cased
pub fn opt_string_upper<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<String>,
) -> ExtractResult<Option<String>> {
    optional(data, label, default, |v| Ok(v.to_uppercase()))
}

/// Optional string, lower-cased
pub fn opt_string_lower<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<String>,
) -> ExtractResult<Option<String>> {
    optional(data, label, default, |v| Ok(v.to_lowercase()))
}

/// Optional integer
pub fn opt_int<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<i64>,
) -> ExtractResult<Option<i64>> {
    optional(data, label, default, |v| parse_int(label, v))
}

/// Optional timestamp
pub fn opt_datetime<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<NaiveDateTime>,
) -> ExtractResult<Option<NaiveDateTime>> {
    optional(data, label, default, |v| parse_datetime(label, v))
}

/// Optional duration
pub fn opt_duration<S: FieldSource + ?Sized>(
    data: &S,
    label: &str,
    default: Option<Duration>,
) -> ExtractResult<Option<Duration>> {
    optional(data, label, default, |v| parse_duration(label, v))
}

/// Transpose the section named `label` into one row per column.
///
/// The row count is the longest value list of the section; a row only holds
/// the labels that have a value at its column.
pub fn pivot_rows(
    tree: &StatsTree,
    label: &str,
    expected_row_count: usize,
) -> ExtractResult<Vec<Row>> {
    let section = tree.section(label).ok_or_else(|| ExtractError::missing(label))?;
    let row_count = section.values().map(Vec::len).max().unwrap_or(0);
    if row_count != expected_row_count {
        return Err(ExtractError::ShapeMismatch {
            label: label.to_string(),
            expected: expected_row_count,
            actual: row_count,
        });
    }

    let rows = (0..row_count)
        .map(|column| {
            section
                .iter()
                .filter_map(|(name, values)| values.get(column).map(|v| (name.clone(), v.clone())))
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Pivot a section that must hold exactly one column
pub fn single_row(tree: &StatsTree, label: &str) -> ExtractResult<Row> {
    pivot_rows(tree, label, 1)?
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::missing(label))
}
