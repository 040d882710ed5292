//! Constraint variants and their checks.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

/// Message template key for a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    NotEmpty,
    Integer,
    Numeric,
    Email,
    MinLength,
    MaxLength,
    Between,
    Date,
    Equals,
    Contains,
    Regex,
}

/// A single typed predicate applied to a field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    NotEmpty,
    Integer,
    Numeric,
    Email,
    /// Minimum length in characters.
    MinLength { min: usize },
    /// Maximum length in characters.
    MaxLength { max: usize },
    /// Inclusive numeric range.
    Between { min: f64, max: f64 },
    /// Inclusive date range; bounds are written in `format`.
    DateBetween {
        format: String,
        min: String,
        max: String,
    },
    /// Value must equal the payload value of another field.
    Equals { field: String },
    Contains { needle: String },
    Regex { pattern: Pattern },
    /// Value must parse with the chrono format string.
    DateFormat { format: String },
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::NotEmpty => ConstraintKind::NotEmpty,
            Constraint::Integer => ConstraintKind::Integer,
            Constraint::Numeric => ConstraintKind::Numeric,
            Constraint::Email => ConstraintKind::Email,
            Constraint::MinLength { .. } => ConstraintKind::MinLength,
            Constraint::MaxLength { .. } => ConstraintKind::MaxLength,
            Constraint::Between { .. } | Constraint::DateBetween { .. } => ConstraintKind::Between,
            Constraint::Equals { .. } => ConstraintKind::Equals,
            Constraint::Contains { .. } => ConstraintKind::Contains,
            Constraint::Regex { .. } => ConstraintKind::Regex,
            Constraint::DateFormat { .. } => ConstraintKind::Date,
        }
    }

    /// Whether `value` satisfies the constraint. `payload` is consulted by
    /// cross-field constraints only.
    pub fn is_satisfied(&self, value: &str, payload: &HashMap<String, String>) -> bool {
        match self {
            Constraint::NotEmpty => !value.is_empty(),
            Constraint::Integer => value.parse::<i64>().is_ok(),
            Constraint::Numeric => parse_number(value).is_some(),
            Constraint::Email => EMAIL_RE.is_match(value),
            Constraint::MinLength { min } => value.chars().count() >= *min,
            Constraint::MaxLength { max } => value.chars().count() <= *max,
            Constraint::Between { min, max } => {
                parse_number(value).is_some_and(|n| *min <= n && n <= *max)
            }
            Constraint::DateBetween { format, min, max } => {
                match (
                    parse_date(value, format),
                    parse_date(min, format),
                    parse_date(max, format),
                ) {
                    (Some(v), Some(lo), Some(hi)) => lo <= v && v <= hi,
                    _ => false,
                }
            }
            Constraint::Equals { field } => {
                value == payload.get(field).map(String::as_str).unwrap_or("")
            }
            Constraint::Contains { needle } => value.contains(needle.as_str()),
            Constraint::Regex { pattern } => pattern.is_match(value),
            Constraint::DateFormat { format } => parse_date(value, format).is_some(),
        }
    }

    /// Template placeholders contributed by the constraint's parameters.
    ///
    /// `compare_to` is the display name used for `Equals`.
    pub(crate) fn placeholders(&self, compare_to: &str) -> Vec<(&'static str, String)> {
        match self {
            Constraint::MinLength { min } => vec![("minValue", min.to_string())],
            Constraint::MaxLength { max } => vec![("maxValue", max.to_string())],
            Constraint::Between { min, max } => {
                vec![("minValue", min.to_string()), ("maxValue", max.to_string())]
            }
            Constraint::DateBetween { format, min, max } => vec![
                ("minValue", min.clone()),
                ("maxValue", max.clone()),
                ("format", format.clone()),
            ],
            Constraint::Equals { .. } => vec![("compareTo", compare_to.to_string())],
            Constraint::Contains { needle } => vec![("containsValue", needle.clone())],
            Constraint::Regex { pattern } => vec![("regex", pattern.as_str().to_string())],
            Constraint::DateFormat { format } => vec![("format", format.clone())],
            Constraint::NotEmpty | Constraint::Integer | Constraint::Numeric | Constraint::Email => {
                Vec::new()
            }
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date, time or date-time written in a chrono `format`.
///
/// Partial values are completed to a comparable instant: a missing month or
/// day becomes 1, a missing time becomes midnight and a time-only value is
/// placed on 1970-01-01. The whole input must be consumed.
pub(crate) fn parse_date(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt);
    }

    let mut parsed = Parsed::new();
    parse(&mut parsed, value, StrftimeItems::new(format)).ok()?;

    let has_time = parsed.hour_mod_12().is_some() || parsed.minute().is_some();
    match (complete_date(&parsed), complete_time(&parsed)) {
        (Some(date), Some(time)) => Some(date.and_time(time)),
        (Some(date), None) if !has_time => Some(date.and_time(NaiveTime::MIN)),
        (None, Some(time)) if !has_date_fields(&parsed) => {
            Some(NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time))
        }
        _ => None,
    }
}

fn has_date_fields(parsed: &Parsed) -> bool {
    parsed.year().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.month().is_some()
        || parsed.day().is_some()
        || parsed.ordinal().is_some()
        || parsed.weekday().is_some()
}

fn complete_date(parsed: &Parsed) -> Option<NaiveDate> {
    if let Ok(date) = parsed.to_naive_date() {
        return Some(date);
    }
    let mut filled = parsed.clone();
    if filled.month().is_none() {
        filled.set_month(1).ok()?;
    }
    if filled.day().is_none() {
        filled.set_day(1).ok()?;
    }
    filled.to_naive_date().ok()
}

fn complete_time(parsed: &Parsed) -> Option<NaiveTime> {
    if let Ok(time) = parsed.to_naive_time() {
        return Some(time);
    }
    let mut filled = parsed.clone();
    if filled.hour_mod_12().is_some() && filled.minute().is_none() {
        filled.set_minute(0).ok()?;
    }
    filled.to_naive_time().ok()
}

/// A compiled regular expression, serialized as its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}
