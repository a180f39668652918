//! Tolerant decoding of records coming from the contract endpoints.
//!
//! Records are read as a JSON object first and each field is looked up under
//! its accepted spellings. Anything a field decoder does not understand maps
//! to `None`, so a badly typed or duplicated field never fails the record.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dates::parse_date_lenient;
use crate::model::AdditionKind;
use crate::normalize::{ListField, normalize};

/// Field lookup over a raw JSON object.
///
/// Each accessor takes the spellings of one field, canonical name first.
/// The first spelling holding a decodable value wins; the rest are ignored.
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn first<T>(&self, keys: &[&str], decode: impl Fn(&Value) -> Option<T>) -> Option<T> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find_map(decode)
    }

    pub(crate) fn text(&self, keys: &[&str]) -> Option<String> {
        self.first(keys, text_from_json)
    }

    pub(crate) fn amount(&self, keys: &[&str]) -> Option<u64> {
        self.first(keys, amount_from_json)
    }

    pub(crate) fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        self.first(keys, date_from_json)
    }

    pub(crate) fn days(&self, keys: &[&str]) -> Option<i64> {
        self.first(keys, days_from_json)
    }

    pub(crate) fn addition_kind(&self, keys: &[&str]) -> Option<AdditionKind> {
        self.first(keys, addition_kind_from_json)
    }

    pub(crate) fn list(&self, keys: &[&str]) -> Vec<String> {
        self.first(keys, |value| {
            let items = normalize(&ListField::from_json(value));
            (!items.is_empty()).then_some(items)
        })
        .unwrap_or_default()
    }
}

pub(crate) fn text_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn amount_from_json(value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral_amount)),
        Value::String(s) => parse_amount(s),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        debug!(value = %value, "ignoring non-numeric amount");
    }
    parsed
}

fn date_from_json(value: &Value) -> Option<NaiveDate> {
    let parsed = value.as_str().and_then(parse_date_lenient);
    if parsed.is_none() && !value.is_null() {
        debug!(value = %value, "ignoring unparseable date");
    }
    parsed
}

fn days_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn addition_kind_from_json(value: &Value) -> Option<AdditionKind> {
    let kind = value.as_str().and_then(|s| s.parse().ok());
    if kind.is_none() && !value.is_null() {
        debug!(value = %value, "unrecognised addition type");
    }
    kind
}

/// Reads a peso amount written as text.
///
/// A `.` or `,` followed by exactly three digits is thousands grouping
/// (`$ 1.500.000`, `1,500,000`, `2.000`). A trailing separator with one or two
/// digits is a cents part, accepted only when zero (`1.500.000,00`,
/// `1500000.00`).
fn parse_amount(raw: &str) -> Option<u64> {
    let s: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let (whole, cents) = split_cents(&s);
    if let Some((separator, cents)) = cents
        && (cents.bytes().any(|b| b != b'0') || whole.contains(separator))
    {
        return None;
    }
    parse_grouped(whole)
}

fn split_cents(s: &str) -> (&str, Option<(char, &str)>) {
    let Some(pos) = s.rfind(['.', ',']) else {
        return (s, None);
    };
    let tail = &s[pos + 1..];
    if (1..=2).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_digit()) {
        (&s[..pos], Some((char::from(s.as_bytes()[pos]), tail)))
    } else {
        (s, None)
    }
}

fn parse_grouped(s: &str) -> Option<u64> {
    let digits = match s.chars().find(|c| matches!(c, '.' | ',')) {
        None => s.to_string(),
        Some(separator) => {
            let mut groups = s.split(separator);
            let head = groups.next().filter(|g| (1..=3).contains(&g.len()))?;
            let mut digits = head.to_string();
            for group in groups {
                if group.len() != 3 {
                    return None;
                }
                digits.push_str(group);
            }
            digits
        }
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn integral_amount(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then_some(f as u64)
}
