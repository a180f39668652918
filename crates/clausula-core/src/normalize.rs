//! Normalisation of list-valued contract fields.
//!
//! The contract store serialises text arrays inconsistently: some records
//! carry a real JSON array, others a single string in array-literal form
//! (`{"Entregar informe","Asistir a comités"}`), and arrays sometimes hold
//! such strings as elements. The encoding is decoded once into [`ListField`]
//! at ingestion and resolved to a clean `Vec<String>` by [`normalize`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Characters stripped from an array-literal string before splitting.
const PUNCTUATION: [char; 3] = ['{', '}', '"'];

/// A list field as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListField {
    PlainList(Vec<String>),
    PunctuatedString(String),
    #[default]
    Absent,
}

impl ListField {
    /// Decode a raw JSON value. Never fails: anything that is neither an
    /// array nor a string is `Absent`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => ListField::PlainList(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(s) => ListField::PunctuatedString(s.clone()),
            _ => ListField::Absent,
        }
    }
}

impl From<Vec<String>> for ListField {
    fn from(items: Vec<String>) -> Self {
        ListField::PlainList(items)
    }
}

/// Resolve a list field into ordered, trimmed, non-empty items.
///
/// Plain list elements containing any of `{`, `}` or `"` are treated as
/// array literals and split on commas; other elements are kept whole.
/// A single string is always stripped and split.
pub fn normalize(field: &ListField) -> Vec<String> {
    match field {
        ListField::PlainList(items) => items
            .iter()
            .flat_map(|item| {
                if item.contains(|c: char| PUNCTUATION.contains(&c)) {
                    split_punctuated(item)
                } else {
                    vec![item.trim().to_string()]
                }
            })
            .filter(|item| !item.is_empty())
            .collect(),
        ListField::PunctuatedString(raw) => split_punctuated(raw),
        ListField::Absent => Vec::new(),
    }
}

fn split_punctuated(raw: &str) -> Vec<String> {
    let stripped: String = raw.chars().filter(|c| !PUNCTUATION.contains(c)).collect();
    stripped
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serde adapter: decode any JSON value through [`ListField`] and normalise.
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize(&ListField::from_json(&value)))
}

/// `1. first\n2. second`, numbered from one.
pub fn enumerate_lines(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `número 12, número 34`.
pub fn enumerate_numbers(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("número {item}"))
        .collect::<Vec<_>>()
        .join(", ")
}
