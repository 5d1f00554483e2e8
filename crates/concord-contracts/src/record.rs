//! Flattened record types.
//!
//! Raw input records arrive as arbitrary `serde_json::Value` trees; the
//! flattener reduces them to a `FlatRecord` — a map from dotted/indexed field
//! path to a scalar `FieldValue`. `BTreeMap` keying gives the lexical, stable
//! field ordering the comparator's output depends on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar leaf value extracted from a record.
///
/// A JSON object with exactly the two keys `value` (number) and `unit`
/// (string) flattens to `Quantity`, which participates in unit-aware numeric
/// comparison rather than textual equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A null leaf.
    Null,
    /// A boolean leaf.
    Bool(bool),
    /// A plain numeric leaf.
    Num(f64),
    /// A string leaf.
    Str(String),
    /// A unit-qualified numeric, e.g. `{ "value": 120.0, "unit": "mmHg" }`.
    Quantity { value: f64, unit: String },
}

impl FieldValue {
    /// Return the numeric content of this value, if it has one.
    ///
    /// `Num` and `Quantity` carry numbers; everything else returns `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Num(n) => Some(*n),
            FieldValue::Quantity { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    /// Human-readable form used when the report stringifies values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Num(n) => write!(f, "{n}"),
            FieldValue::Str(s) => write!(f, "{s}"),
            FieldValue::Quantity { value, unit } => write!(f, "{value} {unit}"),
        }
    }
}

/// A fully flattened record: field path → scalar value.
///
/// Paths use dots for nesting and bracketed indexes for sequences, e.g.
/// `vitals.systolic_bp` or `medications[0].dose`.
pub type FlatRecord = BTreeMap<String, FieldValue>;

/// Derive the human-readable label for a field path.
///
/// Separators (`.`, `_`, `[`, `]`) become spaces and each word is
/// title-cased: `vitals.systolic_bp` → `Vitals Systolic Bp`,
/// `medications[1]` → `Medications 1`.
pub fn field_label(field: &str) -> String {
    let spaced: String = field
        .chars()
        .map(|c| match c {
            '.' | '_' | '[' | ']' => ' ',
            other => other,
        })
        .collect();

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
