//! Field flattener: nested record trees → flat, comparable field sets.
//!
//! Traverses nested mappings and arrays recursively. Array elements are
//! indexed by position (`medications[0]`), nested keys are dot-joined
//! (`vitals.systolic_bp`). A two-key `{value, unit}` object with a numeric
//! `value` and string `unit` flattens to a single `Quantity` field that the
//! comparator handles with unit-aware numeric comparison.
//!
//! `serde_json::Value` trees are structurally acyclic, so the cyclic-input
//! guard takes the form of a recursion-depth bound: nesting beyond
//! `MAX_DEPTH` raises `MalformedRecord`, the only error this module
//! produces. Pure function of its input.

use serde_json::Value;

use concord_contracts::{
    error::{ConcordError, ConcordResult},
    record::{FieldValue, FlatRecord},
};

/// Maximum nesting depth accepted before the record is rejected.
pub const MAX_DEPTH: usize = 64;

/// Flatten a raw record into field-path → scalar form.
pub fn flatten(record: &Value) -> ConcordResult<FlatRecord> {
    let mut flat = FlatRecord::new();
    walk(record, "", 0, &mut flat)?;
    Ok(flat)
}

fn walk(value: &Value, path: &str, depth: usize, out: &mut FlatRecord) -> ConcordResult<()> {
    if depth > MAX_DEPTH {
        return Err(ConcordError::MalformedRecord {
            reason: format!(
                "nesting at '{path}' exceeds the depth bound of {MAX_DEPTH} levels"
            ),
        });
    }

    match value {
        Value::Object(map) => {
            if let Some(quantity) = as_quantity(map) {
                out.insert(path.to_string(), quantity);
                return Ok(());
            }
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, &child_path, depth + 1, out)?;
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &format!("{path}[{index}]"), depth + 1, out)?;
            }
        }
        Value::Null => {
            out.insert(path.to_string(), FieldValue::Null);
        }
        Value::Bool(b) => {
            out.insert(path.to_string(), FieldValue::Bool(*b));
        }
        Value::Number(n) => {
            // Integers outside f64 range are astronomically far from any
            // clinical value; lossy as_f64 is acceptable here.
            out.insert(
                path.to_string(),
                FieldValue::Num(n.as_f64().unwrap_or(f64::NAN)),
            );
        }
        Value::String(s) => {
            out.insert(path.to_string(), FieldValue::Str(s.clone()));
        }
    }

    Ok(())
}

/// Recognize a `{value, unit}` leaf.
///
/// The object must have exactly those two keys, a numeric `value`, and a
/// string `unit` — anything looser recurses as an ordinary mapping.
fn as_quantity(map: &serde_json::Map<String, Value>) -> Option<FieldValue> {
    if map.len() != 2 {
        return None;
    }
    let value = map.get("value")?.as_f64()?;
    let unit = map.get("unit")?.as_str()?;
    Some(FieldValue::Quantity {
        value,
        unit: unit.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
