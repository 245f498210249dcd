//! Filter operator evaluation for the in-memory store.
//! Implements MongoDB-style filter semantics with array lifting.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::QueryError;

// ============================================================================
// Value Comparison
// ============================================================================

/// Compare two JSON values for ordering.
///
/// - Both Null → Equal
/// - a is Null → Greater (nulls sort to end)
/// - b is Null → Less
/// - Both numbers → f64 comparison (NaN treated as Equal)
/// - Both strings → lexicographic (codepoint order)
/// - Both booleans → false < true
/// - Cross-type → type rank: number(0), string(1), bool(2), other(3)
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(na), Value::Number(nb)) => {
            let fa = na.as_f64().unwrap_or(f64::NAN);
            let fb = nb.as_f64().unwrap_or(f64::NAN);
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        }
        (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

// ============================================================================
// Operator Detection
// ============================================================================

/// Returns the operator map when `value` is a non-empty object whose keys all
/// start with `$`.
pub fn as_operator(value: &Value) -> Option<&Map<String, Value>> {
    match value.as_object() {
        Some(obj) if !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')) => Some(obj),
        _ => None,
    }
}

pub fn is_operator(value: &Value) -> bool {
    as_operator(value).is_some()
}

// ============================================================================
// Field Path Resolution
// ============================================================================

/// Get a nested value from a record using a dot-separated path.
/// Returns `None` if any path segment is missing or the parent is not an object.
pub fn get_field_value<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

// ============================================================================
// Operator Evaluation
// ============================================================================

fn in_items(value: &Value, items: &[Value]) -> bool {
    // Array-on-array: any element of value appears in operand
    if let Some(arr) = value.as_array() {
        return arr.iter().any(|v| items.contains(v));
    }
    items.contains(value)
}

fn ordered(value: &Value, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    if value.is_null() || operand.is_null() {
        return false;
    }
    accept(compare_values(value, operand))
}

/// Evaluate a single scalar operator (no array lifting).
fn evaluate_scalar_operator(value: &Value, op: &str, operand: &Value) -> Result<bool, QueryError> {
    match op {
        "$eq" => Ok(value == operand),

        "$ne" => Ok(value != operand),

        "$gt" => Ok(ordered(value, operand, |o| o == Ordering::Greater)),

        "$gte" => Ok(ordered(value, operand, |o| o != Ordering::Less)),

        "$lt" => Ok(ordered(value, operand, |o| o == Ordering::Less)),

        "$lte" => Ok(ordered(value, operand, |o| o != Ordering::Greater)),

        "$in" => Ok(operand
            .as_array()
            .is_some_and(|items| in_items(value, items))),

        "$nin" => Ok(operand
            .as_array()
            .map_or(true, |items| !in_items(value, items))),

        "$regex" => {
            let (Some(text), Some(pattern)) = (value.as_str(), operand.as_str()) else {
                return Ok(false);
            };
            let re = regex::Regex::new(pattern)
                .map_err(|e| QueryError::InvalidRegex(e.to_string()))?;
            Ok(re.is_match(text))
        }

        "$size" => {
            let (Some(arr), Some(expected)) = (value.as_array(), operand.as_f64()) else {
                return Ok(false);
            };
            Ok(arr.len() == expected as usize)
        }

        "$all" => {
            let (Some(arr), Some(targets)) = (value.as_array(), operand.as_array()) else {
                return Ok(false);
            };
            // Vacuous truth for empty operand
            Ok(targets.iter().all(|target| arr.contains(target)))
        }

        other => Err(QueryError::UnknownOperator(other.to_string())),
    }
}

/// Liftable operators: when value is array and operand is scalar, ANY element must match.
const LIFTABLE_OPS: &[&str] = &["$eq", "$gt", "$gte", "$lt", "$lte"];
/// Inverted liftable operators: when value is array, ALL elements must match.
const LIFTABLE_INVERTED_OPS: &[&str] = &["$ne"];

/// Evaluate a single operator with array lifting for liftable ops.
fn evaluate_single_operator(value: &Value, op: &str, operand: &Value) -> Result<bool, QueryError> {
    if let Some(arr) = value.as_array() {
        if !operand.is_array() {
            if LIFTABLE_OPS.contains(&op) {
                for elem in arr {
                    if evaluate_scalar_operator(elem, op, operand)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            if LIFTABLE_INVERTED_OPS.contains(&op) {
                for elem in arr {
                    if !evaluate_scalar_operator(elem, op, operand)? {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
        }
    }
    evaluate_scalar_operator(value, op, operand)
}

/// Evaluate an operator object `{ $op: operand, ... }` against a field.
/// `value` is `None` when the field is absent, which only `$exists` observes.
fn evaluate_operators(value: Option<&Value>, ops: &Map<String, Value>) -> Result<bool, QueryError> {
    let resolved = value.unwrap_or(&Value::Null);
    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$exists" => operand.as_bool().unwrap_or(false) == value.is_some(),
            "$not" => !evaluate_field_filter(value, operand)?,
            _ => evaluate_single_operator(resolved, op, operand)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

// ============================================================================
// Filter Evaluation
// ============================================================================

/// Evaluate a field condition (either direct equality or operator object).
fn evaluate_field_filter(value: Option<&Value>, filter: &Value) -> Result<bool, QueryError> {
    match as_operator(filter) {
        Some(ops) => evaluate_operators(value, ops),
        // Direct value: shorthand for $eq (with array lifting)
        None => evaluate_single_operator(value.unwrap_or(&Value::Null), "$eq", filter),
    }
}

fn sub_filters(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Evaluate a MongoDB-style filter against a record.
///
/// Logical operators (`$and`, `$or`, `$nor`) are evaluated first; then field
/// conditions (implicit AND). Other `$`-prefixed top-level keys are rejected.
pub fn matches_filter(record: &Value, filter: &Value) -> Result<bool, QueryError> {
    let filter_obj = match filter.as_object() {
        Some(o) => o,
        None => return Ok(true),
    };

    for (key, condition) in filter_obj {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(condition) {
                    if !matches_filter(record, sub)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(condition) {
                    if matches_filter(record, sub)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for sub in sub_filters(condition) {
                    if matches_filter(record, sub)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            other if other.starts_with('$') => {
                return Err(QueryError::UnknownOperator(other.to_string()));
            }
            path => evaluate_field_filter(get_field_value(record, path), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Filter a slice of records, returning those that match the filter (cloned).
pub fn filter_records(records: &[Value], filter: &Value) -> Result<Vec<Value>, QueryError> {
    let mut result = Vec::new();
    for record in records {
        if matches_filter(record, filter)? {
            result.push(record.clone());
        }
    }
    Ok(result)
}

// ============================================================================
// Tests (inline unit tests)
// ============================================================================
