//! In-memory query execution over a list of records.
//!
//! Everything works on record positions so the same ordering can drive reads
//! (which clone the records out) and updates (which write back in place).

use std::cmp::Ordering;

use serde_json::Value;

use crate::error::QueryError;

use super::operators::{compare_values, get_field_value, matches_filter};
use super::types::{normalize_sort, ExecuteQueryResult, SortDirection, SortEntry, StoreQuery};

// ============================================================================
// Ordering
// ============================================================================

/// Cascading comparison over `sort`. Missing fields compare as `null`.
pub fn compare_records(a: &Value, b: &Value, sort: &[SortEntry]) -> Ordering {
    sort.iter()
        .map(|entry| {
            let va = get_field_value(a, &entry.field).unwrap_or(&Value::Null);
            let vb = get_field_value(b, &entry.field).unwrap_or(&Value::Null);
            match entry.direction {
                SortDirection::Asc => compare_values(va, vb),
                SortDirection::Desc => compare_values(vb, va),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of owned records.
pub fn sort_records(mut records: Vec<Value>, sort: &[SortEntry]) -> Vec<Value> {
    records.sort_by(|a, b| compare_records(a, b, sort));
    records
}

/// Skip `offset` items, then keep at most `limit`.
pub fn paginate_records<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

// ============================================================================
// Positions
// ============================================================================

fn filtered_positions(records: &[Value], filter: Option<&Value>) -> Result<Vec<usize>, QueryError> {
    let mut positions = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let matched = match filter {
            Some(filter) => matches_filter(record, filter)?,
            None => true,
        };
        if matched {
            positions.push(idx);
        }
    }
    Ok(positions)
}

fn sort_positions(records: &[Value], positions: &mut [usize], query: &StoreQuery) {
    if let Some(entries) = normalize_sort(query.sort.clone()) {
        positions.sort_by(|&a, &b| compare_records(&records[a], &records[b], &entries));
    }
}

/// Positions of the records a query selects, in query order: filter, then
/// sort, then offset and limit.
pub fn matching_positions(records: &[Value], query: &StoreQuery) -> Result<Vec<usize>, QueryError> {
    let mut positions = filtered_positions(records, query.filter.as_ref())?;
    sort_positions(records, &mut positions, query);
    Ok(paginate_records(positions, query.offset, query.limit))
}

// ============================================================================
// Reads
// ============================================================================

/// Run a query. `total` counts matches before pagination.
pub fn execute_query(records: &[Value], query: &StoreQuery) -> Result<ExecuteQueryResult, QueryError> {
    let mut positions = filtered_positions(records, query.filter.as_ref())?;
    let total = positions.len();
    sort_positions(records, &mut positions, query);

    let records = paginate_records(positions, query.offset, query.limit)
        .into_iter()
        .map(|idx| records[idx].clone())
        .collect();
    Ok(ExecuteQueryResult { records, total })
}

pub fn find_first(records: &[Value], query: &StoreQuery) -> Result<Option<Value>, QueryError> {
    let first = matching_positions(records, query)?.into_iter().next();
    Ok(first.map(|idx| records[idx].clone()))
}

/// Matches of the filter alone; sort and pagination are ignored.
pub fn count_matching(records: &[Value], query: &StoreQuery) -> Result<usize, QueryError> {
    Ok(filtered_positions(records, query.filter.as_ref())?.len())
}
