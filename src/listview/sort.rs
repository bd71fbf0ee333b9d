use std::cmp::Ordering;

use super::error::ListViewError;
use super::types::{ListRecord, SortDirection, SortState};

/// Parse a `"column [asc|desc]"` expression, checking the column against
/// the record's accessor table
pub fn parse_sort<R: ListRecord>(expr: &str) -> Result<SortState, ListViewError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Ok(SortState::default());
    }

    let mut it = trimmed.split_whitespace();
    let column = it.next().ok_or_else(|| ListViewError::InvalidSort(expr.to_string()))?;
    let direction = match it.next() {
        None => SortDirection::Asc,
        Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        Some(d) => return Err(ListViewError::InvalidDirection(d.to_string())),
    };
    if it.next().is_some() {
        return Err(ListViewError::InvalidSort(expr.to_string()));
    }

    let key = resolve_column::<R>(column)?;
    Ok(SortState::by(key, direction))
}

/// Canonical key for a column name, matched case-insensitively
pub fn resolve_column<R: ListRecord>(column: &str) -> Result<&'static str, ListViewError> {
    R::column(column).map(|c| c.key).ok_or_else(|| ListViewError::UnknownColumn {
        column: column.to_string(),
        available: R::columns().iter().map(|c| c.key).collect::<Vec<_>>().join(", "),
    })
}

/// Comparator for the active column; `Equal` everywhere when no column
/// is active, so a stable sort keeps fetch order
pub fn compare<R: ListRecord>(a: &R, b: &R, state: &SortState) -> Ordering {
    let Some(column) = state.key.as_deref().and_then(R::column) else {
        return Ordering::Equal;
    };
    let ord = (column.get)(a).total_cmp(&(column.get)(b));
    match state.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Stable sort by the active column
pub fn sort<R: ListRecord>(rows: &mut [&R], state: &SortState) {
    if state.key.is_some() {
        rows.sort_by(|a, b| compare(*a, *b, state));
    }
}

/// Case-insensitive substring match against any searchable field.
/// The search text is used as typed, surrounding spaces included.
pub fn matches<R: ListRecord>(record: &R, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    record
        .search_values()
        .iter()
        .any(|v| v.display().to_lowercase().contains(&needle))
}
