//! Row operations for repeatable list fields
//!
//! A list always holds at least one row. Every operation restores that floor,
//! so callers may hand in an empty or missing list.

/// Ensure the list has at least one (possibly empty) row.
pub fn normalize_rows(rows: &mut Vec<String>) {
    if rows.is_empty() {
        rows.push(String::new());
    }
}

/// Append an empty row. Returns `false` once the list holds `max` rows.
pub fn add_row(rows: &mut Vec<String>, max: usize) -> bool {
    normalize_rows(rows);
    if rows.len() >= max {
        return false;
    }
    rows.push(String::new());
    true
}

/// Remove the row at `index`; removing the only row leaves one empty row.
pub fn remove_row(rows: &mut Vec<String>, index: usize) -> bool {
    normalize_rows(rows);
    if index >= rows.len() {
        return false;
    }
    rows.remove(index);
    normalize_rows(rows);
    true
}

/// Replace the row at `index`.
pub fn set_row(rows: &mut Vec<String>, index: usize, value: impl Into<String>) -> bool {
    normalize_rows(rows);
    match rows.get_mut(index) {
        Some(row) => {
            *row = value.into();
            true
        }
        None => false,
    }
}
