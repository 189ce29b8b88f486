use std::collections::{BTreeMap, BTreeSet};

use super::model::{Table, Value};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the state is unconstrained; an empty set hides
/// every row.
pub type FilterState = BTreeMap<String, BTreeSet<Value>>;

/// Initialise a [`FilterState`] for `columns` with all values selected.
pub fn init_filter_state(table: &Table, columns: &[&str]) -> Result<FilterState> {
    columns
        .iter()
        .map(|col| Ok((col.to_string(), table.unique_values(col)?)))
        .collect()
}

/// A state selecting a single value of one column (dropdown selection).
pub fn only(column: &str, value: Value) -> FilterState {
    FilterState::from([(column.to_string(), BTreeSet::from([value]))])
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
///
/// `Null` cells therefore pass only when `Null` itself is selected.
pub fn filtered_indices(table: &Table, filters: &FilterState) -> Result<Vec<usize>> {
    let resolved: Vec<(usize, &BTreeSet<Value>)> = filters
        .iter()
        .map(|(col, selected)| Ok((table.column_index(col)?, selected)))
        .collect::<Result<_>>()?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            resolved
                .iter()
                .all(|(idx, selected)| selected.contains(&row[*idx]))
        })
        .map(|(i, _)| i)
        .collect())
}

/// Apply `filters` and return the passing rows as a new table.
pub fn apply(table: &Table, filters: &FilterState) -> Result<Table> {
    let indices = filtered_indices(table, filters)?;
    Ok(table.select_indices(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Lieferant".into(), "Jahr".into()],
            vec![
                vec!["Antiquariat".into(), Value::Integer(2019)],
                vec!["Marx".into(), Value::Integer(2019)],
                vec![Value::Null, Value::Integer(2020)],
            ],
        )
    }

    #[test]
    fn single_value_selection() {
        let t = sample();
        let idx = filtered_indices(&t, &only("Lieferant", "Marx".into())).unwrap();
        assert_eq!(idx, vec![1]);
    }

    #[test]
    fn full_selection_keeps_everything() {
        let t = sample();
        let state = init_filter_state(&t, &["Lieferant", "Jahr"]).unwrap();
        assert_eq!(filtered_indices(&t, &state).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let t = sample();
        let mut state = FilterState::new();
        state.insert("Jahr".into(), BTreeSet::new());
        assert!(filtered_indices(&t, &state).unwrap().is_empty());
    }

    #[test]
    fn null_needs_explicit_selection() {
        let t = sample();
        let mut state = only("Lieferant", "Marx".into());
        state.get_mut("Lieferant").unwrap().insert(Value::Null);
        assert_eq!(filtered_indices(&t, &state).unwrap(), vec![1, 2]);
    }
}
