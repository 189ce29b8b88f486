//! Aggregation layer: derived views over the CSV stores.
//!
//! Every view is computed from an immutable [`Table`] and returns a new
//! table (or a scalar for summary cards), so the dashboard can recompute a
//! single view when a dropdown changes.

pub mod collection;
pub mod expenditures;
pub mod loans;
pub mod present;
pub mod reading_room;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::data::loader::read_store;
use crate::data::{Lookup, Table, Value};
use crate::dates::snapshot_dates;
use crate::error::{Error, Result};

pub use collection::Collection;
pub use expenditures::Expenditures;
pub use loans::LoanStats;
pub use reading_room::ReadingRoom;

/// The reporting window: year-end snapshots start at `start`, "current
/// year" views use `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub today: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, today: NaiveDate) -> Self {
        Self { start, today }
    }

    /// A period ending at the local calendar date.
    pub fn until_today(start: NaiveDate) -> Self {
        Self::new(start, chrono::Local::now().date_naive())
    }

    pub fn current_year(&self) -> i32 {
        self.today.year()
    }
}

/// Read a store for reporting; a missing store is reported as such rather
/// than as a generic I/O failure.
pub fn open_store(path: &Path) -> Result<Table> {
    if !path.is_file() {
        return Err(Error::StoreNotFound(path.to_path_buf()));
    }
    let table = read_store(path)?;
    log::debug!("Opened store {} ({} rows)", path.display(), table.len());
    Ok(table)
}

/// A store together with its reporting window. The domain reports wrap one.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub table: Table,
    pub period: Period,
}

impl Report {
    pub fn new(table: Table, period: Period) -> Self {
        Self { table, period }
    }

    pub fn open(path: &Path, period: Period) -> Result<Self> {
        Ok(Self::new(open_store(path)?, period))
    }

    pub fn year_end_snapshots(&self, date_col: &str) -> Result<Table> {
        year_end_snapshots(&self.table, date_col, &self.period)
    }

    pub fn top_number_values(
        &self,
        group_col: &str,
        sort_col: &str,
        other: &str,
        n: usize,
    ) -> Result<Table> {
        top_number_values(&self.table, group_col, sort_col, other, n)
    }

    pub fn change_column_values(&self, column: &str, lookup: &Lookup) -> Result<Table> {
        change_column_values(&self.table, column, lookup)
    }

    /// Rows whose date in `date_col` falls in the current year.
    pub(crate) fn current_year_rows(&self, date_col: &str) -> Result<Table> {
        let idx = self.table.column_index(date_col)?;
        let year = self.period.current_year();
        let mut out = self.table.clone();
        out.retain_rows(|row| row[idx].as_date().is_some_and(|d| d.year() == year));
        Ok(out)
    }
}

/// Default group count before the rest is relabelled as "other".
pub const DEFAULT_TOP_N: usize = 9;

fn resolve(table: &Table, names: &[&str]) -> Result<Vec<usize>> {
    names.iter().map(|n| table.column_index(n)).collect()
}

/// Sum `values` per distinct combination of `keys`. Groups come out sorted
/// by key; rows with a `Null` key are dropped.
pub fn group_sum(table: &Table, keys: &[&str], values: &[&str]) -> Result<Table> {
    let key_idx = resolve(table, keys)?;
    let value_idx = resolve(table, values)?;

    let mut groups: BTreeMap<Vec<Value>, Vec<Value>> = BTreeMap::new();
    for row in &table.rows {
        let key: Vec<Value> = key_idx.iter().map(|&i| row[i].clone()).collect();
        if key.iter().any(Value::is_null) {
            continue;
        }
        let sums = groups
            .entry(key)
            .or_insert_with(|| vec![Value::Integer(0); value_idx.len()]);
        for (sum, &i) in sums.iter_mut().zip(&value_idx) {
            *sum = sum.add(&row[i]);
        }
    }

    let columns = keys.iter().chain(values).map(|s| s.to_string()).collect();
    let rows = groups
        .into_iter()
        .map(|(mut key, sums)| {
            key.extend(sums);
            key
        })
        .collect();
    Ok(Table::from_rows(columns, rows))
}

/// Columns holding only numbers (and at least one), minus `exclude`.
pub fn numeric_columns(table: &Table, exclude: &[&str]) -> Vec<String> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !exclude.contains(&name.as_str()))
        .filter(|(idx, _)| {
            let mut cells = table.rows.iter().map(|r| &r[*idx]).filter(|v| !v.is_null());
            let mut any = false;
            let all = cells.all(|v| {
                any = true;
                v.is_numeric()
            });
            any && all
        })
        .map(|(_, name)| name.clone())
        .collect()
}

/// Sum of a numeric column; `Null` and text count as zero.
pub fn column_sum(table: &Table, column: &str) -> Result<f64> {
    Ok(table.column(column)?.filter_map(Value::as_f64).sum())
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Replace a date (or year-like) column by its year as an integer.
pub fn to_years(table: &Table, column: &str) -> Result<Table> {
    let idx = table.column_index(column)?;
    let mut out = table.clone();
    for row in &mut out.rows {
        row[idx] = row[idx]
            .year()
            .map(|y| Value::Integer(y.into()))
            .unwrap_or(Value::Null);
    }
    Ok(out)
}

/// Group-sum `sort_col` by `group_col`, rank the groups descending and
/// relabel every group outside the first `n` as `other`.
pub fn top_number_values(
    table: &Table,
    group_col: &str,
    sort_col: &str,
    other: &str,
    n: usize,
) -> Result<Table> {
    let sums = group_sum(table, &[group_col], &[sort_col])?;
    let mut ranked: Vec<(Value, f64)> = sums
        .rows
        .into_iter()
        .map(|row| {
            let total = row[1].as_f64().unwrap_or(0.0);
            (row[0].clone(), total)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let keep: BTreeSet<Value> = ranked.into_iter().take(n).map(|(k, _)| k).collect();

    let idx = table.column_index(group_col)?;
    let mut out = table.clone();
    for row in &mut out.rows {
        if !row[idx].is_null() && !keep.contains(&row[idx]) {
            row[idx] = Value::from(other);
        }
    }
    Ok(out)
}

/// Substitute every lookup key (a regular expression) by its value inside
/// the text of `column`.
pub fn change_column_values(table: &Table, column: &str, lookup: &Lookup) -> Result<Table> {
    let rules: Vec<(Regex, String)> = lookup
        .patterns()
        .map(|(pattern, replacement)| Ok((Regex::new(&pattern)?, replacement)))
        .collect::<Result<_>>()?;

    let idx = table.column_index(column)?;
    let mut out = table.clone();
    for row in &mut out.rows {
        let Some(text) = row[idx].text().map(|t| t.into_owned()) else {
            continue;
        };
        let replaced = rules.iter().fold(text.clone(), |acc, (re, rep)| {
            re.replace_all(&acc, rep.as_str()).into_owned()
        });
        if replaced != text {
            row[idx] = Value::from_text(&replaced);
        }
    }
    Ok(out)
}

/// Keep the rows of the year-end snapshot exports and turn their date into
/// the year they report.
///
/// The last snapshot date is replaced by the newest export in the table
/// when that export is not itself a snapshot, so the running year is
/// represented by its latest state.
pub fn year_end_snapshots(table: &Table, date_col: &str, period: &Period) -> Result<Table> {
    let idx = table.column_index(date_col)?;
    let mut dates = snapshot_dates(period.start, period.today);
    let latest = table.rows.iter().filter_map(|r| r[idx].as_date()).max();
    if let Some(latest) = latest {
        if !dates.contains(&latest) {
            if let Some(last) = dates.last_mut() {
                *last = latest;
            }
        }
    }

    let mut out = table.clone();
    out.retain_rows(|row| row[idx].as_date().is_some_and(|d| dates.contains(&d)));
    out.sort_by_columns(&[(date_col, false)])?;
    to_years(&out, date_col)
}
