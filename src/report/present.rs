//! Turning report tables into what the dashboard draws: dropdown entries,
//! card texts, bars and line series.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::data::{Table, Value};
use crate::error::Result;

use super::numeric_columns;

/// How x values are placed on a plot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Numbers as they are.
    Number,
    /// Year of a date (or an integer year).
    Year,
    /// Month of a date, 1 to 12.
    Month,
}

impl Axis {
    pub fn position(self, value: &Value) -> Option<f64> {
        match self {
            Axis::Number => value.as_f64(),
            Axis::Year => value.year().map(f64::from),
            Axis::Month => match value.as_date() {
                Some(d) => Some(f64::from(d.month())),
                None => value.as_f64(),
            },
        }
    }
}

/// One named line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Sorted distinct values of a column, without `Null`.
pub fn dropdown_options(table: &Table, column: &str) -> Result<Vec<Value>> {
    Ok(table
        .unique_values(column)?
        .into_iter()
        .filter(|v| !v.is_null())
        .collect())
}

/// Whole euros with dots between thousands, e.g. `1.234.567 EUR`.
pub fn format_eur(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{grouped} EUR")
}

/// `(label, value)` pairs in table order; rows without label or number are
/// skipped.
pub fn category_bars(table: &Table, label_col: &str, value_col: &str) -> Result<Vec<(String, f64)>> {
    let label = table.column_index(label_col)?;
    let value = table.column_index(value_col)?;
    Ok(table
        .rows
        .iter()
        .filter(|row| !row[label].is_null())
        .filter_map(|row| Some((row[label].to_string(), row[value].as_f64()?)))
        .collect())
}

/// Split a table into one series per value of `group_col` (a single series
/// named after `y_col` without one), points sorted along x.
pub fn series_by_group(
    table: &Table,
    x_col: &str,
    y_col: &str,
    group_col: Option<&str>,
    axis: Axis,
) -> Result<Vec<Series>> {
    let x = table.column_index(x_col)?;
    let y = table.column_index(y_col)?;
    let group = group_col.map(|g| table.column_index(g)).transpose()?;

    let mut groups: BTreeMap<Value, Vec<[f64; 2]>> = BTreeMap::new();
    for row in &table.rows {
        let key = match group {
            Some(g) if row[g].is_null() => continue,
            Some(g) => row[g].clone(),
            None => Value::from(y_col),
        };
        if let (Some(px), Some(py)) = (axis.position(&row[x]), row[y].as_f64()) {
            groups.entry(key).or_default().push([px, py]);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, mut points)| {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Series {
                name: key.to_string(),
                points,
            }
        })
        .collect())
}

/// One series per numeric column of a wide table, `x_col` and `exclude`
/// left out.
pub fn column_series(table: &Table, x_col: &str, exclude: &[&str], axis: Axis) -> Result<Vec<Series>> {
    let x = table.column_index(x_col)?;
    let mut skip = vec![x_col];
    skip.extend_from_slice(exclude);
    numeric_columns(table, &skip)
        .into_iter()
        .map(|name| {
            let y = table.column_index(&name)?;
            let mut points: Vec<[f64; 2]> = table
                .rows
                .iter()
                .filter_map(|row| Some([axis.position(&row[x])?, row[y].as_f64()?]))
                .collect();
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Ok(Series { name, points })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{table, ymd};

    #[test]
    fn euro_amounts() {
        assert_eq!(format_eur(1_234_567.89), "1.234.567 EUR");
        assert_eq!(format_eur(999.0), "999 EUR");
        assert_eq!(format_eur(1000.0), "1.000 EUR");
        assert_eq!(format_eur(0.4), "0 EUR");
        assert_eq!(format_eur(-12_345.0), "-12.345 EUR");
    }

    #[test]
    fn options_are_sorted_without_null() {
        let t = table(
            &["Lieferant"],
            vec![vec!["Marx".into()], vec![Value::Null], vec!["Antiquariat".into()]],
        );
        assert_eq!(
            dropdown_options(&t, "Lieferant").unwrap(),
            vec![Value::from("Antiquariat"), Value::from("Marx")]
        );
    }

    #[test]
    fn series_per_group() {
        let t = table(
            &["Datum", "Ex", "Jahr"],
            vec![
                vec![ymd(2019, 3, 1).into(), Value::Integer(2), Value::Integer(2019)],
                vec![ymd(2019, 1, 1).into(), Value::Integer(1), Value::Integer(2019)],
                vec![ymd(2020, 2, 1).into(), Value::Float(4.5), Value::Integer(2020)],
            ],
        );
        let series = series_by_group(&t, "Datum", "Ex", Some("Jahr"), Axis::Month).unwrap();
        assert_eq!(
            series,
            vec![
                Series {
                    name: "2019".into(),
                    points: vec![[1.0, 1.0], [3.0, 2.0]]
                },
                Series {
                    name: "2020".into(),
                    points: vec![[2.0, 4.5]]
                },
            ]
        );
        let single = series_by_group(&t, "Datum", "Ex", None, Axis::Year).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].name, "Ex");
    }

    #[test]
    fn wide_tables_give_one_series_per_column() {
        let t = table(
            &["Jahr", "Vormittag", "Abend", "Ort"],
            vec![
                vec![Value::Integer(2020), Value::Integer(3), Value::Integer(1), "L".into()],
                vec![Value::Integer(2019), Value::Integer(5), Value::Integer(2), "L".into()],
            ],
        );
        let series = column_series(&t, "Jahr", &[], Axis::Year).unwrap();
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Vormittag", "Abend"]);
        assert_eq!(series[0].points, vec![[2019.0, 5.0], [2020.0, 3.0]]);
    }

    #[test]
    fn bars_skip_unlabelled_rows() {
        let t = table(
            &["Systematikgruppe", "Ex"],
            vec![
                vec!["A".into(), Value::Integer(3)],
                vec![Value::Null, Value::Integer(1)],
            ],
        );
        assert_eq!(
            category_bars(&t, "Systematikgruppe", "Ex").unwrap(),
            vec![("A".to_string(), 3.0)]
        );
    }
}
