use std::path::Path;

use chrono::NaiveDate;

use crate::data::{Table, Value};
use crate::error::Result;

use super::{group_sum, numeric_columns, to_years, Period, Report};

/// Attendance of the reading room per service slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRoom(Report);

impl From<Report> for ReadingRoom {
    fn from(report: Report) -> Self {
        Self(report)
    }
}

impl ReadingRoom {
    pub fn open(path: &Path, period: Period) -> Result<Self> {
        Report::open(path, period).map(Self)
    }

    pub fn new(table: Table, period: Period) -> Self {
        Self(Report::new(table, period))
    }

    pub fn table(&self) -> &Table {
        &self.0.table
    }

    /// Every usage column summed per year. `ignore` names numeric columns
    /// that are not usage counts (such as the month).
    pub fn use_by_years(&self, year_col: &str, ignore: &[&str]) -> Result<Table> {
        let table = to_years(&self.0.table, year_col)?;
        let mut exclude = vec![year_col];
        exclude.extend_from_slice(ignore);
        let values = numeric_columns(&table, &exclude);
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        group_sum(&table, &[year_col], &values)
    }

    /// Usage per month of `year`, keyed by the first day of the month.
    ///
    /// Columns: `date_col`, `year_col`, then the usage columns.
    pub fn use_by_months(
        &self,
        year_col: &str,
        date_col: &str,
        month_col: &str,
        year: i32,
    ) -> Result<Table> {
        let mut table = self.0.table.clone();
        let y = table.column_index(year_col)?;
        let m = table.column_index(month_col)?;
        let d = table.ensure_column(date_col);
        for row in &mut table.rows {
            let month = row[m].as_f64().and_then(|v| u32::try_from(v as i64).ok());
            row[d] = match (row[y].year(), month) {
                (Some(yr), Some(mo)) => NaiveDate::from_ymd_opt(yr, mo, 1)
                    .map(Value::Date)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            };
        }
        table.retain_rows(|row| row[d].year() == Some(year));

        let values = numeric_columns(&table, &[year_col, month_col, date_col]);
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        group_sum(&table, &[date_col, year_col], &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{table, ymd};

    fn attendance() -> ReadingRoom {
        let rows = [
            (2019, 1, 10, 4),
            (2019, 1, 5, 1),
            (2019, 2, 7, 0),
            (2020, 1, 3, 2),
        ]
        .into_iter()
        .map(|(y, m, morning, evening)| {
            vec![
                Value::Integer(y),
                Value::Integer(m),
                Value::Integer(morning),
                Value::Integer(evening),
                "Lesesaal".into(),
            ]
        })
        .collect();
        ReadingRoom::new(
            table(&["Jahr", "Monat", "Vormittag", "Abend", "Ort"], rows),
            Period::new(ymd(2014, 12, 1), ymd(2020, 3, 1)),
        )
    }

    #[test]
    fn yearly_use_skips_month_and_text() {
        let t = attendance().use_by_years("Jahr", &["Monat"]).unwrap();
        assert_eq!(t.columns, vec!["Jahr", "Vormittag", "Abend"]);
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Integer(2019), Value::Integer(22), Value::Integer(5)],
                vec![Value::Integer(2020), Value::Integer(3), Value::Integer(2)],
            ]
        );
    }

    #[test]
    fn monthly_use_of_one_year() {
        let t = attendance().use_by_months("Jahr", "Datum", "Monat", 2019).unwrap();
        assert_eq!(t.columns, vec!["Datum", "Jahr", "Vormittag", "Abend"]);
        assert_eq!(
            t.rows,
            vec![
                vec![
                    ymd(2019, 1, 1).into(),
                    Value::Integer(2019),
                    Value::Integer(15),
                    Value::Integer(5)
                ],
                vec![
                    ymd(2019, 2, 1).into(),
                    Value::Integer(2019),
                    Value::Integer(7),
                    Value::Integer(0)
                ],
            ]
        );
    }
}
