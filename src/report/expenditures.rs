use std::path::Path;

use crate::data::filter::{apply, only};
use crate::data::{Table, Value};
use crate::error::Result;

use super::{column_sum, group_sum, round2, top_number_values, Period, Report};

/// Sales per supplier or spending per cost centre ("body").
///
/// The stores hold cumulative amounts per export, so yearly figures come
/// from the year-end snapshots and current figures from the latest export.
#[derive(Debug, Clone, PartialEq)]
pub struct Expenditures(Report);

impl From<Report> for Expenditures {
    fn from(report: Report) -> Self {
        Self(report)
    }
}

impl Expenditures {
    pub fn open(path: &Path, period: Period) -> Result<Self> {
        Report::open(path, period).map(Self)
    }

    pub fn new(table: Table, period: Period) -> Self {
        Self(Report::new(table, period))
    }

    pub fn table(&self) -> &Table {
        &self.0.table
    }

    /// Sum over all year-end snapshots, rounded to cents.
    pub fn total_net(&self, date_col: &str, amount_col: &str) -> Result<f64> {
        let snapshots = self.0.year_end_snapshots(date_col)?;
        Ok(round2(column_sum(&snapshots, amount_col)?))
    }

    /// Average yearly amount of one body; missing amounts count as zero.
    pub fn mean_by_body(
        &self,
        date_col: &str,
        amount_col: &str,
        body_col: &str,
        body: &Value,
    ) -> Result<Option<f64>> {
        let rows = self.net_years_by_body(date_col, body_col, body)?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(column_sum(&rows, amount_col)? / rows.len() as f64))
    }

    /// Year-end rows of one body, the date replaced by the year.
    pub fn net_years_by_body(&self, date_col: &str, body_col: &str, body: &Value) -> Result<Table> {
        let snapshots = self.0.year_end_snapshots(date_col)?;
        apply(&snapshots, &only(body_col, body.clone()))
    }

    fn latest_export(&self, date_col: &str) -> Result<Table> {
        let latest = self.0.table.column(date_col)?.filter_map(Value::as_date).max();
        match latest {
            Some(date) => apply(&self.0.table, &only(date_col, date.into())),
            None => Ok(Table::new(self.0.table.columns.clone())),
        }
    }

    /// Sum over the latest export.
    pub fn net_current_year(&self, date_col: &str, amount_col: &str) -> Result<f64> {
        column_sum(&self.latest_export(date_col)?, amount_col)
    }

    /// Amount of one body in the latest export, rounded to cents.
    pub fn net_current_year_by_body(
        &self,
        date_col: &str,
        amount_col: &str,
        body_col: &str,
        body: &Value,
    ) -> Result<f64> {
        let latest = self.latest_export(date_col)?;
        let rows = apply(&latest, &only(body_col, body.clone()))?;
        Ok(round2(column_sum(&rows, amount_col)?))
    }

    /// All year-end rows, the date replaced by the year.
    pub fn net_years(&self, date_col: &str) -> Result<Table> {
        self.0.year_end_snapshots(date_col)
    }

    /// This year's exports of one body in date order, with `diff_col`
    /// holding the change against the previous export.
    pub fn monthly_difference(
        &self,
        date_col: &str,
        body_col: &str,
        amount_col: &str,
        diff_col: &str,
        body: &Value,
    ) -> Result<Table> {
        let mut rows = apply(&self.0.current_year_rows(date_col)?, &only(body_col, body.clone()))?;
        rows.sort_by_columns(&[(date_col, false)])?;

        let amount = rows.column_index(amount_col)?;
        let diff = rows.ensure_column(diff_col);
        let mut previous: Option<f64> = None;
        for row in &mut rows.rows {
            let current = row[amount].as_f64();
            row[diff] = match (current, previous) {
                (Some(c), Some(p)) => Value::Float(c - p),
                (Some(c), None) => Value::Float(c),
                (None, _) => Value::Null,
            };
            previous = current;
        }
        Ok(rows)
    }

    /// Year-end totals per body for the `n` largest bodies, the rest summed
    /// as `other`.
    pub fn top_bodies(
        &self,
        date_col: &str,
        body_col: &str,
        amount_col: &str,
        other: &str,
        n: usize,
    ) -> Result<Table> {
        let snapshots = self.0.year_end_snapshots(date_col)?;
        let per_body = group_sum(&snapshots, &[body_col], &[amount_col])?;
        let relabelled = top_number_values(&per_body, body_col, amount_col, other, n)?;
        group_sum(&relabelled, &[body_col], &[amount_col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{table, ymd};

    fn sales() -> Expenditures {
        let rows = vec![
            ("Marx", 100.0, ymd(2015, 12, 1)),
            ("Antiquariat", 40.0, ymd(2015, 12, 1)),
            ("Marx", 200.0, ymd(2016, 12, 1)),
            ("Antiquariat", 10.0, ymd(2016, 12, 1)),
            ("Marx", 20.0, ymd(2017, 2, 1)),
            ("Marx", 50.5, ymd(2017, 3, 1)),
            ("Antiquariat", 5.0, ymd(2017, 3, 1)),
            ("Hugendubel", 1.25, ymd(2017, 3, 1)),
        ];
        let rows = rows
            .into_iter()
            .map(|(s, v, d)| vec![s.into(), Value::Float(v), d.into()])
            .collect();
        Expenditures::new(
            table(&["Lieferant", "Umsatz", "Datum"], rows),
            Period::new(ymd(2014, 12, 1), ymd(2017, 3, 20)),
        )
    }

    #[test]
    fn totals_over_snapshots() {
        let e = sales();
        // 2015 + 2016 snapshots plus the latest export standing in for 2017
        assert_eq!(e.total_net("Datum", "Umsatz").unwrap(), 406.75);
        assert_eq!(e.net_current_year("Datum", "Umsatz").unwrap(), 56.75);
    }

    #[test]
    fn body_figures() {
        let e = sales();
        let marx = Value::from("Marx");
        assert_eq!(
            e.net_current_year_by_body("Datum", "Umsatz", "Lieferant", &marx)
                .unwrap(),
            50.5
        );
        let mean = e.mean_by_body("Datum", "Umsatz", "Lieferant", &marx).unwrap();
        assert_eq!(mean, Some((100.0 + 200.0 + 50.5) / 3.0));
        let years = e.net_years_by_body("Datum", "Lieferant", &marx).unwrap();
        let labels: Vec<_> = years.column("Datum").unwrap().cloned().collect();
        assert_eq!(
            labels,
            vec![Value::Integer(2015), Value::Integer(2016), Value::Integer(2017)]
        );
        assert_eq!(
            e.mean_by_body("Datum", "Umsatz", "Lieferant", &Value::from("Nobody"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn monthly_difference_of_cumulative_amounts() {
        let e = sales();
        let t = e
            .monthly_difference("Datum", "Lieferant", "Umsatz", "Umsatz Diff", &"Marx".into())
            .unwrap();
        let diffs: Vec<_> = t.column("Umsatz Diff").unwrap().cloned().collect();
        assert_eq!(diffs, vec![Value::Float(20.0), Value::Float(30.5)]);
    }

    #[test]
    fn top_bodies_bucket_the_rest() {
        let t = sales()
            .top_bodies("Datum", "Lieferant", "Umsatz", "Sonstige", 1)
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec!["Marx".into(), Value::Float(350.5)],
                vec!["Sonstige".into(), Value::Float(56.25)],
            ]
        );
    }
}
