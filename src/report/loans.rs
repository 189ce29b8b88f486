use std::collections::BTreeMap;
use std::path::Path;

use crate::data::{Table, Value};
use crate::error::Result;

use super::{group_sum, to_years, top_number_values, Period, Report};

/// Loan counts per title and RVK class.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanStats(Report);

impl From<Report> for LoanStats {
    fn from(report: Report) -> Self {
        Self(report)
    }
}

impl LoanStats {
    pub fn open(path: &Path, period: Period) -> Result<Self> {
        Report::open(path, period).map(Self)
    }

    pub fn new(table: Table, period: Period) -> Self {
        Self(Report::new(table, period))
    }

    pub fn table(&self) -> &Table {
        &self.0.table
    }

    /// Loans per year and class, keeping the `n` classes with most loans and
    /// summing the rest as `other`.
    ///
    /// Columns: `year_col`, `class_col`, `loan_col`.
    pub fn total_loans(
        &self,
        year_col: &str,
        loan_col: &str,
        class_col: &str,
        other: &str,
        n: usize,
    ) -> Result<Table> {
        let years = to_years(&self.0.table, year_col)?;
        let relabelled = top_number_values(&years, class_col, loan_col, other, n)?;
        group_sum(&relabelled, &[year_col, class_col], &[loan_col])
    }

    /// The `n` rows with most loans in every year, years ascending and loans
    /// descending within a year.
    pub fn top_loans_by_title(&self, year_col: &str, loan_col: &str, n: usize) -> Result<Table> {
        let table = &self.0.table;
        let year = table.column_index(year_col)?;
        let loans = table.column_index(loan_col)?;

        let mut per_year: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
        for (i, row) in table.rows.iter().enumerate() {
            if !row[year].is_null() && row[loans].is_numeric() {
                per_year.entry(&row[year]).or_default().push(i);
            }
        }

        let mut selected = Vec::new();
        for (_, mut rows) in per_year {
            rows.sort_by(|&a, &b| {
                let a = table.rows[a][loans].as_f64().unwrap_or(0.0);
                let b = table.rows[b][loans].as_f64().unwrap_or(0.0);
                b.total_cmp(&a)
            });
            selected.extend(rows.into_iter().take(n));
        }
        Ok(table.select_indices(&selected))
    }

    /// Loans per class over all years without `exclude`, keeping the `n`
    /// largest classes and summing the rest as `other`.
    pub fn library_loan_class(
        &self,
        class_col: &str,
        exclude: &Value,
        loan_col: &str,
        other: &str,
        n: usize,
    ) -> Result<Table> {
        let mut table = self.0.table.clone();
        let class = table.column_index(class_col)?;
        table.retain_rows(|row| &row[class] != exclude);
        let relabelled = top_number_values(&table, class_col, loan_col, other, n)?;
        group_sum(&relabelled, &[class_col], &[loan_col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{table, ymd};

    fn loans() -> LoanStats {
        let rows = [
            (2019, "Faust", "G", 12),
            (2019, "Werther", "G", 3),
            (2019, "Kochbuch", "Buchservice", 40),
            (2019, "Atlas", "R", 7),
            (2020, "Faust", "G", 5),
            (2020, "Atlas", "R", 9),
            (2020, "Statistik", "Q", 1),
        ]
        .into_iter()
        .map(|(y, title, class, n)| {
            vec![Value::Integer(y), title.into(), class.into(), Value::Integer(n)]
        })
        .collect();
        LoanStats::new(
            table(&["year", "shorttitle", "Systematikgruppe", "cum_loans"], rows),
            Period::new(ymd(2014, 12, 1), ymd(2020, 6, 1)),
        )
    }

    #[test]
    fn loans_per_year_and_class() {
        let t = loans()
            .total_loans("year", "cum_loans", "Systematikgruppe", "Sonstige", 2)
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Integer(2019), "Buchservice".into(), Value::Integer(40)],
                vec![Value::Integer(2019), "G".into(), Value::Integer(15)],
                vec![Value::Integer(2019), "Sonstige".into(), Value::Integer(7)],
                vec![Value::Integer(2020), "G".into(), Value::Integer(5)],
                vec![Value::Integer(2020), "Sonstige".into(), Value::Integer(10)],
            ]
        );
    }

    #[test]
    fn most_borrowed_titles_per_year() {
        let t = loans().top_loans_by_title("year", "cum_loans", 2).unwrap();
        let titles: Vec<_> = t.column("shorttitle").unwrap().cloned().collect();
        assert_eq!(
            titles,
            vec!["Kochbuch".into(), "Faust".into(), "Atlas".into(), "Faust".into()]
        );
    }

    #[test]
    fn excluded_class_is_left_out() {
        let t = loans()
            .library_loan_class(
                "Systematikgruppe",
                &"Buchservice".into(),
                "cum_loans",
                "Sonstige",
                1,
            )
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec!["G".into(), Value::Integer(20)],
                vec!["Sonstige".into(), Value::Integer(17)],
            ]
        );
    }
}
