use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::Datelike;

use crate::data::filter::{apply, only};
use crate::data::{Lookup, Table, Value};
use crate::dates::month_end;
use crate::error::Result;

use super::{group_sum, to_years, top_number_values, Period, Report};

/// Shelfmarks that never count as duplicates.
const NEVER_DUPLICATE: [&str; 2] = ["/", "Signatur"];

/// Classes listed per year by [`Collection::top_class_years`].
const CLASSES_PER_YEAR: usize = 10;

/// Drop every row whose shelfmark already appeared further up, except the
/// placeholder shelfmarks.
fn unique_shelfmarks(table: &Table, shelfmark_col: &str) -> Result<Table> {
    let idx = table.column_index(shelfmark_col)?;
    let mut seen = BTreeSet::new();
    let mut out = table.clone();
    out.retain_rows(|row| {
        let first = seen.insert(row[idx].clone());
        let placeholder = row[idx]
            .text()
            .is_some_and(|t| NEVER_DUPLICATE.contains(&t.as_ref()));
        first || placeholder
    });
    Ok(out)
}

/// Growth of the collection from the new-acquisition store.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection(Report);

impl From<Report> for Collection {
    fn from(report: Report) -> Self {
        Self(report)
    }
}

impl Collection {
    pub fn open(path: &Path, period: Period) -> Result<Self> {
        Report::open(path, period).map(Self)
    }

    pub fn new(table: Table, period: Period) -> Self {
        Self(Report::new(table, period))
    }

    pub fn table(&self) -> &Table {
        &self.0.table
    }

    /// Copies per year and the running total over the years.
    ///
    /// Columns: `date_col` (year), `copy_col`, `cum_col`.
    pub fn total_years(
        &self,
        date_col: &str,
        shelfmark_col: &str,
        copy_col: &str,
        cum_col: &str,
    ) -> Result<Table> {
        let unique = unique_shelfmarks(&self.0.table, shelfmark_col)?;
        let mut years = group_sum(&to_years(&unique, date_col)?, &[date_col], &[copy_col])?;
        let cum = years.ensure_column(cum_col);
        let mut running = Value::Integer(0);
        for row in &mut years.rows {
            running = running.add(&row[1]);
            row[cum] = running.clone();
        }
        Ok(years)
    }

    /// New shelfmarks per month of the current year. Months between the
    /// first and the last active month without acquisitions count zero.
    ///
    /// Columns: `date_col` (last day of the month), `shelfmark_col` (count).
    pub fn current_year_by_month(&self, date_col: &str, shelfmark_col: &str) -> Result<Table> {
        let current = self.0.current_year_rows(date_col)?;
        let unique = unique_shelfmarks(&current, shelfmark_col)?;
        let date = unique.column_index(date_col)?;
        let shelfmark = unique.column_index(shelfmark_col)?;

        let mut counts: BTreeMap<u32, i64> = BTreeMap::new();
        for row in &unique.rows {
            if row[shelfmark].is_null() {
                continue;
            }
            if let Some(d) = row[date].as_date() {
                *counts.entry(d.month()).or_default() += 1;
            }
        }

        let mut out = Table::new(vec![date_col.to_string(), shelfmark_col.to_string()]);
        let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().last()) else {
            return Ok(out);
        };
        let year = self.0.period.current_year();
        for month in first..=last {
            let Some(start) = chrono::NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            let count = counts.get(&month).copied().unwrap_or(0);
            out.rows.push(vec![month_end(start).into(), Value::Integer(count)]);
        }
        Ok(out)
    }

    /// Copies per year and media type; codes are named through `media_types`
    /// and codes without a name are left out.
    ///
    /// Columns: `date_col` (year), `media_col`, `copy_col`.
    pub fn media_type_years(
        &self,
        media_types: &Lookup,
        media_col: &str,
        shelfmark_col: &str,
        date_col: &str,
        copy_col: &str,
    ) -> Result<Table> {
        let mut named = self.0.table.clone();
        let media = named.column_index(media_col)?;
        for row in &mut named.rows {
            row[media] = media_types.get(&row[media]).cloned().unwrap_or(Value::Null);
        }
        let unique = unique_shelfmarks(&named, shelfmark_col)?;
        group_sum(&to_years(&unique, date_col)?, &[date_col, media_col], &[copy_col])
    }

    /// Every acquisition of one main class, with `year_col` added.
    pub fn by_classification(
        &self,
        date_col: &str,
        year_col: &str,
        class_col: &str,
        class: &Value,
    ) -> Result<Table> {
        let mut table = self.0.table.clone();
        let date = table.column_index(date_col)?;
        let year = table.ensure_column(year_col);
        for row in &mut table.rows {
            row[year] = row[date]
                .as_date()
                .map(|d| Value::Integer(d.year().into()))
                .unwrap_or(Value::Null);
        }
        apply(&table, &only(class_col, class.clone()))
    }

    /// Copies per export date with the running total inside each year.
    ///
    /// Columns: `date_col`, `copy_col`, `year_col`, `month_col`, `cum_col`.
    pub fn cumulative_by_month(
        &self,
        shelfmark_col: &str,
        date_col: &str,
        copy_col: &str,
        year_col: &str,
        month_col: &str,
        cum_col: &str,
    ) -> Result<Table> {
        let unique = unique_shelfmarks(&self.0.table, shelfmark_col)?;
        let mut per_date = group_sum(&unique, &[date_col], &[copy_col])?;
        per_date.retain_rows(|row| row[0].as_date().is_some());

        let year = per_date.ensure_column(year_col);
        let month = per_date.ensure_column(month_col);
        let cum = per_date.ensure_column(cum_col);
        let mut running: Option<(i32, Value)> = None;
        for row in &mut per_date.rows {
            let Some(d) = row[0].as_date() else { continue };
            let total = match running.take() {
                Some((y, sum)) if y == d.year() => sum.add(&row[1]),
                _ => Value::Integer(0).add(&row[1]),
            };
            row[year] = Value::Integer(d.year().into());
            row[month] = Value::Integer(d.month().into());
            row[cum] = total.clone();
            running = Some((d.year(), total));
        }
        Ok(per_date)
    }

    /// The ten classes with most copies in every year, ordered by copies and
    /// then class, both descending.
    ///
    /// Columns: `date_col` (year), `class_col`, `copy_col`.
    pub fn top_class_years(
        &self,
        class_col: &str,
        shelfmark_col: &str,
        date_col: &str,
        copy_col: &str,
    ) -> Result<Table> {
        let unique = unique_shelfmarks(&self.0.table, shelfmark_col)?;
        let mut sums = group_sum(&to_years(&unique, date_col)?, &[date_col, class_col], &[copy_col])?;
        sums.sort_by_columns(&[(copy_col, true), (class_col, true)])?;

        let mut per_year: BTreeMap<Value, usize> = BTreeMap::new();
        sums.retain_rows(|row| {
            let taken = per_year.entry(row[0].clone()).or_default();
            *taken += 1;
            *taken <= CLASSES_PER_YEAR
        });
        Ok(sums)
    }

    /// Copies per class over all years for the `n` largest classes, the rest
    /// summed as `other`.
    pub fn class_overall_top(
        &self,
        shelfmark_col: &str,
        class_col: &str,
        copy_col: &str,
        other: &str,
        n: usize,
    ) -> Result<Table> {
        let unique = unique_shelfmarks(&self.0.table, shelfmark_col)?;
        let relabelled = top_number_values(&unique, class_col, copy_col, other, n)?;
        group_sum(&relabelled, &[class_col], &[copy_col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{table, ymd};

    fn acquisitions() -> Collection {
        let rows = vec![
            ("AB 100", "A", "uu", ymd(2019, 3, 1)),
            ("AB 100", "A", "uu", ymd(2019, 4, 1)),
            ("/", "B", "uu", ymd(2019, 4, 1)),
            ("/", "B", "xx", ymd(2019, 4, 1)),
            ("CD 200", "C", "xx", ymd(2020, 1, 1)),
            ("EF 300", "C", "uu", ymd(2020, 4, 1)),
            ("GH 400", "A", "zz", ymd(2020, 4, 1)),
        ];
        let rows = rows
            .into_iter()
            .map(|(s, c, m, d)| vec![s.into(), c.into(), m.into(), Value::Integer(1), d.into()])
            .collect();
        Collection::new(
            table(&["Signatur", "Systematikgruppe", "0500", "Ex", "Datum"], rows),
            Period::new(ymd(2014, 12, 1), ymd(2020, 5, 10)),
        )
    }

    #[test]
    fn placeholders_survive_deduplication() {
        let t = unique_shelfmarks(acquisitions().table(), "Signatur").unwrap();
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn yearly_totals_with_running_sum() {
        let t = acquisitions()
            .total_years("Datum", "Signatur", "Ex", "Gesamt")
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Integer(2019), Value::Integer(3), Value::Integer(3)],
                vec![Value::Integer(2020), Value::Integer(3), Value::Integer(6)],
            ]
        );
    }

    #[test]
    fn current_year_months_are_filled() {
        let t = acquisitions()
            .current_year_by_month("Datum", "Signatur")
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![ymd(2020, 1, 31).into(), Value::Integer(1)],
                vec![ymd(2020, 2, 29).into(), Value::Integer(0)],
                vec![ymd(2020, 3, 31).into(), Value::Integer(0)],
                vec![ymd(2020, 4, 30).into(), Value::Integer(2)],
            ]
        );
    }

    #[test]
    fn media_types_are_named() {
        let names: Lookup = [
            (Value::from("uu"), Value::from("Buch")),
            (Value::from("xx"), Value::from("E-Book")),
        ]
        .into_iter()
        .collect();
        let t = acquisitions()
            .media_type_years(&names, "0500", "Signatur", "Datum", "Ex")
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Integer(2019), "Buch".into(), Value::Integer(2)],
                vec![Value::Integer(2019), "E-Book".into(), Value::Integer(1)],
                vec![Value::Integer(2020), "Buch".into(), Value::Integer(1)],
                vec![Value::Integer(2020), "E-Book".into(), Value::Integer(1)],
            ]
        );
    }

    #[test]
    fn cumulative_restarts_every_year() {
        let t = acquisitions()
            .cumulative_by_month("Signatur", "Datum", "Ex", "Jahr", "Monat", "cum_s")
            .unwrap();
        let cum: Vec<_> = t.column("cum_s").unwrap().cloned().collect();
        assert_eq!(
            cum,
            vec![
                Value::Integer(1),
                Value::Integer(3),
                Value::Integer(1),
                Value::Integer(3)
            ]
        );
        let months: Vec<_> = t.column("Monat").unwrap().cloned().collect();
        assert_eq!(months[1], Value::Integer(4));
    }

    #[test]
    fn top_classes_per_year() {
        let t = acquisitions()
            .top_class_years("Systematikgruppe", "Signatur", "Datum", "Ex")
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Integer(2020), "C".into(), Value::Integer(2)],
                vec![Value::Integer(2019), "B".into(), Value::Integer(2)],
                vec![Value::Integer(2019), "A".into(), Value::Integer(1)],
                vec![Value::Integer(2020), "A".into(), Value::Integer(1)],
            ]
        );
    }

    #[test]
    fn overall_top_and_by_class() {
        let c = acquisitions();
        let t = c
            .class_overall_top("Signatur", "Systematikgruppe", "Ex", "Sonstige", 1)
            .unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec!["A".into(), Value::Integer(2)],
                vec!["Sonstige".into(), Value::Integer(4)],
            ]
        );
        let a = c
            .by_classification("Datum", "Jahr", "Systematikgruppe", &"A".into())
            .unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.rows[2][5], Value::Integer(2020));
    }
}
