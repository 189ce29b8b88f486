use std::sync::LazyLock;

use regex::Regex;

use crate::data::{Lookup, Table, Value};
use crate::error::Result;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Row and column cleanup applied to freshly loaded export tables before
/// they are written to a store. Steps chain:
///
/// ```ignore
/// let mut cleaner = Cleaner::new(table);
/// cleaner.remove_rows_with_char('-').normalize_headers();
/// cleaner.map_column("Lieferant Abk.", "Lieferant", &suppliers)?;
/// let table = cleaner.into_table();
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    table: Table,
}

impl Cleaner {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    /// Keep rows `start..end`; open bounds reach the table edges and bounds
    /// past the end are clamped.
    pub fn select_rows(&mut self, start: Option<usize>, end: Option<usize>) -> &mut Self {
        let len = self.table.len();
        let end = end.unwrap_or(len).min(len);
        let start = start.unwrap_or(0).min(end);
        self.table.rows.truncate(end);
        self.table.rows.drain(..start);
        self
    }

    /// Drop rows in which every cell contains `ch`, e.g. the `----  ---`
    /// rulers of fixed-width reports. `Null` cells never match.
    pub fn remove_rows_with_char(&mut self, ch: char) -> &mut Self {
        let before = self.table.len();
        self.table.retain_rows(|row| {
            !row.iter()
                .all(|cell| cell.text().is_some_and(|t| t.contains(ch)))
        });
        log::debug!("Removed {} '{ch}' rows", before - self.table.len());
        self
    }

    /// Trim column headers and collapse inner whitespace to single spaces.
    pub fn normalize_headers(&mut self) -> &mut Self {
        for col in &mut self.table.columns {
            *col = WHITESPACE_RUN.replace_all(col.trim(), " ").into_owned();
        }
        self
    }

    /// Write `source` mapped through `lookup` into `new_column`, keeping the
    /// source value where the lookup has no entry.
    pub fn map_column(
        &mut self,
        new_column: &str,
        source: &str,
        lookup: &Lookup,
    ) -> Result<&mut Self> {
        let src = self.table.column_index(source)?;
        let dst = self.table.ensure_column(new_column);
        for row in &mut self.table.rows {
            row[dst] = lookup.get(&row[src]).unwrap_or(&row[src]).clone();
        }
        Ok(self)
    }

    /// Extract the first capture group of `pattern` from `source` into
    /// `extract_column` and its lookup value into `map_column`. Both are
    /// `Null` where the pattern or the lookup does not match.
    pub fn extract_and_map(
        &mut self,
        source: &str,
        extract_column: &str,
        map_column: &str,
        lookup: &Lookup,
        pattern: &str,
    ) -> Result<&mut Self> {
        let re = Regex::new(pattern)?;
        let src = self.table.column_index(source)?;
        let ext = self.table.ensure_column(extract_column);
        let map = self.table.ensure_column(map_column);

        for row in &mut self.table.rows {
            let extracted = row[src]
                .text()
                .and_then(|text| {
                    re.captures(&text)
                        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                })
                .map(Value::String)
                .unwrap_or(Value::Null);
            row[map] = lookup.get(&extracted).cloned().unwrap_or(Value::Null);
            row[ext] = extracted;
        }
        Ok(self)
    }

    /// Set `target` to `value` on rows whose `source` text contains
    /// `substring`.
    pub fn fill_where_contains(
        &mut self,
        source: &str,
        substring: &str,
        target: &str,
        value: Value,
    ) -> Result<&mut Self> {
        let src = self.table.column_index(source)?;
        let dst = self.table.ensure_column(target);
        let mut filled = 0usize;
        for row in &mut self.table.rows {
            if row[src].text().is_some_and(|t| t.contains(substring)) {
                row[dst] = value.clone();
                filled += 1;
            }
        }
        log::debug!("Set {target} = {value} on {filled} rows");
        Ok(self)
    }

    /// Subtract one from positive `column` values on rows whose `condition`
    /// cell is not `excluded`.
    pub fn decrement_where(
        &mut self,
        column: &str,
        condition: &str,
        excluded: &Value,
    ) -> Result<&mut Self> {
        let calc = self.table.column_index(column)?;
        let cond = self.table.column_index(condition)?;
        for row in &mut self.table.rows {
            if &row[cond] == excluded {
                continue;
            }
            row[calc] = match row[calc] {
                Value::Integer(i) if i > 0 => Value::Integer(i - 1),
                Value::Float(f) if f > 0.0 => Value::Float(f - 1.0),
                ref other => other.clone(),
            };
        }
        Ok(self)
    }

    /// Set every cell of `column` to `value`, creating it if needed.
    pub fn set_constant(&mut self, column: &str, value: Value) -> &mut Self {
        self.table.set_constant(column, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loans() -> Table {
        Table::from_rows(
            vec!["shelfmark".into(), "cum_loans".into()],
            vec![
                vec!["AB 1234 M91".into(), Value::Integer(5)],
                vec!["CD 50 X".into(), Value::Integer(1)],
                vec!["099 Buch".into(), Value::Integer(3)],
                vec![Value::Null, Value::Integer(0)],
            ],
        )
    }

    fn rvk() -> Lookup {
        [
            (Value::from("AB 1234"), Value::from("Geschichte Allgemein")),
            (Value::from("AB"), Value::from("Allgemeines")),
            (Value::from("CD"), Value::from("Philosophie")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn select_rows_clamps() {
        let mut c = Cleaner::new(loans());
        c.select_rows(Some(1), Some(10));
        assert_eq!(c.table().len(), 3);
        c.select_rows(None, Some(1));
        assert_eq!(c.table().rows[0][1], Value::Integer(1));
        c.select_rows(Some(5), None);
        assert!(c.table().is_empty());
    }

    #[test]
    fn removes_ruler_rows_only() {
        let t = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![
                vec!["----".into(), "--".into()],
                vec!["x-y".into(), "5".into()],
                vec!["--".into(), Value::Null],
            ],
        );
        let mut c = Cleaner::new(t);
        c.remove_rows_with_char('-');
        assert_eq!(c.table().len(), 2);
    }

    #[test]
    fn normalizes_headers() {
        let t = Table::new(vec![" S   Bezeichnung ".into(), "Umsatz\t(EUR)".into()]);
        let mut c = Cleaner::new(t);
        c.normalize_headers();
        assert_eq!(c.table().columns, vec!["S Bezeichnung", "Umsatz (EUR)"]);
    }

    #[test]
    fn map_column_keeps_unmapped_values() {
        let t = Table::from_rows(
            vec!["Lieferant".into()],
            vec![vec!["Buchhandlung Marx GmbH".into()], vec!["Unbekannt".into()]],
        );
        let lookup: Lookup = [(Value::from("Buchhandlung Marx GmbH"), Value::from("Marx"))]
            .into_iter()
            .collect();
        let mut c = Cleaner::new(t);
        c.map_column("Lieferant Abk.", "Lieferant", &lookup).unwrap();
        let out: Vec<_> = c.table().column("Lieferant Abk.").unwrap().cloned().collect();
        assert_eq!(out, vec![Value::from("Marx"), Value::from("Unbekannt")]);
    }

    #[test]
    fn rvk_extraction_and_service_adjustment() {
        let mut c = Cleaner::new(loans());
        c.extract_and_map(
            "shelfmark",
            "Systematikstelle",
            "RVK-Bez-SysStelle",
            &rvk(),
            r"([A-Z]{1,2}\s\d{2,5})",
        )
        .unwrap()
        .extract_and_map(
            "shelfmark",
            "Systematikgruppe",
            "RVK-Bez-SysGruppe",
            &rvk(),
            r"(^[A-Z]{1,2})",
        )
        .unwrap()
        .fill_where_contains("shelfmark", "099", "Systematikgruppe", "Buchservice".into())
        .unwrap()
        .decrement_where("cum_loans", "Systematikgruppe", &"Buchservice".into())
        .unwrap();

        let t = c.into_table();
        let stelle: Vec<_> = t.column("Systematikstelle").unwrap().cloned().collect();
        assert_eq!(
            stelle,
            vec!["AB 1234".into(), "CD 50".into(), Value::Null, Value::Null]
        );
        let bez: Vec<_> = t.column("RVK-Bez-SysStelle").unwrap().cloned().collect();
        assert_eq!(bez[0], Value::from("Geschichte Allgemein"));
        assert_eq!(bez[1], Value::Null);

        let gruppe: Vec<_> = t.column("Systematikgruppe").unwrap().cloned().collect();
        assert_eq!(
            gruppe,
            vec!["AB".into(), "CD".into(), "Buchservice".into(), Value::Null]
        );

        let loans: Vec<_> = t.column("cum_loans").unwrap().cloned().collect();
        assert_eq!(
            loans,
            vec![
                Value::Integer(4),
                Value::Integer(0),
                Value::Integer(3),
                Value::Integer(0)
            ]
        );
    }

    #[test]
    fn constant_column() {
        let mut c = Cleaner::new(loans());
        c.set_constant("Ex", Value::Integer(1));
        assert!(c.table().column("Ex").unwrap().all(|v| *v == Value::Integer(1)));
    }

    #[test]
    fn missing_source_column_errors() {
        let mut c = Cleaner::new(loans());
        assert!(c.map_column("x", "Lieferant", &Lookup::default()).is_err());
    }
}
