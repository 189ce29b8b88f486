use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::data::{Table, Value};
use crate::error::{Error, Result};

/// A persistent CSV store that import runs append to.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Append `table` to the store, or create the store with a header row if
    /// it does not exist yet. Returns the number of records written.
    pub fn save(&self, table: &Table) -> Result<usize> {
        log::info!("Importing {} records into {}", table.len(), self.path.display());
        if self.exists() {
            self.append(table)
        } else {
            self.create(table)
        }
    }

    fn create(&self, table: &Table) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(Value::to_field))?;
        }
        writer.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(table.len())
    }

    /// Rows are written in the existing header's column order; columns the
    /// store does not know are dropped.
    fn append(&self, table: &Table) -> Result<usize> {
        let header: Vec<String> = csv::Reader::from_path(&self.path)?
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let extra: Vec<&String> = table
            .columns
            .iter()
            .filter(|c| !header.contains(c))
            .collect();
        if !extra.is_empty() {
            log::warn!(
                "{}: columns {extra:?} are not part of the store and are dropped",
                self.path.display()
            );
        }
        let positions: Vec<Option<usize>> = header
            .iter()
            .map(|h| table.columns.iter().position(|c| c == h))
            .collect();

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in &table.rows {
            writer.write_record(
                positions
                    .iter()
                    .map(|pos| pos.map(|i| row[i].to_field()).unwrap_or_default()),
            )?;
        }
        writer.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_store;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn creates_then_appends_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("umsatz").join("umsatz_total.csv"));

        let first = table(
            &["Lieferant", "Umsatz (EUR)"],
            vec![vec!["Marx".into(), Value::Float(10.5)]],
        );
        assert_eq!(store.save(&first).unwrap(), 1);
        assert!(store.exists());

        let second = table(
            &["Umsatz (EUR)", "Extra", "Lieferant"],
            vec![vec![Value::Integer(7), "x".into(), "Müller".into()]],
        );
        assert_eq!(store.save(&second).unwrap(), 1);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "Lieferant,Umsatz (EUR)\nMarx,10.5\nMüller,7\n");

        let back = read_store(store.path()).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn missing_columns_are_left_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("store.csv"));
        store
            .save(&table(&["a", "b"], vec![vec![Value::Integer(1), Value::Integer(2)]]))
            .unwrap();
        store
            .save(&table(&["b"], vec![vec![Value::Integer(3)]]))
            .unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "a,b\n1,2\n,3\n");
    }
}
