use std::collections::BTreeMap;
use std::path::Path;

use super::model::Value;
use crate::error::{Error, Result};

/// A key → value dictionary read from a two-column helper CSV (supplier
/// abbreviations, cost centres, RVK notations, media types).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    entries: BTreeMap<Value, Value>,
}

impl Lookup {
    /// Read a dictionary CSV with a header row.
    ///
    /// Without `columns` the first column holds the keys and the second the
    /// values; otherwise the named `(key, value)` columns are used. Later
    /// duplicates of a key win.
    pub fn from_csv(path: &Path, columns: Option<(&str, &str)>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| with_path(e, path))?;
        let headers = reader.headers()?.clone();

        let (key_idx, value_idx) = match columns {
            Some((key, value)) => (
                position(&headers, key)?,
                position(&headers, value)?,
            ),
            None if headers.len() >= 2 => (0, 1),
            None => {
                return Err(Error::Malformed {
                    path: path.to_path_buf(),
                    message: "lookup file needs two columns".into(),
                })
            }
        };

        let mut entries = BTreeMap::new();
        for record in reader.records() {
            let record = record?;
            let key = Value::from_text(record.get(key_idx).unwrap_or(""));
            if key.is_null() {
                continue;
            }
            let value = Value::from_text(record.get(value_idx).unwrap_or(""));
            entries.insert(key, value);
        }
        log::debug!("Loaded {} lookup entries from {}", entries.len(), path.display());
        Ok(Lookup { entries })
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key/value pairs as text, for pattern substitution.
    pub fn patterns(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_field(), v.to_field()))
    }
}

impl FromIterator<(Value, Value)> for Lookup {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Lookup {
            entries: iter.into_iter().collect(),
        }
    }
}

fn position(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn with_path(err: csv::Error, path: &Path) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::io(path, source),
        kind => Error::Malformed {
            path: path.to_path_buf(),
            message: format!("{kind:?}"),
        },
    }
}
