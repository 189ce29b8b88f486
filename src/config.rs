//! Folder layout and helper files, optionally read from a TOML file.
//!
//! ```toml
//! import_root = "data/import_folders"
//! storage_root = "data/storage_folders"
//! encoding = "latin1"
//!
//! [helpers]
//! suppliers = "data/helper/lieferanten.csv"
//!
//! [domains.umsatz]
//! encoding = "utf-8"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::dates::default_snapshot_start;
use crate::error::{Error, Result};
use crate::import::Domain;

/// Two-column lookup files used while cleaning and reporting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HelperFiles {
    /// Supplier name → abbreviation.
    pub suppliers: PathBuf,
    /// Cost centre code → name.
    pub cost_centres: PathBuf,
    /// RVK notation → name.
    pub rvk: PathBuf,
    /// Media type code → name.
    pub media_types: PathBuf,
}

impl Default for HelperFiles {
    fn default() -> Self {
        Self {
            suppliers: "data/helper/lieferanten.csv".into(),
            cost_centres: "data/helper/kostenstellen.csv".into(),
            rvk: "data/helper/rvk.csv".into(),
            media_types: "data/helper/materialarten.csv".into(),
        }
    }
}

/// Per-domain deviations from the default layout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DomainSettings {
    pub import_dir: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub import_root: PathBuf,
    pub storage_root: PathBuf,
    /// Encoding of the export files unless a domain overrides it.
    pub encoding: String,
    /// First year-end snapshot shown in yearly reports.
    pub snapshot_start: NaiveDate,
    pub helpers: HelperFiles,
    /// Keyed by domain slug (`umsatz`, `budget`, `readingroom`, `loans`, `newacq`).
    pub domains: BTreeMap<String, DomainSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            import_root: "data/import_folders".into(),
            storage_root: "data/storage_folders".into(),
            encoding: "utf-8".into(),
            snapshot_start: default_snapshot_start(),
            helpers: HelperFiles::default(),
            domains: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Relative paths are resolved against
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings = Self::from_toml_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.rooted_at(base))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Settings from `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Resolve every relative path against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        let root = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        root(&mut self.import_root);
        root(&mut self.storage_root);
        root(&mut self.helpers.suppliers);
        root(&mut self.helpers.cost_centres);
        root(&mut self.helpers.rvk);
        root(&mut self.helpers.media_types);
        self
    }

    fn domain(&self, domain: Domain) -> Option<&DomainSettings> {
        self.domains.get(domain.slug())
    }

    /// Folder holding the pending export files of `domain`.
    pub fn import_dir(&self, domain: Domain) -> PathBuf {
        match self.domain(domain).and_then(|d| d.import_dir.as_ref()) {
            Some(dir) => self.import_root.join(dir),
            None => self.import_root.join(domain.slug()),
        }
    }

    /// CSV store of `domain`, e.g. `umsatz/umsatz_total.csv`.
    pub fn store_path(&self, domain: Domain) -> PathBuf {
        match self.domain(domain).and_then(|d| d.store.as_ref()) {
            Some(store) => self.storage_root.join(store),
            None => self
                .storage_root
                .join(domain.slug())
                .join(format!("{}_total.csv", domain.slug())),
        }
    }

    pub fn encoding_for(&self, domain: Domain) -> &str {
        self.domain(domain)
            .and_then(|d| d.encoding.as_deref())
            .unwrap_or(self.encoding.as_str())
    }
}
