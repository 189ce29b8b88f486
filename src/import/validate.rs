use std::path::{Path, PathBuf};

use crate::dates::{date_in_stem, has_date_pattern};
use crate::error::{Error, Result};

/// Extensions accepted for import.
pub const FILE_EXTENSIONS: [&str; 5] = ["csv", "tsv", "txt", "xls", "xlsx"];

/// An existing, non-empty import folder and the files in it.
#[derive(Debug, Clone)]
pub struct ImportDir {
    dir: PathBuf,
    files: Vec<String>,
}

impl ImportDir {
    /// Check that `dir` exists and holds at least one entry, and list its
    /// regular files by name.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir));
        }

        let mut entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::io(&dir, e))?
            .peekable();
        if entries.peek().is_none() {
            return Err(Error::NoFilesToImport(dir));
        }

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            if entry.path().is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();

        log::info!(
            "The directory {} contains {} files: {:?}",
            dir.display(),
            files.len(),
            files
        );
        Ok(ImportDir { dir, files })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Names of all regular files in the folder.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Full paths of the files that are ready to import: known extension and
    /// a `YYYY_MM_DD` date in the stem.
    pub fn valid_files(&self) -> Vec<PathBuf> {
        let valid: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|name| is_importable(name))
            .map(|name| self.dir.join(name))
            .collect();

        log::info!("Following file(s) are ready to import: {valid:?}");
        valid
    }
}

fn is_importable(name: &str) -> bool {
    let path = Path::new(name);
    let (Some(stem), Some(ext)) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) else {
        return false;
    };

    if !FILE_EXTENSIONS.contains(&ext) || !has_date_pattern(stem) {
        return false;
    }
    if date_in_stem(stem).is_none() {
        log::warn!("Skipping {name}: the date in its name is not a calendar date");
        return false;
    }
    true
}
