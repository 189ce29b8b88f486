use std::path::PathBuf;

/// Errors raised by the import and report layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The directory {0} does not exist")]
    DirectoryNotFound(PathBuf),

    #[error("There are no files to import in {0}")]
    NoFilesToImport(PathBuf),

    #[error("Store file {0} does not exist")]
    StoreNotFound(PathBuf),

    #[error("{0}: file name carries no YYYY_MM_DD date")]
    MissingFileDate(PathBuf),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Unknown text encoding '{0}'")]
    UnknownEncoding(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("{path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Invalid pattern")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
