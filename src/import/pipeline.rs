use std::fmt;
use std::path::PathBuf;

use crate::columns as col;
use crate::config::Settings;
use crate::data::loader::{load_excel, load_fixed_width, load_tsv, LoadOptions, SheetSelection};
use crate::data::{Lookup, Table, Value};
use crate::error::Result;

use super::clean::Cleaner;
use super::store::CsvStore;
use super::validate::ImportDir;

/// The export families that are imported, one batch run each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Domain {
    /// Sales per supplier (fixed-width report).
    Umsatz,
    /// Spending per cost centre (fixed-width report).
    Budget,
    /// Reading-room attendance per service slot (workbook).
    ReadingRoom,
    /// Loan statistics per title (workbook).
    Loans,
    /// New acquisitions (tab-separated).
    NewAcquisitions,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Umsatz,
        Domain::Budget,
        Domain::ReadingRoom,
        Domain::Loans,
        Domain::NewAcquisitions,
    ];

    /// Folder and store name of the domain.
    pub fn slug(self) -> &'static str {
        match self {
            Domain::Umsatz => "umsatz",
            Domain::Budget => "budget",
            Domain::ReadingRoom => "readingroom",
            Domain::Loans => "loans",
            Domain::NewAcquisitions => "newacq",
        }
    }

    fn load_options(self, encoding: &str) -> LoadOptions {
        let opts = LoadOptions::default().with_encoding(encoding);
        match self {
            Domain::Umsatz => opts.skipping(5, 3),
            Domain::Budget => opts.skipping(6, 3),
            Domain::ReadingRoom => opts.with_sheet(SheetSelection::All),
            Domain::Loans => opts.with_sheet(SheetSelection::Index(2)),
            Domain::NewAcquisitions => opts,
        }
    }

    fn load(self, files: &[PathBuf], opts: &LoadOptions) -> Result<Table> {
        match self {
            Domain::Umsatz | Domain::Budget => load_fixed_width(files, opts),
            Domain::ReadingRoom | Domain::Loans => load_excel(files, opts),
            Domain::NewAcquisitions => load_tsv(files, opts),
        }
    }

    fn clean(self, table: Table, settings: &Settings) -> Result<Table> {
        let mut cleaner = Cleaner::new(table);
        match self {
            Domain::Umsatz => {
                let suppliers = Lookup::from_csv(&settings.helpers.suppliers, None)?;
                cleaner
                    .remove_rows_with_char('-')
                    .normalize_headers()
                    .map_column(col::SUPPLIER_SHORT, col::SUPPLIER, &suppliers)?;
            }
            Domain::Budget => {
                let cost_centres = Lookup::from_csv(&settings.helpers.cost_centres, None)?;
                cleaner
                    .remove_rows_with_char('-')
                    .normalize_headers()
                    .map_column(col::COST_CENTRE, col::COST_CENTRE_RAW, &cost_centres)?;
            }
            Domain::ReadingRoom => {}
            Domain::Loans => {
                let rvk = Lookup::from_csv(&settings.helpers.rvk, None)?;
                classify_rvk(&mut cleaner, col::LOAN_SHELFMARK, &rvk)?
                    .fill_where_contains(
                        col::LOAN_SHELFMARK,
                        col::BOOK_SERVICE_MARKER,
                        col::RVK_GROUP,
                        col::BOOK_SERVICE.into(),
                    )?
                    .decrement_where(col::LOANS, col::RVK_GROUP, &col::BOOK_SERVICE.into())?;
            }
            Domain::NewAcquisitions => {
                let rvk = Lookup::from_csv(&settings.helpers.rvk, None)?;
                cleaner
                    .remove_rows_with_char('-')
                    .normalize_headers()
                    .set_constant(col::COPIES, Value::Integer(1));
                classify_rvk(&mut cleaner, col::SHELFMARK, &rvk)?;
            }
        }
        Ok(cleaner.into_table())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Derive RVK notation and main class (with their names) from a shelfmark.
fn classify_rvk<'c>(
    cleaner: &'c mut Cleaner,
    shelfmark: &str,
    rvk: &Lookup,
) -> Result<&'c mut Cleaner> {
    cleaner
        .extract_and_map(
            shelfmark,
            col::RVK_NOTATION,
            col::RVK_NOTATION_NAME,
            rvk,
            col::RVK_NOTATION_PATTERN,
        )?
        .extract_and_map(
            shelfmark,
            col::RVK_GROUP,
            col::RVK_GROUP_NAME,
            rvk,
            col::RVK_GROUP_PATTERN,
        )
}

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub domain: Domain,
    pub files: Vec<PathBuf>,
    pub records: usize,
    pub store: PathBuf,
}

/// Validate, load, clean and store the pending export files of `domain`.
pub fn run(domain: Domain, settings: &Settings) -> Result<ImportReport> {
    let import_dir = ImportDir::open(settings.import_dir(domain))?;
    let files = import_dir.valid_files();
    let store = CsvStore::new(settings.store_path(domain));

    if files.is_empty() {
        log::warn!("{domain}: no file in {} is ready to import", import_dir.path().display());
        return Ok(ImportReport {
            domain,
            files,
            records: 0,
            store: store.path().to_path_buf(),
        });
    }

    let opts = domain.load_options(settings.encoding_for(domain));
    let table = domain.load(&files, &opts)?;
    let table = domain.clean(table, settings)?;
    let records = store.save(&table)?;

    log::info!("{domain}: the import was completed successfully ({records} records)");
    Ok(ImportReport {
        domain,
        files,
        records,
        store: store.path().to_path_buf(),
    })
}
