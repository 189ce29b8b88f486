use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use encoding_rs::Encoding;

use super::model::{Table, Value};
use crate::dates::date_from_filename;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which sheets of a workbook to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// Every sheet, stacked in workbook order.
    #[default]
    All,
    /// A single sheet by zero-based position.
    Index(usize),
}

/// How to read a batch of export files.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Lines dropped at the top of each text file (report banners).
    pub skip_rows: usize,
    /// Lines dropped at the bottom of each text file (totals, footers).
    pub skip_footer: usize,
    /// WHATWG encoding label, e.g. `utf-8`, `latin1`, `windows-1252`.
    pub encoding: String,
    pub sheet: SheetSelection,
    /// Column stamped with the date from the file name.
    pub stamp_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            skip_footer: 0,
            encoding: "utf-8".into(),
            sheet: SheetSelection::All,
            stamp_column: "Datum".into(),
        }
    }
}

impl LoadOptions {
    pub fn skipping(mut self, rows: usize, footer: usize) -> Self {
        self.skip_rows = rows;
        self.skip_footer = footer;
        self
    }

    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    pub fn with_sheet(mut self, sheet: SheetSelection) -> Self {
        self.sheet = sheet;
        self
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one export file.  Dispatch by extension.
///
/// Supported formats:
/// * `.txt`          – fixed-width report with a header line
/// * `.tsv` / `.csv` – tab-separated with a header line
/// * `.xls` / `.xlsx` – workbook, first row of each sheet is the header
pub fn load_file(path: &Path, opts: &LoadOptions) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" => load_fixed_width(&[path.to_path_buf()], opts),
        "tsv" | "csv" => load_tsv(&[path.to_path_buf()], opts),
        "xls" | "xlsx" => load_excel(&[path.to_path_buf()], opts),
        other => Err(Error::UnsupportedExtension(other.to_string())),
    }
}

/// Read a comma-separated store file written by [`crate::import::store`].
pub fn read_store(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(e, path))?;
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Malformed {
            path: path.to_path_buf(),
            message: format!("row {row_no}: {e}"),
        })?;
        rows.push(record.iter().map(Value::from_text).collect());
    }
    Ok(Table::from_rows(columns, rows))
}

/// Load fixed-width text reports, one table per file, stamped and stacked.
pub fn load_fixed_width(files: &[PathBuf], opts: &LoadOptions) -> Result<Table> {
    load_each(files, opts, |path| {
        let text = decode_file(path, &opts.encoding)?;
        let lines = body_lines(&text, opts);
        Ok(parse_fixed_width(&lines))
    })
}

/// Load tab-separated exports, one table per file, stamped and stacked.
pub fn load_tsv(files: &[PathBuf], opts: &LoadOptions) -> Result<Table> {
    load_each(files, opts, |path| {
        let text = decode_file(path, &opts.encoding)?;
        let body = body_lines(&text, opts).join("\n");
        parse_delimited(&body, b'\t').map_err(|e| Error::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })
}

/// Load workbooks, one table per file, stamped and stacked.
pub fn load_excel(files: &[PathBuf], opts: &LoadOptions) -> Result<Table> {
    load_each(files, opts, |path| read_workbook(path, opts.sheet))
}

fn load_each(
    files: &[PathBuf],
    opts: &LoadOptions,
    mut read: impl FnMut(&Path) -> Result<Table>,
) -> Result<Table> {
    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let date = date_from_filename(path)?;
        let mut table = read(path)?;
        table.set_constant(&opts.stamp_column, Value::Date(date));
        log::debug!("Read {} rows from {}", table.len(), path.display());
        tables.push(table);
    }
    Ok(Table::concat(tables))
}

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

fn decode_file(path: &Path, label: &str) -> Result<String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        log::warn!(
            "{}: invalid {} sequences replaced",
            path.display(),
            encoding.name()
        );
    }
    Ok(text.into_owned())
}

/// Lines left after dropping the header banner and the footer.
fn body_lines<'a>(text: &'a str, opts: &LoadOptions) -> Vec<&'a str> {
    let lines: Vec<&str> = text.lines().collect();
    let end = lines.len().saturating_sub(opts.skip_footer);
    let start = opts.skip_rows.min(end);
    lines[start..end]
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed-width reports
// ---------------------------------------------------------------------------

/// Column spans are the maximal runs of character positions where at least
/// one line has a non-blank character.
fn infer_colspecs(lines: &[Vec<char>]) -> Vec<(usize, usize)> {
    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    let mut occupied = vec![false; width];
    for line in lines {
        for (pos, ch) in line.iter().enumerate() {
            if !ch.is_whitespace() {
                occupied[pos] = true;
            }
        }
    }

    let mut spans = Vec::new();
    let mut start = None;
    for (pos, &used) in occupied.iter().enumerate() {
        match (used, start) {
            (true, None) => start = Some(pos),
            (false, Some(s)) => {
                spans.push((s, pos));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, width));
    }
    spans
}

fn slice_chars(line: &[char], (start, end): (usize, usize)) -> String {
    if start >= line.len() {
        return String::new();
    }
    line[start..end.min(line.len())].iter().collect::<String>().trim().to_string()
}

fn parse_fixed_width(lines: &[&str]) -> Table {
    let chars: Vec<Vec<char>> = lines
        .iter()
        .map(|l| l.replace('\t', " ").chars().collect())
        .collect();
    let Some((header, data)) = chars.split_first() else {
        return Table::default();
    };

    let spans = infer_colspecs(&chars);
    let columns = spans
        .iter()
        .enumerate()
        .map(|(i, &span)| {
            let name = slice_chars(header, span);
            if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            }
        })
        .collect();
    let rows = data
        .iter()
        .map(|line| {
            spans
                .iter()
                .map(|&span| Value::from_text(&slice_chars(line, span)))
                .collect()
        })
        .collect();
    Table::from_rows(columns, rows)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

fn parse_delimited(body: &str, delimiter: u8) -> std::result::Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(body.as_bytes());
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Value::from_text).collect());
    }
    Ok(Table::from_rows(columns, rows))
}

fn csv_error(err: csv::Error, path: &Path) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::io(path, source),
        kind => Error::Malformed {
            path: path.to_path_buf(),
            message: format!("{kind:?}"),
        },
    }
}

// ---------------------------------------------------------------------------
// Workbooks
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path, sheet: SheetSelection) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let indices = sheet_indices(path, sheet, workbook.sheet_names().len())?;

    let mut ranges = Vec::with_capacity(indices.len());
    for idx in indices {
        if let Some(range) = workbook.worksheet_range_at(idx) {
            ranges.push(range?);
        }
    }
    Ok(stack_sheets(&ranges))
}

fn sheet_indices(path: &Path, sheet: SheetSelection, sheet_count: usize) -> Result<Vec<usize>> {
    match sheet {
        SheetSelection::All => Ok((0..sheet_count).collect()),
        SheetSelection::Index(i) if i < sheet_count => Ok(vec![i]),
        SheetSelection::Index(i) => Err(Error::Malformed {
            path: path.to_path_buf(),
            message: format!("workbook has {sheet_count} sheets, sheet {i} requested"),
        }),
    }
}

/// Sheets in workbook order, columns unioned.
fn stack_sheets(ranges: &[calamine::Range<Data>]) -> Table {
    Table::concat(ranges.iter().map(range_to_table).collect())
}

fn range_to_table(range: &calamine::Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_value(cell) {
            Value::Null => format!("Unnamed: {i}"),
            v => v.to_field(),
        })
        .collect();
    let data = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Table::from_rows(columns, data)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::Integer(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::String(s) => match s.trim() {
            "" => Value::Null,
            text => Value::String(text.to_string()),
        },
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_date().map(Value::Date).unwrap_or(Value::Null)
        }
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}
