// Tabular input: delimited text (csv, tsv, txt) and spreadsheets (xlsx, xlsm, xls, xlsb, ods)
//
// Everything is decoded into a grid of cells with the header in row 0. Only
// the first sheet of a workbook is read.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::NaiveDate;
use restock_engine::calendar::date_from_serial;
use restock_engine::model::{Cell, Grid};
use restock_engine::source::TabularSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    /// Delimited text; `None` means sniff the delimiter.
    Delimited(Option<u8>),
    Spreadsheet,
}

fn detect_format(path: &Path) -> Result<FileFormat, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => Ok(FileFormat::Delimited(None)),
        "tsv" => Ok(FileFormat::Delimited(Some(b'\t'))),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(FileFormat::Spreadsheet),
        "" => Err("file has no extension (expected .csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb or .ods)".to_string()),
        other => Err(format!(
            "unsupported file type '.{other}' (expected .csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb or .ods)"
        )),
    }
}

/// A sales or rules table on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularFile {
    path: PathBuf,
}

impl TabularFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the extension is one this reader understands.
    pub fn is_supported(&self) -> bool {
        detect_format(&self.path).is_ok()
    }
}

impl TabularSource for TabularFile {
    fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn read_grid(&self) -> Result<Grid, String> {
        let grid = match detect_format(&self.path)? {
            FileFormat::Delimited(delimiter) => read_delimited(&self.path, delimiter)?,
            FileFormat::Spreadsheet => read_spreadsheet(&self.path)?,
        };
        log::debug!("{}: {} row(s) read", self.path.display(), grid.len());
        Ok(grid)
    }
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Candidate separators, in order of preference when two score the same.
const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Non-blank lines inspected when guessing the separator.
const SNIFF_LINES: usize = 10;

fn read_delimited(path: &Path, delimiter: Option<u8>) -> Result<Grid, String> {
    let content = decode_text_file(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    grid_from_delimited(&content, delimiter)
}

/// Guess the separator of a delimited export.
///
/// A candidate must split the header line. Its score is the header's field
/// count times the number of sampled lines with that same count, so thousands
/// separators inside a semicolon file do not make it look comma-separated.
/// Falls back to `,` when nothing splits.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best: Option<(u8, usize)> = None;
    for delimiter in DELIMITERS {
        let Some(score) = delimiter_score(&sample, delimiter) else {
            continue;
        };
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((delimiter, score));
        }
    }
    best.map_or(b',', |(delimiter, _)| delimiter)
}

fn delimiter_score(sample: &[&str], delimiter: u8) -> Option<usize> {
    let (header, rest) = sample.split_first()?;
    let width = field_count(header, delimiter);
    if width <= 1 {
        return None;
    }
    let agreeing = 1 + rest
        .iter()
        .filter(|line| field_count(line, delimiter) == width)
        .count();
    Some(agreeing * width)
}

/// Fields on one line, honouring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read a text export as UTF-8, without a leading BOM. Bytes that are not
/// valid UTF-8 are decoded as Windows-1252, the usual encoding of spreadsheet
/// CSV exports on Spanish-locale machines.
pub fn decode_text_file(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let text = String::from_utf8(bytes).unwrap_or_else(|err| {
        log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
        encoding_rs::WINDOWS_1252.decode(err.as_bytes()).0.into_owned()
    });
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn grid_from_delimited(content: &str, delimiter: u8) -> Result<Grid, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Grid::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        grid.push(record.iter().map(Cell::text).collect());
    }
    Ok(grid)
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<Grid, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet: {}", e))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Err("Spreadsheet contains no sheets".to_string());
    };
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // 1900 date system assumed
            let serial = dt.as_f64();
            date_from_serial(serial).map(Cell::Date).unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::text(s)),
        Data::DurationIso(s) => Cell::text(s),
    }
}
