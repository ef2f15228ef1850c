//! Tabular datasets for the QuizSheet stages.
//!
//! [`Table`] is the in-memory sheet every stage reads and mutates: a header
//! row plus rows of [`Cell`]s, addressed by column name. File formats live
//! behind the [`TableStore`] trait so the parsing and alignment code never
//! touches a spreadsheet library directly.
//!
//! Backends:
//! - [`XlsxStore`]: reads with `calamine`, writes with `rust_xlsxwriter`
//! - [`CsvStore`]: the `csv` crate

mod delimited;
mod xlsx;

use std::path::Path;

use quizsheet_shared::{QuizSheetError, Result};

pub use delimited::CsvStore;
pub use xlsx::XlsxStore;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single spreadsheet value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// True for [`Cell::Empty`] and for empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Borrow the text of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the cell, the way a question number column is read.
    ///
    /// Floats truncate toward zero, text must parse as an integer after
    /// trimming (`"3.0"` does not), and empty cells have no value.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Empty => None,
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Empty strings become [`Cell::Empty`].
impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

/// Empty strings become [`Cell::Empty`].
impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A header row plus data rows. Rows are padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header row.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Header names in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All data rows.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose header matches `name` (surrounding
    /// whitespace in the header is ignored).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Like [`Table::column_index`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| QuizSheetError::missing_column(name))
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Cell at `(row, col)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Overwrite the cell at `(row, col)`.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<Cell>) -> Result<()> {
        let width = self.headers.len();
        let cells = self.rows.get_mut(row).ok_or_else(|| {
            QuizSheetError::validation(format!("row {row} out of range"))
        })?;
        if col >= width {
            return Err(QuizSheetError::validation(format!(
                "column {col} out of range (table has {width} columns)"
            )));
        }
        if cells.len() < width {
            cells.resize(width, Cell::Empty);
        }
        cells[col] = value.into();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage backends
// ---------------------------------------------------------------------------

/// Load and save a [`Table`] in one file format.
pub trait TableStore {
    /// Read the first sheet of `path`; its first row is the header.
    fn load(&self, path: &Path) -> Result<Table>;

    /// Write `table` to `path`, replacing any existing file.
    fn save(&self, table: &Table, path: &Path) -> Result<()>;
}

/// Pick a backend from the file extension of `path`.
pub fn store_for_path(path: &Path) -> Result<Box<dyn TableStore>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(XlsxStore)),
        "csv" => Ok(Box::new(CsvStore)),
        _ => Err(QuizSheetError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load `path` with the backend matching its extension.
pub fn load_table(path: &Path) -> Result<Table> {
    store_for_path(path)?.load(path)
}

/// Save `table` to `path` with the backend matching its extension.
pub fn save_table(table: &Table, path: &Path) -> Result<()> {
    store_for_path(path)?.save(table, path)
}

/// Fail with an I/O error carrying the path when `path` is not readable.
pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|e| QuizSheetError::io(path, e))
}
