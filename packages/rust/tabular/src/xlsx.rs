//! Excel backend: `calamine` for reading, `rust_xlsxwriter` for writing.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use quizsheet_shared::{QuizSheetError, Result};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::debug;

use crate::{Cell, Table, TableStore, ensure_exists};

/// Reads any workbook calamine understands; writes `.xlsx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxStore;

impl TableStore for XlsxStore {
    fn load(&self, path: &Path) -> Result<Table> {
        ensure_exists(path)?;

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            QuizSheetError::Table(format!("failed to open {}: {e}", path.display()))
        })?;

        let sheet = workbook.sheet_names().first().cloned().ok_or_else(|| {
            QuizSheetError::validation(format!("{} has no worksheets", path.display()))
        })?;

        let range = workbook.worksheet_range(&sheet).map_err(|e| {
            QuizSheetError::Table(format!("failed to read sheet '{sheet}': {e}"))
        })?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row.iter().map(cell_from_data).collect());
        }

        debug!(path = %path.display(), %sheet, rows = table.len(), "loaded workbook");
        Ok(table)
    }

    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            return Err(QuizSheetError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in table.headers().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_num(col)?, header.as_str(), &header_format)
                .map_err(xlsx_error)?;
        }

        for (idx, row) in table.rows().iter().enumerate() {
            let row_num = u32::try_from(idx + 1)
                .map_err(|_| QuizSheetError::validation("too many rows for a worksheet"))?;
            for (col, cell) in row.iter().enumerate() {
                let col = col_num(col)?;
                match cell {
                    Cell::Empty => {}
                    Cell::Int(i) => {
                        worksheet
                            .write_number(row_num, col, *i as f64)
                            .map_err(xlsx_error)?;
                    }
                    Cell::Float(x) => {
                        worksheet.write_number(row_num, col, *x).map_err(xlsx_error)?;
                    }
                    Cell::Text(s) => {
                        worksheet
                            .write_string(row_num, col, s.as_str())
                            .map_err(xlsx_error)?;
                    }
                }
            }
        }

        workbook.save(path).map_err(|e| {
            QuizSheetError::Table(format!("failed to write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), rows = table.len(), "saved workbook");
        Ok(())
    }
}

/// Whole-number floats become integers; Excel stores every number as f64.
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn col_num(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| QuizSheetError::validation("too many columns for a worksheet"))
}

fn xlsx_error(e: XlsxError) -> QuizSheetError {
    QuizSheetError::Table(e.to_string())
}
