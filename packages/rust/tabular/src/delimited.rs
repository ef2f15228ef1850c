//! CSV backend.
//!
//! CSV carries no types: every non-empty field loads as text, and integer
//! columns are recovered with [`Cell::to_integer`].

use std::path::Path;

use quizsheet_shared::{QuizSheetError, Result};
use tracing::debug;

use crate::{Cell, Table, TableStore, ensure_exists};

/// Comma-separated file with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvStore;

impl TableStore for CsvStore {
    fn load(&self, path: &Path) -> Result<Table> {
        ensure_exists(path)?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            table.push_row(record.iter().map(Cell::from).collect());
        }

        debug!(path = %path.display(), rows = table.len(), "loaded csv");
        Ok(table)
    }

    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

        writer.write_record(table.headers()).map_err(csv_error)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(Cell::to_string))
                .map_err(csv_error)?;
        }
        writer.flush().map_err(|e| QuizSheetError::io(path, e))?;

        debug!(path = %path.display(), rows = table.len(), "saved csv");
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> QuizSheetError {
    QuizSheetError::Table(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_keeps_multiline_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sheet.csv");

        let mut table = Table::new(["Question No", "Explanation"]);
        table.push_row(vec![Cell::Int(3), Cell::from("line one\nline, two")]);
        table.push_row(vec![Cell::Int(4), Cell::Empty]);

        CsvStore.save(&table, &path).expect("save");
        let loaded = CsvStore.load(&path).expect("load");

        assert_eq!(loaded.headers(), table.headers());
        assert_eq!(loaded.cell(0, 0).to_integer(), Some(3));
        assert_eq!(loaded.cell(0, 1).as_text(), Some("line one\nline, two"));
        assert!(loaded.cell(1, 1).is_empty());
    }

    #[test]
    fn short_rows_are_padded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "Question No,Answer,Explanation\n1\n2,b,why\n").expect("write");

        let loaded = CsvStore.load(&path).expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.rows()[0].len(), 3);
        assert_eq!(loaded.cell(1, 1).as_text(), Some("b"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = CsvStore.load(Path::new("/no/such/dir/input.csv")).unwrap_err();
        assert!(matches!(err, QuizSheetError::Io { .. }));
    }
}
