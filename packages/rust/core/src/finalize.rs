//! Final markup pass over whole table columns.

use tracing::{debug, info, instrument};

use quizsheet_markup::{Profile, normalize};
use quizsheet_shared::Result;
use quizsheet_tabular::Table;

/// What the final pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Requested columns that exist in the table.
    pub columns: Vec<String>,
    /// Text cells whose content changed.
    pub cells_rewritten: usize,
}

/// Rewrite every text cell of the named columns with the final rule table.
///
/// Columns missing from the table are skipped. Empty and numeric cells are
/// left alone.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn normalize_columns(table: &mut Table, columns: &[String]) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();

    for name in columns {
        let Some(col) = table.column_index(name) else {
            debug!(column = %name, "column not present, skipping");
            continue;
        };
        report.columns.push(name.clone());

        for row in 0..table.len() {
            let Some(text) = table.cell(row, col).as_text() else {
                continue;
            };
            let cleaned = normalize(text, Profile::Final);
            if cleaned != text {
                table.set_cell(row, col, cleaned)?;
                report.cells_rewritten += 1;
            }
        }
    }

    info!(
        columns = ?report.columns,
        rewritten = report.cells_rewritten,
        "normalized columns"
    );
    Ok(report)
}
