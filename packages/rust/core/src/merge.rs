//! Answer/explanation merge into an extracted question sheet.
//!
//! Answer and solution sections are matched to table rows by position:
//! the table is walked top to bottom with a [`SectionCursor`], and each row
//! takes the entry for its question number from the cursor's section.

use tracing::{debug, info, instrument, warn};

use quizsheet_markup::{Profile, normalize};
use quizsheet_shared::{Result, columns};
use quizsheet_tabular::Table;

use crate::answers::{parse_answer_key, parse_solutions};
use crate::sections::{Section, SectionCursor, split_into_sections};

/// What a merge did to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows whose Answer/Explanation cells were written.
    pub rows_updated: usize,
    /// Rows skipped because the question number did not parse.
    pub rows_skipped: usize,
    /// Row index where answer sections ran out, if they did.
    pub stopped_at: Option<usize>,
    /// Sections found in the answer key.
    pub answer_sections: usize,
    /// Sections found in the solutions document.
    pub solution_sections: usize,
}

/// Parse both documents and merge them into `table`.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn merge_documents(
    table: &mut Table,
    answer_key: &str,
    solutions: &str,
) -> Result<MergeReport> {
    let answers = split_into_sections(parse_answer_key(answer_key));
    let explanations = split_into_sections(parse_solutions(solutions));

    debug!(
        answer_sections = answers.len(),
        solution_sections = explanations.len(),
        "grouped documents into sections"
    );

    merge_answers(table, &answers, &explanations)
}

/// Write answers and normalized explanations into `table`.
///
/// Requires `Question No`, `Answer` and `Explanation` columns; nothing is
/// written when any is missing. Once the section cursor passes the last
/// answer section, the remaining rows are left as they are.
pub fn merge_answers(
    table: &mut Table,
    answers: &[Section],
    explanations: &[Section],
) -> Result<MergeReport> {
    let number_col = table.require_column(columns::QUESTION_NO)?;
    let answer_col = table.require_column(columns::ANSWER)?;
    let explanation_col = table.require_column(columns::EXPLANATION)?;

    let mut report = MergeReport {
        answer_sections: answers.len(),
        solution_sections: explanations.len(),
        ..MergeReport::default()
    };
    let mut cursor = SectionCursor::new();

    for row in 0..table.len() {
        let Some(number) = question_number(table, row, number_col) else {
            report.rows_skipped += 1;
            continue;
        };

        let section = cursor.advance(number);
        let Some(section_answers) = answers.get(section) else {
            warn!(
                row,
                section,
                answer_sections = answers.len(),
                "answer sections exhausted, leaving remaining rows untouched"
            );
            report.stopped_at = Some(row);
            break;
        };

        let answer = section_answers.get(&number).cloned().unwrap_or_default();
        let explanation = explanations
            .get(section)
            .and_then(|s| s.get(&number))
            .map(|text| normalize(text, Profile::Merge))
            .unwrap_or_default();

        table.set_cell(row, answer_col, answer)?;
        table.set_cell(row, explanation_col, explanation)?;
        report.rows_updated += 1;
    }

    info!(
        updated = report.rows_updated,
        skipped = report.rows_skipped,
        stopped_at = ?report.stopped_at,
        "merged answers"
    );
    Ok(report)
}

/// Question number of `row`, or `None` when the cell is not a usable integer.
fn question_number(table: &Table, row: usize, col: usize) -> Option<u32> {
    let value = table.cell(row, col).to_integer()?;
    match u32::try_from(value) {
        Ok(n) => Some(n),
        Err(_) => {
            debug!(row, value, "question number out of range, skipping row");
            None
        }
    }
}
