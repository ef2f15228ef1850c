//! File-level stage runners: documents in, timestamped table files out.
//!
//! 1. `extract`: questions `.md` → `1_<timestamp>.<ext>`
//! 2. `merge`: answers `.md` + solutions `.md` + table → `2_<timestamp>.<ext>`
//! 3. `finalize`: table → `final_<timestamp>.<ext>`
//!
//! Each runner owns its file handles for the duration of the call only.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::{info, instrument};

use quizsheet_shared::{PipelineSettings, QuestionRecord, QuestionType, QuizSheetError, Result};
use quizsheet_tabular::{load_table, save_table};

use crate::extract::{parse_questions, records_to_table};
use crate::finalize::{NormalizeReport, normalize_columns};
use crate::merge::{MergeReport, merge_documents};

/// One of the three pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Merge,
    Finalize,
}

impl Stage {
    /// Prefix of generated output file names.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Extract => "1",
            Self::Merge => "2",
            Self::Finalize => "final",
        }
    }

    /// Human-readable stage name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Merge => "merge",
            Self::Finalize => "finalize",
        }
    }
}

/// Stage-specific counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDetails {
    Extracted {
        questions: usize,
        multiple_choice: usize,
        /// Parsed records, in document order.
        records: Vec<QuestionRecord>,
    },
    Merged(MergeReport),
    Normalized(NormalizeReport),
}

/// Result of running one stage.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub stage: Stage,
    /// Table file written by the stage.
    pub output: PathBuf,
    /// Data rows in the written table.
    pub rows: usize,
    pub details: StageDetails,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting stage status.
pub trait StageReporter {
    /// Called when a stage starts.
    fn stage(&self, stage: Stage, input: &Path);
    /// Called when a stage has written its output.
    fn done(&self, outcome: &StageOutcome);
}

/// No-op reporter for headless/test usage.
pub struct SilentReporter;

impl StageReporter for SilentReporter {
    fn stage(&self, _stage: Stage, _input: &Path) {}
    fn done(&self, _outcome: &StageOutcome) {}
}

// ---------------------------------------------------------------------------
// Output naming
// ---------------------------------------------------------------------------

/// Generated output path: `<dir>/<prefix>_<timestamp>.<ext>`.
///
/// `dir` is the configured output directory, or the directory of `input`.
/// An unrecognized `strftime` specifier in the timestamp format is a
/// `Config` error.
pub fn output_path(
    input: &Path,
    stage: Stage,
    settings: &PipelineSettings,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let dir = settings
        .output_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let mut stamp = String::new();
    write!(stamp, "{}", now.format(&settings.timestamp_format)).map_err(|_| {
        QuizSheetError::config(format!(
            "invalid timestamp format '{}'",
            settings.timestamp_format
        ))
    })?;

    Ok(dir.join(format!(
        "{}_{stamp}.{}",
        stage.file_prefix(),
        settings.format.extension()
    )))
}

fn resolve_output(
    input: &Path,
    explicit: Option<&Path>,
    stage: Stage,
    settings: &PipelineSettings,
) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => output_path(input, stage, settings, Local::now())?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| QuizSheetError::io(parent, e))?;
    }
    Ok(path)
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| QuizSheetError::io(path, e))
}

// ---------------------------------------------------------------------------
// Stage runners
// ---------------------------------------------------------------------------

/// Stage 1: parse a question document and write the question table.
#[instrument(skip_all, fields(input = %questions.display()))]
pub fn extract_stage(
    questions: &Path,
    output: Option<&Path>,
    settings: &PipelineSettings,
    reporter: &dyn StageReporter,
) -> Result<StageOutcome> {
    let start = Instant::now();
    reporter.stage(Stage::Extract, questions);

    let markdown = read_document(questions)?;
    let records = parse_questions(&markdown);
    let table = records_to_table(&records);

    let output = resolve_output(questions, output, Stage::Extract, settings)?;
    save_table(&table, &output)?;

    let multiple_choice = records
        .iter()
        .filter(|r| r.kind == QuestionType::MultipleChoice)
        .count();

    info!(
        questions = records.len(),
        multiple_choice,
        output = %output.display(),
        "extract stage complete"
    );

    let outcome = StageOutcome {
        stage: Stage::Extract,
        output,
        rows: table.len(),
        details: StageDetails::Extracted {
            questions: records.len(),
            multiple_choice,
            records,
        },
        elapsed: start.elapsed(),
    };
    reporter.done(&outcome);
    Ok(outcome)
}

/// Stage 2: merge an answer key and worked solutions into a question table.
#[instrument(skip_all, fields(input = %table_path.display()))]
pub fn merge_stage(
    answers: &Path,
    solutions: &Path,
    table_path: &Path,
    output: Option<&Path>,
    settings: &PipelineSettings,
    reporter: &dyn StageReporter,
) -> Result<StageOutcome> {
    let start = Instant::now();
    reporter.stage(Stage::Merge, table_path);

    let answer_key = read_document(answers)?;
    let solution_doc = read_document(solutions)?;
    let mut table = load_table(table_path)?;

    let report = merge_documents(&mut table, &answer_key, &solution_doc)?;

    let output = resolve_output(table_path, output, Stage::Merge, settings)?;
    save_table(&table, &output)?;

    info!(output = %output.display(), "merge stage complete");

    let outcome = StageOutcome {
        stage: Stage::Merge,
        output,
        rows: table.len(),
        details: StageDetails::Merged(report),
        elapsed: start.elapsed(),
    };
    reporter.done(&outcome);
    Ok(outcome)
}

/// Stage 3: strip residual markup from the configured text columns.
#[instrument(skip_all, fields(input = %table_path.display()))]
pub fn finalize_stage(
    table_path: &Path,
    output: Option<&Path>,
    settings: &PipelineSettings,
    reporter: &dyn StageReporter,
) -> Result<StageOutcome> {
    let start = Instant::now();
    reporter.stage(Stage::Finalize, table_path);

    let mut table = load_table(table_path)?;
    let report = normalize_columns(&mut table, &settings.normalize_columns)?;

    let output = resolve_output(table_path, output, Stage::Finalize, settings)?;
    save_table(&table, &output)?;

    info!(output = %output.display(), "finalize stage complete");

    let outcome = StageOutcome {
        stage: Stage::Finalize,
        output,
        rows: table.len(),
        details: StageDetails::Normalized(report),
        elapsed: start.elapsed(),
    };
    reporter.done(&outcome);
    Ok(outcome)
}

/// Run all three stages, each reading the previous stage's output.
#[instrument(skip_all, fields(questions = %questions.display()))]
pub fn run_all(
    questions: &Path,
    answers: &Path,
    solutions: &Path,
    settings: &PipelineSettings,
    reporter: &dyn StageReporter,
) -> Result<Vec<StageOutcome>> {
    // Fail before writing anything if a source document is missing.
    for path in [questions, answers, solutions] {
        std::fs::metadata(path).map_err(|e| QuizSheetError::io(path, e))?;
    }

    let extracted = extract_stage(questions, None, settings, reporter)?;
    let merged = merge_stage(answers, solutions, &extracted.output, None, settings, reporter)?;
    let finalized = finalize_stage(&merged.output, None, settings, reporter)?;

    Ok(vec![extracted, merged, finalized])
}
