//! End-to-end runs of the three stages against files in a temp directory.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use quizsheet_core::pipeline::{
    SilentReporter, Stage, StageDetails, extract_stage, finalize_stage, merge_stage, run_all,
};
use quizsheet_shared::{PipelineSettings, QuizSheetError, TableFormat, columns};
use quizsheet_tabular::{Table, load_table};

const QUESTIONS: &str = r"# Practice Set

1. What is $\frac{1}{2}$ of 8?
(a) 2
(b) 4
(c) 6
(d) 8

2. Evaluate $3^{2}$.

1. Which is prime?
(a) 4 (b) 7

2. Name the largest planet.
";

const ANSWERS: &str = "Answer Key

1. (b)
2. 9

Set B
1. (B)
2. Jupiter
";

const SOLUTIONS: &str = r"1. Half of 8 is $4$.
2. $3 \times 3 = 9$
1. Only 7 is prime, $\frac{7}{7} = 1$.
2. Jupiter is the largest.
";

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let questions = dir.join("questions.md");
    let answers = dir.join("answers.md");
    let solutions = dir.join("solutions.md");
    std::fs::write(&questions, QUESTIONS).expect("write questions");
    std::fs::write(&answers, ANSWERS).expect("write answers");
    std::fs::write(&solutions, SOLUTIONS).expect("write solutions");
    (questions, answers, solutions)
}

fn column(table: &Table, name: &str) -> Vec<String> {
    let col = table.column_index(name).expect("column present");
    (0..table.len())
        .map(|row| table.cell(row, col).to_string())
        .collect()
}

#[test]
fn stages_chain_through_csv_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (questions, answers, solutions) = write_inputs(dir.path());
    let settings = PipelineSettings {
        format: TableFormat::Csv,
        ..PipelineSettings::default()
    };

    let extracted = dir.path().join("1.csv");
    let outcome = extract_stage(&questions, Some(&extracted), &settings, &SilentReporter)
        .expect("extract");
    assert_eq!(outcome.rows, 4);
    let StageDetails::Extracted {
        questions: count,
        multiple_choice,
        records,
    } = &outcome.details
    else {
        panic!("expected extract details");
    };
    assert_eq!((*count, *multiple_choice), (4, 2));
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].text, "Which is prime?");

    let table = load_table(&extracted).expect("load extracted");
    assert_eq!(table.headers(), columns::EXTRACTOR_SCHEMA);
    assert_eq!(column(&table, columns::QUESTION_NO), vec!["1", "2", "1", "2"]);
    assert_eq!(
        column(&table, columns::QUESTION),
        vec![
            "What is 1/(2) of 8?",
            "Evaluate 3^{2}.",
            "Which is prime?",
            "Name the largest planet.",
        ]
    );
    assert_eq!(
        column(&table, columns::TYPE),
        vec!["MCQ", "Short Answer", "MCQ", "Short Answer"]
    );
    assert_eq!(
        column(&table, columns::OPTIONS),
        vec!["(a) 2; (b) 4; (c) 6; (d) 8", "", "(a) 4; (b) 7", ""]
    );

    let merged = dir.path().join("2.csv");
    let outcome = merge_stage(
        &answers,
        &solutions,
        &extracted,
        Some(&merged),
        &settings,
        &SilentReporter,
    )
    .expect("merge");
    let StageDetails::Merged(report) = outcome.details else {
        panic!("expected merge details");
    };
    assert_eq!(report.rows_updated, 4);
    assert_eq!(report.answer_sections, 2);
    assert_eq!(report.stopped_at, None);

    let table = load_table(&merged).expect("load merged");
    assert_eq!(column(&table, columns::ANSWER), vec!["b", "9", "b", "Jupiter"]);
    assert_eq!(
        column(&table, columns::EXPLANATION),
        vec![
            "Half of 8 is 4.",
            "3 × 3 = 9",
            "Only 7 is prime, 7/7 = 1.",
            "Jupiter is the largest.",
        ]
    );

    let finished = dir.path().join("final.csv");
    let outcome =
        finalize_stage(&merged, Some(&finished), &settings, &SilentReporter).expect("finalize");
    assert_eq!(outcome.stage, Stage::Finalize);

    let table = load_table(&finished).expect("load final");
    assert_eq!(column(&table, columns::QUESTION)[1], "Evaluate 3^2.");
    assert_eq!(column(&table, columns::ANSWER), vec!["b", "9", "b", "Jupiter"]);
}

#[test]
fn run_all_writes_timestamped_xlsx_next_to_questions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (questions, answers, solutions) = write_inputs(dir.path());

    let outcomes = run_all(
        &questions,
        &answers,
        &solutions,
        &PipelineSettings::default(),
        &SilentReporter,
    )
    .expect("run all");

    assert_eq!(outcomes.len(), 3);
    for (outcome, prefix) in outcomes.iter().zip(["1_", "2_", "final_"]) {
        let name = outcome
            .output
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(name.starts_with(prefix), "{name} should start with {prefix}");
        assert!(name.ends_with(".xlsx"), "{name} should be xlsx");
        assert_eq!(outcome.output.parent(), Some(dir.path()));
        assert!(outcome.output.exists());
    }

    let table = load_table(&outcomes[2].output).expect("load final");
    assert_eq!(table.len(), 4);
    let number = table.require_column(columns::QUESTION_NO).expect("number column");
    assert_eq!(table.cell(2, number).to_integer(), Some(1));
    assert_eq!(column(&table, columns::ANSWER), vec!["b", "9", "b", "Jupiter"]);
    assert_eq!(column(&table, columns::EXPLANATION)[1], "3 × 3 = 9");
}

#[test]
fn configured_output_dir_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (questions, _, _) = write_inputs(dir.path());
    let out = dir.path().join("sheets").join("batch");
    let settings = PipelineSettings {
        output_dir: Some(out.clone()),
        ..PipelineSettings::default()
    };

    let outcome = extract_stage(&questions, None, &settings, &SilentReporter).expect("extract");
    assert_eq!(outcome.output.parent(), Some(out.as_path()));
    assert!(outcome.output.exists());
}

#[test]
fn missing_source_document_fails_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (questions, answers, _) = write_inputs(dir.path());
    let missing = dir.path().join("solutions-missing.md");

    let err = run_all(
        &questions,
        &answers,
        &missing,
        &PipelineSettings::default(),
        &SilentReporter,
    )
    .unwrap_err();

    assert!(matches!(err, QuizSheetError::Io { ref path, .. } if path == &missing));
    let written = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "xlsx"))
        .count();
    assert_eq!(written, 0);
}

#[test]
fn merge_requires_question_no_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, answers, solutions) = write_inputs(dir.path());
    let table = dir.path().join("plain.csv");
    std::fs::write(&table, "Question,Answer,Explanation\nWhat?,,\n").expect("write table");

    let err = merge_stage(
        &answers,
        &solutions,
        &table,
        None,
        &PipelineSettings::default(),
        &SilentReporter,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        QuizSheetError::MissingColumn { ref column } if column == "Question No"
    ));
}
