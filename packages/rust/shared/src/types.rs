//! Core domain types for QuizSheet question records.

use serde::{Deserialize, Serialize};

use crate::error::QuizSheetError;

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// Spreadsheet column names shared by every stage.
pub mod columns {
    pub const SERIAL_NUMBER: &str = "Serial Number";
    pub const QUESTION_NO: &str = "Question No";
    pub const QUESTION: &str = "Question";
    pub const TYPE: &str = "Type";
    pub const OPTIONS: &str = "Options";
    pub const ANSWER: &str = "Answer";
    pub const EXPLANATION: &str = "Explanation";
    pub const DETAILED_EXPLANATION: &str = "Detailed Explanation";

    /// Header row written by the extractor, in order.
    pub const EXTRACTOR_SCHEMA: [&str; 7] = [
        SERIAL_NUMBER,
        QUESTION_NO,
        QUESTION,
        TYPE,
        OPTIONS,
        ANSWER,
        EXPLANATION,
    ];
}

/// Separator between rendered options in the `Options` column.
pub const OPTION_SEPARATOR: &str = "; ";

// ---------------------------------------------------------------------------
// QuestionType
// ---------------------------------------------------------------------------

/// The two recognized question kinds, told apart only by lettered options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
}

impl QuestionType {
    /// Label stored in the `Type` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::MultipleChoice => "MCQ",
            Self::ShortAnswer => "Short Answer",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = QuizSheetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "MCQ" => Ok(Self::MultipleChoice),
            "Short Answer" => Ok(Self::ShortAnswer),
            other => Err(QuizSheetError::parse(format!("unknown question type '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// QuestionOption
// ---------------------------------------------------------------------------

/// One lettered option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Lowercase option letter.
    pub label: char,
    /// Normalized option text.
    pub text: String,
}

impl std::fmt::Display for QuestionOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.label, self.text)
    }
}

// ---------------------------------------------------------------------------
// QuestionRecord
// ---------------------------------------------------------------------------

/// A single extracted question, one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 1-based position among extracted questions.
    pub serial: usize,
    /// Number as declared in the source; restarts at 1 for each section.
    pub number: u32,
    /// Normalized question text.
    pub text: String,
    /// Multiple choice or short answer.
    pub kind: QuestionType,
    /// Ordered options; empty for short-answer questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    /// Filled by the merge stage.
    #[serde(default)]
    pub answer: String,
    /// Filled by the merge stage.
    #[serde(default)]
    pub explanation: String,
}

impl QuestionRecord {
    /// Options rendered the way the `Options` column stores them.
    pub fn options_cell(&self) -> String {
        self.options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(OPTION_SEPARATOR)
    }
}
