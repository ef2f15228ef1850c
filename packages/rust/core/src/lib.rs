//! Question extraction, answer merging and final cleanup for QuizSheet.
//!
//! The parsing and alignment logic works on strings and in-memory
//! [`quizsheet_tabular::Table`]s; [`pipeline`] wraps it into file-level
//! stages that read documents and write timestamped sheets.

pub mod answers;
pub mod extract;
pub mod finalize;
pub mod merge;
pub mod pipeline;
pub mod sections;
