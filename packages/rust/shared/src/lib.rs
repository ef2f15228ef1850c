//! Shared types, error model, and configuration for QuizSheet.
//!
//! This crate is the foundation depended on by all other QuizSheet crates.
//! It provides:
//! - [`QuizSheetError`]: the unified error type
//! - Domain types ([`QuestionRecord`], [`QuestionType`], [`QuestionOption`], [`columns`])
//! - Configuration ([`AppConfig`], [`PipelineSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, NormalizeConfig, OutputConfig, PipelineSettings, TableFormat, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{QuizSheetError, Result};
pub use types::{OPTION_SEPARATOR, QuestionOption, QuestionRecord, QuestionType, columns};
