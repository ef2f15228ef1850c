//! Application configuration for QuizSheet.
//!
//! User config lives at `~/.quizsheet/quizsheet.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuizSheetError, Result};
use crate::types::columns;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "quizsheet.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".quizsheet";

// ---------------------------------------------------------------------------
// Config structs (matching quizsheet.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where and how stage outputs are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Final normalization pass.
    #[serde(default)]
    pub normalize: NormalizeConfig,
}

/// Spreadsheet file format written by the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated tables. Empty means next to the input file.
    #[serde(default)]
    pub dir: String,

    /// Format of generated tables.
    #[serde(default)]
    pub format: TableFormat,

    /// `chrono` format string used in generated file names.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            format: TableFormat::default(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_timestamp_format() -> String {
    "%Y%m%d_%H%M%S".into()
}

/// `[normalize]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Text columns rewritten by the final pass. Absent columns are skipped.
    #[serde(default = "default_normalize_columns")]
    pub columns: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            columns: default_normalize_columns(),
        }
    }
}

fn default_normalize_columns() -> Vec<String> {
    vec![
        columns::QUESTION.into(),
        columns::EXPLANATION.into(),
        columns::DETAILED_EXPLANATION.into(),
    ]
}

// ---------------------------------------------------------------------------
// Pipeline settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime stage settings, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Output directory override; `None` writes next to the input.
    pub output_dir: Option<PathBuf>,
    /// Format of generated tables.
    pub format: TableFormat,
    /// `chrono` format string for generated file names.
    pub timestamp_format: String,
    /// Columns rewritten by the final pass.
    pub normalize_columns: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        let dir = config.output.dir.trim();
        Self {
            output_dir: (!dir.is_empty()).then(|| PathBuf::from(dir)),
            format: config.output.format,
            timestamp_format: config.output.timestamp_format.clone(),
            normalize_columns: config.normalize.columns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.quizsheet/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| QuizSheetError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.quizsheet/quizsheet.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| QuizSheetError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        QuizSheetError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| QuizSheetError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QuizSheetError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QuizSheetError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings that would produce unusable output names.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let fmt = config.output.timestamp_format.trim();
    if fmt.is_empty() {
        return Err(QuizSheetError::config("output.timestamp_format must not be empty"));
    }
    if fmt.contains('/') || fmt.contains('\\') {
        return Err(QuizSheetError::config(format!(
            "output.timestamp_format '{fmt}' must not contain path separators"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timestamp_format"));
        assert!(toml_str.contains("Detailed Explanation"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.output.format, TableFormat::Xlsx);
        assert_eq!(parsed.output.timestamp_format, "%Y%m%d_%H%M%S");
        assert_eq!(parsed.normalize.columns.len(), 3);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[output]
format = "csv"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.output.format, TableFormat::Csv);
        assert_eq!(config.output.timestamp_format, "%Y%m%d_%H%M%S");
        assert_eq!(config.normalize.columns[0], "Question");
    }

    #[test]
    fn pipeline_settings_from_app_config() {
        let mut app = AppConfig::default();
        let settings = PipelineSettings::from(&app);
        assert!(settings.output_dir.is_none());
        assert_eq!(settings.format.extension(), "xlsx");

        app.output.dir = "/tmp/sheets".into();
        let settings = PipelineSettings::from(&app);
        assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/sheets")));
    }

    #[test]
    fn timestamp_format_validation() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.output.timestamp_format = "%Y/%m/%d".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("path separators"));

        config.output.timestamp_format = "  ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/definitely/not/here/quizsheet.toml")).unwrap_err();
        assert!(matches!(err, QuizSheetError::Io { .. }));
    }
}
