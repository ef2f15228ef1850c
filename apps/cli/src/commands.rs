//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use quizsheet_core::pipeline::{
    self, SilentReporter, Stage, StageDetails, StageOutcome, StageReporter,
};
use quizsheet_shared::{
    AppConfig, PipelineSettings, TableFormat, init_config, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// QuizSheet: turn quiz documents into spreadsheets.
#[derive(Parser)]
#[command(
    name = "quizsheet",
    version,
    about = "Turn quiz documents into question sheets with answers and explanations.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.quizsheet/quizsheet.toml.
    #[arg(long, global = true, env = "QUIZSHEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hide the progress spinner.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Table format of generated files.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Xlsx,
    Csv,
}

impl From<OutputFormat> for TableFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Xlsx => TableFormat::Xlsx,
            OutputFormat::Csv => TableFormat::Csv,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse a questions document into a question sheet.
    Extract {
        /// Markdown file with numbered questions.
        questions: PathBuf,

        /// Output table (defaults to 1_<timestamp>.<ext> next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the parsed questions as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fill Answer and Explanation columns from an answer key and solutions.
    Merge {
        /// Answer key document.
        #[arg(long)]
        answers: PathBuf,

        /// Worked solutions document.
        #[arg(long)]
        solutions: PathBuf,

        /// Question sheet produced by `extract`.
        #[arg(long)]
        table: PathBuf,

        /// Output table (defaults to 2_<timestamp>.<ext> next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Strip residual LaTeX and markup from text columns.
    Normalize {
        /// Table to clean.
        table: PathBuf,

        /// Output table (defaults to final_<timestamp>.<ext> next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column to clean (repeatable). Defaults to the configured columns.
        #[arg(long = "column")]
        columns: Vec<String>,
    },

    /// Run extract, merge and normalize in sequence.
    Run {
        /// Markdown file with numbered questions.
        questions: PathBuf,

        /// Answer key document.
        #[arg(long)]
        answers: PathBuf,

        /// Worked solutions document.
        #[arg(long)]
        solutions: PathBuf,

        /// Directory for generated tables (defaults to the questions' directory).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Format of generated tables.
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "quizsheet=info",
        1 => "quizsheet=debug",
        _ => "quizsheet=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `extract --json` output stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    let quiet = cli.quiet;

    match cli.command {
        Command::Extract {
            questions,
            output,
            json,
        } => {
            let settings = stage_settings(config)?;
            cmd_extract(&questions, output.as_deref(), json, &settings, reporter(quiet))
        }
        Command::Merge {
            answers,
            solutions,
            table,
            output,
        } => {
            let settings = stage_settings(config)?;
            cmd_merge(
                &answers,
                &solutions,
                &table,
                output.as_deref(),
                &settings,
                reporter(quiet),
            )
        }
        Command::Normalize {
            table,
            output,
            columns,
        } => {
            let mut settings = stage_settings(config)?;
            if !columns.is_empty() {
                settings.normalize_columns = columns;
            }
            cmd_normalize(&table, output.as_deref(), &settings, reporter(quiet))
        }
        Command::Run {
            questions,
            answers,
            solutions,
            out_dir,
            format,
        } => {
            let mut settings = stage_settings(config)?;
            if let Some(dir) = out_dir {
                settings.output_dir = Some(dir);
            }
            if let Some(format) = format {
                settings.format = format.into();
            }
            cmd_run(&questions, &answers, &solutions, &settings, reporter(quiet))
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)
            .wrap_err_with(|| format!("loading config from {}", p.display()))?,
        None => load_config()?,
    };
    Ok(config)
}

fn stage_settings(path: Option<&Path>) -> Result<PipelineSettings> {
    Ok(PipelineSettings::from(&resolve_config(path)?))
}

fn reporter(quiet: bool) -> Box<dyn StageReporter> {
    if quiet {
        Box::new(SilentReporter)
    } else {
        Box::new(CliProgress::new())
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

// Handlers take the reporter by value and drop it before printing so the
// spinner is cleared first.

fn cmd_extract(
    questions: &Path,
    output: Option<&Path>,
    json: bool,
    settings: &PipelineSettings,
    reporter: Box<dyn StageReporter>,
) -> Result<()> {
    let outcome = pipeline::extract_stage(questions, output, settings, reporter.as_ref())?;
    drop(reporter);

    match &outcome.details {
        StageDetails::Extracted { records, .. } if json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        _ => print_outcome(&outcome),
    }
    Ok(())
}

fn cmd_merge(
    answers: &Path,
    solutions: &Path,
    table: &Path,
    output: Option<&Path>,
    settings: &PipelineSettings,
    reporter: Box<dyn StageReporter>,
) -> Result<()> {
    let outcome =
        pipeline::merge_stage(answers, solutions, table, output, settings, reporter.as_ref())?;
    drop(reporter);

    print_outcome(&outcome);
    Ok(())
}

fn cmd_normalize(
    table: &Path,
    output: Option<&Path>,
    settings: &PipelineSettings,
    reporter: Box<dyn StageReporter>,
) -> Result<()> {
    let outcome = pipeline::finalize_stage(table, output, settings, reporter.as_ref())?;
    drop(reporter);

    print_outcome(&outcome);
    Ok(())
}

fn cmd_run(
    questions: &Path,
    answers: &Path,
    solutions: &Path,
    settings: &PipelineSettings,
    reporter: Box<dyn StageReporter>,
) -> Result<()> {
    info!(
        questions = %questions.display(),
        answers = %answers.display(),
        solutions = %solutions.display(),
        "running full pipeline"
    );

    let outcomes = pipeline::run_all(questions, answers, solutions, settings, reporter.as_ref())?;
    drop(reporter);

    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_outcome(outcome: &StageOutcome) {
    println!();
    println!("  Stage:   {}", outcome.stage.name());
    println!("  Output:  {}", outcome.output.display());
    println!("  Rows:    {}", outcome.rows);

    match &outcome.details {
        StageDetails::Extracted {
            questions,
            multiple_choice,
            ..
        } => {
            println!("  MCQ:     {multiple_choice}");
            println!("  Short:   {}", questions - multiple_choice);
        }
        StageDetails::Merged(report) => {
            println!("  Updated: {}", report.rows_updated);
            println!("  Skipped: {}", report.rows_skipped);
            if let Some(row) = report.stopped_at {
                println!("  Stopped: row {} (answer key exhausted)", row + 1);
            }
        }
        StageDetails::Normalized(report) => {
            println!("  Columns: {}", report.columns.join(", "));
            println!("  Cleaned: {} cells", report.cells_rewritten);
        }
    }

    println!("  Time:    {:.2}s", outcome.elapsed.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl StageReporter for CliProgress {
    fn stage(&self, stage: Stage, input: &Path) {
        self.spinner
            .set_message(format!("{} {}", stage.name(), input.display()));
    }

    fn done(&self, outcome: &StageOutcome) {
        self.spinner.set_message(format!(
            "{} done: {}",
            outcome.stage.name(),
            outcome.output.display()
        ));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}
