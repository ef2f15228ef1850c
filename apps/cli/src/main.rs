//! QuizSheet CLI: quiz documents in, spreadsheets out.
//!
//! Runs the extract, merge and finalize stages individually or chained.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
