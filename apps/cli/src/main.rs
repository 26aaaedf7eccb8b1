//! qaforge CLI: turn a document into a question/answer training dataset.
//!
//! Generates questions about a document with an LLM, collects answers
//! interactively, and exports them in three dataset formats.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
