//! `quizdesk` binary: see `quizdesk --help`.

mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  quizdesk::telemetry::init_tracing();

  let cli = Cli::parse();
  cli.run().await
}
