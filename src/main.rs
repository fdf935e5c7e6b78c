use clap::{Parser, Subcommand};
use vocab_sms::errors::AppError;
use vocab_sms::{Command, run};

/// Keeps a vocabulary list and texts a random word on a schedule.
#[derive(Parser)]
#[command(name = "vocab_sms")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dedup, import, then keep running scheduled jobs (default)
    Run,
    /// Import the configured word list once
    Import,
    /// Remove duplicate entries and write the duplicates report
    Dedup,
    /// Send one random word now
    Send,
}

impl From<Commands> for Command {
    fn from(value: Commands) -> Self {
        match value {
            Commands::Run => Command::Run,
            Commands::Import => Command::Import,
            Commands::Dedup => Command::Dedup,
            Commands::Send => Command::Send,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    run(cli.command.map(Command::from).unwrap_or_default()).await
}
