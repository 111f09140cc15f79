use clap::{Parser, Subcommand};
use color_eyre::Result;

mod commands;
mod output;

use commands::{generate, validate};

#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(about = "Expand build-option descriptors into grouped CI job matrices", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the grouped job matrix from a build-options file
    Generate(generate::GenerateArgs),
    /// Check a build-options file without generating
    Validate(validate::ValidateArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate::execute(args),
        Commands::Validate(args) => validate::execute(args),
    }
}
