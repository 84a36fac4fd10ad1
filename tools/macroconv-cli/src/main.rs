//! Macroconv CLI - convert click-bot input macros between formats
//!
//! # Commands
//!
//! - `macroconv convert` - Convert a macro file into another format
//! - `macroconv detect` - Guess the format of a macro file
//! - `macroconv inspect` - Decode a macro and print a summary (or JSON)
//! - `macroconv formats` - List supported formats
//! - `macroconv config` - Show or initialise the config file
//!
//! # Usage
//!
//! ```bash
//! # zBot -> ReplayBot, output next to the input as run.replay
//! macroconv convert run.zbot --to replaybot
//!
//! # Plain text with an explicit source, player 1 only, cleaned up
//! macroconv convert notes.txt --from plain-text --to xbot --only-player 1 --remove-redundant
//!
//! # Verbose logging (or set RUST_LOG)
//! macroconv -vv inspect level.mhr.json
//! ```

mod config;
mod convert;
mod detect;
mod formats;
mod inspect;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

/// Macroconv - input macro converter
#[derive(Parser)]
#[command(name = "macroconv")]
#[command(about = "Convert click-bot input macros between formats")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a macro file into another format
    Convert(convert::ConvertArgs),

    /// Guess the format of a macro file
    Detect(detect::DetectArgs),

    /// Decode a macro and print a summary
    Inspect(inspect::InspectArgs),

    /// List supported formats
    Formats,

    /// Show the config file location, or write the defaults
    Config(config::ConfigArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(args) => {
            convert::execute(args)?;
            Ok(())
        }
        Commands::Detect(args) => {
            if !detect::execute(args)? {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Formats => formats::execute(),
        Commands::Config(args) => config::execute(args),
    }
}
