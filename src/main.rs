mod analyze;
mod apply;
mod backup;
mod classify;
mod commands;
mod config;
mod error;
mod extract;
mod fuzzy;
mod inventory;
mod render;
mod report;
mod resolve;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mdmend", about = "Analyze and repair markdown links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze links and report issues without changing files
    Check {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Path to an alternate config file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Apply safe fixes for broken links and mismatched display text
    Fix {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Path to an alternate config file
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Analyze and count fixes without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the backup copy before applying fixes
        #[arg(long)]
        no_backup: bool,
    },
    /// Analyze links and write HTML and JSON reports
    Report {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Path to an alternate config file
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Directory to write reports into (default: the scanned root)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { path, config } => commands::check(&path, config.as_deref()),
        Commands::Fix { path, config, dry_run, no_backup } => {
            commands::fix(&path, config.as_deref(), dry_run, no_backup)
        },
        Commands::Report { path, config, output } => {
            commands::report(&path, config.as_deref(), output.as_deref())
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}
