// tally CLI - attendance reconciliation from the shell

mod block;
mod exit_codes;
mod import;
mod report;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Reconcile check-in sheets against weekly class schedules")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path of the store document (beats the configured path)
    #[arg(long, global = true, env = "TALLY_STORE")]
    pub store: Option<PathBuf>,

    /// Path of the config file
    #[arg(long, global = true, env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a time block ahead of its session
    #[command(name = "add-block", after_help = "\
Examples:
  tally add-block 'Week 1' 2019-09-30 10:00 11:40
  tally --store class.toml add-block 'Makeup session' 2019-10-11 08:20 10:00")]
    AddBlock {
        /// Block title, unique within the store
        title: String,

        /// Session date (YYYY-MM-DD)
        date: String,

        /// Session start (HH:MM)
        start: String,

        /// Session end (HH:MM)
        end: String,
    },

    /// Import a check-in sheet, merging into the fitting block
    #[command(after_help = "\
Examples:
  tally import week1.xlsx
  tally import week1.csv --threshold 10
  tally import week1.xlsx --title 'Week 1'")]
    Import {
        /// Check-in sheet (xlsx or csv)
        sheet: PathBuf,

        /// Minutes the sheet's span may overhang a registered block
        #[arg(long)]
        threshold: Option<i64>,

        /// Title for the block registered when no stored block fits
        #[arg(long)]
        title: Option<String>,
    },

    /// Per-slot attendance report for one class
    #[command(after_help = "\
Examples:
  tally report INE5417 04208A 20192
  tally report INE5417 04208A 20192 --roster roster.toml
  tally report INE5417 04208A 20192 --json
  tally report INE5417 04208A 20192 --output report.csv")]
    Report {
        /// Subject identifier
        subject: String,

        /// Class identifier
        class: String,

        /// Semester identifier
        semester: String,

        /// Roster document to fetch and cache the class from when it is
        /// not cached yet
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Output JSON to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Write the slot table as CSV to file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::AddBlock { title, date, start, end } => {
            block::cmd_add_block(&cli.globals, title, date, start, end)
        }
        Commands::Import { sheet, threshold, title } => {
            import::cmd_import(&cli.globals, sheet, threshold, title)
        }
        Commands::Report { subject, class, semester, roster, json, output } => {
            report::cmd_report(&cli.globals, subject, class, semester, roster, json, output)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}
