// tmirror - reconcile two tables from a TOML config

mod exit_codes;
mod logging;
mod mirror;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "tmirror")]
#[command(about = "Compare two tables row by row and report where they diverge")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only errors; no summary, no log output (overrides TMIRROR_LOG)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation (exit 0 = tables mirror each other, exit 1 = divergences)
    #[command(after_help = "\
Exit codes: 0 no divergences, 1 divergences found, 2 usage, 3 invalid config, \
4 data source error, 5 output error.

The CSV report goes to --csv, else --csv-dir, else the config's [output] \
section, else the working directory as '<YYYY-MM-DD HH:MM:SS>_results.csv'.

Examples:
  tmirror run customers.toml
  tmirror run customers.toml --csv-dir reports
  tmirror run customers.toml --no-csv --json
  tmirror run customers.toml --output report.json -v
  TMIRROR_LOG=debug tmirror run customers.toml")]
    Run {
        /// Path to the mirror config (.toml)
        config: PathBuf,

        /// Directory for the timestamped CSV report
        #[arg(long, conflicts_with = "csv")]
        csv_dir: Option<PathBuf>,

        /// Exact path of the CSV report
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Skip the CSV report
        #[arg(long, conflicts_with_all = ["csv", "csv_dir"])]
        no_csv: bool,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a config without opening any data source
    #[command(after_help = "\
Examples:
  tmirror validate customers.toml")]
    Validate {
        /// Path to the mirror config (.toml)
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            config,
            csv_dir,
            csv,
            no_csv,
            json,
            output,
        } => mirror::cmd_run(
            config,
            mirror::RunOptions {
                csv_dir,
                csv,
                no_csv,
                json,
                output,
                quiet: cli.quiet,
            },
        ),
        Commands::Validate { config } => mirror::cmd_validate(config),
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
