// Restock CLI - weekly sales history in, replenishment orders out

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use restock_engine::config::MAX_WEEKS;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "restock")]
#[command(about = "Turn a sales export into a replenishment order list")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate weekly sales and compute units to order per product
    #[command(after_help = "\
Examples:
  restock run ventas.xlsx
  restock run ventas.csv --rules reglas.csv --weeks 12 --window 6
  restock run ventas.xlsx --config restock.toml --output pedido.xlsx
  restock run ventas.csv --json | jq '.results[] | select(.units_to_order > 0)'")]
    Run {
        /// Sales export (.csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb, .ods)
        sales: PathBuf,

        /// Per-product rules (fixed stock, coverage override)
        #[arg(long, short = 'r')]
        rules: Option<PathBuf>,

        /// TOML config (column names, analysis window, report labels)
        #[arg(long, short = 'c', env = "RESTOCK_CONFIG")]
        config: Option<PathBuf>,

        /// Complete weeks of history per product, 1-520 (overrides the config)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_WEEKS as i64))]
        weeks: Option<u16>,

        /// Most recent weeks averaged, 1-520 (overrides the config)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_WEEKS as i64))]
        window: Option<u16>,

        /// Print one JSON document to stdout instead of the CSV table
        #[arg(long)]
        json: bool,

        /// Write the report to a file (.xlsx or .csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Suppress warnings and the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Check a config file without running
    #[command(after_help = "\
Examples:
  restock validate restock.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Library crates log through `log`; the subscriber bridges those records.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { sales, rules, config, weeks, window, json, output, quiet } => {
            run::cmd_run(run::RunArgs {
                sales,
                rules,
                config,
                weeks: weeks.map(usize::from),
                window: window.map(usize::from),
                json,
                output,
                quiet,
            })
        }
        Commands::Validate { config } => run::cmd_validate(config),
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
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
