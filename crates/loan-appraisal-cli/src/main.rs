mod commands;
mod input;
mod log;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::appraisal::AppraiseArgs;
use commands::loan::ScheduleArgs;

/// Loan amortization schedules and investment appraisal
#[derive(Parser)]
#[command(
    name = "loanx",
    version,
    about = "Loan amortization schedules and investment appraisal",
    long_about = "Builds period-by-period repayment schedules (annuity, reducing balance, \
                  flat rate) with grace periods and balloon payments, then appraises the \
                  loan: debt-to-income for personal borrowers, NPV / IRR / DSCR for business \
                  projects."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the amortization schedule for a loan
    Schedule(ScheduleArgs),
    /// Appraise a loan (DTI for personal, NPV/IRR/DSCR for business)
    Appraise(AppraiseArgs),
    /// Sweep project NPV across discount rates
    NpvProfile(AppraiseArgs),
    /// Show borrower defaults and per-purpose suggested terms
    Defaults,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    log::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Appraise(args) => commands::appraisal::run_appraise(args),
        Commands::NpvProfile(args) => commands::appraisal::run_npv_profile(args),
        Commands::Defaults => commands::loan::run_defaults(),
        Commands::Version => {
            println!("loanx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
