//! # satbench
//!
//! `satbench` runs three satisfiability strategies side by side on DIMACS CNF instances:
//! 1.  **DPLL**: complete backtracking search with pure-literal elimination and unit
//!     propagation. It proves unsatisfiability as well as finding models.
//! 2.  **WalkSAT**: stochastic local search with a noise parameter and a flip budget.
//! 3.  **Genetic algorithm**: roulette selection, single-point crossover and decaying
//!     mutation over a fixed-size population.
//!
//! The stochastic engines are seeded, so repeated runs with the same options are identical.
//!
//! ## Usage
//!
//! ```sh
//! # Solve one file, or every .cnf file under a directory, with all three engines
//! satbench problem.cnf
//! satbench bench/uf20
//!
//! # Only WalkSAT, with more noise, logging results to a CSV file
//! satbench file --path problem.cnf --solver walksat --noise 0.4 --results results.csv
//!
//! # A formula given inline
//! satbench text --input "p cnf 3 2\n1 -2 0\n2 3 0"
//!
//! # Shell completions
//! satbench completions zsh
//! ```
//!
//! Set `SATBENCH_LOG` to a level such as `trace` to override the `--debug` log level.

use crate::command_line::cli::{run, Cli};
use clap::Parser;
use std::process::ExitCode;

mod command_line;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn setup_logger(debug: bool) -> Result<(), fern::InitError> {
    let default = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let level = std::env::var("SATBENCH_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default);

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.active_common().debug) {
        eprintln!("failed to initialise logging: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
