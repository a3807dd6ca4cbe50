#![allow(clippy::cast_precision_loss)]

use crate::command_line::results::{self, ResultRow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use log::{debug, warn};
use satbench::sat::dimacs::{parse_dimacs, parse_file};
use satbench::sat::dpll::Dpll;
use satbench::sat::evaluation::verify;
use satbench::sat::genetic::{self, GeneticConfig, GeneticSat};
use satbench::sat::problem::{Problem, DEFAULT_MAX_CLAUSE_WIDTH};
use satbench::sat::solver::{Report, Solver, SolverType, Verdict};
use satbench::sat::walksat::{self, WalkSat, WalkSatConfig};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the benchmark driver.
#[derive(Parser, Debug)]
#[command(
    name = "satbench",
    version,
    about = "Runs DPLL, WalkSAT and a genetic algorithm on DIMACS CNF instances",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// A `.cnf` file or a directory searched recursively for `.cnf` files. Used when no
    /// subcommand is given.
    pub path: Option<PathBuf>,

    /// The subcommand to run.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Options for a bare-path run.
    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` file below a directory.
    Dir {
        /// Directory searched recursively for .cnf files.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a DIMACS formula given as text, e.g. "p cnf 3 2\n1 -2 0\n2 3 0".
    /// A literal `\n` in the argument is treated as a line break.
    Text {
        /// The DIMACS text to solve.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving command.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check every reported satisfying model against the formula.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after each engine.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the model reported by each engine.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Engine to run; repeat to run several. Defaults to all three.
    #[arg(long = "solver", value_enum)]
    pub(crate) solvers: Vec<SolverType>,

    /// WalkSAT probability of a random rather than greedy flip.
    #[arg(long, default_value_t = walksat::DEFAULT_NOISE)]
    pub(crate) noise: f64,

    /// WalkSAT flip budget.
    #[arg(long, default_value_t = walksat::DEFAULT_MAX_FLIPS)]
    pub(crate) max_flips: usize,

    /// Genetic population size.
    #[arg(long, default_value_t = genetic::DEFAULT_POPULATION_SIZE)]
    pub(crate) population: usize,

    /// Genetic generation budget.
    #[arg(long, default_value_t = genetic::DEFAULT_GENERATIONS)]
    pub(crate) generations: usize,

    /// Seed for the stochastic engines.
    #[arg(long, default_value_t = walksat::DEFAULT_SEED)]
    pub(crate) seed: u64,

    /// Reject clauses with more literals than this.
    #[arg(long, default_value_t = DEFAULT_MAX_CLAUSE_WIDTH)]
    pub(crate) max_clause_width: usize,

    /// Append one CSV row per solved file to this log.
    #[arg(long)]
    pub(crate) results: Option<PathBuf>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            debug: false,
            verify: true,
            stats: true,
            print_solution: false,
            solvers: Vec::new(),
            noise: walksat::DEFAULT_NOISE,
            max_flips: walksat::DEFAULT_MAX_FLIPS,
            population: genetic::DEFAULT_POPULATION_SIZE,
            generations: genetic::DEFAULT_GENERATIONS,
            seed: walksat::DEFAULT_SEED,
            max_clause_width: DEFAULT_MAX_CLAUSE_WIDTH,
            results: None,
        }
    }
}

impl CommonOptions {
    /// Selected engines in run order, without repeats.
    pub(crate) fn engines(&self) -> Vec<SolverType> {
        if self.solvers.is_empty() {
            return SolverType::ALL.to_vec();
        }
        SolverType::ALL
            .into_iter()
            .filter(|s| self.solvers.contains(s))
            .collect()
    }
}

impl Cli {
    /// The options that apply to the command being run.
    pub(crate) fn active_common(&self) -> &CommonOptions {
        match &self.command {
            Some(
                Commands::File { common, .. }
                | Commands::Dir { common, .. }
                | Commands::Text { common, .. },
            ) => common,
            Some(Commands::Completions { .. }) | None => &self.common,
        }
    }
}

/// Dispatches the parsed command line.
///
/// # Errors
///
/// A message describing the first parse, configuration or I/O failure.
pub(crate) fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Text { input, common }) => {
            let time = Instant::now();
            let text = input.replace("\\n", "\n");
            let problem = parse_dimacs(Cursor::new(text), common.max_clause_width)
                .map_err(|e| e.to_string())?;
            solve_and_report(&problem, &common, None, time.elapsed())
        }
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) if path.is_dir() => solve_dir(&path, &cli.common),
            Some(path) => solve_file(&path, &cli.common),
            None => Err("no input given, use --help for usage".to_string()),
        },
    }
}

/// Parses and solves a single DIMACS file.
///
/// # Errors
///
/// If the file cannot be read or parsed, or an engine configuration is invalid.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("not a file: {}", path.display()));
    }

    let time = Instant::now();
    let problem = parse_file(path, common.max_clause_width)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&problem, common, Some(path), parse_time)
}

/// Solves every `.cnf` file below `path`, in directory-walk order.
///
/// # Errors
///
/// If `path` is not a directory or any file fails to parse.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            debug!("skipping non-CNF file: {}", file_path.display());
            continue;
        }
        solve_file(file_path, common)?;
    }

    Ok(())
}

/// Outcome of one engine on one problem.
struct EngineRun {
    solver: SolverType,
    report: Report,
    elapsed: Duration,
}

fn build_solver<'a>(
    solver: SolverType,
    problem: &'a Problem,
    common: &CommonOptions,
) -> Result<Box<dyn Solver + 'a>, String> {
    let solver: Box<dyn Solver + 'a> = match solver {
        SolverType::Dpll => Box::new(Dpll::new(problem)),
        SolverType::WalkSat => {
            let config = WalkSatConfig::new(common.noise, common.max_flips, common.seed)
                .map_err(|e| e.to_string())?;
            Box::new(WalkSat::new(problem, config))
        }
        SolverType::Genetic => {
            let config = GeneticConfig::new(common.population, common.generations, common.seed)
                .map_err(|e| e.to_string())?;
            Box::new(GeneticSat::new(problem, config))
        }
    };
    Ok(solver)
}

fn run_engine(
    solver_type: SolverType,
    problem: &Problem,
    common: &CommonOptions,
) -> Result<EngineRun, String> {
    let mut solver = build_solver(solver_type, problem, common)?;
    debug!("running {}", solver.name());

    let time = Instant::now();
    let report = solver.solve().map_err(|e| e.to_string())?;
    let elapsed = time.elapsed();

    debug!("{}: {} in {elapsed:?}", solver.name(), report.verdict);
    Ok(EngineRun {
        solver: solver_type,
        report,
        elapsed,
    })
}

/// Runs the selected engines on `problem`, printing verification and statistics and
/// appending to the results log when one is configured.
///
/// # Errors
///
/// If an engine configuration is invalid, a reported model fails verification, or the
/// results log cannot be written.
pub(crate) fn solve_and_report(
    problem: &Problem,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    debug!("problem:\n{problem}");

    if common.stats {
        print_problem_stats(problem, parse_time);
    }

    let mut row = ResultRow::new(label.map_or_else(|| "<text>".to_string(), |p| p.display().to_string()));
    for solver in common.engines() {
        let run = run_engine(solver, problem, common)?;

        if common.verify {
            verify_report(problem, &run)?;
        }
        if common.stats {
            let (allocated, resident) = memory_mib();
            print_search_stats(problem, &run, allocated, resident, common.print_solution);
        }
        row.record(run.solver, &run.report, run.elapsed);
    }

    if let Some(log_path) = &common.results {
        results::append(log_path, &row)
            .map_err(|e| format!("cannot write {}: {e}", log_path.display()))?;
    }
    Ok(())
}

/// Checks a satisfying model against the formula.
fn verify_report(problem: &Problem, run: &EngineRun) -> Result<(), String> {
    match (&run.report.verdict, &run.report.model) {
        (Verdict::Satisfiable, Some(model)) => {
            let ok = verify(problem, model);
            println!("Verified ({}): {ok:?}", run.solver);
            if ok {
                Ok(())
            } else {
                Err(format!("{} model failed verification", run.solver))
            }
        }
        (Verdict::Unsatisfiable, _) => {
            println!("UNSAT ({})", run.solver);
            Ok(())
        }
        _ => {
            println!(
                "Best ({}): {}/{} clauses satisfied",
                run.solver,
                run.report.satisfied,
                problem.num_clauses()
            );
            Ok(())
        }
    }
}

/// Allocated and resident memory in MiB, or zeros if jemalloc statistics are unavailable.
fn memory_mib() -> (f64, f64) {
    const MIB: f64 = 1024.0 * 1024.0;
    let read = || -> Result<(usize, usize), tikv_jemalloc_ctl::Error> {
        epoch::advance()?;
        Ok((stats::allocated::read()?, stats::resident::read()?))
    };
    match read() {
        Ok((allocated, resident)) => (allocated as f64 / MIB, resident as f64 / MIB),
        Err(e) => {
            warn!("memory statistics unavailable: {e}");
            (0.0, 0.0)
        }
    }
}

pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_problem_stats(problem: &Problem, parse_time: Duration) {
    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", problem.num_variables());
    stat_line("Clauses", problem.num_clauses());
    stat_line("Literals", problem.num_literals());
}

fn print_search_stats(
    problem: &Problem,
    run: &EngineRun,
    allocated: f64,
    resident: f64,
    print_solution: bool,
) {
    let elapsed_secs = run.elapsed.as_secs_f64();
    let s = &run.report.stats;

    println!("{}", search_banner(run.solver));
    match run.solver {
        SolverType::Dpll => stat_line_with_rate("Nodes expanded", s.nodes_expanded, elapsed_secs),
        SolverType::WalkSat => stat_line_with_rate("Flips", s.flips, elapsed_secs),
        SolverType::Genetic => stat_line_with_rate("Generations", s.generations, elapsed_secs),
    }
    stat_line(
        "Satisfied clauses",
        format!("{}/{}", run.report.satisfied, problem.num_clauses()),
    );
    stat_line("Improvements", run.report.trajectory.len());
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if print_solution {
        if let Some(model) = &run.report.model {
            println!("Solution: {model}");
        }
    }
    println!("\n{}", run.report.verdict);
}

/// Header row of the search table, padded to the table width.
fn search_banner(solver: SolverType) -> String {
    let title = format!("[ {solver} Search Statistics ]");
    format!("{title:=^69}")
}
