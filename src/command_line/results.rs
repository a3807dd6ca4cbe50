//! Append-only CSV log with one row per solved file.

use satbench::sat::solver::{Report, SolverType, Verdict};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

pub(crate) const HEADER: &str = "file,DPLL output,DPLL time (s),WalkSAT output,WalkSAT time (s),genetic output,genetic time (s)";

/// Output value and solve time for one engine.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    output: usize,
    seconds: f64,
}

/// One line of the results log. Engines that did not run leave empty cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ResultRow {
    file: String,
    cells: [Option<Cell>; 3],
}

const fn column(solver: SolverType) -> usize {
    match solver {
        SolverType::Dpll => 0,
        SolverType::WalkSat => 1,
        SolverType::Genetic => 2,
    }
}

impl ResultRow {
    pub(crate) fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            cells: [None, None, None],
        }
    }

    /// DPLL records `1`/`0` for SAT/UNSAT, the stochastic engines their satisfied count.
    pub(crate) fn record(&mut self, solver: SolverType, report: &Report, elapsed: Duration) {
        let output = match solver {
            SolverType::Dpll => usize::from(report.verdict == Verdict::Satisfiable),
            SolverType::WalkSat | SolverType::Genetic => report.satisfied,
        };
        self.cells[column(solver)] = Some(Cell {
            output,
            seconds: elapsed.as_secs_f64(),
        });
    }

    pub(crate) fn to_csv(&self) -> String {
        let mut line = escape(&self.file);
        for cell in &self.cells {
            match cell {
                Some(Cell { output, seconds }) => line.push_str(&format!(",{output},{seconds:.6}")),
                None => line.push_str(",,"),
            }
        }
        line
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Appends `row` to the log at `path`, writing the header first if the file is new or empty.
pub(crate) fn append(path: &Path, row: &ResultRow) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{HEADER}")?;
    }
    writeln!(file, "{}", row.to_csv())
}

#[cfg(test)]
mod tests {
    use super::*;
    use satbench::sat::solver::SolutionStats;

    fn report(verdict: Verdict, satisfied: usize) -> Report {
        Report {
            verdict,
            model: None,
            satisfied,
            stats: SolutionStats::default(),
            trajectory: Vec::new(),
        }
    }

    #[test]
    fn test_row_formatting() {
        let mut row = ResultRow::new("uf20-01.cnf");
        row.record(
            SolverType::Dpll,
            &report(Verdict::Satisfiable, 91),
            Duration::from_millis(250),
        );
        row.record(
            SolverType::Genetic,
            &report(Verdict::Unknown, 88),
            Duration::from_secs(2),
        );
        assert_eq!(row.to_csv(), "uf20-01.cnf,1,0.250000,,,88,2.000000");
    }

    #[test]
    fn test_unsat_dpll_writes_zero() {
        let mut row = ResultRow::new("a,b.cnf");
        row.record(
            SolverType::Dpll,
            &report(Verdict::Unsatisfiable, 0),
            Duration::ZERO,
        );
        assert_eq!(row.to_csv(), "\"a,b.cnf\",0,0.000000,,,,");
    }

    #[test]
    fn test_append_writes_header_once() {
        let path = std::env::temp_dir().join(format!("satbench-results-{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        append(&path, &ResultRow::new("one.cnf")).unwrap();
        append(&path, &ResultRow::new("two.cnf")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![HEADER, "one.cnf,,,,,,", "two.cnf,,,,,,"]);
        std::fs::remove_file(&path).unwrap();
    }
}
