//! The interface shared by the three engines.
//!
//! Each engine exposes its own typed outcome, and also implements [`Solver`] so the
//! driver can run any of them and print one kind of [`Report`].

use crate::sat::assignment::Model;
use crate::sat::error::Result;
use std::fmt::{Display, Formatter};

/// Final verdict of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// A satisfying model was found.
    Satisfiable,
    /// The formula was proven unsatisfiable (DPLL only).
    Unsatisfiable,
    /// The budget ran out without a satisfying model (WalkSAT, genetic).
    Unknown,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Engine-specific effort counters. Counters an engine does not use stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    /// DPLL search-tree nodes expanded (one per recursive call).
    pub nodes_expanded: usize,
    /// WalkSAT flips performed.
    pub flips: usize,
    /// Genetic generations evolved.
    pub generations: usize,
}

/// Uniform result of a solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub verdict: Verdict,
    /// Best model found; `None` only for an unsatisfiable DPLL verdict.
    pub model: Option<Model>,
    /// Clauses satisfied by `model`; zero when there is no model.
    pub satisfied: usize,
    pub stats: SolutionStats,
    /// `(iteration, best count)` each time the tracked best improved.
    pub trajectory: Vec<(usize, usize)>,
}

pub trait Solver {
    /// Short engine name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Runs the engine to completion or budget exhaustion.
    ///
    /// # Errors
    ///
    /// [`crate::sat::error::Error::ResourceExhausted`] if a working buffer cannot be
    /// allocated.
    fn solve(&mut self) -> Result<Report>;
}

/// The engines available to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum SolverType {
    Dpll,
    #[value(name = "walksat")]
    WalkSat,
    Genetic,
}

impl SolverType {
    /// Every engine, in the order the driver runs them.
    pub const ALL: [Self; 3] = [Self::Dpll, Self::WalkSat, Self::Genetic];
}

impl Display for SolverType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dpll => write!(f, "dpll"),
            Self::WalkSat => write!(f, "walksat"),
            Self::Genetic => write!(f, "genetic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_solver_type_names_round_trip() {
        for ty in SolverType::ALL {
            let parsed = SolverType::from_str(&ty.to_string(), true).unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Satisfiable.to_string(), "SATISFIABLE");
        assert_eq!(Verdict::Unknown.to_string(), "UNKNOWN");
    }
}
