#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! WalkSAT: stochastic local search over total assignments.
//!
//! Starting from a uniformly random assignment, each step picks an unsatisfied clause
//! at random and flips one of its variables: a random one with probability `noise`,
//! otherwise the one whose flip satisfies the most clauses overall. The search is
//! incomplete. It reports the best assignment seen within the flip budget and never
//! claims unsatisfiability.

use crate::sat::assignment::Model;
use crate::sat::error::{try_with_capacity, Error, Result};
use crate::sat::evaluation::{collect_unsatisfied, count_satisfied};
use crate::sat::literal::{var_of_lit, Variable};
use crate::sat::problem::Problem;
use crate::sat::solver::{Report, SolutionStats, Solver, Verdict};
use bit_vec::BitVec;
use log::{debug, trace};

pub const DEFAULT_NOISE: f64 = 0.2;
pub const DEFAULT_MAX_FLIPS: usize = 10_000;
pub const DEFAULT_SEED: u64 = 21;

/// Validated WalkSAT parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkSatConfig {
    noise: f64,
    max_flips: usize,
    seed: u64,
}

impl WalkSatConfig {
    /// # Errors
    ///
    /// [`Error::InvalidNoise`] unless `0 <= noise <= 1`, [`Error::ZeroFlipBudget`] if
    /// `max_flips` is zero.
    pub fn new(noise: f64, max_flips: usize, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&noise) {
            return Err(Error::InvalidNoise(noise));
        }
        if max_flips == 0 {
            return Err(Error::ZeroFlipBudget);
        }
        Ok(Self {
            noise,
            max_flips,
            seed,
        })
    }

    #[must_use]
    pub const fn noise(&self) -> f64 {
        self.noise
    }

    #[must_use]
    pub const fn max_flips(&self) -> usize {
        self.max_flips
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for WalkSatConfig {
    fn default() -> Self {
        Self {
            noise: DEFAULT_NOISE,
            max_flips: DEFAULT_MAX_FLIPS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Outcome of a WalkSAT run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSatOutcome {
    /// Best assignment seen (the satisfying one if `solved`).
    pub model: Model,
    /// Clauses satisfied by `model`.
    pub satisfied: usize,
    /// Flips performed before stopping.
    pub flips: usize,
    pub solved: bool,
    /// `(flip index, count)` for every improvement of the best count.
    pub trajectory: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct WalkSat<'a> {
    problem: &'a Problem,
    config: WalkSatConfig,
}

impl<'a> WalkSat<'a> {
    #[must_use]
    pub const fn new(problem: &'a Problem, config: WalkSatConfig) -> Self {
        Self { problem, config }
    }

    /// Runs the search with a generator seeded from the config, so equal configs give
    /// equal runs.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`] if the unsatisfied-clause buffer cannot be allocated.
    pub fn run(&self) -> Result<WalkSatOutcome> {
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        let num_clauses = self.problem.num_clauses();

        let mut values = BitVec::from_fn(self.problem.num_variables(), |_| rng.bool());
        let mut best = values.clone();
        let mut best_count = count_satisfied(self.problem, &values, None);
        let mut trajectory = vec![(0, best_count)];
        let mut unsat = try_with_capacity(num_clauses)?;

        for flip in 0..self.config.max_flips {
            collect_unsatisfied(self.problem, &values, &mut unsat);
            if unsat.is_empty() {
                debug!("walksat solved after {flip} flips");
                if num_clauses > best_count {
                    trajectory.push((flip, num_clauses));
                }
                return Ok(Self::finish(values, num_clauses, flip, true, trajectory));
            }

            let current = num_clauses - unsat.len();
            if current > best_count {
                best_count = current;
                best.clone_from(&values);
                trajectory.push((flip, current));
                trace!("flip {flip}: new best {current}/{num_clauses}");
            }

            let clause = &self.problem[unsat[rng.usize(..unsat.len())]];
            let var = if rng.f64() < self.config.noise {
                var_of_lit(clause[rng.usize(..clause.len())])
            } else {
                self.greedy_choice(&values, clause.variables())
            };
            let old = values[var - 1];
            values.set(var - 1, !old);
        }

        // The assignment left by the final flip is still a candidate.
        let last = count_satisfied(self.problem, &values, None);
        if last > best_count {
            best_count = last;
            best = values;
            trajectory.push((self.config.max_flips, last));
        }

        debug!(
            "walksat cutoff: best {best_count}/{num_clauses} after {} flips",
            self.config.max_flips
        );
        let solved = best_count == num_clauses;
        Ok(Self::finish(
            best,
            best_count,
            self.config.max_flips,
            solved,
            trajectory,
        ))
    }

    /// Variable whose flip yields the most satisfied clauses; ties keep the first seen.
    fn greedy_choice(
        &self,
        values: &BitVec,
        candidates: impl Iterator<Item = Variable>,
    ) -> Variable {
        let mut best_var = 0;
        let mut best_count = None;
        for var in candidates {
            let count = count_satisfied(self.problem, values, Some(var));
            if best_count.is_none_or(|b| count > b) {
                best_count = Some(count);
                best_var = var;
            }
        }
        best_var
    }

    fn finish(
        values: BitVec,
        satisfied: usize,
        flips: usize,
        solved: bool,
        trajectory: Vec<(usize, usize)>,
    ) -> WalkSatOutcome {
        WalkSatOutcome {
            model: Model::from_bits(&values),
            satisfied,
            flips,
            solved,
            trajectory,
        }
    }
}

impl Solver for WalkSat<'_> {
    fn name(&self) -> &'static str {
        "walksat"
    }

    fn solve(&mut self) -> Result<Report> {
        let outcome = self.run()?;
        Ok(Report {
            verdict: if outcome.solved {
                Verdict::Satisfiable
            } else {
                Verdict::Unknown
            },
            model: Some(outcome.model),
            satisfied: outcome.satisfied,
            stats: SolutionStats {
                flips: outcome.flips,
                ..SolutionStats::default()
            },
            trajectory: outcome.trajectory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::evaluation::verify;

    fn config(noise: f64, max_flips: usize, seed: u64) -> WalkSatConfig {
        WalkSatConfig::new(noise, max_flips, seed).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            WalkSatConfig::new(1.5, 10, 0),
            Err(Error::InvalidNoise(_))
        ));
        assert!(matches!(
            WalkSatConfig::new(f64::NAN, 10, 0),
            Err(Error::InvalidNoise(_))
        ));
        assert!(matches!(
            WalkSatConfig::new(0.2, 0, 0),
            Err(Error::ZeroFlipBudget)
        ));
        assert!(WalkSatConfig::new(0.0, 1, 0).is_ok());
        assert!(WalkSatConfig::new(1.0, 1, 0).is_ok());
    }

    #[test]
    fn test_single_flip_budget_never_exceeds_clause_count() {
        let problem = Problem::new(2, 2, [vec![1, 2], vec![-1, 2]]).unwrap();
        for seed in 0..64 {
            let outcome = WalkSat::new(&problem, config(0.5, 1, seed)).run().unwrap();
            assert!(outcome.satisfied <= 2);
            assert!(outcome.flips <= 1);
            if outcome.solved {
                assert_eq!(outcome.satisfied, 2);
                assert!(verify(&problem, &outcome.model));
            }
        }
    }

    #[test]
    fn test_solves_easy_instance() {
        let clauses = vec![
            vec![1, 2, 3],
            vec![-1, 2, 4],
            vec![-2, 3, -4],
            vec![1, -3, 4],
            vec![-1, -2, -3],
            vec![2, -4, 5],
            vec![-5, 1, 3],
        ];
        let problem = Problem::new(5, clauses.len(), &clauses).unwrap();
        let outcome = WalkSat::new(&problem, config(0.2, 10_000, 21)).run().unwrap();
        assert!(outcome.solved);
        assert_eq!(outcome.satisfied, problem.num_clauses());
        assert!(verify(&problem, &outcome.model));
    }

    #[test]
    fn test_unsat_reports_best_within_budget() {
        let problem = Problem::new(1, 2, [vec![1], vec![-1]]).unwrap();
        let outcome = WalkSat::new(&problem, config(0.3, 50, 3)).run().unwrap();
        assert!(!outcome.solved);
        assert_eq!(outcome.satisfied, 1);
        assert_eq!(outcome.flips, 50);
    }

    #[test]
    fn test_best_count_never_decreases() {
        let mut rng = fastrand::Rng::with_seed(11);
        let clauses: Vec<Vec<i32>> = (0..60)
            .map(|_| {
                (0..3)
                    .map(|_| {
                        let v = rng.i32(1..=15);
                        if rng.bool() { v } else { -v }
                    })
                    .collect()
            })
            .collect();
        let problem = Problem::new(15, clauses.len(), &clauses).unwrap();
        let outcome = WalkSat::new(&problem, config(0.4, 500, 5)).run().unwrap();

        assert!(outcome.satisfied <= problem.num_clauses());
        for pair in outcome.trajectory.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
            assert!(pair[0].1 < pair[1].1);
        }
        assert_eq!(outcome.trajectory.last().unwrap().1, outcome.satisfied);
    }

    #[test]
    fn test_same_seed_same_run() {
        let clauses = vec![vec![1, -2], vec![2, -3], vec![3, -1], vec![-1, -2, -3]];
        let problem = Problem::new(3, 4, &clauses).unwrap();
        let a = WalkSat::new(&problem, config(0.5, 100, 99)).run().unwrap();
        let b = WalkSat::new(&problem, config(0.5, 100, 99)).run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tautology_solved_without_flips() {
        let problem = Problem::new(1, 2, [vec![1, -1], vec![-1, 1]]).unwrap();
        let outcome = WalkSat::new(&problem, config(0.5, 10, 7)).run().unwrap();
        assert!(outcome.solved);
        assert_eq!(outcome.flips, 0);
        assert_eq!(outcome.trajectory, vec![(0, 2)]);
    }

    #[test]
    fn test_solver_report() {
        let problem = Problem::new(2, 1, [vec![1, 2]]).unwrap();
        let report = WalkSat::new(&problem, config(0.0, 10, 1)).solve().unwrap();
        assert_eq!(report.verdict, Verdict::Satisfiable);
        assert_eq!(report.satisfied, 1);
        assert!(report.model.is_some());
    }
}
