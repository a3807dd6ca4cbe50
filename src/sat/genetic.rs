#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A generational genetic algorithm for MAX-SAT style search.
//!
//! Individuals are bit strings, one bit per variable, scored by the number of clauses
//! they satisfy. Each generation draws `N` parent pairs by roulette-wheel selection,
//! recombines every pair with single-point crossover, mutates each offspring bit with a
//! probability that decays linearly from 1 towards 0 over the run, and keeps the best `N`
//! of the `2N` offspring. Any individual that satisfies every clause ends the run.
//!
//! The best individual ever observed is tracked separately from the population, so the
//! reported fitness never falls even when truncation discards a strong parent.

use crate::sat::assignment::Model;
use crate::sat::error::{try_with_capacity, Error, Result};
use crate::sat::evaluation::count_satisfied;
use crate::sat::problem::Problem;
use crate::sat::solver::{Report, SolutionStats, Solver, Verdict};
use bit_vec::BitVec;
use log::{debug, trace};
use std::cmp::Reverse;

pub const DEFAULT_POPULATION_SIZE: usize = 200;
pub const DEFAULT_GENERATIONS: usize = 10_000;
pub const DEFAULT_SEED: u64 = 21;

/// Validated genetic-engine parameters.
///
/// A generation budget of zero is allowed: the run then reports the best individual of
/// the initial population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneticConfig {
    population_size: usize,
    generations: usize,
    seed: u64,
}

impl GeneticConfig {
    /// # Errors
    ///
    /// [`Error::ZeroPopulation`] if `population_size` is zero.
    pub const fn new(population_size: usize, generations: usize, seed: u64) -> Result<Self> {
        if population_size == 0 {
            return Err(Error::ZeroPopulation);
        }
        Ok(Self {
            population_size,
            generations,
            seed,
        })
    }

    #[must_use]
    pub const fn population_size(&self) -> usize {
        self.population_size
    }

    #[must_use]
    pub const fn generations(&self) -> usize {
        self.generations
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            generations: DEFAULT_GENERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

/// A candidate assignment and its cached fitness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Individual {
    /// Bit `v - 1` is the value of variable `v`.
    pub genes: BitVec,
    /// Number of clauses satisfied by `genes`.
    pub fitness: usize,
}

impl Individual {
    fn new(problem: &Problem, genes: BitVec) -> Self {
        let fitness = count_satisfied(problem, &genes, None);
        Self { genes, fitness }
    }
}

/// Outcome of a genetic run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneticOutcome {
    /// Best individual observed across all generations.
    pub model: Model,
    /// Its fitness.
    pub satisfied: usize,
    /// Generations evolved before stopping (0 if the initial population solved it).
    pub generations: usize,
    pub solved: bool,
    /// `(generation, fitness)` for every improvement of the best fitness.
    pub trajectory: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct GeneticSat<'a> {
    problem: &'a Problem,
    config: GeneticConfig,
}

/// Best-so-far bookkeeping shared by initialisation and the generation loop.
struct Elite {
    best: Individual,
    trajectory: Vec<(usize, usize)>,
}

impl Elite {
    fn offer(&mut self, generation: usize, candidate: &Individual) {
        if candidate.fitness > self.best.fitness {
            self.best.clone_from(candidate);
            self.trajectory.push((generation, candidate.fitness));
            trace!("generation {generation}: new best {}", candidate.fitness);
        }
    }
}

impl<'a> GeneticSat<'a> {
    #[must_use]
    pub const fn new(problem: &'a Problem, config: GeneticConfig) -> Self {
        Self { problem, config }
    }

    /// Runs the evolution with a generator seeded from the config.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`] if the population buffers cannot be allocated.
    pub fn run(&self) -> Result<GeneticOutcome> {
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        let n = self.config.population_size;
        let num_vars = self.problem.num_variables();
        let target = self.problem.num_clauses();

        let mut population: Vec<Individual> = try_with_capacity(n)?;
        for _ in 0..n {
            let genes = BitVec::from_fn(num_vars, |_| rng.bool());
            let individual = Individual::new(self.problem, genes);
            if individual.fitness == target {
                debug!("genetic: initial population contains a solution");
                return Ok(Self::finish(individual, 0, true, vec![(0, target)]));
            }
            population.push(individual);
        }

        // Strict `>` keeps the earliest individual among equals.
        let mut best = &population[0];
        for individual in &population[1..] {
            if individual.fitness > best.fitness {
                best = individual;
            }
        }
        let mut elite = Elite {
            trajectory: vec![(0, best.fitness)],
            best: best.clone(),
        };

        let mut offspring: Vec<Individual> = try_with_capacity(2 * n)?;
        for generation in 0..self.config.generations {
            #[allow(clippy::cast_precision_loss)]
            let mutation = 1.0 - generation as f64 / self.config.generations as f64;
            offspring.clear();

            let wheel = Wheel::new(&population);
            for _ in 0..n {
                let first = &population[wheel.spin(&mut rng)];
                let second = &population[wheel.spin(&mut rng)];
                let (a, b) = crossover(&first.genes, &second.genes, mutation, &mut rng);

                for genes in [a, b] {
                    let child = Individual::new(self.problem, genes);
                    if child.fitness == target {
                        debug!("genetic solved in generation {}", generation + 1);
                        elite.offer(generation + 1, &child);
                        return Ok(Self::finish(child, generation + 1, true, elite.trajectory));
                    }
                    elite.offer(generation + 1, &child);
                    offspring.push(child);
                }
            }

            // Stable: equal-fitness offspring keep production order.
            offspring.sort_by_key(|i| Reverse(i.fitness));
            population.clear();
            population.extend(offspring.drain(..n));
        }

        debug!(
            "genetic cutoff: best {}/{target} after {} generations",
            elite.best.fitness, self.config.generations
        );
        let solved = elite.best.fitness == target;
        Ok(Self::finish(
            elite.best,
            self.config.generations,
            solved,
            elite.trajectory,
        ))
    }

    fn finish(
        best: Individual,
        generations: usize,
        solved: bool,
        trajectory: Vec<(usize, usize)>,
    ) -> GeneticOutcome {
        GeneticOutcome {
            model: Model::from_bits(&best.genes),
            satisfied: best.fitness,
            generations,
            solved,
            trajectory,
        }
    }
}

/// Fitness-proportional selection over cumulative weights.
///
/// Individual `i` owns the range `[cumulative[i-1], cumulative[i])` of `[0, total)`. When
/// every fitness is zero the wheel has no area and selection falls back to uniform.
struct Wheel {
    cumulative: Vec<usize>,
    total: usize,
}

impl Wheel {
    fn new(population: &[Individual]) -> Self {
        let mut total = 0;
        let cumulative = population
            .iter()
            .map(|i| {
                total += i.fitness;
                total
            })
            .collect();
        Self { cumulative, total }
    }

    fn spin(&self, rng: &mut fastrand::Rng) -> usize {
        if self.total == 0 {
            return rng.usize(..self.cumulative.len());
        }
        self.index_of(rng.usize(..self.total))
    }

    /// First individual whose cumulative weight exceeds `draw`.
    fn index_of(&self, draw: usize) -> usize {
        self.cumulative.partition_point(|&upper| upper <= draw)
    }
}

/// Single-point crossover with per-bit mutation.
///
/// The first child takes `first[..point]` and `second[point..]`, the second child the
/// complement. Mutation draws alternate between the two children bit by bit.
fn crossover(
    first: &BitVec,
    second: &BitVec,
    mutation: f64,
    rng: &mut fastrand::Rng,
) -> (BitVec, BitVec) {
    let len = first.len();
    let point = rng.usize(..len);
    let mut a = BitVec::from_elem(len, false);
    let mut b = BitVec::from_elem(len, false);

    for i in 0..len {
        let (from_a, from_b) = if i < point {
            (first[i], second[i])
        } else {
            (second[i], first[i])
        };
        a.set(i, from_a ^ (rng.f64() < mutation));
        b.set(i, from_b ^ (rng.f64() < mutation));
    }
    (a, b)
}

impl Solver for GeneticSat<'_> {
    fn name(&self) -> &'static str {
        "genetic"
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
                generations: outcome.generations,
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

    fn random_3sat(num_vars: usize, num_clauses: usize, seed: u64) -> Problem {
        let mut rng = fastrand::Rng::with_seed(seed);
        let vars = i32::try_from(num_vars).unwrap();
        let clauses: Vec<Vec<i32>> = (0..num_clauses)
            .map(|_| {
                (0..3)
                    .map(|_| {
                        let v = rng.i32(1..=vars);
                        if rng.bool() { v } else { -v }
                    })
                    .collect()
            })
            .collect();
        Problem::new(num_vars, num_clauses, &clauses).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            GeneticConfig::new(0, 10, 0),
            Err(Error::ZeroPopulation)
        ));
        assert!(GeneticConfig::new(1, 0, 0).is_ok());
    }

    #[test]
    fn test_zero_generations_returns_initial_individual() {
        // Unsatisfiable, so the initial individual can never end the run early.
        let problem = Problem::new(1, 2, [vec![1], vec![-1]]).unwrap();
        let config = GeneticConfig::new(1, 0, 5).unwrap();
        let outcome = GeneticSat::new(&problem, config).run().unwrap();

        assert_eq!(outcome.generations, 0);
        assert_eq!(outcome.satisfied, 1);
        assert!(!outcome.solved);
        assert_eq!(outcome.trajectory, vec![(0, 1)]);
    }

    #[test]
    fn test_wheel_ranges() {
        let pop: Vec<Individual> = [2, 0, 3]
            .into_iter()
            .map(|fitness| Individual {
                genes: BitVec::new(),
                fitness,
            })
            .collect();
        let wheel = Wheel::new(&pop);
        assert_eq!(wheel.cumulative, vec![2, 2, 5]);
        assert_eq!(wheel.total, 5);

        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..200 {
            // The zero-fitness individual owns an empty range.
            assert_ne!(wheel.spin(&mut rng), 1);
        }
        let picks: Vec<usize> = (0..5).map(|draw| wheel.index_of(draw)).collect();
        assert_eq!(picks, vec![0, 0, 2, 2, 2]);
    }

    #[test]
    fn test_zero_fitness_wheel_is_uniform() {
        let pop = vec![
            Individual {
                genes: BitVec::new(),
                fitness: 0,
            };
            4
        ];
        let wheel = Wheel::new(&pop);
        let mut rng = fastrand::Rng::with_seed(2);
        assert!((0..50).all(|_| wheel.spin(&mut rng) < 4));
    }

    #[test]
    fn test_crossover_without_mutation() {
        let first = BitVec::from_elem(8, true);
        let second = BitVec::from_elem(8, false);
        let mut rng = fastrand::Rng::with_seed(3);
        let (a, b) = crossover(&first, &second, 0.0, &mut rng);

        let point = a.iter().position(|bit| !bit).unwrap_or(8);
        assert!(a.iter().take(point).all(|bit| bit));
        assert!(a.iter().skip(point).all(|bit| !bit));
        for i in 0..8 {
            assert_ne!(a[i], b[i]);
        }
    }

    #[test]
    fn test_full_mutation_inverts_children() {
        let first = BitVec::from_elem(6, true);
        let second = BitVec::from_elem(6, true);
        let mut rng = fastrand::Rng::with_seed(4);
        let (a, b) = crossover(&first, &second, 1.0, &mut rng);
        assert!(a.none());
        assert!(b.none());
    }

    #[test]
    fn test_best_fitness_never_decreases() {
        let problem = random_3sat(20, 91, 17);
        let config = GeneticConfig::new(20, 30, 9).unwrap();
        let outcome = GeneticSat::new(&problem, config).run().unwrap();

        assert!(outcome.satisfied <= problem.num_clauses());
        for pair in outcome.trajectory.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
            assert!(pair[0].1 < pair[1].1);
        }
        assert_eq!(outcome.trajectory.last().unwrap().1, outcome.satisfied);
        assert_eq!(
            count_satisfied(&problem, &outcome.model, None),
            outcome.satisfied
        );
    }

    #[test]
    fn test_solves_easy_instance() {
        let problem = Problem::new(4, 3, [vec![1, 2], vec![-3, 4], vec![2, -4]]).unwrap();
        let config = GeneticConfig::new(10, 100, 21).unwrap();
        let outcome = GeneticSat::new(&problem, config).run().unwrap();
        assert!(outcome.solved);
        assert!(verify(&problem, &outcome.model));
    }

    #[test]
    fn test_same_seed_same_run() {
        let problem = random_3sat(12, 50, 8);
        let config = GeneticConfig::new(8, 15, 77).unwrap();
        let a = GeneticSat::new(&problem, config).run().unwrap();
        let b = GeneticSat::new(&problem, config).run().unwrap();
        assert_eq!(a, b);
    }
}
