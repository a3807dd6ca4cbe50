//! This crate provides three strategies for the Boolean satisfiability problem: a complete
//! DPLL search, WalkSAT local search, and a genetic algorithm, all sharing one CNF model.

/// The `sat` module holds the problem model, the DIMACS parser and the three solvers.
pub mod sat;
