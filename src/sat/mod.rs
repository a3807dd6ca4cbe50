#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod clause;
pub mod dimacs;
pub mod dpll;
pub mod error;
pub mod evaluation;
pub mod genetic;
pub mod literal;
pub mod problem;
pub mod solver;
pub mod walksat;
