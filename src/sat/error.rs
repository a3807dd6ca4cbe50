//! Error type shared by the problem model, the parser and the three engines.
//!
//! Validation failures are reported before any engine runs, so a solver never reads a
//! literal outside `1..=num_variables` or loops on an empty budget. An unsatisfiable
//! formula is not an error: it is a normal verdict carried by the solver report.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors raised while building, parsing or solving a problem.
#[derive(Debug, Error)]
pub enum Error {
    /// The problem declares zero variables.
    #[error("problem must declare at least one variable")]
    NoVariables,

    /// The declared variable count cannot be written as a literal.
    #[error("problem declares {0} variables, more than a literal can encode")]
    TooManyVariables(usize),

    /// The problem declares zero clauses.
    #[error("problem must declare at least one clause")]
    NoClauses,

    /// The number of clauses given differs from the declared count.
    #[error("problem declares {declared} clauses but {found} were given")]
    ClauseCountMismatch {
        /// Count from the problem header.
        declared: usize,
        /// Number of clauses actually supplied.
        found: usize,
    },

    /// A clause contains the literal `0`, which encodes no variable.
    #[error("clause {clause} contains the literal 0")]
    ZeroLiteral {
        /// Index of the offending clause.
        clause: usize,
    },

    /// A literal refers to a variable outside `1..=num_variables`.
    #[error("clause {clause}: literal {literal} is outside 1..={num_variables}")]
    LiteralOutOfRange {
        /// Index of the offending clause.
        clause: usize,
        /// The literal as written.
        literal: i32,
        /// Declared variable count.
        num_variables: usize,
    },

    /// A clause has no literals.
    #[error("clause {clause} is empty")]
    EmptyClause {
        /// Index of the offending clause.
        clause: usize,
    },

    /// A clause is wider than the configured bound.
    #[error("clause {clause} has {width} literals, the limit is {max}")]
    ClauseTooWide {
        /// Index of the offending clause.
        clause: usize,
        /// Number of literals in the clause.
        width: usize,
        /// Configured maximum width.
        max: usize,
    },

    /// WalkSAT noise probability outside `[0, 1]`.
    #[error("noise probability must lie in [0, 1], got {0}")]
    InvalidNoise(f64),

    /// WalkSAT was configured with a flip budget of zero.
    #[error("flip budget must be positive")]
    ZeroFlipBudget,

    /// The genetic engine was configured with an empty population.
    #[error("population size must be positive")]
    ZeroPopulation,

    /// A working buffer could not be allocated.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] TryReserveError),

    /// The DPLL search thread could not be started.
    #[error("cannot start search thread: {0}")]
    SearchThread(#[source] std::io::Error),

    /// Malformed DIMACS input.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O failure while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Allocates a vector with exactly `len` slots, reporting allocation failure as an error.
pub(crate) fn try_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, value);
    Ok(v)
}

/// Allocates an empty vector with room for `capacity` elements.
pub(crate) fn try_with_capacity<T>(capacity: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    Ok(v)
}
