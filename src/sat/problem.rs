#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The immutable CNF instance shared by every engine.
//!
//! A [`Problem`] is validated once at construction: the declared counts must match the
//! clauses supplied, every literal must name a variable in `1..=num_variables`, and no
//! clause may exceed the configured width. Clauses wider than the bound are rejected
//! rather than truncated.

use crate::sat::clause::Clause;
use crate::sat::error::{try_with_capacity, Error, Result};
use crate::sat::literal::{var_of_lit, Literal};
use core::ops::Index;
use itertools::Itertools;
use std::fmt::Display;

/// Widest clause accepted when no explicit bound is given.
pub const DEFAULT_MAX_CLAUSE_WIDTH: usize = 5;

/// A CNF formula: a conjunction of clauses over variables `1..=num_variables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Problem {
    /// Builds a problem with the default clause width bound.
    ///
    /// # Errors
    ///
    /// Any validation failure described on [`Problem::with_max_clause_width`].
    pub fn new<I, C>(num_variables: usize, num_clauses: usize, clauses: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[Literal]>,
    {
        Self::with_max_clause_width(num_variables, num_clauses, clauses, DEFAULT_MAX_CLAUSE_WIDTH)
    }

    /// Builds a problem, rejecting clauses with more than `max_width` literals.
    ///
    /// # Errors
    ///
    /// - [`Error::NoVariables`] / [`Error::NoClauses`] for zero declared counts.
    /// - [`Error::TooManyVariables`] if variable indices would not fit in a literal.
    /// - [`Error::EmptyClause`], [`Error::ZeroLiteral`], [`Error::LiteralOutOfRange`],
    ///   [`Error::ClauseTooWide`] for a malformed clause.
    /// - [`Error::ClauseCountMismatch`] if the clause count differs from `num_clauses`.
    /// - [`Error::ResourceExhausted`] if the clause list cannot be allocated.
    pub fn with_max_clause_width<I, C>(
        num_variables: usize,
        num_clauses: usize,
        clauses: I,
        max_width: usize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[Literal]>,
    {
        if num_variables == 0 {
            return Err(Error::NoVariables);
        }
        if Literal::try_from(num_variables).is_err() {
            return Err(Error::TooManyVariables(num_variables));
        }
        if num_clauses == 0 {
            return Err(Error::NoClauses);
        }

        // The declared count only caps the initial reservation.
        let clauses = clauses.into_iter();
        let mut stored = try_with_capacity(clauses.size_hint().0.min(num_clauses))?;
        for (idx, literals) in clauses.enumerate() {
            let literals = literals.as_ref();
            validate_clause(idx, literals, num_variables, max_width)?;
            stored.try_reserve(1)?;
            stored.push(Clause::new(literals));
        }

        if stored.len() != num_clauses {
            return Err(Error::ClauseCountMismatch {
                declared: num_clauses,
                found: stored.len(),
            });
        }

        Ok(Self {
            num_variables,
            clauses: stored,
        })
    }

    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.num_variables
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Total number of literal occurrences across all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }
}

fn validate_clause(
    idx: usize,
    literals: &[Literal],
    num_variables: usize,
    max_width: usize,
) -> Result<()> {
    if literals.is_empty() {
        return Err(Error::EmptyClause { clause: idx });
    }
    if literals.len() > max_width {
        return Err(Error::ClauseTooWide {
            clause: idx,
            width: literals.len(),
            max: max_width,
        });
    }
    for &literal in literals {
        if literal == 0 {
            return Err(Error::ZeroLiteral { clause: idx });
        }
        if var_of_lit(literal) > num_variables {
            return Err(Error::LiteralOutOfRange {
                clause: idx,
                literal,
                num_variables,
            });
        }
    }
    Ok(())
}

impl Index<usize> for Problem {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

/// Renders the problem back to DIMACS.
impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_variables, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{} 0", clause.iter().join(" "))?;
        }
        Ok(())
    }
}
