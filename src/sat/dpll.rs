//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! The `Dpll` struct explores a binary search tree over variable assignments. Every node
//! owns its own copy of the search state: the partial assignment, the pool of variables
//! not yet fixed, and the status of every clause. Nothing is shared between sibling
//! branches, so backtracking is just returning from a call.
//!
//! At each node the solver:
//! 1.  **Propagates clause status:** re-evaluates every undetermined clause. A clause
//!     with all literals false fails the branch.
//! 2.  **Checks for success:** if every clause is satisfied the current assignment is a
//!     model.
//! 3.  **Eliminates a pure literal:** the first pooled variable that occurs with a single
//!     polarity in the undetermined clauses is fixed to that polarity.
//! 4.  **Propagates a unit clause:** the first undetermined clause with exactly one
//!     unassigned literal has that literal made true.
//! 5.  **Branches:** otherwise the lowest-numbered pooled variable is tried `true`, then
//!     `false`.
//!
//! Steps 3 and 4 recurse into a single child. Each level fixes at least one variable, so
//! the depth of the tree is bounded by the number of variables.

use crate::sat::assignment::{Assignment, Model};
use crate::sat::error::{try_vec, Error, Result};
use crate::sat::evaluation::{clause_status, ClauseStatus};
use crate::sat::literal::{lit_of, polarity, var_of_lit, Literal, Variable};
use crate::sat::problem::Problem;
use crate::sat::solver::{Report, SolutionStats, Solver, Verdict};
use bit_vec::BitVec;
use log::{debug, trace};
use std::{panic, thread};

/// Stack reserved for the search thread regardless of problem size.
const BASE_STACK_BYTES: usize = 1 << 20;
/// Stack reserved per level of recursion; one level fixes at least one variable.
const STACK_BYTES_PER_LEVEL: usize = 2 << 10;

fn search_stack_size(num_variables: usize) -> usize {
    num_variables
        .saturating_add(1)
        .saturating_mul(STACK_BYTES_PER_LEVEL)
        .saturating_add(BASE_STACK_BYTES)
}

/// Per-node search state. Cloned when the search branches.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Branch {
    assignment: Assignment,
    /// Bit `v - 1` is set while variable `v` is still free.
    symbols: BitVec,
    status: Vec<ClauseStatus>,
}

impl Branch {
    fn root(problem: &Problem) -> Result<Self> {
        Ok(Self {
            assignment: Assignment::new(problem.num_variables())?,
            symbols: BitVec::from_elem(problem.num_variables(), true),
            status: try_vec(problem.num_clauses(), ClauseStatus::Undetermined)?,
        })
    }

    /// Makes `lit` true and removes its variable from the pool.
    fn fix(&mut self, lit: Literal) {
        let var = var_of_lit(lit);
        self.assignment.assign(lit);
        self.symbols.set(var - 1, false);
    }

    fn is_free(&self, var: Variable) -> bool {
        self.symbols.get(var - 1).unwrap_or(false)
    }

    fn first_symbol(&self) -> Option<Variable> {
        self.symbols.iter().position(|free| free).map(|i| i + 1)
    }
}

/// Polarities seen for one variable during the pure-literal scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Occurrence {
    #[default]
    Absent,
    Only(bool),
    Mixed,
}

impl Occurrence {
    const fn add(self, positive: bool) -> Self {
        match self {
            Self::Absent => Self::Only(positive),
            Self::Only(p) if p == positive => self,
            _ => Self::Mixed,
        }
    }
}

/// Outcome of a DPLL run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpllOutcome {
    /// A satisfying model, or `None` if the formula is unsatisfiable.
    pub model: Option<Model>,
    /// Number of search-tree nodes expanded.
    pub nodes_expanded: usize,
}

impl DpllOutcome {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        self.model.is_some()
    }
}

/// A complete, recursive DPLL solver over a borrowed [`Problem`].
#[derive(Debug, Clone)]
pub struct Dpll<'a> {
    /// The formula being solved.
    problem: &'a Problem,
    /// Incremented once per recursive call.
    nodes_expanded: usize,
}

impl<'a> Dpll<'a> {
    #[must_use]
    pub const fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            nodes_expanded: 0,
        }
    }

    /// Searches for a satisfying assignment.
    ///
    /// Variables that end up unconstrained when every clause is satisfied are reported as
    /// `true` in the model.
    ///
    /// The recursion runs on a dedicated thread whose stack grows with the number of
    /// variables, so the depth of the search never depends on the caller's stack.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceExhausted`] if the root state cannot be allocated.
    /// - [`Error::SearchThread`] if the search thread cannot be spawned.
    pub fn run(&mut self) -> Result<DpllOutcome> {
        self.nodes_expanded = 0;
        let root = Branch::root(self.problem)?;
        let stack_size = search_stack_size(self.problem.num_variables());

        let found = thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name("dpll-search".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, || self.search(root))
                .map_err(Error::SearchThread)?;
            Ok::<_, Error>(handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
        })?;
        let model = found.map(|a| a.to_model());

        debug!(
            "dpll finished: {} after {} nodes",
            if model.is_some() { "SAT" } else { "UNSAT" },
            self.nodes_expanded
        );

        Ok(DpllOutcome {
            model,
            nodes_expanded: self.nodes_expanded,
        })
    }

    #[must_use]
    pub const fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    fn search(&mut self, mut branch: Branch) -> Option<Assignment> {
        self.nodes_expanded += 1;

        if !self.propagate_status(&mut branch) {
            return None;
        }

        if branch
            .status
            .iter()
            .all(|&s| s == ClauseStatus::Satisfied)
        {
            return Some(branch.assignment);
        }

        if let Some(lit) = self.find_pure_literal(&branch) {
            trace!("pure literal {lit}");
            branch.fix(lit);
            return self.search(branch);
        }

        if let Some(lit) = self.find_unit_literal(&branch) {
            trace!("unit literal {lit}");
            branch.fix(lit);
            return self.search(branch);
        }

        let var = branch.first_symbol()?;
        trace!("branching on {var}");

        let mut true_branch = branch.clone();
        true_branch.fix(lit_of(var, true));
        if let Some(assignment) = self.search(true_branch) {
            return Some(assignment);
        }

        branch.fix(lit_of(var, false));
        self.search(branch)
    }

    /// Re-evaluates every undetermined clause. Returns `false` if one is falsified.
    ///
    /// Satisfied clauses are skipped: along one path variables are only ever added to
    /// the assignment, so a satisfied clause stays satisfied.
    fn propagate_status(&self, branch: &mut Branch) -> bool {
        for (clause, status) in self.problem.iter().zip(branch.status.iter_mut()) {
            if *status != ClauseStatus::Undetermined {
                continue;
            }
            *status = clause_status(clause, &branch.assignment);
            if *status == ClauseStatus::Unsatisfied {
                return false;
            }
        }
        true
    }

    /// First free variable (in index order) occurring with one polarity only across the
    /// undetermined clauses, as the literal that satisfies those occurrences.
    fn find_pure_literal(&self, branch: &Branch) -> Option<Literal> {
        let mut seen = vec![Occurrence::Absent; self.problem.num_variables() + 1];

        for (clause, _) in self
            .problem
            .iter()
            .zip(&branch.status)
            .filter(|(_, s)| **s == ClauseStatus::Undetermined)
        {
            for &lit in clause {
                let var = var_of_lit(lit);
                if branch.is_free(var) {
                    seen[var] = seen[var].add(polarity(lit));
                }
            }
        }

        seen.iter().enumerate().skip(1).find_map(|(var, occ)| match occ {
            Occurrence::Only(positive) => Some(lit_of(var, *positive)),
            _ => None,
        })
    }

    /// Literal of the first undetermined clause that has exactly one unassigned literal.
    fn find_unit_literal(&self, branch: &Branch) -> Option<Literal> {
        self.problem
            .iter()
            .zip(&branch.status)
            .filter(|(_, s)| **s == ClauseStatus::Undetermined)
            .find_map(|(clause, _)| {
                let mut free = clause.iter().filter(|&&l| branch.is_free(var_of_lit(l)));
                match (free.next(), free.next()) {
                    (Some(&lit), None) => Some(lit),
                    _ => None,
                }
            })
    }
}

impl Solver for Dpll<'_> {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn solve(&mut self) -> Result<Report> {
        let outcome = self.run()?;
        let satisfied = if outcome.is_sat() {
            self.problem.num_clauses()
        } else {
            0
        };

        Ok(Report {
            verdict: if outcome.is_sat() {
                Verdict::Satisfiable
            } else {
                Verdict::Unsatisfiable
            },
            model: outcome.model,
            satisfied,
            stats: SolutionStats {
                nodes_expanded: outcome.nodes_expanded,
                ..SolutionStats::default()
            },
            trajectory: Vec::new(),
        })
    }
}
