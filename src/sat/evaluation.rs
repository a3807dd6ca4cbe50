#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Pure clause and formula evaluation shared by all three engines.

use crate::sat::assignment::Valuation;
use crate::sat::clause::Clause;
use crate::sat::literal::{satisfied_by, var_of_lit, Variable};
use crate::sat::problem::Problem;

/// Status of a clause under a (possibly partial) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClauseStatus {
    /// Some literal is unassigned and none is true.
    #[default]
    Undetermined,
    /// At least one literal is true.
    Satisfied,
    /// Every literal is assigned and false.
    Unsatisfied,
}

/// Evaluates `clause` under `valuation`.
///
/// Literals are scanned left to right and the scan stops at the first true literal.
pub fn clause_status<V: Valuation + ?Sized>(clause: &Clause, valuation: &V) -> ClauseStatus {
    let mut unassigned = false;
    for &lit in clause {
        match valuation.var_value(var_of_lit(lit)) {
            Some(value) if satisfied_by(lit, value) => return ClauseStatus::Satisfied,
            Some(_) => {}
            None => unassigned = true,
        }
    }
    if unassigned {
        ClauseStatus::Undetermined
    } else {
        ClauseStatus::Unsatisfied
    }
}

/// A view of a valuation with one variable's value inverted.
struct Flipped<'a, V: ?Sized> {
    inner: &'a V,
    var: Variable,
}

impl<V: Valuation + ?Sized> Valuation for Flipped<'_, V> {
    fn var_value(&self, var: Variable) -> Option<bool> {
        let value = self.inner.var_value(var);
        if var == self.var { value.map(|b| !b) } else { value }
    }
}

/// Number of clauses of `problem` satisfied by `valuation`, as if `flip` (when given) had
/// its value inverted. The valuation itself is not modified.
pub fn count_satisfied<V: Valuation + ?Sized>(
    problem: &Problem,
    valuation: &V,
    flip: Option<Variable>,
) -> usize {
    match flip {
        Some(var) => count_with(problem, &Flipped { inner: valuation, var }),
        None => count_with(problem, valuation),
    }
}

fn count_with<V: Valuation + ?Sized>(problem: &Problem, valuation: &V) -> usize {
    problem
        .iter()
        .filter(|c| clause_status(c, valuation) == ClauseStatus::Satisfied)
        .count()
}

/// Indices of the clauses not satisfied by `valuation`, in clause order.
pub fn unsatisfied_clauses<V: Valuation + ?Sized>(problem: &Problem, valuation: &V) -> Vec<usize> {
    let mut out = Vec::new();
    collect_unsatisfied(problem, valuation, &mut out);
    out
}

/// Like [`unsatisfied_clauses`], but refills `out` in place. With `out` reserved for
/// `num_clauses` indices this never reallocates.
pub fn collect_unsatisfied<V: Valuation + ?Sized>(
    problem: &Problem,
    valuation: &V,
    out: &mut Vec<usize>,
) {
    out.clear();
    out.extend(
        problem
            .iter()
            .enumerate()
            .filter(|(_, c)| clause_status(c, valuation) != ClauseStatus::Satisfied)
            .map(|(i, _)| i),
    );
}

/// Whether every clause of `problem` is satisfied by `valuation`.
pub fn verify<V: Valuation + ?Sized>(problem: &Problem, valuation: &V) -> bool {
    problem
        .iter()
        .all(|c| clause_status(c, valuation) == ClauseStatus::Satisfied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;
    use bit_vec::BitVec;

    fn problem() -> Problem {
        Problem::new(3, 3, [vec![1, 2], vec![-1, 3], vec![-2, -3]]).unwrap()
    }

    #[test]
    fn test_clause_status_partial() {
        let p = problem();
        let mut a = Assignment::new(3).unwrap();
        assert_eq!(clause_status(&p[0], &a), ClauseStatus::Undetermined);

        a.set(1, false);
        assert_eq!(clause_status(&p[0], &a), ClauseStatus::Undetermined);
        assert_eq!(clause_status(&p[1], &a), ClauseStatus::Satisfied);

        a.set(2, false);
        assert_eq!(clause_status(&p[0], &a), ClauseStatus::Unsatisfied);
    }

    #[test]
    fn test_clause_status_is_pure() {
        let p = problem();
        let bits = BitVec::from_fn(3, |i| i != 1);
        let first = clause_status(&p[2], &bits);
        assert_eq!(first, clause_status(&p[2], &bits));
        assert_eq!(bits, BitVec::from_fn(3, |i| i != 1));
    }

    #[test]
    fn test_count_satisfied_with_flip() {
        let p = problem();
        // x1 = T, x2 = T, x3 = F: clauses 0 and 2 satisfied, clause 1 not.
        let bits = BitVec::from_fn(3, |i| i < 2);
        assert_eq!(count_satisfied(&p, &bits, None), 2);
        // Flipping x3 satisfies clause 1 and breaks clause 2.
        assert_eq!(count_satisfied(&p, &bits, Some(3)), 2);
        assert_eq!(count_satisfied(&p, &bits, Some(2)), 2);
        // x2 still covers clause 0 once x1 is false.
        assert_eq!(count_satisfied(&p, &bits, Some(1)), 3);
        assert_eq!(bits, BitVec::from_fn(3, |i| i < 2));
    }

    #[test]
    fn test_unsatisfied_and_verify() {
        let p = problem();
        let bits = BitVec::from_fn(3, |i| i < 2);
        assert_eq!(unsatisfied_clauses(&p, &bits), vec![1]);
        assert!(!verify(&p, &bits));

        let mut buffer = vec![7, 8, 9, 10];
        collect_unsatisfied(&p, &bits, &mut buffer);
        assert_eq!(buffer, vec![1]);

        let good = BitVec::from_fn(3, |i| i == 1);
        assert!(verify(&p, &good));
        assert!(unsatisfied_clauses(&p, &good).is_empty());
    }
}
