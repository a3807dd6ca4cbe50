use crate::sat::literal::{var_of_lit, Literal, Variable};
use core::ops::Index;
use smallvec::SmallVec;

/// Inline capacity of a clause before it spills to the heap.
const INLINE_LITERALS: usize = 8;

/// A disjunction of literals, stored in the order given.
///
/// Clauses are only built through [`crate::sat::problem::Problem`], which checks every
/// literal against the variable range and the configured width bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    literals: SmallVec<[Literal; INLINE_LITERALS]>,
}

impl Clause {
    pub(crate) fn new(literals: &[Literal]) -> Self {
        Self {
            literals: SmallVec::from_slice(literals),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Variables of the clause, in literal order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.literals.iter().map(|&l| var_of_lit(l))
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;
    type IntoIter = core::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}
