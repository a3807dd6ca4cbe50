use crate::sat::error::{try_vec, Result};
use crate::sat::literal::{lit_of, polarity, var_of_lit, Literal, Variable};
use bit_vec::BitVec;
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(&self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(*b),
            Self::Unassigned => None,
        }
    }
}

/// Anything that can answer "what is the value of variable `v`?".
///
/// Implemented by the partial [`Assignment`] used during DPLL and by the dense
/// [`BitVec`] used by the local-search engines, so clause evaluation is written once.
pub trait Valuation {
    /// Value of the 1-based variable `var`, or `None` if it is unassigned.
    fn var_value(&self, var: Variable) -> Option<bool>;
}

/// A partial assignment indexed by variable; slot 0 is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<Variable> for Assignment {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Assignment {
    /// An assignment for `n` variables with every variable unassigned.
    ///
    /// # Errors
    ///
    /// [`crate::sat::error::Error::ResourceExhausted`] if the slots cannot be allocated.
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self(try_vec(n + 1, VarState::Unassigned)?))
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn set(&mut self, var: Variable, b: bool) {
        self.0[var] = VarState::Assigned(b);
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        self.set(var_of_lit(lit), polarity(lit));
    }

    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.0.iter().skip(1).all(VarState::is_assigned)
    }

    /// Signed-literal model; variables left unassigned are reported as `true`.
    #[must_use]
    pub fn to_model(&self) -> Model {
        Model(
            self.0
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, s)| lit_of(i, s.value().unwrap_or(true)))
                .collect(),
        )
    }
}

impl Valuation for Assignment {
    fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(var).and_then(VarState::value)
    }
}

/// Dense total assignment: bit `v - 1` holds the value of variable `v`.
impl Valuation for BitVec {
    fn var_value(&self, var: Variable) -> Option<bool> {
        self.get(var - 1)
    }
}

/// A total assignment in output form: `(-1)^{¬bit} * v` for each variable in index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Model(Vec<Literal>);

impl Model {
    /// Converts a dense bit vector (bit `v - 1` for variable `v`) into a model.
    #[must_use]
    pub fn from_bits(bits: &BitVec) -> Self {
        Self(
            bits.iter()
                .enumerate()
                .map(|(i, b)| lit_of(i + 1, b))
                .collect(),
        )
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of `var` in this model.
    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.0.get(var.checked_sub(1)?).map(|&l| l > 0)
    }
}

impl Valuation for Model {
    fn var_value(&self, var: Variable) -> Option<bool> {
        self.value(var)
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unassigned() {
        let a = Assignment::new(3).unwrap();
        assert_eq!(a.num_vars(), 3);
        assert!((1..=3).all(|v| a[v].is_unassigned()));
        assert!(!a.all_assigned());
    }

    #[test]
    fn test_assign_literal() {
        let mut a = Assignment::new(3).unwrap();
        a.assign(-2);
        a.assign(3);
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.var_value(3), Some(true));
        assert_eq!(a.var_value(1), None);
    }

    #[test]
    fn test_to_model_defaults_unassigned_to_true() {
        let mut a = Assignment::new(3).unwrap();
        a.set(2, false);
        assert_eq!(a.to_model().literals(), &[1, -2, 3]);
    }

    #[test]
    fn test_bitvec_valuation_is_one_based() {
        let bits = BitVec::from_fn(3, |i| i == 1);
        assert_eq!(bits.var_value(1), Some(false));
        assert_eq!(bits.var_value(2), Some(true));
        assert_eq!(Model::from_bits(&bits).to_string(), "-1 2 -3");
    }

    #[test]
    fn test_model_value() {
        let model = Model::from_bits(&BitVec::from_elem(2, true));
        assert_eq!(model.value(2), Some(true));
        assert_eq!(model.value(0), None);
        assert_eq!(model.value(3), None);
    }
}
