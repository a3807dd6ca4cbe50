#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! DIMACS-style literals: a positive integer `v` asserts variable `v`, `-v` negates it.

/// A signed, non-zero literal.
pub type Literal = i32;

/// A 1-based variable index.
pub type Variable = usize;

/// Variable a literal refers to.
#[must_use]
pub const fn var_of_lit(l: Literal) -> Variable {
    l.unsigned_abs() as Variable
}

/// `true` for a positive literal, `false` for a negated one.
#[must_use]
pub const fn polarity(l: Literal) -> bool {
    l > 0
}

/// Builds the literal that is true when `var` takes `value`.
///
/// # Panics
///
/// If `var` does not fit in an `i32`. `Problem` rejects variable counts above `i32::MAX`.
#[must_use]
pub fn lit_of(var: Variable, value: bool) -> Literal {
    let l = Literal::try_from(var).expect("variable index overflowed i32");
    if value { l } else { -l }
}

/// Whether `l` evaluates true when its variable has `value`.
#[must_use]
pub const fn satisfied_by(l: Literal, value: bool) -> bool {
    polarity(l) == value
}
