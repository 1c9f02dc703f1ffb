//! Symbolic primitives for proof encodings: variables and sparse integer
//! polynomials.
//!
//! Polynomials are immutable values; every operator returns a fresh one.
//! Only the prover touches this module, numeric recomputation never does.

mod poly;
mod var;

pub use poly::{Monomial, Polynomial};
pub use var::{Var, VarPool};

#[cfg(test)]
mod tests;
