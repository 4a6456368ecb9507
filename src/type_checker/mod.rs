//! Type checking and semantic analysis module.
//!
//! This module walks the syntax tree once, top-down and left to right, and
//! writes a resolved type into every node while:
//!
//! - Resolving symbols through the chain of lexical scopes
//! - Interning every type so structurally equal types share one id
//! - Checking operators, calls, indexing, initializers and returns
//!
//! The first error inside a top-level declaration stops checking that
//! declaration; the remaining declarations are still checked.

pub mod scope;
pub mod type_checker;
pub mod types;

#[cfg(test)]
mod tests;
