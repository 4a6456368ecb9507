//! Error types and error handling for the front end.
//!
//! This module defines the errors produced while lexing, parsing and type
//! checking. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for every phase, grouped into categories
//! - Hints attached to errors when reported to a diagnostic sink

pub mod errors;

#[cfg(test)]
mod tests;
