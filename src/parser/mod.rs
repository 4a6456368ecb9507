//! Parser module for building the syntax tree.
//!
//! This module turns a stream of tokens into a `ProgramFile`. It handles:
//!
//! - Bindings, blocks and `return` statements
//! - Expressions, with a single-pass rebalancing of binary operators
//! - Struct types and procedure literals, which are expressions too
//!
//! Primary terms and keyword statements are dispatched through NUD and
//! statement lookup tables; the first syntax error aborts the file.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
