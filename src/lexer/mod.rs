//! Lexical analysis module for the front end.
//!
//! This module contains the lexer that converts source code into a stream of
//! tokens for parsing. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Line/column tracking for error reporting
//! - On-demand scanning with lookahead through the `TokenSource` trait

pub mod lexer;
pub mod tokens;
