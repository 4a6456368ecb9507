#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::{
    ast::statements::Program,
    type_checker::type_checker::{type_check, TypeChecker},
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A location in a source file: 1-based line, 0-based column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: Rc<String>,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: Rc<String>, line: u32, column: u32) -> Self {
        Position { file, line, column }
    }

    pub fn start_of(file: Rc<String>) -> Self {
        Position::new(file, 1, 0)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Receives diagnostics from the front end. The driver decides how they are
/// rendered; nothing in the core prints.
pub trait DiagnosticSink {
    fn report(&mut self, position: &Position, message: &str, hint: Option<&str>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
    pub hint: Option<String>,
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, position: &Position, message: &str, hint: Option<&str>) {
        self.diagnostics.push(Diagnostic {
            position: position.clone(),
            message: message.to_string(),
            hint: hint.map(str::to_string),
        });
    }
}

/// Type checks a parsed program and reports every diagnostic to `sink`.
///
/// Returns the checker (which owns the type cache needed to interpret the
/// resolved types on `program`) when checking succeeded.
pub fn compile(program: &mut Program, sink: &mut dyn DiagnosticSink) -> Option<TypeChecker> {
    let (type_checker, errors) = type_check(program);

    if errors.is_empty() {
        Some(type_checker)
    } else {
        for error in errors.iter() {
            error.report(sink);
        }
        None
    }
}

/// Parses every `(file name, source)` pair into one program, reporting the
/// first syntax error of each file.
pub fn parse_program(sources: Vec<(String, String)>, sink: &mut dyn DiagnosticSink) -> Option<Program> {
    let mut program = Program::new();
    let mut failed = false;

    for (file, source) in sources {
        match parser::parser::parse(source, file) {
            Ok(parsed) => program.files.push(parsed),
            Err(error) => {
                error.report(sink);
                failed = true;
            }
        }
    }

    if failed {
        None
    } else {
        Some(program)
    }
}
