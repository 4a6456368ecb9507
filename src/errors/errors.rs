use std::fmt::Display;

use thiserror::Error;

use crate::{DiagnosticSink, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// The broad class an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Redeclaration,
    UnresolvedSymbol,
    TypeMismatch,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnmatchedDelimiter { .. } => "UnmatchedDelimiter",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::MissingDeclarationType { .. } => "MissingDeclarationType",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::FieldTypeMatchError { .. } => "FieldTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ExpectedType { .. } => "ExpectedType",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::InvalidOperands { .. } => "InvalidOperands",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidCast { .. } => "InvalidCast",
            ErrorImpl::NotAssignable => "NotAssignable",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::SubscriptCountMismatch { .. } => "SubscriptCountMismatch",
            ErrorImpl::InvalidSubscript { .. } => "InvalidSubscript",
            ErrorImpl::NotInitializable { .. } => "NotInitializable",
            ErrorImpl::ReturnOutsideProcedure => "ReturnOutsideProcedure",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::UnmatchedDelimiter { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::MissingDeclarationType { .. } => ErrorCategory::Syntax,
            ErrorImpl::VariableAlreadyDeclared { .. } => ErrorCategory::Redeclaration,
            ErrorImpl::VariableNotDeclared { .. } => ErrorCategory::UnresolvedSymbol,
            _ => ErrorCategory::TypeMismatch,
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UnmatchedDelimiter { expected, .. } => {
                ErrorTip::Suggestion(format!("Did you forget a closing `{}`?", expected))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::MissingDeclarationType { name } => ErrorTip::Suggestion(format!(
                "Give `{}` a type (`{} : Int`) or a value (`{} :: 1`)",
                name, name, name
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope, shadowing only works in a nested scope",
                variable
            )),
            ErrorImpl::VariableNotDeclared { variable } => ErrorTip::Suggestion(format!(
                "`{}` must be declared before it is used",
                variable
            )),
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::FieldTypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected field type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ExpectedType { received } => ErrorTip::Suggestion(format!(
                "A type such as `Int` was expected here, received a value of type `{}`",
                received
            )),
            ErrorImpl::UnknownField { type_, .. } => {
                ErrorTip::Suggestion(format!("Check the fields declared on `{}`", type_))
            }
            ErrorImpl::AssignToConstant { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` with `=` instead of `:` to make it mutable",
                variable
            )),
            ErrorImpl::ReturnOutsideProcedure => {
                ErrorTip::Suggestion(String::from("`return` is only valid inside `proc` bodies"))
            }
            _ => ErrorTip::None,
        }
    }

    /// Hands the error to a diagnostic sink.
    pub fn report(&self, sink: &mut dyn DiagnosticSink) {
        let message = self.internal_error.to_string();
        match self.get_tip() {
            ErrorTip::None => sink.report(&self.position, &message, None),
            ErrorTip::Suggestion(hint) => sink.report(&self.position, &message, Some(&hint)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("expected `{expected}` to close this, found {found:?}")]
    UnmatchedDelimiter { expected: String, found: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("declaration of {name:?} has neither a type nor a value")]
    MissingDeclarationType { name: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("field types do not match: expected {expected}, received {received}")]
    FieldTypeMatchError { expected: String, received: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("expected a type, received a value of type {received}")]
    ExpectedType { received: String },
    #[error("type {type_} has no field {field:?}")]
    UnknownField { type_: String, field: String },
    #[error("operator `{operator}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("operator `{operator}` cannot be applied to {operand}")]
    InvalidOperand { operator: String, operand: String },
    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("left-hand side of an assignment must be a variable, field or element")]
    NotAssignable,
    #[error("cannot assign to constant {variable:?}")]
    AssignToConstant { variable: String },
    #[error("value of type {type_} is not callable")]
    NotCallable { type_: String },
    #[error("value of type {type_} cannot be indexed")]
    NotIndexable { type_: String },
    #[error("expected {expected} subscripts, received {received}")]
    SubscriptCountMismatch { expected: usize, received: usize },
    #[error("subscript must be an integer, received {received}")]
    InvalidSubscript { received: String },
    #[error("type {type_} cannot be initialized with `{{...}}`")]
    NotInitializable { type_: String },
    #[error("return outside of a procedure")]
    ReturnOutsideProcedure,
}
