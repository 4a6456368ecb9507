//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};
use crate::{CollectingSink, Position};
use std::rc::Rc;

fn position(line: u32, column: u32) -> Position {
    Position::new(Rc::new("test.lang".to_string()), line, column)
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(1, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.category(), ErrorCategory::Syntax);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42, 3),
    );

    assert_eq!(error.get_position().line, 42);
    assert_eq!(error.get_position().column, 3);
    assert_eq!(error.get_position().to_string(), "test.lang:42:3");
}

#[test]
fn test_error_display_includes_position() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "foo".to_string(),
        },
        position(2, 4),
    );

    assert_eq!(error.to_string(), "test.lang:2:4: variable \"foo\" not declared");
}

#[test]
fn test_categories() {
    let cases = [
        (
            ErrorImpl::UnmatchedDelimiter {
                expected: ")".to_string(),
                found: "EOF".to_string(),
            },
            ErrorCategory::Syntax,
        ),
        (
            ErrorImpl::MissingDeclarationType { name: "x".to_string() },
            ErrorCategory::Syntax,
        ),
        (
            ErrorImpl::VariableAlreadyDeclared {
                variable: "x".to_string(),
            },
            ErrorCategory::Redeclaration,
        ),
        (
            ErrorImpl::VariableNotDeclared {
                variable: "x".to_string(),
            },
            ErrorCategory::UnresolvedSymbol,
        ),
        (
            ErrorImpl::TypeMatchError {
                expected: "Int64".to_string(),
                received: "String".to_string(),
            },
            ErrorCategory::TypeMismatch,
        ),
        (ErrorImpl::NotAssignable, ErrorCategory::TypeMismatch),
    ];

    for (error, category) in cases {
        assert_eq!(Error::new(error, position(1, 0)).category(), category);
    }
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "Int64".to_string(),
            received: "String".to_string(),
        },
        position(1, 0),
    );

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(
        error.get_impl().to_string(),
        "types do not match: expected Int64, received String"
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(1, 0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnmatchedDelimiter {
            expected: "}".to_string(),
            found: "EOF".to_string(),
        },
        position(1, 0),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "Did you forget a closing `}`?"),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_report_to_sink() {
    let mut sink = CollectingSink::default();

    Error::new(
        ErrorImpl::AssignToConstant {
            variable: "x".to_string(),
        },
        position(3, 7),
    )
    .report(&mut sink);
    Error::new(ErrorImpl::NotAssignable, position(4, 1)).report(&mut sink);

    assert_eq!(sink.diagnostics.len(), 2);
    assert_eq!(sink.diagnostics[0].position, position(3, 7));
    assert_eq!(sink.diagnostics[0].message, "cannot assign to constant \"x\"");
    assert!(sink.diagnostics[0].hint.as_deref().unwrap().contains("mutable"));
    assert_eq!(sink.diagnostics[1].hint, None);
}
