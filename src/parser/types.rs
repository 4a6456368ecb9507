//! Type expression parsing.
//!
//! Types are ordinary expressions in this language; this module holds the
//! two forms that only make sense as types or procedure literals:
//!
//! - `struct { a: Int, b: Float }`
//! - `proc(a: Int) => Int { ... }`, `func(a: Int): a + 1`, `proc(a: Int) => Int`

use crate::{
    ast::{
        expressions::{Expr, ExprKind},
        statements::{Declaration, Procedure, ProcedureBody},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    parser::{Parser, Restrictions},
    stmt::{parse_block, parse_declaration},
};

pub fn parse_struct_type_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.expect(TokenKind::Struct)?.position;
    parser.expect(TokenKind::OpenCurly)?;

    let fields = parse_declarations(parser, TokenKind::CloseCurly, &[TokenKind::Comma, TokenKind::Semicolon])?;
    parser.expect_closing(TokenKind::OpenCurly)?;

    Ok(Expr::new(ExprKind::StructType(fields), position))
}

pub fn parse_procedure_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().position;
    let in_type_position = parser.restrictions().type_position;

    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_declarations(parser, TokenKind::CloseParen, &[TokenKind::Comma])?;
    parser.expect_closing(TokenKind::OpenParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::FatArrow {
        parser.advance();
        Some(parser.with_restrictions(Restrictions::RETURN_TYPE, parse_expr)?)
    } else {
        None
    };

    let body = match parser.current_token_kind() {
        _ if in_type_position => ProcedureBody::None,
        TokenKind::OpenCurly => ProcedureBody::Block(parse_block(parser)?),
        TokenKind::Colon => {
            parser.advance();
            ProcedureBody::Expression(parser.with_restrictions(Restrictions::NONE, parse_expr)?)
        }
        _ => ProcedureBody::None,
    };

    Ok(Expr::new(
        ExprKind::Procedure(Box::new(Procedure {
            arguments,
            return_type,
            body,
        })),
        position,
    ))
}

/// Declarations up to `close`, separated by any of `separators`; a trailing
/// separator is allowed.
fn parse_declarations(
    parser: &mut Parser,
    close: TokenKind,
    separators: &[TokenKind],
) -> Result<Vec<Declaration>, Error> {
    let mut declarations = vec![];

    while parser.current_token_kind() != close && parser.has_tokens() {
        declarations.push(parse_declaration(parser)?);

        if separators.contains(&parser.current_token_kind()) {
            parser.advance();
        } else {
            break;
        }
    }

    Ok(declarations)
}
