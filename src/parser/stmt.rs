use crate::{
    ast::{
        ast::ResolvedType,
        statements::{Block, Declaration, Return, Stmt, Variable},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    parser::{Parser, Restrictions},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();

    if let Some(handler) = parser.get_stmt(kind) {
        return handler(parser);
    }

    if kind == TokenKind::Identifier && parser.peek_kind(1) == TokenKind::Colon {
        return parse_binding(parser);
    }

    let expr = parse_expr(parser)?;
    parser.skip_semicolon();

    Ok(Stmt::Expression(expr))
}

/// Parses `name : [type] : value`, `name : [type] = value` or `name : type`.
pub fn parse_binding(parser: &mut Parser) -> Result<Stmt, Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    let colon = parser.expect(TokenKind::Colon)?;

    let declared_type = match parser.current_token_kind() {
        TokenKind::Colon | TokenKind::Assignment => None,
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => {
            return Err(Error::new(
                ErrorImpl::MissingDeclarationType { name: name_token.value },
                colon.position,
            ));
        }
        _ => Some(parser.with_restrictions(Restrictions::TYPE, parse_expr)?),
    };

    let constant = match parser.current_token_kind() {
        TokenKind::Colon => true,
        TokenKind::Assignment => false,
        _ => {
            parser.skip_semicolon();

            // Checked above: a binding without a value always has a type here.
            let Some(declared_type) = declared_type else {
                return Err(Error::new(
                    ErrorImpl::MissingDeclarationType { name: name_token.value },
                    colon.position,
                ));
            };

            return Ok(Stmt::Declaration(Declaration {
                name: name_token.value,
                declared_type,
                position: name_token.position,
                resolved: ResolvedType::default(),
            }));
        }
    };

    parser.advance();
    let value = parser.with_restrictions(Restrictions::NONE, parse_expr)?;
    parser.skip_semicolon();

    Ok(Stmt::Variable(Variable {
        name: name_token.value,
        declared_type,
        value,
        constant,
        position: name_token.position,
        resolved: ResolvedType::default(),
    }))
}

/// Parses `name : type` where only a declaration may appear (arguments, fields).
pub fn parse_declaration(parser: &mut Parser) -> Result<Declaration, Error> {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier in declaration"),
        },
        parser.get_position(),
    );
    let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let colon = parser.expect(TokenKind::Colon)?;

    if matches!(
        parser.current_token_kind(),
        TokenKind::Comma | TokenKind::Semicolon | TokenKind::CloseParen | TokenKind::CloseCurly
    ) {
        return Err(Error::new(
            ErrorImpl::MissingDeclarationType { name: name_token.value },
            colon.position,
        ));
    }

    let declared_type = parser.with_restrictions(Restrictions::TYPE, parse_expr)?;

    Ok(Declaration {
        name: name_token.value,
        declared_type,
        position: name_token.position,
        resolved: ResolvedType::default(),
    })
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let position = parser.expect(TokenKind::OpenCurly)?.position;

    parser.with_restrictions(Restrictions::NONE, |parser| {
        let mut statements = Vec::new();

        while !matches!(parser.current_token_kind(), TokenKind::CloseCurly | TokenKind::EOF) {
            statements.push(parse_stmt(parser)?);
        }

        parser.expect_closing(TokenKind::OpenCurly)?;

        Ok(Block {
            statements,
            position,
            resolved: ResolvedType::default(),
        })
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.advance().position;

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser)?),
    };

    parser.skip_semicolon();

    Ok(Stmt::Return(Return {
        value,
        position,
        resolved: ResolvedType::default(),
    }))
}
