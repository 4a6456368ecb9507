//! Parser state and entry points.
//!
//! The parser pulls tokens from a `TokenSource` and keeps lookup tables for:
//! - NUD (null denotation) handlers for primary terms
//! - Statement handlers for keyword-introduced statements
//!
//! Binary operators are recognised through `BINARY_LOOKUP` and placed with
//! the rebalancing routine in `expr.rs`.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        ast::ResolvedType,
        expressions::{BinaryOperator, Expr, Tier},
        statements::{ProgramFile, Stmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{Lexer, TokenSource},
        tokens::{Token, TokenKind},
    },
    Position,
};

use super::{
    expr::parse_expr,
    lookups::{create_token_lookups, NUDHandler, NUDLookup, StmtHandler, StmtLookup, BINARY_LOOKUP},
    stmt::parse_binding,
};

/// Context-sensitive limits on what an expression may contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Restrictions {
    /// `{` after a term opens a body, not an initializer.
    pub no_initializer: bool,
    /// The expression is a declared type: assignment operators end it, and a
    /// `:` after a procedure signature belongs to the enclosing binding.
    pub type_position: bool,
}

impl Restrictions {
    pub const NONE: Restrictions = Restrictions {
        no_initializer: false,
        type_position: false,
    };

    pub const TYPE: Restrictions = Restrictions {
        no_initializer: false,
        type_position: true,
    };

    pub const RETURN_TYPE: Restrictions = Restrictions {
        no_initializer: true,
        type_position: true,
    };
}

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// Where tokens come from
    tokens: Box<dyn TokenSource>,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (primary term) handlers
    nud_lookup: NUDLookup,
    /// Restrictions of the expression currently being parsed
    restrictions: Restrictions,
}

impl Parser {
    pub fn new(mut tokens: Box<dyn TokenSource>) -> Self {
        let file = Rc::clone(&tokens.peek(0).position.file);

        Parser {
            tokens,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            restrictions: Restrictions::NONE,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&mut self) -> &Token {
        self.tokens.peek(0)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&mut self) -> TokenKind {
        self.tokens.peek(0).kind
    }

    /// Returns the kind of the token `offset` places ahead.
    pub fn peek_kind(&mut self, offset: usize) -> TokenKind {
        self.tokens.peek(offset).kind
    }

    /// Consumes and returns the current token.
    pub fn advance(&mut self) -> Token {
        self.tokens.eat()
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(&mut self, expected_kind: TokenKind, error: Option<Error>) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            return Ok(self.advance());
        }

        match error {
            Some(error) => Err(error),
            None => Err(self.unexpected()),
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects the delimiter closing `open`.
    pub fn expect_closing(&mut self, open: TokenKind) -> Result<Token, Error> {
        let closing = match open.closing() {
            Some(closing) => closing,
            None => return Err(self.unexpected()),
        };

        if self.current_token_kind() == closing {
            return Ok(self.advance());
        }

        let token = self.current_token().clone();
        Err(Error::new(
            ErrorImpl::UnmatchedDelimiter {
                expected: delimiter_text(closing).to_string(),
                found: token.value,
            },
            token.position,
        ))
    }

    /// The error for the current token not fitting where it appears.
    pub fn unexpected(&mut self) -> Error {
        let token = self.current_token().clone();
        let error = match token.kind {
            TokenKind::Invalid => ErrorImpl::UnrecognisedToken { token: token.value },
            _ => ErrorImpl::UnexpectedToken { token: token.value },
        };

        Error::new(error, token.position)
    }

    /// Consumes an optional statement separator.
    pub fn skip_semicolon(&mut self) {
        if self.current_token_kind() == TokenKind::Semicolon {
            self.advance();
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&mut self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// The binary operator at the current token, honouring restrictions.
    pub fn binary_operator(&mut self) -> Option<BinaryOperator> {
        let operator = *BINARY_LOOKUP.get(&self.current_token_kind())?;

        if self.restrictions.type_position && operator.tier() == Tier::Assignment {
            None
        } else {
            Some(operator)
        }
    }

    pub fn restrictions(&self) -> Restrictions {
        self.restrictions
    }

    /// Runs `parse` under `restrictions`, restoring the previous ones after.
    pub fn with_restrictions<T>(
        &mut self,
        restrictions: Restrictions,
        parse: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let previous = std::mem::replace(&mut self.restrictions, restrictions);
        let result = parse(self);
        self.restrictions = previous;
        result
    }

    /// Returns the NUD handler for a token kind.
    pub fn get_nud(&self, kind: TokenKind) -> Option<NUDHandler> {
        self.nud_lookup.get(&kind).copied()
    }

    /// Returns the statement handler for a token kind.
    pub fn get_stmt(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt_lookup.get(&kind).copied()
    }

    /// Registers a null denotation (primary term) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the position of the current token.
    pub fn get_position(&mut self) -> Position {
        self.current_token().position.clone()
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }
}

fn delimiter_text(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::CloseParen => ")",
        TokenKind::CloseBracket => "]",
        TokenKind::CloseCurly => "}",
        _ => "?",
    }
}

fn new_parser(tokens: Box<dyn TokenSource>) -> Parser {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);
    parser
}

/// Parses source text into a program file.
#[tracing::instrument(skip(source))]
pub fn parse(source: String, file: String) -> Result<ProgramFile, Error> {
    parse_tokens(Box::new(Lexer::new(source, Some(file))))
}

/// Parses a whole file: an ordered sequence of top-level bindings.
///
/// Stops at the first syntax error; there is no recovery.
#[tracing::instrument(skip_all)]
pub fn parse_tokens(tokens: Box<dyn TokenSource>) -> Result<ProgramFile, Error> {
    let mut parser = new_parser(tokens);
    let position = Position::start_of(parser.file());

    let mut declarations = vec![];

    while parser.has_tokens() {
        if parser.current_token_kind() != TokenKind::Identifier || parser.peek_kind(1) != TokenKind::Colon {
            let token = parser.current_token().clone();
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value,
                    message: String::from("expected a top-level declaration `name :`"),
                },
                token.position,
            ));
        }

        let declaration: Stmt = parse_binding(&mut parser)?;
        tracing::trace!(name = declaration.name().unwrap_or_default(), "parsed declaration");
        declarations.push(declaration);
    }

    tracing::debug!(file = %parser.file(), count = declarations.len(), "parsed file");

    Ok(ProgramFile {
        file: parser.file(),
        declarations,
        position,
        resolved: ResolvedType::default(),
    })
}

/// Parses a single expression that must span the whole input.
pub fn parse_expression(source: String) -> Result<Expr, Error> {
    let mut parser = new_parser(Box::new(Lexer::new(source, None)));
    let expr = parse_expr(&mut parser)?;

    if parser.has_tokens() {
        return Err(parser.unexpected());
    }

    Ok(expr)
}
