use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::{
        expressions::{BinaryOperator, Expr, UnaryOperator},
        statements::Stmt,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*, types::*};

lazy_static! {
    pub static ref BINARY_LOOKUP: HashMap<TokenKind, BinaryOperator> = {
        let mut map = HashMap::new();
        // Member and cast
        map.insert(TokenKind::Dot, BinaryOperator::Member);
        map.insert(TokenKind::As, BinaryOperator::Cast);

        // Multiplicative and additive
        map.insert(TokenKind::Star, BinaryOperator::Multiply);
        map.insert(TokenKind::Slash, BinaryOperator::Divide);
        map.insert(TokenKind::Percent, BinaryOperator::Modulo);
        map.insert(TokenKind::Plus, BinaryOperator::Add);
        map.insert(TokenKind::Dash, BinaryOperator::Subtract);

        // Relational and equality
        map.insert(TokenKind::Less, BinaryOperator::Less);
        map.insert(TokenKind::LessEquals, BinaryOperator::LessEquals);
        map.insert(TokenKind::Greater, BinaryOperator::Greater);
        map.insert(TokenKind::GreaterEquals, BinaryOperator::GreaterEquals);
        map.insert(TokenKind::Equals, BinaryOperator::Equals);
        map.insert(TokenKind::NotEquals, BinaryOperator::NotEquals);

        // Logical
        map.insert(TokenKind::And, BinaryOperator::And);
        map.insert(TokenKind::Or, BinaryOperator::Or);

        // Assignment
        map.insert(TokenKind::Assignment, BinaryOperator::Assign);
        map.insert(TokenKind::PlusEquals, BinaryOperator::AddAssign);
        map.insert(TokenKind::MinusEquals, BinaryOperator::SubtractAssign);
        map.insert(TokenKind::StarEquals, BinaryOperator::MultiplyAssign);
        map.insert(TokenKind::SlashEquals, BinaryOperator::DivideAssign);
        map
    };

    pub static ref PREFIX_LOOKUP: HashMap<TokenKind, UnaryOperator> = {
        let mut map = HashMap::new();
        map.insert(TokenKind::Plus, UnaryOperator::Positive);
        map.insert(TokenKind::Dash, UnaryOperator::Negative);
        map.insert(TokenKind::Not, UnaryOperator::Not);
        map.insert(TokenKind::Ampersand, UnaryOperator::Reference);
        map.insert(TokenKind::Tilde, UnaryOperator::UniqueReference);
        map.insert(TokenKind::Star, UnaryOperator::Dereference);
        map
    };
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Literals and symbols
    parser.nud(TokenKind::Number, parse_number_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);

    // Type expressions and procedure literals
    parser.nud(TokenKind::Struct, parse_struct_type_expr);
    parser.nud(TokenKind::Proc, parse_procedure_expr);
    parser.nud(TokenKind::Func, parse_procedure_expr);

    // Statements
    parser.stmt(TokenKind::Return, parse_return_stmt);
}

// Lookup tables inside parser struct
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
