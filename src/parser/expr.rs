use crate::{
    ast::expressions::{BinaryOperator, Expr, ExprKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position,
};

use super::{
    lookups::PREFIX_LOOKUP,
    parser::{Parser, Restrictions},
};

/// Parses an expression in one left-to-right pass.
///
/// Each binary operator is rotated down the right spine of the tree built
/// so far, past every node that binds looser than it (see `Spine`).
pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let mut spine = Spine::new(parse_unary_expr(parser)?);

    while let Some(operator) = parser.binary_operator() {
        let position = parser.advance().position;
        let right = parse_unary_expr(parser)?;

        spine.insert(operator, right, position);
    }

    Ok(spine.finish())
}

/// Whether `operator` must be placed below a node of operator `parent`
/// rather than above it.
fn yields_to(parent: BinaryOperator, operator: BinaryOperator) -> bool {
    parent.priority() > operator.priority()
        || (parent.priority() == operator.priority() && operator.is_right_associative())
}

/// The right spine of an expression under construction.
///
/// `open[0]` is the root: the tree is `open[0].left op0 (open[1].left op1
/// (... tail))`. Nodes below the insertion point of a new operator are
/// closed into its left operand and never revisited, so a whole expression
/// is rebalanced in amortized linear time without recursion.
pub struct Spine {
    open: Vec<(Expr, BinaryOperator, Position)>,
    tail: Expr,
}

impl Spine {
    pub fn new(first: Expr) -> Self {
        Spine { open: vec![], tail: first }
    }

    /// Attaches `operator` with `right` as its right operand.
    ///
    /// Open nodes that do not yield to `operator` bind at least as tightly,
    /// so they are folded into its left operand; the first node that yields
    /// keeps the new operator as its right child.
    pub fn insert(&mut self, operator: BinaryOperator, right: Expr, position: Position) {
        let mut left = std::mem::replace(&mut self.tail, right);

        while let Some((_, parent, _)) = self.open.last() {
            if yields_to(*parent, operator) {
                break;
            }
            if let Some((outer, parent, parent_position)) = self.open.pop() {
                left = Expr::binary(parent, outer, left, parent_position);
            }
        }

        self.open.push((left, operator, position));
    }

    pub fn finish(self) -> Expr {
        let Spine { mut open, mut tail } = self;

        while let Some((left, operator, position)) = open.pop() {
            tail = Expr::binary(operator, left, tail, position);
        }
        tail
    }
}

/// Parses prefix operators and array markers around a primary term, then
/// its postfix forms.
///
/// Prefix operators bind looser than postfix forms (`-f(x)` negates the
/// call). An array marker applies to the element term without initializer,
/// so `[]Int{1, 2}` initializes the array type.
pub fn parse_unary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let kind = parser.current_token_kind();

    if let Some(operator) = PREFIX_LOOKUP.get(&kind).copied() {
        let position = parser.advance().position;
        let operand = parse_unary_expr(parser)?;

        return Ok(Expr::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            position,
        ));
    }

    if kind == TokenKind::OpenBracket {
        let marker = parse_array_marker(parser)?;
        return parse_postfix_expr(parser, marker);
    }

    let primary = parse_primary_term(parser)?;
    parse_postfix_expr(parser, primary)
}

fn parse_array_marker(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().position;

    let mut dimensions: u8 = 1;
    while parser.current_token_kind() == TokenKind::Comma {
        let comma = parser.advance();
        dimensions = dimensions.checked_add(1).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: comma.value,
                    message: format!("an array has at most {} dimensions", u8::MAX),
                },
                comma.position,
            )
        })?;
    }
    parser.expect_closing(TokenKind::OpenBracket)?;

    let mut restrictions = parser.restrictions();
    restrictions.no_initializer = true;
    let element = parser.with_restrictions(restrictions, parse_unary_expr)?;

    Ok(Expr::new(
        ExprKind::ArrayType {
            dimensions,
            element: Box::new(element),
        },
        position,
    ))
}

fn parse_primary_term(parser: &mut Parser) -> Result<Expr, Error> {
    let kind = parser.current_token_kind();

    match parser.get_nud(kind) {
        Some(handler) => handler(parser),
        None => Err(parser.unexpected()),
    }
}

/// Applies calls `(...)`, indexing `[...]` and initializers `{...}` left to right.
pub fn parse_postfix_expr(parser: &mut Parser, mut expr: Expr) -> Result<Expr, Error> {
    loop {
        match parser.current_token_kind() {
            TokenKind::OpenParen => {
                let position = parser.get_position();
                let arguments = parse_expr_list(parser, TokenKind::OpenParen)?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        arguments,
                    },
                    position,
                );
            }
            TokenKind::OpenBracket => {
                let position = parser.get_position();
                let subscripts = parse_expr_list(parser, TokenKind::OpenBracket)?;
                expr = Expr::new(
                    ExprKind::Index {
                        target: Box::new(expr),
                        subscripts,
                    },
                    position,
                );
            }
            TokenKind::OpenCurly if !parser.restrictions().no_initializer => {
                let position = parser.get_position();
                let values = parse_expr_list(parser, TokenKind::OpenCurly)?;
                expr = Expr::new(
                    ExprKind::Initializer {
                        target: Box::new(expr),
                        values,
                    },
                    position,
                );
            }
            _ => return Ok(expr),
        }
    }
}

/// Parses `open expr, expr, ... close`; a trailing comma is allowed.
pub fn parse_expr_list(parser: &mut Parser, open: TokenKind) -> Result<Vec<Expr>, Error> {
    parser.expect(open)?;
    let closing = open.closing();

    parser.with_restrictions(Restrictions::NONE, |parser| {
        let mut values = vec![];

        while Some(parser.current_token_kind()) != closing {
            if parser.current_token_kind() == TokenKind::EOF {
                break;
            }

            values.push(parse_expr(parser)?);

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }

        parser.expect_closing(open)?;
        Ok(values)
    })
}

pub fn parse_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();

    let kind = if token.value.contains('.') {
        token.value.parse::<f64>().ok().map(ExprKind::Float)
    } else {
        token.value.parse::<u64>().ok().map(ExprKind::Integer)
    };

    match kind {
        Some(kind) => Ok(Expr::new(kind, token.position)),
        None => Err(Error::new(ErrorImpl::NumberParseError { token: token.value }, token.position)),
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();

    let kind = match token.kind {
        TokenKind::String => ExprKind::String(token.value),
        TokenKind::Identifier => ExprKind::Symbol(token.value),
        TokenKind::True => ExprKind::Boolean(true),
        TokenKind::False => ExprKind::Boolean(false),
        _ => return Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value }, token.position)),
    };

    Ok(Expr::new(kind, token.position))
}

/// `(expr)` groups, `(a, b)` and `()` are tuples.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.get_position();
    let mut values = parse_grouped_values(parser)?;

    if values.len() == 1 && !values[0].1 {
        let (mut expr, _) = values.remove(0);
        if let ExprKind::Binary { grouped, .. } = &mut expr.kind {
            *grouped = true;
        }
        return Ok(expr);
    }

    Ok(Expr::new(
        ExprKind::Tuple(values.into_iter().map(|(expr, _)| expr).collect()),
        position,
    ))
}

/// Values inside parentheses, each flagged with whether a comma followed it.
fn parse_grouped_values(parser: &mut Parser) -> Result<Vec<(Expr, bool)>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    parser.with_restrictions(Restrictions::NONE, |parser| {
        let mut values = vec![];

        while !matches!(parser.current_token_kind(), TokenKind::CloseParen | TokenKind::EOF) {
            let expr = parse_expr(parser)?;

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                values.push((expr, true));
            } else {
                values.push((expr, false));
                break;
            }
        }

        parser.expect_closing(TokenKind::OpenParen)?;
        Ok(values)
    })
}
