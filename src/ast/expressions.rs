use crate::Position;

use super::{
    ast::{count_slot, ResolvedType, Typed},
    statements::{Declaration, Procedure},
};

/// Operator tiers, tightest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Member,
    Cast,
    Multiplicative,
    Additive,
    Relational,
    Equality,
    Logical,
    Assignment,
}

/// Binary operators. The high nibble of the discriminant is the priority
/// (lower binds tighter), the low nibble tells operators of a tier apart.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Member = 0x00,

    Cast = 0x10,

    Multiply = 0x20,
    Divide = 0x21,
    Modulo = 0x22,

    Add = 0x30,
    Subtract = 0x31,

    Less = 0x40,
    LessEquals = 0x41,
    Greater = 0x42,
    GreaterEquals = 0x43,

    Equals = 0x50,
    NotEquals = 0x51,

    And = 0x60,
    Or = 0x61,

    Assign = 0x70,
    AddAssign = 0x71,
    SubtractAssign = 0x72,
    MultiplyAssign = 0x73,
    DivideAssign = 0x74,
}

impl BinaryOperator {
    pub fn priority(&self) -> u8 {
        (*self as u8) >> 4
    }

    pub fn tier(&self) -> Tier {
        match self.priority() {
            0 => Tier::Member,
            1 => Tier::Cast,
            2 => Tier::Multiplicative,
            3 => Tier::Additive,
            4 => Tier::Relational,
            5 => Tier::Equality,
            6 => Tier::Logical,
            _ => Tier::Assignment,
        }
    }

    /// Member access and the assignment family nest to the right.
    pub fn is_right_associative(&self) -> bool {
        matches!(self.tier(), Tier::Member | Tier::Assignment)
    }

    /// The arithmetic operator a compound assignment applies, if any.
    pub fn compound_operator(&self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::AddAssign => Some(BinaryOperator::Add),
            BinaryOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            BinaryOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            BinaryOperator::DivideAssign => Some(BinaryOperator::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Member => ".",
            BinaryOperator::Cast => "as",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Assign => "=",
            BinaryOperator::AddAssign => "+=",
            BinaryOperator::SubtractAssign => "-=",
            BinaryOperator::MultiplyAssign => "*=",
            BinaryOperator::DivideAssign => "/=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Positive,
    Negative,
    Not,
    /// `&x`, a weak pointer
    Reference,
    /// `~x`, a unique pointer
    UniqueReference,
    /// `*x`
    Dereference,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Positive => "+",
            UnaryOperator::Negative => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::Reference => "&",
            UnaryOperator::UniqueReference => "~",
            UnaryOperator::Dereference => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(u64),
    Float(f64),
    String(String),
    Boolean(bool),
    Symbol(String),
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        /// Written inside parentheses; never rebalanced.
        grouped: bool,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    /// `[]T`, `[,]T`: array type marker with its dimension count
    ArrayType {
        dimensions: u8,
        element: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        subscripts: Vec<Expr>,
    },
    /// `T{a, b}`
    Initializer {
        target: Box<Expr>,
        values: Vec<Expr>,
    },
    Tuple(Vec<Expr>),
    StructType(Vec<Declaration>),
    Procedure(Box<Procedure>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
    pub resolved: ResolvedType,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Expr {
            kind,
            position,
            resolved: ResolvedType::default(),
        }
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr, position: Position) -> Self {
        Expr::new(
            ExprKind::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                grouped: false,
            },
            position,
        )
    }

    /// The operator of an ungrouped binary node.
    pub fn open_binary_operator(&self) -> Option<BinaryOperator> {
        match &self.kind {
            ExprKind::Binary { operator, grouped: false, .. } => Some(*operator),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.kind, ExprKind::Binary { .. })
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl Typed for Expr {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        let children = match &self.kind {
            ExprKind::Integer(_)
            | ExprKind::Float(_)
            | ExprKind::String(_)
            | ExprKind::Boolean(_)
            | ExprKind::Symbol(_) => 0,
            ExprKind::Binary { left, right, .. } => left.unresolved_nodes() + right.unresolved_nodes(),
            ExprKind::Unary { operand, .. } => operand.unresolved_nodes(),
            ExprKind::ArrayType { element, .. } => element.unresolved_nodes(),
            ExprKind::Call { callee: target, arguments: values }
            | ExprKind::Index { target, subscripts: values }
            | ExprKind::Initializer { target, values } => {
                target.unresolved_nodes() + values.iter().map(Typed::unresolved_nodes).sum::<usize>()
            }
            ExprKind::Tuple(values) => values.iter().map(Typed::unresolved_nodes).sum(),
            ExprKind::StructType(fields) => fields.iter().map(Typed::unresolved_nodes).sum(),
            ExprKind::Procedure(procedure) => procedure.unresolved_nodes(),
        };

        count_slot(&self.resolved) + children
    }

    fn reset(&mut self) {
        self.resolved.clear();

        match &mut self.kind {
            ExprKind::Integer(_)
            | ExprKind::Float(_)
            | ExprKind::String(_)
            | ExprKind::Boolean(_)
            | ExprKind::Symbol(_) => {}
            ExprKind::Binary { left, right, .. } => {
                left.reset();
                right.reset();
            }
            ExprKind::Unary { operand, .. } => operand.reset(),
            ExprKind::ArrayType { element, .. } => element.reset(),
            ExprKind::Call { callee: target, arguments: values }
            | ExprKind::Index { target, subscripts: values }
            | ExprKind::Initializer { target, values } => {
                target.reset();
                values.iter_mut().for_each(Typed::reset);
            }
            ExprKind::Tuple(values) => values.iter_mut().for_each(Typed::reset),
            ExprKind::StructType(fields) => fields.iter_mut().for_each(Typed::reset),
            ExprKind::Procedure(procedure) => procedure.reset(),
        }
    }
}
