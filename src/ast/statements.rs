use std::rc::Rc;

use crate::Position;

use super::{
    ast::{count_slot, ResolvedType, Typed},
    expressions::Expr,
};

/// `name : [type] : value` (constant) or `name : [type] = value` (mutable).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub declared_type: Option<Expr>,
    pub value: Expr,
    pub constant: bool,
    pub position: Position,
    pub resolved: ResolvedType,
}

/// `name : type` with no value, as used for arguments and fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub declared_type: Expr,
    pub position: Position,
    pub resolved: ResolvedType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expr>,
    pub position: Position,
    pub resolved: ResolvedType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Variable(Variable),
    Declaration(Declaration),
    Expression(Expr),
    Return(Return),
}

impl Stmt {
    pub fn position(&self) -> &Position {
        match self {
            Stmt::Variable(variable) => &variable.position,
            Stmt::Declaration(declaration) => &declaration.position,
            Stmt::Expression(expr) => &expr.position,
            Stmt::Return(ret) => &ret.position,
        }
    }

    /// The bound name, for bindings.
    pub fn name(&self) -> Option<&str> {
        match self {
            Stmt::Variable(variable) => Some(&variable.name),
            Stmt::Declaration(declaration) => Some(&declaration.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub position: Position,
    pub resolved: ResolvedType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcedureBody {
    Block(Block),
    Expression(Expr),
    /// No body at all: the literal denotes a procedure type.
    None,
}

/// `proc(a: Int) => Int { ... }`, `func(a: Int): a + 1`, or `proc(a: Int) => Int` as a type.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub arguments: Vec<Declaration>,
    /// `None` when the return type needs inference.
    pub return_type: Option<Expr>,
    pub body: ProcedureBody,
}

impl Procedure {
    pub fn is_type(&self) -> bool {
        matches!(self.body, ProcedureBody::None)
    }

    pub fn unresolved_nodes(&self) -> usize {
        let body = match &self.body {
            ProcedureBody::Block(block) => block.unresolved_nodes(),
            ProcedureBody::Expression(expr) => expr.unresolved_nodes(),
            ProcedureBody::None => 0,
        };

        self.arguments.iter().map(Typed::unresolved_nodes).sum::<usize>()
            + self.return_type.as_ref().map_or(0, Typed::unresolved_nodes)
            + body
    }

    pub fn reset(&mut self) {
        for argument in self.arguments.iter_mut() {
            argument.reset();
        }
        if let Some(return_type) = &mut self.return_type {
            return_type.reset();
        }
        match &mut self.body {
            ProcedureBody::Block(block) => block.reset(),
            ProcedureBody::Expression(expr) => expr.reset(),
            ProcedureBody::None => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramFile {
    pub file: Rc<String>,
    pub declarations: Vec<Stmt>,
    pub position: Position,
    pub resolved: ResolvedType,
}

/// Every file of a compilation; the synthetic root has no position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub files: Vec<ProgramFile>,
    pub resolved: ResolvedType,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}

impl Typed for Variable {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved)
            + self.declared_type.as_ref().map_or(0, Typed::unresolved_nodes)
            + self.value.unresolved_nodes()
    }

    fn reset(&mut self) {
        self.resolved.clear();
        if let Some(declared_type) = &mut self.declared_type {
            declared_type.reset();
        }
        self.value.reset();
    }
}

impl Typed for Declaration {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved) + self.declared_type.unresolved_nodes()
    }

    fn reset(&mut self) {
        self.resolved.clear();
        self.declared_type.reset();
    }
}

impl Typed for Return {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved) + self.value.as_ref().map_or(0, Typed::unresolved_nodes)
    }

    fn reset(&mut self) {
        self.resolved.clear();
        if let Some(value) = &mut self.value {
            value.reset();
        }
    }
}

impl Typed for Stmt {
    fn resolved(&self) -> &ResolvedType {
        match self {
            Stmt::Variable(variable) => variable.resolved(),
            Stmt::Declaration(declaration) => declaration.resolved(),
            Stmt::Expression(expr) => expr.resolved(),
            Stmt::Return(ret) => ret.resolved(),
        }
    }

    fn unresolved_nodes(&self) -> usize {
        match self {
            Stmt::Variable(variable) => variable.unresolved_nodes(),
            Stmt::Declaration(declaration) => declaration.unresolved_nodes(),
            Stmt::Expression(expr) => expr.unresolved_nodes(),
            Stmt::Return(ret) => ret.unresolved_nodes(),
        }
    }

    fn reset(&mut self) {
        match self {
            Stmt::Variable(variable) => variable.reset(),
            Stmt::Declaration(declaration) => declaration.reset(),
            Stmt::Expression(expr) => expr.reset(),
            Stmt::Return(ret) => ret.reset(),
        }
    }
}

impl Typed for Block {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved) + self.statements.iter().map(Typed::unresolved_nodes).sum::<usize>()
    }

    fn reset(&mut self) {
        self.resolved.clear();
        self.statements.iter_mut().for_each(Typed::reset);
    }
}

impl Typed for ProgramFile {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved) + self.declarations.iter().map(Typed::unresolved_nodes).sum::<usize>()
    }

    fn reset(&mut self) {
        self.resolved.clear();
        self.declarations.iter_mut().for_each(Typed::reset);
    }
}

impl Typed for Program {
    fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    fn unresolved_nodes(&self) -> usize {
        count_slot(&self.resolved) + self.files.iter().map(Typed::unresolved_nodes).sum::<usize>()
    }

    fn reset(&mut self) {
        self.resolved.clear();
        self.files.iter_mut().for_each(Typed::reset);
    }
}
