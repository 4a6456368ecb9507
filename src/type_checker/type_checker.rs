use std::{collections::HashSet, rc::Rc};

use crate::{
    ast::{
        ast::Typed,
        expressions::{BinaryOperator, Expr, ExprKind, Tier, UnaryOperator},
        statements::{Block, Declaration, Procedure, ProcedureBody, Program, Return, Stmt, Variable},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    scope::{ScopeStack, Symbol},
    types::{Field, PointerKind, TypeCache, TypeId, TypeShape},
};

/// Type names bound in the program scope before any file is checked.
const BUILTIN_TYPES: [(&str, TypeShape); 16] = [
    ("Int", TypeShape::Integer { signed: true, bits: Some(64) }),
    ("Int8", TypeShape::Integer { signed: true, bits: Some(8) }),
    ("Int16", TypeShape::Integer { signed: true, bits: Some(16) }),
    ("Int32", TypeShape::Integer { signed: true, bits: Some(32) }),
    ("Int64", TypeShape::Integer { signed: true, bits: Some(64) }),
    ("UInt", TypeShape::Integer { signed: false, bits: Some(64) }),
    ("UInt8", TypeShape::Integer { signed: false, bits: Some(8) }),
    ("UInt16", TypeShape::Integer { signed: false, bits: Some(16) }),
    ("UInt32", TypeShape::Integer { signed: false, bits: Some(32) }),
    ("UInt64", TypeShape::Integer { signed: false, bits: Some(64) }),
    ("Float", TypeShape::Float { bits: Some(64) }),
    ("Float32", TypeShape::Float { bits: Some(32) }),
    ("Float64", TypeShape::Float { bits: Some(64) }),
    ("Bool", TypeShape::Bool),
    ("String", TypeShape::String),
    ("Void", TypeShape::Void),
];

#[derive(Debug, Default)]
pub struct TypeChecker {
    /// Interprets every `TypeId` stored in the checked program.
    pub cache: TypeCache,
    scopes: ScopeStack,
    /// Return type of each enclosing procedure; `None` until the first
    /// `return` of a procedure without a declared return type.
    returns: Vec<Option<TypeId>>,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker::default()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn return_depth(&self) -> usize {
        self.returns.len()
    }

    pub fn describe(&self, ty: TypeId) -> String {
        self.cache.describe(ty)
    }

    /// Runs `check` inside a fresh scope that is popped whatever the outcome.
    fn with_scope<T>(&mut self, check: impl FnOnce(&mut TypeChecker) -> Result<T, Error>) -> Result<T, Error> {
        self.scopes.push();
        tracing::debug!(depth = self.scopes.depth(), "pushed scope");

        let result = check(self);

        self.scopes.pop();
        tracing::debug!(depth = self.scopes.depth(), "popped scope");
        result
    }

    /// Runs `check` with a return slot for one procedure body and hands back
    /// the slot's final value.
    fn with_return_slot<T>(
        &mut self,
        declared: Option<TypeId>,
        check: impl FnOnce(&mut TypeChecker) -> Result<T, Error>,
    ) -> Result<(T, Option<TypeId>), Error> {
        self.returns.push(declared);
        let result = check(self);

        let Some(returns) = self.returns.pop() else {
            panic!("return stack emptied inside a procedure body");
        };
        result.map(|value| (value, returns))
    }

    fn declare_builtins(&mut self) -> Result<(), Error> {
        let position = Position::start_of(Rc::new(String::from("<builtin>")));

        for (name, shape) in BUILTIN_TYPES {
            let ty = self.cache.intern(shape);
            let ty = self.cache.type_of(ty);
            self.scopes.declare(name, Symbol { ty, mutable: false }, &position)?;
        }

        Ok(())
    }

    fn mismatch(&self, expected: TypeId, received: TypeId, position: &Position) -> Error {
        Error::new(
            ErrorImpl::TypeMatchError {
                expected: self.cache.describe(expected),
                received: self.cache.describe(received),
            },
            position.clone(),
        )
    }

    fn invalid_operands(&self, operator: BinaryOperator, left: TypeId, right: TypeId, position: &Position) -> Error {
        Error::new(
            ErrorImpl::InvalidOperands {
                operator: operator.symbol().to_string(),
                left: self.cache.describe(left),
                right: self.cache.describe(right),
            },
            position.clone(),
        )
    }

    fn invalid_operand(&self, operator: &str, operand: TypeId, position: &Position) -> Error {
        Error::new(
            ErrorImpl::InvalidOperand {
                operator: operator.to_string(),
                operand: self.cache.describe(operand),
            },
            position.clone(),
        )
    }

    pub fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Variable(variable) => self.check_variable(variable),
            Stmt::Declaration(declaration) => {
                let ty = self.check_declaration(declaration)?;
                self.scopes
                    .declare(&declaration.name, Symbol { ty, mutable: true }, &declaration.position)
            }
            Stmt::Expression(expr) => self.check_expr(expr).map(|_| ()),
            Stmt::Return(ret) => self.check_return(ret),
        }
    }

    fn check_variable(&mut self, variable: &mut Variable) -> Result<(), Error> {
        let declared = match &mut variable.declared_type {
            Some(declared_type) => Some(self.expect_type(declared_type)?),
            None => None,
        };

        let value = self.check_expr(&mut variable.value)?;

        let ty = match declared {
            Some(declared) => {
                if !self.cache.is_implicitly_convertible(value, declared) {
                    return Err(self.mismatch(declared, value, &variable.value.position));
                }
                declared
            }
            None => self.cache.default_size(value),
        };

        self.scopes.declare(
            &variable.name,
            Symbol {
                ty,
                mutable: !variable.constant,
            },
            &variable.position,
        )?;
        variable.resolved.set(ty);

        tracing::trace!(name = %variable.name, ty = %self.cache.describe(ty), "bound variable");
        Ok(())
    }

    /// Checks the type of a declaration without binding its name.
    fn check_declaration(&mut self, declaration: &mut Declaration) -> Result<TypeId, Error> {
        let ty = self.expect_type(&mut declaration.declared_type)?;
        declaration.resolved.set(ty);
        Ok(ty)
    }

    fn check_return(&mut self, ret: &mut Return) -> Result<(), Error> {
        let Some(slot) = self.returns.last().copied() else {
            return Err(Error::new(ErrorImpl::ReturnOutsideProcedure, ret.position.clone()));
        };

        let (value, position) = match &mut ret.value {
            Some(value) => (self.check_expr(value)?, value.position.clone()),
            None => (self.cache.void(), ret.position.clone()),
        };

        match slot {
            Some(expected) => {
                if !self.cache.is_implicitly_convertible(value, expected) {
                    return Err(self.mismatch(expected, value, &position));
                }
            }
            None => {
                let inferred = self.cache.default_size(value);
                if let Some(last) = self.returns.last_mut() {
                    *last = Some(inferred);
                }
            }
        }

        ret.resolved.set(value);
        Ok(())
    }

    fn check_block(&mut self, block: &mut Block) -> Result<(), Error> {
        self.with_scope(|checker| {
            for stmt in block.statements.iter_mut() {
                checker.check_stmt(stmt)?;
            }
            Ok(())
        })?;

        block.resolved.set(self.cache.void());
        Ok(())
    }

    /// Checks an expression that must denote a type and returns that type.
    fn expect_type(&mut self, expr: &mut Expr) -> Result<TypeId, Error> {
        let ty = self.check_expr(expr)?;

        self.cache.type_of_inner(ty).ok_or_else(|| {
            Error::new(
                ErrorImpl::ExpectedType {
                    received: self.cache.describe(ty),
                },
                expr.position.clone(),
            )
        })
    }

    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<TypeId, Error> {
        let ty = self.check_expr_kind(&mut expr.kind, &expr.position)?;
        expr.resolved.set(ty);
        Ok(ty)
    }

    fn check_expr_kind(&mut self, kind: &mut ExprKind, position: &Position) -> Result<TypeId, Error> {
        match kind {
            ExprKind::Integer(_) => Ok(self.cache.integer(true, None)),
            ExprKind::Float(_) => Ok(self.cache.float(None)),
            ExprKind::String(_) => Ok(self.cache.string()),
            ExprKind::Boolean(_) => Ok(self.cache.boolean()),
            ExprKind::Symbol(name) => match self.scopes.lookup(name) {
                Some(symbol) => Ok(symbol.ty),
                None => Err(Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: name.clone(),
                    },
                    position.clone(),
                )),
            },
            ExprKind::Binary {
                operator, left, right, ..
            } => self.check_binary(*operator, left, right, position),
            ExprKind::Unary { operator, operand } => self.check_unary(*operator, operand, position),
            ExprKind::ArrayType { dimensions, element } => {
                let element = self.expect_type(element)?;
                let array = self.cache.array(element, *dimensions);
                Ok(self.cache.type_of(array))
            }
            ExprKind::Call { callee, arguments } => {
                let callee_type = self.check_expr(callee)?;
                self.check_call(callee_type, &callee.position, arguments, position)
            }
            ExprKind::Index { target, subscripts } => {
                let target_type = self.check_expr(target)?;
                self.check_index(target_type, &target.position, subscripts, position)
            }
            ExprKind::Initializer { target, values } => self.check_initializer(target, values, position),
            ExprKind::Tuple(values) => self.check_tuple(values),
            ExprKind::StructType(fields) => self.check_struct_type(fields),
            ExprKind::Procedure(procedure) => self.check_procedure(procedure),
        }
    }

    fn check_binary(
        &mut self,
        operator: BinaryOperator,
        left: &mut Expr,
        right: &mut Expr,
        position: &Position,
    ) -> Result<TypeId, Error> {
        match operator.tier() {
            Tier::Member => {
                let base = self.check_expr(left)?;
                self.check_member(base, right)
            }
            Tier::Cast => self.check_cast(left, right, position),
            Tier::Assignment => self.check_assignment(operator, left, right, position),
            tier => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;
                let common = self.cache.common_type(left_type, right_type);

                let legal = match (tier, common) {
                    (Tier::Multiplicative | Tier::Additive | Tier::Relational, Some(common)) => {
                        self.cache.is_numeric(common)
                    }
                    (Tier::Equality, Some(_)) => true,
                    (Tier::Logical, Some(common)) => self.cache.is_bool(common),
                    _ => false,
                };

                match common {
                    Some(common) if legal => match tier {
                        Tier::Multiplicative | Tier::Additive | Tier::Logical => Ok(common),
                        _ => Ok(self.cache.boolean()),
                    },
                    _ => Err(self.invalid_operands(operator, left_type, right_type, position)),
                }
            }
        }
    }

    /// Resolves the right side of `.` against the fields of `base`.
    ///
    /// Member access nests to the right, so `a.b.c` arrives here as
    /// `b.c` with `base` the type of `a` and is walked field by field.
    fn check_member(&mut self, base: TypeId, member: &mut Expr) -> Result<TypeId, Error> {
        let ty = match &mut member.kind {
            ExprKind::Symbol(name) => match self.cache.field(base, name) {
                Some(ty) => ty,
                None => {
                    return Err(Error::new(
                        ErrorImpl::UnknownField {
                            type_: self.cache.describe(base),
                            field: name.clone(),
                        },
                        member.position.clone(),
                    ))
                }
            },
            ExprKind::Binary {
                operator: BinaryOperator::Member,
                left,
                right,
                grouped: false,
            } => {
                let inner = self.check_member(base, left)?;
                self.check_member(inner, right)?
            }
            ExprKind::Call { callee, arguments } => {
                let callee_type = self.check_member(base, callee)?;
                self.check_call(callee_type, &callee.position, arguments, &member.position)?
            }
            ExprKind::Index { target, subscripts } => {
                let target_type = self.check_member(base, target)?;
                self.check_index(target_type, &target.position, subscripts, &member.position)?
            }
            _ => return Err(self.invalid_operand(".", base, &member.position)),
        };

        member.resolved.set(ty);
        Ok(ty)
    }

    fn check_cast(&mut self, left: &mut Expr, right: &mut Expr, position: &Position) -> Result<TypeId, Error> {
        let from = self.check_expr(left)?;
        let to = self.expect_type(right)?;

        let numeric = self.cache.is_numeric(from) && self.cache.is_numeric(to);
        if !numeric && self.cache.common_type(from, to).is_none() {
            return Err(Error::new(
                ErrorImpl::InvalidCast {
                    from: self.cache.describe(from),
                    to: self.cache.describe(to),
                },
                position.clone(),
            ));
        }

        Ok(to)
    }

    fn check_assignment(
        &mut self,
        operator: BinaryOperator,
        left: &mut Expr,
        right: &mut Expr,
        position: &Position,
    ) -> Result<TypeId, Error> {
        let assignable = matches!(
            left.kind,
            ExprKind::Symbol(_)
                | ExprKind::Index { .. }
                | ExprKind::Binary {
                    operator: BinaryOperator::Member,
                    ..
                }
        );
        if !assignable {
            return Err(Error::new(ErrorImpl::NotAssignable, left.position.clone()));
        }

        let target = self.check_expr(left)?;

        if let Some(root) = assignment_root(left) {
            if self.scopes.lookup(root).is_some_and(|symbol| !symbol.mutable) {
                return Err(Error::new(
                    ErrorImpl::AssignToConstant {
                        variable: root.to_string(),
                    },
                    left.position.clone(),
                ));
            }
        }

        let value = self.check_expr(right)?;

        if operator.compound_operator().is_some() {
            let numeric = self
                .cache
                .common_type(target, value)
                .is_some_and(|common| self.cache.is_numeric(common));
            if !numeric {
                return Err(self.invalid_operands(operator, target, value, position));
            }
        }

        if !self.cache.is_implicitly_convertible(value, target) {
            return Err(self.mismatch(target, value, &right.position));
        }

        Ok(target)
    }

    fn check_unary(&mut self, operator: UnaryOperator, operand: &mut Expr, position: &Position) -> Result<TypeId, Error> {
        let ty = self.check_expr(operand)?;

        match operator {
            UnaryOperator::Positive | UnaryOperator::Negative if self.cache.is_numeric(ty) => Ok(ty),
            UnaryOperator::Not if self.cache.is_bool(ty) => Ok(ty),
            UnaryOperator::Reference | UnaryOperator::UniqueReference => {
                let kind = if operator == UnaryOperator::Reference {
                    PointerKind::Weak
                } else {
                    PointerKind::Unique
                };

                // `&T` on a type denotes the pointer type.
                match self.cache.type_of_inner(ty) {
                    Some(pointee) => {
                        let pointer = self.cache.pointer(kind, pointee);
                        Ok(self.cache.type_of(pointer))
                    }
                    None => Ok(self.cache.pointer(kind, ty)),
                }
            }
            UnaryOperator::Dereference => match self.cache.shape(ty) {
                TypeShape::Pointer { pointee, .. } => Ok(*pointee),
                _ => Err(self.invalid_operand(operator.symbol(), ty, position)),
            },
            _ => Err(self.invalid_operand(operator.symbol(), ty, position)),
        }
    }

    fn check_call(
        &mut self,
        callee: TypeId,
        callee_position: &Position,
        arguments: &mut [Expr],
        position: &Position,
    ) -> Result<TypeId, Error> {
        let (parameters, returns) = match self.cache.shape(callee) {
            TypeShape::Procedure { arguments, returns } => (arguments.clone(), *returns),
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotCallable {
                        type_: self.cache.describe(callee),
                    },
                    callee_position.clone(),
                ))
            }
        };

        let mut received = Vec::with_capacity(arguments.len());
        for argument in arguments.iter_mut() {
            received.push(self.check_expr(argument)?);
        }

        if arguments.len() > parameters.len() {
            return Err(Error::new(
                ErrorImpl::UnexpectedArguments {
                    expected: parameters.len(),
                    received: arguments.len(),
                },
                arguments[parameters.len()].position.clone(),
            ));
        }

        if arguments.len() < parameters.len() {
            return Err(Error::new(
                ErrorImpl::MissingArguments {
                    expected: parameters.len(),
                    received: arguments.len(),
                },
                arguments.last().map_or(position, |argument| &argument.position).clone(),
            ));
        }

        for ((argument, &ty), &parameter) in arguments.iter().zip(&received).zip(&parameters) {
            if !self.cache.is_implicitly_convertible(ty, parameter) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        expected: self.cache.describe(parameter),
                        received: self.cache.describe(ty),
                    },
                    argument.position.clone(),
                ));
            }
        }

        Ok(returns)
    }

    fn check_index(
        &mut self,
        target: TypeId,
        target_position: &Position,
        subscripts: &mut [Expr],
        position: &Position,
    ) -> Result<TypeId, Error> {
        let (element, dimensions) = match self.cache.shape(target).clone() {
            TypeShape::Array { element, dimensions } => (element, dimensions as usize),
            TypeShape::String => (self.cache.integer(false, Some(8)), 1),
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotIndexable {
                        type_: self.cache.describe(target),
                    },
                    target_position.clone(),
                ))
            }
        };

        let mut received = Vec::with_capacity(subscripts.len());
        for subscript in subscripts.iter_mut() {
            received.push(self.check_expr(subscript)?);
        }

        if subscripts.len() != dimensions {
            return Err(Error::new(
                ErrorImpl::SubscriptCountMismatch {
                    expected: dimensions,
                    received: subscripts.len(),
                },
                position.clone(),
            ));
        }

        for (subscript, &ty) in subscripts.iter().zip(&received) {
            if !self.cache.is_integer(ty) {
                return Err(Error::new(
                    ErrorImpl::InvalidSubscript {
                        received: self.cache.describe(ty),
                    },
                    subscript.position.clone(),
                ));
            }
        }

        Ok(element)
    }

    fn check_initializer(&mut self, target: &mut Expr, values: &mut [Expr], position: &Position) -> Result<TypeId, Error> {
        let ty = self.expect_type(target)?;

        let mut received = Vec::with_capacity(values.len());
        for value in values.iter_mut() {
            received.push(self.check_expr(value)?);
        }

        match self.cache.shape(ty).clone() {
            TypeShape::Struct(fields) => {
                if values.len() > fields.len() {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedArguments {
                            expected: fields.len(),
                            received: values.len(),
                        },
                        values[fields.len()].position.clone(),
                    ));
                }

                if values.len() < fields.len() {
                    return Err(Error::new(
                        ErrorImpl::MissingArguments {
                            expected: fields.len(),
                            received: values.len(),
                        },
                        position.clone(),
                    ));
                }

                for ((value, &value_type), field) in values.iter().zip(&received).zip(&fields) {
                    if !self.cache.is_implicitly_convertible(value_type, field.ty) {
                        return Err(Error::new(
                            ErrorImpl::FieldTypeMatchError {
                                expected: self.cache.describe(field.ty),
                                received: self.cache.describe(value_type),
                            },
                            value.position.clone(),
                        ));
                    }
                }
            }
            TypeShape::Array { element, .. } => {
                for (value, &value_type) in values.iter().zip(&received) {
                    if !self.cache.is_implicitly_convertible(value_type, element) {
                        return Err(self.mismatch(element, value_type, &value.position));
                    }
                }
            }
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotInitializable {
                        type_: self.cache.describe(ty),
                    },
                    target.position.clone(),
                ))
            }
        }

        Ok(ty)
    }

    /// A tuple of types is itself a type; anything else is a tuple value.
    fn check_tuple(&mut self, values: &mut [Expr]) -> Result<TypeId, Error> {
        let mut types = Vec::with_capacity(values.len());
        for value in values.iter_mut() {
            types.push(self.check_expr(value)?);
        }

        let inner: Option<Vec<TypeId>> = types.iter().map(|ty| self.cache.type_of_inner(*ty)).collect();

        match inner {
            Some(inner) if !inner.is_empty() => {
                let tuple = self.cache.tuple(inner);
                Ok(self.cache.type_of(tuple))
            }
            _ => Ok(self.cache.tuple(types)),
        }
    }

    fn check_struct_type(&mut self, fields: &mut [Declaration]) -> Result<TypeId, Error> {
        let mut names = HashSet::new();
        let mut checked = Vec::with_capacity(fields.len());

        for field in fields.iter_mut() {
            if !names.insert(field.name.clone()) {
                return Err(Error::new(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: field.name.clone(),
                    },
                    field.position.clone(),
                ));
            }

            let ty = self.check_declaration(field)?;
            checked.push(Field::new(field.name.clone(), ty));
        }

        let structure = self.cache.structure(checked);
        Ok(self.cache.type_of(structure))
    }

    /// Procedure literals are values; bodiless ones denote procedure types.
    fn check_procedure(&mut self, procedure: &mut Procedure) -> Result<TypeId, Error> {
        self.with_scope(|checker| {
            let mut arguments = Vec::with_capacity(procedure.arguments.len());
            for argument in procedure.arguments.iter_mut() {
                let ty = checker.check_declaration(argument)?;
                checker
                    .scopes
                    .declare(&argument.name, Symbol { ty, mutable: true }, &argument.position)?;
                arguments.push(ty);
            }

            let declared = match &mut procedure.return_type {
                Some(return_type) => Some(checker.expect_type(return_type)?),
                None => None,
            };

            let returns = match &mut procedure.body {
                ProcedureBody::None => {
                    let returns = match declared {
                        Some(declared) => declared,
                        None => checker.cache.void(),
                    };
                    let signature = checker.cache.procedure(arguments, returns);
                    return Ok(checker.cache.type_of(signature));
                }
                ProcedureBody::Block(block) => {
                    let ((), returns) = checker.with_return_slot(declared, |checker| checker.check_block(block))?;
                    match returns {
                        Some(returns) => returns,
                        None => checker.cache.void(),
                    }
                }
                ProcedureBody::Expression(body) => {
                    let value = checker.check_expr(body)?;
                    match declared {
                        Some(declared) => {
                            if !checker.cache.is_implicitly_convertible(value, declared) {
                                return Err(checker.mismatch(declared, value, &body.position));
                            }
                            declared
                        }
                        None => checker.cache.default_size(value),
                    }
                }
            };

            Ok(checker.cache.procedure(arguments, returns))
        })
    }
}

/// The variable an assignment target ultimately writes through.
fn assignment_root(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Symbol(name) => Some(name),
        ExprKind::Binary {
            operator: BinaryOperator::Member,
            left,
            ..
        } => assignment_root(left),
        ExprKind::Index { target, .. } => assignment_root(target),
        _ => None,
    }
}

/// Checks every file of `program`, filling each node's resolved type.
///
/// A failing top-level declaration is reported and checking moves on to the
/// next one, so one pass can surface several diagnostics. Any error fails the
/// whole check. Types left by an earlier pass over `program` are cleared
/// first.
#[tracing::instrument(skip_all, fields(files = program.files.len()))]
pub fn type_check(program: &mut Program) -> (TypeChecker, Vec<Error>) {
    program.reset();

    let mut checker = TypeChecker::new();
    let mut errors = vec![];

    let result = checker.with_scope(|checker| {
        checker.declare_builtins()?;

        for file in program.files.iter_mut() {
            for declaration in file.declarations.iter_mut() {
                tracing::debug!(name = declaration.name().unwrap_or_default(), "checking declaration");

                if let Err(error) = checker.check_stmt(declaration) {
                    tracing::debug!(%error, "declaration failed");
                    errors.push(error);
                }
            }

            file.resolved.set(checker.cache.void());
        }

        Ok(())
    });

    if let Err(error) = result {
        errors.push(error);
    }

    program.resolved.set(checker.cache.void());
    tracing::debug!(errors = errors.len(), types = checker.cache.len(), "type check finished");

    (checker, errors)
}
