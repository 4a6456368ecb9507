use std::collections::HashMap;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub ty: TypeId,
    pub mutable: bool,
}

#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    /// Index of the enclosing scope in the stack.
    parent: Option<usize>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// Lexical scopes currently open, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn push(&mut self) {
        let parent = self.scopes.len().checked_sub(1);
        self.scopes.push(Scope {
            symbols: HashMap::new(),
            parent,
        });
    }

    pub fn pop(&mut self) {
        if self.scopes.pop().is_none() {
            panic!("popped an empty scope stack");
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope. Shadowing an enclosing scope is
    /// fine; binding the same name twice in one scope is not.
    pub fn declare(&mut self, name: &str, symbol: Symbol, position: &Position) -> Result<(), Error> {
        let Some(scope) = self.scopes.last_mut() else {
            panic!("declared {:?} outside of any scope", name);
        };

        if scope.symbols.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position.clone(),
            ));
        }

        scope.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Finds `name` in the innermost scope that binds it.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        let mut current = self.scopes.len().checked_sub(1);

        while let Some(index) = current {
            let scope = &self.scopes[index];
            if let Some(symbol) = scope.get(name) {
                return Some(*symbol);
            }
            current = scope.parent;
        }

        None
    }
}
