// src/sema/scope.rs

use crate::frontend::Symbol;
use crate::sema::Type;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct Scope {
    variables: FxHashMap<Symbol, Type>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Scope) -> Self {
        Self {
            variables: FxHashMap::default(),
            parent: Some(Box::new(parent)),
        }
    }

    pub fn define(&mut self, name: Symbol, ty: Type) {
        self.variables.insert(name, ty);
    }

    pub fn get(&self, name: Symbol) -> Option<Type> {
        self.variables
            .get(&name)
            .copied()
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(name)))
    }

    /// Declared anywhere in this scope chain. Locals may not shadow other
    /// locals or parameters of the same method.
    pub fn is_declared(&self, name: Symbol) -> bool {
        self.get(name).is_some()
    }

    pub fn into_parent(self) -> Option<Scope> {
        self.parent.map(|b| *b)
    }
}
