// src/interp/mod.rs
//
// Tree-walking evaluator over a checked program. Reads the bindings and
// dispatch tables produced by analysis; never re-resolves a call.

mod calls;
mod eval;
pub mod value;

#[cfg(test)]
mod tests;

use rustc_hash::FxHashMap;

use crate::errors::RuntimeError;
use crate::frontend::Symbol;
use crate::frontend::ast::Expr;
use crate::sema::{Analysis, FieldLayout, MethodId};

pub use value::{Object, ObjectRef, Value};

/// Evaluator configuration
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Deepest method nesting before a stack overflow is reported
    pub max_call_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 2_000,
        }
    }
}

/// Locals of one method activation
#[derive(Debug)]
pub(crate) struct Frame {
    this: Option<ObjectRef>,
    scopes: Vec<FxHashMap<Symbol, Value>>,
}

impl Frame {
    fn new(this: Option<ObjectRef>) -> Self {
        Self {
            this,
            scopes: vec![FxHashMap::default()],
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn define(&mut self, name: Symbol, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    fn get(&self, name: Symbol) -> Value {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(&name) {
                return value.clone();
            }
        }
        panic!("INTERNAL: local {:?} read before definition", name);
    }

    fn assign(&mut self, name: Symbol, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&name) {
                *slot = value;
                return;
            }
        }
        panic!("INTERNAL: assignment to undeclared local {:?}", name);
    }

    fn this(&self) -> &ObjectRef {
        match &self.this {
            Some(this) => this,
            None => panic!("INTERNAL: 'this' used in a static activation"),
        }
    }
}

pub struct Interpreter<'a> {
    analysis: &'a Analysis,
    statics: Vec<Value>,
    depth: usize,
    options: EvalOptions,
}

impl<'a> Interpreter<'a> {
    pub fn new(analysis: &'a Analysis, options: EvalOptions) -> Self {
        let model = &analysis.model;
        let mut statics = vec![Value::Null; model.static_count() as usize];
        for field in model.static_fields() {
            let info = model.field(field);
            if let FieldLayout::Static(index) = info.layout {
                statics[index as usize] = Value::default_for(info.ty);
            }
        }
        Self {
            analysis,
            statics,
            depth: 0,
            options,
        }
    }

    /// Run static initializers, then the entry method.
    #[tracing::instrument(name = "execute", skip_all)]
    pub fn run(&mut self, entry: MethodId) -> Result<(), RuntimeError> {
        self.run_static_init()?;
        tracing::debug!(
            entry = %self.analysis.model.entry_symbol(entry),
            "entering program"
        );
        self.invoke(entry, None, Vec::new())?;
        Ok(())
    }

    /// Static field initializers in class order, declaration order within
    /// a class.
    fn run_static_init(&mut self) -> Result<(), RuntimeError> {
        let analysis = self.analysis;
        for field in analysis.model.static_fields() {
            let (Some(expr), FieldLayout::Static(index)) =
                (analysis.static_initializer(field), analysis.model.field(field).layout)
            else {
                continue;
            };
            let mut frame = Frame::new(None);
            let value = self.eval_expr(expr, &mut frame)?;
            self.statics[index as usize] = value;
        }
        Ok(())
    }
}

/// Evaluate `entry` (after static initialization) in a fresh interpreter.
pub fn run_program(analysis: &Analysis, entry: MethodId, options: EvalOptions) -> Result<(), RuntimeError> {
    let mut interpreter = Interpreter::new(analysis, options);
    interpreter.run(entry)
}

/// Source line reported for a runtime error raised at `expr`
fn line_of(expr: &Expr) -> u32 {
    expr.span.line
}
