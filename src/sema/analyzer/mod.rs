// src/sema/analyzer/mod.rs

mod calls;
mod declarations;
mod expr;
mod stmt;

use crate::errors::SemanticError;
use crate::frontend::ast::{Block, Decl, Program};
use crate::frontend::{Interner, NodeId, Span, Symbol};
use crate::sema::dispatch::build_dispatch_tables;
use crate::sema::expression_data::ExpressionData;
use crate::sema::model::{MethodBody, Owner, TypeModel};
use crate::sema::scope::Scope;
use crate::sema::types::{ClassId, MethodId, Type};

/// What the body currently being checked may refer to
#[derive(Debug, Clone)]
struct MethodContext {
    class: ClassId,
    is_static: bool,
    return_type: Type,
}

pub struct Analyzer<'a> {
    interner: &'a Interner,
    model: TypeModel,
    data: ExpressionData,
    scope: Scope,
    ctx: Option<MethodContext>,
    /// Node ids for synthesized expressions continue after the parser's
    next_node_id: u32,
}

impl<'a> Analyzer<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            model: TypeModel::new(),
            data: ExpressionData::new(),
            scope: Scope::new(),
            ctx: None,
            next_node_id: 0,
        }
    }

    /// Check a whole program. Registration and table building run first;
    /// a hierarchy cycle stops the unit before any call is resolved.
    #[tracing::instrument(name = "check", skip_all)]
    pub fn analyze(&mut self, program: &mut Program) -> Result<(), SemanticError> {
        self.next_node_id = program.next_node_id;

        {
            let _span = tracing::info_span!("registration").entered();
            self.register_declarations(program)?;
            tracing::debug!(
                classes = self.model.class_order().len(),
                "registration complete"
            );
        }

        build_dispatch_tables(&mut self.model)?;

        self.check_bodies(program)?;

        program.next_node_id = self.next_node_id;
        Ok(())
    }

    pub fn into_results(self) -> (TypeModel, ExpressionData) {
        (self.model, self.data)
    }

    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    fn fresh_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn resolve_name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn type_name(&self, ty: Type) -> String {
        self.model.type_name(ty)
    }

    fn check_bodies(&mut self, program: &mut Program) -> Result<(), SemanticError> {
        for decl in program.declarations.iter_mut() {
            let Decl::Class(class_decl) = decl else {
                continue;
            };
            let Some(class) = self.model.find_class(class_decl.name) else {
                unreachable!("INTERNAL: class registered during registration");
            };

            // static field initializers
            for field_decl in class_decl.fields.iter_mut() {
                let Some(init) = field_decl.init.as_mut() else {
                    continue;
                };
                let Some(field) = self.model.lookup_field(class, field_decl.name) else {
                    unreachable!("INTERNAL: field registered during registration");
                };
                let field_ty = self.model.field(field).ty;
                self.enter_body(class, true, Type::Void);
                let init_ty = self.check_expr(init)?;
                self.expect_assignable(init_ty, field_ty, init.span)?;
                self.exit_body();
            }

            let methods = self.model.class(class).methods.clone();
            for (method_decl, method_id) in class_decl.methods.iter_mut().zip(methods) {
                self.check_method_body(method_id, &mut method_decl.body)?;
            }

            let ctors: Vec<MethodId> = self
                .model
                .class(class)
                .constructors
                .iter()
                .copied()
                .filter(|&c| matches!(self.model.method(c).body, MethodBody::Constructor(_)))
                .collect();
            for (ctor_decl, ctor_id) in class_decl.constructors.iter_mut().zip(ctors) {
                self.check_method_body(ctor_id, &mut ctor_decl.body)?;
            }
        }
        Ok(())
    }

    fn check_method_body(&mut self, method_id: MethodId, body: &mut Block) -> Result<(), SemanticError> {
        let method = self.model.method(method_id);
        let Owner::Class(class) = method.owner else {
            unreachable!("INTERNAL: interface signatures have no body");
        };
        let is_static = method.is_static;
        let return_type = method.return_type;
        let params = method.params.clone();
        let span = method.span;
        let name = method.name.clone();

        self.enter_body(class, is_static, return_type);
        for param in &params {
            self.scope.define(param.name, param.ty);
        }

        let returns = self.check_block(body)?;
        self.exit_body();

        if return_type != Type::Void && !returns {
            return Err(SemanticError::MissingReturn {
                method: name,
                span: span.into(),
            });
        }
        Ok(())
    }

    fn enter_body(&mut self, class: ClassId, is_static: bool, return_type: Type) {
        self.scope = Scope::new();
        self.ctx = Some(MethodContext {
            class,
            is_static,
            return_type,
        });
    }

    fn exit_body(&mut self) {
        self.scope = Scope::new();
        self.ctx = None;
    }

    fn context(&self) -> &MethodContext {
        match &self.ctx {
            Some(ctx) => ctx,
            None => panic!("INTERNAL: expression checked outside a body"),
        }
    }

    fn expect_assignable(&self, from: Type, to: Type, span: Span) -> Result<(), SemanticError> {
        if self.model.assignable(from, to) {
            Ok(())
        } else {
            Err(SemanticError::TypeMismatch {
                expected: self.type_name(to),
                found: self.type_name(from),
                span: span.into(),
            })
        }
    }
}

/// Locate `static void main()`. With `main_class` the entry must be declared
/// on that class; otherwise exactly one class may declare one.
pub(crate) fn find_entry_point(
    model: &TypeModel,
    interner: &Interner,
    main_class: Option<&str>,
) -> Result<MethodId, SemanticError> {
    let main_sym = interner.lookup("main");
    let entry_in = |class: ClassId| {
        model.class(class).methods.iter().copied().find(|&m| {
            let method = model.method(m);
            Some(method.symbol) == main_sym
                && method.is_static
                && method.params.is_empty()
                && method.return_type == Type::Void
        })
    };

    if let Some(name) = main_class {
        let class = model
            .find_class_by_name(name)
            .ok_or_else(|| SemanticError::InvalidEntryPoint {
                class: name.to_string(),
            })?;
        return entry_in(class).ok_or_else(|| SemanticError::InvalidEntryPoint {
            class: name.to_string(),
        });
    }

    let entries: Vec<MethodId> = model.class_ids().filter_map(entry_in).collect();
    match entries.as_slice() {
        [] => Err(SemanticError::NoEntryPoint),
        [only] => Ok(*only),
        many => Err(SemanticError::AmbiguousEntryPoint {
            classes: many
                .iter()
                .map(|&m| model.owner_name(model.method(m).owner).to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
