// src/sema/analyzer/declarations.rs
//
// Registration: creates every class, interface, field, method and
// constructor before any body is checked.

use super::Analyzer;
use crate::errors::SemanticError;
use crate::frontend::ast::{ClassDecl, Decl, InterfaceDecl, Param, Program, TypeExpr, TypeExprKind};
use crate::sema::model::{
    ClassType, Field, FieldLayout, InterfaceType, MemberRef, Method, MethodBody, Owner, ParamInfo,
    TypeModel,
};
use crate::sema::types::{ClassId, MethodId, Type};

impl Analyzer<'_> {
    pub(super) fn register_declarations(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.register_type_names(program)?;
        self.resolve_headers(program)?;
        self.check_hierarchy_cycles()?;
        self.compute_class_order();

        for decl in &program.declarations {
            if let Decl::Interface(interface_decl) = decl {
                self.register_interface_methods(interface_decl)?;
            }
        }

        let order = self.model.class_order().to_vec();
        for class in order {
            let decl_index = self.model.class(class).decl_index;
            let Decl::Class(class_decl) = &program.declarations[decl_index] else {
                unreachable!("INTERNAL: class decl index points at an interface");
            };
            self.register_class_members(class, decl_index, class_decl)?;
        }

        self.check_super_constructors()
    }

    /// Pass 1: every class and interface name, so headers and members can
    /// refer to types declared later in the file.
    fn register_type_names(&mut self, program: &Program) -> Result<(), SemanticError> {
        for (decl_index, decl) in program.declarations.iter().enumerate() {
            let (symbol, span) = match decl {
                Decl::Class(c) => (c.name, c.span),
                Decl::Interface(i) => (i.name, i.span),
            };
            if let Some(existing) = self.model.lookup_type(symbol) {
                let first = match existing {
                    Type::Class(c) => self.model.class(c).span,
                    Type::Interface(i) => self.model.interface(i).span,
                    _ => span,
                };
                return Err(SemanticError::DuplicateType {
                    name: self.resolve_name(symbol).to_string(),
                    span: span.into(),
                    first: first.into(),
                });
            }
            let name = self.resolve_name(symbol).to_string();
            match decl {
                Decl::Class(_) => {
                    self.model.add_class(ClassType {
                        symbol,
                        name,
                        superclass: None,
                        interfaces: Vec::new(),
                        fields: Vec::new(),
                        methods: Vec::new(),
                        constructors: Vec::new(),
                        instance_field_count: 0,
                        decl_index,
                        span,
                        dispatch: None,
                    });
                }
                Decl::Interface(_) => {
                    self.model.add_interface(InterfaceType {
                        symbol,
                        name,
                        methods: Vec::new(),
                        decl_index,
                        span,
                    });
                }
            }
        }
        Ok(())
    }

    /// Pass 2: `extends` and `implements` clauses
    fn resolve_headers(&mut self, program: &Program) -> Result<(), SemanticError> {
        for decl in &program.declarations {
            let Decl::Class(class_decl) = decl else {
                continue;
            };
            let Some(class) = self.model.find_class(class_decl.name) else {
                unreachable!("INTERNAL: class registered in pass 1");
            };

            if let Some(superclass) = class_decl.superclass {
                let name = self.resolve_name(superclass.name).to_string();
                match self.model.lookup_type(superclass.name) {
                    Some(Type::Class(s)) => self.model.class_mut(class).superclass = Some(s),
                    Some(_) => {
                        return Err(SemanticError::SuperclassNotClass {
                            name,
                            span: superclass.span.into(),
                        });
                    }
                    None => {
                        return Err(SemanticError::UnknownType {
                            name,
                            span: superclass.span.into(),
                        });
                    }
                }
            }

            for implemented in &class_decl.interfaces {
                let name = self.resolve_name(implemented.name).to_string();
                match self.model.lookup_type(implemented.name) {
                    Some(Type::Interface(i)) => {
                        let interfaces = &mut self.model.class_mut(class).interfaces;
                        if !interfaces.contains(&i) {
                            interfaces.push(i);
                        }
                    }
                    Some(_) => {
                        return Err(SemanticError::NotAnInterface {
                            name,
                            span: implemented.span.into(),
                        });
                    }
                    None => {
                        return Err(SemanticError::UnknownType {
                            name,
                            span: implemented.span.into(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// A class is on a cycle when following `superclass` from it leads back
    /// to it. Runs before anything walks the ancestor chain.
    fn check_hierarchy_cycles(&self) -> Result<(), SemanticError> {
        let limit = self.model.class_ids().count();
        for class in self.model.class_ids() {
            let mut current = self.model.class(class).superclass;
            for _ in 0..limit {
                let Some(c) = current else {
                    break;
                };
                if c == class {
                    let info = self.model.class(class);
                    return Err(SemanticError::HierarchyCycle {
                        class: info.name.clone(),
                        span: info.span.into(),
                    });
                }
                current = self.model.class(c).superclass;
            }
        }
        Ok(())
    }

    /// Superclass-first order; classes otherwise keep declaration order.
    fn compute_class_order(&mut self) {
        fn visit(model: &TypeModel, class: ClassId, seen: &mut [bool], order: &mut Vec<ClassId>) {
            if seen[class.index()] {
                return;
            }
            seen[class.index()] = true;
            if let Some(superclass) = model.class(class).superclass {
                visit(model, superclass, seen, order);
            }
            order.push(class);
        }

        let count = self.model.class_ids().count();
        let mut seen = vec![false; count];
        let mut order = Vec::with_capacity(count);
        for class in self.model.class_ids() {
            visit(&self.model, class, &mut seen, &mut order);
        }
        self.model.set_class_order(order);
    }

    fn register_interface_methods(
        &mut self,
        interface_decl: &InterfaceDecl,
    ) -> Result<(), SemanticError> {
        let Some(Type::Interface(interface)) = self.model.lookup_type(interface_decl.name) else {
            unreachable!("INTERNAL: interface registered in pass 1");
        };
        for (index, sig) in interface_decl.methods.iter().enumerate() {
            let params = self.resolve_params(&sig.params)?;
            let return_type = self.resolve_type(&sig.return_type)?;
            let method = Method {
                owner: Owner::Interface(interface),
                symbol: sig.name,
                name: self.resolve_name(sig.name).to_string(),
                is_static: false,
                is_constructor: false,
                params,
                return_type,
                body: MethodBody::Abstract,
                slot: Some(index as u32),
                span: sig.span,
            };
            let existing = self.model.interface(interface).methods.clone();
            self.check_duplicate_method(&existing, &method)?;
            let id = self.model.add_method(method);
            self.model.interface_mut(interface).methods.push(id);
        }
        Ok(())
    }

    fn register_class_members(
        &mut self,
        class: ClassId,
        decl_index: usize,
        class_decl: &ClassDecl,
    ) -> Result<(), SemanticError> {
        let mut instance_slot = match self.model.class(class).superclass {
            Some(s) => self.model.class(s).instance_field_count,
            None => 0,
        };

        for (index, field_decl) in class_decl.fields.iter().enumerate() {
            let name = self.resolve_name(field_decl.name).to_string();
            let duplicate = self
                .model
                .class(class)
                .fields
                .iter()
                .any(|&f| self.model.field(f).symbol == field_decl.name);
            if duplicate {
                return Err(SemanticError::DuplicateField {
                    class: self.model.class(class).name.clone(),
                    name,
                    span: field_decl.span.into(),
                });
            }
            let ty = self.resolve_type(&field_decl.ty)?;

            let (layout, init) = if field_decl.is_static {
                let layout = FieldLayout::Static(self.model.next_static_index());
                let init = field_decl.init.as_ref().map(|_| MemberRef {
                    decl: decl_index,
                    index,
                });
                (layout, init)
            } else {
                if field_decl.init.is_some() {
                    return Err(SemanticError::InstanceFieldInitializer {
                        field: name,
                        span: field_decl.span.into(),
                    });
                }
                let layout = FieldLayout::Instance(instance_slot);
                instance_slot += 1;
                (layout, None)
            };

            let id = self.model.add_field(Field {
                owner: class,
                symbol: field_decl.name,
                name,
                ty,
                layout,
                init,
                span: field_decl.span,
            });
            self.model.class_mut(class).fields.push(id);
        }
        self.model.class_mut(class).instance_field_count = instance_slot;

        for (index, method_decl) in class_decl.methods.iter().enumerate() {
            let params = self.resolve_params(&method_decl.params)?;
            let return_type = self.resolve_type(&method_decl.return_type)?;
            let method = Method {
                owner: Owner::Class(class),
                symbol: method_decl.name,
                name: self.resolve_name(method_decl.name).to_string(),
                is_static: method_decl.is_static,
                is_constructor: false,
                params,
                return_type,
                body: MethodBody::Method(MemberRef {
                    decl: decl_index,
                    index,
                }),
                slot: None,
                span: method_decl.span,
            };
            let existing = self.model.class(class).methods.clone();
            self.check_duplicate_method(&existing, &method)?;
            let id = self.model.add_method(method);
            self.model.class_mut(class).methods.push(id);
        }

        let class_symbol = self.model.class(class).symbol;
        let class_name = self.model.class(class).name.clone();
        for (index, ctor_decl) in class_decl.constructors.iter().enumerate() {
            let params = self.resolve_params(&ctor_decl.params)?;
            let method = Method {
                owner: Owner::Class(class),
                symbol: class_symbol,
                name: class_name.clone(),
                is_static: false,
                is_constructor: true,
                params,
                return_type: Type::Void,
                body: MethodBody::Constructor(MemberRef {
                    decl: decl_index,
                    index,
                }),
                slot: None,
                span: ctor_decl.span,
            };
            let existing = self.model.class(class).constructors.clone();
            self.check_duplicate_method(&existing, &method)?;
            let id = self.model.add_method(method);
            self.model.class_mut(class).constructors.push(id);
        }

        if class_decl.constructors.is_empty() {
            let id = self.model.add_method(Method {
                owner: Owner::Class(class),
                symbol: class_symbol,
                name: class_name,
                is_static: false,
                is_constructor: true,
                params: Vec::new(),
                return_type: Type::Void,
                body: MethodBody::Implicit,
                slot: None,
                span: class_decl.span,
            });
            self.model.class_mut(class).constructors.push(id);
        }

        Ok(())
    }

    /// Every constructor chains to the superclass's zero-argument constructor.
    fn check_super_constructors(&self) -> Result<(), SemanticError> {
        for &class in self.model.class_order() {
            let info = self.model.class(class);
            let Some(superclass) = info.superclass else {
                continue;
            };
            let has_default = self
                .model
                .class(superclass)
                .constructors
                .iter()
                .any(|&c| self.model.method(c).params.is_empty());
            if !has_default {
                return Err(SemanticError::MissingSuperConstructor {
                    class: info.name.clone(),
                    superclass: self.model.class(superclass).name.clone(),
                    span: info.span.into(),
                });
            }
        }
        Ok(())
    }

    fn check_duplicate_method(&self, existing: &[MethodId], method: &Method) -> Result<(), SemanticError> {
        let duplicate = existing.iter().any(|&m| {
            let other = self.model.method(m);
            other.symbol == method.symbol && other.same_params(method)
        });
        if duplicate {
            let param_types: Vec<Type> = method.params.iter().map(|p| p.ty).collect();
            return Err(SemanticError::DuplicateMethod {
                owner: self.model.owner_name(method.owner).to_string(),
                signature: format!("{}({})", method.name, self.model.type_list(&param_types)),
                span: method.span.into(),
            });
        }
        Ok(())
    }

    fn resolve_params(&self, params: &[Param]) -> Result<Vec<ParamInfo>, SemanticError> {
        let mut resolved: Vec<ParamInfo> = Vec::with_capacity(params.len());
        for param in params {
            if resolved.iter().any(|p| p.name == param.name) {
                return Err(SemanticError::DuplicateVariable {
                    name: self.resolve_name(param.name).to_string(),
                    span: param.span.into(),
                });
            }
            resolved.push(ParamInfo {
                name: param.name,
                ty: self.resolve_type(&param.ty)?,
            });
        }
        Ok(resolved)
    }

    pub(super) fn resolve_type(&self, ty: &TypeExpr) -> Result<Type, SemanticError> {
        match ty.kind {
            TypeExprKind::Int => Ok(Type::Int),
            TypeExprKind::Boolean => Ok(Type::Boolean),
            TypeExprKind::Void => Ok(Type::Void),
            TypeExprKind::Named(sym) => self.model.lookup_type(sym).ok_or_else(|| {
                SemanticError::UnknownType {
                    name: self.resolve_name(sym).to_string(),
                    span: ty.span.into(),
                }
            }),
        }
    }
}
