// src/sema/mod.rs
pub mod analyzer;
pub mod dispatch;
pub mod expression_data;
pub mod model;
pub mod resolution;
pub mod resolve;
pub mod scope;
pub mod types;

pub use analyzer::Analyzer;
pub use dispatch::{DispatchTable, SecondaryTable};
pub use expression_data::{ExpressionData, NameRef};
pub use model::{ClassType, Field, FieldLayout, InterfaceType, Method, MethodBody, Owner, TypeModel};
pub use resolution::{DispatchKind, MethodBinding};
pub use types::{ClassId, FieldId, InterfaceId, MethodId, Type};

use crate::errors::SemanticError;
use crate::frontend::ast::{Block, Decl, Expr};
use crate::frontend::{Interner, Program};

/// A checked program: the (annotated) AST, its type model with built
/// dispatch tables, and the per-node side tables. Shared read-only by every
/// backend.
#[derive(Debug)]
pub struct Analysis {
    pub program: Program,
    pub interner: Interner,
    pub model: TypeModel,
    pub data: ExpressionData,
}

impl Analysis {
    /// Find the program entry: `static void main()` in the named class, or
    /// in the only class declaring one.
    pub fn entry_point(&self, main_class: Option<&str>) -> Result<MethodId, SemanticError> {
        analyzer::find_entry_point(&self.model, &self.interner, main_class)
    }

    /// Declared body of a method or constructor; `None` for implicit
    /// constructors and interface signatures.
    pub fn body_of(&self, method: MethodId) -> Option<&Block> {
        let (member, is_ctor) = match self.model.method(method).body {
            MethodBody::Method(member) => (member, false),
            MethodBody::Constructor(member) => (member, true),
            MethodBody::Abstract | MethodBody::Implicit => return None,
        };
        let Decl::Class(class_decl) = &self.program.declarations[member.decl] else {
            unreachable!("INTERNAL: method body outside a class");
        };
        Some(if is_ctor {
            &class_decl.constructors[member.index].body
        } else {
            &class_decl.methods[member.index].body
        })
    }

    /// Initializer expression of a static field, if it has one
    pub fn static_initializer(&self, field: FieldId) -> Option<&Expr> {
        let init = self.model.field(field).init?;
        let Decl::Class(class_decl) = &self.program.declarations[init.decl] else {
            unreachable!("INTERNAL: static initializer outside a class");
        };
        class_decl.fields[init.index].init.as_ref()
    }
}

/// Register, build tables and check every body. The first checking failure
/// aborts the unit.
pub fn analyze_program(mut program: Program, interner: Interner) -> Result<Analysis, SemanticError> {
    let (model, data) = {
        let mut analyzer = Analyzer::new(&interner);
        analyzer.analyze(&mut program)?;
        analyzer.into_results()
    };
    Ok(Analysis {
        program,
        interner,
        model,
        data,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::frontend::Parser;

    pub fn analyze_source(source: &str) -> Result<Analysis, SemanticError> {
        let mut parser = Parser::new(source);
        let program = parser.parse_program().expect("parse failed");
        assert!(parser.take_lexer_errors().is_empty(), "lexer errors");
        analyze_program(program, parser.into_interner())
    }

    pub fn analyze_ok(source: &str) -> Analysis {
        match analyze_source(source) {
            Ok(analysis) => analysis,
            Err(e) => panic!("analysis failed: {e:?}"),
        }
    }

    pub fn analyze_err(source: &str) -> SemanticError {
        match analyze_source(source) {
            Ok(_) => panic!("expected analysis to fail"),
            Err(e) => e,
        }
    }
}
