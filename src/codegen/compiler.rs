// src/codegen/compiler.rs
//
// Drives one compilation: declares every entry, materializes the tables,
// then compiles each function body against the recorded bindings.

use cranelift::prelude::*;
use cranelift_module::FuncId;

use super::context::Cg;
use super::jit::{JitContext, JitOptions};
use super::tables::Thunk;
use super::types::{
    CompileCtx, ENTRY_SYMBOL, STATIC_INIT_SYMBOL, Symbols, method_owner, method_signature,
};
use crate::errors::{CodegenError, CodegenResult};
use crate::runtime::{flush_stdout, release_objects};
use crate::sema::{Analysis, MethodId};

pub struct Compiler<'a> {
    pub(super) analysis: &'a Analysis,
    pub(super) jit: JitContext,
    pub(super) symbols: Symbols,
    pub(super) thunks: Vec<Thunk>,
    /// Text listing of every materialized table
    pub(super) tables: String,
}

impl<'a> Compiler<'a> {
    pub fn new(analysis: &'a Analysis, options: JitOptions) -> Self {
        let jit = JitContext::with_options(options);
        let symbols = Symbols {
            runtime: jit.runtime_ids().clone(),
            ..Symbols::default()
        };
        Self {
            analysis,
            jit,
            symbols,
            thunks: Vec::new(),
            tables: String::new(),
        }
    }

    /// Compile every class-owned method, the tables, the static
    /// initializer and an entry routine calling `entry`.
    #[tracing::instrument(name = "codegen", skip_all)]
    pub fn compile(mut self, entry: MethodId) -> CodegenResult<CompiledProgram> {
        self.declare_methods();
        self.declare_routines();
        self.materialize_tables()?;

        let analysis = self.analysis;
        let model = &analysis.model;
        for method in model.method_ids() {
            if method_owner(model, method).is_some() {
                self.compile_method(method)?;
            }
        }
        for thunk in std::mem::take(&mut self.thunks) {
            self.compile_thunk(&thunk)?;
        }
        self.compile_static_init()?;
        self.compile_entry(entry)?;

        tracing::debug!(
            functions = self.jit.func_ids.len(),
            "compiled program"
        );
        Ok(CompiledProgram {
            jit: self.jit,
            tables: self.tables,
        })
    }

    fn declare_methods(&mut self) {
        let analysis = self.analysis;
        let model = &analysis.model;
        for method in model.method_ids() {
            if method_owner(model, method).is_none() {
                continue;
            }
            let sig = method_signature(&self.jit.module, model, method);
            let func_id = self.jit.declare_function(&model.entry_symbol(method), &sig);
            self.symbols.methods.insert(method, func_id);
        }
    }

    fn declare_routines(&mut self) {
        let sig = self.jit.create_signature(&[], None);
        let static_init = self.jit.declare_function(STATIC_INIT_SYMBOL, &sig);
        self.symbols.static_init = Some(static_init);
        self.jit.declare_function(ENTRY_SYMBOL, &sig);
    }

    /// Build one function: `body` receives the entry block parameters and
    /// compiles into the current block. Falling off the end returns for
    /// void functions.
    pub(super) fn define(
        &mut self,
        name: &str,
        func_id: FuncId,
        sig: Signature,
        body: impl FnOnce(&mut Cg<'_, '_, '_>, &[Value]) -> CodegenResult<()>,
    ) -> CodegenResult<()> {
        let returns_value = !sig.returns.is_empty();
        self.jit.ctx.func.signature = sig;

        let pointer_type = self.jit.pointer_type();
        let built = {
            let (func, module) = self.jit.split_for_compile();
            let mut builder_ctx = FunctionBuilderContext::new();
            let mut builder = FunctionBuilder::new(func, &mut builder_ctx);
            let entry_block = builder.create_block();
            builder.append_block_params_for_function_params(entry_block);
            builder.switch_to_block(entry_block);
            builder.seal_block(entry_block);
            let params = builder.block_params(entry_block).to_vec();

            let mut ctx = CompileCtx {
                analysis: self.analysis,
                module,
                symbols: &self.symbols,
                pointer_type,
            };
            let mut cg = Cg::new(&mut builder, &mut ctx);
            let result = body(&mut cg, &params);
            if result.is_ok() {
                cg.finish_function(returns_value);
                builder.finalize();
            }
            result
        };
        if let Err(e) = built {
            self.jit.ctx.clear();
            return Err(e);
        }
        self.jit.define_function(name, func_id)
    }

    fn compile_method(&mut self, method: MethodId) -> CodegenResult<()> {
        let analysis = self.analysis;
        let model = &analysis.model;
        let info = model.method(method);
        let Some(owner) = method_owner(model, method) else {
            unreachable!("INTERNAL: interface signatures have no entry");
        };
        let name = model.entry_symbol(method);
        let func_id = self.symbols.method(model, method);
        let sig = method_signature(&self.jit.module, model, method);
        let body = analysis.body_of(method);

        self.define(&name, func_id, sig, |cg, params| {
            let mut params = params.iter().copied();
            if !info.is_static {
                let Some(this) = params.next() else {
                    unreachable!("INTERNAL: instance entry without a receiver");
                };
                cg.set_this(this);
            }
            for (param, value) in info.params.iter().zip(params) {
                cg.define_local(param.name, param.ty, value);
            }
            if info.is_constructor {
                cg.chain_super_constructor(owner);
            }
            if let Some(body) = body {
                cg.block(body)?;
            }
            Ok(())
        })
    }

    /// Static field initializers in class order, declaration order within
    /// a class
    fn compile_static_init(&mut self) -> CodegenResult<()> {
        let analysis = self.analysis;
        let Some(func_id) = self.symbols.static_init else {
            unreachable!("INTERNAL: static initializer was never declared");
        };
        let sig = self.jit.create_signature(&[], None);
        self.define(STATIC_INIT_SYMBOL, func_id, sig, |cg, _| {
            for field in analysis.model.static_fields() {
                if let Some(init) = analysis.static_initializer(field) {
                    let value = cg.expr(init)?;
                    cg.store_field(field, None, value);
                }
            }
            Ok(())
        })
    }

    fn compile_entry(&mut self, entry: MethodId) -> CodegenResult<()> {
        let Some(&func_id) = self.jit.func_ids.get(ENTRY_SYMBOL) else {
            unreachable!("INTERNAL: entry routine was never declared");
        };
        let Some(static_init) = self.symbols.static_init else {
            unreachable!("INTERNAL: static initializer was never declared");
        };
        let sig = self.jit.create_signature(&[], None);
        self.define(ENTRY_SYMBOL, func_id, sig, |cg, _| {
            let init_ref = cg.func_ref(static_init);
            cg.builder.ins().call(init_ref, &[]);
            cg.call_direct(entry, &[]);
            Ok(())
        })
    }
}

/// A fully compiled and verified program
pub struct CompiledProgram {
    jit: JitContext,
    tables: String,
}

impl CompiledProgram {
    /// IR of every function followed by the table listing
    pub fn listing(&self) -> String {
        format!("{}{}", self.jit.listing(), self.tables)
    }

    pub fn tables(&self) -> &str {
        &self.tables
    }

    /// Link and run the entry routine on the current thread.
    #[tracing::instrument(name = "execute", skip_all)]
    pub fn run(mut self) -> CodegenResult<()> {
        self.jit.finalize()?;
        let Some(fn_ptr) = self.jit.get_function_ptr(ENTRY_SYMBOL) else {
            return Err(CodegenError::internal_with_context(
                "missing entry routine",
                ENTRY_SYMBOL,
            ));
        };
        let entry: extern "C" fn() = unsafe { std::mem::transmute(fn_ptr) };
        entry();
        flush_stdout();
        release_objects();
        Ok(())
    }
}
