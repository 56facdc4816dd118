// src/codegen/jit.rs

use std::fmt::Write as _;

use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};
use rustc_hash::FxHashMap;

use super::runtime_registry::{AbiTy, RuntimeKey, SigSpec};
use crate::errors::{CodegenError, CodegenResult};

/// Options for the compiled backend
#[derive(Clone, Copy, Debug, Default)]
pub struct JitOptions {
    /// Print each function's IR before it is verified
    pub dump: bool,
}

impl JitOptions {
    pub fn dump() -> Self {
        Self { dump: true }
    }
}

/// JIT compiler context
pub struct JitContext {
    pub module: JITModule,
    pub ctx: codegen::Context,
    /// Functions declared with Export linkage (will be compiled)
    pub func_ids: FxHashMap<String, FuncId>,
    /// Runtime services declared with Import linkage
    runtime_ids: FxHashMap<RuntimeKey, FuncId>,
    dump: bool,
    /// IR text of every defined function, in definition order
    listing: String,
}

impl JitContext {
    pub fn new() -> Self {
        Self::with_options(JitOptions::default())
    }

    pub fn with_options(options: JitOptions) -> Self {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("use_colocated_libcalls", "false")
            .expect("INTERNAL: Cranelift config: invalid 'use_colocated_libcalls' flag");
        flag_builder
            .set("is_pic", "false")
            .expect("INTERNAL: Cranelift config: invalid 'is_pic' flag");
        flag_builder
            .set("opt_level", "speed")
            .expect("INTERNAL: Cranelift config: invalid 'opt_level' flag");

        let isa_builder = cranelift_native::builder().unwrap_or_else(|msg| {
            panic!("INTERNAL: native ISA not available: {}", msg);
        });
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .expect("INTERNAL: Cranelift config: failed to build ISA from native target");

        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        for &key in RuntimeKey::ALL {
            builder.symbol(key.c_name(), key.ptr());
        }

        let module = JITModule::new(builder);
        let ctx = module.make_context();

        let mut jit = Self {
            module,
            ctx,
            func_ids: FxHashMap::default(),
            runtime_ids: FxHashMap::default(),
            dump: options.dump,
            listing: String::new(),
        };
        jit.import_runtime_functions();
        jit
    }

    fn import_runtime_functions(&mut self) {
        for &key in RuntimeKey::ALL {
            let sig = self.create_signature_from_spec(key.signature());
            let func_id = self
                .module
                .declare_function(key.c_name(), Linkage::Import, &sig)
                .unwrap_or_else(|e| panic!("INTERNAL: failed to import function '{}': {:?}", key.c_name(), e));
            self.runtime_ids.insert(key, func_id);
        }
    }

    /// Imported runtime functions, for call emission
    pub fn runtime_ids(&self) -> &FxHashMap<RuntimeKey, FuncId> {
        &self.runtime_ids
    }

    /// Get the pointer type for the target
    pub fn pointer_type(&self) -> Type {
        self.module.target_config().pointer_type()
    }

    /// Create a function signature with given parameters and return type
    pub fn create_signature(&self, params: &[Type], ret: Option<Type>) -> Signature {
        let mut sig = self.module.make_signature();
        for &param in params {
            sig.params.push(AbiParam::new(param));
        }
        if let Some(ret_type) = ret {
            sig.returns.push(AbiParam::new(ret_type));
        }
        sig
    }

    fn create_signature_from_spec(&self, spec: SigSpec) -> Signature {
        let abi = |ty: AbiTy| match ty {
            AbiTy::Ptr => self.pointer_type(),
            AbiTy::I32 => types::I32,
        };
        let params: Vec<Type> = spec.params.iter().map(|&p| abi(p)).collect();
        self.create_signature(&params, spec.ret.map(abi))
    }

    /// Declare a function in the module
    pub fn declare_function(&mut self, name: &str, sig: &Signature) -> FuncId {
        let func_id = self
            .module
            .declare_function(name, Linkage::Export, sig)
            .unwrap_or_else(|e| panic!("INTERNAL: failed to declare function '{}': {:?}", name, e));
        self.func_ids.insert(name.to_string(), func_id);
        func_id
    }

    /// Verify and define the function held in `ctx`, then clear it for the
    /// next one. The IR is added to the listing before verification.
    pub fn define_function(&mut self, name: &str, func_id: FuncId) -> CodegenResult<()> {
        let text = self.ctx.func.display().to_string();
        if self.dump {
            println!("; {}\n{}", name, text);
        }
        // writing to a String cannot fail
        let _ = writeln!(self.listing, "; {}\n{}", name, text);

        cranelift_codegen::verify_function(&self.ctx.func, self.module.isa())
            .map_err(|errors| CodegenError::verifier(name, errors))?;

        self.module
            .define_function(func_id, &mut self.ctx)
            .map_err(CodegenError::cranelift)?;
        tracing::trace!(function = name, "defined");
        self.ctx.clear();
        Ok(())
    }

    /// IR text of every function defined so far
    pub fn listing(&self) -> &str {
        &self.listing
    }

    /// Finalize all functions and get code pointers
    pub fn finalize(&mut self) -> CodegenResult<()> {
        self.module.finalize_definitions().map_err(|e| {
            CodegenError::internal_with_context("finalization error", format!("{:?}", e))
        })
    }

    /// Get a function pointer by name
    pub fn get_function_ptr(&self, name: &str) -> Option<*const u8> {
        self.func_ids
            .get(name)
            .map(|&func_id| self.module.get_finalized_function(func_id))
    }

    /// Split into parts for compilation - allows FunctionBuilder and the
    /// module to be borrowed at the same time.
    pub fn split_for_compile(&mut self) -> (&mut cranelift_codegen::ir::Function, &mut JITModule) {
        (&mut self.ctx.func, &mut self.module)
    }
}

impl Default for JitContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_jit_context() {
        let jit = JitContext::new();
        assert!(jit.pointer_type() == types::I64 || jit.pointer_type() == types::I32);
        assert_eq!(jit.runtime_ids().len(), RuntimeKey::ALL.len());
    }

    #[test]
    fn define_records_listing_and_runs() {
        let mut jit = JitContext::new();
        let sig = jit.create_signature(&[types::I32, types::I32], Some(types::I32));
        let func_id = jit.declare_function("add", &sig);
        jit.ctx.func.signature = sig;

        let mut builder_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut jit.ctx.func, &mut builder_ctx);
        let entry_block = builder.create_block();
        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);
        let a = builder.block_params(entry_block)[0];
        let b = builder.block_params(entry_block)[1];
        let sum = builder.ins().iadd(a, b);
        builder.ins().return_(&[sum]);
        builder.finalize();

        jit.define_function("add", func_id).unwrap();
        assert!(jit.listing().contains("; add"));
        assert!(jit.listing().contains("iadd"));

        jit.finalize().expect("INTERNAL: JIT finalization failed");
        let fn_ptr = jit.get_function_ptr("add").unwrap();
        let add: extern "C" fn(i32, i32) -> i32 = unsafe { std::mem::transmute(fn_ptr) };
        assert_eq!(add(40, 2), 42);
        assert_eq!(add(i32::MAX, 1), i32::MIN);
    }

    #[test]
    fn verifier_rejects_unterminated_block() {
        let mut jit = JitContext::new();
        let sig = jit.create_signature(&[], None);
        let func_id = jit.declare_function("broken", &sig);
        jit.ctx.func.signature = sig;

        let mut builder_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut jit.ctx.func, &mut builder_ctx);
        let entry_block = builder.create_block();
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);
        // return value count does not match the signature
        let one = builder.ins().iconst(types::I32, 1);
        builder.ins().return_(&[one]);
        builder.finalize();

        let err = jit.define_function("broken", func_id).unwrap_err();
        assert!(err.to_string().contains("verifier rejected 'broken'"));
        assert!(jit.listing().contains("; broken"));
    }
}
