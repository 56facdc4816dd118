// src/codegen/tables.rs
//
// Materialized dispatch tables. Every class gets a primary table of
// function addresses in slot order. An interface with a unique root
// implementor gets that class's secondary table; its entries are thunks
// that re-dispatch through the receiver's primary table so subclasses of
// the root implementor are honored.

use std::fmt::Write as _;

use cranelift::prelude::*;
use cranelift_module::{DataDescription, DataId, FuncId, Linkage, Module};

use super::compiler::Compiler;
use super::types::{WORD_BYTES, itable_symbol, method_signature, vtable_symbol};
use crate::errors::{CodegenError, CodegenResult};
use crate::sema::{ClassId, InterfaceId, MethodId};

/// Secondary-table entry re-dispatching to a primary slot
pub(super) struct Thunk {
    pub name: String,
    pub func_id: FuncId,
    /// Interface signature; fixes the thunk's ABI
    pub signature_of: MethodId,
    /// Primary slot holding the implementation
    pub target_slot: u32,
    /// Root implementor whose primary table `target_slot` indexes
    pub root: ClassId,
}

impl Compiler<'_> {
    pub(super) fn materialize_tables(&mut self) -> CodegenResult<()> {
        let analysis = self.analysis;
        let model = &analysis.model;
        for &class in model.class_order() {
            self.define_vtable(class)?;
        }
        for interface in model.interface_ids() {
            match model.root_implementors(interface).as_slice() {
                [root] => self.define_itable(interface, *root)?,
                // compiled interface calls report the problem at the call site
                roots => tracing::debug!(
                    interface = %model.interface(interface).name,
                    roots = roots.len(),
                    "no call-site table"
                ),
            }
        }
        self.define_statics()
    }

    fn declare_data(&mut self, name: &str, writable: bool) -> CodegenResult<DataId> {
        self.jit
            .module
            .declare_data(name, Linkage::Local, writable, false)
            .map_err(CodegenError::cranelift)
    }

    fn define_vtable(&mut self, class: ClassId) -> CodegenResult<()> {
        let analysis = self.analysis;
        let model = &analysis.model;
        let name = vtable_symbol(model, class);
        let slots = &model.class(class).dispatch().slots;
        let data_id = self.declare_data(&name, false)?;

        let word_bytes = self.jit.pointer_type().bytes();
        let mut data = DataDescription::new();
        data.define_zeroinit((word_bytes as usize) * slots.len().max(1));
        data.set_align(word_bytes as u64);

        let _ = writeln!(self.tables, "{}:", name);
        for (slot, &method) in slots.iter().enumerate() {
            let func_id = self.symbols.method(model, method);
            let func_ref = self.jit.module.declare_func_in_data(func_id, &mut data);
            data.write_function_addr(slot as u32 * word_bytes, func_ref);
            let _ = writeln!(self.tables, "  [{}] {}", slot, model.entry_symbol(method));
        }

        self.jit
            .module
            .define_data(data_id, &data)
            .map_err(CodegenError::cranelift)?;
        self.symbols.vtables.insert(class, data_id);
        tracing::debug!(table = %name, slots = slots.len(), "materialized primary table");
        Ok(())
    }

    fn define_itable(&mut self, interface: InterfaceId, root: ClassId) -> CodegenResult<()> {
        let analysis = self.analysis;
        let model = &analysis.model;
        let name = itable_symbol(model, interface, root);
        let Some(secondary) = model.class(root).dispatch().secondary_for(interface) else {
            panic!(
                "INTERNAL: {} implements {} without a secondary table",
                model.class(root).name,
                model.interface(interface).name
            );
        };
        let signatures = &model.interface(interface).methods;
        let data_id = self.declare_data(&name, false)?;

        let word_bytes = self.jit.pointer_type().bytes();
        let mut data = DataDescription::new();
        data.define_zeroinit((word_bytes as usize) * secondary.entries.len().max(1));
        data.set_align(word_bytes as u64);

        let _ = writeln!(self.tables, "{}:", name);
        for (entry, (&implementation, &signature_of)) in
            secondary.entries.iter().zip(signatures).enumerate()
        {
            let Some(target_slot) = model.method(implementation).slot else {
                panic!(
                    "INTERNAL: {} fills an interface slot without a primary slot",
                    model.entry_symbol(implementation)
                );
            };
            let thunk_name = format!("{}.{}", name, model.signature(signature_of));
            let sig = method_signature(&self.jit.module, model, signature_of);
            let func_id = self.jit.declare_function(&thunk_name, &sig);
            let func_ref = self.jit.module.declare_func_in_data(func_id, &mut data);
            data.write_function_addr(entry as u32 * word_bytes, func_ref);
            let _ = writeln!(
                self.tables,
                "  [{}] {} -> vtable slot {} ({})",
                entry,
                model.signature(signature_of),
                target_slot,
                model.entry_symbol(implementation)
            );
            self.thunks.push(Thunk {
                name: thunk_name,
                func_id,
                signature_of,
                target_slot,
                root,
            });
        }

        self.jit
            .module
            .define_data(data_id, &data)
            .map_err(CodegenError::cranelift)?;
        self.symbols.itables.insert(interface, data_id);
        tracing::debug!(table = %name, entries = secondary.entries.len(), "materialized secondary table");
        Ok(())
    }

    /// Writable storage for every static field, one word each
    fn define_statics(&mut self) -> CodegenResult<()> {
        let count = self.analysis.model.static_count();
        let data_id = self.declare_data("statics", true)?;
        let mut data = DataDescription::new();
        data.define_zeroinit(WORD_BYTES as usize * (count as usize).max(1));
        data.set_align(WORD_BYTES as u64);
        self.jit
            .module
            .define_data(data_id, &data)
            .map_err(CodegenError::cranelift)?;
        self.symbols.statics = Some(data_id);
        let _ = writeln!(self.tables, "statics: {} words", count);
        Ok(())
    }

    /// Receiver in, same arguments forwarded to the primary slot
    pub(super) fn compile_thunk(&mut self, thunk: &Thunk) -> CodegenResult<()> {
        let sig = method_signature(&self.jit.module, &self.analysis.model, thunk.signature_of);
        let (root, slot, method) = (thunk.root, thunk.target_slot, thunk.signature_of);
        self.define(&thunk.name, thunk.func_id, sig, |cg, params| {
            let result = cg.redispatch(root, slot, method, params);
            match result {
                Some(value) => cg.builder.ins().return_(&[value]),
                None => cg.builder.ins().return_(&[]),
            };
            cg.start_unreachable_block();
            Ok(())
        })
    }
}
