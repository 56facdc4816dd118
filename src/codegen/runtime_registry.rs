//! Runtime callables linked into compiled code.
//!
//! Every service compiled code may call is listed here once, with its C
//! symbol, its ABI signature and the address the JIT links it to.

use crate::runtime::{mj_new_object, mj_null_receiver, mj_println_bool, mj_println_int};

/// Typed key for a runtime callable exposed to codegen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKey {
    PrintlnInt,
    PrintlnBool,
    NewObject,
    NullReceiver,
}

impl RuntimeKey {
    pub const ALL: &'static [RuntimeKey] = &[
        RuntimeKey::PrintlnInt,
        RuntimeKey::PrintlnBool,
        RuntimeKey::NewObject,
        RuntimeKey::NullReceiver,
    ];

    pub fn c_name(self) -> &'static str {
        match self {
            RuntimeKey::PrintlnInt => "mj_println_int",
            RuntimeKey::PrintlnBool => "mj_println_bool",
            RuntimeKey::NewObject => "mj_new_object",
            RuntimeKey::NullReceiver => "mj_null_receiver",
        }
    }

    pub fn signature(self) -> SigSpec {
        match self {
            RuntimeKey::PrintlnInt | RuntimeKey::PrintlnBool => SigSpec {
                params: &[AbiTy::I32],
                ret: None,
            },
            RuntimeKey::NewObject => SigSpec {
                params: &[AbiTy::I32],
                ret: Some(AbiTy::Ptr),
            },
            // never returns
            RuntimeKey::NullReceiver => SigSpec {
                params: &[AbiTy::I32],
                ret: None,
            },
        }
    }

    /// Address the JIT links the symbol to
    pub fn ptr(self) -> *const u8 {
        match self {
            RuntimeKey::PrintlnInt => mj_println_int as *const u8,
            RuntimeKey::PrintlnBool => mj_println_bool as *const u8,
            RuntimeKey::NewObject => mj_new_object as *const u8,
            RuntimeKey::NullReceiver => mj_null_receiver as *const u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiTy {
    Ptr,
    I32,
}

#[derive(Debug, Clone, Copy)]
pub struct SigSpec {
    pub params: &'static [AbiTy],
    pub ret: Option<AbiTy>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn symbol_names_are_unique() {
        let names: FxHashSet<_> = RuntimeKey::ALL.iter().map(|k| k.c_name()).collect();
        assert_eq!(names.len(), RuntimeKey::ALL.len());
        assert!(names.iter().all(|n| n.starts_with("mj_")));
    }

    #[test]
    fn allocator_returns_a_pointer() {
        let sig = RuntimeKey::NewObject.signature();
        assert_eq!(sig.params, &[AbiTy::I32]);
        assert_eq!(sig.ret, Some(AbiTy::Ptr));
        assert!(RuntimeKey::NullReceiver.signature().ret.is_none());
    }
}
