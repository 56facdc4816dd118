// src/sema/resolution.rs

use crate::sema::types::{InterfaceId, MethodId};

/// How a bound method is reached at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// Direct call of the method's entry symbol; no table is consulted
    Static,
    /// Primary table of the receiver's runtime class at `slot`
    Virtual { slot: u32 },
    /// Secondary table for `interface` at `slot` (the signature's
    /// declaration index)
    Interface { interface: InterfaceId, slot: u32 },
}

impl DispatchKind {
    pub fn name(self) -> &'static str {
        match self {
            DispatchKind::Static => "STATIC",
            DispatchKind::Virtual { .. } => "VIRTUAL",
            DispatchKind::Interface { .. } => "INTERFACE",
        }
    }
}

/// The resolved decision for one call site. Made once during checking and
/// consumed unchanged by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodBinding {
    /// The statically selected method. For VIRTUAL and INTERFACE bindings
    /// the runtime implementation may be an override of it.
    pub method: MethodId,
    pub dispatch: DispatchKind,
}

impl MethodBinding {
    pub fn is_static(&self) -> bool {
        matches!(self.dispatch, DispatchKind::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        let iface = InterfaceId::new(0);
        assert_eq!(DispatchKind::Static.name(), "STATIC");
        assert_eq!(DispatchKind::Virtual { slot: 1 }.name(), "VIRTUAL");
        assert_eq!(
            DispatchKind::Interface {
                interface: iface,
                slot: 0
            }
            .name(),
            "INTERFACE"
        );
        let binding = MethodBinding {
            method: MethodId::new(3),
            dispatch: DispatchKind::Static,
        };
        assert!(binding.is_static());
    }
}
