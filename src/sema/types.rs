// src/sema/types.rs
//
// Type identities and the static type lattice.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Index of a class in the type model
    ClassId
);
define_id!(
    /// Index of an interface in the type model
    InterfaceId
);
define_id!(
    /// Index of a method, constructor or interface signature in the type model
    MethodId
);
define_id!(
    /// Index of a field in the type model
    FieldId
);

/// Static type of an expression, variable, field or method result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Boolean,
    Void,
    /// Type of the `null` literal, assignable to every reference type
    Null,
    Class(ClassId),
    Interface(InterfaceId),
}

impl Type {
    pub fn is_class(self) -> bool {
        matches!(self, Type::Class(_))
    }

    pub fn is_interface(self) -> bool {
        matches!(self, Type::Interface(_))
    }

    /// Class, interface or null
    pub fn is_reference(self) -> bool {
        matches!(self, Type::Class(_) | Type::Interface(_) | Type::Null)
    }

    pub fn is_primitive(self) -> bool {
        matches!(self, Type::Int | Type::Boolean)
    }
}
