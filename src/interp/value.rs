// src/interp/value.rs

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::sema::{ClassId, Type};

/// A heap instance. `class` is the runtime class, which picks the dispatch
/// table; fields are indexed by their instance slot, inherited first.
#[derive(Debug)]
pub struct Object {
    pub class: ClassId,
    pub fields: RefCell<Vec<Value>>,
}

pub type ObjectRef = Rc<Object>;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Null,
    Object(ObjectRef),
}

impl Value {
    /// Initial value of a field or static of type `ty`
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Int => Value::Int(0),
            Type::Boolean => Value::Bool(false),
            _ => Value::Null,
        }
    }

    pub fn as_int(&self) -> i32 {
        match self {
            Value::Int(v) => *v,
            other => panic!("INTERNAL: expected int, found {other}"),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            other => panic!("INTERNAL: expected boolean, found {other}"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Identity for references, value equality for primitives
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Null => write!(f, "null"),
            Value::Object(obj) => write!(f, "<object of class #{}>", obj.class.index()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_equality_is_identity() {
        let make = || {
            Value::Object(Rc::new(Object {
                class: ClassId::new(0),
                fields: RefCell::new(Vec::new()),
            }))
        };
        let a = make();
        let b = make();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert!(!a.same(&Value::Null));
        assert!(Value::Null.same(&Value::Null));
    }

    #[test]
    fn defaults_follow_type() {
        assert!(Value::default_for(Type::Int).same(&Value::Int(0)));
        assert!(Value::default_for(Type::Boolean).same(&Value::Bool(false)));
        assert!(Value::default_for(Type::Class(ClassId::new(1))).is_null());
    }
}
