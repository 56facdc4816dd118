// src/sema/dispatch.rs
//
// Method table builder. Each class gets a primary table (slot -> instance
// method) that extends its superclass's table, and one secondary table per
// implemented interface in the interface's declaration order.

use crate::errors::SemanticError;
use crate::sema::model::{Owner, TypeModel};
use crate::sema::types::{ClassId, InterfaceId, MethodId};

/// Secondary table for one implemented interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryTable {
    pub interface: InterfaceId,
    /// Implementation for each interface signature, in declaration order
    pub entries: Vec<MethodId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTable {
    pub slots: Vec<MethodId>,
    pub secondary: Vec<SecondaryTable>,
}

impl DispatchTable {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Method occupying `slot`. Out-of-range slots are internal faults.
    pub fn method_at(&self, slot: u32) -> MethodId {
        match self.slots.get(slot as usize) {
            Some(&m) => m,
            None => panic!(
                "INTERNAL: slot {} out of range for table of length {}",
                slot,
                self.slots.len()
            ),
        }
    }

    pub fn secondary_for(&self, interface: InterfaceId) -> Option<&SecondaryTable> {
        self.secondary.iter().find(|t| t.interface == interface)
    }
}

/// Build every class's tables in superclass-first order.
#[tracing::instrument(name = "tables", skip_all)]
pub fn build_dispatch_tables(model: &mut TypeModel) -> Result<(), SemanticError> {
    let order = model.class_order().to_vec();
    for class in order {
        let table = build_class_table(model, class)?;
        tracing::debug!(
            class = %model.class(class).name,
            slots = table.slots.len(),
            interfaces = table.secondary.len(),
            "built dispatch table"
        );
        model.class_mut(class).dispatch = Some(table);
    }
    Ok(())
}

fn build_class_table(model: &mut TypeModel, class: ClassId) -> Result<DispatchTable, SemanticError> {
    let mut slots = match model.class(class).superclass {
        Some(superclass) => model.class(superclass).dispatch().slots.clone(),
        None => Vec::new(),
    };

    let declared = model.class(class).methods.clone();
    for method_id in declared {
        let method = model.method(method_id);
        let inherited_slot = slots.iter().position(|&s| {
            let other = model.method(s);
            other.symbol == method.symbol && other.same_params(method)
        });

        if method.is_static {
            if inherited_slot.is_some() {
                return Err(incompatible(
                    model,
                    class,
                    method_id,
                    "a static method cannot hide an inherited instance method",
                ));
            }
            if let Some(hidden) = inherited_static(model, class, method_id)
                && model.method(hidden).return_type != method.return_type
            {
                let reason = format!(
                    "return type {} does not match hidden {}",
                    model.type_name(method.return_type),
                    model.type_name(model.method(hidden).return_type)
                );
                return Err(incompatible(model, class, method_id, &reason));
            }
            continue;
        }

        match inherited_slot {
            Some(index) => {
                let inherited = model.method(slots[index]);
                if inherited.return_type != method.return_type {
                    let reason = format!(
                        "return type {} does not match inherited {}",
                        model.type_name(method.return_type),
                        model.type_name(inherited.return_type)
                    );
                    return Err(incompatible(model, class, method_id, &reason));
                }
                tracing::debug!(
                    method = %model.entry_symbol(method_id),
                    slot = index,
                    "override keeps slot"
                );
                slots[index] = method_id;
                model.method_mut(method_id).slot = Some(index as u32);
            }
            None => {
                if inherited_static(model, class, method_id).is_some() {
                    return Err(incompatible(
                        model,
                        class,
                        method_id,
                        "an instance method cannot override an inherited static method",
                    ));
                }
                let index = slots.len();
                tracing::debug!(
                    method = %model.entry_symbol(method_id),
                    slot = index,
                    "new slot"
                );
                slots.push(method_id);
                model.method_mut(method_id).slot = Some(index as u32);
            }
        }
    }

    let mut secondary = Vec::new();
    for interface in model.all_interfaces(class) {
        let mut entries = Vec::new();
        for &sig_id in &model.interface(interface).methods {
            let sig = model.method(sig_id);
            let implementation = slots.iter().copied().find(|&s| {
                let m = model.method(s);
                m.symbol == sig.symbol && m.same_params(sig) && m.return_type == sig.return_type
            });
            match implementation {
                Some(m) => entries.push(m),
                None => {
                    return Err(SemanticError::InterfaceMethodUnimplemented {
                        class: model.class(class).name.clone(),
                        interface: model.interface(interface).name.clone(),
                        signature: model.signature(sig_id),
                        span: model.class(class).span.into(),
                    });
                }
            }
        }
        secondary.push(SecondaryTable { interface, entries });
    }

    Ok(DispatchTable { slots, secondary })
}

/// Nearest static method in a strict ancestor with the same name and parameters
fn inherited_static(model: &TypeModel, class: ClassId, method_id: MethodId) -> Option<MethodId> {
    let method = model.method(method_id);
    let superclass = model.class(class).superclass?;
    model.ancestors(superclass).find_map(|c| {
        model.class(c).methods.iter().copied().find(|&m| {
            let other = model.method(m);
            other.is_static && other.symbol == method.symbol && other.same_params(method)
        })
    })
}

fn incompatible(model: &TypeModel, class: ClassId, method_id: MethodId, reason: &str) -> SemanticError {
    debug_assert!(matches!(model.method(method_id).owner, Owner::Class(c) if c == class));
    SemanticError::IncompatibleOverride {
        class: model.class(class).name.clone(),
        signature: model.signature(method_id),
        reason: reason.to_string(),
        span: model.method(method_id).span.into(),
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::SemanticError;
    use crate::sema::test_support::{analyze_err, analyze_ok};

    #[test]
    fn override_keeps_superclass_slot() {
        let analyzed = analyze_ok(
            "class A { int f() { return 1; } int g() { return 10; } }
             class B extends A { int h() { return 3; } int f() { return 2; } }",
        );
        let model = &analyzed.model;
        let a = model.find_class_by_name("A").unwrap();
        let b = model.find_class_by_name("B").unwrap();
        let a_table = model.class(a).dispatch();
        let b_table = model.class(b).dispatch();

        assert_eq!(a_table.len(), 2);
        assert_eq!(b_table.len(), 3);
        for slot in 0..a_table.len() as u32 {
            let inherited = model.method(a_table.method_at(slot));
            let current = model.method(b_table.method_at(slot));
            assert_eq!(inherited.name, current.name);
        }
        // f was overridden in place, h appended
        let f_in_b = model.method(b_table.method_at(0));
        assert_eq!(model.owner_name(f_in_b.owner), "B");
        assert_eq!(model.method(b_table.method_at(2)).name, "h");
    }

    #[test]
    fn unrelated_classes_both_start_at_slot_zero() {
        let analyzed = analyze_ok(
            "class A { int f() { return 1; } }
             class C { int k() { return 2; } }",
        );
        let model = &analyzed.model;
        let c = model.find_class_by_name("C").unwrap();
        let k = model.class(c).dispatch().method_at(0);
        assert_eq!(model.method(k).slot, Some(0));
    }

    #[test]
    fn static_methods_take_no_slot() {
        let analyzed = analyze_ok("class A { static int s() { return 1; } int f() { return 2; } }");
        let model = &analyzed.model;
        let a = model.find_class_by_name("A").unwrap();
        let table = model.class(a).dispatch();
        assert_eq!(table.len(), 1);
        let s = model.class(a).methods[0];
        assert_eq!(model.method(s).slot, None);
    }

    #[test]
    fn overload_gets_new_slot() {
        let analyzed = analyze_ok(
            "class A { int f(int x) { return x; } }
             class B extends A { int f(boolean b) { return 0; } }",
        );
        let model = &analyzed.model;
        let b = model.find_class_by_name("B").unwrap();
        assert_eq!(model.class(b).dispatch().len(), 2);
    }

    #[test]
    fn secondary_table_follows_interface_order() {
        let analyzed = analyze_ok(
            "interface I { int second(); int first(); }
             class A implements I { int first() { return 1; } int second() { return 2; } }
             class B extends A { int second() { return 3; } }",
        );
        let model = &analyzed.model;
        let b = model.find_class_by_name("B").unwrap();
        let i = model.interface_ids().next().unwrap();
        let table = model.class(b).dispatch();
        let secondary = table.secondary_for(i).expect("inherited interface");
        assert_eq!(model.method(secondary.entries[0]).name, "second");
        assert_eq!(model.owner_name(model.method(secondary.entries[0]).owner), "B");
        assert_eq!(model.method(secondary.entries[1]).name, "first");
    }

    #[test]
    fn return_type_change_is_incompatible_override() {
        let err = analyze_err(
            "class A { int f() { return 1; } }
             class B extends A { boolean f() { return true; } }",
        );
        assert!(matches!(err, SemanticError::IncompatibleOverride { .. }));
    }

    #[test]
    fn static_hiding_instance_is_incompatible() {
        let err = analyze_err(
            "class A { int f() { return 1; } }
             class B extends A { static int f() { return 2; } }",
        );
        assert!(matches!(err, SemanticError::IncompatibleOverride { .. }));
    }

    #[test]
    fn instance_overriding_static_is_incompatible() {
        let err = analyze_err(
            "class A { static int f() { return 1; } }
             class B extends A { int f() { return 2; } }",
        );
        assert!(matches!(err, SemanticError::IncompatibleOverride { .. }));
    }

    #[test]
    fn missing_interface_method() {
        let err = analyze_err(
            "interface Shape { int area(); }
             class Square implements Shape { int perimeter() { return 4; } }",
        );
        match err {
            SemanticError::InterfaceMethodUnimplemented {
                class, signature, ..
            } => {
                assert_eq!(class, "Square");
                assert_eq!(signature, "area()");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn interface_method_with_wrong_return_is_unimplemented() {
        let err = analyze_err(
            "interface Shape { int area(); }
             class Square implements Shape { boolean area() { return true; } }",
        );
        assert!(matches!(
            err,
            SemanticError::InterfaceMethodUnimplemented { .. }
        ));
    }

    #[test]
    fn interface_satisfied_by_inherited_method() {
        analyze_ok(
            "interface Shape { int area(); }
             class Base { int area() { return 1; } }
             class Square extends Base implements Shape { }",
        );
    }
}
