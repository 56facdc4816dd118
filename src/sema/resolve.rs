// src/sema/resolve.rs
//
// Method resolver: receiver type + name + argument types -> one binding.
// A pure function of the built type model.

use smallvec::SmallVec;

use crate::frontend::Symbol;
use crate::sema::model::TypeModel;
use crate::sema::resolution::{DispatchKind, MethodBinding};
use crate::sema::types::{ClassId, MethodId, Type};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No candidate is applicable to the argument types
    NotFound,
    /// Several applicable candidates, none most specific
    Ambiguous(Vec<MethodId>),
}

type Candidates = SmallVec<[MethodId; 4]>;

/// Methods named `name` visible on `receiver`: the primary-table entries of a
/// class plus the static methods of the class and its ancestors (nearest
/// declaration wins), or the signatures of an interface.
pub fn candidates(model: &TypeModel, receiver: Type, name: Symbol) -> Candidates {
    let mut found = Candidates::new();
    match receiver {
        Type::Class(class) => {
            for &m in &model.class(class).dispatch().slots {
                if model.method(m).symbol == name {
                    found.push(m);
                }
            }
            for c in model.ancestors(class) {
                for &m in &model.class(c).methods {
                    let method = model.method(m);
                    if method.is_static
                        && method.symbol == name
                        && !found.iter().any(|&f| model.method(f).same_params(method))
                    {
                        found.push(m);
                    }
                }
            }
        }
        Type::Interface(interface) => {
            for &m in &model.interface(interface).methods {
                if model.method(m).symbol == name {
                    found.push(m);
                }
            }
        }
        _ => {}
    }
    found
}

/// Resolve a call of `name` on a receiver of static type `receiver`.
pub fn resolve_method(
    model: &TypeModel,
    receiver: Type,
    name: Symbol,
    arg_types: &[Type],
) -> Result<MethodBinding, ResolveError> {
    let candidates = candidates(model, receiver, name);
    let method = select_most_specific(model, &candidates, arg_types)?;
    let chosen = model.method(method);

    let dispatch = if chosen.is_static {
        DispatchKind::Static
    } else {
        let Some(slot) = chosen.slot else {
            panic!(
                "INTERNAL: instance method {} has no slot",
                model.entry_symbol(method)
            );
        };
        match receiver {
            Type::Interface(interface) => DispatchKind::Interface { interface, slot },
            _ => DispatchKind::Virtual { slot },
        }
    };

    Ok(MethodBinding { method, dispatch })
}

/// Select the constructor of `class` for `new class(args)`.
pub fn resolve_constructor(
    model: &TypeModel,
    class: ClassId,
    arg_types: &[Type],
) -> Result<MethodId, ResolveError> {
    select_most_specific(model, &model.class(class).constructors, arg_types)
}

fn is_applicable(model: &TypeModel, method: MethodId, arg_types: &[Type]) -> bool {
    let params = &model.method(method).params;
    params.len() == arg_types.len()
        && params
            .iter()
            .zip(arg_types)
            .all(|(p, &a)| model.assignable(a, p.ty))
}

/// `a` is at least as specific as `b`: each parameter of `a` is assignable
/// to the corresponding parameter of `b`.
fn at_least_as_specific(model: &TypeModel, a: MethodId, b: MethodId) -> bool {
    let a = &model.method(a).params;
    let b = &model.method(b).params;
    a.iter().zip(b).all(|(pa, pb)| model.assignable(pa.ty, pb.ty))
}

fn select_most_specific(
    model: &TypeModel,
    candidates: &[MethodId],
    arg_types: &[Type],
) -> Result<MethodId, ResolveError> {
    let applicable: Candidates = candidates
        .iter()
        .copied()
        .filter(|&m| is_applicable(model, m, arg_types))
        .collect();

    match applicable.as_slice() {
        [] => return Err(ResolveError::NotFound),
        [only] => return Ok(*only),
        _ => {}
    }

    let most_specific: Candidates = applicable
        .iter()
        .copied()
        .filter(|&c| {
            applicable
                .iter()
                .all(|&d| c == d || at_least_as_specific(model, c, d))
        })
        .collect();

    match most_specific.as_slice() {
        [only] => Ok(*only),
        _ => Err(ResolveError::Ambiguous(applicable.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::test_support::analyze_ok;

    fn setup(source: &str) -> crate::sema::Analysis {
        analyze_ok(source)
    }

    fn class_type(analysis: &crate::sema::Analysis, name: &str) -> Type {
        Type::Class(analysis.model.find_class_by_name(name).unwrap())
    }

    fn sym(analysis: &crate::sema::Analysis, name: &str) -> Symbol {
        analysis.interner.lookup(name).unwrap()
    }

    const HIERARCHY: &str = "
        interface Shape { int area(); }
        class A { int f() { return 1; } static int s(int x) { return x; } }
        class B extends A implements Shape {
            int f() { return 2; }
            int area() { return 9; }
            int pick(A a) { return 1; }
            int pick(B b) { return 2; }
            int both(A a, B b) { return 1; }
            int both(B b, A a) { return 2; }
        }";

    #[test]
    fn resolution_is_deterministic() {
        let analysis = setup(HIERARCHY);
        let b = class_type(&analysis, "B");
        let f = sym(&analysis, "f");
        let first = resolve_method(&analysis.model, b, f, &[]).unwrap();
        let second = resolve_method(&analysis.model, b, f, &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn virtual_binding_through_superclass_type() {
        let analysis = setup(HIERARCHY);
        let a = class_type(&analysis, "A");
        let f = sym(&analysis, "f");
        let binding = resolve_method(&analysis.model, a, f, &[]).unwrap();
        assert_eq!(binding.dispatch, DispatchKind::Virtual { slot: 0 });
        assert_eq!(analysis.model.owner_name(analysis.model.method(binding.method).owner), "A");
    }

    #[test]
    fn interface_binding_uses_declaration_slot() {
        let analysis = setup(HIERARCHY);
        let shape = analysis.model.interface_ids().next().unwrap();
        let area = sym(&analysis, "area");
        let binding = resolve_method(&analysis.model, Type::Interface(shape), area, &[]).unwrap();
        assert_eq!(
            binding.dispatch,
            DispatchKind::Interface {
                interface: shape,
                slot: 0
            }
        );
    }

    #[test]
    fn static_methods_are_inherited_as_static_bindings() {
        let analysis = setup(HIERARCHY);
        let b = class_type(&analysis, "B");
        let s = sym(&analysis, "s");
        let binding = resolve_method(&analysis.model, b, s, &[Type::Int]).unwrap();
        assert!(binding.is_static());
    }

    #[test]
    fn most_specific_overload_wins() {
        let analysis = setup(HIERARCHY);
        let b = class_type(&analysis, "B");
        let pick = sym(&analysis, "pick");
        let binding = resolve_method(&analysis.model, b, pick, &[b]).unwrap();
        let method = analysis.model.method(binding.method);
        assert_eq!(method.params[0].ty, b);

        let a = class_type(&analysis, "A");
        let binding = resolve_method(&analysis.model, b, pick, &[a]).unwrap();
        assert_eq!(analysis.model.method(binding.method).params[0].ty, a);
    }

    #[test]
    fn crossed_overloads_are_ambiguous() {
        let analysis = setup(HIERARCHY);
        let b = class_type(&analysis, "B");
        let both = sym(&analysis, "both");
        let err = resolve_method(&analysis.model, b, both, &[b, b]).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous(ref c) if c.len() == 2));
    }

    #[test]
    fn null_argument_with_unrelated_overloads_is_ambiguous() {
        let analysis = setup(
            "class X { } class Y { }
             class C { int g(X x) { return 1; } int g(Y y) { return 2; } }",
        );
        let c = class_type(&analysis, "C");
        let g = sym(&analysis, "g");
        let err = resolve_method(&analysis.model, c, g, &[Type::Null]).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous(_)));
    }

    #[test]
    fn wrong_arity_is_not_found() {
        let analysis = setup(HIERARCHY);
        let a = class_type(&analysis, "A");
        let f = sym(&analysis, "f");
        assert_eq!(
            resolve_method(&analysis.model, a, f, &[Type::Int]),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn method_only_on_subclass_is_not_visible_through_superclass() {
        let analysis = setup(HIERARCHY);
        let a = class_type(&analysis, "A");
        let area = sym(&analysis, "area");
        assert_eq!(
            resolve_method(&analysis.model, a, area, &[]),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn constructor_overloads() {
        let analysis = setup(
            "class P { int v; P() { } P(int x) { v = x; } P(boolean b) { } }",
        );
        let p = analysis.model.find_class_by_name("P").unwrap();
        let ctor = resolve_constructor(&analysis.model, p, &[Type::Int]).unwrap();
        assert_eq!(analysis.model.method(ctor).params[0].ty, Type::Int);
        let ctor = resolve_constructor(&analysis.model, p, &[]).unwrap();
        assert!(analysis.model.method(ctor).params.is_empty());
        assert_eq!(
            resolve_constructor(&analysis.model, p, &[Type::Int, Type::Int]),
            Err(ResolveError::NotFound)
        );
    }
}
