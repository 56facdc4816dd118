use super::*;
use crate::errors::CodegenErrorKind;
use crate::runtime::{live_objects, with_captured_stdout};
use crate::sema::test_support::analyze_ok;
use crate::sema::{DispatchKind, MethodBinding};

fn compile(source: &str) -> CodegenResult<CompiledProgram> {
    let analysis = analyze_ok(source);
    let entry = analysis.entry_point(None).expect("entry point");
    compile_program(&analysis, entry, JitOptions::default())
}

fn jit_output(source: &str) -> String {
    let analysis = analyze_ok(source);
    let entry = analysis.entry_point(None).expect("entry point");
    let (result, out) = with_captured_stdout(|| run_compiled(&analysis, entry, JitOptions::default()));
    if let Err(e) = result {
        panic!("codegen failed: {e}");
    }
    out
}

#[test]
fn override_through_superclass_reference() {
    let out = jit_output(
        "class A { int f() { return 1; } }
         class B extends A { int f() { return 2; } }
         class Main { static void main() { A a = new B(); System.out.println(a.f()); } }",
    );
    assert_eq!(out, "2\n");
}

#[test]
fn interface_call_on_square() {
    let out = jit_output(
        "interface Shape { int area(); }
         class Square implements Shape {
            int side;
            Square(int s) { side = s; }
            int area() { return side * side; }
         }
         class Main { static void main() { Shape s = new Square(3); System.out.println(s.area()); } }",
    );
    assert_eq!(out, "9\n");
}

#[test]
fn interface_call_reaches_subclass_override() {
    let out = jit_output(
        "interface Shape { int area(); }
         class Square implements Shape { int area() { return 4; } }
         class Big extends Square { int area() { return 16; } }
         class Main {
            static void main() {
                Shape a = new Square();
                Shape b = new Big();
                Square c = new Big();
                System.out.println(a.area());
                System.out.println(b.area());
                System.out.println(c.area());
            }
         }",
    );
    assert_eq!(out, "4\n16\n16\n");
}

#[test]
fn interface_slot_uses_inherited_implementation() {
    let out = jit_output(
        "interface Named { int id(); int twice(int x); }
         class Base { int id() { return 7; } }
         class Impl extends Base implements Named { int twice(int x) { return x + x; } }
         class Main {
            static void main() {
                Named n = new Impl();
                System.out.println(n.id());
                System.out.println(n.twice(21));
            }
         }",
    );
    assert_eq!(out, "7\n42\n");
}

#[test]
fn static_call_does_not_evaluate_receiver() {
    let out = jit_output(
        "class A { static int s() { return 5; } }
         class Main { static void main() { A a = null; System.out.println(a.s()); } }",
    );
    assert_eq!(out, "5\n");
}

#[test]
fn constructors_chain_and_initialize_fields() {
    let out = jit_output(
        "class A { int x; A() { x = 10; System.out.println(1); } }
         class B extends A { int y; B(int v) { y = v; System.out.println(2); } int sum() { return x + y; } }
         class Main { static void main() { B b = new B(5); System.out.println(b.sum()); } }",
    );
    assert_eq!(out, "1\n2\n15\n");
}

#[test]
fn implicit_constructor_chains_to_superclass() {
    let out = jit_output(
        "class A { A() { System.out.println(3); } }
         class B extends A { }
         class Main { static void main() { B b = new B(); } }",
    );
    assert_eq!(out, "3\n");
}

#[test]
fn static_initializers_run_before_main() {
    let out = jit_output(
        "class Counter { static int count = 40; static int next() { count = count + 1; return count; } }
         class Main {
            static boolean ready = true;
            static void main() {
                System.out.println(ready);
                System.out.println(Counter.next());
                System.out.println(Counter.next());
            }
         }",
    );
    assert_eq!(out, "true\n41\n42\n");
}

#[test]
fn fields_default_to_zero_values() {
    let out = jit_output(
        "class P { int n; boolean b; P other; boolean empty() { return other == null; } }
         class Main {
            static void main() {
                P p = new P();
                System.out.println(p.n);
                System.out.println(p.b);
                System.out.println(p.empty());
                p.other = p;
                System.out.println(p.empty());
            }
         }",
    );
    assert_eq!(out, "0\nfalse\ntrue\nfalse\n");
}

#[test]
fn loops_recursion_and_arithmetic() {
    let out = jit_output(
        "class M {
            static int fib(int n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); }
            static int sum(int n) { int total = 0; int i = 1; while (i <= n) { total = total + i; i = i + 1; } return total; }
         }
         class Main {
            static void main() {
                System.out.println(M.sum(10));
                System.out.println(M.fib(15));
                System.out.println(2147483647 + 1);
                System.out.println(-(3 * 4));
            }
         }",
    );
    assert_eq!(out, "55\n610\n-2147483648\n-12\n");
}

#[test]
fn short_circuit_skips_right_operand() {
    let out = jit_output(
        "class M { static boolean loud(boolean v) { System.out.println(9); return v; } }
         class Main {
            static void main() {
                System.out.println(false && M.loud(true));
                System.out.println(true || M.loud(false));
                System.out.println(true && M.loud(false));
                System.out.println(!(1 >= 2));
            }
         }",
    );
    assert_eq!(out, "false\ntrue\n9\nfalse\ntrue\n");
}

#[test]
fn unqualified_call_dispatches_on_this() {
    let out = jit_output(
        "class A { int g() { return 1; } int f() { return g() * 10; } }
         class B extends A { int g() { return 2; } }
         class Main { static void main() { A a = new B(); System.out.println(a.f()); } }",
    );
    assert_eq!(out, "20\n");
}

#[test]
fn overload_chosen_by_static_type() {
    let out = jit_output(
        "class A { }
         class B extends A { }
         class P { static int pick(A a) { return 1; } static int pick(B b) { return 2; } }
         class Main {
            static void main() {
                A a = new B();
                System.out.println(P.pick(a));
                System.out.println(P.pick(new B()));
            }
         }",
    );
    assert_eq!(out, "1\n2\n");
}

#[test]
fn objects_are_released_after_run() {
    let _ = jit_output(
        "class A { }
         class Main { static void main() { A a = new A(); a = new A(); } }",
    );
    assert_eq!(live_objects(), 0);
}

#[test]
fn several_root_implementors_are_unsupported_at_call_site() {
    let err = match compile(
        "interface I { int f(); }
         class A implements I { int f() { return 1; } }
         class B implements I { int f() { return 2; } }
         class Main { static void main() { I i = new A(); System.out.println(i.f()); } }",
    ) {
        Ok(_) => panic!("expected an unsupported-feature error"),
        Err(e) => e,
    };
    assert!(matches!(
        err.kind,
        CodegenErrorKind::UnsupportedFeature { .. }
    ));
    assert!(err.span.is_some());
    assert!(err.to_string().contains("implemented independently by A, B"));
}

#[test]
fn several_root_implementors_compile_without_interface_calls() {
    let out = jit_output(
        "interface I { int f(); }
         class A implements I { int f() { return 1; } }
         class B implements I { int f() { return 2; } }
         class Main { static void main() { A a = new A(); B b = new B(); System.out.println(a.f() + b.f()); } }",
    );
    assert_eq!(out, "3\n");
}

#[test]
fn listing_holds_functions_and_tables() {
    let program = compile(
        "interface Shape { int area(); }
         class Square implements Shape { int area() { return 4; } }
         class Main { static int k = 1; static void main() { Shape s = new Square(); System.out.println(s.area()); } }",
    )
    .expect("compiles");
    let listing = program.listing();
    assert!(listing.contains("; Square.area()"));
    assert!(listing.contains("; Square.<init>()"));
    assert!(listing.contains("; __static_init"));
    assert!(listing.contains("; __entry"));
    assert!(listing.contains("call_indirect"));

    let tables = program.tables();
    assert!(tables.contains("vtable.Square:\n  [0] Square.area()"));
    assert!(tables.contains("itable.Shape.Square:\n  [0] area() -> vtable slot 0 (Square.area())"));
    assert!(tables.contains("statics: 1 words"));
}

#[test]
fn build_writes_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.clif");
    let analysis = analyze_ok(
        "class A { int f() { return 1; } }
         class Main { static void main() { System.out.println(new A().f()); } }",
    );
    let entry = analysis.entry_point(None).expect("entry point");
    build_artifact(&analysis, entry, &path, JitOptions::default()).expect("builds");
    let text = std::fs::read_to_string(&path).expect("artifact");
    assert!(text.contains("; A.f()"));
    assert!(text.contains("vtable.A:"));
}

const SLOT_SOURCE: &str = "interface I { int g(); }
     class A implements I { int f() { return 1; } int g() { return 2; } }";

fn slot_binding(analysis: &Analysis, slot: u32, interface: bool) -> MethodBinding {
    let model = &analysis.model;
    let a = model.find_class_by_name("A").expect("class A");
    let dispatch = if interface {
        let i = model
            .interface_ids()
            .find(|&i| model.interface(i).name == "I")
            .expect("interface I");
        DispatchKind::Interface { interface: i, slot }
    } else {
        DispatchKind::Virtual { slot }
    };
    MethodBinding {
        method: model.class(a).methods[0],
        dispatch,
    }
}

#[test]
fn recorded_slots_within_tables_are_accepted() {
    let analysis = analyze_ok(SLOT_SOURCE);
    calls::assert_slot_in_range(&analysis.model, slot_binding(&analysis, 1, false));
    calls::assert_slot_in_range(&analysis.model, slot_binding(&analysis, 0, true));
}

#[test]
#[should_panic(expected = "INTERNAL: slot 2 out of range for A table of length 2")]
fn virtual_slot_past_primary_table_is_internal_fault() {
    let analysis = analyze_ok(SLOT_SOURCE);
    calls::assert_slot_in_range(&analysis.model, slot_binding(&analysis, 2, false));
}

#[test]
#[should_panic(expected = "INTERNAL: slot 1 out of range for I table of length 1")]
fn interface_slot_past_signatures_is_internal_fault() {
    let analysis = analyze_ok(SLOT_SOURCE);
    calls::assert_slot_in_range(&analysis.model, slot_binding(&analysis, 1, true));
}
