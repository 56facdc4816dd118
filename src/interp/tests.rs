use super::*;
use crate::runtime::with_captured_stdout;
use crate::sema::test_support::analyze_ok;

fn run_with(source: &str, options: EvalOptions) -> (Result<(), RuntimeError>, String) {
    let analysis = analyze_ok(source);
    let entry = analysis.entry_point(None).expect("entry point");
    with_captured_stdout(|| run_program(&analysis, entry, options))
}

fn run(source: &str) -> (Result<(), RuntimeError>, String) {
    run_with(source, EvalOptions::default())
}

fn output(source: &str) -> String {
    let (result, out) = run(source);
    if let Err(e) = result {
        panic!("runtime error: {e}");
    }
    out
}

#[test]
fn override_through_superclass_reference() {
    let out = output(
        "class A { int f() { return 1; } }
         class B extends A { int f() { return 2; } }
         class Main { static void main() { A a = new B(); System.out.println(a.f()); } }",
    );
    assert_eq!(out, "2\n");
}

#[test]
fn interface_call_on_square() {
    let out = output(
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
fn interface_and_class_calls_reach_same_implementation() {
    let out = output(
        "interface Shape { int area(); }
         class Square implements Shape { int area() { return 4; } }
         class Big extends Square { int area() { return 16; } }
         class Main {
            static void main() {
                Big b = new Big();
                Shape s = b;
                Square q = b;
                System.out.println(s.area());
                System.out.println(q.area());
                System.out.println(b.area());
            }
         }",
    );
    assert_eq!(out, "16\n16\n16\n");
}

#[test]
fn static_call_does_not_evaluate_receiver() {
    let out = output(
        "class A { static int s() { return 5; } }
         class Main { static void main() { A a = null; System.out.println(a.s()); } }",
    );
    assert_eq!(out, "5\n");
}

#[test]
fn null_receiver_fails_before_callee_runs() {
    let source = "class A { void f() { System.out.println(1); } }\n\
                  class Main {\n\
                  static void main() {\n\
                  A a = null;\n\
                  a.f();\n\
                  System.out.println(2);\n\
                  }\n\
                  }";
    let (result, out) = run(source);
    assert_eq!(
        result,
        Err(RuntimeError::NullReceiver {
            member: "f".to_string(),
            line: 5
        })
    );
    assert_eq!(out, "");
}

#[test]
fn null_receiver_is_checked_before_arguments() {
    let (result, out) = run(
        "class A { int g(int x) { return x; } }
         class Main {
            static int noisy() { System.out.println(7); return 1; }
            static void main() { A a = null; a.g(noisy()); }
         }",
    );
    assert!(matches!(result, Err(RuntimeError::NullReceiver { .. })));
    assert_eq!(out, "");
}

#[test]
fn null_field_access_fails() {
    let (result, _) = run(
        "class P { int x; }
         class Main { static void main() { P p = null; System.out.println(p.x); } }",
    );
    assert!(matches!(
        result,
        Err(RuntimeError::NullReceiver { ref member, .. }) if member == "x"
    ));
}

#[test]
fn constructors_chain_superclass_first() {
    let out = output(
        "class A { int v; A() { v = 1; System.out.println(v); } }
         class B extends A { B(int x) { System.out.println(v + x); } }
         class Main { static void main() { B b = new B(10); } }",
    );
    assert_eq!(out, "1\n11\n");
}

#[test]
fn implicit_constructor_still_chains() {
    let out = output(
        "class A { A() { System.out.println(3); } }
         class B extends A { }
         class Main { static void main() { B b = new B(); } }",
    );
    assert_eq!(out, "3\n");
}

#[test]
fn constructor_overloads_select_by_argument() {
    let out = output(
        "class P {
            int v;
            P() { v = 1; }
            P(int x) { v = x; }
            P(boolean b) { v = 99; }
         }
         class Main {
            static void main() {
                System.out.println(new P().v);
                System.out.println(new P(5).v);
                System.out.println(new P(true).v);
            }
         }",
    );
    assert_eq!(out, "1\n5\n99\n");
}

#[test]
fn static_initializers_run_superclass_first() {
    let out = output(
        "class B extends A { static int y = A.x + 1; }
         class A { static int x = 5; }
         class Main { static void main() { System.out.println(B.y); } }",
    );
    assert_eq!(out, "6\n");
}

#[test]
fn static_fields_are_shared() {
    let out = output(
        "class Counter {
            static int count;
            Counter() { count = count + 1; }
         }
         class Main {
            static void main() {
                Counter a = new Counter();
                Counter b = new Counter();
                System.out.println(Counter.count);
                System.out.println(a.count);
            }
         }",
    );
    assert_eq!(out, "2\n2\n");
}

#[test]
fn int_arithmetic_wraps() {
    let out = output(
        "class Main { static void main() {
            int max = 2147483647;
            System.out.println(max + 1);
            System.out.println(-max - 2);
            System.out.println(65536 * 65536);
        } }",
    );
    assert_eq!(out, "-2147483648\n2147483647\n0\n");
}

#[test]
fn logical_operators_short_circuit() {
    let out = output(
        "class Main {
            static boolean loud() { System.out.println(0); return true; }
            static void main() {
                System.out.println(false && loud());
                System.out.println(true || loud());
                System.out.println(true && loud());
            }
         }",
    );
    assert_eq!(out, "false\ntrue\n0\ntrue\n");
}

#[test]
fn recursion_and_loops() {
    let out = output(
        "class Main {
            static int fib(int n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
            static void main() {
                int i = 0;
                int sum = 0;
                while (i <= 10) { sum = sum + i; i = i + 1; }
                System.out.println(sum);
                System.out.println(fib(15));
            }
         }",
    );
    assert_eq!(out, "55\n610\n");
}

#[test]
fn reference_equality() {
    let out = output(
        "class A { }
         class Main { static void main() {
            A a = new A();
            A b = a;
            A c = new A();
            System.out.println(a == b);
            System.out.println(a == c);
            System.out.println(c != null);
         } }",
    );
    assert_eq!(out, "true\nfalse\ntrue\n");
}

#[test]
fn overload_chosen_by_static_argument_type() {
    let out = output(
        "class A { }
         class B extends A { }
         class P {
            int pick(A a) { return 1; }
            int pick(B b) { return 2; }
         }
         class Main { static void main() {
            P p = new P();
            A a = new B();
            System.out.println(p.pick(a));
            System.out.println(p.pick(new B()));
         } }",
    );
    assert_eq!(out, "1\n2\n");
}

#[test]
fn deep_recursion_reports_stack_overflow() {
    let (result, _) = run_with(
        "class Main {
            static int down(int n) { return down(n + 1); }
            static void main() { down(0); }
         }",
        EvalOptions { max_call_depth: 64 },
    );
    assert_eq!(result, Err(RuntimeError::StackOverflow { limit: 64 }));
}

#[test]
fn unqualified_call_dispatches_on_this() {
    let out = output(
        "class A { int f() { return 1; } int g() { return f() * 10; } }
         class B extends A { int f() { return 2; } }
         class Main { static void main() { A a = new B(); System.out.println(a.g()); } }",
    );
    assert_eq!(out, "20\n");
}
