// Integration tests driving the `mjc` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn mjc_binary() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_mjc"));
    assert!(path.exists(), "mjc binary not found at {}", path.display());
    path
}

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

/// A source file in a temp directory cleaned up on drop
struct TempSource {
    dir: tempfile::TempDir,
    path: PathBuf,
}

impl TempSource {
    fn new(content: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("prog.mj");
        fs::write(&path, content).expect("failed to write temp file");
        Self { dir, path }
    }
}

fn mjc(args: &[&str], file: &Path) -> Output {
    Command::new(mjc_binary())
        .args(args)
        .arg(file)
        .arg("--color")
        .arg("never")
        .env_remove("MJC_LOG")
        .output()
        .expect("failed to execute mjc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn e2e_programs_agree_across_backends() {
    for (file, expected) in [("e2e1.mj", "2\n"), ("e2e2.mj", "9\n"), ("shapes.mj", "26\n4\ntrue\n2\n30\n")] {
        for backend in ["eval", "jit"] {
            let output = mjc(&["run", "--backend", backend], &demo(file));
            assert!(
                output.status.success(),
                "{file} under {backend} failed: {}",
                stderr(&output)
            );
            assert_eq!(stdout(&output), expected, "{file} under {backend}");
        }
    }
}

#[test]
fn null_receiver_fails_under_both_backends() {
    for backend in ["eval", "jit"] {
        let output = mjc(&["run", "--backend", backend], &demo("null_receiver.mj"));
        assert!(!output.status.success(), "{backend} should fail");
        // value() prints 0 on entry; a second 0 would mean the body ran on null
        assert_eq!(stdout(&output), "0\n7\n", "{backend}: callee body must not run");
        let err = stderr(&output);
        assert!(err.contains("null receiver"), "{backend}: {err}");
        assert!(err.contains("line 11"), "{backend}: {err}");
    }
}

#[test]
fn method_not_found_is_reported_with_code() {
    let src = TempSource::new(
        "class A { int f(int x) { return x; } }
class Main { static void main() { A a = new A(); System.out.println(a.f(true)); } }",
    );
    let output = mjc(&["check"], &src.path);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("not found on type 'A'"), "{err}");
    assert!(err.contains("E2"), "{err}");
}

#[test]
fn ambiguous_call_is_reported() {
    let src = TempSource::new(
        "class A { }
class B extends A { }
class P {
    static int pick(A a, B b) { return 1; }
    static int pick(B b, A a) { return 2; }
}
class Main { static void main() { System.out.println(P.pick(new B(), new B())); } }",
    );
    let output = mjc(&["run"], &src.path);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ambiguous call to 'pick'"), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_accepts_valid_files() {
    let output = Command::new(mjc_binary())
        .arg("check")
        .arg(demo("e2e1.mj"))
        .arg(demo("e2e2.mj"))
        .output()
        .expect("failed to execute mjc");
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn build_writes_listing_with_tables() {
    let src = TempSource::new(&fs::read_to_string(demo("e2e2.mj")).expect("demo"));
    let out = src.dir.path().join("prog.clif");
    let output = Command::new(mjc_binary())
        .arg("build")
        .arg(&src.path)
        .arg("-o")
        .arg(&out)
        .output()
        .expect("failed to execute mjc");
    assert!(output.status.success(), "{}", stderr(&output));
    let listing = fs::read_to_string(&out).expect("artifact written");
    assert!(listing.contains("; Square.area()"));
    assert!(listing.contains("vtable.Square:"));
    assert!(listing.contains("itable.Shape.Square:"));
    assert!(listing.contains("; __static_init"));
}

#[test]
fn build_dump_prints_ir() {
    let src = TempSource::new(&fs::read_to_string(demo("e2e1.mj")).expect("demo"));
    let out = src.dir.path().join("prog.clif");
    let output = Command::new(mjc_binary())
        .args(["build", "--dump", "-o"])
        .arg(&out)
        .arg(&src.path)
        .output()
        .expect("failed to execute mjc");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("; B.f()"));
}

#[test]
fn build_rejects_interface_with_several_root_implementors() {
    let src = TempSource::new(
        "interface I { int f(); }
class A implements I { int f() { return 1; } }
class B implements I { int f() { return 2; } }
class Main { static void main() { I i = new A(); System.out.println(i.f()); } }",
    );
    let out = src.dir.path().join("prog.clif");
    let output = Command::new(mjc_binary())
        .arg("build")
        .arg(&src.path)
        .arg("-o")
        .arg(&out)
        .arg("--color")
        .arg("never")
        .output()
        .expect("failed to execute mjc");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("implemented independently by A, B"), "{}", stderr(&output));
    assert!(!out.exists());

    // the evaluator has no such restriction
    let output = mjc(&["run", "--backend", "eval"], &src.path);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "1\n");
}

#[test]
fn inspect_tables_lists_slots() {
    let output = mjc(&["inspect", "tables"], &demo("shapes.mj"));
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("class Square extends Rect"), "{text}");
    assert!(text.contains("    [2] Square.isSquare()"), "{text}");
    assert!(text.contains("  itable Shape:\n    [0] area() -> Rect.area()"), "{text}");
}

#[test]
fn inspect_ast_prints_declarations() {
    let output = mjc(&["inspect", "ast"], &demo("e2e2.mj"));
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("Program\n"));
    assert!(text.contains("InterfaceDecl \"Shape\""));
    assert!(text.contains("ClassDecl \"Square\" implements Shape"));
}

#[test]
fn missing_file_is_an_error() {
    let output = mjc(&["run"], Path::new("/nonexistent/prog.mj"));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("could not read"));
}
