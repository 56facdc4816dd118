// src/commands/inspect.rs

use std::fmt::Write;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use super::common::{PipelineError, SourceFile, load_and_analyze, read_source, render_pipeline_error};
use crate::cli::{ColorMode, InspectType};
use crate::frontend::{AstPrinter, Parser};
use crate::sema::TypeModel;

/// Inspect a source file: its AST, or its checked dispatch tables
pub fn inspect_file(path: &Path, inspect_type: InspectType, color_mode: ColorMode) -> ExitCode {
    match inspect_type {
        InspectType::Ast => inspect_ast(path, color_mode),
        InspectType::Tables => {
            let Ok((_, analysis)) = load_and_analyze(path, color_mode) else {
                return ExitCode::FAILURE;
            };
            print!("{}", describe_tables(&analysis.model));
            ExitCode::SUCCESS
        }
    }
}

fn inspect_ast(path: &Path, color_mode: ColorMode) -> ExitCode {
    let file = match read_source(path) {
        Ok(file) => file,
        Err(e) => {
            let placeholder = SourceFile {
                path: path.to_string_lossy().into_owned(),
                text: String::new(),
            };
            return report(e, &placeholder, color_mode);
        }
    };

    let mut parser = Parser::new(&file.text);
    let parsed = parser.parse_program();
    let lexer_errors = parser.take_lexer_errors();
    let program = match parsed {
        Ok(program) if lexer_errors.is_empty() => program,
        Ok(_) => return report(PipelineError::Lex(lexer_errors), &file, color_mode),
        Err(_) if !lexer_errors.is_empty() => {
            return report(PipelineError::Lex(lexer_errors), &file, color_mode);
        }
        Err(e) => return report(PipelineError::Parse(e), &file, color_mode),
    };

    let interner = parser.into_interner();
    print!("{}", AstPrinter::new(&interner).print_program(&program));
    ExitCode::SUCCESS
}

fn report(err: PipelineError, file: &SourceFile, color_mode: ColorMode) -> ExitCode {
    render_pipeline_error(&err, file, &mut io::stderr(), color_mode);
    ExitCode::FAILURE
}

/// Primary and secondary tables of every class, in table-building order.
pub fn describe_tables(model: &TypeModel) -> String {
    let mut out = String::new();
    for &class_id in model.class_order() {
        let class = model.class(class_id);
        let _ = write!(out, "class {}", class.name);
        if let Some(superclass) = class.superclass {
            let _ = write!(out, " extends {}", model.class(superclass).name);
        }
        out.push('\n');

        let table = class.dispatch();
        if table.is_empty() {
            out.push_str("  vtable: (empty)\n");
        } else {
            out.push_str("  vtable:\n");
            for (slot, &method) in table.slots.iter().enumerate() {
                let _ = writeln!(out, "    [{}] {}", slot, model.entry_symbol(method));
            }
        }

        for secondary in &table.secondary {
            let interface = model.interface(secondary.interface);
            let _ = writeln!(out, "  itable {}:", interface.name);
            for (slot, &method) in secondary.entries.iter().enumerate() {
                let signature = model.signature(interface.methods[slot]);
                let _ = writeln!(
                    out,
                    "    [{}] {} -> {}",
                    slot,
                    signature,
                    model.entry_symbol(method)
                );
            }
        }

        let statics: Vec<String> = class
            .methods
            .iter()
            .copied()
            .filter(|&m| model.method(m).is_static)
            .map(|m| model.entry_symbol(m))
            .collect();
        if !statics.is_empty() {
            let _ = writeln!(out, "  static: {}", statics.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::compile_source;

    #[test]
    fn tables_show_overrides_in_inherited_slots() {
        let analysis = compile_source(
            "interface Shape { int area(); }
             class A { int f() { return 1; } int g() { return 1; } }
             class B extends A implements Shape {
                int g() { return 2; }
                int area() { return 3; }
                static int make() { return 0; }
             }",
        )
        .expect("analyzes");
        let text = describe_tables(&analysis.model);
        assert!(text.contains(
            "class A\n  vtable:\n    [0] A.f()\n    [1] A.g()\n"
        ), "{text}");
        assert!(text.contains(
            "class B extends A\n  vtable:\n    [0] A.f()\n    [1] B.g()\n    [2] B.area()\n"
        ), "{text}");
        assert!(text.contains("  itable Shape:\n    [0] area() -> B.area()\n"), "{text}");
        assert!(text.contains("  static: B.make()\n"), "{text}");
    }

    #[test]
    fn class_without_methods_has_empty_table() {
        let analysis = compile_source("class Empty { int x; }").expect("analyzes");
        assert_eq!(describe_tables(&analysis.model), "class Empty\n  vtable: (empty)\n");
    }
}
