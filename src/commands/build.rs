// src/commands/build.rs

use std::io;
use std::path::Path;
use std::process::ExitCode;

use super::common::{PipelineError, load_and_analyze, render_pipeline_error};
use crate::cli::ColorMode;
use crate::codegen::{JitOptions, build_artifact};
use crate::sema::Analysis;

/// Compile a source file and write its verified listing to `output`
pub fn build_file(
    path: &Path,
    output: &Path,
    dump: bool,
    main: Option<&str>,
    color_mode: ColorMode,
) -> ExitCode {
    let Ok((file, analysis)) = load_and_analyze(path, color_mode) else {
        return ExitCode::FAILURE;
    };
    match build(&analysis, output, dump, main) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            render_pipeline_error(&e, &file, &mut io::stderr(), color_mode);
            ExitCode::FAILURE
        }
    }
}

fn build(analysis: &Analysis, output: &Path, dump: bool, main: Option<&str>) -> Result<(), PipelineError> {
    let entry = analysis.entry_point(main)?;
    let options = JitOptions { dump };
    build_artifact(analysis, entry, output, options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::compile_source;

    #[test]
    fn unsupported_interface_call_blocks_artifact() {
        let analysis = compile_source(
            "interface I { int f(); }
             class A implements I { int f() { return 1; } }
             class B implements I { int f() { return 2; } }
             class Main { static void main() { I i = new B(); System.out.println(i.f()); } }",
        )
        .expect("analyzes");
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("prog.clif");
        let err = build(&analysis, &out, false, None).unwrap_err();
        assert!(matches!(err, PipelineError::Codegen(_)));
        assert!(!out.exists());
    }

    #[test]
    fn named_entry_point_is_used() {
        let analysis = compile_source(
            "class First { static void main() { System.out.println(1); } }
             class Second { static void main() { System.out.println(2); } }",
        )
        .expect("analyzes");
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("prog.clif");
        assert!(matches!(
            build(&analysis, &out, false, None),
            Err(PipelineError::Sema(_))
        ));
        build(&analysis, &out, false, Some("Second")).expect("builds");
        let text = std::fs::read_to_string(&out).expect("artifact");
        assert!(text.contains("; __entry"));
    }
}
