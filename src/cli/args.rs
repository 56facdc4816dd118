// src/cli/args.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Color output mode
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Execution backend for `mjc run`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Tree-walking evaluator
    #[default]
    Eval,
    /// Cranelift JIT
    Jit,
}

/// Compiler and runtime for a small class-based language
#[derive(Parser)]
#[command(name = "mjc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Class-based language with interfaces and virtual dispatch", long_about = None)]
pub struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true, hide = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a source file
    #[command(visible_alias = "r")]
    Run {
        /// Path to the source file to execute
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Backend executing the program
        #[arg(long, value_enum, default_value_t = Backend::Eval)]
        backend: Backend,

        /// Class whose `static void main()` is the entry point
        #[arg(long, value_name = "CLASS")]
        main: Option<String>,
    },
    /// Check source files for errors without running them
    #[command(visible_alias = "c")]
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Compile a source file and write the verified IR listing
    #[command(visible_alias = "b")]
    Build {
        /// Path to the source file to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Artifact path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Print each function's IR before verification
        #[arg(long)]
        dump: bool,

        /// Class whose `static void main()` is the entry point
        #[arg(long, value_name = "CLASS")]
        main: Option<String>,
    },
    /// Inspect compilation output (AST, dispatch tables)
    #[command(visible_alias = "i")]
    Inspect {
        /// What to inspect: ast, tables
        #[arg(value_name = "TYPE")]
        inspect_type: InspectType,

        /// File to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InspectType {
    Ast,
    Tables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_evaluator() {
        let cli = Cli::try_parse_from(["mjc", "run", "prog.mj"]).unwrap();
        match cli.command {
            Commands::Run { backend, main, .. } => {
                assert_eq!(backend, Backend::Eval);
                assert!(main.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn build_requires_output() {
        assert!(Cli::try_parse_from(["mjc", "build", "prog.mj"]).is_err());
        let cli = Cli::try_parse_from(["mjc", "build", "prog.mj", "-o", "out.clif", "--dump"]).unwrap();
        match cli.command {
            Commands::Build { dump, output, .. } => {
                assert!(dump);
                assert_eq!(output, PathBuf::from("out.clif"));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn color_is_global() {
        let cli = Cli::try_parse_from(["mjc", "check", "a.mj", "--color", "never"]).unwrap();
        assert!(matches!(cli.color, ColorMode::Never));
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
