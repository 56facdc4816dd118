// src/commands/check.rs

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::common::load_and_analyze;
use crate::cli::ColorMode;

/// Check source files (parse + type check, no execution). Every file is
/// checked even after one fails.
pub fn check_files(files: &[PathBuf], color_mode: ColorMode) -> ExitCode {
    let mut had_error = false;
    for path in files {
        if !check_single_file(path, color_mode) {
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn check_single_file(path: &Path, color_mode: ColorMode) -> bool {
    let _span = tracing::info_span!("check_file", file = %path.display()).entered();
    match load_and_analyze(path, color_mode) {
        Ok((_, analysis)) => {
            tracing::debug!(
                classes = analysis.model.class_order().len(),
                "ok"
            );
            true
        }
        Err(()) => false,
    }
}
