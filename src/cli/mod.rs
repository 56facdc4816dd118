// src/cli/mod.rs
pub mod args;

pub use args::{Backend, Cli, ColorMode, Commands, InspectType};
