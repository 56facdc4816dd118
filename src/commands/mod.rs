// src/commands/mod.rs
pub mod build;
pub mod check;
pub mod common;
pub mod inspect;
pub mod run;
