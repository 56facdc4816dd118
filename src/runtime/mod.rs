// src/runtime/mod.rs
pub mod builtins;
pub mod instance;

pub use builtins::{
    CaptureBuffer, flush_stdout, mj_null_receiver, mj_println_bool, mj_println_int, print_bool,
    print_int, set_stdout_capture, with_captured_stdout,
};
pub use instance::{live_objects, mj_new_object, release_objects};
