// src/runtime/builtins.rs
//
// Print service and runtime halt routine, shared by the evaluator and
// compiled code.

use std::cell::RefCell;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

thread_local! {
    static STDOUT_CAPTURE: RefCell<Option<Box<dyn Write + Send>>> = const { RefCell::new(None) };
}

/// Set a custom writer for stdout capture. Pass None to restore normal stdout.
pub fn set_stdout_capture(writer: Option<Box<dyn Write + Send>>) {
    STDOUT_CAPTURE.with(|cell| {
        *cell.borrow_mut() = writer;
    });
}

fn writeln_stdout(s: &str) {
    STDOUT_CAPTURE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        if let Some(ref mut writer) = *borrow {
            let _ = writeln!(writer, "{}", s);
        } else {
            println!("{}", s);
        }
    });
}

/// Flush captured or real stdout
pub fn flush_stdout() {
    STDOUT_CAPTURE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        if let Some(ref mut writer) = *borrow {
            let _ = writer.flush();
        } else {
            let _ = io::stdout().flush();
        }
    });
}

pub fn print_int(value: i32) {
    writeln_stdout(&value.to_string());
}

pub fn print_bool(value: bool) {
    writeln_stdout(if value { "true" } else { "false" });
}

/// Print an int to stdout with newline
#[unsafe(no_mangle)]
pub extern "C" fn mj_println_int(value: i32) {
    print_int(value);
}

/// Print a boolean to stdout with newline. Booleans cross the boundary
/// zero-extended to 32 bits.
#[unsafe(no_mangle)]
pub extern "C" fn mj_println_bool(value: i32) {
    print_bool(value != 0);
}

/// Reached by compiled code instead of dereferencing a null receiver.
/// Reports the line and ends the process with failure status.
#[unsafe(no_mangle)]
pub extern "C" fn mj_null_receiver(line: i32) -> ! {
    flush_stdout();
    eprintln!("error: null receiver (line {})", line);
    std::process::exit(1);
}

/// A thread-safe buffer for capturing program output
#[derive(Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_string(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap_or_else(|e| e.into_inner()));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with stdout captured; returns its result and everything printed.
pub fn with_captured_stdout<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = CaptureBuffer::new();
    set_stdout_capture(Some(Box::new(buffer.clone())));
    let result = f();
    set_stdout_capture(None);
    (result, buffer.take_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn println_goes_to_capture() {
        let ((), out) = with_captured_stdout(|| {
            mj_println_int(-7);
            mj_println_bool(1);
            mj_println_bool(0);
        });
        assert_eq!(out, "-7\ntrue\nfalse\n");
    }

    #[test]
    fn capture_is_restored() {
        let ((), first) = with_captured_stdout(|| print_int(1));
        let ((), second) = with_captured_stdout(|| print_int(2));
        assert_eq!(first, "1\n");
        assert_eq!(second, "2\n");
    }
}
