// src/runtime/instance.rs
//
// Allocation service for compiled code. Instances are `words` 64-bit slots:
// slot 0 holds the class's primary table, the rest hold fields.
// Storage lives in a per-thread arena released after a program run.

use std::cell::RefCell;

thread_local! {
    static ARENA: RefCell<Vec<Box<[u64]>>> = const { RefCell::new(Vec::new()) };
}

/// Allocate zeroed storage for an instance of `words` slots
pub fn new_object(words: u32) -> *mut u64 {
    let mut storage = vec![0u64; words.max(1) as usize].into_boxed_slice();
    let ptr = storage.as_mut_ptr();
    ARENA.with(|arena| arena.borrow_mut().push(storage));
    ptr
}

/// Number of live allocations on this thread
pub fn live_objects() -> usize {
    ARENA.with(|arena| arena.borrow().len())
}

/// Free every instance allocated on this thread. Pointers handed out
/// earlier are dangling afterwards.
pub fn release_objects() {
    ARENA.with(|arena| {
        let released = std::mem::take(&mut *arena.borrow_mut());
        tracing::trace!(count = released.len(), "released instances");
    });
}

// Functions exposed to JIT-compiled code
#[unsafe(no_mangle)]
pub extern "C" fn mj_new_object(words: u32) -> *mut u64 {
    new_object(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_zeroed_and_stable() {
        release_objects();
        let a = mj_new_object(3);
        let b = mj_new_object(2);
        unsafe {
            assert_eq!(*a, 0);
            assert_eq!(*a.add(2), 0);
            *a.add(1) = 42;
            *b = 7;
            assert_eq!(*a.add(1), 42);
        }
        assert_eq!(live_objects(), 2);
        release_objects();
        assert_eq!(live_objects(), 0);
    }
}
