//! Object pools
//!
//! Two process-wide (per-thread) pools: row slot vectors and scratch byte
//! buffers. Acquire returns a cleared buffer sized to the request; release
//! truncates and keeps the allocation. The store is single-threaded
//! cooperative, so thread-local storage is the whole synchronization story.

use std::cell::RefCell;

use crate::types::Value;

thread_local! {
    static SLOT_POOL: RefCell<Vec<Vec<Option<Value>>>> = const { RefCell::new(Vec::new()) };
    static BUF_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

/// Takes a slot vector of length `len`, every slot absent.
pub fn acquire_slots(len: usize) -> Vec<Option<Value>> {
    let reused = SLOT_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        let at = pool.iter().position(|v| v.capacity() >= len);
        at.map(|i| pool.swap_remove(i))
    });
    match reused {
        Some(mut slots) => {
            slots.clear();
            slots.resize(len, None);
            slots
        }
        None => vec![None; len],
    }
}

/// Returns a slot vector to the pool.
pub fn release_slots(mut slots: Vec<Option<Value>>) {
    if slots.capacity() == 0 {
        return;
    }
    slots.clear();
    SLOT_POOL.with(|pool| pool.borrow_mut().push(slots));
}

/// Takes a scratch byte buffer with at least `capacity` room.
pub fn acquire_buf(capacity: usize) -> Vec<u8> {
    let reused = BUF_POOL.with(|pool| pool.borrow_mut().pop());
    match reused {
        Some(mut buf) => {
            buf.clear();
            buf.reserve(capacity);
            buf
        }
        None => Vec::with_capacity(capacity),
    }
}

/// Returns a scratch buffer to the pool.
pub fn release_buf(mut buf: Vec<u8>) {
    if buf.capacity() == 0 {
        return;
    }
    buf.clear();
    BUF_POOL.with(|pool| pool.borrow_mut().push(buf));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_come_back_cleared() {
        let mut slots = acquire_slots(3);
        slots[0] = Some(Value::Int(1));
        release_slots(slots);

        let slots = acquire_slots(3);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(Option::is_none));
    }

    #[test]
    fn test_slot_allocation_is_reused() {
        let slots = acquire_slots(4);
        let cap = slots.capacity();
        release_slots(slots);

        let again = acquire_slots(4);
        assert!(again.capacity() >= cap);
    }

    #[test]
    fn test_buf_round_trip() {
        let mut buf = acquire_buf(16);
        buf.extend_from_slice(b"scratch");
        release_buf(buf);

        let buf = acquire_buf(8);
        assert!(buf.is_empty());
    }
}
