//! Registry of buffers handed to the host.

use crate::value::CelBuffer;
use hashbrown::HashMap;

/// Owns every non-empty buffer the native side has returned and the host
/// has not released yet, keyed by the buffer's address.
#[derive(Debug, Default)]
pub(crate) struct StringPool {
    entries: HashMap<usize, Box<[u8]>>,
}

impl StringPool {
    /// Copy `bytes` into a new registered buffer.
    ///
    /// Empty input yields [`CelBuffer::EMPTY`] and is not registered, since
    /// zero-length boxes share a dangling address.
    pub(crate) fn insert(&mut self, bytes: &[u8]) -> CelBuffer {
        if bytes.is_empty() {
            return CelBuffer::EMPTY;
        }
        let owned: Box<[u8]> = bytes.into();
        let buffer = CelBuffer {
            ptr: owned.as_ptr(),
            len: owned.len(),
        };
        self.entries.insert(buffer.ptr as usize, owned);
        buffer
    }

    /// Drop the buffer starting at `ptr`. Returns `false` for unknown pointers.
    pub(crate) fn remove(&mut self, ptr: *const u8) -> bool {
        self.entries.remove(&(ptr as usize)).is_some()
    }

    /// Drop every registered buffer and return how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, ptr: *const u8) -> bool {
        self.entries.contains_key(&(ptr as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_copies_and_registers() {
        let mut pool = StringPool::default();
        let source = String::from("hello");
        let buffer = pool.insert(source.as_bytes());

        assert_ne!(buffer.ptr, source.as_ptr());
        assert_eq!(buffer.len, 5);
        assert!(pool.contains(buffer.ptr));
        assert_eq!(unsafe { buffer.as_slice() }, Some(&b"hello"[..]));
    }

    #[test]
    fn empty_buffers_are_not_registered() {
        let mut pool = StringPool::default();
        let buffer = pool.insert(b"");
        assert_eq!(buffer, CelBuffer::EMPTY);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut pool = StringPool::default();
        let buffer = pool.insert(b"abc");
        assert!(pool.remove(buffer.ptr));
        assert!(!pool.remove(buffer.ptr));
        assert!(!pool.remove(core::ptr::null()));
    }

    #[test]
    fn clear_reports_count() {
        let mut pool = StringPool::default();
        pool.insert(b"a");
        pool.insert(b"b");
        pool.insert(b"");
        assert_eq!(pool.clear(), 2);
        assert_eq!(pool.len(), 0);
    }
}
