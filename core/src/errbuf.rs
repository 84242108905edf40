//! Caller-allocated error buffers.
//!
//! Fallible entry points take `(errbuf, errbuf_len)`. On input `*errbuf_len`
//! is the capacity of `errbuf`; on failure the native side writes at most that
//! many bytes of UTF-8 and stores the number of bytes written back into
//! `*errbuf_len`. No terminator is written: callers read exactly
//! `*errbuf_len` bytes. Messages that do not fit are cut at the last
//! character boundary within the capacity, so the written prefix is always
//! valid UTF-8. Truncation is silent.

/// Recommended error buffer capacity.
pub const DEFAULT_ERROR_CAPACITY: usize = 4096;

/// The longest prefix of `message` that fits in `capacity` bytes without
/// splitting a character.
pub fn fit(message: &str, capacity: usize) -> &str {
    if message.len() <= capacity {
        return message;
    }
    let mut end = capacity;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Write `message` into a caller-supplied error buffer.
///
/// Nothing is written when either pointer is null. Returns the number of
/// bytes written.
///
/// # Safety
///
/// If non-null, `errbuf_len` must be valid for reads and writes, and
/// `errbuf` must be valid for writes of `*errbuf_len` bytes.
pub unsafe fn write_error(message: &str, errbuf: *mut u8, errbuf_len: *mut usize) -> usize {
    if errbuf.is_null() || errbuf_len.is_null() {
        return 0;
    }
    let capacity = unsafe { *errbuf_len };
    let text = fit(message, capacity);
    unsafe {
        core::ptr::copy_nonoverlapping(text.as_ptr(), errbuf, text.len());
        *errbuf_len = text.len();
    }
    text.len()
}
