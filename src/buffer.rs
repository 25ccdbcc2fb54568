//! Growable byte buffer with independent read/write cursors
//!
//! Layout of the backing storage:
//!
//! ```text
//! +-------------------+------------------+------------------+
//! | prependable bytes | readable bytes   | writable bytes   |
//! |                   | (unread payload) |                  |
//! +-------------------+------------------+------------------+
//! 0          read_index        write_index          capacity
//! ```
//!
//! A front region of `prepend_size` bytes is reserved at construction so a
//! header can be written in front of an already-encoded payload without
//! moving it. Reads and prepends that cannot be satisfied fail without
//! touching any cursor; writes grow the storage instead of failing.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::endian::{ByteOrder, Integral};
use crate::error::{BufferError, BufferResult};
use crate::{DEFAULT_INITIAL_SIZE, DEFAULT_PREPEND_SIZE};

const CRLF: &[u8; 2] = b"\r\n";

/// Construction parameters for a [`DataBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Writable bytes available right after construction
    pub initial_size: usize,
    /// Bytes reserved in front of the payload for cheap prepends
    pub prepend_size: usize,
    /// Order used by operations that ask for [`ByteOrder::Runtime`]
    pub byte_order: ByteOrder,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            prepend_size: DEFAULT_PREPEND_SIZE,
            byte_order: ByteOrder::Native,
        }
    }
}

/// Single-owner growable byte buffer
///
/// Invariant: `read_index <= write_index <= storage.len()`. The read cursor
/// only drops below `prepend_size` through [`DataBuffer::write_front`] or
/// [`DataBuffer::unconsume`].
pub struct DataBuffer {
    storage: Vec<u8>,
    read_index: usize,
    write_index: usize,
    prepend_size: usize,
    byte_order: ByteOrder,
}

impl Default for DataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBuffer")
            .field("capacity", &self.capacity())
            .field("read_index", &self.read_index)
            .field("write_index", &self.write_index)
            .field("prepend_size", &self.prepend_size)
            .field("byte_order", &self.byte_order)
            .finish()
    }
}

impl DataBuffer {
    /// Create a buffer with the default sizes and native runtime order
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Create a buffer with `initial_size` writable bytes and a reserved front
    pub fn with_capacity(initial_size: usize, prepend_size: usize) -> Self {
        Self::with_config(BufferConfig {
            initial_size,
            prepend_size,
            ..BufferConfig::default()
        })
    }

    /// Create a buffer from a full configuration
    pub fn with_config(config: BufferConfig) -> Self {
        let capacity = grown_capacity(config.prepend_size, config.initial_size);
        Self {
            storage: vec![0u8; capacity],
            read_index: config.prepend_size,
            write_index: config.prepend_size,
            prepend_size: config.prepend_size,
            byte_order: config.byte_order,
        }
    }

    /// Unread bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.write_index - self.read_index
    }

    /// True when nothing is left to read
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Bytes that can be written before the buffer has to grow
    #[inline]
    pub fn writable_bytes(&self) -> usize {
        self.storage.len() - self.write_index
    }

    /// Bytes in front of the read cursor
    #[inline]
    pub fn prependable_bytes(&self) -> usize {
        self.read_index
    }

    /// Total size of the backing storage
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Front region reserved at construction
    #[inline]
    pub fn prepend_size(&self) -> usize {
        self.prepend_size
    }

    /// Order applied to [`ByteOrder::Runtime`] operations
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Set the order applied to [`ByteOrder::Runtime`] operations
    #[inline]
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = order;
    }

    /// The unread bytes
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.storage[self.read_index..self.write_index]
    }

    /// The unread bytes, mutably
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.read_index..self.write_index]
    }

    /// Copy the unread bytes out
    pub fn to_vec(&self) -> Vec<u8> {
        self.data().to_vec()
    }

    /// Exchange contents with another buffer
    pub fn swap(&mut self, other: &mut DataBuffer) {
        core::mem::swap(self, other);
    }

    /// Empty the buffer, keeping its storage
    #[inline]
    pub fn reset(&mut self) {
        self.truncate(0);
    }

    /// Keep only the first `n` unread bytes
    ///
    /// Does nothing when `n` is not smaller than [`size`](Self::size).
    pub fn truncate(&mut self, n: usize) {
        if n == 0 {
            self.read_index = self.prepend_size;
            self.write_index = self.prepend_size;
        } else if self.write_index > self.read_index + n {
            self.write_index = self.read_index + n;
        }
    }

    /// Make sure the storage can hold `len` bytes after the reserved front
    pub fn reserve(&mut self, len: usize) {
        let needed = grown_capacity(len, self.prepend_size);
        if self.capacity() >= needed {
            return;
        }
        self.grow(needed);
    }

    /// Reallocate to exactly fit the unread bytes plus `reserve` spare bytes
    pub fn shrink(&mut self, reserve: usize) {
        let mut other = DataBuffer::with_config(BufferConfig {
            initial_size: grown_capacity(self.size(), reserve),
            prepend_size: self.prepend_size,
            byte_order: self.byte_order,
        });
        other.write(self.data());
        self.swap(&mut other);
    }

    /// Advance the write cursor over bytes written through [`prepare`](Self::prepare)
    ///
    /// Clamps at the end of the storage.
    #[inline]
    pub fn commit(&mut self, n: usize) {
        if n <= self.writable_bytes() {
            self.write_index += n;
        } else {
            self.write_index = self.capacity();
        }
    }

    /// Retreat the write cursor, dropping up to `n` unread bytes from the tail
    #[inline]
    pub fn uncommit(&mut self, n: usize) {
        self.write_index -= n.min(self.size());
    }

    /// Advance the read cursor
    ///
    /// Consuming more than [`size`](Self::size) empties the buffer.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        if n <= self.size() {
            self.read_index += n;
        } else {
            self.reset();
        }
    }

    /// Retreat the read cursor, clamped at the start of the storage
    ///
    /// Used to roll back a failed multi-field decode.
    #[inline]
    pub fn unconsume(&mut self, n: usize) {
        self.read_index = self.read_index.saturating_sub(n);
    }

    /// Writable scratch region of exactly `n` bytes at the write cursor
    ///
    /// Nothing becomes readable until [`commit`](Self::commit) is called.
    pub fn prepare(&mut self, n: usize) -> &mut [u8] {
        self.ensure_writable(n);
        let start = self.write_index;
        &mut self.storage[start..start + n]
    }

    /// Move the unread bytes back to the end of the reserved front
    ///
    /// Reclaims consumed space without reallocating.
    pub fn compact(&mut self) {
        if self.read_index > self.prepend_size {
            let readable = self.size();
            self.storage
                .copy_within(self.read_index..self.write_index, self.prepend_size);
            self.read_index = self.prepend_size;
            self.write_index = self.read_index + readable;
            tracing::trace!(readable, "compacted buffer in place");
        }
    }

    /// Append bytes at the tail, growing as needed
    pub fn write(&mut self, bytes: &[u8]) {
        self.ensure_writable(bytes.len());
        let start = self.write_index;
        self.storage[start..start + bytes.len()].copy_from_slice(bytes);
        self.write_index += bytes.len();
    }

    /// Append an integral value in `order`
    #[inline]
    pub fn write_int<T: Integral>(&mut self, value: T, order: ByteOrder) {
        let bytes = value.to_order_bytes(order.resolve(self.byte_order));
        self.write(bytes.as_ref());
    }

    /// Insert bytes immediately before the read cursor
    ///
    /// Fails without mutation when the front region is too small.
    pub fn write_front(&mut self, bytes: &[u8]) -> BufferResult<()> {
        if self.prependable_bytes() < bytes.len() {
            return Err(BufferError::InsufficientPrependSpace {
                needed: bytes.len(),
                available: self.prependable_bytes(),
            });
        }
        self.read_index -= bytes.len();
        let start = self.read_index;
        self.storage[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Prepend an integral value in `order`
    #[inline]
    pub fn write_front_int<T: Integral>(&mut self, value: T, order: ByteOrder) -> BufferResult<()> {
        let bytes = value.to_order_bytes(order.resolve(self.byte_order));
        self.write_front(bytes.as_ref())
    }

    /// Copy the first `out.len()` unread bytes without consuming them
    pub fn peek(&self, out: &mut [u8]) -> BufferResult<()> {
        self.check_readable(out.len())?;
        out.copy_from_slice(&self.storage[self.read_index..self.read_index + out.len()]);
        Ok(())
    }

    /// Copy and consume the first `out.len()` unread bytes
    pub fn read(&mut self, out: &mut [u8]) -> BufferResult<()> {
        self.peek(out)?;
        self.consume(out.len());
        Ok(())
    }

    /// Decode an integral value without consuming it
    pub fn peek_int<T: Integral>(&self, order: ByteOrder) -> BufferResult<T> {
        let mut bytes = T::Bytes::default();
        self.peek(bytes.as_mut())?;
        Ok(T::from_order_bytes(bytes, order.resolve(self.byte_order)))
    }

    /// Decode and consume an integral value
    pub fn read_int<T: Integral>(&mut self, order: ByteOrder) -> BufferResult<T> {
        let value = self.peek_int(order)?;
        self.consume(T::WIDTH);
        Ok(value)
    }

    /// Offset of the first `\r\n` in the unread bytes
    #[inline]
    pub fn find_crlf(&self) -> Option<usize> {
        self.find_crlf_from(0)
    }

    /// Offset of the first `\r\n` at or after `start` in the unread bytes
    pub fn find_crlf_from(&self, start: usize) -> Option<usize> {
        let data = self.data();
        if start >= data.len() {
            return None;
        }
        data[start..]
            .windows(CRLF.len())
            .position(|window| window == CRLF)
            .map(|pos| start + pos)
    }

    /// Offset of the first `\n` in the unread bytes
    #[inline]
    pub fn find_eol(&self) -> Option<usize> {
        self.find_eol_from(0)
    }

    /// Offset of the first `\n` at or after `start` in the unread bytes
    pub fn find_eol_from(&self, start: usize) -> Option<usize> {
        let data = self.data();
        if start >= data.len() {
            return None;
        }
        data[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|pos| start + pos)
    }

    #[inline]
    fn check_readable(&self, needed: usize) -> BufferResult<()> {
        if self.size() < needed {
            return Err(BufferError::InsufficientReadableBytes {
                needed,
                available: self.size(),
            });
        }
        Ok(())
    }

    #[inline]
    fn ensure_writable(&mut self, len: usize) {
        if self.writable_bytes() < len {
            self.grow(len);
        }
        debug_assert!(self.writable_bytes() >= len);
    }

    fn grow(&mut self, len: usize) {
        if self.writable_bytes() + self.prependable_bytes() < grown_capacity(len, self.prepend_size) {
            let old_capacity = self.capacity();
            let new_capacity = grown_capacity(old_capacity.checked_mul(2).unwrap_or(usize::MAX), len);
            let readable = self.size();

            let mut storage = vec![0u8; new_capacity];
            storage[self.prepend_size..self.prepend_size + readable].copy_from_slice(self.data());

            self.storage = storage;
            self.read_index = self.prepend_size;
            self.write_index = self.prepend_size + readable;
            tracing::trace!(old_capacity, new_capacity, "reallocated buffer");
        } else {
            // Enough room overall: slide the payload back to the reserved front.
            let readable = self.size();
            self.storage
                .copy_within(self.read_index..self.write_index, self.prepend_size);
            self.read_index = self.prepend_size;
            self.write_index = self.read_index + readable;
            tracing::trace!(readable, "compacted buffer to make room");
        }
    }
}

// Growth that cannot even be sized is as fatal as the allocator failing.
#[inline]
fn grown_capacity(base: usize, extra: usize) -> usize {
    match base.checked_add(extra) {
        Some(capacity) => capacity,
        None => allocation_failure(base, extra),
    }
}

#[cold]
#[inline(never)]
fn allocation_failure(base: usize, extra: usize) -> ! {
    panic!("buffer capacity overflow: {base} + {extra} bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_layout() {
        let buf = DataBuffer::with_capacity(16, 8);
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.writable_bytes(), 16);
        assert_eq!(buf.prependable_bytes(), 8);
        assert_eq!(buf.capacity(), 24);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let mut buf = DataBuffer::with_capacity(16, 8);
        buf.write(b"hello");
        assert_eq!(buf.size(), 5);
        assert_eq!(buf.writable_bytes(), 11);

        let mut out = [0u8; 3];
        buf.read(&mut out).unwrap();
        assert_eq!(&out, b"hel");
        assert_eq!(buf.data(), b"lo");
        assert_eq!(buf.prependable_bytes(), 11);
    }

    #[test]
    fn test_read_insufficient_leaves_cursor() {
        let mut buf = DataBuffer::with_capacity(16, 8);
        buf.write(b"ab");
        let mut out = [0u8; 4];
        assert_eq!(
            buf.read(&mut out),
            Err(BufferError::InsufficientReadableBytes {
                needed: 4,
                available: 2
            })
        );
        assert_eq!(buf.data(), b"ab");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buf = DataBuffer::new();
        buf.write(b"xyz");
        let mut out = [0u8; 2];
        buf.peek(&mut out).unwrap();
        buf.peek(&mut out).unwrap();
        assert_eq!(&out, b"xy");
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn test_write_front_uses_reserved_region() {
        let mut buf = DataBuffer::with_capacity(16, 4);
        buf.write(b"body");
        buf.write_front(b"hd").unwrap();
        assert_eq!(buf.data(), b"hdbody");
        assert_eq!(buf.prependable_bytes(), 2);
    }

    #[test]
    fn test_write_front_overflow_is_rejected_untouched() {
        let mut buf = DataBuffer::with_capacity(16, 2);
        buf.write(b"body");
        let before = buf.to_vec();
        assert_eq!(
            buf.write_front(b"toolong"),
            Err(BufferError::InsufficientPrependSpace {
                needed: 7,
                available: 2
            })
        );
        assert_eq!(buf.to_vec(), before);
        assert_eq!(buf.prependable_bytes(), 2);
    }

    #[test]
    fn test_consume_past_end_resets() {
        let mut buf = DataBuffer::with_capacity(16, 8);
        buf.write(b"abcd");
        buf.consume(2);
        assert_eq!(buf.data(), b"cd");
        buf.consume(100);
        assert!(buf.is_empty());
        assert_eq!(buf.prependable_bytes(), 8);
        assert_eq!(buf.writable_bytes(), 16);
    }

    #[test]
    fn test_unconsume_restores_and_clamps() {
        let mut buf = DataBuffer::with_capacity(16, 2);
        buf.write(b"abcd");
        buf.consume(3);
        buf.unconsume(3);
        assert_eq!(buf.data(), b"abcd");
        buf.unconsume(100);
        assert_eq!(buf.prependable_bytes(), 0);
    }

    #[test]
    fn test_prepare_and_commit() {
        let mut buf = DataBuffer::with_capacity(4, 0);
        let scratch = buf.prepare(6);
        scratch.copy_from_slice(b"abcdef");
        assert!(buf.is_empty());
        buf.commit(6);
        assert_eq!(buf.data(), b"abcdef");
        buf.uncommit(2);
        assert_eq!(buf.data(), b"abcd");
        buf.uncommit(100);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_commit_clamps_at_capacity() {
        let mut buf = DataBuffer::with_capacity(4, 0);
        buf.commit(10);
        assert_eq!(buf.size(), 4);
        assert_eq!(buf.writable_bytes(), 0);
    }

    #[test]
    fn test_truncate() {
        let mut buf = DataBuffer::new();
        buf.write(b"abcdef");
        buf.truncate(10);
        assert_eq!(buf.size(), 6);
        buf.truncate(3);
        assert_eq!(buf.data(), b"abc");
        buf.truncate(0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_grow_by_reallocation_keeps_unread() {
        let mut buf = DataBuffer::with_capacity(4, 2);
        buf.write(b"abc");
        buf.consume(1);
        buf.write(b"0123456789");
        assert_eq!(buf.data(), b"bc0123456789");
        assert_eq!(buf.prependable_bytes(), 2);
        assert_eq!(buf.capacity(), 6 * 2 + 10);
    }

    #[test]
    fn test_grow_by_compaction_keeps_storage() {
        let mut buf = DataBuffer::with_capacity(8, 2);
        buf.write(b"abcdefgh");
        buf.consume(6);
        buf.write(b"1234");
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.data(), b"gh1234");
        assert_eq!(buf.prependable_bytes(), 2);
    }

    #[test]
    fn test_compact() {
        let mut buf = DataBuffer::with_capacity(8, 2);
        buf.write(b"abcdef");
        buf.consume(4);
        buf.compact();
        assert_eq!(buf.prependable_bytes(), 2);
        assert_eq!(buf.data(), b"ef");
        assert_eq!(buf.writable_bytes(), 6);
    }

    #[test]
    fn test_reserve_and_shrink() {
        let mut buf = DataBuffer::with_capacity(4, 8);
        buf.reserve(100);
        assert!(buf.capacity() >= 108);
        buf.write(b"data");
        buf.shrink(2);
        assert_eq!(buf.data(), b"data");
        assert_eq!(buf.capacity(), 8 + 4 + 2);
    }

    #[test]
    fn test_integers_in_each_order() {
        let mut buf = DataBuffer::new();
        buf.write_int(0x0102u16, ByteOrder::Big);
        buf.write_int(0x0102u16, ByteOrder::Little);
        assert_eq!(buf.data(), &[0x01, 0x02, 0x02, 0x01]);
        assert_eq!(buf.read_int::<u16>(ByteOrder::Big).unwrap(), 0x0102);
        assert_eq!(buf.read_int::<u16>(ByteOrder::Little).unwrap(), 0x0102);
    }

    #[test]
    fn test_runtime_order_follows_buffer_default() {
        let mut buf = DataBuffer::new();
        buf.set_byte_order(ByteOrder::Big);
        buf.write_int(1u32, ByteOrder::Runtime);
        assert_eq!(buf.data(), &[0, 0, 0, 1]);
        assert_eq!(buf.peek_int::<u32>(ByteOrder::Runtime).unwrap(), 1);
        assert_eq!(buf.size(), 4);
    }

    #[test]
    fn test_write_front_int() {
        let mut buf = DataBuffer::with_capacity(8, 8);
        buf.write(b"payload");
        buf.write_front_int(7u32, ByteOrder::Big).unwrap();
        assert_eq!(buf.read_int::<u32>(ByteOrder::Big).unwrap(), 7);
        assert_eq!(buf.data(), b"payload");
    }

    #[test]
    fn test_find_line_endings() {
        let mut buf = DataBuffer::new();
        buf.write(b"GET /\r\nHost: x\r\n");
        assert_eq!(buf.find_crlf(), Some(5));
        assert_eq!(buf.find_crlf_from(6), Some(14));
        assert_eq!(buf.find_eol(), Some(6));
        assert_eq!(buf.find_eol_from(7), Some(15));
        assert_eq!(buf.find_eol_from(100), None);

        buf.consume(7);
        assert_eq!(buf.find_crlf(), Some(7));
    }

    #[test]
    fn test_swap() {
        let mut a = DataBuffer::new();
        let mut b = DataBuffer::new();
        a.write(b"left");
        b.write(b"right");
        a.swap(&mut b);
        assert_eq!(a.data(), b"right");
        assert_eq!(b.data(), b"left");
    }

    #[test]
    #[should_panic(expected = "buffer capacity overflow")]
    fn test_reserve_overflow_is_fatal() {
        DataBuffer::new().reserve(usize::MAX);
    }
}
