//! Type-directed field encoder over a [`DataBuffer`]
//!
//! The encoder fixes one wire byte order (big-endian unless told otherwise)
//! and appends fields in the layout generated message code expects: plain
//! primitives at their catalog width, fixed arrays as raw bytes, strings as
//! a signed 32-bit length prefix followed by the bytes.

use crate::buffer::DataBuffer;
use crate::endian::{ByteOrder, Integral};
use crate::error::{BufferError, BufferResult};
use crate::DEFAULT_WIRE_ORDER;

/// Field encoder appending to a borrowed buffer
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut DataBuffer,
    order: ByteOrder,
}

impl<'a> Encoder<'a> {
    /// Create an encoder using network byte order
    #[inline]
    pub fn new(buf: &'a mut DataBuffer) -> Self {
        Self::with_order(buf, DEFAULT_WIRE_ORDER)
    }

    /// Create an encoder using `order` for every multi-byte value
    #[inline]
    pub fn with_order(buf: &'a mut DataBuffer, order: ByteOrder) -> Self {
        Self { buf, order }
    }

    /// Wire byte order of this encoder
    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Write any integral value
    #[inline]
    pub fn put<T: Integral>(&mut self, value: T) {
        self.buf.write_int(value, self.order);
    }

    /// Write a u8 value
    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.put(value);
    }

    /// Write an i8 value
    #[inline]
    pub fn put_i8(&mut self, value: i8) {
        self.put(value);
    }

    /// Write a bool as a single byte
    #[inline]
    pub fn put_bool(&mut self, value: bool) {
        self.put(value);
    }

    /// Write a u16 value
    #[inline]
    pub fn put_u16(&mut self, value: u16) {
        self.put(value);
    }

    /// Write an i16 value
    #[inline]
    pub fn put_i16(&mut self, value: i16) {
        self.put(value);
    }

    /// Write a u32 value
    #[inline]
    pub fn put_u32(&mut self, value: u32) {
        self.put(value);
    }

    /// Write an i32 value
    #[inline]
    pub fn put_i32(&mut self, value: i32) {
        self.put(value);
    }

    /// Write a u64 value
    #[inline]
    pub fn put_u64(&mut self, value: u64) {
        self.put(value);
    }

    /// Write an i64 value
    #[inline]
    pub fn put_i64(&mut self, value: i64) {
        self.put(value);
    }

    /// Write raw bytes without length prefix (FIXARRAY form)
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.write(bytes);
    }

    /// Write bytes with a signed 32-bit length prefix (STRING form)
    pub fn put_varbytes(&mut self, bytes: &[u8]) -> BufferResult<()> {
        let len = prefix_for(bytes.len())?;
        self.put_i32(len);
        self.buf.write(bytes);
        Ok(())
    }

    /// Write UTF-8 text in STRING form
    #[inline]
    pub fn put_str(&mut self, text: &str) -> BufferResult<()> {
        self.put_varbytes(text.as_bytes())
    }

    /// Bytes currently readable in the underlying buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.size()
    }

    /// The underlying buffer
    #[inline]
    pub fn buffer(&self) -> &DataBuffer {
        self.buf
    }
}

/// Length prefix for a text of `len` bytes
#[inline]
pub(crate) fn prefix_for(len: usize) -> BufferResult<i32> {
    i32::try_from(len).map_err(|_| BufferError::TextTooLong(len))
}
