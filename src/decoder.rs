//! Type-directed field decoder over a [`DataBuffer`]
//!
//! Every read either succeeds completely or leaves the buffer untouched;
//! a length-prefixed read whose payload is incomplete does not consume the
//! prefix either.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::buffer::DataBuffer;
use crate::endian::{ByteOrder, Integral};
use crate::error::{BufferError, BufferResult};
use crate::{DEFAULT_WIRE_ORDER, STRING_PREFIX_SIZE};

/// Field decoder consuming from a borrowed buffer
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a mut DataBuffer,
    order: ByteOrder,
}

impl<'a> Decoder<'a> {
    /// Create a decoder using network byte order
    #[inline]
    pub fn new(buf: &'a mut DataBuffer) -> Self {
        Self::with_order(buf, DEFAULT_WIRE_ORDER)
    }

    /// Create a decoder using `order` for every multi-byte value
    #[inline]
    pub fn with_order(buf: &'a mut DataBuffer, order: ByteOrder) -> Self {
        Self { buf, order }
    }

    /// Wire byte order of this decoder
    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.size()
    }

    /// Check if every byte has been consumed
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.buf.is_empty()
    }

    /// Skip bytes
    #[inline]
    pub fn skip(&mut self, n: usize) -> BufferResult<()> {
        self.check(n)?;
        self.buf.consume(n);
        Ok(())
    }

    /// Read any integral value
    #[inline]
    pub fn get<T: Integral>(&mut self) -> BufferResult<T> {
        self.buf.read_int(self.order)
    }

    /// Read a u8 value
    #[inline]
    pub fn get_u8(&mut self) -> BufferResult<u8> {
        self.get()
    }

    /// Read an i8 value
    #[inline]
    pub fn get_i8(&mut self) -> BufferResult<i8> {
        self.get()
    }

    /// Read a single-byte bool
    #[inline]
    pub fn get_bool(&mut self) -> BufferResult<bool> {
        self.get()
    }

    /// Read a u16 value
    #[inline]
    pub fn get_u16(&mut self) -> BufferResult<u16> {
        self.get()
    }

    /// Read an i16 value
    #[inline]
    pub fn get_i16(&mut self) -> BufferResult<i16> {
        self.get()
    }

    /// Read a u32 value
    #[inline]
    pub fn get_u32(&mut self) -> BufferResult<u32> {
        self.get()
    }

    /// Read an i32 value
    #[inline]
    pub fn get_i32(&mut self) -> BufferResult<i32> {
        self.get()
    }

    /// Read a u64 value
    #[inline]
    pub fn get_u64(&mut self) -> BufferResult<u64> {
        self.get()
    }

    /// Read an i64 value
    #[inline]
    pub fn get_i64(&mut self) -> BufferResult<i64> {
        self.get()
    }

    /// Fill `out` with exactly `out.len()` raw bytes (FIXARRAY form)
    ///
    /// Also used for text whose length was established by an earlier read.
    #[inline]
    pub fn get_bytes(&mut self, out: &mut [u8]) -> BufferResult<()> {
        self.buf.read(out)
    }

    /// Peek at bytes without advancing
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> BufferResult<&[u8]> {
        self.check(len)?;
        Ok(&self.buf.data()[..len])
    }

    /// Payload length of the length-prefixed text at the cursor, without consuming it
    pub fn peek_prefix(&self) -> BufferResult<usize> {
        let len: i32 = self.buf.peek_int(self.order)?;
        usize::try_from(len).map_err(|_| BufferError::NegativeLength(len))
    }

    /// Read bytes with a signed 32-bit length prefix (STRING form)
    pub fn get_varbytes(&mut self) -> BufferResult<Vec<u8>> {
        let len = self.peek_prefix()?;
        self.check(STRING_PREFIX_SIZE + len)?;
        self.buf.consume(STRING_PREFIX_SIZE);

        let mut bytes = vec![0u8; len];
        self.buf.read(&mut bytes)?;
        Ok(bytes)
    }

    /// Read STRING form into owned UTF-8 text
    pub fn get_string(&mut self) -> BufferResult<String> {
        let len = self.peek_prefix()?;
        self.check(STRING_PREFIX_SIZE + len)?;
        let payload = &self.buf.data()[STRING_PREFIX_SIZE..STRING_PREFIX_SIZE + len];
        let text: String = core::str::from_utf8(payload)
            .map_err(|_| BufferError::InvalidUtf8)?
            .into();
        self.buf.consume(STRING_PREFIX_SIZE + len);
        Ok(text)
    }

    #[inline]
    fn check(&self, needed: usize) -> BufferResult<()> {
        if self.buf.size() < needed {
            return Err(BufferError::InsufficientReadableBytes {
                needed,
                available: self.buf.size(),
            });
        }
        Ok(())
    }
}
