//! All-or-nothing encoding and decoding of heterogeneous field lists
//!
//! A batch is an ordered list of typed fields. Writing computes the exact
//! encoded size first, so prepending a batch either fits entirely or writes
//! nothing. Reading decodes in order and, if any field fails, rewinds the
//! read cursor so the buffer looks as if the call never happened.
//!
//! ```
//! use wireschema::{read_fields, write_fields, ByteOrder, DataBuffer};
//!
//! let mut buf = DataBuffer::new();
//! write_fields!(&mut buf, ByteOrder::Big; 7u16, "AAPL", true).unwrap();
//!
//! let (mut id, mut symbol, mut live) = (0u16, String::new(), false);
//! read_fields!(&mut buf, ByteOrder::Big; &mut id, &mut symbol, &mut live).unwrap();
//! assert_eq!((id, symbol.as_str(), live), (7, "AAPL", true));
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::DataBuffer;
use crate::catalog::PrimitiveKind;
use crate::encoder::prefix_for;
use crate::endian::{ByteOrder, Integral};
use crate::error::{BufferError, BufferResult};
use crate::STRING_PREFIX_SIZE;

/// Wire layout of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    /// Fixed-width integral in the batch byte order
    Integer {
        /// Width in bytes
        width: usize,
    },
    /// Raw bytes, no prefix
    FixedBytes {
        /// Number of bytes
        len: usize,
    },
    /// Signed 32-bit length prefix followed by that many bytes
    LengthPrefixedText,
}

impl FieldCodec {
    /// Layout of a field resolved to `kind` with declared `length`
    pub const fn for_kind(kind: PrimitiveKind, length: u32) -> FieldCodec {
        match kind {
            PrimitiveKind::String => FieldCodec::LengthPrefixedText,
            PrimitiveKind::FixArray => FieldCodec::FixedBytes {
                len: length as usize,
            },
            _ => match kind.width() {
                Some(width) => FieldCodec::Integer {
                    width: width as usize,
                },
                None => FieldCodec::LengthPrefixedText,
            },
        }
    }

    /// Encoded size when it does not depend on the value
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldCodec::Integer { width } => Some(*width),
            FieldCodec::FixedBytes { len } => Some(*len),
            FieldCodec::LengthPrefixedText => None,
        }
    }
}

/// One value to encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteField<'a> {
    /// u8
    U8(u8),
    /// i8
    I8(i8),
    /// u16
    U16(u16),
    /// i16
    I16(i16),
    /// u32
    U32(u32),
    /// i32
    I32(i32),
    /// u64
    U64(u64),
    /// i64
    I64(i64),
    /// bool as one byte
    Bool(bool),
    /// Fixed array, written raw
    Fixed(&'a [u8]),
    /// Text, written with a length prefix
    Text(&'a [u8]),
}

/// One destination to decode into
#[derive(Debug)]
pub enum ReadSlot<'a> {
    /// u8
    U8(&'a mut u8),
    /// i8
    I8(&'a mut i8),
    /// u16
    U16(&'a mut u16),
    /// i16
    I16(&'a mut i16),
    /// u32
    U32(&'a mut u32),
    /// i32
    I32(&'a mut i32),
    /// u64
    U64(&'a mut u64),
    /// i64
    I64(&'a mut i64),
    /// bool; any non-zero byte is true
    Bool(&'a mut bool),
    /// Fixed array filled with exactly its length in raw bytes
    Fixed(&'a mut [u8]),
    /// Length-prefixed bytes of any length
    Bytes(&'a mut Vec<u8>),
    /// Length-prefixed UTF-8 text of any length
    Str(&'a mut String),
    /// Length-prefixed text whose prefix must equal the slot length
    ExactText(&'a mut [u8]),
}

macro_rules! integral_fields {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl<'a> From<$ty> for WriteField<'a> {
                #[inline]
                fn from(value: $ty) -> Self {
                    WriteField::$variant(value)
                }
            }

            impl<'a> From<&'a mut $ty> for ReadSlot<'a> {
                #[inline]
                fn from(slot: &'a mut $ty) -> Self {
                    ReadSlot::$variant(slot)
                }
            }
        )*
    };
}

integral_fields!(
    U8 => u8,
    I8 => i8,
    U16 => u16,
    I16 => i16,
    U32 => u32,
    I32 => i32,
    U64 => u64,
    I64 => i64,
    Bool => bool,
);

impl<'a, const N: usize> From<&'a [u8; N]> for WriteField<'a> {
    #[inline]
    fn from(bytes: &'a [u8; N]) -> Self {
        WriteField::Fixed(bytes)
    }
}

impl<'a> From<&'a str> for WriteField<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        WriteField::Text(text.as_bytes())
    }
}

impl<'a> From<&'a String> for WriteField<'a> {
    #[inline]
    fn from(text: &'a String) -> Self {
        WriteField::Text(text.as_bytes())
    }
}

impl<'a, const N: usize> From<&'a mut [u8; N]> for ReadSlot<'a> {
    #[inline]
    fn from(bytes: &'a mut [u8; N]) -> Self {
        ReadSlot::Fixed(bytes)
    }
}

impl<'a> From<&'a mut Vec<u8>> for ReadSlot<'a> {
    #[inline]
    fn from(bytes: &'a mut Vec<u8>) -> Self {
        ReadSlot::Bytes(bytes)
    }
}

impl<'a> From<&'a mut String> for ReadSlot<'a> {
    #[inline]
    fn from(text: &'a mut String) -> Self {
        ReadSlot::Str(text)
    }
}

impl WriteField<'_> {
    /// Wire layout of this value
    pub fn codec(&self) -> FieldCodec {
        match self {
            WriteField::U8(_) | WriteField::I8(_) | WriteField::Bool(_) => {
                FieldCodec::Integer { width: 1 }
            }
            WriteField::U16(_) | WriteField::I16(_) => FieldCodec::Integer { width: 2 },
            WriteField::U32(_) | WriteField::I32(_) => FieldCodec::Integer { width: 4 },
            WriteField::U64(_) | WriteField::I64(_) => FieldCodec::Integer { width: 8 },
            WriteField::Fixed(bytes) => FieldCodec::FixedBytes { len: bytes.len() },
            WriteField::Text(_) => FieldCodec::LengthPrefixedText,
        }
    }

    /// Exact number of bytes this value occupies on the wire
    #[inline]
    pub fn wire_size(&self) -> usize {
        match self {
            WriteField::Text(bytes) => STRING_PREFIX_SIZE + bytes.len(),
            other => other.codec().fixed_size().unwrap_or(0),
        }
    }

    fn check_prefix(&self) -> BufferResult<()> {
        if let WriteField::Text(bytes) = self {
            prefix_for(bytes.len())?;
        }
        Ok(())
    }

    fn write_back(&self, buf: &mut DataBuffer, order: ByteOrder) {
        match *self {
            WriteField::U8(v) => buf.write_int(v, order),
            WriteField::I8(v) => buf.write_int(v, order),
            WriteField::U16(v) => buf.write_int(v, order),
            WriteField::I16(v) => buf.write_int(v, order),
            WriteField::U32(v) => buf.write_int(v, order),
            WriteField::I32(v) => buf.write_int(v, order),
            WriteField::U64(v) => buf.write_int(v, order),
            WriteField::I64(v) => buf.write_int(v, order),
            WriteField::Bool(v) => buf.write_int(v, order),
            WriteField::Fixed(bytes) => buf.write(bytes),
            WriteField::Text(bytes) => {
                buf.write_int(bytes.len() as i32, order);
                buf.write(bytes);
            }
        }
    }

    fn write_front(&self, buf: &mut DataBuffer, order: ByteOrder) -> BufferResult<()> {
        match *self {
            WriteField::U8(v) => buf.write_front_int(v, order),
            WriteField::I8(v) => buf.write_front_int(v, order),
            WriteField::U16(v) => buf.write_front_int(v, order),
            WriteField::I16(v) => buf.write_front_int(v, order),
            WriteField::U32(v) => buf.write_front_int(v, order),
            WriteField::I32(v) => buf.write_front_int(v, order),
            WriteField::U64(v) => buf.write_front_int(v, order),
            WriteField::I64(v) => buf.write_front_int(v, order),
            WriteField::Bool(v) => buf.write_front_int(v, order),
            WriteField::Fixed(bytes) => buf.write_front(bytes),
            WriteField::Text(bytes) => {
                buf.write_front(bytes)?;
                buf.write_front_int(bytes.len() as i32, order)
            }
        }
    }
}

impl ReadSlot<'_> {
    /// Wire layout this slot expects
    pub fn codec(&self) -> FieldCodec {
        match self {
            ReadSlot::U8(_) | ReadSlot::I8(_) | ReadSlot::Bool(_) => {
                FieldCodec::Integer { width: 1 }
            }
            ReadSlot::U16(_) | ReadSlot::I16(_) => FieldCodec::Integer { width: 2 },
            ReadSlot::U32(_) | ReadSlot::I32(_) => FieldCodec::Integer { width: 4 },
            ReadSlot::U64(_) | ReadSlot::I64(_) => FieldCodec::Integer { width: 8 },
            ReadSlot::Fixed(bytes) => FieldCodec::FixedBytes { len: bytes.len() },
            ReadSlot::Bytes(_) | ReadSlot::Str(_) | ReadSlot::ExactText(_) => {
                FieldCodec::LengthPrefixedText
            }
        }
    }

    /// Decode one field; on failure nothing is consumed
    fn read(&mut self, buf: &mut DataBuffer, order: ByteOrder) -> BufferResult<usize> {
        match self {
            ReadSlot::U8(slot) => read_into(buf, order, *slot),
            ReadSlot::I8(slot) => read_into(buf, order, *slot),
            ReadSlot::U16(slot) => read_into(buf, order, *slot),
            ReadSlot::I16(slot) => read_into(buf, order, *slot),
            ReadSlot::U32(slot) => read_into(buf, order, *slot),
            ReadSlot::I32(slot) => read_into(buf, order, *slot),
            ReadSlot::U64(slot) => read_into(buf, order, *slot),
            ReadSlot::I64(slot) => read_into(buf, order, *slot),
            ReadSlot::Bool(slot) => read_into(buf, order, *slot),
            ReadSlot::Fixed(slot) => {
                buf.read(slot)?;
                Ok(slot.len())
            }
            ReadSlot::Bytes(slot) => {
                let payload = text_payload(buf, order)?;
                slot.clear();
                slot.extend_from_slice(payload);
                Ok(consume_text(buf, slot.len()))
            }
            ReadSlot::Str(slot) => {
                let payload = text_payload(buf, order)?;
                let text = core::str::from_utf8(payload).map_err(|_| BufferError::InvalidUtf8)?;
                slot.clear();
                slot.push_str(text);
                Ok(consume_text(buf, slot.len()))
            }
            ReadSlot::ExactText(slot) => {
                let len = peek_prefix(buf, order, 0)?;
                if len != slot.len() {
                    return Err(BufferError::TextLengthMismatch {
                        expected: slot.len(),
                        actual: len,
                    });
                }
                let payload = text_payload(buf, order)?;
                slot.copy_from_slice(payload);
                Ok(consume_text(buf, len))
            }
        }
    }
}

#[inline]
fn read_into<T: Integral>(
    buf: &mut DataBuffer,
    order: ByteOrder,
    slot: &mut T,
) -> BufferResult<usize> {
    *slot = buf.read_int(order)?;
    Ok(T::WIDTH)
}

fn peek_prefix(buf: &DataBuffer, order: ByteOrder, offset: usize) -> BufferResult<usize> {
    let data = buf.data();
    let available = data.len().saturating_sub(offset);
    if available < STRING_PREFIX_SIZE {
        return Err(BufferError::InsufficientReadableBytes {
            needed: STRING_PREFIX_SIZE,
            available,
        });
    }
    let mut bytes = [0u8; STRING_PREFIX_SIZE];
    bytes.copy_from_slice(&data[offset..offset + STRING_PREFIX_SIZE]);
    let len = i32::from_order_bytes(bytes, order.resolve(buf.byte_order()));
    usize::try_from(len).map_err(|_| BufferError::NegativeLength(len))
}

// Borrow the payload of the length-prefixed text at the cursor.
fn text_payload(buf: &DataBuffer, order: ByteOrder) -> BufferResult<&[u8]> {
    let len = peek_prefix(buf, order, 0)?;
    let needed = STRING_PREFIX_SIZE + len;
    if buf.size() < needed {
        return Err(BufferError::InsufficientReadableBytes {
            needed,
            available: buf.size(),
        });
    }
    Ok(&buf.data()[STRING_PREFIX_SIZE..needed])
}

#[inline]
fn consume_text(buf: &mut DataBuffer, len: usize) -> usize {
    buf.consume(STRING_PREFIX_SIZE + len);
    STRING_PREFIX_SIZE + len
}

/// Exact number of bytes `fields` occupy on the wire
pub fn batch_write_size(fields: &[WriteField<'_>]) -> usize {
    fields.iter().map(WriteField::wire_size).sum()
}

/// Append `fields` in order
///
/// Only fails when a text is too long for its prefix; that is checked
/// before anything is written.
pub fn batch_write(
    buf: &mut DataBuffer,
    order: ByteOrder,
    fields: &[WriteField<'_>],
) -> BufferResult<()> {
    for field in fields {
        field.check_prefix()?;
    }
    for field in fields {
        field.write_back(buf, order);
    }
    Ok(())
}

/// Insert `fields` in front of the read cursor, keeping their call order
///
/// Writes nothing unless the whole batch fits in the prependable region.
pub fn batch_write_front(
    buf: &mut DataBuffer,
    order: ByteOrder,
    fields: &[WriteField<'_>],
) -> BufferResult<()> {
    for field in fields {
        field.check_prefix()?;
    }
    let needed = batch_write_size(fields);
    if buf.prependable_bytes() < needed {
        return Err(BufferError::InsufficientPrependSpace {
            needed,
            available: buf.prependable_bytes(),
        });
    }
    for field in fields.iter().rev() {
        field.write_front(buf, order)?;
    }
    Ok(())
}

/// Decode into `slots` in order, all or nothing
///
/// On failure the read cursor is restored to where it was before the call.
/// Slots decoded before the failing one keep their new values.
pub fn batch_read(
    buf: &mut DataBuffer,
    order: ByteOrder,
    slots: &mut [ReadSlot<'_>],
) -> BufferResult<()> {
    let mut consumed = 0;
    for slot in slots.iter_mut() {
        match slot.read(buf, order) {
            Ok(n) => consumed += n,
            Err(err) => {
                buf.unconsume(consumed);
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Bytes a batch with the given layouts would consume, without consuming
///
/// Returns 0 when the buffer does not hold a complete batch.
pub fn batch_read_size<I>(buf: &DataBuffer, order: ByteOrder, codecs: I) -> usize
where
    I: IntoIterator<Item = FieldCodec>,
{
    let mut offset = 0;
    for codec in codecs {
        let len = match codec {
            FieldCodec::Integer { width } => width,
            FieldCodec::FixedBytes { len } => len,
            FieldCodec::LengthPrefixedText => match peek_prefix(buf, order, offset) {
                Ok(len) => STRING_PREFIX_SIZE + len,
                Err(_) => return 0,
            },
        };
        offset += len;
        if offset > buf.size() {
            return 0;
        }
    }
    offset
}

/// Append a list of values to a buffer as one batch
///
/// Each value is converted with `WriteField::from`.
#[macro_export]
macro_rules! write_fields {
    ($buf:expr, $order:expr; $($field:expr),+ $(,)?) => {
        $crate::batch::batch_write($buf, $order, &[$($crate::batch::WriteField::from($field)),+])
    };
}

/// Decode a buffer into a list of `&mut` destinations as one batch
///
/// Each destination is converted with `ReadSlot::from`.
#[macro_export]
macro_rules! read_fields {
    ($buf:expr, $order:expr; $($slot:expr),+ $(,)?) => {
        $crate::batch::batch_read($buf, $order, &mut [$($crate::batch::ReadSlot::from($slot)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_write_size() {
        let fields = [
            WriteField::U32(1),
            WriteField::Bool(true),
            WriteField::Fixed(b"ABCD"),
            WriteField::Text(b"hi"),
        ];
        assert_eq!(batch_write_size(&fields), 4 + 1 + 4 + 4 + 2);
    }

    #[test]
    fn test_batch_round_trip() {
        let mut buf = DataBuffer::new();
        let name = "AAPL".to_string();
        write_fields!(&mut buf, ByteOrder::Big; 42u32, -5i16, &name, b"XY").unwrap();

        let mut id = 0u32;
        let mut delta = 0i16;
        let mut text = String::new();
        let mut tag = [0u8; 2];
        read_fields!(&mut buf, ByteOrder::Big; &mut id, &mut delta, &mut text, &mut tag).unwrap();

        assert_eq!(id, 42);
        assert_eq!(delta, -5);
        assert_eq!(text, "AAPL");
        assert_eq!(&tag, b"XY");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_batch_read_rolls_back() {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, ByteOrder::Big; 7u32, 1u8).unwrap();
        let before = buf.to_vec();

        let mut a = 0u32;
        let mut b = 0u64;
        let err = read_fields!(&mut buf, ByteOrder::Big; &mut a, &mut b).unwrap_err();
        assert!(matches!(err, BufferError::InsufficientReadableBytes { needed: 8, .. }));
        assert_eq!(buf.to_vec(), before);
        assert_eq!(a, 7);
    }

    #[test]
    fn test_exact_text_length_mismatch_rolls_back() {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, ByteOrder::Little; 3u16, "abcde").unwrap();
        let before = buf.to_vec();

        let mut n = 0u16;
        let mut slot = [0u8; 4];
        let err = batch_read(
            &mut buf,
            ByteOrder::Little,
            &mut [ReadSlot::from(&mut n), ReadSlot::ExactText(&mut slot)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BufferError::TextLengthMismatch {
                expected: 4,
                actual: 5
            }
        );
        assert_eq!(buf.to_vec(), before);
    }

    #[test]
    fn test_exact_text() {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, ByteOrder::Big; "abcd").unwrap();
        let mut slot = [0u8; 4];
        batch_read(&mut buf, ByteOrder::Big, &mut [ReadSlot::ExactText(&mut slot)]).unwrap();
        assert_eq!(&slot, b"abcd");
    }

    #[test]
    fn test_write_front_keeps_call_order() {
        let mut buf = DataBuffer::with_capacity(16, 16);
        buf.write(b"body");
        batch_write_front(
            &mut buf,
            ByteOrder::Big,
            &[WriteField::U16(0x0102), WriteField::Text(b"ab")],
        )
        .unwrap();
        assert_eq!(buf.data(), &[1, 2, 0, 0, 0, 2, b'a', b'b', b'b', b'o', b'd', b'y']);
    }

    #[test]
    fn test_write_front_is_atomic() {
        let mut buf = DataBuffer::with_capacity(16, 4);
        buf.write(b"body");
        let err = batch_write_front(
            &mut buf,
            ByteOrder::Big,
            &[WriteField::U16(1), WriteField::U32(2)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BufferError::InsufficientPrependSpace {
                needed: 6,
                available: 4
            }
        );
        assert_eq!(buf.data(), b"body");
        assert_eq!(buf.prependable_bytes(), 4);
    }

    #[test]
    fn test_read_size() {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, ByteOrder::Big; 1u32, "hello", 2u8).unwrap();
        let layout = [
            FieldCodec::Integer { width: 4 },
            FieldCodec::LengthPrefixedText,
            FieldCodec::Integer { width: 1 },
        ];
        assert_eq!(batch_read_size(&buf, ByteOrder::Big, layout), 14);
        assert_eq!(buf.size(), 14);

        buf.uncommit(1);
        assert_eq!(batch_read_size(&buf, ByteOrder::Big, layout), 0);
    }

    #[test]
    fn test_bytes_slot_replaces_contents() {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, ByteOrder::Big; "new").unwrap();
        let mut bytes = vec![9u8; 10];
        read_fields!(&mut buf, ByteOrder::Big; &mut bytes).unwrap();
        assert_eq!(bytes, b"new");
    }

    #[test]
    fn test_codec_for_kind() {
        assert_eq!(
            FieldCodec::for_kind(PrimitiveKind::UInt32, 4),
            FieldCodec::Integer { width: 4 }
        );
        assert_eq!(
            FieldCodec::for_kind(PrimitiveKind::FixArray, 12),
            FieldCodec::FixedBytes { len: 12 }
        );
        assert_eq!(
            FieldCodec::for_kind(PrimitiveKind::String, u32::MAX),
            FieldCodec::LengthPrefixedText
        );
    }
}
