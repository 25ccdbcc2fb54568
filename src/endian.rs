//! Byte order selection and fixed-width integral conversion
//!
//! Every multi-byte value crossing the buffer goes through [`Integral`], which
//! converts to and from a byte array in the requested [`ByteOrder`].

use core::fmt;
use core::str::FromStr;

/// Byte order of an integral read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum ByteOrder {
    /// Host byte order
    #[default]
    Native,
    /// Little-endian
    Little,
    /// Big-endian (network order)
    Big,
    /// Defer to the buffer's configured default order
    Runtime,
}

impl ByteOrder {
    /// Resolve `Runtime` against a buffer default
    ///
    /// A default that is itself `Runtime` falls back to native order.
    #[inline]
    pub const fn resolve(self, default: ByteOrder) -> ByteOrder {
        match self {
            ByteOrder::Runtime => match default {
                ByteOrder::Runtime => ByteOrder::Native,
                other => other,
            },
            other => other,
        }
    }

    /// Map the numeric codes of the declaration format (0 native, 1 big, 2 little)
    pub const fn from_code(code: i64) -> Option<ByteOrder> {
        match code {
            0 => Some(ByteOrder::Native),
            1 => Some(ByteOrder::Big),
            2 => Some(ByteOrder::Little),
            _ => None,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ByteOrder::Native => "native",
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
            ByteOrder::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// Error returned when text names no byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownByteOrder;

impl FromStr for ByteOrder {
    type Err = UnknownByteOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") {
            Ok(ByteOrder::Native)
        } else if s.eq_ignore_ascii_case("little") || s.eq_ignore_ascii_case("le") {
            Ok(ByteOrder::Little)
        } else if s.eq_ignore_ascii_case("big")
            || s.eq_ignore_ascii_case("be")
            || s.eq_ignore_ascii_case("network")
        {
            Ok(ByteOrder::Big)
        } else {
            s.parse::<i64>()
                .ok()
                .and_then(ByteOrder::from_code)
                .ok_or(UnknownByteOrder)
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width values the codec can place on the wire
///
/// Sealed: implemented for the 8/16/32/64-bit integers and `bool`.
pub trait Integral: Copy + Default + sealed::Sealed {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Byte array holding one encoded value
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Encode in a concrete order (`Runtime` is treated as native)
    fn to_order_bytes(self, order: ByteOrder) -> Self::Bytes;

    /// Decode from exactly `WIDTH` bytes in a concrete order
    fn from_order_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self;
}

macro_rules! impl_integral {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Integral for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();
                type Bytes = [u8; core::mem::size_of::<$ty>()];

                #[inline]
                fn to_order_bytes(self, order: ByteOrder) -> Self::Bytes {
                    match order {
                        ByteOrder::Big => self.to_be_bytes(),
                        ByteOrder::Little => self.to_le_bytes(),
                        ByteOrder::Native | ByteOrder::Runtime => self.to_ne_bytes(),
                    }
                }

                #[inline]
                fn from_order_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self {
                    match order {
                        ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                        ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                        ByteOrder::Native | ByteOrder::Runtime => <$ty>::from_ne_bytes(bytes),
                    }
                }
            }
        )*
    };
}

impl_integral!(u8, i8, u16, i16, u32, i32, u64, i64);

impl sealed::Sealed for bool {}

impl Integral for bool {
    const WIDTH: usize = 1;
    type Bytes = [u8; 1];

    #[inline]
    fn to_order_bytes(self, _order: ByteOrder) -> Self::Bytes {
        [self as u8]
    }

    // Any non-zero byte reads as true.
    #[inline]
    fn from_order_bytes(bytes: Self::Bytes, _order: ByteOrder) -> Self {
        bytes[0] != 0
    }
}
