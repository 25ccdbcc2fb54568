//! Primitive kinds and their wire widths
//!
//! This table is the contract shared by the schema engine and the codec:
//! a field resolved to a kind here is encoded with exactly that many bytes.

use core::fmt;
use core::str::FromStr;

/// Built-in wire kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
#[cfg_attr(feature = "std", serde(rename_all = "UPPERCASE"))]
pub enum PrimitiveKind {
    /// Signed character (1 byte)
    Char,
    /// Unsigned character (1 byte)
    UChar,
    /// Boolean (1 byte)
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// Length-prefixed byte string
    String,
    /// Fixed-length raw byte array
    FixArray,
}

impl PrimitiveKind {
    /// Every kind, in catalog order
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Char,
        PrimitiveKind::UChar,
        PrimitiveKind::Bool,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::String,
        PrimitiveKind::FixArray,
    ];

    /// Declaration spelling of the kind
    pub const fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Char => "CHAR",
            PrimitiveKind::UChar => "UCHAR",
            PrimitiveKind::Bool => "BOOL",
            PrimitiveKind::Int8 => "INT8",
            PrimitiveKind::UInt8 => "UINT8",
            PrimitiveKind::Int16 => "INT16",
            PrimitiveKind::UInt16 => "UINT16",
            PrimitiveKind::Int32 => "INT32",
            PrimitiveKind::UInt32 => "UINT32",
            PrimitiveKind::Int64 => "INT64",
            PrimitiveKind::UInt64 => "UINT64",
            PrimitiveKind::String => "STRING",
            PrimitiveKind::FixArray => "FIXARRAY",
        }
    }

    /// Byte width for fixed-width kinds; `None` for STRING and FIXARRAY
    pub const fn width(&self) -> Option<u32> {
        match self {
            PrimitiveKind::Char
            | PrimitiveKind::UChar
            | PrimitiveKind::Bool
            | PrimitiveKind::Int8
            | PrimitiveKind::UInt8 => Some(1),
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => Some(2),
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 => Some(4),
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 => Some(8),
            PrimitiveKind::String | PrimitiveKind::FixArray => None,
        }
    }

    /// True for kinds whose width is carried per declaration
    #[inline]
    pub const fn is_variable(&self) -> bool {
        self.width().is_none()
    }

    /// Inclusive numeric range for the integer-valued kinds
    ///
    /// CHAR, BOOL, STRING and FIXARRAY have their own textual rules and
    /// return `None`.
    pub const fn integer_range(&self) -> Option<(i128, i128)> {
        match self {
            PrimitiveKind::UChar | PrimitiveKind::UInt8 => Some((0, u8::MAX as i128)),
            PrimitiveKind::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            PrimitiveKind::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            PrimitiveKind::UInt16 => Some((0, u16::MAX as i128)),
            PrimitiveKind::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            PrimitiveKind::UInt32 => Some((0, u32::MAX as i128)),
            PrimitiveKind::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            PrimitiveKind::UInt64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when text names no primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownKind;

impl FromStr for PrimitiveKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or(UnknownKind)
    }
}

const STANDARD_KINDS: &[PrimitiveKind] = &PrimitiveKind::ALL;

/// The fixed table of primitive kinds handed to the validator
///
/// Built once and never mutated; its names are reserved and cannot be
/// reused by user type aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCatalog {
    kinds: &'static [PrimitiveKind],
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeCatalog {
    /// Catalog holding every built-in kind
    pub const fn standard() -> Self {
        Self {
            kinds: STANDARD_KINDS,
        }
    }

    /// Resolve a kind by its declaration spelling
    pub fn lookup(&self, name: &str) -> Option<PrimitiveKind> {
        self.kinds.iter().copied().find(|kind| kind.name() == name)
    }

    /// True if `name` is a built-in kind name
    #[inline]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Catalog width of `kind`, if it is fixed
    #[inline]
    pub fn width(&self, kind: PrimitiveKind) -> Option<u32> {
        kind.width()
    }

    /// Iterate the catalog in declaration order
    pub fn iter(&self) -> impl Iterator<Item = PrimitiveKind> + '_ {
        self.kinds.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_match_wire_contract() {
        assert_eq!(PrimitiveKind::Char.width(), Some(1));
        assert_eq!(PrimitiveKind::Bool.width(), Some(1));
        assert_eq!(PrimitiveKind::Int16.width(), Some(2));
        assert_eq!(PrimitiveKind::UInt32.width(), Some(4));
        assert_eq!(PrimitiveKind::Int64.width(), Some(8));
        assert_eq!(PrimitiveKind::String.width(), None);
        assert_eq!(PrimitiveKind::FixArray.width(), None);
    }

    #[test]
    fn test_names_parse_back() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.name().parse::<PrimitiveKind>(), Ok(kind));
        }
        assert_eq!("uint32".parse::<PrimitiveKind>(), Err(UnknownKind));
        assert_eq!("FLOAT".parse::<PrimitiveKind>(), Err(UnknownKind));
    }

    #[test]
    fn test_catalog_reserves_builtin_names() {
        let catalog = TypeCatalog::standard();
        assert!(catalog.is_reserved("UINT32"));
        assert!(catalog.is_reserved("FIXARRAY"));
        assert!(!catalog.is_reserved("ID"));
        assert_eq!(catalog.iter().count(), 13);
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(PrimitiveKind::UInt8.integer_range(), Some((0, 255)));
        assert_eq!(PrimitiveKind::Int8.integer_range(), Some((-128, 127)));
        assert_eq!(PrimitiveKind::Char.integer_range(), None);
        assert_eq!(PrimitiveKind::Bool.integer_range(), None);
    }
}
