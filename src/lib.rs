//! wireschema: schema-driven binary protocol toolkit
//!
//! Message layouts are declared once (types, messages, constant groups),
//! validated into a [`SchemaModel`], and encoded at runtime with an
//! endian-aware codec over a growable [`DataBuffer`]. Both halves share the
//! [`TypeCatalog`] of primitive kinds, so a field resolved to `UINT32` by the
//! schema is exactly four bytes on the wire.
//!
//! # Wire Format
//!
//! ```text
//! CHAR UCHAR BOOL INT8 UINT8        1 byte
//! INT16 UINT16                      2 bytes, schema byte order (big by default)
//! INT32 UINT32                      4 bytes
//! INT64 UINT64                      8 bytes
//! FIXARRAY(n)                       n raw bytes, no prefix
//! STRING                            i32 length prefix | bytes
//! ```
//!
//! # Buffer Layout
//!
//! ```text
//! +-------------------+------------------+------------------+
//! | prependable bytes | readable bytes   | writable bytes   |
//! +-------------------+------------------+------------------+
//! 0             read cursor        write cursor        capacity
//! ```
//!
//! # Features
//!
//! - `no_std` core with `alloc`: buffer, codec, batch codec and validator
//! - All-or-nothing batch decode with cursor rollback
//! - Cheap header prepends through a reserved front region
//! - `std` (default): YAML/JSON declaration loading and template hand-off
//! - `cli`: the `wireschema` command-line tool
//!
//! # Example
//!
//! ```rust
//! use wireschema::schema::DeclNode;
//! use wireschema::*;
//!
//! let root = DeclNode::new("File")
//!     .with_child(DeclNode::new("Types").with_child(
//!         DeclNode::new("Type")
//!             .with_attr("name", "ID")
//!             .with_attr("primitive_type", "UINT32"),
//!     ))
//!     .with_child(DeclNode::new("Messages").with_child(
//!         DeclNode::new("Message")
//!             .with_attr("name", "Ping")
//!             .with_attr("id", 1)
//!             .with_child(
//!                 DeclNode::new("Field")
//!                     .with_attr("name", "seq")
//!                     .with_attr("primitive_type", "ID"),
//!             ),
//!     ));
//!
//! let model = SchemaValidator::new(TypeCatalog::standard()).validate(&root)?;
//! let ping = model.message_by_id(1).unwrap();
//! assert_eq!(ping.fixed_wire_size(), Some(4));
//!
//! let mut buf = DataBuffer::new();
//! Encoder::with_order(&mut buf, model.byte_order()).put_u32(42);
//! let seq = Decoder::with_order(&mut buf, model.byte_order()).get_u32()?;
//! assert_eq!(seq, 42);
//! # Ok::<(), wireschema::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod batch;
pub mod buffer;
pub mod catalog;
pub mod decoder;
pub mod encoder;
pub mod endian;
pub mod error;
pub mod schema;

// Re-export main types
pub use batch::{
    batch_read, batch_read_size, batch_write, batch_write_front, batch_write_size, FieldCodec,
    ReadSlot, WriteField,
};
pub use buffer::{BufferConfig, DataBuffer};
pub use catalog::{PrimitiveKind, TypeCatalog};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use endian::{ByteOrder, Integral};
pub use error::{BufferError, BufferResult, Error, Result, SchemaError};
pub use schema::{SchemaModel, SchemaValidator};

/// Bytes reserved in front of the payload by default
pub const DEFAULT_PREPEND_SIZE: usize = 8;

/// Writable bytes of a freshly created buffer
pub const DEFAULT_INITIAL_SIZE: usize = 256;

/// Length recorded for STRING declarations, which have no upper bound
pub const UNBOUNDED_LENGTH: u32 = u32::MAX;

/// Size of the STRING length prefix
pub const STRING_PREFIX_SIZE: usize = 4;

/// Wire byte order used when nothing else is configured
pub const DEFAULT_WIRE_ORDER: ByteOrder = ByteOrder::Big;
