//! Error types for the wireschema buffer, codec and schema engine

use alloc::string::String;

use thiserror::Error;

/// Recoverable failures of the buffer and codec layers
///
/// These are signaled to the immediate caller and never leave partial state
/// behind: a failed read consumes nothing and a failed prepend writes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Fewer unread bytes than the operation requires
    #[error("insufficient readable bytes: need {needed}, have {available}")]
    InsufficientReadableBytes {
        /// Bytes the operation needed
        needed: usize,
        /// Bytes available to read
        available: usize,
    },

    /// The reserved front region cannot hold the prepended payload
    #[error("insufficient prepend space: need {needed}, have {available}")]
    InsufficientPrependSpace {
        /// Bytes the prepend needed
        needed: usize,
        /// Bytes available in front of the read cursor
        available: usize,
    },

    /// A fixed-length text slot received a different wire length
    #[error("text length mismatch: slot holds {expected} bytes, wire prefix says {actual}")]
    TextLengthMismatch {
        /// Length of the destination slot
        expected: usize,
        /// Length decoded from the wire prefix
        actual: usize,
    },

    /// A length prefix decoded to a negative count
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    /// Text is too long to describe with a signed 32-bit prefix
    #[error("text of {0} bytes exceeds the 32-bit length prefix")]
    TextTooLong(usize),

    /// A UTF-8 string slot received invalid bytes
    #[error("text is not valid UTF-8")]
    InvalidUtf8,
}

/// Schema validation failures
///
/// The validator stops at the first violation, so one error describes one
/// declaration and the rule it broke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A declaration names a primitive kind outside the catalog
    #[error("{owner}: unknown primitive type '{primitive}'")]
    UnknownPrimitiveType {
        /// Declaration carrying the bad kind
        owner: String,
        /// The unrecognized kind text
        primitive: String,
    },

    /// A FIXARRAY declaration has no `length` attribute
    #[error("{owner}: FIXARRAY requires a length")]
    MissingArrayLength {
        /// Declaration missing the length
        owner: String,
    },

    /// A FIXARRAY declaration has a zero or negative `length`
    #[error("{owner}: FIXARRAY length must be positive, got {length}")]
    InvalidArrayLength {
        /// Declaration with the bad length
        owner: String,
        /// The declared length
        length: i64,
    },

    /// Type name already present in the catalog (built-ins included)
    #[error("type '{0}' has already been defined")]
    DuplicateTypeName(String),

    /// Message name declared twice
    #[error("message '{0}' has already been defined")]
    DuplicateMessageName(String),

    /// Non-zero message id declared twice
    #[error("message id {id} of '{message}' is already used by '{existing}'")]
    DuplicateMessageId {
        /// The reused id
        id: u32,
        /// Message declaring the id second
        message: String,
        /// Message that claimed the id first
        existing: String,
    },

    /// `inherits` names a message not declared earlier
    #[error("message '{message}' inherits unknown message '{parent}'")]
    DanglingInheritance {
        /// The inheriting message
        message: String,
        /// The missing parent
        parent: String,
    },

    /// A message child is neither `Field` nor `Sequence`
    #[error("message '{message}': unknown field tag '{tag}'")]
    UnknownFieldTag {
        /// The enclosing message
        message: String,
        /// The unrecognized tag
        tag: String,
    },

    /// A field's type reference resolves to nothing
    #[error("message '{message}' field '{field}': unresolved type '{type_ref}'")]
    UnresolvedFieldType {
        /// The enclosing message
        message: String,
        /// The offending field
        field: String,
        /// The type reference that failed to resolve
        type_ref: String,
    },

    /// Two fields of one message share a name
    #[error("message '{message}': field '{field}' has already been defined")]
    DuplicateFieldName {
        /// The enclosing message
        message: String,
        /// The repeated field name
        field: String,
    },

    /// A constant's text does not parse for its kind
    #[error("constant {group}.{value}: '{text}' is not a valid {primitive}")]
    InvalidConstantValue {
        /// Constant group
        group: String,
        /// Constant value name
        value: String,
        /// The raw text
        text: String,
        /// Kind the text was checked against
        primitive: &'static str,
    },

    /// A constant parses but falls outside its kind's range
    #[error("constant {group}.{value}: {text} is out of range for {primitive}")]
    ConstantValueOutOfRange {
        /// Constant group
        group: String,
        /// Constant value name
        value: String,
        /// The raw text
        text: String,
        /// Kind the text was checked against
        primitive: &'static str,
    },

    /// A fixed-length constant is longer than its declared length
    #[error("constant {group}.{value}: {actual} bytes exceed length {limit}")]
    ConstantValueTooLong {
        /// Constant group
        group: String,
        /// Constant value name
        value: String,
        /// Encoded bytes in the value
        actual: usize,
        /// Declared maximum
        limit: u32,
    },

    /// Constant group name declared twice
    #[error("constant group '{0}' has already been defined")]
    DuplicateConstantName(String),

    /// Two values of one constant group share a name
    #[error("constant group '{group}': value '{value}' has already been defined")]
    DuplicateConstantValue {
        /// Constant group
        group: String,
        /// The repeated value name
        value: String,
    },

    /// A declaration node lacks a required attribute
    #[error("<{tag}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Tag of the node
        tag: String,
        /// Attribute name
        attribute: String,
    },

    /// An attribute does not parse as the expected type
    #[error("<{tag}> attribute '{attribute}' has invalid value '{value}'")]
    InvalidAttribute {
        /// Tag of the node
        tag: String,
        /// Attribute name
        attribute: String,
        /// The raw value
        value: String,
    },
}

impl SchemaError {
    /// Short name of the rule that was broken
    pub const fn rule(&self) -> &'static str {
        match self {
            SchemaError::UnknownPrimitiveType { .. } => "unknown-primitive-type",
            SchemaError::MissingArrayLength { .. } => "missing-array-length",
            SchemaError::InvalidArrayLength { .. } => "invalid-array-length",
            SchemaError::DuplicateTypeName(_) => "duplicate-type-name",
            SchemaError::DuplicateMessageName(_) => "duplicate-message-name",
            SchemaError::DuplicateMessageId { .. } => "duplicate-message-id",
            SchemaError::DanglingInheritance { .. } => "dangling-inheritance",
            SchemaError::UnknownFieldTag { .. } => "unknown-field-tag",
            SchemaError::UnresolvedFieldType { .. } => "unresolved-field-type",
            SchemaError::DuplicateFieldName { .. } => "duplicate-field-name",
            SchemaError::InvalidConstantValue { .. } => "invalid-constant-value",
            SchemaError::ConstantValueOutOfRange { .. } => "constant-value-out-of-range",
            SchemaError::ConstantValueTooLong { .. } => "constant-value-too-long",
            SchemaError::DuplicateConstantName(_) => "duplicate-constant-name",
            SchemaError::DuplicateConstantValue { .. } => "duplicate-constant-value",
            SchemaError::MissingAttribute { .. } => "missing-attribute",
            SchemaError::InvalidAttribute { .. } => "invalid-attribute",
        }
    }
}

/// Top-level error for wireschema operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer or codec failure
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Schema validation failure
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Declaration document could not be read or parsed
    #[cfg(feature = "std")]
    #[error("source error for '{origin}': {reason}")]
    Source {
        /// Path or label of the document
        origin: String,
        /// What went wrong
        reason: String,
    },

    /// The template engine failed on one template
    #[cfg(feature = "std")]
    #[error("render error in template '{template}': {reason}")]
    Render {
        /// Template name
        template: String,
        /// Engine message
        reason: String,
    },
}

/// Result type alias for wireschema operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for buffer and codec operations
pub type BufferResult<T> = core::result::Result<T, BufferError>;
