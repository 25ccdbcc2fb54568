//! Validated schema model
//!
//! Built once by [`SchemaValidator`](super::SchemaValidator) and read-only
//! afterwards. Every definition is stored in declaration order with a name
//! index beside it; inheritance is recorded as a parent index resolved at
//! load time.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::batch::FieldCodec;
use crate::catalog::PrimitiveKind;
use crate::endian::ByteOrder;

/// User type alias over a primitive kind
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct TypeDef {
    /// Unique name
    pub name: String,
    /// Underlying kind
    pub primitive: PrimitiveKind,
    /// Catalog width, FIXARRAY element count, or the unbounded STRING sentinel
    pub length: u32,
    /// Free-form description
    pub description: String,
}

impl TypeDef {
    /// Encoded size of a value of this type, if fixed
    #[inline]
    pub fn wire_size(&self) -> Option<u32> {
        wire_size(self.primitive, self.length)
    }

    /// Wire layout of a value of this type
    #[inline]
    pub fn codec(&self) -> FieldCodec {
        FieldCodec::for_kind(self.primitive, self.length)
    }
}

/// How a field repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub enum FieldKind {
    /// Single value (`Field` tag)
    Primitive,
    /// Repeated value (`Sequence` tag)
    Sequence,
}

impl FieldKind {
    /// Numeric code handed to templates (0 primitive, 1 sequence)
    #[inline]
    pub const fn code(&self) -> u8 {
        match self {
            FieldKind::Primitive => 0,
            FieldKind::Sequence => 1,
        }
    }
}

/// What a field's type reference resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub enum FieldTarget {
    /// A built-in kind named directly
    Primitive(PrimitiveKind),
    /// A user type alias
    Alias {
        /// Index into [`SchemaModel::types`]
        index: usize,
        /// The alias's underlying kind
        primitive: PrimitiveKind,
    },
    /// A previously declared message (sequences only)
    Message(usize),
}

impl FieldTarget {
    /// Underlying primitive kind, unless the target is a message
    #[inline]
    pub const fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            FieldTarget::Primitive(kind) | FieldTarget::Alias { primitive: kind, .. } => {
                Some(*kind)
            }
            FieldTarget::Message(_) => None,
        }
    }
}

/// One field of a message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct FieldDef {
    /// Single or repeated
    pub kind: FieldKind,
    /// Field name, unique within its message
    pub name: String,
    /// Type reference as declared
    pub type_ref: String,
    /// Resolved target of `type_ref`
    pub target: FieldTarget,
    /// Resolved length (width, element count or unbounded sentinel; 0 for messages)
    pub length: u32,
    /// Free-form description
    pub description: String,
}

impl FieldDef {
    /// Underlying primitive kind, unless the field holds messages
    #[inline]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.target.primitive()
    }

    /// Encoded size, if it does not depend on the value
    ///
    /// `None` for STRING and for sequences.
    pub fn wire_size(&self) -> Option<u32> {
        match (self.kind, self.primitive()) {
            (FieldKind::Primitive, Some(kind)) => wire_size(kind, self.length),
            _ => None,
        }
    }

    /// Wire layout of one element of this field, unless it holds messages
    pub fn codec(&self) -> Option<FieldCodec> {
        self.primitive()
            .map(|kind| FieldCodec::for_kind(kind, self.length))
    }
}

/// A message declaration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct MessageDef {
    /// Unique name
    pub name: String,
    /// Wire id; 0 means none
    pub id: u32,
    /// Parent message name, as declared
    pub inherits: Option<String>,
    /// Index of the parent in [`SchemaModel::messages`]
    pub parent: Option<usize>,
    /// Free-form description
    pub description: String,
    /// Own fields in declaration order (parents' fields are not merged in)
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    /// Field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Encoded size of the own fields when every one of them is fixed
    pub fn fixed_wire_size(&self) -> Option<u32> {
        self.fields
            .iter()
            .try_fold(0u32, |total, field| total.checked_add(field.wire_size()?))
    }
}

/// One named value of a constant group
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ConstValue {
    /// Name, unique within its group
    pub name: String,
    /// Trimmed value text, validated against the group kind
    pub raw_value: String,
    /// The group's declared type reference
    pub primitive_type: String,
    /// The group's resolved length
    pub length: u32,
    /// Free-form description
    pub description: String,
}

/// A named group of constant values sharing one type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ConstGroup {
    /// Unique name
    pub name: String,
    /// Declared type reference (alias or raw kind)
    pub primitive_type: String,
    /// Resolved original kind values were checked against
    pub primitive: PrimitiveKind,
    /// Width, FIXARRAY length, or STRING limit
    pub length: u32,
    /// Free-form description
    pub description: String,
    /// Values in declaration order
    pub values: Vec<ConstValue>,
}

impl ConstGroup {
    /// Value by name
    pub fn value(&self, name: &str) -> Option<&ConstValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// The validated set of types, messages and constants
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct SchemaModel {
    byte_order: ByteOrder,
    types: Vec<TypeDef>,
    messages: Vec<MessageDef>,
    const_groups: Vec<ConstGroup>,
    #[cfg_attr(feature = "std", serde(skip))]
    type_index: BTreeMap<String, usize>,
    #[cfg_attr(feature = "std", serde(skip))]
    message_index: BTreeMap<String, usize>,
    #[cfg_attr(feature = "std", serde(skip))]
    id_index: BTreeMap<u32, usize>,
    #[cfg_attr(feature = "std", serde(skip))]
    const_index: BTreeMap<String, usize>,
}

impl SchemaModel {
    pub(crate) fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ..Self::default()
        }
    }

    /// Wire byte order declared by the schema
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// User types in declaration order
    #[inline]
    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    /// Messages in declaration order
    #[inline]
    pub fn messages(&self) -> &[MessageDef] {
        &self.messages
    }

    /// Constant groups in declaration order
    #[inline]
    pub fn const_groups(&self) -> &[ConstGroup] {
        &self.const_groups
    }

    /// User type by name
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.type_index.get(name).map(|&i| &self.types[i])
    }

    /// Message by name
    pub fn message(&self, name: &str) -> Option<&MessageDef> {
        self.message_index.get(name).map(|&i| &self.messages[i])
    }

    /// Message by non-zero wire id
    pub fn message_by_id(&self, id: u32) -> Option<&MessageDef> {
        self.id_index.get(&id).map(|&i| &self.messages[i])
    }

    /// Constant group by name
    pub fn const_group(&self, name: &str) -> Option<&ConstGroup> {
        self.const_index.get(name).map(|&i| &self.const_groups[i])
    }

    /// Inheritance chain of `name`, starting with the message itself
    ///
    /// Empty when no such message exists.
    pub fn lineage<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a MessageDef> + 'a {
        core::iter::successors(self.message(name), move |msg| {
            msg.parent.map(|i| &self.messages[i])
        })
    }

    pub(crate) fn type_index_of(&self, name: &str) -> Option<usize> {
        self.type_index.get(name).copied()
    }

    pub(crate) fn message_index_of(&self, name: &str) -> Option<usize> {
        self.message_index.get(name).copied()
    }

    pub(crate) fn message_with_id(&self, id: u32) -> Option<&str> {
        self.message_by_id(id).map(|m| m.name.as_str())
    }

    pub(crate) fn has_const_group(&self, name: &str) -> bool {
        self.const_index.contains_key(name)
    }

    pub(crate) fn push_type(&mut self, def: TypeDef) {
        self.type_index.insert(def.name.clone(), self.types.len());
        self.types.push(def);
    }

    pub(crate) fn push_message(&mut self, def: MessageDef) {
        let index = self.messages.len();
        self.message_index.insert(def.name.clone(), index);
        if def.id != 0 {
            self.id_index.insert(def.id, index);
        }
        self.messages.push(def);
    }

    pub(crate) fn push_const_group(&mut self, def: ConstGroup) {
        self.const_index.insert(def.name.clone(), self.const_groups.len());
        self.const_groups.push(def);
    }
}

fn wire_size(kind: PrimitiveKind, length: u32) -> Option<u32> {
    match kind {
        PrimitiveKind::String => None,
        PrimitiveKind::FixArray => Some(length),
        other => other.width(),
    }
}
