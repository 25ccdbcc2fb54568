//! Rule engine that turns a declaration tree into a [`SchemaModel`]
//!
//! Three passes run in declaration order: types, messages, then constants.
//! The first broken rule ends validation and no model is returned.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::format;

use tracing::{debug, info, warn};

use super::constant::check_value;
use super::decl::DeclNode;
use super::model::{
    ConstGroup, ConstValue, FieldDef, FieldKind, FieldTarget, MessageDef, SchemaModel, TypeDef,
};
use crate::catalog::{PrimitiveKind, TypeCatalog};
use crate::endian::ByteOrder;
use crate::error::SchemaError;
use crate::{DEFAULT_WIRE_ORDER, UNBOUNDED_LENGTH};

/// Group holding type aliases
pub const TYPES_GROUP: &str = "Types";
/// Group holding messages
pub const MESSAGES_GROUP: &str = "Messages";
/// Group holding constant groups
pub const CONSTANTS_GROUP: &str = "Constants";
/// Tag of a type declaration
pub const TYPE_TAG: &str = "Type";
/// Tag of a single-valued message field
pub const FIELD_TAG: &str = "Field";
/// Tag of a repeated message field
pub const SEQUENCE_TAG: &str = "Sequence";

const ATTR_NAME: &str = "name";
const ATTR_PRIMITIVE: &str = "primitive_type";
const ATTR_DESCRIPTION: &str = "description";
const ATTR_LENGTH: &str = "length";
const ATTR_ID: &str = "id";
const ATTR_INHERITS: &str = "inherits";
const ATTR_ENDIAN: &str = "endian";

/// Validates declaration trees against a primitive catalog
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    catalog: TypeCatalog,
}

impl SchemaValidator {
    /// Validator over `catalog`
    pub fn new(catalog: TypeCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog in use
    #[inline]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Validate a whole document
    ///
    /// `root` carries an optional `endian` attribute and the `Types`,
    /// `Messages` and `Constants` groups as children; a missing group is
    /// treated as empty.
    pub fn validate(&self, root: &DeclNode) -> Result<SchemaModel, SchemaError> {
        let byte_order = root
            .get_optional::<ByteOrder>(ATTR_ENDIAN)
            .map_err(rejected)?
            .unwrap_or(DEFAULT_WIRE_ORDER);
        let mut model = SchemaModel::new(byte_order);

        if let Some(group) = root.child(TYPES_GROUP) {
            for node in group.children() {
                if node.tag != TYPE_TAG {
                    debug!(tag = %node.tag, "skipping non-type node");
                    continue;
                }
                self.add_type(&mut model, node)?;
            }
        }

        if let Some(group) = root.child(MESSAGES_GROUP) {
            for node in group.children() {
                self.add_message(&mut model, node)?;
            }
        }

        if let Some(group) = root.child(CONSTANTS_GROUP) {
            for node in group.children() {
                self.add_const_group(&mut model, node)?;
            }
        }

        info!(
            types = model.types().len(),
            messages = model.messages().len(),
            constants = model.const_groups().len(),
            byte_order = %model.byte_order(),
            "schema validated"
        );
        Ok(model)
    }

    fn add_type(&self, model: &mut SchemaModel, node: &DeclNode) -> Result<(), SchemaError> {
        let name: String = node.get(ATTR_NAME).map_err(rejected)?;
        let primitive_text: String = node.get(ATTR_PRIMITIVE).map_err(rejected)?;
        let description = description_of(node)?;

        let primitive = self.primitive(&name, &primitive_text)?;
        let length = self.resolve_length(&name, primitive, node)?;

        if self.catalog.is_reserved(&name) || model.type_def(&name).is_some() {
            return Err(rejected(SchemaError::DuplicateTypeName(name)));
        }

        debug!(name = %name, primitive = %primitive, length, "type accepted");
        model.push_type(TypeDef {
            name,
            primitive,
            length,
            description,
        });
        Ok(())
    }

    fn add_message(&self, model: &mut SchemaModel, node: &DeclNode) -> Result<(), SchemaError> {
        let name: String = node.get(ATTR_NAME).map_err(rejected)?;
        let id = node
            .get_optional::<u32>(ATTR_ID)
            .map_err(rejected)?
            .unwrap_or(0);
        let inherits: Option<String> = node.get_optional(ATTR_INHERITS).map_err(rejected)?;
        let description = description_of(node)?;

        let parent = match &inherits {
            Some(parent) => match model.message_index_of(parent) {
                Some(index) => Some(index),
                None => {
                    return Err(rejected(SchemaError::DanglingInheritance {
                        message: name,
                        parent: parent.clone(),
                    }))
                }
            },
            None => None,
        };

        if model.message(&name).is_some() {
            return Err(rejected(SchemaError::DuplicateMessageName(name)));
        }
        if id != 0 {
            if let Some(existing) = model.message_with_id(id) {
                return Err(rejected(SchemaError::DuplicateMessageId {
                    id,
                    message: name,
                    existing: existing.to_string(),
                }));
            }
        }

        let mut fields: Vec<FieldDef> = Vec::new();
        let mut seen = BTreeSet::new();
        for child in node.children() {
            let field = self.resolve_field(model, &name, child)?;
            if !seen.insert(field.name.clone()) {
                return Err(rejected(SchemaError::DuplicateFieldName {
                    message: name,
                    field: field.name,
                }));
            }
            fields.push(field);
        }

        let message = MessageDef {
            name,
            id,
            inherits,
            parent,
            description,
            fields,
        };
        debug!(
            name = %message.name,
            id = message.id,
            fields = message.fields.len(),
            wire_size = ?message.fixed_wire_size(),
            "message accepted"
        );
        model.push_message(message);
        Ok(())
    }

    fn resolve_field(
        &self,
        model: &SchemaModel,
        message: &str,
        node: &DeclNode,
    ) -> Result<FieldDef, SchemaError> {
        let kind = match node.tag.as_str() {
            FIELD_TAG => FieldKind::Primitive,
            SEQUENCE_TAG => FieldKind::Sequence,
            _ => {
                return Err(rejected(SchemaError::UnknownFieldTag {
                    message: message.to_string(),
                    tag: node.tag.clone(),
                }))
            }
        };
        let name: String = node.get(ATTR_NAME).map_err(rejected)?;
        let type_ref: String = node.get(ATTR_PRIMITIVE).map_err(rejected)?;
        let description = description_of(node)?;

        let (target, length) = if let Some(index) = model.type_index_of(&type_ref) {
            let alias = &model.types()[index];
            (
                FieldTarget::Alias {
                    index,
                    primitive: alias.primitive,
                },
                alias.length,
            )
        } else if let Some(primitive) = self.catalog.lookup(&type_ref) {
            let owner = format!("{message}.{name}");
            let length = self.resolve_length(&owner, primitive, node)?;
            (FieldTarget::Primitive(primitive), length)
        } else if let (FieldKind::Sequence, Some(index)) = (kind, model.message_index_of(&type_ref))
        {
            (FieldTarget::Message(index), 0)
        } else {
            return Err(rejected(SchemaError::UnresolvedFieldType {
                message: message.to_string(),
                field: name,
                type_ref,
            }));
        };

        Ok(FieldDef {
            kind,
            name,
            type_ref,
            target,
            length,
            description,
        })
    }

    fn add_const_group(&self, model: &mut SchemaModel, node: &DeclNode) -> Result<(), SchemaError> {
        let name: String = node.get(ATTR_NAME).map_err(rejected)?;
        let primitive_type: String = node.get(ATTR_PRIMITIVE).map_err(rejected)?;
        let description = description_of(node)?;

        if model.has_const_group(&name) {
            return Err(rejected(SchemaError::DuplicateConstantName(name)));
        }

        // Aliases resolve to their original kind; their length is the fallback.
        let (primitive, length) = match model.type_def(&primitive_type) {
            Some(alias) => {
                let declared = self.declared_length(&name, node)?;
                (alias.primitive, declared.unwrap_or(alias.length))
            }
            None => {
                let primitive = self.primitive(&name, &primitive_type)?;
                let length = match primitive {
                    PrimitiveKind::String => self
                        .declared_length(&name, node)?
                        .unwrap_or(UNBOUNDED_LENGTH),
                    _ => self.resolve_length(&name, primitive, node)?,
                };
                (primitive, length)
            }
        };

        let mut values: Vec<ConstValue> = Vec::new();
        let mut seen = BTreeSet::new();
        for child in node.children() {
            let value_name: String = child.get(ATTR_NAME).map_err(rejected)?;
            if !seen.insert(value_name.clone()) {
                return Err(rejected(SchemaError::DuplicateConstantValue {
                    group: name,
                    value: value_name,
                }));
            }
            let text = child.text().trim();
            check_value(&name, &value_name, text, primitive, length).map_err(rejected)?;
            values.push(ConstValue {
                name: value_name,
                raw_value: text.to_string(),
                primitive_type: primitive_type.clone(),
                length,
                description: description_of(child)?,
            });
        }

        debug!(
            name = %name,
            primitive = %primitive,
            length,
            values = values.len(),
            "constant group accepted"
        );
        model.push_const_group(ConstGroup {
            name,
            primitive_type,
            primitive,
            length,
            description,
            values,
        });
        Ok(())
    }

    fn primitive(&self, owner: &str, text: &str) -> Result<PrimitiveKind, SchemaError> {
        self.catalog.lookup(text).ok_or_else(|| {
            rejected(SchemaError::UnknownPrimitiveType {
                owner: owner.to_string(),
                primitive: text.to_string(),
            })
        })
    }

    /// Length rule shared by types, raw-kind fields and constant groups
    fn resolve_length(
        &self,
        owner: &str,
        primitive: PrimitiveKind,
        node: &DeclNode,
    ) -> Result<u32, SchemaError> {
        match primitive {
            PrimitiveKind::FixArray => self.declared_length(owner, node)?.ok_or_else(|| {
                rejected(SchemaError::MissingArrayLength {
                    owner: owner.to_string(),
                })
            }),
            PrimitiveKind::String => Ok(UNBOUNDED_LENGTH),
            other => Ok(self.catalog.width(other).unwrap_or(0)),
        }
    }

    /// A present `length` attribute, which must be a positive u32
    fn declared_length(&self, owner: &str, node: &DeclNode) -> Result<Option<u32>, SchemaError> {
        let Some(length) = node.get_optional::<i64>(ATTR_LENGTH).map_err(rejected)? else {
            return Ok(None);
        };
        match u32::try_from(length) {
            Ok(length) if length > 0 => Ok(Some(length)),
            _ => Err(rejected(SchemaError::InvalidArrayLength {
                owner: owner.to_string(),
                length,
            })),
        }
    }
}

fn description_of(node: &DeclNode) -> Result<String, SchemaError> {
    Ok(node
        .get_optional::<String>(ATTR_DESCRIPTION)
        .map_err(rejected)?
        .unwrap_or_default())
}

// Every rejection is logged once, where it is raised.
fn rejected(err: SchemaError) -> SchemaError {
    warn!(rule = err.rule(), error = %err, "schema rejected");
    err
}
