//! Declaration documents in YAML or JSON
//!
//! A document is a mapping with optional scalar settings (`endian`) and the
//! three lists `types`, `messages` and `constants`:
//!
//! ```yaml
//! endian: big
//! types:
//!   - { name: ID, primitive_type: UINT32 }
//! messages:
//!   - name: Ping
//!     id: 1
//!     fields:
//!       - { name: seq, primitive_type: ID }
//!       - { tag: Sequence, name: hops, primitive_type: UINT16 }
//! constants:
//!   - name: Limits
//!     primitive_type: UINT8
//!     values:
//!       - { name: MAX, value: 255 }
//! ```
//!
//! Items become [`DeclNode`]s tagged by their `tag` key or by their list's
//! default (`Type`, `Message`, `Field`, `Constant`, `Value`). Scalar keys
//! become attributes and a `value` key becomes the node text.

use alloc::format;
use alloc::string::{String, ToString};
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::decl::DeclNode;
use super::model::SchemaModel;
use super::validator::{
    SchemaValidator, CONSTANTS_GROUP, FIELD_TAG, MESSAGES_GROUP, TYPES_GROUP, TYPE_TAG,
};
use crate::catalog::TypeCatalog;
use crate::error::{Error, Result};

/// Root tag of a loaded document
pub const ROOT_TAG: &str = "File";

const INLINE_ORIGIN: &str = "<inline>";

/// Parse a document held in memory
pub fn load_str(text: &str) -> Result<DeclNode> {
    parse(INLINE_ORIGIN, text)
}

/// Read and parse a document from disk
pub fn load_path(path: impl AsRef<Path>) -> Result<DeclNode> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| source_error(&origin, e))?;
    parse(&origin, &text)
}

/// Read, parse and validate a document with the standard catalog
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaModel> {
    let root = load_path(path)?;
    Ok(SchemaValidator::new(TypeCatalog::standard()).validate(&root)?)
}

fn parse(origin: &str, text: &str) -> Result<DeclNode> {
    debug!(origin, bytes = text.len(), "parsing declarations");
    let value: Value = serde_yaml::from_str(text).map_err(|e| source_error(origin, e))?;
    let Value::Mapping(map) = value else {
        return Err(source_error(origin, "document root must be a mapping"));
    };

    let mut root = DeclNode::new(ROOT_TAG);
    for (key, value) in &map {
        let key = key_name(origin, key)?;
        match group_tags(key) {
            Some((group_tag, item_tag)) => {
                let mut group = DeclNode::new(group_tag);
                for item in list(origin, key, value)? {
                    group.push_child(item_node(origin, item, item_tag)?);
                }
                root.push_child(group);
            }
            None => match scalar(value) {
                Some(text) => root.set_attr(attribute_name(key), text),
                None => {
                    return Err(source_error(
                        origin,
                        format!("unexpected non-scalar key '{key}' at document root"),
                    ))
                }
            },
        }
    }
    Ok(root)
}

fn item_node(origin: &str, value: &Value, default_tag: &str) -> Result<DeclNode> {
    let map: &Mapping = value
        .as_mapping()
        .ok_or_else(|| source_error(origin, format!("{default_tag} entry must be a mapping")))?;

    let tag = match map.get("tag") {
        Some(tag) => scalar(tag)
            .ok_or_else(|| source_error(origin, format!("{default_tag} tag must be a scalar")))?,
        None => default_tag.to_string(),
    };

    let mut node = DeclNode::new(tag);
    for (key, value) in map {
        let key = key_name(origin, key)?;
        if key == "tag" || value.is_null() {
            continue;
        }
        if key == "value" {
            node.text = scalar(value)
                .ok_or_else(|| source_error(origin, format!("'{key}' must be a scalar")))?;
            continue;
        }
        if value.is_sequence() {
            let child_tag = child_tag(key).ok_or_else(|| {
                source_error(origin, format!("'{key}' cannot hold a list in {}", node.tag))
            })?;
            for child in list(origin, key, value)? {
                node.push_child(item_node(origin, child, child_tag)?);
            }
            continue;
        }
        match scalar(value) {
            Some(text) => node.set_attr(attribute_name(key), text),
            None => {
                return Err(source_error(
                    origin,
                    format!("'{key}' in {} must be a scalar or a list", node.tag),
                ))
            }
        }
    }
    Ok(node)
}

fn list<'v>(origin: &str, key: &str, value: &'v Value) -> Result<&'v [Value]> {
    match value {
        Value::Null => Ok(&[]),
        Value::Sequence(items) => Ok(items.as_slice()),
        _ => Err(source_error(origin, format!("'{key}' must be a list"))),
    }
}

fn group_tags(key: &str) -> Option<(&'static str, &'static str)> {
    if key.eq_ignore_ascii_case("types") {
        Some((TYPES_GROUP, TYPE_TAG))
    } else if key.eq_ignore_ascii_case("messages") {
        Some((MESSAGES_GROUP, "Message"))
    } else if key.eq_ignore_ascii_case("constants") {
        Some((CONSTANTS_GROUP, "Constant"))
    } else {
        None
    }
}

fn child_tag(key: &str) -> Option<&'static str> {
    match key {
        "fields" => Some(FIELD_TAG),
        "values" => Some("Value"),
        _ => None,
    }
}

// Spellings used by older documents.
fn attribute_name(key: &str) -> &str {
    match key {
        "primitive" => "primitive_type",
        "inherit" => "inherits",
        "pktno" => "id",
        "Endian" => "endian",
        other => other,
    }
}

fn key_name<'v>(origin: &str, key: &'v Value) -> Result<&'v str> {
    key.as_str()
        .ok_or_else(|| source_error(origin, "mapping keys must be strings"))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn source_error(origin: &str, reason: impl ToString) -> Error {
    Error::Source {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use crate::catalog::PrimitiveKind;
    use crate::endian::ByteOrder;
    use crate::error::SchemaError;
    use crate::schema::FieldKind;

    const PING: &str = r#"
endian: little
types:
  - name: ID
    primitive_type: UINT32
    description: sequence number
messages:
  - name: Ping
    id: 1
    fields:
      - name: seq
        primitive_type: ID
      - tag: Sequence
        name: hops
        primitive: UINT16
constants:
  - name: Limits
    primitive_type: UINT8
    values:
      - name: MAX
        value: 255
"#;

    #[test]
    fn test_yaml_tree_shape() {
        let root = load_str(PING).unwrap();
        assert_eq!(root.tag, ROOT_TAG);
        assert_eq!(root.attr("endian"), Some("little"));

        let ping = root.child(MESSAGES_GROUP).unwrap().children().next().unwrap();
        assert_eq!(ping.tag, "Message");
        assert_eq!(ping.attr("id"), Some("1"));
        let tags: Vec<&str> = ping.children().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["Field", "Sequence"]);

        let max = &root.child(CONSTANTS_GROUP).unwrap().children[0].children[0];
        assert_eq!(max.text(), "255");
    }

    #[test]
    fn test_yaml_validates() {
        let root = load_str(PING).unwrap();
        let model = SchemaValidator::default().validate(&root).unwrap();
        assert_eq!(model.byte_order(), ByteOrder::Little);

        let ping = model.message("Ping").unwrap();
        assert_eq!(ping.fields[1].kind, FieldKind::Sequence);
        assert_eq!(ping.fields[1].primitive(), Some(PrimitiveKind::UInt16));
        assert_eq!(model.type_def("ID").unwrap().description, "sequence number");
    }

    #[test]
    fn test_json_is_accepted() {
        let root = load_str(
            r#"{"types": [{"name": "Sym", "primitive_type": "FIXARRAY", "length": 8}], "messages": []}"#,
        )
        .unwrap();
        let model = SchemaValidator::default().validate(&root).unwrap();
        assert_eq!(model.type_def("Sym").unwrap().length, 8);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(load_str("- a\n- b\n"), Err(Error::Source { .. })));
        assert!(matches!(load_str("types: 3\n"), Err(Error::Source { .. })));
        assert!(matches!(
            load_str("messages:\n  - name: M\n    extras: [1]\n"),
            Err(Error::Source { .. })
        ));
        assert!(matches!(load_str("types: [\n"), Err(Error::Source { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = load_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Source { ref origin, .. } if origin.contains("here.yaml")));
    }

    #[test]
    fn test_schema_errors_pass_through() {
        let root = load_str("messages:\n  - name: A\n    inherits: B\n").unwrap();
        let err = SchemaValidator::default().validate(&root).unwrap_err();
        assert!(matches!(err, SchemaError::DanglingInheritance { .. }));
    }
}
