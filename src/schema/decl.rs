//! Generic attributed declaration tree
//!
//! The validator only needs a tag, a string attribute map, optional text and
//! ordered children per node. Any front end (YAML, JSON, XML, hand-built)
//! produces this shape.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use crate::error::SchemaError;

/// One node of a declaration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclNode {
    /// Element tag, e.g. `Type`, `Message`, `Field`
    pub tag: String,
    /// Attribute values as written in the source
    pub attributes: BTreeMap<String, String>,
    /// Text content (constant values live here)
    pub text: String,
    /// Child nodes in document order
    pub children: Vec<DeclNode>,
}

impl DeclNode {
    /// Empty node with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: DeclNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        self.attributes.insert(name.into(), value.to_string());
    }

    /// Append a child
    pub fn push_child(&mut self, child: DeclNode) {
        self.children.push(child);
    }

    /// Raw attribute value
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Text content
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Required attribute parsed as `T`
    pub fn get<T: FromStr>(&self, name: &str) -> Result<T, SchemaError> {
        self.get_optional(name)?
            .ok_or_else(|| SchemaError::MissingAttribute {
                tag: self.tag.clone(),
                attribute: name.to_string(),
            })
    }

    /// Optional attribute parsed as `T`
    ///
    /// A present but unparsable value is an error, not `None`.
    pub fn get_optional<T: FromStr>(&self, name: &str) -> Result<Option<T>, SchemaError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| SchemaError::InvalidAttribute {
                    tag: self.tag.clone(),
                    attribute: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// Child nodes in document order
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = &DeclNode> {
        self.children.iter()
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&DeclNode> {
        self.children.iter().find(|c| c.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_attributes() {
        let node = DeclNode::new("Type")
            .with_attr("name", "Qty")
            .with_attr("length", 12);

        assert_eq!(node.get::<String>("name").unwrap(), "Qty");
        assert_eq!(node.get::<u32>("length").unwrap(), 12);
        assert_eq!(node.get_optional::<u32>("missing").unwrap(), None);
    }

    #[test]
    fn test_missing_and_invalid_attributes() {
        let node = DeclNode::new("Message").with_attr("id", "abc");
        assert_eq!(
            node.get::<String>("name"),
            Err(SchemaError::MissingAttribute {
                tag: "Message".to_string(),
                attribute: "name".to_string()
            })
        );
        assert_eq!(
            node.get_optional::<u32>("id"),
            Err(SchemaError::InvalidAttribute {
                tag: "Message".to_string(),
                attribute: "id".to_string(),
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_children() {
        let root = DeclNode::new("File")
            .with_child(DeclNode::new("Types"))
            .with_child(DeclNode::new("Messages").with_child(DeclNode::new("Message")));

        assert_eq!(root.children().count(), 2);
        assert!(root.child("Constants").is_none());
        assert_eq!(root.child("Messages").unwrap().children().count(), 1);
    }
}
