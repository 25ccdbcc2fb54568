//! Hand-off from a validated model to a template engine
//!
//! The engine itself lives outside this crate behind [`TemplateRenderer`].
//! [`RenderContext`] turns the model into the nested key/value documents the
//! templates read, and [`emit`] pairs each document with its template and
//! output file name. Writing files is left to the caller.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::model::{ConstGroup, FieldDef, FieldTarget, MessageDef, SchemaModel};
use crate::error::{Error, Result};

/// Template for a message's header file
pub const MESSAGE_HEADER_TEMPLATE: &str = "TEMPLATE_MESSAGE_H";
/// Template for a message's source file
pub const MESSAGE_SOURCE_TEMPLATE: &str = "TEMPLATE_MESSAGE_CPP";
/// Template for the type alias header
pub const TYPES_HEADER_TEMPLATE: &str = "TEMPLATE_TYPES_H";
/// Template for the constants header
pub const CONSTANTS_HEADER_TEMPLATE: &str = "TEMPLATE_CONSTANTS_H";
/// Template for the constants source file
pub const CONSTANTS_SOURCE_TEMPLATE: &str = "TEMPLATE_CONSTANTS_CPP";

/// External template engine
pub trait TemplateRenderer {
    /// Render `template` with `context`, returning the produced text
    fn render(&self, template: &str, context: &Value) -> core::result::Result<String, String>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &Value) -> core::result::Result<String, String>,
{
    fn render(&self, template: &str, context: &Value) -> core::result::Result<String, String> {
        self(template, context)
    }
}

/// One rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory
    pub path: String,
    /// Rendered text
    pub contents: String,
}

/// Builds template documents from a model
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    model: &'a SchemaModel,
    namespace: String,
}

impl<'a> RenderContext<'a> {
    /// Context for `model` under `namespace`
    pub fn new(model: &'a SchemaModel, namespace: impl Into<String>) -> Self {
        Self {
            model,
            namespace: namespace.into(),
        }
    }

    /// Namespace written into every document
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Document for one message's templates
    pub fn message(&self, message: &MessageDef) -> Value {
        let fields: Vec<Value> = message.fields.iter().map(|f| self.field(f)).collect();
        json!({
            "NAMESPACE": self.namespace,
            "MSG_NAME": message.name,
            "MSG_DESCRIPTION": message.description,
            "MSG_INHERIT": message.inherits.as_deref().unwrap_or(""),
            "MSG_PKT_NO": message.id,
            "FIELDS": fields,
        })
    }

    /// Document for the type alias templates (user types only)
    pub fn types(&self) -> Value {
        json!({ "NAMESPACE": self.namespace, "TYPES": self.type_entries() })
    }

    /// Document for the constants templates
    pub fn constants(&self) -> Value {
        json!({ "NAMESPACE": self.namespace, "CONSTANTS": self.const_entries() })
    }

    /// Every document in one value, keyed by section
    pub fn document(&self) -> Value {
        let messages: Vec<Value> = self
            .model
            .messages()
            .iter()
            .map(|m| self.message(m))
            .collect();
        let mut doc = Map::new();
        doc.insert("NAMESPACE".into(), Value::from(self.namespace.as_str()));
        doc.insert(
            "BYTE_ORDER".into(),
            Value::from(self.model.byte_order().to_string()),
        );
        doc.insert("MESSAGES".into(), Value::from(messages));
        doc.insert("TYPES".into(), Value::from(self.type_entries()));
        doc.insert("CONSTANTS".into(), Value::from(self.const_entries()));
        Value::Object(doc)
    }

    fn type_entries(&self) -> Vec<Value> {
        self.model
            .types()
            .iter()
            .map(|t| {
                json!({
                    "T_NAME": t.name,
                    "T_PRIMITIVE_TYPE": t.primitive.name(),
                    "T_LENGTH": t.length,
                    "T_DESCRIPTION": t.description,
                })
            })
            .collect()
    }

    fn const_entries(&self) -> Vec<Value> {
        self.model
            .const_groups()
            .iter()
            .map(|g| self.const_group(g))
            .collect()
    }

    fn field(&self, field: &FieldDef) -> Value {
        json!({
            "F_NAME": field.name,
            "F_FILED_TYPE": field.kind.code(),
            "F_PRIMITIVE_TYPE": field.type_ref,
            "F_DESCRIPTION": field.description,
            "F_TYPE_INFO": self.type_info(&field.type_ref, field.target, field.length),
        })
    }

    fn const_group(&self, group: &ConstGroup) -> Value {
        let target = match self.model.type_index_of(&group.primitive_type) {
            Some(index) => FieldTarget::Alias {
                index,
                primitive: group.primitive,
            },
            None => FieldTarget::Primitive(group.primitive),
        };
        let type_info = self.type_info(&group.primitive_type, target, group.length);
        let values: Vec<Value> = group
            .values
            .iter()
            .map(|v| {
                json!({
                    "F_NAME": v.name,
                    "F_VALUE": v.raw_value,
                    "F_DESCRIPTION": v.description,
                    "F_PRIMITIVE_TYPE": v.primitive_type,
                    "F_TYPE_INFO": type_info,
                })
            })
            .collect();
        json!({
            "CONST_NAME": group.name,
            "CONST_PRIMITIVE_TYPE": group.primitive_type,
            "CONST_DESCRIPTION": group.description,
            "FIELDS": values,
        })
    }

    fn type_info(&self, type_ref: &str, target: FieldTarget, length: u32) -> Value {
        match target {
            FieldTarget::Alias { index, .. } => {
                let alias = &self.model.types()[index];
                json!({
                    "T_NAME": alias.name,
                    "T_PRIMITIVE_TYPE": alias.primitive.name(),
                    "T_LENGTH": alias.length,
                })
            }
            FieldTarget::Primitive(kind) => json!({
                "T_NAME": kind.name(),
                "T_PRIMITIVE_TYPE": kind.name(),
                "T_LENGTH": length,
            }),
            // Message element types carry no primitive.
            FieldTarget::Message(_) => json!({
                "T_NAME": type_ref,
                "T_PRIMITIVE_TYPE": "",
                "T_LENGTH": 0,
            }),
        }
    }
}

/// Render every output file for `model`
///
/// Produces `<Message>.h`/`<Message>.cpp` per message, `Types.h`,
/// `Constants.h` and `Constants.cpp`, in that order. Stops at the first
/// template the renderer rejects.
pub fn emit<R>(model: &SchemaModel, namespace: &str, renderer: &R) -> Result<Vec<GeneratedFile>>
where
    R: TemplateRenderer + ?Sized,
{
    let context = RenderContext::new(model, namespace);
    let mut files = Vec::new();

    for message in model.messages() {
        let doc = context.message(message);
        let name = &message.name;
        files.push(render_one(renderer, MESSAGE_HEADER_TEMPLATE, &doc, format!("{name}.h"))?);
        files.push(render_one(renderer, MESSAGE_SOURCE_TEMPLATE, &doc, format!("{name}.cpp"))?);
    }

    let types = context.types();
    files.push(render_one(renderer, TYPES_HEADER_TEMPLATE, &types, "Types.h")?);

    let constants = context.constants();
    files.push(render_one(renderer, CONSTANTS_HEADER_TEMPLATE, &constants, "Constants.h")?);
    files.push(render_one(renderer, CONSTANTS_SOURCE_TEMPLATE, &constants, "Constants.cpp")?);

    debug!(files = files.len(), namespace, "rendered schema");
    Ok(files)
}

fn render_one<R>(
    renderer: &R,
    template: &str,
    context: &Value,
    path: impl Into<String>,
) -> Result<GeneratedFile>
where
    R: TemplateRenderer + ?Sized,
{
    let contents = renderer
        .render(template, context)
        .map_err(|reason| Error::Render {
            template: template.to_string(),
            reason,
        })?;
    Ok(GeneratedFile {
        path: path.into(),
        contents,
    })
}
