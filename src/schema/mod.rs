//! Schema resolution and validation
//!
//! A declaration tree ([`DeclNode`]) goes through [`SchemaValidator`] once
//! and comes out as an immutable [`SchemaModel`] of types, messages and
//! constant groups. With the `std` feature, [`source`] loads trees from YAML
//! or JSON and [`render`] prepares the model for a template engine.

mod constant;
pub mod decl;
pub mod model;
pub mod validator;

#[cfg(feature = "std")]
pub mod render;
#[cfg(feature = "std")]
pub mod source;

pub use decl::DeclNode;
pub use model::{
    ConstGroup, ConstValue, FieldDef, FieldKind, FieldTarget, MessageDef, SchemaModel, TypeDef,
};
pub use validator::SchemaValidator;
