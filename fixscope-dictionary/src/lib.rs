/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope Dictionary
//!
//! Protocol dictionary model and loaders for fixscope.
//!
//! This crate provides:
//! - **Schema definitions**: Field, component, and message layouts
//! - **Dictionary loading**: QuickFIX XML and JSON documents, validated on build
//! - **Group templates**: Flattened tag lists for one row of a repeating group

pub mod document;
pub mod json;
pub mod loader;
pub mod schema;
pub mod template;
pub mod xml;

pub use document::DictionaryDocument;
pub use loader::DictionaryFormat;
pub use schema::{
    ComponentDef, ComponentRef, Dictionary, FieldDef, FieldKind, FieldType, MessageCategory,
    MessageDef, MessagePart,
};
pub use template::{find_group, resolve_template};
