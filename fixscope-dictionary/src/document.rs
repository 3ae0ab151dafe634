/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Source-format independent dictionary document.
//!
//! Loaders translate their input into a [`DictionaryDocument`], which names
//! fields and components instead of pointing at them. [`DictionaryDocument::build`]
//! resolves those names and validates the result.

use crate::schema::{
    ComponentDef, ComponentRef, Dictionary, FieldDef, FieldKind, FieldType, MessageCategory,
    MessageDef, MessagePart,
};
use fixscope_core::error::DictionaryError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

fn default_begin_string() -> String {
    "FIX.4.4".to_string()
}

/// A whole dictionary, as read from its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryDocument {
    /// BeginString the dictionary describes.
    #[serde(default = "default_begin_string")]
    pub begin_string: String,
    /// Field definitions.
    pub fields: Vec<FieldDoc>,
    /// Standard header layout.
    #[serde(default)]
    pub header: Vec<PartDoc>,
    /// Standard trailer layout.
    #[serde(default)]
    pub trailer: Vec<PartDoc>,
    /// Component definitions.
    #[serde(default)]
    pub components: Vec<ComponentDoc>,
    /// Message definitions.
    #[serde(default)]
    pub messages: Vec<MessageDoc>,
}

/// A field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDoc {
    /// Tag number.
    pub number: u32,
    /// Field name.
    pub name: String,
    /// Type name as written in the source (e.g., "NUMINGROUP").
    #[serde(rename = "type")]
    pub field_type: String,
    /// Enumerated values.
    #[serde(default)]
    pub values: Vec<ValueDoc>,
}

/// One enumerated value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDoc {
    /// Raw wire value.
    #[serde(rename = "enum")]
    pub value: String,
    /// Human description.
    pub description: String,
}

/// A layout entry referring to definitions by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PartDoc {
    /// A plain field.
    Field {
        /// Field name.
        name: String,
        /// Presence.
        #[serde(default)]
        required: bool,
    },
    /// A component reference.
    Component {
        /// Component name.
        name: String,
        /// Presence.
        #[serde(default)]
        required: bool,
    },
    /// A repeating group introduced by its count field.
    Group {
        /// Name of the count field.
        name: String,
        /// Presence.
        #[serde(default)]
        required: bool,
        /// Layout of one row.
        parts: Vec<PartDoc>,
    },
}

/// A named component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDoc {
    /// Component name.
    pub name: String,
    /// Layout.
    pub parts: Vec<PartDoc>,
}

/// A message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDoc {
    /// Message name.
    pub name: String,
    /// Message type value (tag 35).
    #[serde(rename = "msgtype")]
    pub msg_type: String,
    /// Message category.
    #[serde(default, rename = "msgcat")]
    pub category: MessageCategory,
    /// Body layout.
    pub parts: Vec<PartDoc>,
}

impl DictionaryDocument {
    /// Resolves names and builds the dictionary.
    ///
    /// # Errors
    /// Returns a [`DictionaryError`] for duplicate definitions, dangling
    /// field or component references, component cycles and empty groups.
    pub fn build(&self) -> Result<Dictionary, DictionaryError> {
        let mut dict = Dictionary::new(self.begin_string.clone());

        for doc in &self.fields {
            if dict.field(doc.number).is_some() {
                return Err(DictionaryError::Duplicate(format!("tag {}", doc.number)));
            }
            if dict.field_by_name(&doc.name).is_some() {
                return Err(DictionaryError::Duplicate(format!("field {}", doc.name)));
            }
            let field_type: FieldType = doc.field_type.parse().unwrap_or(FieldType::String);
            let field = doc.values.iter().fold(
                FieldDef::new(doc.number, doc.name.clone(), field_type),
                |field, value| field.with_value(value.value.clone(), value.description.clone()),
            );
            dict.add_field(field);
        }

        let mut components: HashMap<&str, &ComponentDoc> = HashMap::new();
        for doc in &self.components {
            if components.insert(doc.name.as_str(), doc).is_some() {
                return Err(DictionaryError::Duplicate(format!("component {}", doc.name)));
            }
        }
        check_cycles(&components)?;

        let resolver = Resolver {
            dict: &dict,
            components: &components,
        };
        let header = resolver.parts(&self.header, "header")?;
        let trailer = resolver.parts(&self.trailer, "trailer")?;

        let mut resolved_components = Vec::with_capacity(self.components.len());
        for doc in &self.components {
            let context = format!("component {}", doc.name);
            resolved_components.push(ComponentDef {
                name: doc.name.clone(),
                parts: resolver.parts(&doc.parts, &context)?,
            });
        }

        let mut messages = Vec::with_capacity(self.messages.len());
        let mut seen = HashSet::new();
        for doc in &self.messages {
            if !seen.insert(doc.msg_type.as_str()) {
                return Err(DictionaryError::Duplicate(format!("message {}", doc.msg_type)));
            }
            let context = format!("message {}", doc.msg_type);
            messages.push(MessageDef {
                msg_type: doc.msg_type.clone(),
                name: doc.name.clone(),
                category: doc.category,
                parts: resolver.parts(&doc.parts, &context)?,
            });
        }

        dict.set_header(header);
        dict.set_trailer(trailer);
        for component in resolved_components {
            dict.add_component(component);
        }
        for message in messages {
            dict.add_message(message);
        }
        Ok(dict)
    }
}

struct Resolver<'a> {
    dict: &'a Dictionary,
    components: &'a HashMap<&'a str, &'a ComponentDoc>,
}

impl Resolver<'_> {
    fn field(&self, name: &str, context: &str) -> Result<&FieldDef, DictionaryError> {
        self.dict
            .field_by_name(name)
            .ok_or_else(|| DictionaryError::UnknownField {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    fn parts(&self, docs: &[PartDoc], context: &str) -> Result<Vec<MessagePart>, DictionaryError> {
        docs.iter().map(|doc| self.part(doc, context)).collect()
    }

    fn part(&self, doc: &PartDoc, context: &str) -> Result<MessagePart, DictionaryError> {
        Ok(match doc {
            PartDoc::Field { name, required } => MessagePart::Field(
                self.field(name, context)?
                    .declared(*required, FieldKind::Scalar),
            ),
            PartDoc::Component { name, required } => {
                if !self.components.contains_key(name.as_str()) {
                    return Err(DictionaryError::UnknownComponent {
                        name: name.clone(),
                        context: context.to_string(),
                    });
                }
                MessagePart::Component(ComponentRef {
                    name: name.clone(),
                    required: *required,
                })
            }
            PartDoc::Group {
                name,
                required,
                parts,
            } => {
                if parts.is_empty() {
                    return Err(DictionaryError::EmptyGroup(name.clone()));
                }
                let header = self.field(name, context)?;
                let members = self.parts(parts, &format!("group {}", name))?;
                MessagePart::Field(header.declared(*required, FieldKind::GroupHeader { members }))
            }
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

fn check_cycles(components: &HashMap<&str, &ComponentDoc>) -> Result<(), DictionaryError> {
    let mut state: HashMap<&str, Visit> = HashMap::new();
    let mut names: Vec<&str> = components.keys().copied().collect();
    names.sort_unstable();
    for name in names {
        visit(name, components, &mut state)?;
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    components: &HashMap<&'a str, &'a ComponentDoc>,
    state: &mut HashMap<&'a str, Visit>,
) -> Result<(), DictionaryError> {
    match state.get(name) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => return Err(DictionaryError::ComponentCycle(name.to_string())),
        None => {}
    }
    let Some(&doc) = components.get(name) else {
        // Dangling references are reported by the resolver with their context.
        return Ok(());
    };
    state.insert(name, Visit::InProgress);
    let mut refs = Vec::new();
    collect_component_refs(&doc.parts, &mut refs);
    for child in refs {
        visit(child, components, state)?;
    }
    state.insert(name, Visit::Done);
    Ok(())
}

fn collect_component_refs<'a>(parts: &'a [PartDoc], out: &mut Vec<&'a str>) {
    for part in parts {
        match part {
            PartDoc::Field { .. } => {}
            PartDoc::Component { name, .. } => out.push(name),
            PartDoc::Group { parts, .. } => collect_component_refs(parts, out),
        }
    }
}
