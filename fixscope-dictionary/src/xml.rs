/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! QuickFIX XML dictionary reader.
//!
//! Reads the `<fix>` document layout used by QuickFIX data dictionaries
//! (`<header>`, `<trailer>`, `<messages>`, `<components>`, `<fields>`) into
//! a [`DictionaryDocument`].

use crate::document::{ComponentDoc, DictionaryDocument, FieldDoc, MessageDoc, PartDoc, ValueDoc};
use crate::schema::MessageCategory;
use fixscope_core::error::DictionaryError;
use xmltree::{Element, XMLNode};

trait ElementExt {
    fn attribute(&self, name: &str) -> Result<&str, DictionaryError>;
    fn elements(&self) -> impl Iterator<Item = &Element>;
    fn child_elements(&self, name: &str) -> Vec<&Element>;
}

impl ElementExt for Element {
    fn attribute(&self, name: &str) -> Result<&str, DictionaryError> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DictionaryError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XMLNode::as_element)
    }

    fn child_elements(&self, name: &str) -> Vec<&Element> {
        self.get_child(name)
            .map(|section| section.elements().collect())
            .unwrap_or_default()
    }
}

/// Parses a QuickFIX XML dictionary.
///
/// # Errors
/// Returns `DictionaryError::Xml` for malformed XML and the attribute or
/// element variants for documents that do not follow the QuickFIX layout.
pub fn parse_xml(source: &str) -> Result<DictionaryDocument, DictionaryError> {
    let root = Element::parse(source.as_bytes()).map_err(|e| DictionaryError::Xml(e.to_string()))?;
    if root.name != "fix" {
        return Err(DictionaryError::UnexpectedElement(root.name));
    }

    let header = match root.get_child("header") {
        Some(section) => parse_members(section)?,
        None => Vec::new(),
    };
    let trailer = match root.get_child("trailer") {
        Some(section) => parse_members(section)?,
        None => Vec::new(),
    };

    let messages = root
        .child_elements("messages")
        .into_iter()
        .map(parse_message)
        .collect::<Result<Vec<_>, _>>()?;
    let components = root
        .child_elements("components")
        .into_iter()
        .map(|element| {
            Ok(ComponentDoc {
                name: element.attribute("name")?.to_string(),
                parts: parse_members(element)?,
            })
        })
        .collect::<Result<Vec<_>, DictionaryError>>()?;
    let fields = root
        .child_elements("fields")
        .into_iter()
        .map(parse_field)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DictionaryDocument {
        begin_string: begin_string(&root)?,
        fields,
        header,
        trailer,
        components,
        messages,
    })
}

fn begin_string(root: &Element) -> Result<String, DictionaryError> {
    let major = root.attribute("major")?;
    let minor = root.attribute("minor")?;
    let prefix = root
        .attributes
        .get("type")
        .map(String::as_str)
        .unwrap_or("FIX");
    Ok(format!("{}.{}.{}", prefix, major, minor))
}

fn parse_required(element: &Element) -> Result<bool, DictionaryError> {
    match element.attributes.get("required").map(String::as_str) {
        None | Some("N") | Some("n") => Ok(false),
        Some("Y") | Some("y") => Ok(true),
        Some(other) => Err(DictionaryError::InvalidAttribute {
            element: element.name.clone(),
            attribute: "required".to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_members(element: &Element) -> Result<Vec<PartDoc>, DictionaryError> {
    element
        .elements()
        .map(|member| {
            let name = member.attribute("name")?.to_string();
            let required = parse_required(member)?;
            Ok(match member.name.as_str() {
                "field" => PartDoc::Field { name, required },
                "component" => PartDoc::Component { name, required },
                "group" => PartDoc::Group {
                    name,
                    required,
                    parts: parse_members(member)?,
                },
                other => return Err(DictionaryError::UnexpectedElement(other.to_string())),
            })
        })
        .collect()
}

fn parse_message(element: &Element) -> Result<MessageDoc, DictionaryError> {
    let category = match element.attributes.get("msgcat").map(String::as_str) {
        Some("admin") => MessageCategory::Admin,
        _ => MessageCategory::App,
    };
    Ok(MessageDoc {
        name: element.attribute("name")?.to_string(),
        msg_type: element.attribute("msgtype")?.to_string(),
        category,
        parts: parse_members(element)?,
    })
}

fn parse_field(element: &Element) -> Result<FieldDoc, DictionaryError> {
    let raw_number = element.attribute("number")?;
    let number = raw_number
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| DictionaryError::InvalidAttribute {
            element: element.name.clone(),
            attribute: "number".to_string(),
            value: raw_number.to_string(),
        })?;
    let values = element
        .elements()
        .filter(|child| child.name == "value")
        .map(|value| {
            Ok(ValueDoc {
                value: value.attribute("enum")?.to_string(),
                description: value.attribute("description")?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, DictionaryError>>()?;

    Ok(FieldDoc {
        number,
        name: element.attribute("name")?.to_string(),
        field_type: element.attribute("type")?.to_string(),
        values,
    })
}
