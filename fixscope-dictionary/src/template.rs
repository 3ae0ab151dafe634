/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Group template resolution.
//!
//! A group template is the ordered list of tags that may appear in one row
//! of a repeating group. Nested groups are flattened depth-first: the nested
//! count tag is followed immediately by its own template.

use crate::schema::{Dictionary, FieldDef, MessagePart};
use fixscope_core::error::GroupError;

/// Resolves the template of the group whose count tag is `tag`.
///
/// `enclosing` holds the field definitions visible where the group occurs,
/// usually the expanded parts of a message, header, trailer or outer row.
///
/// # Errors
/// Returns `GroupError::NotDeclared` if `tag` is not among `enclosing`, and
/// `GroupError::NoLayout` if it is declared as a plain field.
pub fn resolve_template(
    dictionary: &Dictionary,
    tag: u32,
    enclosing: &[&FieldDef],
) -> Result<Vec<u32>, GroupError> {
    let def = enclosing
        .iter()
        .find(|def| def.tag == tag)
        .ok_or(GroupError::NotDeclared { tag })?;
    let members = def.members().ok_or(GroupError::NoLayout { tag })?;

    let mut template = Vec::new();
    splice(dictionary, members, &mut template);
    Ok(template)
}

fn splice(dictionary: &Dictionary, members: &[MessagePart], template: &mut Vec<u32>) {
    for member in dictionary.expand(members) {
        template.push(member.tag);
        if let Some(nested) = member.members() {
            splice(dictionary, nested, template);
        }
    }
}

/// Finds the definition of group `tag` anywhere inside `parts`.
///
/// Searches the layout depth-first, descending into group rows, and returns
/// the expanded definitions of the level that declares the group together
/// with the definition itself.
#[must_use]
pub fn find_group<'a>(
    dictionary: &'a Dictionary,
    parts: &'a [MessagePart],
    tag: u32,
) -> Option<(Vec<&'a FieldDef>, &'a FieldDef)> {
    let level = dictionary.expand(parts);
    let declared = level.iter().copied().find(|def| def.tag == tag);
    if let Some(def) = declared {
        return Some((level, def));
    }
    level
        .iter()
        .copied()
        .filter_map(FieldDef::members)
        .find_map(|members| find_group(dictionary, members, tag))
}

impl Dictionary {
    /// Resolves the template of group `tag` as declared by message `msg_type`.
    ///
    /// The header and trailer layouts are searched as well, so header groups
    /// such as `NoHops` resolve for every message type.
    ///
    /// # Errors
    /// Returns `GroupError::NotDeclared` if no layout of the message declares
    /// the tag, and `GroupError::NoLayout` if it is not a group.
    pub fn group_template(&self, msg_type: &str, tag: u32) -> Result<Vec<u32>, GroupError> {
        let found = find_group(self, self.header_parts(), tag)
            .or_else(|| find_group(self, self.message_parts(msg_type), tag))
            .or_else(|| find_group(self, self.trailer_parts(), tag));
        match found {
            Some((enclosing, _)) => resolve_template(self, tag, &enclosing),
            None => Err(GroupError::NotDeclared { tag }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ComponentDef, ComponentRef, FieldKind, FieldType, MessageCategory, MessageDef};

    fn field(tag: u32, name: &str) -> FieldDef {
        FieldDef::new(tag, name, FieldType::String)
    }

    fn group(tag: u32, name: &str, members: Vec<MessagePart>) -> MessagePart {
        MessagePart::Field(
            FieldDef::new(tag, name, FieldType::NumInGroup)
                .declared(false, FieldKind::GroupHeader { members }),
        )
    }

    fn sample() -> Dictionary {
        let mut dict = Dictionary::new("FIX.4.4");
        dict.add_component(ComponentDef {
            name: "LegStipulations".to_string(),
            parts: vec![group(
                683,
                "NoLegStipulations",
                vec![
                    MessagePart::Field(field(688, "LegStipulationType")),
                    MessagePart::Field(field(689, "LegStipulationValue")),
                ],
            )],
        });
        dict.add_message(MessageDef {
            msg_type: "AB".to_string(),
            name: "NewOrderMultileg".to_string(),
            category: MessageCategory::App,
            parts: vec![
                MessagePart::Field(field(11, "ClOrdID")),
                group(
                    555,
                    "NoLegs",
                    vec![
                        MessagePart::Field(field(600, "LegSymbol")),
                        MessagePart::Component(ComponentRef {
                            name: "LegStipulations".to_string(),
                            required: false,
                        }),
                        MessagePart::Field(field(624, "LegSide")),
                    ],
                ),
            ],
        });
        dict.set_header(vec![group(
            627,
            "NoHops",
            vec![MessagePart::Field(field(628, "HopCompID"))],
        )]);
        dict
    }

    #[test]
    fn test_nested_template_is_flattened_depth_first() {
        let dict = sample();
        let enclosing = dict.expand(dict.message_parts("AB"));
        let template = resolve_template(&dict, 555, &enclosing).unwrap();
        assert_eq!(template, vec![600, 683, 688, 689, 624]);
    }

    #[test]
    fn test_undeclared_group_tag() {
        let dict = sample();
        let enclosing = dict.expand(dict.message_parts("AB"));
        assert_eq!(
            resolve_template(&dict, 382, &enclosing),
            Err(GroupError::NotDeclared { tag: 382 })
        );
    }

    #[test]
    fn test_scalar_has_no_layout() {
        let dict = sample();
        let enclosing = dict.expand(dict.message_parts("AB"));
        assert_eq!(
            resolve_template(&dict, 11, &enclosing),
            Err(GroupError::NoLayout { tag: 11 })
        );
    }

    #[test]
    fn test_find_nested_group() {
        let dict = sample();
        let (level, def) = find_group(&dict, dict.message_parts("AB"), 683).unwrap();
        assert_eq!(def.name, "NoLegStipulations");
        let tags: Vec<u32> = level.iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![600, 683, 624]);
    }

    #[test]
    fn test_group_template_by_message() {
        let dict = sample();
        assert_eq!(dict.group_template("AB", 683).unwrap(), vec![688, 689]);
        assert_eq!(dict.group_template("D", 627).unwrap(), vec![628]);
        assert_eq!(
            dict.group_template("D", 555),
            Err(GroupError::NotDeclared { tag: 555 })
        );
    }
}
