/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Dictionary-aware message parser.
//!
//! Splits a framed message into header, body and trailer field maps and
//! collects repeating groups into rows. Header and trailer membership comes
//! from the dictionary's standard layouts; every other tag goes to the body.
//!
//! Rows are collected leniently: a row starts at the group's delimiter (its
//! first member) or when a member repeats, and the group ends at the first
//! tag that is not a member. The declared count is not enforced here, so
//! the renderer can report mismatches next to the offending field.

use crate::decoder::Decoder;
use fixscope_core::error::DecodeError;
use fixscope_core::field::FieldRef;
use fixscope_core::message::{FieldMap, Group, Message, RawMessage};
use fixscope_dictionary::{Dictionary, FieldDef};

/// Parses framed messages into segmented [`Message`] values.
#[derive(Debug, Clone, Copy)]
pub struct MessageParser<'d> {
    dictionary: &'d Dictionary,
    validate_checksum: bool,
}

impl<'d> MessageParser<'d> {
    /// Creates a parser that does not validate checksums.
    #[must_use]
    pub const fn new(dictionary: &'d Dictionary) -> Self {
        Self {
            dictionary,
            validate_checksum: false,
        }
    }

    /// Sets whether the framing step validates the checksum.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Returns the dictionary used for segmentation.
    #[must_use]
    pub const fn dictionary(&self) -> &'d Dictionary {
        self.dictionary
    }

    /// Frames and parses one SOH-delimited message.
    ///
    /// # Errors
    /// Returns the [`DecodeError`] of the framing step.
    pub fn parse(&self, input: &[u8]) -> Result<Message, DecodeError> {
        let raw = Decoder::new(input)
            .with_checksum_validation(self.validate_checksum)
            .decode()?;
        Ok(self.segment(&raw))
    }

    /// Splits an already framed message into its segments.
    #[must_use]
    pub fn segment(&self, raw: &RawMessage<'_>) -> Message {
        let dict = self.dictionary;
        let header = dict.expand(dict.header_parts());
        let trailer = dict.expand(dict.trailer_parts());
        let body = dict.expand(dict.message_parts(raw.msg_type().as_str()));

        let mut message = Message::default();
        let fields = raw.fields();
        let mut pos = 0;
        while let Some(field) = fields.get(pos) {
            let (map, defs) = if declares(&header, field.tag) {
                (&mut message.header, &header)
            } else if declares(&trailer, field.tag) {
                (&mut message.trailer, &trailer)
            } else {
                (&mut message.body, &body)
            };

            let first = map.set_first(field.tag, field.to_text());
            pos += 1;
            if first
                && let Some(def) = defs.iter().find(|def| def.tag == field.tag)
                && def.is_group()
            {
                let rows = self.collect_rows(def, fields, &mut pos);
                if !rows.is_empty() {
                    map.set_group(Group::new(field.tag, rows));
                }
            }
        }
        message
    }

    /// Collects the rows of group `def` starting at `pos`, advancing `pos`
    /// past the last member consumed.
    fn collect_rows(&self, def: &FieldDef, fields: &[FieldRef<'_>], pos: &mut usize) -> Vec<FieldMap> {
        let members = self.dictionary.expand(def.members().unwrap_or_default());
        let Some(delimiter) = members.first().map(|m| m.tag) else {
            return Vec::new();
        };

        let mut rows: Vec<FieldMap> = Vec::new();
        while let Some(field) = fields.get(*pos) {
            let Some(member) = members.iter().find(|m| m.tag == field.tag) else {
                break;
            };
            let starts_row = field.tag == delimiter
                || rows.last().is_none_or(|row| row.contains(field.tag));
            if starts_row {
                rows.push(FieldMap::new());
            }
            let Some(row) = rows.last_mut() else {
                break;
            };

            row.set(field.tag, field.to_text());
            *pos += 1;
            if member.is_group() {
                let nested = self.collect_rows(member, fields, pos);
                if !nested.is_empty() {
                    row.set_group(Group::new(field.tag, nested));
                }
            }
        }
        rows
    }
}

fn declares(defs: &[&FieldDef], tag: u32) -> bool {
    defs.iter().any(|def| def.tag == tag)
}
