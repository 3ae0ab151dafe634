/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Schema definitions for protocol dictionaries.
//!
//! This module defines the in-memory dictionary model:
//! - [`FieldDef`]: Field definitions with tag, name, type and enum table
//! - [`FieldKind`]: Scalar field or group header carrying its row layout
//! - [`MessagePart`]: Field or component reference in declared order
//! - [`ComponentDef`]: Reusable, named list of parts
//! - [`MessageDef`]: Body layout of one message type
//! - [`Dictionary`]: Complete dictionary, read-only once loaded

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Protocol field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer value.
    Int,
    /// Length field (for data fields).
    Length,
    /// Sequence number.
    SeqNum,
    /// Number of entries in a repeating group.
    NumInGroup,
    /// Tag number reference.
    TagNum,
    /// Day of month (1-31).
    DayOfMonth,
    /// Floating point number.
    Float,
    /// Quantity.
    Qty,
    /// Price.
    Price,
    /// Price offset.
    PriceOffset,
    /// Amount (price * quantity).
    Amt,
    /// Percentage.
    Percentage,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// String.
    String,
    /// Multiple character value (space-separated).
    MultipleCharValue,
    /// Multiple string value (space-separated).
    MultipleStringValue,
    /// Country code (ISO 3166).
    Country,
    /// Currency code (ISO 4217).
    Currency,
    /// Exchange code (ISO 10383 MIC).
    Exchange,
    /// Month-year.
    MonthYear,
    /// UTC timestamp.
    UtcTimestamp,
    /// UTC time only.
    UtcTimeOnly,
    /// UTC date only.
    UtcDateOnly,
    /// Local market date.
    LocalMktDate,
    /// Raw data (binary).
    Data,
}

impl std::str::FromStr for FieldType {
    type Err = std::convert::Infallible;

    /// Maps a dictionary type name to a `FieldType`.
    ///
    /// Unrecognised names fall back to `String`, which renders verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INT" => Self::Int,
            "LENGTH" => Self::Length,
            "SEQNUM" => Self::SeqNum,
            "NUMINGROUP" => Self::NumInGroup,
            "TAGNUM" => Self::TagNum,
            "DAYOFMONTH" => Self::DayOfMonth,
            "FLOAT" => Self::Float,
            "QTY" | "QUANTITY" => Self::Qty,
            "PRICE" => Self::Price,
            "PRICEOFFSET" => Self::PriceOffset,
            "AMT" | "AMOUNT" => Self::Amt,
            "PERCENTAGE" => Self::Percentage,
            "CHAR" => Self::Char,
            "BOOLEAN" => Self::Boolean,
            "MULTIPLECHARVALUE" => Self::MultipleCharValue,
            "MULTIPLESTRINGVALUE" | "MULTIPLEVALUESTRING" => Self::MultipleStringValue,
            "COUNTRY" => Self::Country,
            "CURRENCY" => Self::Currency,
            "EXCHANGE" => Self::Exchange,
            "MONTHYEAR" => Self::MonthYear,
            "UTCTIMESTAMP" => Self::UtcTimestamp,
            "UTCTIMEONLY" => Self::UtcTimeOnly,
            "UTCDATEONLY" => Self::UtcDateOnly,
            "LOCALMKTDATE" => Self::LocalMktDate,
            "DATA" => Self::Data,
            _ => Self::String,
        })
    }
}

/// Shape of a field inside a message layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A plain value.
    Scalar,
    /// The count field of a repeating group, with the layout of one row.
    GroupHeader {
        /// Parts of one row, in declared order. The first field is the delimiter.
        members: Vec<MessagePart>,
    },
}

/// Definition of a protocol field.
///
/// The dictionary's global field table holds every field as
/// [`FieldKind::Scalar`]. Group layouts depend on where the group is used,
/// so copies embedded in message parts carry [`FieldKind::GroupHeader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Enumerated values: raw value to description.
    pub values: BTreeMap<String, String>,
    /// Whether the field is required where it is declared.
    pub required: bool,
    /// Scalar or group header.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Creates a new scalar field definition.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `name` - The field name
    /// * `field_type` - The field data type
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            tag,
            name: name.into(),
            field_type,
            values: BTreeMap::new(),
            required: false,
            kind: FieldKind::Scalar,
        }
    }

    /// Adds one enumerated value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>, description: impl Into<String>) -> Self {
        self.values.insert(value.into(), description.into());
        self
    }

    /// Returns a copy declared with the given presence and kind.
    #[must_use]
    pub fn declared(&self, required: bool, kind: FieldKind) -> Self {
        Self {
            required,
            kind,
            ..self.clone()
        }
    }

    /// Returns the description of an enumerated value, if any.
    #[must_use]
    pub fn describe(&self, value: &str) -> Option<&str> {
        self.values.get(value).map(String::as_str)
    }

    /// Returns true if the field is declared as a group header.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::GroupHeader { .. })
    }

    /// Returns the row layout of a group header.
    #[must_use]
    pub fn members(&self) -> Option<&[MessagePart]> {
        match &self.kind {
            FieldKind::GroupHeader { members } => Some(members),
            FieldKind::Scalar => None,
        }
    }
}

/// Reference to a component from a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// Component name.
    pub name: String,
    /// Whether the component is required.
    pub required: bool,
}

/// One entry of a message, component, group, header or trailer layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePart {
    /// A field, possibly a group header.
    Field(FieldDef),
    /// A component expanded in place.
    Component(ComponentRef),
}

/// Definition of a reusable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Component name.
    pub name: String,
    /// Parts in declared order.
    pub parts: Vec<MessagePart>,
}

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    /// Administrative message (session level).
    Admin,
    /// Application message.
    #[default]
    App,
}

/// Definition of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    /// Message type value (tag 35).
    pub msg_type: String,
    /// Message name.
    pub name: String,
    /// Message category.
    pub category: MessageCategory,
    /// Body parts in declared order.
    pub parts: Vec<MessagePart>,
}

/// Complete protocol dictionary.
///
/// Built once by a loader and shared read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    begin_string: String,
    fields: HashMap<u32, FieldDef>,
    fields_by_name: HashMap<String, u32>,
    messages: HashMap<String, MessageDef>,
    components: HashMap<String, ComponentDef>,
    header: Vec<MessagePart>,
    trailer: Vec<MessagePart>,
}

impl Dictionary {
    /// Creates a new empty dictionary.
    ///
    /// # Arguments
    /// * `begin_string` - The BeginString the dictionary describes (e.g., "FIX.4.4")
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            begin_string: begin_string.into(),
            ..Self::default()
        }
    }

    /// Adds a field definition to the global table.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields_by_name.insert(field.name.clone(), field.tag);
        self.fields.insert(field.tag, field);
    }

    /// Adds a message definition.
    pub fn add_message(&mut self, message: MessageDef) {
        self.messages.insert(message.msg_type.clone(), message);
    }

    /// Adds a component definition.
    pub fn add_component(&mut self, component: ComponentDef) {
        self.components.insert(component.name.clone(), component);
    }

    /// Sets the standard header layout.
    pub fn set_header(&mut self, parts: Vec<MessagePart>) {
        self.header = parts;
    }

    /// Sets the standard trailer layout.
    pub fn set_trailer(&mut self, parts: Vec<MessagePart>) {
        self.trailer = parts;
    }

    /// Returns the BeginString this dictionary describes.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Gets a field definition by tag.
    #[must_use]
    pub fn field(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.get(&tag)
    }

    /// Gets a field definition by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name
            .get(name)
            .and_then(|tag| self.fields.get(tag))
    }

    /// Gets a message definition by type.
    #[must_use]
    pub fn message(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Returns the body layout of a message type.
    ///
    /// Unknown message types have an empty layout.
    #[must_use]
    pub fn message_parts(&self, msg_type: &str) -> &[MessagePart] {
        self.messages
            .get(msg_type)
            .map(|m| m.parts.as_slice())
            .unwrap_or_default()
    }

    /// Returns the standard header layout.
    #[must_use]
    pub fn header_parts(&self) -> &[MessagePart] {
        &self.header
    }

    /// Returns the standard trailer layout.
    #[must_use]
    pub fn trailer_parts(&self) -> &[MessagePart] {
        &self.trailer
    }

    /// Gets a component definition by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    /// Flattens a layout into its field definitions, in declared order.
    ///
    /// Components are expanded recursively. Group members stay inside their
    /// group header and are not part of the result.
    #[must_use]
    pub fn expand<'a>(&'a self, parts: &'a [MessagePart]) -> Vec<&'a FieldDef> {
        let mut out = Vec::with_capacity(parts.len());
        self.expand_into(parts, &mut out);
        out
    }

    fn expand_into<'a>(&'a self, parts: &'a [MessagePart], out: &mut Vec<&'a FieldDef>) {
        for part in parts {
            match part {
                MessagePart::Field(def) => out.push(def),
                MessagePart::Component(reference) => {
                    if let Some(component) = self.components.get(&reference.name) {
                        self.expand_into(&component.parts, out);
                    }
                }
            }
        }
    }

    /// Returns an iterator over all field definitions.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Returns an iterator over all message definitions.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDef> {
        self.messages.values()
    }

    /// Returns an iterator over all component definitions.
    pub fn components(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components.values()
    }
}
