/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Message types and parsed message structures.
//!
//! This module provides:
//! - [`MsgType`]: Message types the toolkit reacts to
//! - [`RawMessage`]: Zero-copy, wire-ordered view of a framed message
//! - [`FieldMap`]: One segment (header, body, trailer) or one group row
//! - [`Group`]: The rows of a repeating group
//! - [`Message`]: Header, body and trailer of a parsed message

use crate::error::GroupError;
use crate::field::FieldRef;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Message types handled explicitly by the toolkit.
///
/// Any other value is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Security Definition Request (c).
    SecurityDefinitionRequest,
    /// Security Definition (d).
    SecurityDefinition,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Order Mass Cancel Request (q).
    OrderMassCancelRequest,
    /// Order Mass Cancel Report (r).
    OrderMassCancelReport,
    /// Security List Request (x).
    SecurityListRequest,
    /// Security List (y).
    SecurityList,
    /// New Order Multileg (AB).
    NewOrderMultileg,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "c" => Self::SecurityDefinitionRequest,
            "d" => Self::SecurityDefinition,
            "j" => Self::BusinessMessageReject,
            "q" => Self::OrderMassCancelRequest,
            "r" => Self::OrderMassCancelReport,
            "x" => Self::SecurityListRequest,
            "y" => Self::SecurityList,
            "AB" => Self::NewOrderMultileg,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::SecurityDefinitionRequest => "c",
            Self::SecurityDefinition => "d",
            Self::BusinessMessageReject => "j",
            Self::OrderMassCancelRequest => "q",
            Self::OrderMassCancelReport => "r",
            Self::SecurityListRequest => "x",
            Self::SecurityList => "y",
            Self::NewOrderMultileg => "AB",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Zero-copy view into a framed message buffer.
///
/// Fields are kept in wire order, repeated tags included, so that a
/// dictionary-aware parser can later split them into segments and groups.
#[derive(Debug, Clone)]
pub struct RawMessage<'a> {
    /// The complete message buffer.
    buffer: &'a [u8],
    /// The parsed message type.
    msg_type: MsgType,
    /// Field references in wire order.
    fields: SmallVec<[FieldRef<'a>; 32]>,
}

impl<'a> RawMessage<'a> {
    /// Creates a new RawMessage from parsed components.
    ///
    /// # Arguments
    /// * `buffer` - The complete message buffer
    /// * `msg_type` - The parsed message type
    /// * `fields` - Field references in wire order
    #[must_use]
    pub fn new(buffer: &'a [u8], msg_type: MsgType, fields: SmallVec<[FieldRef<'a>; 32]>) -> Self {
        Self {
            buffer,
            msg_type,
            fields,
        }
    }

    /// Returns the complete message buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub fn msg_type(&self) -> &MsgType {
        &self.msg_type
    }

    /// Returns the fields in wire order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldRef<'a>] {
        &self.fields
    }

    /// Gets the first field with the given tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldRef<'a>> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Gets the first field with the given tag as a string.
    #[must_use]
    pub fn get_field_str(&self, tag: u32) -> Option<&'a str> {
        self.get_field(tag).and_then(|f| f.as_str().ok())
    }

    /// Returns the BeginString value (e.g., "FIX.4.4").
    #[must_use]
    pub fn begin_string(&self) -> &'a str {
        self.get_field_str(8).unwrap_or("")
    }
}

/// One message segment or one group row.
///
/// Values are keyed by tag; repeating groups are stored next to the
/// count field that introduces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<u32, String>,
    groups: BTreeMap<u32, Group>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, replacing any previous value for the tag.
    pub fn set(&mut self, tag: u32, value: impl Into<String>) {
        self.values.insert(tag, value.into());
    }

    /// Sets a field value unless the tag already has one.
    ///
    /// Returns false if an earlier value was kept.
    pub fn set_first(&mut self, tag: u32, value: impl Into<String>) -> bool {
        match self.values.entry(tag) {
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Builder-style variant of [`FieldMap::set`].
    #[must_use]
    pub fn with(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.set(tag, value);
        self
    }

    /// Attaches a repeating group under its count tag.
    ///
    /// The count field itself is set to the number of rows unless a value
    /// is already present.
    pub fn set_group(&mut self, group: Group) {
        self.values
            .entry(group.count_tag)
            .or_insert_with(|| group.len().to_string());
        self.groups.insert(group.count_tag, group);
    }

    /// Builder-style variant of [`FieldMap::set_group`].
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.set_group(group);
        self
    }

    /// Gets the raw value of a field.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Returns true if the tag has a value.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.values.contains_key(&tag)
    }

    /// Returns the stored group for a count tag, without validation.
    #[must_use]
    pub fn raw_group(&self, tag: u32) -> Option<&Group> {
        self.groups.get(&tag)
    }

    /// Fetches a repeating group and checks it against its template.
    ///
    /// The count field must parse as a row count equal to the number of
    /// stored rows, and every tag of every row must appear in `template`.
    /// A count of zero without stored rows yields no rows.
    ///
    /// # Errors
    /// Returns the [`GroupError`] describing why the rows cannot be used.
    pub fn group(&self, tag: u32, template: &[u32]) -> Result<&[FieldMap], GroupError> {
        let raw = self.get(tag).unwrap_or("0");
        let expected: usize = raw.parse().map_err(|_| GroupError::InvalidCount {
            tag,
            value: raw.to_string(),
        })?;

        let Some(group) = self.groups.get(&tag) else {
            if expected == 0 {
                return Ok(&[]);
            }
            return Err(GroupError::MissingRows { tag, expected });
        };

        if group.len() != expected {
            return Err(GroupError::CountMismatch {
                tag,
                expected,
                actual: group.len(),
            });
        }

        for (row, fields) in group.rows().iter().enumerate() {
            if let Some(unexpected) = fields.tags().find(|t| !template.contains(t)) {
                return Err(GroupError::UnexpectedTag {
                    tag,
                    row,
                    unexpected,
                });
            }
        }

        Ok(group.rows())
    }

    /// Returns all tags with a value, in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.keys().copied()
    }

    /// Returns the number of fields with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the map holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rows of a repeating group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    count_tag: u32,
    rows: Vec<FieldMap>,
}

impl Group {
    /// Creates a group from its count tag and rows.
    #[must_use]
    pub fn new(count_tag: u32, rows: Vec<FieldMap>) -> Self {
        Self { count_tag, rows }
    }

    /// Returns the tag of the count field.
    #[must_use]
    pub const fn count_tag(&self) -> u32 {
        self.count_tag
    }

    /// Returns the rows in wire order.
    #[must_use]
    pub fn rows(&self) -> &[FieldMap] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the group has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A parsed message split into its three segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Standard header.
    pub header: FieldMap,
    /// Message body.
    pub body: FieldMap,
    /// Standard trailer.
    pub trailer: FieldMap,
}

impl Message {
    /// Returns the message type from the header (tag 35).
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.header.get(35).map(|s| s.parse().unwrap_or_default())
    }
}
