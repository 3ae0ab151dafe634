/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Error types for fixscope.
//!
//! The hierarchy mirrors how failures are surfaced:
//! - [`DictionaryError`] is fatal and stops start-up.
//! - [`DecodeError`] replaces a whole message report with an error text.
//! - [`GroupError`] is reported inline for a single field while the rest of
//!   the message keeps rendering.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all fixscope operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while loading a protocol dictionary.
    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Error while fetching a repeating group.
    #[error("group error: {0}")]
    Group(#[from] GroupError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while framing a raw message into fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// A `tag=value` pair whose tag is not a positive integer.
    #[error("invalid tag format at byte {offset}")]
    InvalidTag {
        /// Byte offset of the offending field.
        offset: usize,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Invalid UTF-8 in a field that must be text.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors raised while loading a protocol dictionary.
///
/// Every variant is fatal: nothing can be rendered without a dictionary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// The dictionary source could not be read.
    #[error("cannot read dictionary {path}: {reason}")]
    Io {
        /// Path of the dictionary source.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// The source extension does not map to a known format.
    #[error("unsupported dictionary format: {0}")]
    UnsupportedFormat(String),

    /// The source is not well-formed XML.
    #[error("xml syntax error: {0}")]
    Xml(String),

    /// The source is not a valid JSON dictionary document.
    #[error("json syntax error: {0}")]
    Json(String),

    /// An element is missing a required attribute.
    #[error("missing `{attribute}` attribute in `{element}` element")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute has a value that cannot be interpreted.
    #[error("invalid `{attribute}` value `{value}` in `{element}` element")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Offending value.
        value: String,
    },

    /// An unexpected element appeared in a member list.
    #[error("unexpected `{0}` element")]
    UnexpectedElement(String),

    /// A message, component or group references an undefined field.
    #[error("unknown field `{name}` referenced by {context}")]
    UnknownField {
        /// Referenced field name.
        name: String,
        /// Where the reference appeared.
        context: String,
    },

    /// A message, component or group references an undefined component.
    #[error("unknown component `{name}` referenced by {context}")]
    UnknownComponent {
        /// Referenced component name.
        name: String,
        /// Where the reference appeared.
        context: String,
    },

    /// Components reference each other in a cycle.
    #[error("component cycle through `{0}`")]
    ComponentCycle(String),

    /// The same tag, field name, component or message type is defined twice.
    #[error("duplicate definition: {0}")]
    Duplicate(String),

    /// A group is declared without members.
    #[error("group `{0}` declares no members")]
    EmptyGroup(String),
}

/// Errors raised while resolving or fetching a repeating group.
///
/// These never abort a render; the renderer prints them inline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// The group tag is not among the enclosing field definitions.
    #[error("group tag {tag} is not declared here")]
    NotDeclared {
        /// Group count tag.
        tag: u32,
    },

    /// The tag is declared but without a member layout.
    #[error("tag {tag} is declared without a group layout")]
    NoLayout {
        /// Group count tag.
        tag: u32,
    },

    /// The count value is not a non-negative integer.
    #[error("invalid group count `{value}` for tag {tag}")]
    InvalidCount {
        /// Group count tag.
        tag: u32,
        /// Raw count value.
        value: String,
    },

    /// The count is positive but no rows were captured.
    #[error("group {tag} declares {expected} rows but none were found")]
    MissingRows {
        /// Group count tag.
        tag: u32,
        /// Declared number of rows.
        expected: usize,
    },

    /// The number of captured rows differs from the declared count.
    #[error("group count mismatch for tag {tag}: expected {expected}, found {actual}")]
    CountMismatch {
        /// Group count tag.
        tag: u32,
        /// Declared number of rows.
        expected: usize,
        /// Number of rows captured.
        actual: usize,
    },

    /// A row holds a tag outside the group template.
    #[error("row {row} of group {tag} holds tag {unexpected} outside the template")]
    UnexpectedTag {
        /// Group count tag.
        tag: u32,
        /// Zero-based row index.
        row: usize,
        /// The offending tag.
        unexpected: u32,
    },
}
