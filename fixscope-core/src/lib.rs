/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope Core
//!
//! Core types and error definitions shared by every fixscope crate.
//!
//! This crate provides:
//! - **Error types**: Load-time, framing and per-group errors with `thiserror`
//! - **Field types**: `FieldTag` and the zero-copy `FieldRef`
//! - **Message types**: `MsgType`, `RawMessage`, and the parsed `Message`
//!   built from `FieldMap` segments and `Group` rows

pub mod error;
pub mod field;
pub mod message;

pub use error::{DecodeError, DictionaryError, FixError, GroupError, Result};
pub use field::{FieldRef, FieldTag};
pub use message::{FieldMap, Group, Message, MsgType, RawMessage};
