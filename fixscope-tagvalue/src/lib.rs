/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope Tag-Value
//!
//! Tag=value framing and parsing for fixscope.
//!
//! ## Features
//!
//! - **Zero-copy framing**: Field values reference the original buffer
//! - **SIMD-accelerated**: Uses `memchr` for delimiter search
//! - **Segmenting parser**: Splits messages into header, body, trailer and
//!   group rows using a protocol dictionary

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod parser;

pub use checksum::calculate_checksum;
pub use decoder::{Decoder, SOH, replace_delimiter};
pub use encoder::Encoder;
pub use fixscope_core::message::RawMessage;
pub use parser::MessageParser;
