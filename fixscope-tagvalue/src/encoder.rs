/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Tag=value message builder.
//!
//! Produces framed messages with BeginString, BodyLength and CheckSum filled
//! in. Used to build outgoing messages stamped with request tokens.

use crate::checksum::{calculate_checksum, format_checksum};
use crate::decoder::SOH;
use bytes::{BufMut, BytesMut};

/// Message encoder.
#[derive(Debug)]
pub struct Encoder {
    body: BytesMut,
    begin_string: String,
}

impl Encoder {
    /// Creates a new encoder with the specified BeginString.
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string: begin_string.into(),
        }
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        self.body.put_slice(tag_buf.format(tag).as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Appends every `(tag, value)` pair in order.
    pub fn put_fields<'v>(&mut self, fields: impl IntoIterator<Item = (u32, &'v str)>) {
        for (tag, value) in fields {
            self.put_str(tag, value);
        }
    }

    /// Frames the message: prepends BeginString and BodyLength, appends CheckSum.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(self.body.len());

        let mut message = BytesMut::with_capacity(self.body.len() + 32);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");
        message.put_slice(len_str.as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = format_checksum(calculate_checksum(&message));
        message.put_slice(b"10=");
        message.put_slice(&checksum);
        message.put_u8(SOH);
        message
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new("FIX.4.4")
    }
}
