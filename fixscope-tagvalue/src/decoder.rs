/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Zero-copy tag=value framing.
//!
//! The decoder splits one framed message into field references pointing
//! into the original buffer. It checks the fixed prefix (BeginString,
//! BodyLength, MsgType) and optionally the trailing checksum; everything
//! else is left to the dictionary-aware [`crate::parser::MessageParser`].

use crate::checksum::{calculate_checksum, parse_checksum};
use fixscope_core::error::DecodeError;
use fixscope_core::field::FieldRef;
use fixscope_core::message::{MsgType, RawMessage};
use memchr::{memchr, memchr_iter};
use smallvec::SmallVec;

/// SOH (Start of Header) delimiter used in tag=value messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Zero-copy message decoder.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
    validate_checksum: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    ///
    /// Checksum validation is off by default: logged messages are often
    /// edited by hand before being rendered.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            validate_checksum: false,
        }
    }

    /// Sets whether to validate the trailing checksum.
    #[inline]
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Decodes one message starting at the current offset.
    ///
    /// Decoding stops after the CheckSum field (tag 10), which is kept in the
    /// field list, or at the end of the buffer if there is none.
    ///
    /// # Errors
    /// Returns `DecodeError` if the prefix is malformed, a tag is not a
    /// positive integer, a field is unterminated, or the checksum is wrong
    /// while validation is enabled.
    pub fn decode(&mut self) -> Result<RawMessage<'a>, DecodeError> {
        let start_offset = self.offset;

        let begin_string = self.next_field()?.ok_or(DecodeError::Incomplete)?;
        if begin_string.tag != 8 {
            return Err(DecodeError::InvalidBeginString);
        }

        let body_length = self.next_field()?.ok_or(DecodeError::MissingBodyLength)?;
        if body_length.tag != 9 {
            return Err(DecodeError::MissingBodyLength);
        }
        body_length
            .as_str()?
            .parse::<usize>()
            .map_err(|_| DecodeError::InvalidBodyLength)?;

        let msg_type_field = self.next_field()?.ok_or(DecodeError::MissingMsgType)?;
        if msg_type_field.tag != 35 {
            return Err(DecodeError::MissingMsgType);
        }
        let msg_type: MsgType = msg_type_field.as_str()?.parse().unwrap_or_default();

        let mut fields: SmallVec<[FieldRef<'a>; 32]> = SmallVec::new();
        fields.push(begin_string);
        fields.push(body_length);
        fields.push(msg_type_field);

        let mut checksum: Option<(usize, FieldRef<'a>)> = None;
        loop {
            let field_start = self.offset;
            let Some(field) = self.next_field()? else {
                break;
            };
            fields.push(field);
            if field.tag == 10 {
                checksum = Some((field_start, field));
                break;
            }
        }

        if self.validate_checksum {
            let (checksum_start, field) = checksum.ok_or(DecodeError::Incomplete)?;
            let declared =
                parse_checksum(field.value).ok_or_else(|| DecodeError::InvalidFieldValue {
                    tag: 10,
                    reason: "invalid checksum format".to_string(),
                })?;
            let calculated = calculate_checksum(&self.input[start_offset..checksum_start]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        Ok(RawMessage::new(
            &self.input[start_offset..self.offset],
            msg_type,
            fields,
        ))
    }

    /// Parses the next field from the buffer.
    ///
    /// Returns `Ok(None)` once the buffer is exhausted.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidTag` if the tag is not a positive integer
    /// and `DecodeError::Incomplete` if the field is not terminated by SOH.
    #[inline]
    pub fn next_field(&mut self) -> Result<Option<FieldRef<'a>>, DecodeError> {
        if self.offset >= self.input.len() {
            return Ok(None);
        }

        let remaining = &self.input[self.offset..];
        let eq_pos = memchr(EQUALS, remaining).ok_or(DecodeError::Incomplete)?;
        let tag = parse_tag(&remaining[..eq_pos]).ok_or(DecodeError::InvalidTag {
            offset: self.offset,
        })?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..]).ok_or(DecodeError::Incomplete)?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;
        Ok(Some(FieldRef::new(tag, value)))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }
}

/// Parses a tag number from ASCII digits. Zero is not a valid tag.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    (result > 0).then_some(result)
}

/// Returns a copy of `input` with every `from` byte replaced by `to`.
///
/// Converts between SOH-delimited wire messages and the `|`-delimited form
/// found in log files.
#[must_use]
pub fn replace_delimiter(input: &[u8], from: u8, to: u8) -> Vec<u8> {
    let mut out = input.to_vec();
    for pos in memchr_iter(from, input) {
        out[pos] = to;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag(b"8"), Some(8));
        assert_eq!(parse_tag(b"35"), Some(35));
        assert_eq!(parse_tag(b"12345"), Some(12345));
        assert_eq!(parse_tag(b""), None);
        assert_eq!(parse_tag(b"0"), None);
        assert_eq!(parse_tag(b"abc"), None);
        assert_eq!(parse_tag(b"12a"), None);
    }

    #[test]
    fn test_next_field() {
        let input = b"8=FIX.4.4\x019=5\x0135=0\x01";
        let mut decoder = Decoder::new(input);

        let field1 = decoder.next_field().unwrap().unwrap();
        assert_eq!(field1.tag, 8);
        assert_eq!(field1.as_str().unwrap(), "FIX.4.4");

        let field2 = decoder.next_field().unwrap().unwrap();
        assert_eq!(field2.tag, 9);

        let field3 = decoder.next_field().unwrap().unwrap();
        assert_eq!(field3.tag, 35);
        assert_eq!(field3.as_str().unwrap(), "0");

        assert!(decoder.next_field().unwrap().is_none());
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_unterminated_field() {
        let mut decoder = Decoder::new(b"8=FIX.4.4");
        assert_eq!(decoder.next_field(), Err(DecodeError::Incomplete));
    }

    #[test]
    fn test_invalid_tag_offset() {
        let mut decoder = Decoder::new(b"8=FIX.4.4\x01X=1\x01");
        decoder.next_field().unwrap();
        assert_eq!(
            decoder.next_field(),
            Err(DecodeError::InvalidTag { offset: 10 })
        );
    }

    #[test]
    fn test_decode_keeps_wire_order_and_checksum() {
        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_str(35, "D");
        encoder.put_str(11, "42");
        encoder.put_str(54, "1");
        let message = encoder.finish();

        let raw = Decoder::new(&message)
            .with_checksum_validation(true)
            .decode()
            .unwrap();
        assert_eq!(raw.msg_type(), &MsgType::NewOrderSingle);
        assert_eq!(raw.begin_string(), "FIX.4.4");
        let tags: Vec<u32> = raw.fields().iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![8, 9, 35, 11, 54, 10]);
        assert_eq!(raw.buffer().len(), message.len());
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let input = b"8=FIX.4.4\x019=5\x0135=0\x0110=000\x01";
        let result = Decoder::new(input).with_checksum_validation(true).decode();
        assert!(matches!(result, Err(DecodeError::ChecksumMismatch { declared: 0, .. })));

        assert!(Decoder::new(input).decode().is_ok());
    }

    #[test]
    fn test_decode_prefix_errors() {
        assert_eq!(
            Decoder::new(b"9=5\x01").decode().unwrap_err(),
            DecodeError::InvalidBeginString
        );
        assert_eq!(
            Decoder::new(b"8=FIX.4.4\x0135=0\x01").decode().unwrap_err(),
            DecodeError::MissingBodyLength
        );
        assert_eq!(
            Decoder::new(b"8=FIX.4.4\x019=x\x01").decode().unwrap_err(),
            DecodeError::InvalidBodyLength
        );
        assert_eq!(
            Decoder::new(b"8=FIX.4.4\x019=5\x0149=A\x01").decode().unwrap_err(),
            DecodeError::MissingMsgType
        );
        assert_eq!(Decoder::new(b"").decode().unwrap_err(), DecodeError::Incomplete);
    }

    #[test]
    fn test_replace_delimiter() {
        assert_eq!(
            replace_delimiter(b"8=FIX.4.4|35=0|", b'|', SOH),
            b"8=FIX.4.4\x0135=0\x01".to_vec()
        );
    }
}
