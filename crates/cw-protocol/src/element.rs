//! Element encoding/decoding
//!
//! An instruction is a list of elements, each written as
//! `LENGTH.VALUE`, separated by `,` and terminated by `;`:
//!
//! ```text
//! 4.size,1.0,4.1024,3.768;
//! ```
//!
//! LENGTH counts Unicode scalar values, not bytes, so the decoder walks
//! UTF-8 sequences rather than slicing at a byte offset.

use bytes::BytesMut;

use crate::error::ProtocolError;

/// Maximum accepted element length in characters
pub const MAX_ELEMENT_LENGTH: usize = 4 * 1024 * 1024;

/// Maximum bytes buffered while waiting for an instruction terminator
pub const MAX_INSTRUCTION_SIZE: usize = 16 * 1024 * 1024;

/// Append one element (`len.value`) to `dst`
pub fn encode_element(value: &str, dst: &mut BytesMut) {
    let len = value.chars().count().to_string();
    dst.reserve(len.len() + 1 + value.len() + 1);
    dst.extend_from_slice(len.as_bytes());
    dst.extend_from_slice(b".");
    dst.extend_from_slice(value.as_bytes());
}

/// Encode a full instruction from its elements, opcode first
pub fn encode_elements<'a, I>(elements: I, dst: &mut BytesMut)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first = true;
    for element in elements {
        if !first {
            dst.extend_from_slice(b",");
        }
        encode_element(element, dst);
        first = false;
    }
    dst.extend_from_slice(b";");
}

/// Try to decode one instruction's elements from the front of `src`.
///
/// Returns `Ok(None)` when the buffer holds only part of an instruction.
/// On success, returns the elements and the number of bytes consumed; the
/// caller is responsible for advancing the buffer.
pub fn decode_elements(src: &[u8]) -> Result<Option<(Vec<String>, usize)>, ProtocolError> {
    let mut elements = Vec::new();
    let mut pos = 0;

    loop {
        // Length prefix
        let digits_start = pos;
        while pos < src.len() && src[pos] != b'.' {
            if !src[pos].is_ascii_digit() {
                let prefix = String::from_utf8_lossy(&src[digits_start..=pos]).into_owned();
                return Err(ProtocolError::InvalidLength(prefix));
            }
            pos += 1;
        }
        if pos >= src.len() {
            return Ok(None);
        }
        let digits = std::str::from_utf8(&src[digits_start..pos])
            .map_err(|_| ProtocolError::InvalidUtf8)?;
        let length: usize = digits
            .parse()
            .map_err(|_| ProtocolError::InvalidLength(digits.to_string()))?;
        if length > MAX_ELEMENT_LENGTH {
            return Err(ProtocolError::ElementTooLarge {
                size: length,
                max: MAX_ELEMENT_LENGTH,
            });
        }
        pos += 1; // '.'

        // Value, `length` characters long
        let value_start = pos;
        for _ in 0..length {
            if pos >= src.len() {
                return Ok(None);
            }
            pos += utf8_width(src[pos]).ok_or(ProtocolError::InvalidUtf8)?;
        }
        if pos >= src.len() {
            return Ok(None);
        }
        let value =
            std::str::from_utf8(&src[value_start..pos]).map_err(|_| ProtocolError::InvalidUtf8)?;
        elements.push(value.to_string());

        // Terminator
        match src[pos] {
            b',' => pos += 1,
            b';' => return Ok(Some((elements, pos + 1))),
            other => return Err(ProtocolError::UnexpectedTerminator(other as char)),
        }
    }
}

/// Width of a UTF-8 sequence from its lead byte
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_counts_characters() {
        let mut buf = BytesMut::new();
        encode_elements(["key", "héllo"], &mut buf);
        assert_eq!(&buf[..], "3.key,5.héllo;".as_bytes());
    }

    #[test]
    fn test_decode_multibyte_element() {
        let input = "9.clipboard,4.日本語!;".as_bytes();
        let (elements, used) = decode_elements(input).unwrap().unwrap();
        assert_eq!(elements, vec!["clipboard", "日本語!"]);
        assert_eq!(used, input.len());
    }

    #[test]
    fn test_decode_leaves_trailing_data() {
        let input = b"3.nop;4.sync,2.10;";
        let (elements, used) = decode_elements(input).unwrap().unwrap();
        assert_eq!(elements, vec!["nop"]);
        assert_eq!(&input[used..], b"4.sync,2.10;");
    }

    #[test]
    fn test_insufficient_bytes() {
        assert!(decode_elements(b"4.size,1.0,4.10").unwrap().is_none());
        assert!(decode_elements(b"4.si").unwrap().is_none());
        assert!(decode_elements(b"12").unwrap().is_none());
    }

    #[test]
    fn test_bad_length_prefix() {
        let result = decode_elements(b"x.abc;");
        assert!(matches!(result, Err(ProtocolError::InvalidLength(_))));
    }

    #[test]
    fn test_bad_terminator() {
        let result = decode_elements(b"3.nop:");
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedTerminator(':'))
        ));
    }

    #[test]
    fn test_oversized_element() {
        let input = format!("{}.x;", MAX_ELEMENT_LENGTH + 1);
        let result = decode_elements(input.as_bytes());
        assert!(matches!(result, Err(ProtocolError::ElementTooLarge { .. })));
    }
}
