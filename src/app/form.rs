//! `application/x-www-form-urlencoded` value decoding into a bounded buffer.
//!
//! `+` becomes a space and `%XX` becomes the byte `0xXX`.  Decoded bytes
//! beyond the buffer capacity are dropped (the input is still scanned for
//! malformed escapes), and the kept prefix is cut back to the last complete
//! UTF-8 character.

use core::fmt;

use heapless::{String, Vec};

/// Capacity of the display-text buffer fed by the set-text endpoint: 47
/// bytes, the display line minus its terminator.  Matches the form's
/// `maxlength`.
pub const DISPLAY_TEXT_CAPACITY: usize = 47;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `%` not followed by two hex digits.
    MalformedEscape,
    /// The decoded bytes are not UTF-8.
    InvalidUtf8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEscape => write!(f, "malformed percent escape"),
            Self::InvalidUtf8 => write!(f, "decoded text is not UTF-8"),
        }
    }
}

/// A decoded value and whether anything was dropped to fit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<const N: usize> {
    pub text: String<N>,
    pub truncated: bool,
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode one form value into at most `N` bytes.
pub fn decode_form_text<const N: usize>(raw: &str) -> Result<Decoded<N>, DecodeError> {
    let mut bytes: Vec<u8, N> = Vec::new();
    let mut truncated = false;

    let mut input = raw.as_bytes().iter();
    while let Some(&b) = input.next() {
        let decoded = match b {
            b'+' => b' ',
            b'%' => {
                let hi = input.next().copied().and_then(hex_digit);
                let lo = input.next().copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => (hi << 4) | lo,
                    _ => return Err(DecodeError::MalformedEscape),
                }
            }
            other => other,
        };
        if bytes.push(decoded).is_err() {
            truncated = true;
        }
    }

    let kept = match core::str::from_utf8(&bytes) {
        Ok(s) => s.len(),
        // An incomplete trailing sequence is only acceptable if we cut it.
        Err(e) if truncated && e.error_len().is_none() => e.valid_up_to(),
        Err(_) => return Err(DecodeError::InvalidUtf8),
    };
    bytes.truncate(kept);

    let text = String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    Ok(Decoded { text, truncated })
}
