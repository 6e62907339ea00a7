//! Percent-encoding and decoding for URL paths and components.
//!
//! Encoding leaves `[A-Za-z0-9-_.~/]` untouched so that whole paths can be
//! embedded in links without escaping their separators. Decoding is
//! tolerant: invalid or truncated `%XX` sequences are kept literally.
//!
//! `+` is NOT treated as a space here; form fields apply that substitution
//! before decoding (see [`crate::fields`]).
//!
//! # Example
//!
//! ```
//! use shelf_http::{percent_decode, percent_encode};
//!
//! assert_eq!(percent_encode("/docs/a b.txt"), "/docs/a%20b.txt");
//! assert_eq!(&*percent_decode("/docs/a%20b.txt"), "/docs/a b.txt");
//! ```

use std::borrow::Cow;

/// Percent-encode a string for embedding in a URL.
///
/// Alphanumerics and `-_.~/` pass through; every other byte becomes `%XX`
/// (uppercase hex). Multi-byte characters are encoded per UTF-8 byte.
///
/// # Example
///
/// ```
/// use shelf_http::percent_encode;
///
/// assert_eq!(percent_encode("report 2024.txt"), "report%202024.txt");
/// assert_eq!(percent_encode("/files/café"), "/files/caf%C3%A9");
/// ```
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(hex_char(b >> 4));
            out.push(hex_char(b & 0x0F));
        }
    }
    out
}

/// Percent-decode a string.
///
/// Returns `Cow::Borrowed` if no decoding was needed (the common case),
/// or `Cow::Owned` if percent sequences were decoded.
///
/// Invalid sequences (bad hex, truncated escape) are left as-is for
/// robustness; decoded bytes that do not form valid UTF-8 are replaced
/// lossily.
///
/// # Example
///
/// ```
/// use shelf_http::percent_decode;
///
/// let simple = percent_decode("hello");
/// assert!(matches!(simple, std::borrow::Cow::Borrowed(_)));
///
/// assert_eq!(&*percent_decode("hello%20world"), "hello world");
/// assert_eq!(&*percent_decode("%ZZ"), "%ZZ");
/// ```
#[must_use]
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    // Fast path: no escapes
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }

    let mut result = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                result.push(hi << 4 | lo);
                i += 3;
            } else {
                // Invalid hex, keep as-is
                result.push(b'%');
                i += 1;
            }
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Cow::Owned(String::from_utf8_lossy(&result).into_owned())
}

/// Convert a hex digit to its numeric value.
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Convert a nibble to its uppercase hex character.
fn hex_char(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        _ => (b'A' + nibble - 10) as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_leaves_safe_set() {
        let safe = "AZaz09-_.~/";
        assert_eq!(percent_encode(safe), safe);
    }

    #[test]
    fn encode_escapes_space_and_punctuation() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("100%"), "100%25");
    }

    #[test]
    fn encode_uses_uppercase_hex() {
        assert_eq!(percent_encode("\x7f"), "%7F");
    }

    #[test]
    fn encode_multibyte_per_utf8_byte() {
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    #[test]
    fn decode_no_escapes_is_borrowed() {
        let decoded = percent_decode("plain/path.txt");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(&*decoded, "plain/path.txt");
    }

    #[test]
    fn decode_simple_escapes() {
        assert_eq!(&*percent_decode("hello%20world"), "hello world");
        assert_eq!(&*percent_decode("%2Farchive"), "/archive");
        assert_eq!(&*percent_decode("%3D"), "=");
    }

    #[test]
    fn decode_keeps_invalid_escapes() {
        assert_eq!(&*percent_decode("%ZZ"), "%ZZ");
        assert_eq!(&*percent_decode("%2"), "%2");
        assert_eq!(&*percent_decode("100%"), "100%");
    }

    #[test]
    fn decode_leaves_plus_alone() {
        assert_eq!(&*percent_decode("a+b"), "a+b");
    }

    #[test]
    fn decode_utf8_sequence() {
        assert_eq!(&*percent_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn round_trip_printable_ascii() {
        let all: String = (0x20u8..0x7f).map(|b| b as char).collect();
        assert_eq!(&*percent_decode(&percent_encode(&all)), all);
    }

    #[test]
    fn round_trip_path_with_spaces() {
        let path = "/docs/annual report (final).txt";
        assert_eq!(&*percent_decode(&percent_encode(path)), path);
    }

    #[test]
    fn hex_digit_values() {
        assert_eq!(hex_digit(b'0'), Some(0));
        assert_eq!(hex_digit(b'9'), Some(9));
        assert_eq!(hex_digit(b'a'), Some(10));
        assert_eq!(hex_digit(b'F'), Some(15));
        assert_eq!(hex_digit(b'g'), None);
    }
}
