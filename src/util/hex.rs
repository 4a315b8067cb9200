//! # Hex Helpers
//!
//! Hex encoding used for crash artifact names, log dumps of raw UBX traffic,
//! and writing frames as `"B5 62 05 01 ..."` strings in tests and fixtures.

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to a lowercase hex string.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string to bytes.
///
/// Accepts both cases; whitespace between bytes is ignored, so frames can be
/// written the way u-center prints them.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }
    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format bytes as uppercase pairs separated by spaces, e.g. `"B5 62 05 01"`.
pub fn format_hex_spaced(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_lowercase() {
        assert_eq!(encode_hex(&[0xB5, 0x62, 0x0A]), "b5620a");
    }

    #[test]
    fn test_decode_with_whitespace() {
        let expected = vec![0xB5, 0x62, 0x05, 0x01];
        assert_eq!(decode_hex("B5 62 05 01").unwrap(), expected);
        assert_eq!(decode_hex("b562\n0501").unwrap(), expected);
    }

    #[test]
    fn test_format_spaced() {
        assert_eq!(format_hex_spaced(&[0xB5, 0x62, 0x05, 0x01]), "B5 62 05 01");
        assert_eq!(format_hex_spaced(&[]), "");
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex("   "), Err(HexError::EmptyString));
        assert_eq!(decode_hex("B56"), Err(HexError::OddLength(3)));
        assert!(matches!(decode_hex("GG"), Err(HexError::DecodeError(_))));
    }
}
