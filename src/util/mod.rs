//! # Utility Modules
//!
//! Small helpers shared by the codec, the campaign and the tests.

pub mod hex;

pub use hex::{decode_hex, encode_hex, format_hex_spaced, HexError};
