//! # UBX Frame Codec
//!
//! Parsing, packing and checksum verification of UBX frames:
//!
//! ```text
//! B5 62 | class | id | len_lo len_hi | payload (len bytes) | ck_a ck_b
//! ```
//!
//! The checksum is the 8-bit Fletcher sum over everything between the
//! preamble and the checksum itself (class, id, length field, payload).
//!
//! ## Usage
//!
//! ```rust
//! use ubx_fuzz::ubx::frame::{pack_frame, parse_frame, verify_checksum};
//!
//! let frame = pack_frame(0x05, 0x01, &[0x06, 0x8A]).unwrap();
//! assert_eq!(frame.checksum(), [0x98, 0xC1]);
//! assert!(verify_checksum(frame.as_bytes()));
//!
//! let (rest, parsed) = parse_frame(frame.as_bytes()).unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(parsed, frame);
//! ```

use crate::constants::{
    UBX_CHECKSUM_LEN, UBX_FRAME_OVERHEAD, UBX_HEADER_LEN, UBX_MAX_PAYLOAD_LEN, UBX_PREAMBLE,
};
use crate::error::FuzzError;
use bytes::{BufMut, Bytes, BytesMut};
use nom::bytes::complete::{tag, take};
use nom::number::complete::{be_u8, le_u16};
use nom::IResult;

/// A complete UBX frame, preamble through checksum.
///
/// Only constructed by [`parse_frame`], [`pack_frame`] or
/// [`UbxFrame::from_bytes`], so the buffer always starts with the preamble
/// and is exactly `length + 8` bytes long. The checksum is *not* guaranteed
/// to be correct; see [`UbxFrame::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    raw: Bytes,
}

impl UbxFrame {
    /// Builds a frame from a buffer holding exactly one frame.
    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self, FuzzError> {
        let raw = raw.into();
        let (rest, frame) =
            parse_frame(&raw).map_err(|e| FuzzError::FrameParseError(format!("{e:?}")))?;
        if !rest.is_empty() {
            return Err(FuzzError::FrameParseError(format!(
                "{} trailing bytes after frame",
                rest.len()
            )));
        }
        Ok(frame)
    }

    pub fn class(&self) -> u8 {
        self.raw[2]
    }

    pub fn id(&self) -> u8 {
        self.raw[3]
    }

    /// Payload length as declared by the length field.
    pub fn length(&self) -> u16 {
        u16::from_le_bytes([self.raw[4], self.raw[5]])
    }

    pub fn payload(&self) -> &[u8] {
        &self.raw[UBX_HEADER_LEN..self.raw.len() - UBX_CHECKSUM_LEN]
    }

    /// The checksum as received (not recomputed).
    pub fn checksum(&self) -> [u8; 2] {
        let n = self.raw.len();
        [self.raw[n - 2], self.raw[n - 1]]
    }

    /// The whole frame on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Bytes {
        self.raw
    }

    /// Total frame size, always `length + 8`.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Never true: even an empty payload leaves eight framing bytes.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Checks the trailing checksum against the covered bytes.
    pub fn verify(&self) -> bool {
        verify_checksum(&self.raw)
    }
}

/// Uses `nom` to parse one UBX frame from the start of `input`.
///
/// The preamble must be at offset 0; resynchronising on a noisy stream is the
/// reader's job. The checksum is not checked here.
pub fn parse_frame(input: &[u8]) -> IResult<&[u8], UbxFrame> {
    let start = input;
    let (input, _) = tag(&UBX_PREAMBLE[..])(input)?;
    let (input, _class) = be_u8(input)?;
    let (input, _id) = be_u8(input)?;
    let (input, length) = le_u16(input)?;
    let (input, _payload) = take(length as usize)(input)?;
    let (input, _checksum) = take(UBX_CHECKSUM_LEN)(input)?;

    let total = length as usize + UBX_FRAME_OVERHEAD;
    Ok((
        input,
        UbxFrame {
            raw: Bytes::copy_from_slice(&start[..total]),
        },
    ))
}

/// Packs class, ID and payload into a frame with a correct checksum.
pub fn pack_frame(class: u8, id: u8, payload: &[u8]) -> Result<UbxFrame, FuzzError> {
    if payload.len() > UBX_MAX_PAYLOAD_LEN {
        return Err(FuzzError::FrameParseError(format!(
            "payload of {} bytes exceeds the 16-bit length field",
            payload.len()
        )));
    }

    let mut buf = BytesMut::with_capacity(payload.len() + UBX_FRAME_OVERHEAD);
    buf.put_slice(&UBX_PREAMBLE);
    buf.put_u8(class);
    buf.put_u8(id);
    buf.put_u16_le(payload.len() as u16);
    buf.put_slice(payload);
    let checksum = compute_checksum(&buf, payload.len());
    buf.put_slice(&checksum);

    Ok(UbxFrame { raw: buf.freeze() })
}

/// 8-bit Fletcher checksum over an already isolated covered range.
pub fn ubx_checksum(covered: &[u8]) -> [u8; 2] {
    let (ck_a, ck_b) = covered.iter().fold((0u8, 0u8), |(ck_a, ck_b), &byte| {
        let ck_a = ck_a.wrapping_add(byte);
        (ck_a, ck_b.wrapping_add(ck_a))
    });
    [ck_a, ck_b]
}

/// Computes the checksum of a frame buffer whose payload is `length` bytes.
///
/// Covers `message[2 .. 6 + length]`. A buffer shorter than that is summed
/// over whatever part of the range it holds.
pub fn compute_checksum(message: &[u8], length: usize) -> [u8; 2] {
    let start = UBX_PREAMBLE.len().min(message.len());
    let end = UBX_HEADER_LEN.saturating_add(length).min(message.len());
    ubx_checksum(&message[start..end])
}

/// Verifies the trailing checksum of a complete frame buffer.
///
/// Returns `false` for anything that is not exactly one frame long according
/// to its own length field.
pub fn verify_checksum(message: &[u8]) -> bool {
    if message.len() < UBX_FRAME_OVERHEAD {
        return false;
    }
    let length = u16::from_le_bytes([message[4], message[5]]) as usize;
    if message.len() != length + UBX_FRAME_OVERHEAD {
        return false;
    }
    compute_checksum(message, length)[..] == message[UBX_HEADER_LEN + length..]
}
