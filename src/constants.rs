//! UBX Protocol Constants
//!
//! Wire-level constants for the UBX framing used by u-blox receivers, plus the
//! fixed serial settings and artifact naming used by the campaign.

use std::time::Duration;

/// UBX sync characters opening every frame.
pub const UBX_PREAMBLE: [u8; 2] = [0xB5, 0x62];

/// Bytes before the payload: preamble, class, ID and the 16-bit length field.
pub const UBX_HEADER_LEN: usize = 6;

/// Header bytes read after the preamble (class, ID, length lo, length hi).
pub const UBX_HEADER_TAIL_LEN: usize = 4;

/// Trailing checksum bytes (CK_A, CK_B).
pub const UBX_CHECKSUM_LEN: usize = 2;

/// Framing overhead on top of the payload.
pub const UBX_FRAME_OVERHEAD: usize = UBX_HEADER_LEN + UBX_CHECKSUM_LEN;

/// Largest payload the 16-bit length field can describe.
pub const UBX_MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Largest possible UBX frame: preamble, class, ID, length, 65535 payload bytes, checksum.
pub const UBX_MAXLEN: usize = 2 + 1 + 1 + 2 + UBX_MAX_PAYLOAD_LEN + 2;

// ----------------------------------------------------------------------------
// Acknowledgement messages (class 0x05)
// ----------------------------------------------------------------------------

pub const UBX_CLASS_ACK: u8 = 0x05;
pub const UBX_ID_ACK_NAK: u8 = 0x00;
pub const UBX_ID_ACK_ACK: u8 = 0x01;

/// ACK-ACK acknowledging a CFG-VALSET (0x06 0x8A) request.
pub const UBX_ACK_ACK: [u8; 10] = [0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x8A, 0x98, 0xC1];

/// ACK-NAK rejecting a CFG-VALSET (0x06 0x8A) request.
pub const UBX_ACK_NAK: [u8; 10] = [0xB5, 0x62, 0x05, 0x00, 0x02, 0x00, 0x06, 0x8A, 0x97, 0xBC];

// ----------------------------------------------------------------------------
// Serial link and campaign defaults
// ----------------------------------------------------------------------------

/// Factory default baud rate of the MAX-M10S UART.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Per-stage read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_CORPUS_DIR: &str = "corpus";
pub const DEFAULT_CRASHES_DIR: &str = "crashes";

/// Suffix appended to the hex digest of a crash artifact.
pub const CRASH_FILE_SUFFIX: &str = ".crash";
