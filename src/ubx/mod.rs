//! The ubx module contains the protocol side of the harness: frame codec,
//! serial transport, staged frame reader and response classification.

pub mod classify;
pub mod frame;
pub mod reader;
pub mod serial;
pub mod serial_mock;

pub use classify::{classify, classify_frame, MismatchKind, Verdict};
pub use frame::{compute_checksum, pack_frame, parse_frame, verify_checksum, UbxFrame};
pub use reader::{FramedReader, ReadOutcome, ReadStage};
pub use serial::{DeviceHandle, SerialConfig, SerialDeviceHandle, Transport};
