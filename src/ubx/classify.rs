//! # Response Classification
//!
//! Turns the result of a framed read into a [`Verdict`]. Only the two
//! acknowledgement frames count as a concluded round trip; every other answer
//! (or no answer) is something worth keeping as a crash.

use crate::constants::{UBX_ACK_ACK, UBX_ACK_NAK};
use crate::ubx::frame::UbxFrame;
use crate::ubx::reader::{ReadOutcome, ReadStage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a response was structurally unacceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// The trailing checksum does not match the covered bytes.
    Checksum,
    /// Checksum is fine but the frame is neither ACK-ACK nor ACK-NAK.
    UnknownResponse,
}

/// Terminal classification of one request/response round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Ack,
    Nak,
    StructuralMismatch { kind: MismatchKind },
    Timeout { stage: ReadStage },
}

impl Verdict {
    /// ACK and NAK both conclude the round trip successfully.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Ack | Verdict::Nak)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ack => write!(f, "ACK"),
            Verdict::Nak => write!(f, "NAK"),
            Verdict::StructuralMismatch {
                kind: MismatchKind::Checksum,
            } => write!(f, "Checksum mismatch"),
            Verdict::StructuralMismatch {
                kind: MismatchKind::UnknownResponse,
            } => write!(f, "Response mismatch, neither ACK nor NAK"),
            Verdict::Timeout { stage } => write!(f, "Timeout while reading {stage}"),
        }
    }
}

/// Classifies the outcome of [`FramedReader::read_frame`](crate::ubx::reader::FramedReader::read_frame).
pub fn classify(outcome: &ReadOutcome) -> Verdict {
    match outcome {
        ReadOutcome::Timeout { stage, .. } => Verdict::Timeout { stage: *stage },
        ReadOutcome::Frame(frame) => classify_frame(frame),
    }
}

/// Classifies a complete frame: checksum first, then an exact match against
/// the acknowledgement constants over the frame's full length.
pub fn classify_frame(frame: &UbxFrame) -> Verdict {
    if !frame.verify() {
        return Verdict::StructuralMismatch {
            kind: MismatchKind::Checksum,
        };
    }

    let bytes = frame.as_bytes();
    if bytes == UBX_ACK_ACK {
        Verdict::Ack
    } else if bytes == UBX_ACK_NAK {
        Verdict::Nak
    } else {
        Verdict::StructuralMismatch {
            kind: MismatchKind::UnknownResponse,
        }
    }
}
