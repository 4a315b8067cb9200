//! # Framed UBX Reader
//!
//! Reassembles one response frame from a [`Transport`] in three stages:
//!
//! 1. scan for the `B5 62` preamble, discarding anything before it;
//! 2. read class, ID and the 16-bit length field;
//! 3. read `length` payload bytes plus the two checksum bytes.
//!
//! The size of stage 3 is only known once stage 2 is done, hence the staging.
//! Every stage gets its own full timeout; there is no budget shared across
//! stages, so a device that is slow but keeps talking is not cut off early.

use crate::constants::{UBX_CHECKSUM_LEN, UBX_FRAME_OVERHEAD, UBX_HEADER_TAIL_LEN, UBX_PREAMBLE};
use crate::error::FuzzError;
use crate::logging::log_debug;
use crate::ubx::frame::UbxFrame;
use crate::ubx::serial::Transport;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// The stage a frame read was in when its deadline elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStage {
    Preamble,
    Header,
    Body,
}

impl fmt::Display for ReadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStage::Preamble => write!(f, "preamble"),
            ReadStage::Header => write!(f, "header"),
            ReadStage::Body => write!(f, "message body"),
        }
    }
}

/// Result of one framed read that did not fail at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete frame; its checksum has not been checked yet.
    Frame(UbxFrame),
    /// The device went quiet mid-frame (or never started one).
    Timeout {
        stage: ReadStage,
        /// Bytes obtained during the failing stage.
        received: usize,
        /// Bytes the stage needed; `None` for the open-ended preamble scan.
        expected: Option<usize>,
    },
}

/// Staged reader for UBX frames.
#[derive(Debug, Clone, Copy)]
pub struct FramedReader {
    timeout: Duration,
}

impl FramedReader {
    /// Creates a reader applying `timeout` to each stage.
    pub fn new(timeout: Duration) -> Self {
        FramedReader { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reads one frame. `Err` is reserved for transport failures; running out
    /// of time is reported as [`ReadOutcome::Timeout`].
    pub async fn read_frame<T>(&self, transport: &mut T) -> Result<ReadOutcome, FuzzError>
    where
        T: Transport + ?Sized,
    {
        // Stage 1: preamble
        let deadline = Instant::now() + self.timeout;
        let mut window = [0u8; 2];
        let mut scanned = 0usize;
        loop {
            let byte = transport.read(1, deadline).await?;
            let Some(&b) = byte.first() else {
                return Ok(ReadOutcome::Timeout {
                    stage: ReadStage::Preamble,
                    received: scanned,
                    expected: None,
                });
            };
            scanned += 1;
            window = [window[1], b];
            if scanned >= UBX_PREAMBLE.len() && window == UBX_PREAMBLE {
                break;
            }
        }
        if scanned > UBX_PREAMBLE.len() {
            log_debug(&format!(
                "discarded {} bytes before preamble",
                scanned - UBX_PREAMBLE.len()
            ));
        }

        // Stage 2: class, id, length
        let deadline = Instant::now() + self.timeout;
        let header = transport.read(UBX_HEADER_TAIL_LEN, deadline).await?;
        if header.len() != UBX_HEADER_TAIL_LEN {
            return Ok(ReadOutcome::Timeout {
                stage: ReadStage::Header,
                received: header.len(),
                expected: Some(UBX_HEADER_TAIL_LEN),
            });
        }

        // Stage 3: payload and checksum, sized by the length field
        let length = u16::from_le_bytes([header[2], header[3]]) as usize;
        let wanted = length + UBX_CHECKSUM_LEN;
        let deadline = Instant::now() + self.timeout;
        let rest = transport.read(wanted, deadline).await?;
        if rest.len() != wanted {
            return Ok(ReadOutcome::Timeout {
                stage: ReadStage::Body,
                received: rest.len(),
                expected: Some(wanted),
            });
        }

        let mut buf = BytesMut::with_capacity(length + UBX_FRAME_OVERHEAD);
        buf.put_slice(&UBX_PREAMBLE);
        buf.put_slice(&header);
        buf.put_slice(&rest);

        Ok(ReadOutcome::Frame(UbxFrame::from_bytes(buf.freeze())?))
    }
}
