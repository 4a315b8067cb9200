//! Mock serial port implementation for testing
//!
//! This module provides an in-memory stand-in for the receiver so the reader
//! and the campaign can be exercised without hardware. Replies can be queued
//! up front or released one per write, the way a device answers each command.

use crate::constants::{UBX_ACK_ACK, UBX_ACK_NAK};
use crate::ubx::frame::pack_frame;
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Mock serial port that simulates bidirectional communication
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Data written to the port (outgoing)
    pub tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Data to be read from the port (incoming)
    pub rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Replies moved into `rx_buffer`, one per write
    pub replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
    /// Simulated errors
    pub next_error: Arc<Mutex<Option<io::Error>>>,
    /// When set, reads on an empty buffer stay pending instead of hitting EOF
    pub silent_when_empty: Arc<Mutex<bool>>,
    /// Number of write calls seen
    pub writes: Arc<Mutex<usize>>,
}

/// Canned device replies.
pub enum MockReply {
    AckAck,
    AckNak,
    /// A well-formed frame with a correct checksum.
    Frame {
        class: u8,
        id: u8,
        payload: Vec<u8>,
    },
    /// A well-formed frame whose checksum is off by one.
    BadChecksum {
        class: u8,
        id: u8,
        payload: Vec<u8>,
    },
    /// Arbitrary bytes.
    Raw(Vec<u8>),
}

impl MockReply {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MockReply::AckAck => UBX_ACK_ACK.to_vec(),
            MockReply::AckNak => UBX_ACK_NAK.to_vec(),
            MockReply::Frame { class, id, payload } => pack_frame(*class, *id, payload)
                .map(|f| f.as_bytes().to_vec())
                .unwrap_or_default(),
            MockReply::BadChecksum { class, id, payload } => {
                let mut bytes = pack_frame(*class, *id, payload)
                    .map(|f| f.as_bytes().to_vec())
                    .unwrap_or_default();
                if let Some(last) = bytes.last_mut() {
                    *last = last.wrapping_add(1);
                }
                bytes
            }
            MockReply::Raw(bytes) => bytes.clone(),
        }
    }
}

impl MockSerialPort {
    /// A port that reports end-of-stream once its buffer runs dry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A port that never answers on its own: reads on an empty buffer block
    /// until the caller's deadline.
    pub fn silent() -> Self {
        let port = Self::default();
        *port.silent_when_empty.lock().unwrap() = true;
        port
    }

    /// Queue data to be read from the port
    pub fn queue_rx_data(&self, data: &[u8]) {
        let mut rx = self.rx_buffer.lock().unwrap();
        rx.extend(data);
    }

    /// Queue bytes that become readable after the next write
    pub fn queue_response(&self, data: &[u8]) {
        self.replies.lock().unwrap().push_back(data.to_vec());
    }

    /// Queue a canned reply that becomes readable after the next write
    pub fn queue_reply(&self, reply: MockReply) {
        self.queue_response(&reply.to_bytes());
    }

    /// Get data that was written to the port
    pub fn get_tx_data(&self) -> Vec<u8> {
        self.tx_buffer.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    /// Set an error to be returned on the next operation
    pub fn set_next_error(&self, error: io::Error) {
        *self.next_error.lock().unwrap() = Some(error);
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        let mut rx = self.rx_buffer.lock().unwrap();
        if rx.is_empty() && *self.silent_when_empty.lock().unwrap() {
            // Nothing will ever arrive; the caller's timeout ends the wait.
            return Poll::Pending;
        }

        let available = rx.len().min(buf.remaining());
        if available > 0 {
            let data: Vec<u8> = rx.drain(..available).collect();
            buf.put_slice(&data);
        }

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockSerialPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        self.tx_buffer.lock().unwrap().extend_from_slice(buf);
        *self.writes.lock().unwrap() += 1;
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            self.rx_buffer.lock().unwrap().extend(reply);
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
