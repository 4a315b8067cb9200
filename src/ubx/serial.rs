//! # UBX Serial Communication
//!
//! The byte transport the campaign talks through. [`Transport`] is the seam:
//! the runner and the framed reader only see `write` and a deadline-bounded
//! `read`. [`DeviceHandle`] implements it for any async byte stream, which is
//! a `tokio_serial::SerialStream` in production and a mock in tests.

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, DEFAULT_SERIAL_PORT};
use crate::error::FuzzError;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_serial::SerialPortBuilderExt;

/// Configuration for the serial connection. Framing is always 8N1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Per-stage read timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

fn default_port() -> String {
    DEFAULT_SERIAL_PORT.into()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_secs() -> f64 {
    DEFAULT_READ_TIMEOUT.as_secs_f64()
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: default_port(),
            baud_rate: default_baud_rate(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SerialConfig {
    /// Rejects a zero baud rate and a timeout that is not a positive,
    /// representable number of seconds.
    pub fn validate(&self) -> Result<(), FuzzError> {
        if self.baud_rate == 0 {
            return Err(FuzzError::ConfigurationError(
                "baud rate must be positive".into(),
            ));
        }
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => Ok(()),
            _ => Err(FuzzError::ConfigurationError(format!(
                "read timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            ))),
        }
    }

    /// The read timeout as a `Duration`. Values [`validate`](Self::validate)
    /// rejects fall back to the default.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_READ_TIMEOUT)
    }
}

/// Byte transport to the device under test.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Writes all of `bytes` and flushes them to the device.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), FuzzError>;

    /// Reads up to `max_bytes`, returning whatever arrived before `deadline`.
    ///
    /// A short or empty result means the deadline elapsed (or the stream
    /// ended) first. Never waits past `deadline`.
    async fn read(&mut self, max_bytes: usize, deadline: Instant) -> Result<Vec<u8>, FuzzError>;
}

/// Device handle over any async byte stream.
pub struct DeviceHandle<P> {
    port: P,
}

/// Handle on a real serial port.
pub type SerialDeviceHandle = DeviceHandle<tokio_serial::SerialStream>;

impl<P> DeviceHandle<P>
where
    P: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps an already opened stream.
    pub fn new(port: P) -> Self {
        DeviceHandle { port }
    }
}

impl SerialDeviceHandle {
    /// Opens and configures the serial port (baud rate from `config`, 8 data
    /// bits, no parity, one stop bit).
    pub fn open(config: &SerialConfig) -> Result<Self, FuzzError> {
        let port = tokio_serial::new(config.port.as_str(), config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .timeout(config.timeout())
            .open_native_async()
            .map_err(|e| {
                FuzzError::TransportError(format!("cannot open {}: {e}", config.port))
            })?;

        Ok(DeviceHandle { port })
    }
}

#[async_trait::async_trait]
impl<P> Transport for DeviceHandle<P>
where
    P: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, bytes: &[u8]) -> Result<(), FuzzError> {
        self.port
            .write_all(bytes)
            .await
            .map_err(|e| FuzzError::TransportError(e.to_string()))?;
        self.port
            .flush()
            .await
            .map_err(|e| FuzzError::TransportError(e.to_string()))
    }

    async fn read(&mut self, max_bytes: usize, deadline: Instant) -> Result<Vec<u8>, FuzzError> {
        let mut buf = vec![0u8; max_bytes];
        let mut filled = 0;

        while filled < max_bytes {
            match timeout_at(deadline, self.port.read(&mut buf[filled..])).await {
                Err(_elapsed) => break,
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                // Some serial drivers report their own timeout as an error.
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => break,
                Ok(Err(e)) => return Err(FuzzError::TransportError(e.to_string())),
            }
        }

        buf.truncate(filled);
        Ok(buf)
    }
}
