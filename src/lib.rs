//! # ubx-fuzz - Serial Fuzzing Harness for the UBX Protocol
//!
//! Feeds candidate inputs from a fuzzer's corpus to a u-blox GNSS receiver
//! (developed against the MAX-M10S) over its UART, reads back one UBX frame
//! per input and keeps every input the receiver does not cleanly acknowledge.
//!
//! ## Features
//!
//! - UBX frame parsing, packing and Fletcher checksum verification
//! - Staged, deadline-bounded frame reassembly over any async byte stream
//! - Classification of responses into ACK, NAK, structural mismatch or timeout
//! - Content-addressed crash archive (`<sha256>.crash`)
//! - Fail-fast campaign runner with a pass/total tally
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ubx_fuzz::{init_logger, run_campaign, CampaignConfig};
//!
//! # async fn demo() -> Result<(), ubx_fuzz::FuzzError> {
//! init_logger();
//! let report = run_campaign(&CampaignConfig::default()).await?;
//! println!("{}", report.tally);
//! # Ok(())
//! # }
//! ```

pub mod campaign;
pub mod constants;
pub mod error;
pub mod logging;
pub mod ubx;
pub mod util;

pub use crate::error::FuzzError;
pub use crate::logging::{init_logger, log_info};

pub use campaign::{
    CampaignConfig, CampaignOutcome, CampaignReport, CampaignRunner, CampaignState, CampaignTally,
    CrashArchiver, CrashArtifact,
};
pub use ubx::{
    classify, DeviceHandle, FramedReader, ReadOutcome, SerialConfig, SerialDeviceHandle, Transport,
    UbxFrame, Verdict,
};

/// Open the serial port described by `config`.
///
/// # Returns
/// * `Ok(SerialDeviceHandle)` - Port opened at the configured baud rate, 8N1
/// * `Err(FuzzError)` - The port could not be opened
pub fn connect(config: &SerialConfig) -> Result<SerialDeviceHandle, FuzzError> {
    SerialDeviceHandle::open(config)
}

/// Run a whole campaign against the serial device in `config`.
///
/// Both directories are checked before the port is opened, so a missing
/// directory never touches the device.
///
/// # Returns
/// * `Ok(CampaignReport)` - The campaign reached `Stopped` or `Exhausted`
/// * `Err(FuzzError)` - Configuration, transport or archive failure
pub async fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport, FuzzError> {
    let mut runner = CampaignRunner::new(config)?;
    let handle = connect(&config.serial)?;
    runner.run(handle).await
}
