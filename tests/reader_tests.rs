//! Framed reader behaviour against scripted devices: fragmented delivery,
//! slow but live devices, and devices that stall mid-frame.

use std::time::Duration;
use tokio::time::Instant;
use tokio_test::io::Builder;
use ubx_fuzz::constants::UBX_ACK_ACK;
use ubx_fuzz::ubx::serial_mock::MockSerialPort;
use ubx_fuzz::ubx::ReadStage;
use ubx_fuzz::{DeviceHandle, FramedReader, ReadOutcome, Transport};

fn reader() -> FramedReader {
    FramedReader::new(Duration::from_secs(2))
}

#[tokio::test]
async fn test_fragmented_delivery() {
    let mock = Builder::new()
        .read(&[0x24, 0xB5])
        .read(&[0x62, 0x05, 0x01])
        .read(&[0x02])
        .read(&[0x00, 0x06, 0x8A, 0x98])
        .read(&[0xC1])
        .build();
    let mut handle = DeviceHandle::new(mock);

    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::Frame(ubx_fuzz::UbxFrame::from_bytes(UBX_ACK_ACK.to_vec()).unwrap())
    );
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let mock = Builder::new()
        .write(&[0xB5, 0x62, 0x06, 0x8A])
        .read(&UBX_ACK_ACK)
        .build();
    let mut handle = DeviceHandle::new(mock);

    handle.write(&[0xB5, 0x62, 0x06, 0x8A]).await.unwrap();
    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert!(matches!(outcome, ReadOutcome::Frame(_)));
}

#[tokio::test(start_paused = true)]
async fn test_each_stage_gets_full_timeout() {
    // 1.5 s pauses before the header and before the body: three seconds in
    // total, yet no single stage exceeds its two second deadline.
    let mock = Builder::new()
        .read(&[0xB5, 0x62])
        .wait(Duration::from_millis(1500))
        .read(&[0x05, 0x01, 0x02, 0x00])
        .wait(Duration::from_millis(1500))
        .read(&[0x06, 0x8A, 0x98, 0xC1])
        .build();
    let mut handle = DeviceHandle::new(mock);

    let started = Instant::now();
    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert!(matches!(outcome, ReadOutcome::Frame(_)));
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_stall_after_preamble() {
    let mock = Builder::new()
        .read(&[0xB5, 0x62, 0x05])
        .wait(Duration::from_secs(10))
        .build();
    let mut handle = DeviceHandle::new(mock);

    let started = Instant::now();
    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::Timeout {
            stage: ReadStage::Header,
            received: 1,
            expected: Some(4),
        }
    );
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_stall_mid_body() {
    let mock = MockSerialPort::silent();
    // Length field announces 0x0100 payload bytes; only five show up.
    mock.queue_rx_data(&[0xB5, 0x62, 0x0A, 0x04, 0x00, 0x01, 1, 2, 3, 4, 5]);
    let mut handle = DeviceHandle::new(mock);

    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::Timeout {
            stage: ReadStage::Body,
            received: 5,
            expected: Some(258),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_noise_without_preamble_times_out() {
    let mock = MockSerialPort::silent();
    mock.queue_rx_data(b"$GNTXT,01,01,02,ANTSTATUS=OK*25\r\n");
    let mut handle = DeviceHandle::new(mock);

    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::Timeout {
            stage: ReadStage::Preamble,
            received: 33,
            expected: None,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_steady_noise_cannot_extend_preamble_deadline() {
    // A zero byte every 300 ms for 3.3 s, never a sync byte.
    let mut builder = Builder::new();
    for _ in 0..11 {
        builder.read(&[0x00]).wait(Duration::from_millis(300));
    }
    builder.read(&[0x00]);
    let mut handle = DeviceHandle::new(builder.build());

    let started = Instant::now();
    let outcome = reader().read_frame(&mut handle).await.unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::Timeout {
            stage: ReadStage::Preamble,
            received: 7,
            expected: None,
        }
    );
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_millis(2100));

    // The device was still talking; drain the rest of the script.
    let rest = handle
        .read(5, Instant::now() + Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(rest, vec![0x00; 5]);
}

#[tokio::test]
async fn test_read_error_is_fatal() {
    let mock = MockSerialPort::new();
    mock.set_next_error(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "device unplugged",
    ));
    let mut handle = DeviceHandle::new(mock);

    let result = reader().read_frame(&mut handle).await;
    assert!(matches!(result, Err(ubx_fuzz::FuzzError::TransportError(_))));
}
