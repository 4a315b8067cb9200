#![no_main]

use libfuzzer_sys::fuzz_target;
use std::time::Duration;
use ubx_fuzz::ubx::serial_mock::MockSerialPort;
use ubx_fuzz::{DeviceHandle, FramedReader, ReadOutcome};

fuzz_target!(|data: &[u8]| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    // The mock reports EOF once drained, so every stage ends immediately.
    let mock = MockSerialPort::new();
    mock.queue_rx_data(data);
    let mut handle = DeviceHandle::new(mock);
    let reader = FramedReader::new(Duration::from_millis(10));

    match runtime.block_on(reader.read_frame(&mut handle)) {
        Ok(ReadOutcome::Frame(frame)) => {
            assert_eq!(frame.len(), frame.length() as usize + 8);
            assert_eq!(&frame.as_bytes()[..2], &[0xB5, 0x62]);
        }
        Ok(ReadOutcome::Timeout { .. }) => {}
        Err(e) => panic!("mock transport failed: {e}"),
    }
});
