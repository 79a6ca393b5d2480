//! Common test utilities and shared imports

// Shared across test files; not every file uses every item
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use hex;
#[allow(unused_imports)]
pub use kirigamine_lib::checksum::{checksum, expected_frame_checksum};
#[allow(unused_imports)]
pub use kirigamine_lib::error::KirigamineError;
#[allow(unused_imports)]
pub use kirigamine_lib::frame::{Frame, FrameGroup};
#[allow(unused_imports)]
pub use kirigamine_lib::general::{DriveMode, FanSpeed, GeneralState, HorizontalVane, Power, VerticalVane};

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// Apply byte overrides to a frame and fix up its checksum
#[allow(dead_code)]
pub fn patch_frame(hex_data: &str, overrides: &[(usize, u8)]) -> Vec<u8> {
    let mut data = hex::decode(hex_data).expect("Failed to decode hex");
    for &(offset, value) in overrides {
        data[offset] = value;
    }
    let last = data.len() - 1;
    data[last] = expected_frame_checksum(&data).expect("frame too short");
    data
}

/// General frame captured from a unit in Auto at 23 °C
#[allow(dead_code)]
pub const GENERAL_AUTO: &str = "fc620130100200000108080000000083ae46000000d3";

/// General frame captured from a unit cooling with i-See active at 24 °C
#[allow(dead_code)]
pub const GENERAL_COOL_ISEE: &str = "fc62013010020000010b070000000083b046000000cf";

/// Sensor frame: outside 26.0 °C, room 25.0 °C
#[allow(dead_code)]
pub const SENSOR: &str = "fc620130100300000f00b4b2b2fe420001141a0000c4";

/// Sensor frame: outside 20.0 °C, room 23.0 °C
#[allow(dead_code)]
pub const SENSOR_ALT: &str = "fc620130100300000d00a8aeaefe42000114520000a2";

/// Error frame carrying the no-error code
#[allow(dead_code)]
pub const ERROR_NONE: &str = "fc6201301004000000800000000000000000000000d9";

/// Energy frame with the compressor stopped
#[allow(dead_code)]
pub const ENERGY_IDLE: &str = "fc620130100600000000001d5178000042000000002f";

/// Groups the decoders do not handle
#[allow(dead_code)]
pub const UNKNOWN_GROUP_FRAMES: &[&str] = &[
    "fc620130100500000000000000000000000000000058",
    "fc620130100900000001000000000000000000000053",
];

/// Decrypted status response with identity fields, sanitized
#[allow(dead_code)]
pub const DEVICE_XML_RESPONSE: &str = "<LSV><MAC>AA:BB:CC:DD:EE:FF</MAC><SERIAL>1234567890</SERIAL><CONNECTION>NOT OK</CONNECTION><VERSION>V5.2.7</VERSION><STATUS>OK</STATUS><PROFILECODE><DATA><VALUE>0300200714070000000000000000000000000000000000000000000000000000</VALUE></DATA></PROFILECODE><CODE><DATA><VALUE>ffffffffffffffffffff0202008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0302008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0402008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0502008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0602008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0702008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0802008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0902008000</VALUE></DATA></CODE><CODE><DATA><VALUE>ffffffffffffffffffff0a02008000</VALUE></DATA></CODE><PROFILECODE><DATA><VALUE>a0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0bea0be</VALUE></DATA></PROFILECODE><PROFILECODE><DATA><VALUE>0000000000000000000000000000000000000000000000000000000000000000</VALUE></DATA></PROFILECODE><PROFILECODE><DATA><VALUE>0000000000000000000000000000000000000000000000000000000000000000</VALUE></DATA></PROFILECODE><PROFILECODE><DATA><VALUE>0000000000000000000000000000000000000000000000000000000000000000</VALUE></DATA></PROFILECODE><LED><LED1>1:30,0:30</LED1><LED2>1:30,0:30</LED2><LED3>1:30,0:30</LED3><LED4>1:5,0:45</LED4></LED><ECHONET>ON</ECHONET></LSV>";

/// Route library logs to the test harness; safe to call from every test
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
