// Protocol constants for the Kirigamine local control protocol

/// Sync byte that starts every device response and outbound command
pub const FRAME_SYNC: u8 = 0xfc;

/// Group markers seen at offset 1 of device responses (treated as equivalent)
pub const GROUP_MARKERS: [u8; 2] = [0x62, 0x7b];

/// Offset of the group marker byte
pub const GROUP_MARKER_OFFSET: usize = 1;

/// Offset of the subtype byte selecting the state group
pub const SUBTYPE_OFFSET: usize = 5;

/// Frames shorter than this cannot be classified
pub const MIN_CLASSIFY_SIZE: usize = SUBTYPE_OFFSET + 1;

/// Frames shorter than this are dropped by the aggregator without decoding
pub const MIN_AGGREGATE_SIZE: usize = 10;

/// Minimum size of a General state frame
pub const GENERAL_MIN_SIZE: usize = 21;

/// Minimum size of a Sensor state frame
pub const SENSOR_MIN_SIZE: usize = 21;

/// Minimum size of an Energy state frame
pub const ENERGY_MIN_SIZE: usize = 12;

/// Minimum size of an Error state frame
pub const ERROR_MIN_SIZE: usize = 11;

/// Subtype byte values
pub const SUBTYPE_GENERAL: u8 = 0x02;
pub const SUBTYPE_SENSOR: u8 = 0x03;
pub const SUBTYPE_ERROR: u8 = 0x04;
pub const SUBTYPE_ENERGY: u8 = 0x06;

/// Fixed header following the sync byte of every outbound command
pub const COMMAND_HEADER: [u8; 4] = [0x41, 0x01, 0x30, 0x10];

/// Command tag for a General command
pub const GENERAL_COMMAND_TAG: u8 = 0x01;

/// Command tag for an extended ("08") command
pub const EXTEND08_COMMAND_TAG: u8 = 0x08;

/// Constant byte preceding the checksum of a General command
pub const GENERAL_COMMAND_TRAILER: u8 = 0x41;

/// Size of every outbound command frame, checksum included
pub const COMMAND_SIZE: usize = 22;

/// Error code meaning "no error"
pub const NO_ERROR_CODE: u16 = 0x8000;

/// AES block and key size (16 bytes)
pub const KEY_SIZE: usize = 16;

/// Key used by adaptors that were never registered with the cloud service
pub const STATIC_KEY: &[u8; KEY_SIZE] = b"unregistered\0\0\0\0";

/// ISO/IEC 7816-4 padding marker
pub const PADDING_MARKER: u8 = 0x80;
