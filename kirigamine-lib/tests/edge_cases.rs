//! Tests for malformed frames and error handling

mod common;

use common::*;
use kirigamine_lib::energy::EnergyState;
use kirigamine_lib::fault::ErrorState;
use kirigamine_lib::sensor::SensorState;

type Decoder = fn(&[u8]) -> Result<(), KirigamineError>;

fn decode_general(data: &[u8]) -> Result<(), KirigamineError> {
    GeneralState::from_bytes(data).map(|_| ())
}

fn decode_sensor(data: &[u8]) -> Result<(), KirigamineError> {
    SensorState::from_bytes(data).map(|_| ())
}

fn decode_energy(data: &[u8]) -> Result<(), KirigamineError> {
    EnergyState::from_bytes(data, None).map(|_| ())
}

fn decode_error(data: &[u8]) -> Result<(), KirigamineError> {
    ErrorState::from_bytes(data).map(|_| ())
}

const FIXTURES: [(&str, Decoder); 4] = [
    (GENERAL_AUTO, decode_general),
    (SENSOR, decode_sensor),
    (ENERGY_IDLE, decode_energy),
    (ERROR_NONE, decode_error),
];

#[test]
fn test_single_byte_flip_fails_checksum() {
    for (hex_data, decode) in FIXTURES {
        let original = hex::decode(hex_data).unwrap();
        assert!(decode(&original).is_ok(), "{}", hex_data);

        // The sync byte sits outside the checksummed range
        for offset in 1..original.len() - 1 {
            let mut corrupted = original.clone();
            corrupted[offset] ^= 0x01;
            match decode(&corrupted) {
                Err(KirigamineError::Checksum { expected, actual }) => {
                    assert_ne!(expected, actual);
                    assert_eq!(actual, original[original.len() - 1]);
                }
                other => panic!("{} offset {}: expected checksum error, got {:?}", hex_data, offset, other),
            }
        }
    }
}

#[test]
fn test_sync_byte_is_not_validated() {
    for (hex_data, decode) in FIXTURES {
        let original = hex::decode(hex_data).unwrap();
        for sync in [0x00, 0xfd, 0xff] {
            let mut data = original.clone();
            data[0] = sync;
            assert!(decode(&data).is_ok(), "{} sync 0x{:02x}", hex_data, sync);
        }
    }
}

#[test]
fn test_group_marker_flip_fails() {
    let mut data = hex::decode(GENERAL_AUTO).unwrap();
    data[1] = 0x63;
    assert_eq!(FrameGroup::classify(&data), FrameGroup::Unknown);
    assert!(GeneralState::from_bytes(&data).is_err());

    // 0x7b is the alternate group marker
    let alternate = patch_frame(GENERAL_AUTO, &[(1, 0x7b)]);
    assert_eq!(FrameGroup::classify(&alternate), FrameGroup::General);
    assert!(GeneralState::from_bytes(&alternate).is_ok());
}

#[test]
fn test_frames_too_short() {
    let test_cases: [(&str, usize); 4] = [
        (&GENERAL_AUTO[..40], 21),
        (&SENSOR[..40], 21),
        (&ENERGY_IDLE[..22], 12),
        (&ERROR_NONE[..20], 11),
    ];

    for ((hex_data, min), (_, decode)) in test_cases.into_iter().zip(FIXTURES) {
        let data = hex::decode(hex_data).unwrap();
        let err = decode(&data).unwrap_err();
        assert!(err.is_format_error(), "{}: {:?}", hex_data, err);
        match err {
            KirigamineError::InsufficientData { expected, actual } => {
                assert_eq!(expected, min);
                assert_eq!(actual, data.len());
            }
            other => panic!("{}: expected InsufficientData, got {:?}", hex_data, other),
        }
    }
}

#[test]
fn test_wrong_decoder() {
    let data = hex::decode(SENSOR).unwrap();
    match GeneralState::from_bytes(&data) {
        Err(KirigamineError::UnexpectedGroup { expected, actual }) => {
            assert_eq!(expected, FrameGroup::General);
            assert_eq!(actual, FrameGroup::Sensor);
        }
        other => panic!("expected UnexpectedGroup, got {:?}", other),
    }
}

#[test]
fn test_classify_is_total() {
    assert_eq!(FrameGroup::classify(&[]), FrameGroup::Unknown);
    assert_eq!(FrameGroup::classify(&[0xfc, 0x62, 0x01, 0x30, 0x10]), FrameGroup::Unknown);
    for hex_data in UNKNOWN_GROUP_FRAMES {
        assert_eq!(FrameGroup::classify(&hex_to_bytes(hex_data)), FrameGroup::Unknown);
    }
    assert_eq!(FrameGroup::classify(&hex_to_bytes(SENSOR_ALT)), FrameGroup::Sensor);
}

#[test]
fn test_invalid_hex_frames() {
    for text in ["fc6", "fc62zz", "not hex"] {
        let err = Frame::from_hex(text).unwrap_err();
        assert!(matches!(err, KirigamineError::InvalidHex(_)), "{}: {:?}", text, err);
        assert!(err.is_format_error());
    }
}

#[test]
fn test_undocumented_sensor_bits() {
    let data = patch_frame(SENSOR, &[(19, 0x81)]);
    let state = SensorState::from_bytes(&data).unwrap();
    assert!(state.thermal_sensor);
    assert_eq!(state.undocumented.get(19), Some(0x81));
    assert_eq!(state.undocumented.to_string(), "[19]=0x81");
}
