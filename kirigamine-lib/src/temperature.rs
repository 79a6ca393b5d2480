//! Temperature byte encodings.
//!
//! Frames carry temperatures at two resolutions:
//! - coarse: whole degrees, stored as `31 - t`, only 16..=31 °C is encodable
//! - fine: half degrees, stored as `0x80 + 2t`; `0x00` means "not present"

use crate::error::KirigamineError;

/// Lowest encodable coarse setpoint in °C
pub const COARSE_MIN: i16 = 16;

/// Highest encodable coarse setpoint in °C
pub const COARSE_MAX: i16 = 31;

/// Lowest value the fine encoding can represent
pub const FINE_MIN: f64 = -64.0;

/// Highest value the fine encoding can represent
pub const FINE_MAX: f64 = 63.5;

/// Raw fine byte meaning "no fine reading"
pub const FINE_ABSENT: u8 = 0x00;

const FINE_OFFSET: i16 = 0x80;
const FINE_STEP: f64 = 0.5;

pub fn decode_coarse(raw: u8) -> i16 {
    COARSE_MAX - raw as i16
}

pub fn encode_coarse(celsius: i16) -> Result<u8, KirigamineError> {
    if !(COARSE_MIN..=COARSE_MAX).contains(&celsius) {
        return Err(KirigamineError::OutOfRange {
            field: "coarse temperature",
            value: celsius as f64,
        });
    }
    Ok((COARSE_MAX - celsius) as u8)
}

pub fn decode_fine(raw: u8) -> f64 {
    (raw as i16 - FINE_OFFSET) as f64 * FINE_STEP
}

/// Decode a fine byte as found in a state frame, where `0x00` marks an absent value.
pub fn decode_fine_optional(raw: u8) -> Option<f64> {
    if raw == FINE_ABSENT { None } else { Some(decode_fine(raw)) }
}

/// Encode a half-degree temperature; `None` encodes as `0x00`.
///
/// Values between half-degree steps are floored to the step below.
pub fn encode_fine(celsius: Option<f64>) -> Result<u8, KirigamineError> {
    let Some(celsius) = celsius else {
        return Ok(FINE_ABSENT);
    };
    if !(FINE_MIN..=FINE_MAX).contains(&celsius) {
        return Err(KirigamineError::OutOfRange {
            field: "fine temperature",
            value: celsius,
        });
    }
    let steps = (celsius / FINE_STEP).floor() as i16;
    Ok((FINE_OFFSET + steps) as u8)
}
