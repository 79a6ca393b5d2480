use crate::constants::*;
use crate::diagnostics::UndocumentedBits;
use crate::error::KirigamineError;
use crate::frame::{Frame, FrameGroup, validate_state_frame};
use crate::temperature;
use serde::{Deserialize, Serialize};
use std::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Byte layout of a Sensor state frame up to offset 20.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SensorFrameRaw {
    pub sync: u8,
    pub group_marker: u8,
    pub header: [u8; 3],
    pub subtype: u8,
    pub unknown6: [u8; 4],
    pub outside_temp: u8, // 10, fine encoding, 0x00 = no outdoor sensor
    pub unknown11: u8,
    pub room_temp: u8, // 12, fine encoding
    pub unknown13: [u8; 6],
    pub thermal_flags: u8, // 19, bit 0 = thermal sensor active
    pub wind_flags: u8,    // 20, bit 0 = auxiliary wind speed; checksum on minimum-size frames
}

const THERMAL_SENSOR_BIT: u8 = 0x01;
const AUX_WIND_SPEED_BIT: u8 = 0x01;

/// Temperatures and sensor flags reported in a Sensor (subtype `0x03`) frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// `None` when the outdoor unit reports no sensor
    pub outside_temperature: Option<f64>,
    pub room_temperature: f64,
    pub thermal_sensor: bool,
    pub auxiliary_wind_speed: bool,
    pub undocumented: UndocumentedBits,
}

impl SensorState {
    pub fn from_bytes(data: &[u8]) -> Result<Self, KirigamineError> {
        validate_state_frame(data, FrameGroup::Sensor)?;
        let (raw, _) = SensorFrameRaw::ref_from_prefix(data).map_err(|_| KirigamineError::InsufficientData {
            expected: SENSOR_MIN_SIZE,
            actual: data.len(),
        })?;

        let mut undocumented = UndocumentedBits::new();
        undocumented.record_unknown_bits(19, raw.thermal_flags, THERMAL_SENSOR_BIT);
        let has_wind_flags = data.len() > SENSOR_MIN_SIZE;
        if has_wind_flags {
            undocumented.record_unknown_bits(20, raw.wind_flags, AUX_WIND_SPEED_BIT);
        }

        Ok(Self {
            outside_temperature: temperature::decode_fine_optional(raw.outside_temp),
            room_temperature: temperature::decode_fine(raw.room_temp),
            thermal_sensor: raw.thermal_flags & THERMAL_SENSOR_BIT != 0,
            auxiliary_wind_speed: has_wind_flags && raw.wind_flags & AUX_WIND_SPEED_BIT != 0,
            undocumented,
        })
    }
}

impl TryFrom<&Frame> for SensorState {
    type Error = KirigamineError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        Self::from_bytes(frame.as_bytes())
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Room: {:.1} °C, Outside: ", self.room_temperature)?;
        match self.outside_temperature {
            Some(t) => write!(f, "{:.1} °C", t)?,
            None => write!(f, "n/a")?,
        }
        write!(f, ", Thermal sensor: {}", if self.thermal_sensor { "on" } else { "off" })
    }
}
