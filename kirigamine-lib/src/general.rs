use crate::constants::*;
use crate::diagnostics::UndocumentedBits;
use crate::error::KirigamineError;
use crate::frame::{Frame, FrameGroup, validate_state_frame};
use crate::temperature::{self, COARSE_MAX, COARSE_MIN};
use modular_bitfield::prelude::*;
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum Power {
    #[strum(to_string = "OFF")]
    Off = 0,
    #[strum(to_string = "ON")]
    On = 1,
}

impl Power {
    pub fn is_on(&self) -> bool {
        *self == Power::On
    }
}

impl Default for Power {
    fn default() -> Self {
        Power::Off
    }
}

/// Operating mode. The discriminant is the byte sent in commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum DriveMode {
    Heater = 0x01,
    Dehumidify = 0x02,
    Cooler = 0x03,
    Fan = 0x07,
    Auto = 0x08,
    AutoHeater = 0x19,
    AutoCooler = 0x1b,
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Auto
    }
}

/// Bit the device sets in the mode byte while the i-See sensor adjusts operation
pub const I_SEE_FLAG: u8 = 0x08;

/// Result of decoding a raw mode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeByte {
    /// `None` when the value is outside the known table
    pub mode: Option<DriveMode>,
    pub i_see_sensor: bool,
    pub raw: u8,
}

impl ModeByte {
    /// Decode a mode byte.
    ///
    /// `0x08` on its own is the Auto code. Above it, bit `0x08` is the i-See
    /// flag and is removed before the table lookup. Several values map to the
    /// same mode: `0x00`, `0x02` and `0x0c` are all Dehumidify.
    pub fn decode(raw: u8) -> Self {
        let (mode, i_see_sensor) = match raw {
            0x19 => (Some(DriveMode::AutoHeater), false),
            0x1b => (Some(DriveMode::AutoCooler), false),
            _ => {
                let i_see = raw > I_SEE_FLAG && raw & I_SEE_FLAG != 0;
                let value = if i_see { raw - I_SEE_FLAG } else { raw };
                let mode = match value {
                    0x00 | 0x02 | 0x04 => Some(DriveMode::Dehumidify),
                    0x01 => Some(DriveMode::Heater),
                    0x03 => Some(DriveMode::Cooler),
                    0x07 => Some(DriveMode::Fan),
                    0x08 => Some(DriveMode::Auto),
                    _ => None,
                };
                (mode, i_see)
            }
        };
        Self { mode, i_see_sensor, raw }
    }
}

/// Fan speed ordinal. Values without a name are kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum FanSpeed {
    Auto = 0,
    Quiet = 1,
    Level1 = 2,
    Level2 = 3,
    Level3 = 5,
    Level4 = 6,
    #[num_enum(catch_all)]
    Other(u8),
}

impl FanSpeed {
    pub fn ordinal(&self) -> u8 {
        (*self).into()
    }
}

impl Default for FanSpeed {
    fn default() -> Self {
        FanSpeed::Auto
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum VerticalVane {
    Auto = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    Swing = 7,
}

impl Default for VerticalVane {
    fn default() -> Self {
        VerticalVane::Auto
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum HorizontalVane {
    Auto = 0x00,
    FarLeft = 0x01,
    Left = 0x02,
    Center = 0x03,
    Right = 0x04,
    FarRight = 0x05,
    LeftCenter = 0x06,
    CenterRight = 0x07,
    Split = 0x08,
    LeftCenterRight = 0x09,
    Swing = 0x0c,
}

impl Default for HorizontalVane {
    fn default() -> Self {
        HorizontalVane::Auto
    }
}

/// Wide vane byte: direction in the low nibble, adjustment marker in the high one
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WideVaneByte {
    pub direction: B4,
    pub adjustment: B4,
}

/// High nibble value marking an active wide vane adjustment
const WIDE_VANE_ADJUSTING: u8 = 0x8;

/// Byte layout of a General state frame up to offset 20.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct GeneralFrameRaw {
    pub sync: u8,
    pub group_marker: u8,
    pub header: [u8; 3],
    pub subtype: u8,
    pub reserved: [u8; 2],
    pub power: u8,            // 8
    pub mode: u8,             // 9, i-See flag in bit 3
    pub coarse_temp: u8,      // 10, 31 - t
    pub fan_speed: u8,        // 11
    pub vane_left: u8,        // 12
    pub vane_right: u8,       // 13
    pub unknown14: u8,        // 14
    pub wide_vane: u8,        // 15
    pub fine_temp: u8,        // 16, 0x00 = absent
    pub dehum_setting: u8,    // 17
    pub power_saving: u8,     // 18
    pub wind_break: u8,       // 19
    pub unknown20: u8,        // 20, checksum on minimum-size frames
}

/// Operating state reported in a General (subtype `0x02`) frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralState {
    pub power: Power,
    pub drive_mode: DriveMode,
    /// i-See sensor flag carried in the mode byte
    pub i_see_sensor: bool,
    /// Mode byte as received, before the i-See flag is removed
    pub mode_raw: u8,
    pub coarse_temperature: i16,
    pub fine_temperature: Option<f64>,
    pub fan_speed: FanSpeed,
    pub vertical_vane_right: VerticalVane,
    pub vertical_vane_left: VerticalVane,
    pub horizontal_vane: HorizontalVane,
    pub wide_vane_adjustment: bool,
    pub dehumidify_setting: u8,
    pub power_saving: bool,
    pub wind_and_wind_break: u8,
    pub undocumented: UndocumentedBits,
}

impl Default for GeneralState {
    fn default() -> Self {
        Self {
            power: Power::Off,
            drive_mode: DriveMode::Auto,
            i_see_sensor: false,
            mode_raw: DriveMode::Auto.into(),
            coarse_temperature: 22,
            fine_temperature: Some(22.0),
            fan_speed: FanSpeed::Auto,
            vertical_vane_right: VerticalVane::Auto,
            vertical_vane_left: VerticalVane::Auto,
            horizontal_vane: HorizontalVane::Auto,
            wide_vane_adjustment: false,
            dehumidify_setting: 0,
            power_saving: false,
            wind_and_wind_break: 0,
            undocumented: UndocumentedBits::default(),
        }
    }
}

impl GeneralState {
    /// Decode a General state frame.
    pub fn from_bytes(data: &[u8]) -> Result<Self, KirigamineError> {
        validate_state_frame(data, FrameGroup::General)?;
        let (raw, _) = GeneralFrameRaw::ref_from_prefix(data).map_err(|_| KirigamineError::InsufficientData {
            expected: GENERAL_MIN_SIZE,
            actual: data.len(),
        })?;

        let mut undocumented = UndocumentedBits::new();

        let power = match raw.power {
            0 => Power::Off,
            1 | 2 => Power::On,
            other => {
                undocumented.record(8, other);
                Power::On
            }
        };

        let mode = ModeByte::decode(raw.mode);
        let drive_mode = mode.mode.unwrap_or_else(|| {
            undocumented.record(9, raw.mode);
            DriveMode::Auto
        });

        let fan_speed = FanSpeed::from_primitive(raw.fan_speed);
        if let FanSpeed::Other(value) = fan_speed {
            undocumented.record(11, value);
        }

        let vertical_vane_left = vertical_vane_at(12, raw.vane_left, &mut undocumented);
        let vertical_vane_right = vertical_vane_at(13, raw.vane_right, &mut undocumented);

        if raw.unknown14 != 0 {
            undocumented.record(14, raw.unknown14);
        }

        let wide_vane = WideVaneByte::from_bytes([raw.wide_vane]);
        let adjustment = wide_vane.adjustment();
        if adjustment != 0 && adjustment != WIDE_VANE_ADJUSTING {
            undocumented.record(15, raw.wide_vane);
        }
        let horizontal_vane = HorizontalVane::try_from(wide_vane.direction()).unwrap_or_else(|_| {
            undocumented.record(15, raw.wide_vane);
            HorizontalVane::Auto
        });

        if data.len() > GENERAL_MIN_SIZE && raw.unknown20 != 0 {
            undocumented.record(20, raw.unknown20);
        }

        Ok(Self {
            power,
            drive_mode,
            i_see_sensor: mode.i_see_sensor,
            mode_raw: mode.raw,
            coarse_temperature: temperature::decode_coarse(raw.coarse_temp),
            fine_temperature: temperature::decode_fine_optional(raw.fine_temp),
            fan_speed,
            vertical_vane_right,
            vertical_vane_left,
            horizontal_vane,
            wide_vane_adjustment: adjustment == WIDE_VANE_ADJUSTING,
            dehumidify_setting: raw.dehum_setting,
            power_saving: raw.power_saving > 0,
            wind_and_wind_break: raw.wind_break,
            undocumented,
        })
    }

    /// Target temperature: the fine reading when present, else the coarse one.
    pub fn effective_temperature(&self) -> f64 {
        self.fine_temperature.unwrap_or(self.coarse_temperature as f64)
    }

    /// Set the target temperature at half-degree resolution.
    ///
    /// The coarse byte gets the whole-degree part; both encodings are range checked.
    pub fn set_temperature(&mut self, celsius: f64) -> Result<(), KirigamineError> {
        let coarse = celsius.floor();
        if !(COARSE_MIN as f64..=COARSE_MAX as f64).contains(&coarse) {
            return Err(KirigamineError::OutOfRange {
                field: "temperature",
                value: celsius,
            });
        }
        temperature::encode_fine(Some(celsius))?;
        self.coarse_temperature = coarse as i16;
        self.fine_temperature = Some((celsius * 2.0).floor() / 2.0);
        Ok(())
    }

    pub fn with_temperature(mut self, celsius: f64) -> Result<Self, KirigamineError> {
        self.set_temperature(celsius)?;
        Ok(self)
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.drive_mode = mode;
        self.mode_raw = mode.into();
        self.i_see_sensor = false;
    }
}

impl TryFrom<&Frame> for GeneralState {
    type Error = KirigamineError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        Self::from_bytes(frame.as_bytes())
    }
}

impl fmt::Display for GeneralState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Power: {}, Mode: {}{}, Target: {:.1} °C, Fan: {}, Vane: {}/{}, Wide vane: {}",
            self.power,
            self.drive_mode,
            if self.i_see_sensor { " (i-See)" } else { "" },
            self.effective_temperature(),
            self.fan_speed,
            self.vertical_vane_left,
            self.vertical_vane_right,
            self.horizontal_vane,
        )
    }
}

fn vertical_vane_at(offset: usize, raw: u8, undocumented: &mut UndocumentedBits) -> VerticalVane {
    VerticalVane::try_from(raw).unwrap_or_else(|_| {
        undocumented.record(offset, raw);
        VerticalVane::Auto
    })
}
