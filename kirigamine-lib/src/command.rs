//! Outbound command frames.
//!
//! A command always carries every field of the state, plus a selection mask
//! telling the adaptor which of them to apply. Unselected General fields are
//! serialized but ignored by the device; unselected extended fields are zeroed.

use crate::checksum::checksum;
use crate::constants::*;
use crate::error::KirigamineError;
use crate::general::GeneralState;
use crate::temperature;
use bitflags::bitflags;
use bytes::Bytes;
use zerocopy::{Immutable, IntoBytes, KnownLayout, Unaligned};

bitflags! {
    /// Fields a General command asks the device to apply.
    ///
    /// The low byte is the first flag byte of the frame, the high byte the second.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GeneralFields: u16 {
        const POWER = 0x0001;
        const MODE = 0x0002;
        const TEMPERATURE = 0x0004;
        const FAN_SPEED = 0x0008;
        const VERTICAL_VANE = 0x0010;
        const HORIZONTAL_VANE = 0x0100;
        const OUTSIDE_CONTROL = 0x0200;
    }
}

impl Default for GeneralFields {
    /// No state field selected; outside control stays requested as the adaptor expects.
    fn default() -> Self {
        GeneralFields::OUTSIDE_CONTROL
    }
}

bitflags! {
    /// Fields an extended ("08") command asks the device to apply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Extend08Fields: u8 {
        const DEHUMIDIFY = 0x04;
        const POWER_SAVING = 0x08;
        const BUZZER = 0x10;
        const WIND_BREAK = 0x20;
    }
}

/// Power-saving byte value when enabled
const POWER_SAVING_ON: u8 = 0x0a;

/// Buzzer byte value when requested
const BUZZER_ON: u8 = 0x01;

#[derive(Debug, Clone, Copy, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct GeneralCommandRaw {
    sync: u8,
    header: [u8; 4],
    tag: u8,
    flags: [u8; 2],
    power: u8,
    mode: u8,
    coarse_temp: u8,
    fan_speed: u8,
    vertical_vane: u8,
    reserved: [u8; 5],
    horizontal_vane: u8,
    fine_temp: u8,
    trailer: u8,
    checksum: u8,
}

#[derive(Debug, Clone, Copy, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct Extend08CommandRaw {
    sync: u8,
    header: [u8; 4],
    tag: u8,
    flags: u8,
    reserved: [u8; 2],
    dehum_setting: u8,
    power_saving: u8,
    wind_break: u8,
    buzzer: u8,
    padding: [u8; 8],
    checksum: u8,
}

/// Checksum over everything between the sync byte and the checksum slot
fn seal(frame: &[u8]) -> u8 {
    checksum(&frame[1..frame.len() - 1])
}

impl GeneralState {
    /// Build a General command frame from this state.
    ///
    /// Fails only when a temperature is outside its encodable range.
    pub fn general_command(&self, fields: GeneralFields) -> Result<Bytes, KirigamineError> {
        let mut raw = GeneralCommandRaw {
            sync: FRAME_SYNC,
            header: COMMAND_HEADER,
            tag: GENERAL_COMMAND_TAG,
            flags: fields.bits().to_le_bytes(),
            power: self.power.into(),
            mode: self.drive_mode.into(),
            coarse_temp: temperature::encode_coarse(self.coarse_temperature)?,
            fan_speed: self.fan_speed.into(),
            vertical_vane: self.vertical_vane_left.into(),
            reserved: [0; 5],
            horizontal_vane: self.horizontal_vane.into(),
            fine_temp: temperature::encode_fine(self.fine_temperature)?,
            trailer: GENERAL_COMMAND_TRAILER,
            checksum: 0,
        };
        raw.checksum = seal(raw.as_bytes());
        tracing::debug!(?fields, "Built general command");
        Ok(Bytes::copy_from_slice(raw.as_bytes()))
    }

    /// Build an extended ("08") command frame for dehumidify, power saving, buzzer and wind-break.
    pub fn extend08_command(&self, fields: Extend08Fields) -> Bytes {
        let selected = |field: Extend08Fields, value: u8| if fields.contains(field) { value } else { 0 };
        let mut raw = Extend08CommandRaw {
            sync: FRAME_SYNC,
            header: COMMAND_HEADER,
            tag: EXTEND08_COMMAND_TAG,
            flags: fields.bits(),
            reserved: [0; 2],
            dehum_setting: selected(Extend08Fields::DEHUMIDIFY, self.dehumidify_setting),
            power_saving: selected(
                Extend08Fields::POWER_SAVING,
                if self.power_saving { POWER_SAVING_ON } else { 0 },
            ),
            wind_break: selected(Extend08Fields::WIND_BREAK, self.wind_and_wind_break),
            buzzer: selected(Extend08Fields::BUZZER, BUZZER_ON),
            padding: [0; 8],
            checksum: 0,
        };
        raw.checksum = seal(raw.as_bytes());
        tracing::debug!(?fields, "Built extend08 command");
        Bytes::copy_from_slice(raw.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general::{DriveMode, FanSpeed, HorizontalVane, Power, VerticalVane};

    #[test]
    fn test_default_general_command() {
        let command = GeneralState::default().general_command(GeneralFields::default()).unwrap();
        assert_eq!(hex::encode(&command), "fc410130100100020008090000000000000000ac417d");
    }

    #[test]
    fn test_default_extend08_command() {
        let command = GeneralState::default().extend08_command(Extend08Fields::empty());
        assert_eq!(hex::encode(&command), "fc410130100800000000000000000000000000000076");
    }

    #[test]
    fn test_command_size() {
        assert_eq!(std::mem::size_of::<GeneralCommandRaw>(), COMMAND_SIZE);
        assert_eq!(std::mem::size_of::<Extend08CommandRaw>(), COMMAND_SIZE);
    }

    #[test]
    fn test_general_command_fields() {
        let mut state = GeneralState {
            power: Power::On,
            fan_speed: FanSpeed::Level3,
            vertical_vane_left: VerticalVane::Swing,
            horizontal_vane: HorizontalVane::Split,
            ..Default::default()
        };
        state.set_drive_mode(DriveMode::Cooler);
        state.set_temperature(24.5).unwrap();

        let fields = GeneralFields::POWER
            | GeneralFields::MODE
            | GeneralFields::TEMPERATURE
            | GeneralFields::HORIZONTAL_VANE;
        let command = state.general_command(fields).unwrap();

        assert_eq!(command.len(), COMMAND_SIZE);
        assert_eq!(&command[1..6], &[0x41, 0x01, 0x30, 0x10, 0x01]);
        assert_eq!(command[6], 0x07);
        assert_eq!(command[7], 0x01);
        assert_eq!(command[8], 0x01); // power
        assert_eq!(command[9], 0x03); // cooler
        assert_eq!(command[10], 31 - 24);
        assert_eq!(command[11], 0x05);
        assert_eq!(command[12], 0x07);
        assert_eq!(&command[13..18], &[0; 5]);
        assert_eq!(command[18], 0x08);
        assert_eq!(command[19], 0x80 + 49);
        assert_eq!(command[20], 0x41);
        assert_eq!(command[21], checksum(&command[1..21]));
    }

    #[test]
    fn test_general_command_range_error() {
        let state = GeneralState {
            coarse_temperature: 35,
            ..Default::default()
        };
        assert!(matches!(
            state.general_command(GeneralFields::all()),
            Err(KirigamineError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_extend08_gates_fields() {
        let state = GeneralState {
            dehumidify_setting: 0x46,
            power_saving: true,
            wind_and_wind_break: 0x02,
            ..Default::default()
        };

        let none = state.extend08_command(Extend08Fields::empty());
        assert_eq!(&none[9..13], &[0, 0, 0, 0]);

        let all = state.extend08_command(Extend08Fields::all());
        assert_eq!(all[6], 0x3c);
        assert_eq!(&all[9..13], &[0x46, 0x0a, 0x02, 0x01]);
        assert_eq!(all[21], checksum(&all[1..21]));

        let buzzer = state.extend08_command(Extend08Fields::BUZZER);
        assert_eq!(buzzer[6], 0x10);
        assert_eq!(&buzzer[9..13], &[0, 0, 0, 0x01]);
    }
}
