//! Rough electrical power estimate.
//!
//! The adaptor does not report consumption. This derives a figure from the
//! compressor frequency, the operating mode and the fan speed using typical
//! residential unit values. It is a heuristic, not protocol data.

use crate::general::{DriveMode, GeneralState};

/// Draw of an idle unit (compressor stopped)
pub const STANDBY_WATTS: f64 = 10.0;

/// Control electronics overhead while running
pub const CONTROL_WATTS: f64 = 20.0;

/// Base compressor draw when the mode is not known
pub const DEFAULT_MODE_WATTS: f64 = 1000.0;

/// Fan draw when the speed is not in the table
pub const DEFAULT_FAN_WATTS: f64 = 50.0;

/// Compressor draw at full frequency for a mode
pub fn mode_base_watts(mode: DriveMode) -> f64 {
    match mode {
        DriveMode::Cooler | DriveMode::AutoCooler => 1200.0,
        DriveMode::Heater | DriveMode::AutoHeater => 1000.0,
        DriveMode::Auto => 1100.0,
        DriveMode::Dehumidify => 800.0,
        DriveMode::Fan => 50.0,
    }
}

/// Fan draw keyed by speed ordinal
pub fn fan_watts(ordinal: u8) -> f64 {
    match ordinal {
        0 => 50.0,
        1 => 30.0,
        2 => 60.0,
        3 => 90.0,
        4 => 120.0,
        _ => DEFAULT_FAN_WATTS,
    }
}

/// Estimate the unit's draw in watts, rounded to one decimal.
///
/// Without a General state the mode and fan fall back to their defaults.
pub fn estimate_power_watts(compressor_frequency: u8, general: Option<&GeneralState>) -> f64 {
    if compressor_frequency == 0 {
        return STANDBY_WATTS;
    }

    let frequency_factor = compressor_frequency as f64 / 255.0;
    let base = general.map_or(DEFAULT_MODE_WATTS, |g| mode_base_watts(g.drive_mode));
    let fan = general.map_or(DEFAULT_FAN_WATTS, |g| fan_watts(g.fan_speed.ordinal()));

    let total = base * frequency_factor + fan + CONTROL_WATTS;
    (total * 10.0).round() / 10.0
}
