use crate::error::KirigamineError;
use crate::frame::{FrameGroup, validate_state_frame};
use crate::general::GeneralState;
use crate::power::estimate_power_watts;
use serde::{Deserialize, Serialize};
use std::fmt;

const COMPRESSOR_FREQUENCY_OFFSET: usize = 9;
const OPERATING_OFFSET: usize = 10;

/// Compressor and operating status from an Energy (subtype `0x06`) frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    /// Raw compressor frequency, 0 when the compressor is stopped
    pub compressor_frequency: u8,
    /// Heat pump actively running
    pub operating: bool,
    /// Derived, see [`estimate_power_watts`]
    pub estimated_power_watts: f64,
}

impl EnergyState {
    /// Decode an Energy frame. `general` feeds the power estimate when known.
    pub fn from_bytes(data: &[u8], general: Option<&GeneralState>) -> Result<Self, KirigamineError> {
        validate_state_frame(data, FrameGroup::Energy)?;
        let compressor_frequency = data[COMPRESSOR_FREQUENCY_OFFSET];
        Ok(Self {
            compressor_frequency,
            operating: data[OPERATING_OFFSET] != 0,
            estimated_power_watts: estimate_power_watts(compressor_frequency, general),
        })
    }
}

impl fmt::Display for EnergyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compressor: {}, Operating: {}, Estimated power: {:.1} W",
            self.compressor_frequency,
            if self.operating { "yes" } else { "no" },
            self.estimated_power_watts
        )
    }
}
