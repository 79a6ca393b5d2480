//! Combined device snapshot built from one poll's frames.

use crate::constants::MIN_AGGREGATE_SIZE;
use crate::energy::EnergyState;
use crate::error::KirigamineError;
use crate::fault::ErrorState;
use crate::frame::FrameGroup;
use crate::general::GeneralState;
use crate::payload::DeviceResponse;
use crate::sensor::SensorState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Keys used by the adaptor's diagnostics page
const UNIT_INFO_MAC: &str = "MAC address";
const UNIT_INFO_RSSI: &str = "RSSI";
const UNIT_INFO_APP_VERSION: &str = "Application version";

/// Identity fields supplied by the transport layer, not by frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub mac: Option<String>,
    pub serial: Option<String>,
    /// Firmware version from the `<VERSION>` element
    pub firmware_version: Option<String>,
    pub app_version: Option<String>,
    /// Signal strength as shown on the diagnostics page, e.g. `-52dBm`
    pub rssi: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub general: Option<GeneralState>,
    pub sensors: Option<SensorState>,
    pub energy: Option<EnergyState>,
    pub errors: Option<ErrorState>,
    pub identity: DeviceIdentity,
}

impl DeviceState {
    /// Fold raw frames into one snapshot. Later frames of a group replace
    /// earlier ones; frames that fail to decode are skipped.
    pub fn aggregate<I, B>(frames: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut state = Self::default();
        for frame in frames {
            state.apply_frame(frame.as_ref());
        }
        state
    }

    /// Same as [`DeviceState::aggregate`] for hex-encoded frames. Non-hex
    /// strings are skipped.
    pub fn aggregate_hex<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let decoded = frames.into_iter().filter_map(|text| match hex::decode(text.as_ref().trim()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(frame = text.as_ref(), error = %e, "Skipping non-hex frame");
                None
            }
        });
        Self::aggregate(decoded)
    }

    /// Build a snapshot from a decrypted `<LSV>` response.
    pub fn from_response(xml: &str) -> Self {
        let response = DeviceResponse::parse(xml);
        let mut state = Self::aggregate_hex(&response.code_values);
        state.identity.mac = response.mac;
        state.identity.serial = response.serial;
        state.identity.firmware_version = response.version;
        state
    }

    /// Decode one frame and fold it in. Returns whether the frame was used.
    pub fn apply_frame(&mut self, data: &[u8]) -> bool {
        if data.len() < MIN_AGGREGATE_SIZE {
            debug!(len = data.len(), "Skipping short frame");
            return false;
        }

        let group = FrameGroup::classify(data);
        let result = match group {
            FrameGroup::General => GeneralState::from_bytes(data).map(|s| self.general = Some(s)),
            FrameGroup::Sensor => SensorState::from_bytes(data).map(|s| self.sensors = Some(s)),
            FrameGroup::Energy => {
                EnergyState::from_bytes(data, self.general.as_ref()).map(|s| self.energy = Some(s))
            }
            FrameGroup::Error => ErrorState::from_bytes(data).map(|s| self.errors = Some(s)),
            FrameGroup::Unknown => {
                trace!(frame = %hex::encode(data), "Skipping frame of unknown group");
                return false;
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                debug!(%group, error = %e, "Skipping undecodable frame");
                false
            }
        }
    }

    /// Merge identity fields scraped from the diagnostics page.
    pub fn apply_unit_info(&mut self, info: &HashMap<String, String>) {
        if let Some(mac) = info.get(UNIT_INFO_MAC) {
            self.identity.mac = Some(mac.clone());
        }
        if let Some(rssi) = info.get(UNIT_INFO_RSSI) {
            self.identity.rssi = Some(rssi.clone());
        }
        if let Some(version) = info.get(UNIT_INFO_APP_VERSION) {
            self.identity.app_version = Some(version.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.sensors.is_none() && self.energy.is_none() && self.errors.is_none()
    }

    pub fn to_json(&self) -> Result<String, KirigamineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(mac) = &self.identity.mac {
            writeln!(f, "Device {}", mac)?;
        }
        match &self.general {
            Some(general) => writeln!(f, "General: {}", general)?,
            None => writeln!(f, "General: -")?,
        }
        match &self.sensors {
            Some(sensors) => writeln!(f, "Sensors: {}", sensors)?,
            None => writeln!(f, "Sensors: -")?,
        }
        match &self.energy {
            Some(energy) => writeln!(f, "Energy: {}", energy)?,
            None => writeln!(f, "Energy: -")?,
        }
        match &self.errors {
            Some(errors) => write!(f, "Errors: {}", errors),
            None => write!(f, "Errors: -"),
        }
    }
}
