use crate::error::MachineConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Machine geometry used when resolving pickup and placement frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Clearance (mm) above the slot height used for all travel moves.
    pub hover_height: f32,
    /// Offset (mm) from the slot height to the release height on the board.
    /// Negative values release lower than the pickup depth.
    pub place_z_offset: f32,
    /// Native rotation-axis units for one full nozzle turn.
    pub angle_units_per_turn: f32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            hover_height: 10.0,
            place_z_offset: -2.0,
            angle_units_per_turn: 50.34965,
        }
    }
}

impl MachineConfig {
    /// Native units per degree.
    pub fn angle_factor(&self) -> f32 {
        self.angle_units_per_turn / 360.0
    }

    /// Loads geometry from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MachineConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
