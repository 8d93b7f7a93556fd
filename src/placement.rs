//! Placement engine: turns a [`Part`] into absolute pickup and placement frames.
//!
//! For each part the engine looks up the supplying tape by component key,
//! takes the tape's next slot and derives two [`MotionFrame`]s:
//!
//! 1. **Pickup**: over the slot at `slot.z + hover_height`, down to `slot.z`,
//!    nozzle turned to the tape's angle.
//! 2. **Place**: over `board_origin + part.pos` at the same travel height, down
//!    to `slot.z + place_z_offset`, nozzle turned by `part.angle - tape.angle`.
//!
//! Angles are normalised into `[0, 360)` degrees and then scaled into the
//! rotation axis' native units with [`MachineConfig::angle_factor`].

use crate::config::Configuration;
use crate::error::{EmitError, PlacementError};
use crate::gcode::CommandSink;
use crate::machine::MachineConfig;
use crate::part::Part;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Absolute coordinates for one approach-and-descend motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionFrame {
    /// Machine-frame x/y of the target.
    pub position: Vec2,
    /// Safe height for the horizontal move onto the target.
    pub travel_z: f32,
    /// Height to descend to at the target.
    pub down_z: f32,
    /// Nozzle rotation in native axis units.
    pub rotation: f32,
}

/// A fully resolved placement, ready for a [`CommandSink`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickAndPlace {
    pub component_name: String,
    /// Component key (`footprint@value`) the tape was selected by.
    pub key: String,
    /// Slot index consumed on the tape.
    pub slot: usize,
    pub pick: MotionFrame,
    pub place: MotionFrame,
}

impl PickAndPlace {
    /// Label used in emitted comments, e.g. `R1 (0805@10k)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.component_name, self.key)
    }
}

/// Outcome of a full placement pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub placed: usize,
    /// Parts that were skipped, in input order.
    pub skipped: Vec<PlacementError>,
}

/// Maps `degrees` into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid yields -0.0 for negative multiples of 360 and rounds tiny
    // negative inputs up to exactly 360.0
    if wrapped == 0.0 || wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Resolves parts against a [`Configuration`] using fixed machine geometry.
#[derive(Clone, Debug, Default)]
pub struct PlacementEngine {
    machine: MachineConfig,
}

impl PlacementEngine {
    pub fn new(machine: MachineConfig) -> Self {
        Self { machine }
    }

    pub fn machine(&self) -> &MachineConfig {
        &self.machine
    }

    /// Resolves a single part, consuming one slot from its tape.
    ///
    /// An unknown component key leaves every tape untouched. An exhausted tape
    /// is reported and stays exhausted; there is no retry.
    pub fn resolve(
        &self,
        config: &mut Configuration,
        part: &Part,
    ) -> Result<PickAndPlace, PlacementError> {
        let key = part.key();
        let board_origin = config.board_origin;
        let Some(tape) = config.tape_for(&key) else {
            return Err(PlacementError::NoTapeForComponent(key));
        };
        let slot = tape.cursor();
        let Ok(slot_pos) = tape.next_pos() else {
            return Err(PlacementError::TapeExhausted(key));
        };

        let factor = self.machine.angle_factor();
        let travel_z = slot_pos.z + self.machine.hover_height;

        let pick = MotionFrame {
            position: slot_pos.truncate(),
            travel_z,
            down_z: slot_pos.z,
            rotation: factor * normalize_degrees(tape.angle()),
        };
        let place = MotionFrame {
            position: part.pos + board_origin,
            travel_z,
            down_z: slot_pos.z + self.machine.place_z_offset,
            rotation: factor * normalize_degrees(part.angle - tape.angle()),
        };

        Ok(PickAndPlace {
            component_name: part.component_name.clone(),
            key,
            slot,
            pick,
            place,
        })
    }

    /// Runs the whole placement pass in input order.
    ///
    /// Parts that cannot be resolved are logged and skipped; the pass
    /// continues with the next part. Only sink failures abort the run.
    pub fn run<'a, I, S>(
        &self,
        config: &mut Configuration,
        parts: I,
        sink: &mut S,
    ) -> Result<RunSummary, EmitError>
    where
        I: IntoIterator<Item = &'a Part>,
        S: CommandSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        sink.begin()?;
        for part in parts {
            match self.resolve(config, part) {
                Ok(resolved) => {
                    sink.emit(&resolved)?;
                    summary.placed += 1;
                }
                Err(err) => {
                    warn!(component = %part.component_name, "{err}");
                    summary.skipped.push(err);
                }
            }
        }
        sink.finish()?;

        info!(
            placed = summary.placed,
            skipped = summary.skipped.len(),
            "placement pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_into_half_open_turn() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-7), 0.0);
        assert!(normalize_degrees(-360.0).is_sign_positive());
        assert!(normalize_degrees(-720.0).is_sign_positive());
        for deg in [-1080.5, -359.9, -0.25, 12.0, 359.99, 1e6] {
            let n = normalize_degrees(deg);
            assert!((0.0..360.0).contains(&n), "{deg} normalised to {n}");
        }
    }
}
