//! Component reel state and slot addressing.

use crate::error::TapeError;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Index of a [`Tape`] inside a [`Configuration`](crate::config::Configuration).
///
/// Several component keys may map to the same `TapeId`; the tape itself is
/// owned once by the configuration's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TapeId(pub usize);

/// One component reel with evenly spaced slots.
///
/// Slot `k` sits at `origin + k * spacing` in the machine frame. Spacing only
/// advances x/y; every slot shares the origin's z.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tape {
    /// Machine-frame position of slot 0.
    origin: Vec3,

    /// Offset between neighbouring slots.
    spacing: Vec2,

    /// Rotation (degrees) at which components sit in the reel.
    angle: f32,

    /// Total number of slots.
    count: usize,

    /// Next slot to hand out. Never decreases.
    cursor: usize,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_first_component_position(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Sets the per-slot offset. Rejects `(0, 0)`, which would stack every
    /// slot on top of the first.
    pub fn set_component_spacing(&mut self, spacing: Vec2) -> Result<(), TapeError> {
        if spacing == Vec2::ZERO {
            return Err(TapeError::ZeroSpacing);
        }
        self.spacing = spacing;
        Ok(())
    }

    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = degrees;
    }

    pub fn set_number_components(&mut self, count: i64) -> Result<(), TapeError> {
        if count < 0 {
            return Err(TapeError::NegativeCount(count));
        }
        self.count = usize::try_from(count).map_err(|_| TapeError::CountTooLarge(count))?;
        Ok(())
    }

    /// Hands out the next free slot and advances the cursor.
    ///
    /// Once `count` slots have been dispensed every further call fails with
    /// [`TapeError::Exhausted`] and leaves the tape untouched.
    pub fn next_pos(&mut self) -> Result<Vec3, TapeError> {
        if self.cursor >= self.count {
            return Err(TapeError::Exhausted { count: self.count });
        }
        let offset = self.spacing * self.cursor as f32;
        self.cursor += 1;
        Ok(self.origin + offset.extend(0.0))
    }

    /// Checks the invariants that can only be judged once a tape block is
    /// complete: more than one slot requires a non-zero spacing.
    pub fn validate(&self) -> Result<(), TapeError> {
        if self.count > 1 && self.spacing == Vec2::ZERO {
            return Err(TapeError::ZeroSpacing);
        }
        Ok(())
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn spacing(&self) -> Vec2 {
        self.spacing
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.count - self.cursor
    }
}
