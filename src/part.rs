//! Placement requests and the position-file reader that produces them.

use crate::error::PartListError;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Joins footprint and value into a component key.
pub const KEY_SEPARATOR: char = '@';

/// Builds the lookup key (`footprint@value`) that selects a tape.
pub fn component_key(footprint: &str, value: &str) -> String {
    format!("{footprint}{KEY_SEPARATOR}{value}")
}

/// A single component to be placed on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Reference designator, e.g. `R12`.
    pub component_name: String,
    pub footprint: String,
    pub value: String,
    /// Target position in the board-relative frame.
    pub pos: Vec2,
    /// Target rotation in degrees, board-relative.
    pub angle: f32,
}

impl Part {
    pub fn new(
        component_name: impl Into<String>,
        footprint: impl Into<String>,
        value: impl Into<String>,
        pos: Vec2,
        angle: f32,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            footprint: footprint.into(),
            value: value.into(),
            pos,
            angle,
        }
    }

    pub fn key(&self) -> String {
        component_key(&self.footprint, &self.value)
    }
}

/// Reads a KiCad-style position list.
///
/// One part per line: `Ref Val Package PosX PosY Rot [Side]`. Blank lines and
/// `#` comments are skipped. Parts come back in file order, which is the
/// order tape slots get consumed in.
pub fn read_parts(reader: impl BufRead) -> Result<Vec<Part>, PartListError> {
    let mut parts = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(part) = parse_part_line(idx + 1, &line)? {
            parts.push(part);
        }
    }
    Ok(parts)
}

fn parse_part_line(line: usize, raw: &str) -> Result<Option<Part>, PartListError> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let fail = |reason: String| PartListError::Parse {
        line,
        content: text.to_string(),
        reason,
    };

    let fields: Vec<&str> = text.split_whitespace().collect();
    let [name, value, footprint, x, y, rot, ..] = fields[..] else {
        return Err(fail(format!(
            "expected `Ref Val Package PosX PosY Rot`, got {} field(s)",
            fields.len()
        )));
    };

    let number = |label: &str, token: &str| {
        token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| fail(format!("{label} `{token}` is not a number")))
    };

    Ok(Some(Part::new(
        name,
        footprint,
        value,
        Vec2::new(number("PosX", x)?, number("PosY", y)?),
        number("Rot", rot)?,
    )))
}
