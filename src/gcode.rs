//! Output sinks for resolved placements.
//!
//! [`GcodeEmitter`] writes the Marlin-style text the pick'n'place head runs:
//! a homing preamble, one pick block and one place block per part, then a
//! closing `M84`. Coordinates and angles are printed with three decimals.
//! The nozzle rotation travels on the `E` axis.

use crate::error::EmitError;
use crate::placement::PickAndPlace;
use std::io::Write;

/// Output pin switching the vacuum pump.
const SUCTION_PIN: u8 = 6;
/// Output pin switching the release air puff.
const BLOW_PIN: u8 = 8;
/// How long the release puff stays on.
const BLOW_DWELL_MS: u32 = 100;

const PREAMBLE: &str = "
; Preamble. Fill be whatever is necessary to init.
; Assumes an 'A' axis that rotates the pick'n place nozzle. The values
; 0..360 correspond to absolute degrees.
; (correction: for now, we mess with an E-axis instead of A)
G28 X0 Y0  ; Now home (x/y) - needle over free space
G28 Z0     ; Now it is safe to home z
T1         ; Use E1 extruder
M302
G92 E0

G1 Z35 E0 F2500 ; Move needle out of way
";

const CLOSING: &str = "\nM84 ; done.\n";

/// Receives the placement pass in order: one `begin`, an `emit` per resolved
/// part, one `finish`.
pub trait CommandSink {
    fn begin(&mut self) -> Result<(), EmitError>;
    fn emit(&mut self, placement: &PickAndPlace) -> Result<(), EmitError>;
    fn finish(&mut self) -> Result<(), EmitError>;
}

/// Renders placements as G-code.
pub struct GcodeEmitter<W: Write> {
    out: W,
}

impl<W: Write> GcodeEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_pick(&mut self, name: &str, p: &PickAndPlace) -> std::io::Result<()> {
        let f = &p.pick;
        write!(
            self.out,
            "
; Pick {name}
G1 X{:.3} Y{:.3} Z{:.3} E{:.3} ; Move over component to pick.
G1 Z{:.3}   ; move down
G4
M42 P{SUCTION_PIN} S255  ; turn on suckage
G1 Z{:.3}  ; Move up a bit for traveling
",
            f.position.x, f.position.y, f.travel_z, f.rotation, f.down_z, f.travel_z,
        )
    }

    fn write_place(&mut self, name: &str, p: &PickAndPlace) -> std::io::Result<()> {
        let f = &p.place;
        write!(
            self.out,
            "
; Place {name}
G1 X{:.3} Y{:.3} Z{:.3} E{:.3} ; Move over component to place.
G1 Z{:.3}    ; move down.
G4
M42 P{SUCTION_PIN} S0    ; turn off suckage
G4
M42 P{BLOW_PIN} S255  ; blow
G4 P{BLOW_DWELL_MS}      ; .. for 100ms
M42 P{BLOW_PIN} S0    ; done.
G1 Z{:.3}   ; Move up
",
            f.position.x, f.position.y, f.travel_z, f.rotation, f.down_z, f.travel_z,
        )
    }
}

impl<W: Write> CommandSink for GcodeEmitter<W> {
    fn begin(&mut self) -> Result<(), EmitError> {
        self.out.write_all(PREAMBLE.as_bytes())?;
        Ok(())
    }

    fn emit(&mut self, placement: &PickAndPlace) -> Result<(), EmitError> {
        let name = placement.display_name();
        self.write_pick(&name, placement)?;
        self.write_place(&name, placement)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.out.write_all(CLOSING.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes each resolved placement as one JSON object per line.
pub struct JsonLinesEmitter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for JsonLinesEmitter<W> {
    fn begin(&mut self) -> Result<(), EmitError> {
        Ok(())
    }

    fn emit(&mut self, placement: &PickAndPlace) -> Result<(), EmitError> {
        serde_json::to_writer(&mut self.out, placement)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.out.flush()?;
        Ok(())
    }
}
