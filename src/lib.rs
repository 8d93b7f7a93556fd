//! # pnp-gcode
//!
//! Tape-feed model and coordinate engine for a G-code driven pick'n'place head.
//!
//! A layout file describes where the board sits on the machine bed and which
//! component reels ("tapes") feed which `footprint@value` keys. The
//! [`PlacementEngine`] walks a part list in order, takes the next slot from
//! each part's tape and computes absolute pickup and placement coordinates,
//! which a [`CommandSink`] turns into motion commands.

pub mod config;
pub mod error;
pub mod gcode;
pub mod machine;
pub mod part;
pub mod placement;
pub mod tape;

pub use config::*;
pub use error::*;
pub use gcode::*;
pub use machine::*;
pub use part::*;
pub use placement::*;
pub use tape::*;
