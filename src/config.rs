//! Layout description loader.
//!
//! The layout is a line-oriented text file. The first whitespace token of a
//! line selects the directive, the remaining tokens are its fields:
//!
//! ```text
//! # Board origin in machine coordinates
//! Board:
//! origin: 100 50
//!
//! Tape: 0805@10k 0805@22k
//! origin: 10 20 5
//! spacing: 4 0
//! angle: 90
//! count: 25
//! ```
//!
//! `Board:` closes the open tape block. `origin:` sets the board origin
//! (two fields) outside a tape block and the tape's first slot (three fields)
//! inside one. Unknown directives are skipped so newer layout files still load.

use crate::error::{ConfigError, ParseErrorKind};
use crate::tape::{Tape, TapeId};
use glam::{Vec2, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const BOARD: &str = "Board:";
const TAPE: &str = "Tape:";
const ORIGIN: &str = "origin:";
const SPACING: &str = "spacing:";
const ANGLE: &str = "angle:";
const COUNT: &str = "count:";

/// Board placement and the tapes feeding each component type.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    /// Machine-frame position of the board's local origin.
    pub board_origin: Vec2,

    /// Arena of all tapes. Indexed by [`TapeId`].
    tapes: Vec<Tape>,

    /// Component key (`footprint@value`) to supplying tape. Many keys may
    /// share one tape.
    tape_for_component: HashMap<String, TapeId>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the layout file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses a layout description. Fails as a whole on the first bad line.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut parser = LayoutParser::default();
        for (idx, raw) in text.lines().enumerate() {
            parser.line(idx + 1, raw)?;
        }
        parser.close_tape()?;

        let config = parser.config;
        debug!(
            board_origin = ?config.board_origin,
            tapes = config.tapes.len(),
            components = config.tape_for_component.len(),
            "layout loaded"
        );
        Ok(config)
    }

    /// Appends a tape to the arena and registers it under every key in
    /// `components`.
    ///
    /// Keys that already belong to another tape are rejected and nothing is
    /// registered.
    pub fn add_tape<I, S>(&mut self, tape: Tape, components: I) -> Result<TapeId, ParseErrorKind>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = components.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ParseErrorKind::MissingComponentNames);
        }
        for (i, key) in keys.iter().enumerate() {
            if self.tape_for_component.contains_key(key) || keys[..i].contains(key) {
                return Err(ParseErrorKind::DuplicateComponent(key.clone()));
            }
        }

        let id = TapeId(self.tapes.len());
        self.tapes.push(tape);
        for key in keys {
            self.tape_for_component.insert(key, id);
        }
        Ok(id)
    }

    pub fn tape_id(&self, key: &str) -> Option<TapeId> {
        self.tape_for_component.get(key).copied()
    }

    pub fn tape(&self, id: TapeId) -> Option<&Tape> {
        self.tapes.get(id.0)
    }

    pub fn tape_mut(&mut self, id: TapeId) -> Option<&mut Tape> {
        self.tapes.get_mut(id.0)
    }

    /// The tape supplying `key`, if any.
    pub fn tape_for(&mut self, key: &str) -> Option<&mut Tape> {
        let id = self.tape_id(key)?;
        self.tapes.get_mut(id.0)
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    /// All registered component keys with the tape that supplies them.
    pub fn components(&self) -> impl Iterator<Item = (&str, TapeId)> {
        self.tape_for_component
            .iter()
            .map(|(key, id)| (key.as_str(), *id))
    }
}

impl FromStr for Configuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Tape block currently being filled, with the `Tape:` line it started on.
#[derive(Debug)]
struct OpenTape {
    id: TapeId,
    line: usize,
    content: String,
}

#[derive(Debug, Default)]
struct LayoutParser {
    config: Configuration,
    open: Option<OpenTape>,
}

impl LayoutParser {
    fn line(&mut self, line: usize, raw: &str) -> Result<(), ConfigError> {
        let text = strip_comment(raw);
        let mut tokens = text.split_whitespace();
        let Some(directive) = tokens.next() else {
            return Ok(());
        };
        let fields: Vec<&str> = tokens.collect();

        let fail = |kind: ParseErrorKind| ConfigError::Parse {
            line,
            content: raw.trim().to_string(),
            kind,
        };

        match directive {
            BOARD => self.close_tape(),
            TAPE => {
                self.close_tape()?;
                let id = self
                    .config
                    .add_tape(Tape::new(), fields.iter().copied())
                    .map_err(fail)?;
                debug!(tape = id.0, components = ?fields, "tape registered");
                self.open = Some(OpenTape {
                    id,
                    line,
                    content: raw.trim().to_string(),
                });
                Ok(())
            }
            ORIGIN => match self.current_tape() {
                Some(tape) => {
                    let [x, y, z] = floats::<3>(ORIGIN, &fields).map_err(fail)?;
                    tape.set_first_component_position(Vec3::new(x, y, z));
                    Ok(())
                }
                None => {
                    let [x, y] = floats::<2>(ORIGIN, &fields).map_err(fail)?;
                    self.config.board_origin = Vec2::new(x, y);
                    Ok(())
                }
            },
            SPACING => {
                let tape = self
                    .current_tape()
                    .ok_or(ParseErrorKind::PropertyOutsideTape(SPACING))
                    .map_err(fail)?;
                let [dx, dy] = floats::<2>(SPACING, &fields).map_err(fail)?;
                tape.set_component_spacing(Vec2::new(dx, dy))
                    .map_err(|e| fail(e.into()))
            }
            ANGLE => {
                let tape = self
                    .current_tape()
                    .ok_or(ParseErrorKind::PropertyOutsideTape(ANGLE))
                    .map_err(fail)?;
                let [degrees] = floats::<1>(ANGLE, &fields).map_err(fail)?;
                tape.set_angle(degrees);
                Ok(())
            }
            COUNT => {
                let tape = self
                    .current_tape()
                    .ok_or(ParseErrorKind::PropertyOutsideTape(COUNT))
                    .map_err(fail)?;
                let count = integer(COUNT, &fields).map_err(fail)?;
                tape.set_number_components(count)
                    .map_err(|e| fail(e.into()))
            }
            other => {
                warn!(line, directive = other, "ignoring unknown layout directive");
                Ok(())
            }
        }
    }

    fn current_tape(&mut self) -> Option<&mut Tape> {
        let id = self.open.as_ref()?.id;
        self.config.tape_mut(id)
    }

    /// Ends the open tape block, if any, and checks it is usable.
    fn close_tape(&mut self) -> Result<(), ConfigError> {
        let Some(open) = self.open.take() else {
            return Ok(());
        };
        if let Some(tape) = self.config.tape(open.id) {
            tape.validate().map_err(|e| ConfigError::Parse {
                line: open.line,
                content: open.content,
                kind: e.into(),
            })?;
        }
        Ok(())
    }
}

/// Drops a `#` comment. Only a `#` that starts a token opens a comment, so
/// component names such as `SOT23#3@X` survive.
fn strip_comment(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let cut = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()))
        .unwrap_or(raw.len());
    &raw[..cut]
}

fn floats<const N: usize>(
    directive: &'static str,
    fields: &[&str],
) -> Result<[f32; N], ParseErrorKind> {
    if fields.len() != N {
        return Err(ParseErrorKind::FieldCount {
            directive,
            expected: N,
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(fields) {
        *slot = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseErrorKind::InvalidNumber {
                directive,
                token: token.to_string(),
            })?;
    }
    Ok(out)
}

fn integer(directive: &'static str, fields: &[&str]) -> Result<i64, ParseErrorKind> {
    let [token] = fields else {
        return Err(ParseErrorKind::FieldCount {
            directive,
            expected: 1,
        });
    };
    token.parse().map_err(|_| ParseErrorKind::InvalidNumber {
        directive,
        token: token.to_string(),
    })
}
