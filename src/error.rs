use std::path::PathBuf;

use thiserror::Error;

/// Failures local to a single [`Tape`](crate::tape::Tape).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TapeError {
    #[error("spacing must be non-zero in at least one axis")]
    ZeroSpacing,
    #[error("component count must not be negative (got {0})")]
    NegativeCount(i64),
    #[error("component count {0} does not fit this platform")]
    CountTooLarge(i64),
    #[error("all {count} components used up")]
    Exhausted { count: usize },
}

/// What went wrong on a single line of a layout description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("`{0}` outside of a tape block")]
    PropertyOutsideTape(&'static str),
    #[error("`{directive}` expects {expected} value(s)")]
    FieldCount {
        directive: &'static str,
        expected: usize,
    },
    #[error("`{directive}`: `{token}` is not a valid number")]
    InvalidNumber {
        directive: &'static str,
        token: String,
    },
    #[error("`Tape:` needs at least one component name")]
    MissingComponentNames,
    #[error("component `{0}` is already assigned to another tape")]
    DuplicateComponent(String),
    #[error(transparent)]
    Tape(#[from] TapeError),
}

/// Fatal configuration load failure. No partial configuration survives it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout line {line}: {kind} ('{content}')")]
    Parse {
        line: usize,
        content: String,
        kind: ParseErrorKind,
    },
}

impl ConfigError {
    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Self::Parse { kind, .. } => Some(kind),
            Self::Io { .. } => None,
        }
    }
}

/// Per-placement failure. The run skips the part and carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("no tape for '{0}'")]
    NoTapeForComponent(String),
    #[error("out of components for '{0}'")]
    TapeExhausted(String),
}

#[derive(Debug, Error)]
pub enum PartListError {
    #[error("failed to read part list: {0}")]
    Io(#[from] std::io::Error),
    #[error("part list line {line}: {reason} ('{content}')")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode placement: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MachineConfigError {
    #[error("failed to read machine config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid machine config: {0}")]
    Json(#[from] serde_json::Error),
}
