//! Common error infrastructure for horde-core.
//!
//! Domain errors (`GridError`, `StatusError`, `ResolutionError`, `ConfigError`)
//! live here so that the runtime can classify any failure coming out of the
//! pure rules without knowing which module produced it.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each concern has its own error type with specific variants
//! - **No clamping**: Invalid input is rejected, never silently corrected
//! - **Severity Classification**: Errors are categorized so orchestration code can
//!   decide between "skip this player" and "abort the cycle"

use crate::player::PlayerId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Fatal**: Shared totals are no longer trustworthy, the current cycle must abort
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: out-of-bounds coordinate, unknown status tag
    Validation,

    /// Fatal error - a rules invariant was violated.
    ///
    /// Examples: a dead player handed to the combat resolver
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the caller must abort the operation in progress.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all horde-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Errors raised by the exploration grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds { x: i32, y: i32, size: u32 },
}

impl GameError for GridError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "GRID_OUT_OF_BOUNDS",
        }
    }
}

/// Errors raised when parsing or applying statuses.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown status tag `{0}`")]
    UnknownTag(String),
}

impl GameError for StatusError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTag(_) => "STATUS_UNKNOWN_TAG",
        }
    }
}

/// Rules invariants broken while resolving a horde attack.
///
/// Every variant is fatal: continuing would corrupt the report totals.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("player {player} is already dead but was listed as a combatant")]
    DeadCombatant { player: PlayerId },

    #[error("player {player} appears more than once in the population snapshot")]
    DuplicateCombatant { player: PlayerId },

    #[error("invalid probability {value} for {name}")]
    InvalidProbability { name: &'static str, value: f64 },
}

impl GameError for ResolutionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DeadCombatant { .. } => "RESOLUTION_DEAD_COMBATANT",
            Self::DuplicateCombatant { .. } => "RESOLUTION_DUPLICATE_COMBATANT",
            Self::InvalidProbability { .. } => "RESOLUTION_INVALID_PROBABILITY",
        }
    }
}

/// Errors raised by [`crate::WorldRules::validate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size {0} is too small, need at least 3")]
    GridTooSmall(u32),

    #[error("grid size {0} is too large, coordinates must fit in i32")]
    GridTooLarge(u32),

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("horde growth factor must be at least 1.0, got {0}")]
    InvalidGrowth(f64),

    #[error("horde growth jitter must be within [0, 1), got {0}")]
    InvalidJitter(f64),

    #[error("max action points must be positive")]
    ZeroActionPoints,
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::GridTooSmall(_) => "CONFIG_GRID_TOO_SMALL",
            Self::GridTooLarge(_) => "CONFIG_GRID_TOO_LARGE",
            Self::InvalidProbability { .. } => "CONFIG_INVALID_PROBABILITY",
            Self::InvalidGrowth(_) => "CONFIG_INVALID_GROWTH",
            Self::InvalidJitter(_) => "CONFIG_INVALID_JITTER",
            Self::ZeroActionPoints => "CONFIG_ZERO_ACTION_POINTS",
        }
    }
}
