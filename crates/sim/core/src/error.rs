//! Error infrastructure for sim-core.
//!
//! Only setup can fail. Once a [`crate::engine::Simulation`] is built, every
//! frame resolves without errors: unknown modifiers are inert, counters are
//! clamped, and redundant skill activations are dropped silently.

/// Severity level of an error, used for categorization by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input; the caller must change the definitions before retrying.
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

/// Errors raised while assembling a simulation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("roster is empty")]
    EmptyRoster,

    #[error("duplicate combatant name `{0}`")]
    DuplicateCombatant(String),

    #[error("burst rotation references unknown combatant `{0}`")]
    UnknownCombatant(String),

    #[error("skill `{skill}` nests stages deeper than {limit} levels")]
    StageDepthExceeded { skill: String, limit: usize },

    #[error("combatant index {0} is out of range")]
    CombatantOutOfRange(usize),
}

impl SimError {
    /// Returns the severity level of this error.
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CombatantOutOfRange(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EmptyRoster => "EMPTY_ROSTER",
            Self::DuplicateCombatant(_) => "DUPLICATE_COMBATANT",
            Self::UnknownCombatant(_) => "UNKNOWN_COMBATANT",
            Self::StageDepthExceeded { .. } => "STAGE_DEPTH_EXCEEDED",
            Self::CombatantOutOfRange(_) => "COMBATANT_OUT_OF_RANGE",
        }
    }
}
