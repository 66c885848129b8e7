//! Validation failures detected while turning raw content into definitions.
//!
//! Parse and I/O failures surface through [`anyhow`] in the loaders; the
//! variants here describe content that parsed but cannot be simulated.

use crate::level::SkillLevel;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("skill level {0} is outside 1..={max}", max = SkillLevel::MAX)]
    LevelOutOfRange(u8),

    #[error("level table has {0} entries, expected 1 or {max}", max = SkillLevel::MAX)]
    BadTableLength(usize),

    #[error("unknown weapon class `{0}`")]
    UnknownWeaponClass(String),

    #[error("unknown element `{0}`")]
    UnknownElement(String),

    #[error("unknown combatant class `{0}`")]
    UnknownClass(String),

    #[error("unknown trigger `{0}`")]
    UnknownTrigger(String),

    #[error("trigger `{trigger}` requires `{field}`")]
    MissingTriggerField {
        trigger: String,
        field: &'static str,
    },

    #[error("unknown damage profile flag `{0}`")]
    UnknownProfileFlag(String),

    #[error("unknown speed lock `{0}`")]
    UnknownSpeedLock(String),

    #[error("burst stage must be 1, 2 or 3, got {0}")]
    InvalidBurstStage(u8),
}

impl ContentError {
    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::LevelOutOfRange(_) => "LEVEL_OUT_OF_RANGE",
            Self::BadTableLength(_) => "BAD_TABLE_LENGTH",
            Self::UnknownWeaponClass(_) => "UNKNOWN_WEAPON_CLASS",
            Self::UnknownElement(_) => "UNKNOWN_ELEMENT",
            Self::UnknownClass(_) => "UNKNOWN_CLASS",
            Self::UnknownTrigger(_) => "UNKNOWN_TRIGGER",
            Self::MissingTriggerField { .. } => "MISSING_TRIGGER_FIELD",
            Self::UnknownProfileFlag(_) => "UNKNOWN_PROFILE_FLAG",
            Self::UnknownSpeedLock(_) => "UNKNOWN_SPEED_LOCK",
            Self::InvalidBurstStage(_) => "INVALID_BURST_STAGE",
        }
    }
}
