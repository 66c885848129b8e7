//! Observable record of a run.
//!
//! The engine never performs I/O. Everything a caller might want to log or
//! audit is pushed into the [`EventLog`] as a typed [`SimEvent`] carrying the
//! resolved numbers, and the caller decides how to render it.

use crate::Frame;
use crate::combatant::CombatantId;
use crate::definition::BurstStage;
use crate::ledger::Modifier;

/// Whose ledger an effect landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recipient {
    Combatant(CombatantId),
    /// The shared enemy ledger.
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    // ========================================================================
    // Weapon
    // ========================================================================
    ShotFired {
        combatant: CombatantId,
        pellets: u32,
        damage: f64,
        hits: u32,
        crits: u32,
        cores: u32,
        ammo: u32,
        max_ammo: u32,
    },
    ReloadStarted {
        combatant: CombatantId,
        frames: u32,
    },
    ReloadComplete {
        combatant: CombatantId,
    },
    WeaponSwapped {
        combatant: CombatantId,
        weapon: String,
        ammo: u32,
        max_ammo: u32,
    },
    WeaponReverted {
        combatant: CombatantId,
        ammo: u32,
        max_ammo: u32,
    },
    AmmoChanged {
        combatant: CombatantId,
        ammo: u32,
    },

    // ========================================================================
    // Skills
    // ========================================================================
    SkillActivated {
        combatant: CombatantId,
        skill: String,
    },
    BuffApplied {
        caster: CombatantId,
        recipient: Recipient,
        skill: String,
        modifier: Modifier,
        value: f64,
        frames: Frame,
    },
    StackChanged {
        recipient: Recipient,
        stack: String,
        count: u32,
    },
    DebuffBlocked {
        caster: CombatantId,
        target: CombatantId,
        skill: String,
    },
    TagsRemoved {
        recipient: Recipient,
        tag: String,
        removed: u32,
    },
    FlagActivated {
        combatant: CombatantId,
        flag: String,
    },
    SkillDamage {
        combatant: CombatantId,
        skill: String,
        damage: f64,
        hits: u32,
    },
    DotApplied {
        combatant: CombatantId,
        name: String,
        stacks: u32,
        until: Frame,
    },
    DotTick {
        combatant: CombatantId,
        name: String,
        stacks: u32,
        damage: f64,
    },
    HealApplied {
        target: CombatantId,
        source: String,
        amount: f64,
        actual: f64,
        hp: f64,
        distributed: bool,
    },
    CooldownsReduced {
        frames: Frame,
    },
    ActionScheduled {
        combatant: CombatantId,
        skill: String,
        due: Frame,
    },

    // ========================================================================
    // Burst
    // ========================================================================
    BurstStageEntered {
        stage: BurstStage,
    },
    BurstActivated {
        combatant: CombatantId,
        stage: BurstStage,
    },
    FullBurstStarted {
        frames: Frame,
    },
    FullBurstEnded,
}

impl SimEvent {
    /// The combatant this event is about, if any.
    pub fn combatant(&self) -> Option<CombatantId> {
        match self {
            Self::ShotFired { combatant, .. }
            | Self::ReloadStarted { combatant, .. }
            | Self::ReloadComplete { combatant }
            | Self::WeaponSwapped { combatant, .. }
            | Self::WeaponReverted { combatant, .. }
            | Self::AmmoChanged { combatant, .. }
            | Self::SkillActivated { combatant, .. }
            | Self::FlagActivated { combatant, .. }
            | Self::SkillDamage { combatant, .. }
            | Self::DotApplied { combatant, .. }
            | Self::DotTick { combatant, .. }
            | Self::ActionScheduled { combatant, .. }
            | Self::BurstActivated { combatant, .. } => Some(*combatant),
            Self::BuffApplied { caster, .. } | Self::DebuffBlocked { caster, .. } => Some(*caster),
            Self::HealApplied { target, .. } => Some(*target),
            Self::StackChanged { recipient, .. } | Self::TagsRemoved { recipient, .. } => {
                match recipient {
                    Recipient::Combatant(id) => Some(*id),
                    Recipient::Enemy => None,
                }
            }
            Self::CooldownsReduced { .. }
            | Self::BurstStageEntered { .. }
            | Self::FullBurstStarted { .. }
            | Self::FullBurstEnded => None,
        }
    }

    /// High-volume events that loggers usually keep at debug level.
    pub fn is_verbose(&self) -> bool {
        matches!(
            self,
            Self::ShotFired { .. }
                | Self::DotTick { .. }
                | Self::ReloadStarted { .. }
                | Self::ReloadComplete { .. }
                | Self::StackChanged { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventRecord {
    pub frame: Frame,
    pub event: SimEvent,
}

/// Append-only event buffer. Disabled logs drop events without building
/// them.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    enabled: bool,
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&mut self, frame: Frame, event: impl FnOnce() -> SimEvent) {
        if self.enabled {
            self.records.push(EventRecord {
                frame,
                event: event(),
            });
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}
