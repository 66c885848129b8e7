//! Mutable per-combatant bookkeeping.

use std::sync::Arc;

use crate::Frame;
use crate::definition::{DamageProfile, SkillDefinition};

/// Cumulative hit statistics that drive count triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitCounters {
    pub shots: u64,
    pub pellet_hits: u64,
    pub crit_hits: u64,
    pub core_hits: u64,
    pub full_charges: u64,
}

/// A triggered skill together with its activation bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct SkillSlot {
    pub def: Arc<SkillDefinition>,
    pub last_fired: Option<Frame>,
    pub activations: u32,
}

impl SkillSlot {
    pub fn new(def: SkillDefinition) -> Self {
        Self {
            def: Arc::new(def),
            last_fired: None,
            activations: 0,
        }
    }

    pub fn fired_at(&self, now: Frame) -> bool {
        self.last_fired == Some(now)
    }

    pub fn exhausted(&self) -> bool {
        self.def
            .max_activations
            .is_some_and(|limit| self.activations >= limit)
    }
}

/// Active damage-over-time entry, evaluated on every periodic tick while
/// `now <= expires_at`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotEntry {
    pub multiplier: f64,
    pub stacks: u32,
    pub max_stack: u32,
    pub expires_at: Frame,
    pub profile: DamageProfile,
}

impl DotEntry {
    pub fn tick_multiplier(&self) -> f64 {
        self.multiplier * f64::from(self.stacks)
    }
}

/// Active heal-over-time entry.
#[derive(Clone, Debug, PartialEq)]
pub struct HotEntry {
    pub source: String,
    pub per_tick: f64,
    pub expires_at: Frame,
}
