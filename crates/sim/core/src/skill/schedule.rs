//! Delayed skill actions.

use std::sync::Arc;

use crate::Frame;
use crate::combatant::CombatantId;
use crate::definition::SkillDefinition;

#[derive(Clone, Debug)]
pub struct ScheduledAction {
    pub due: Frame,
    pub caster: CombatantId,
    pub skill: Arc<SkillDefinition>,
}

/// Pending actions, kept in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    pending: Vec<ScheduledAction>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: ScheduledAction) {
        self.pending.push(action);
    }

    /// Removes and returns every action due at or before `now`, in the order
    /// they were scheduled.
    pub fn take_due(&mut self, now: Frame) -> Vec<ScheduledAction> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|action| action.due <= now);
        self.pending = pending;
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
