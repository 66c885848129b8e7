//! Skill activation and effect dispatch.
//!
//! [`SkillResolver`] borrows every piece of mutable simulation state for the
//! duration of one resolution. Skills are addressed through
//! [`CombatantId`]s and resolved from shared [`Arc`] handles, so an effect
//! may freely mutate any combatant (including the caster) and re-enter
//! trigger dispatch.

use std::sync::Arc;

use crate::Frame;
use crate::burst::BurstSequencer;
use crate::combatant::{Combatant, CombatantId, Enemy};
use crate::config::SimConfig;
use crate::definition::{Effect, SkillDefinition, StageMode};
use crate::events::{EventLog, SimEvent};
use crate::rng::RngOracle;

use super::schedule::{Schedule, ScheduledAction};
use super::trigger::Signal;

pub(crate) struct SkillResolver<'a> {
    pub config: &'a SimConfig,
    pub roster: &'a mut [Combatant],
    pub enemy: &'a mut Enemy,
    pub burst: &'a mut BurstSequencer,
    pub schedule: &'a mut Schedule,
    pub events: &'a mut EventLog,
    pub rng: &'a mut dyn RngOracle,
    pub now: Frame,
}

impl SkillResolver<'_> {
    pub fn record(&mut self, event: impl FnOnce() -> SimEvent) {
        self.events.push(self.now, event);
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Fires every skill of `caster` whose trigger matches `signal`.
    pub fn dispatch(&mut self, caster: CombatantId, signal: Signal<'_>) {
        let combatant = &self.roster[caster.index()];
        let last_burst_end = combatant.last_burst_end;
        let fired: Vec<(usize, Arc<SkillDefinition>, u32)> = combatant
            .skills
            .iter()
            .enumerate()
            .filter_map(|(slot, skill)| {
                let count = signal.activations(&skill.def.trigger, self.config, last_burst_end);
                (count > 0).then(|| (slot, Arc::clone(&skill.def), count))
            })
            .collect();

        for (slot, skill, count) in fired {
            for _ in 0..count {
                self.activate(caster, slot, &skill);
            }
        }
    }

    /// Dispatches `signal` to the whole roster in roster order.
    pub fn broadcast(&mut self, signal: Signal<'_>) {
        for index in 0..self.roster.len() {
            self.dispatch(CombatantId(index), signal);
        }
    }

    /// Guard, probability and activation limit, then resolve.
    fn activate(&mut self, caster: CombatantId, slot: usize, skill: &SkillDefinition) {
        let now = self.now;
        let exempt = skill.trigger.kind().bypasses_frame_guard();
        {
            let state = &self.roster[caster.index()].skills[slot];
            if (!exempt && state.fired_at(now)) || state.exhausted() {
                return;
            }
        }
        if let Some(percent) = skill.probability {
            if !self.rng.chance(percent / 100.0) {
                return;
            }
        }

        self.roster[caster.index()].skills[slot].last_fired = Some(now);
        if self.resolve(caster, skill, 0) {
            self.roster[caster.index()].skills[slot].activations += 1;
        }
    }

    /// Resolves the burst skill of `caster`, if it has one.
    pub fn resolve_burst_skill(&mut self, caster: CombatantId) {
        if let Some(skill) = self.roster[caster.index()].burst_skill.clone() {
            self.resolve(caster, &skill, 0);
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Checks the gating condition and applies the effect. Returns whether
    /// the skill applied.
    pub fn resolve(&mut self, caster: CombatantId, skill: &SkillDefinition, depth: usize) -> bool {
        if depth > SimConfig::MAX_STAGE_DEPTH {
            return false;
        }
        if let Some(condition) = &skill.condition {
            if !self.check(condition, caster, caster) {
                return false;
            }
        }
        self.record(|| SimEvent::SkillActivated {
            combatant: caster,
            skill: skill.name.clone(),
        });

        match &skill.effect {
            Effect::Stages { stages, mode } => self.resolve_stages(caster, skill, stages, *mode, depth),
            Effect::Delayed { seconds, action } => self.schedule_action(caster, *seconds, action),
            Effect::CooldownReduction { seconds } => {
                let frames = self.config.seconds_to_frames(*seconds);
                for combatant in self.roster.iter_mut() {
                    combatant.reduce_cooldown(frames);
                }
                self.record(|| SimEvent::CooldownsReduced { frames });
            }
            Effect::AdjustFullBurst { seconds } => {
                let frames = self.config.seconds_to_frames(*seconds);
                self.burst.adjust_full_burst(frames);
            }
            Effect::ReenterBurstStage(stage) => self.burst.request_reentry(*stage),
            Effect::WeaponSwap(spec) => self.swap_weapon(caster, spec),
            Effect::Dot(spec) => self.apply_dot(caster, spec),
            effect => {
                let targets = self.resolve_targets(caster, &skill.target);
                self.strip_tags(&skill.remove_tags, &targets);
                self.apply_effect(caster, skill, effect, &targets);
            }
        }
        true
    }

    fn resolve_stages(
        &mut self,
        caster: CombatantId,
        skill: &SkillDefinition,
        stages: &[SkillDefinition],
        mode: StageMode,
        depth: usize,
    ) {
        let unlocked = match mode {
            StageMode::All => stages.len(),
            StageMode::Progressive => {
                let limit = u32::try_from(stages.len()).unwrap_or(u32::MAX);
                let progress = self.roster[caster.index()]
                    .stage_progress
                    .entry(skill.name.clone())
                    .or_insert(0);
                *progress = (*progress + 1).min(limit);
                *progress as usize
            }
        };
        for stage in &stages[..unlocked] {
            self.resolve(caster, stage, depth + 1);
        }
    }

    fn schedule_action(&mut self, caster: CombatantId, seconds: f64, action: &SkillDefinition) {
        let due = self.now + self.config.seconds_to_frames(seconds);
        self.schedule.push(ScheduledAction {
            due,
            caster,
            skill: Arc::new(action.clone()),
        });
        self.record(|| SimEvent::ActionScheduled {
            combatant: caster,
            skill: action.name.clone(),
            due,
        });
    }

    /// Strips `tags` from every target and from the enemy.
    fn strip_tags(&mut self, tags: &[String], targets: &[CombatantId]) {
        let now = self.now;
        for tag in tags {
            for &target in targets {
                self.roster[target.index()].ledger.remove_by_tag(tag, now);
            }
            self.enemy.ledger_mut().remove_by_tag(tag, now);
        }
    }
}
