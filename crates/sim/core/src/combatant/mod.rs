//! Runtime state of one roster member.
//!
//! A [`Combatant`] composes the weapon machine, its own buff ledger, the
//! triggered skills and the damage bookkeeping. It is created from a
//! [`CombatantDefinition`] when the simulation is assembled and lives for
//! the whole run.
mod enemy;
mod state;

pub use enemy::Enemy;
pub use state::{DotEntry, HitCounters, HotEntry};
pub(crate) use state::SkillSlot;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::Frame;
use crate::config::SimConfig;
use crate::damage::{Attacker, effective_attack, max_hp};
use crate::definition::{
    BurstStage, CombatantClass, CombatantDefinition, Effect, Element, SkillDefinition, TriggerKind,
};
use crate::ledger::{BuffLedger, STUN_TAG};
use crate::weapon::WeaponMachine;

/// Breakdown key for regular weapon shots.
pub const WEAPON_ATTACK: &str = "Weapon Attack";

/// Position of a combatant in the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub usize);

impl CombatantId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    squad: String,
    element: Element,
    class: CombatantClass,
    burst_stage: BurstStage,
    base_attack: f64,
    base_hp: f64,

    pub(crate) machine: WeaponMachine,
    pub(crate) ledger: BuffLedger,
    pub(crate) skills: Vec<SkillSlot>,
    pub(crate) burst_skill: Option<Arc<SkillDefinition>>,
    burst_cooldown: Frame,
    pub(crate) cooldown: Frame,

    pub(crate) flags: BTreeSet<String>,
    /// Unlocked stage count per progressive stage skill, keyed by name.
    pub(crate) stage_progress: BTreeMap<String, u32>,
    pub(crate) counters: HitCounters,
    pub(crate) dots: BTreeMap<String, DotEntry>,
    pub(crate) hots: Vec<HotEntry>,
    pub(crate) last_burst_end: Option<Frame>,
    pub(crate) hp: f64,

    total_damage: f64,
    breakdown: BTreeMap<String, f64>,
}

impl Combatant {
    pub fn new(id: CombatantId, definition: CombatantDefinition, config: &SimConfig) -> Self {
        let burst_cooldown = config.seconds_to_frames(definition.burst_cooldown_seconds());

        let mut seen = HashSet::<(String, TriggerKind)>::new();
        let mut breakdown = BTreeMap::from([(WEAPON_ATTACK.to_string(), 0.0)]);
        let mut skills = Vec::with_capacity(definition.skills.len());
        for skill in definition.skills {
            if seen.insert((skill.name.clone(), skill.trigger.kind())) {
                register_breakdown(&skill, &mut breakdown);
                skills.push(SkillSlot::new(skill));
            }
        }
        if let Some(burst) = &definition.burst_skill {
            register_breakdown(burst, &mut breakdown);
        }

        Self {
            id,
            name: definition.name,
            squad: definition.squad,
            element: definition.element,
            class: definition.class,
            burst_stage: definition.burst_stage,
            base_attack: definition.base_attack,
            base_hp: definition.base_hp,
            machine: WeaponMachine::new(definition.weapon),
            ledger: BuffLedger::new(),
            skills,
            burst_skill: definition.burst_skill.map(Arc::new),
            burst_cooldown,
            cooldown: 0,
            flags: BTreeSet::new(),
            stage_progress: BTreeMap::new(),
            counters: HitCounters::default(),
            dots: BTreeMap::new(),
            hots: Vec::new(),
            last_burst_end: None,
            hp: definition.base_hp,
            total_damage: 0.0,
            breakdown,
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn squad(&self) -> &str {
        &self.squad
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn class(&self) -> CombatantClass {
        self.class
    }

    pub fn burst_stage(&self) -> BurstStage {
        self.burst_stage
    }

    pub fn base_attack(&self) -> f64 {
        self.base_attack
    }

    pub fn base_hp(&self) -> f64 {
        self.base_hp
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn machine(&self) -> &WeaponMachine {
        &self.machine
    }

    pub fn ledger(&self) -> &BuffLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut BuffLedger {
        &mut self.ledger
    }

    pub fn counters(&self) -> HitCounters {
        self.counters
    }

    pub fn cooldown(&self) -> Frame {
        self.cooldown
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn dots(&self) -> &BTreeMap<String, DotEntry> {
        &self.dots
    }

    pub fn last_burst_end(&self) -> Option<Frame> {
        self.last_burst_end
    }

    pub fn total_damage(&self) -> f64 {
        self.total_damage
    }

    pub fn breakdown(&self) -> &BTreeMap<String, f64> {
        &self.breakdown
    }

    // ========================================================================
    // Derived stats
    // ========================================================================

    /// Current attack after buffs.
    pub fn attack(&mut self, now: Frame) -> f64 {
        effective_attack(self.base_attack, self.base_hp, &mut self.ledger, now)
    }

    pub fn max_hp(&mut self, now: Frame) -> f64 {
        max_hp(self.base_hp, &mut self.ledger, now)
    }

    pub fn hp_ratio(&mut self, now: Frame) -> f64 {
        let max = self.max_hp(now);
        if max > 0.0 { self.hp / max } else { 0.0 }
    }

    pub fn is_stunned(&self, now: Frame) -> bool {
        self.ledger.has_tag(STUN_TAG, now)
    }

    /// Off cooldown and able to act.
    pub fn burst_ready(&self, now: Frame) -> bool {
        self.cooldown <= 0 && !self.is_stunned(now)
    }

    pub(crate) fn attacker(&mut self) -> Attacker<'_> {
        Attacker {
            base_attack: self.base_attack,
            base_hp: self.base_hp,
            element: self.element,
            hit_size: self.machine.weapon().hit_size,
            ledger: &mut self.ledger,
        }
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    pub(crate) fn record_damage(&mut self, source: &str, amount: f64) {
        self.total_damage += amount;
        *self.breakdown.entry(source.to_string()).or_insert(0.0) += amount;
    }

    pub(crate) fn reset_burst_cooldown(&mut self) {
        self.cooldown = self.burst_cooldown;
    }

    pub(crate) fn tick_cooldown(&mut self) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }

    pub(crate) fn reduce_cooldown(&mut self, frames: Frame) {
        if self.cooldown > 0 {
            self.cooldown = (self.cooldown - frames).max(0);
        }
    }
}

/// Pre-registers every damage source so the breakdown lists zero-damage
/// skills too.
fn register_breakdown(skill: &SkillDefinition, breakdown: &mut BTreeMap<String, f64>) {
    match &skill.effect {
        Effect::Damage(_) => {
            breakdown.entry(skill.name.clone()).or_insert(0.0);
        }
        Effect::Dot(dot) => {
            breakdown.entry(dot.name.clone()).or_insert(0.0);
        }
        Effect::Stages { stages, .. } => {
            for stage in stages {
                register_breakdown(stage, breakdown);
            }
        }
        Effect::Delayed { action, .. } => register_breakdown(action, breakdown),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{
        BuffSpec, DamageProfile, DamageSpec, Trigger, WeaponClass, WeaponSpec,
    };
    use crate::ledger::{BuffOptions, Modifier};

    fn definition() -> CombatantDefinition {
        CombatantDefinition::new(
            "alice",
            CombatantClass::Attacker,
            BurstStage::Three,
            WeaponSpec::standard("rifle", WeaponClass::Ar),
        )
    }

    fn strike(name: &str, trigger: Trigger) -> SkillDefinition {
        SkillDefinition::new(
            name,
            trigger,
            Effect::Damage(DamageSpec {
                multiplier: 1.0,
                loops: 1,
                profile: DamageProfile::default(),
                scale_by_stack: None,
            }),
        )
    }

    #[test]
    fn duplicate_skills_are_collapsed_by_name_and_trigger() {
        let def = definition()
            .with_skill(strike("a", Trigger::ShotCount(5)))
            .with_skill(strike("a", Trigger::ShotCount(10)))
            .with_skill(strike("a", Trigger::OnStart))
            .with_skill(SkillDefinition::new(
                "b",
                Trigger::OnStart,
                Effect::Buff(BuffSpec::new(Modifier::AtkBuffRate, 0.1, 1.0)),
            ));
        let combatant = Combatant::new(CombatantId(0), def, &SimConfig::new());

        assert_eq!(combatant.skills.len(), 3);
        assert_eq!(combatant.skills[0].def.trigger, Trigger::ShotCount(5));
        assert!(combatant.breakdown().contains_key("a"));
        assert!(!combatant.breakdown().contains_key("b"));
        assert_eq!(combatant.breakdown()[WEAPON_ATTACK], 0.0);
    }

    #[test]
    fn burst_cooldown_uses_stage_default() {
        let mut combatant = Combatant::new(CombatantId(0), definition(), &SimConfig::new());
        assert!(combatant.burst_ready(0));
        combatant.reset_burst_cooldown();
        assert_eq!(combatant.cooldown(), 40 * 60);

        combatant.reduce_cooldown(100);
        combatant.tick_cooldown();
        assert_eq!(combatant.cooldown(), 40 * 60 - 101);

        combatant.reduce_cooldown(10_000);
        assert_eq!(combatant.cooldown(), 0);
    }

    #[test]
    fn stun_tag_blocks_burst() {
        let mut combatant = Combatant::new(CombatantId(0), definition(), &SimConfig::new());
        combatant.ledger_mut().add_modifier(
            Modifier::Counter,
            0.0,
            60,
            0,
            BuffOptions::new().tag(STUN_TAG),
        );
        assert!(combatant.is_stunned(30));
        assert!(!combatant.burst_ready(30));
        assert!(combatant.burst_ready(61));
    }

    #[test]
    fn hp_ratio_follows_max_hp_buffs() {
        let mut combatant = Combatant::new(CombatantId(0), definition(), &SimConfig::new());
        assert_eq!(combatant.hp_ratio(0), 1.0);
        combatant
            .ledger_mut()
            .add_modifier(Modifier::MaxHpRate, 1.0, 60, 0, BuffOptions::new());
        assert_eq!(combatant.hp_ratio(0), 0.5);
    }
}
