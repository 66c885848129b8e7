//! Triggered skills: signal matching, conditions, targeting and effects.
//!
//! The engine turns everything that happens in a frame into a [`Signal`] and
//! hands it to [`SkillResolver::dispatch`], which activates the matching
//! skills of one combatant. Resolution is recursive: an effect may emit
//! further signals (a stack crossing a threshold, a received heal), bounded
//! by the once-per-frame guard and the stage depth limit.
mod condition;
mod effects;
mod heal;
mod resolver;
mod schedule;
mod target;
mod trigger;

pub use schedule::{Schedule, ScheduledAction};
pub use trigger::Signal;

pub(crate) use resolver::SkillResolver;

#[cfg(test)]
pub(crate) mod harness {
    //! Free-standing resolver state for unit tests.

    use crate::Frame;
    use crate::burst::BurstSequencer;
    use crate::combatant::{Combatant, CombatantId, Enemy, SkillSlot};
    use crate::config::{EnemyConfig, SimConfig};
    use crate::definition::{
        BurstStage, CombatantClass, CombatantDefinition, SkillDefinition, WeaponClass, WeaponSpec,
    };
    use crate::events::EventLog;
    use crate::rng::SequenceRng;

    use super::{Schedule, SkillResolver};

    pub const BASE_ATTACK: f64 = 100.0;
    pub const BASE_HP: f64 = 1_000.0;

    pub struct Harness {
        pub config: SimConfig,
        pub roster: Vec<Combatant>,
        pub enemy: Enemy,
        pub burst: BurstSequencer,
        pub schedule: Schedule,
        pub events: EventLog,
        pub rng: SequenceRng,
    }

    fn definition(index: usize, stage: BurstStage) -> CombatantDefinition {
        let mut def = CombatantDefinition::new(
            format!("c{index}"),
            CombatantClass::Attacker,
            stage,
            WeaponSpec::standard("rifle", WeaponClass::Ar),
        );
        def.base_attack = BASE_ATTACK;
        def.base_hp = BASE_HP;
        def
    }

    impl Harness {
        /// `count` identical stage-one combatants.
        pub fn new(count: usize) -> Self {
            Self::with_stages(&vec![BurstStage::One; count])
        }

        pub fn with_stages(stages: &[BurstStage]) -> Self {
            let config = SimConfig::new().with_events(true);
            let roster: Vec<Combatant> = stages
                .iter()
                .enumerate()
                .map(|(i, &stage)| Combatant::new(CombatantId(i), definition(i, stage), &config))
                .collect();
            let mut rotation: [Vec<CombatantId>; 3] = Default::default();
            for combatant in &roster {
                rotation[combatant.burst_stage().index()].push(combatant.id());
            }
            let burst = BurstSequencer::new(
                rotation,
                config.seconds_to_frames(config.burst_charge_seconds),
                config.seconds_to_frames(config.full_burst_seconds),
            );
            Self {
                config,
                roster,
                enemy: Enemy::new(EnemyConfig::default()),
                burst,
                schedule: Schedule::new(),
                events: EventLog::new(true),
                rng: SequenceRng::always(),
            }
        }

        /// Rebuilds member `index` from a customised definition.
        pub fn member(
            &self,
            index: usize,
            customise: impl FnOnce(CombatantDefinition) -> CombatantDefinition,
        ) -> Combatant {
            let def = customise(definition(index, self.roster[index].burst_stage()));
            Combatant::new(CombatantId(index), def, &self.config)
        }

        /// Attaches a triggered skill to `id`.
        pub fn give(&mut self, id: CombatantId, skill: SkillDefinition) {
            self.roster[id.index()].skills.push(SkillSlot::new(skill));
        }

        pub fn resolver(&mut self, now: Frame) -> SkillResolver<'_> {
            SkillResolver {
                config: &self.config,
                roster: &mut self.roster,
                enemy: &mut self.enemy,
                burst: &mut self.burst,
                schedule: &mut self.schedule,
                events: &mut self.events,
                rng: &mut self.rng,
                now,
            }
        }
    }
}
