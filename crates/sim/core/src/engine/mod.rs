//! Frame clock and run assembly.
//!
//! The [`Simulation`] owns every piece of mutable state and advances it one
//! frame at a time in a fixed order (see the crate docs). Each phase borrows
//! the state through a short-lived [`SkillResolver`], so triggered skills
//! observe the same view regardless of which phase fired them.

mod frame;
mod report;

pub use report::{AmmoSample, CombatantReport, CooldownSample, SimulationReport};

use std::collections::HashSet;

use crate::Frame;
use crate::burst::{BurstSequencer, BurstStep};
use crate::combatant::{Combatant, CombatantId, Enemy};
use crate::config::{EnemyConfig, SimConfig};
use crate::definition::{BurstStage, CombatantDefinition};
use crate::error::SimError;
use crate::events::{EventLog, EventRecord};
use crate::rng::{PcgRng, RngOracle};
use crate::skill::{Schedule, Signal, SkillResolver};

use report::Traces;

/// Who may fill each burst stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BurstRotation {
    /// Every combatant fills the stage it declares, in roster order.
    #[default]
    ByStage,
    /// Combatant names per stage, in rotation order.
    Explicit([Vec<String>; 3]),
}

pub struct Simulation {
    config: SimConfig,
    roster: Vec<Combatant>,
    enemy: Enemy,
    burst: BurstSequencer,
    schedule: Schedule,
    events: EventLog,
    rng: Box<dyn RngOracle>,
    frame: Frame,
    started: bool,
    traces: Vec<Traces>,
}

impl Simulation {
    /// Validates the definitions and assembles a run.
    pub fn new(
        config: SimConfig,
        enemy: EnemyConfig,
        definitions: Vec<CombatantDefinition>,
        rotation: BurstRotation,
        rng: Box<dyn RngOracle>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        validate_definitions(&definitions)?;
        let rotation = build_rotation(&definitions, &rotation)?;

        let roster: Vec<Combatant> = definitions
            .into_iter()
            .enumerate()
            .map(|(index, def)| Combatant::new(CombatantId(index), def, &config))
            .collect();
        let burst = BurstSequencer::new(
            rotation,
            config.seconds_to_frames(config.burst_charge_seconds),
            config.seconds_to_frames(config.full_burst_seconds),
        );

        Ok(Self {
            events: EventLog::new(config.record_events),
            traces: vec![Traces::default(); roster.len()],
            config,
            roster,
            enemy: Enemy::new(enemy),
            burst,
            schedule: Schedule::new(),
            rng,
            frame: 0,
            started: false,
        })
    }

    /// Like [`Simulation::new`], drawing from a [`PcgRng`] seeded with
    /// `config.seed` (zero when unset).
    pub fn seeded(
        config: SimConfig,
        enemy: EnemyConfig,
        definitions: Vec<CombatantDefinition>,
        rotation: BurstRotation,
    ) -> Result<Self, SimError> {
        let rng = Box::new(PcgRng::new(config.seed.unwrap_or_default()));
        Self::new(config, enemy, definitions, rotation, rng)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Last frame simulated; zero before the first step.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.roster
    }

    pub fn combatant(&self, name: &str) -> Option<&Combatant> {
        self.roster.iter().find(|c| c.name() == name)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, SimError> {
        self.roster
            .get_mut(id.index())
            .ok_or(SimError::CombatantOutOfRange(id.index()))
    }

    pub fn burst(&self) -> &BurstSequencer {
        &self.burst
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn enemy_mut(&mut self) -> &mut Enemy {
        &mut self.enemy
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Removes and returns the events recorded so far.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Fires start-of-battle triggers at frame zero. Idempotent; called
    /// implicitly by the first [`Simulation::step`].
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.resolver().broadcast(Signal::Start);
    }

    /// Advances one frame.
    pub fn step(&mut self) {
        self.start();
        self.frame += 1;

        self.tick_burst();
        for combatant in self.roster.iter_mut() {
            combatant.tick_cooldown();
        }
        for action in self.schedule.take_due(self.frame) {
            self.resolver().resolve(action.caster, &action.skill, 0);
        }
        for index in 0..self.roster.len() {
            self.resolver().tick_combatant(CombatantId(index));
        }
        self.sample_traces();
    }

    /// Runs to the configured horizon and reports.
    pub fn run(&mut self) -> SimulationReport {
        let total = self.config.total_frames();
        while self.frame < total {
            self.step();
        }
        self.report()
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport::collect(self.frame, self.config.fps, &self.roster, &self.traces)
    }

    fn resolver(&mut self) -> SkillResolver<'_> {
        SkillResolver {
            config: &self.config,
            roster: &mut self.roster,
            enemy: &mut self.enemy,
            burst: &mut self.burst,
            schedule: &mut self.schedule,
            events: &mut self.events,
            rng: &mut *self.rng,
            now: self.frame,
        }
    }

    fn tick_burst(&mut self) {
        let now = self.frame;
        let roster = &self.roster;
        let step = self.burst.tick(|id| roster[id.index()].burst_ready(now));

        let mut resolver = self.resolver();
        match step {
            BurstStep::Idle => {}
            BurstStep::Charged => resolver.enter_burst_stage(BurstStage::One),
            BurstStep::Activated { combatant, stage } => resolver.activate_burst(combatant, stage),
            BurstStep::FullBurstEnded { last_user } => resolver.end_full_burst(last_user),
        }
    }

    fn sample_traces(&mut self) {
        let interval = Frame::from(self.config.trace_interval_frames);
        if interval == 0 || self.frame % interval != 0 {
            return;
        }
        let fps = self.config.fps;
        for (combatant, traces) in self.roster.iter().zip(self.traces.iter_mut()) {
            traces.sample(self.frame, fps, combatant);
        }
    }
}

fn validate_definitions(definitions: &[CombatantDefinition]) -> Result<(), SimError> {
    if definitions.is_empty() {
        return Err(SimError::EmptyRoster);
    }
    let mut names = HashSet::new();
    for def in definitions {
        if !names.insert(def.name.as_str()) {
            return Err(SimError::DuplicateCombatant(def.name.clone()));
        }
        for skill in def.skills.iter().chain(def.burst_skill.iter()) {
            if skill.nesting_depth() > SimConfig::MAX_STAGE_DEPTH {
                return Err(SimError::StageDepthExceeded {
                    skill: skill.name.clone(),
                    limit: SimConfig::MAX_STAGE_DEPTH,
                });
            }
        }
    }
    Ok(())
}

fn build_rotation(
    definitions: &[CombatantDefinition],
    rotation: &BurstRotation,
) -> Result<[Vec<CombatantId>; 3], SimError> {
    let mut stages: [Vec<CombatantId>; 3] = Default::default();
    match rotation {
        BurstRotation::ByStage => {
            for (index, def) in definitions.iter().enumerate() {
                stages[def.burst_stage.index()].push(CombatantId(index));
            }
        }
        BurstRotation::Explicit(names) => {
            for (slot, stage_names) in stages.iter_mut().zip(names) {
                for name in stage_names {
                    let index = definitions
                        .iter()
                        .position(|def| &def.name == name)
                        .ok_or_else(|| SimError::UnknownCombatant(name.clone()))?;
                    slot.push(CombatantId(index));
                }
            }
        }
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{
        CombatantClass, Effect, SkillDefinition, StageMode, Trigger, WeaponClass, WeaponSpec,
    };
    use crate::rng::SequenceRng;

    fn member(name: &str, stage: BurstStage) -> CombatantDefinition {
        CombatantDefinition::new(
            name,
            CombatantClass::Attacker,
            stage,
            WeaponSpec::standard("rifle", WeaponClass::Ar),
        )
    }

    fn squad() -> Vec<CombatantDefinition> {
        vec![
            member("a", BurstStage::One),
            member("b", BurstStage::Two),
            member("c", BurstStage::Three),
        ]
    }

    fn build(definitions: Vec<CombatantDefinition>, rotation: BurstRotation) -> Result<Simulation, SimError> {
        Simulation::new(
            SimConfig::new().with_duration_seconds(10),
            EnemyConfig::default(),
            definitions,
            rotation,
            Box::new(SequenceRng::always()),
        )
    }

    #[test]
    fn rejects_invalid_rosters() {
        assert_eq!(build(vec![], BurstRotation::ByStage).err(), Some(SimError::EmptyRoster));

        let mut twins = squad();
        twins.push(member("a", BurstStage::One));
        assert_eq!(
            build(twins, BurstRotation::ByStage).err(),
            Some(SimError::DuplicateCombatant("a".into()))
        );

        let rotation = BurstRotation::Explicit([vec!["a".into()], vec!["zed".into()], vec![]]);
        assert_eq!(
            build(squad(), rotation).err(),
            Some(SimError::UnknownCombatant("zed".into()))
        );
    }

    #[test]
    fn rejects_deep_stage_trees() {
        let mut skill = SkillDefinition::new("leaf", Trigger::Manual, Effect::SetAmmo(1));
        for _ in 0..=SimConfig::MAX_STAGE_DEPTH {
            skill = SkillDefinition::new(
                "nest",
                Trigger::OnStart,
                Effect::Stages {
                    stages: vec![skill],
                    mode: StageMode::All,
                },
            );
        }
        let mut defs = squad();
        defs[0] = defs[0].clone().with_burst_skill(skill);
        assert!(matches!(
            build(defs, BurstRotation::ByStage),
            Err(SimError::StageDepthExceeded { .. })
        ));
    }

    #[test]
    fn explicit_rotation_orders_stage_members() {
        let mut defs = squad();
        defs.push(member("d", BurstStage::Three));
        let rotation = BurstRotation::Explicit([
            vec!["a".into()],
            vec!["b".into()],
            vec!["d".into(), "c".into()],
        ]);
        let sim = build(defs, rotation).unwrap();
        assert_eq!(
            sim.burst().rotation(BurstStage::Three),
            &[CombatantId(3), CombatantId(2)]
        );
    }

    #[test]
    fn run_reaches_horizon_and_reports_every_member() {
        let mut sim = build(squad(), BurstRotation::ByStage).unwrap();
        let report = sim.run();
        assert_eq!(sim.frame(), 600);
        assert_eq!(report.frames, 600);
        assert_eq!(report.combatants.len(), 3);
        assert!(report.total_damage > 0.0);
        // one sample per second
        assert_eq!(report.combatants[0].ammo_trace.len(), 10);
    }

    #[test]
    fn start_triggers_fire_once_at_frame_zero() {
        let mut defs = squad();
        defs[0] = defs[0].clone().with_skill(SkillDefinition::new(
            "open",
            Trigger::OnStart,
            Effect::ActivateFlag("opened".into()),
        ));
        let mut sim = build(defs, BurstRotation::ByStage).unwrap();
        sim.start();
        assert!(sim.combatants()[0].has_flag("opened"));
        sim.start();
        sim.step();
        assert_eq!(sim.frame(), 1);
    }
}
