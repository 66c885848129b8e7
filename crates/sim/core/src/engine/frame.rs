//! Per-frame phases that run through the skill resolver.

use crate::burst::BurstPhase;
use crate::combatant::{CombatantId, DotEntry, WEAPON_ATTACK};
use crate::definition::{BurstStage, DamageProfile, FireMode};
use crate::events::SimEvent;
use crate::ledger::Modifier;
use crate::skill::{Signal, SkillResolver};
use crate::weapon::{ActionState, MachineEvent};

/// Breakdown and heal source for life drain.
const DRAIN_SOURCE: &str = "Drain";

impl SkillResolver<'_> {
    // ========================================================================
    // Burst
    // ========================================================================

    pub(super) fn enter_burst_stage(&mut self, stage: BurstStage) {
        self.record(|| SimEvent::BurstStageEntered { stage });
        self.broadcast(Signal::BurstStageEnter(stage));
    }

    /// Resolves the picked combatant's burst, then lets the sequencer move on.
    pub(super) fn activate_burst(&mut self, caster: CombatantId, stage: BurstStage) {
        self.roster[caster.index()].reset_burst_cooldown();
        self.record(|| SimEvent::BurstActivated {
            combatant: caster,
            stage,
        });
        self.resolve_burst_skill(caster);
        self.dispatch(caster, Signal::UsedBurst);

        match self.burst.finish_activation() {
            BurstPhase::Stage(next) => self.enter_burst_stage(next),
            BurstPhase::Full => {
                let frames = self.burst.window_frames();
                self.record(|| SimEvent::FullBurstStarted { frames });
                self.broadcast(Signal::FullBurstEnter);
            }
            BurstPhase::Gen => {}
        }
    }

    pub(super) fn end_full_burst(&mut self, last_user: Option<CombatantId>) {
        if let Some(id) = last_user {
            self.roster[id.index()].last_burst_end = Some(self.now);
        }
        self.record(|| SimEvent::FullBurstEnded);
        self.broadcast(Signal::BurstEnd);
    }

    // ========================================================================
    // Combatant
    // ========================================================================

    /// One frame of a single combatant: swap expiry, max ammo, periodic
    /// effects, time triggers and the weapon.
    pub(super) fn tick_combatant(&mut self, id: CombatantId) {
        let now = self.now;
        let fps = self.config.fps;

        let reverted = {
            let c = &mut self.roster[id.index()];
            c.machine.loadout().revert_due(now) && c.machine.revert(&mut c.ledger, now)
        };
        if reverted {
            self.record_revert(id);
        }
        {
            let c = &mut self.roster[id.index()];
            c.machine.recompute_max_ammo(&mut c.ledger, now);
        }

        if now % self.config.periodic_tick_frames() == 0 {
            self.tick_periodic(id);
        }
        self.dispatch(id, Signal::Tick { now });

        if self.roster[id.index()].is_stunned(now) {
            return;
        }
        let event = {
            let c = &mut self.roster[id.index()];
            c.machine.advance(&mut c.ledger, now, fps)
        };
        match event {
            MachineEvent::Idle => {}
            MachineEvent::Fire => self.resolve_shot(id),
            MachineEvent::ReloadStarted { frames } => {
                self.record(|| SimEvent::ReloadStarted {
                    combatant: id,
                    frames,
                });
            }
            MachineEvent::ReloadComplete => {
                self.record(|| SimEvent::ReloadComplete { combatant: id });
                self.dispatch(id, Signal::ReloadComplete);
            }
            MachineEvent::Reverted => self.record_revert(id),
        }
    }

    fn record_revert(&mut self, id: CombatantId) {
        let machine = &self.roster[id.index()].machine;
        let (ammo, max_ammo) = (machine.ammo(), machine.max_ammo());
        self.record(|| SimEvent::WeaponReverted {
            combatant: id,
            ammo,
            max_ammo,
        });
    }

    /// DoT and HoT ticks, plus the part-break trigger.
    fn tick_periodic(&mut self, id: CombatantId) {
        let now = self.now;

        let dots: Vec<(String, DotEntry)> = {
            let c = &mut self.roster[id.index()];
            c.dots.retain(|_, dot| now <= dot.expires_at);
            c.dots.iter().map(|(name, dot)| (name.clone(), *dot)).collect()
        };
        for (name, dot) in dots {
            let outcome = self.strike(id, &dot.profile, dot.tick_multiplier());
            self.roster[id.index()].record_damage(&name, outcome.damage);
            self.record(|| SimEvent::DotTick {
                combatant: id,
                name,
                stacks: dot.stacks,
                damage: outcome.damage,
            });
        }

        let hots: Vec<(String, f64)> = {
            let c = &mut self.roster[id.index()];
            c.hots.retain(|hot| now <= hot.expires_at);
            c.hots
                .iter()
                .map(|hot| (hot.source.clone(), hot.per_tick))
                .collect()
        };
        for (source, amount) in hots {
            self.heal(id, amount, &source, false);
        }

        if self.enemy.config().part_break_mode {
            self.dispatch(id, Signal::PartBreak);
        }
    }

    // ========================================================================
    // Shots
    // ========================================================================

    /// Rolls every pellet of the round just fired and emits the shot
    /// signals.
    fn resolve_shot(&mut self, id: CombatantId) {
        let now = self.now;
        let (pellets, multiplier, profile, charged) = {
            let c = &mut self.roster[id.index()];
            let add = c.ledger.total_value(&Modifier::PelletCountAdd, now);
            let fixed = c.ledger.total_value(&Modifier::PelletCountFixed, now);
            let weapon = c.machine.weapon();
            let pellets = if fixed > 0.0 {
                fixed
            } else {
                f64::from(weapon.pellets) + add
            };
            let pellets = pellets.max(1.0).trunc() as u32;
            let charged = weapon.fire_mode() == FireMode::Charge;
            let profile = DamageProfile::weapon(
                charged.then_some(weapon.charge_multiplier),
                weapon.is_pierce,
                weapon.force_full_burst,
            );
            (pellets, weapon.multiplier / f64::from(pellets), profile, charged)
        };

        let (mut damage, mut hits, mut crits, mut cores) = (0.0, 0u32, 0u32, 0u32);
        for _ in 0..pellets {
            let outcome = self.strike(id, &profile, multiplier);
            damage += outcome.damage;
            if outcome.damage > 0.0 {
                hits += 1;
            }
            crits += u32::from(outcome.is_crit);
            cores += u32::from(outcome.is_core);
        }

        let (counters, ammo, max_ammo) = {
            let c = &mut self.roster[id.index()];
            c.counters.shots += 1;
            c.counters.pellet_hits += u64::from(hits);
            c.counters.crit_hits += u64::from(crits);
            c.counters.core_hits += u64::from(cores);
            if charged {
                c.counters.full_charges += 1;
            }
            c.record_damage(WEAPON_ATTACK, damage);
            c.ledger.decrement_shot_life();
            (c.counters, c.machine.ammo(), c.machine.max_ammo())
        };
        self.record(|| SimEvent::ShotFired {
            combatant: id,
            pellets,
            damage,
            hits,
            crits,
            cores,
            ammo,
            max_ammo,
        });

        self.dispatch(id, Signal::Shot { total: counters.shots });
        let remaining = self.roster[id.index()].machine.ammo();
        self.dispatch(id, Signal::Ammo { remaining });
        self.dispatch(
            id,
            Signal::PelletHits {
                total: counters.pellet_hits,
                delta: u64::from(hits),
            },
        );
        self.dispatch(
            id,
            Signal::CritHits {
                total: counters.crit_hits,
                delta: u64::from(crits),
            },
        );
        self.dispatch(
            id,
            Signal::CoreHits {
                total: counters.core_hits,
                delta: u64::from(cores),
            },
        );
        if charged {
            self.dispatch(
                id,
                Signal::FullCharges {
                    total: counters.full_charges,
                },
            );
        }

        let drain = self.roster[id.index()]
            .ledger
            .total_value(&Modifier::Drain, now);
        if drain > 0.0 && damage > 0.0 {
            self.heal(id, damage * drain, DRAIN_SOURCE, false);
        }

        // A shot-triggered swap has already restarted the cycle.
        let c = &mut self.roster[id.index()];
        if c.machine.state() == ActionState::Shooting {
            c.machine.finish_shot(&mut c.ledger, now);
        }
    }
}
