//! End-of-run summary.

use std::collections::BTreeMap;

use crate::Frame;
use crate::combatant::{Combatant, HitCounters};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmmoSample {
    pub frame: Frame,
    pub ammo: u32,
    pub max_ammo: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownSample {
    pub frame: Frame,
    /// Remaining burst cooldown.
    pub seconds: f64,
}

/// Sampled time series for one combatant.
#[derive(Clone, Debug, Default)]
pub(super) struct Traces {
    ammo: Vec<AmmoSample>,
    cooldown: Vec<CooldownSample>,
}

impl Traces {
    pub fn sample(&mut self, frame: Frame, fps: u32, combatant: &Combatant) {
        self.ammo.push(AmmoSample {
            frame,
            ammo: combatant.machine().ammo(),
            max_ammo: combatant.machine().max_ammo(),
        });
        self.cooldown.push(CooldownSample {
            frame,
            seconds: combatant.cooldown() as f64 / f64::from(fps),
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantReport {
    pub name: String,
    pub total_damage: f64,
    pub dps: f64,
    /// Damage per source: weapon attack, skill names and DoT names.
    pub breakdown: BTreeMap<String, f64>,
    pub counters: HitCounters,
    pub ammo_trace: Vec<AmmoSample>,
    pub cooldown_trace: Vec<CooldownSample>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationReport {
    pub frames: Frame,
    pub seconds: f64,
    pub total_damage: f64,
    pub combatants: Vec<CombatantReport>,
}

impl SimulationReport {
    pub(super) fn collect(frames: Frame, fps: u32, roster: &[Combatant], traces: &[Traces]) -> Self {
        let seconds = frames as f64 / f64::from(fps);
        let per_second = |damage: f64| if seconds > 0.0 { damage / seconds } else { 0.0 };

        let combatants: Vec<CombatantReport> = roster
            .iter()
            .zip(traces)
            .map(|(c, trace)| CombatantReport {
                name: c.name().to_string(),
                total_damage: c.total_damage(),
                dps: per_second(c.total_damage()),
                breakdown: c.breakdown().clone(),
                counters: c.counters(),
                ammo_trace: trace.ammo.clone(),
                cooldown_trace: trace.cooldown.clone(),
            })
            .collect();

        Self {
            frames,
            seconds,
            total_damage: combatants.iter().map(|c| c.total_damage).sum(),
            combatants,
        }
    }

    pub fn combatant(&self, name: &str) -> Option<&CombatantReport> {
        self.combatants.iter().find(|c| c.name == name)
    }

    /// Squad damage per second.
    pub fn dps(&self) -> f64 {
        if self.seconds > 0.0 {
            self.total_damage / self.seconds
        } else {
            0.0
        }
    }
}
