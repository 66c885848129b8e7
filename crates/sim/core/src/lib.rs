//! Deterministic frame-by-frame damage projection for a cooperative squad.
//!
//! `sim-core` simulates each combatant's weapon cycle, the shared burst
//! sequencer and the timed buff economy over a fixed horizon, and reports the
//! damage each combatant dealt. All state mutation flows through
//! [`engine::Simulation`]; randomness is injected through [`rng::RngOracle`]
//! so that runs are reproducible.
//!
//! # Frame order
//!
//! ```text
//! burst sequencer → cooldowns → scheduled actions →
//!     per combatant: swap expiry → max ammo → DoT/HoT → time triggers → weapon
//! → trace sampling
//! ```
pub mod burst;
pub mod combatant;
pub mod config;
pub mod damage;
pub mod definition;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod rng;
pub mod skill;
pub mod weapon;

/// Simulation time, measured in frames since the start of the run.
///
/// Signed so that "never" sentinels and subtraction near zero stay simple.
pub type Frame = i64;

pub use burst::{BurstPhase, BurstSequencer, BurstStep};
pub use combatant::{Combatant, CombatantId, DotEntry, Enemy, HitCounters, HotEntry, WEAPON_ATTACK};
pub use config::{EnemyConfig, SimConfig};
pub use damage::{Attacker, DamageLayers, HitOutcome, TargetView, compute_damage};
pub use definition::{
    BurstStage, CombatantClass, CombatantDefinition, Condition, DamageProfile, Effect, Element,
    FireMode, ProfileFlags, SkillDefinition, TargetScope, TargetSelector, Trigger, TriggerKind,
    WarmupTable, WeaponClass, WeaponSpec,
};
pub use engine::{
    AmmoSample, BurstRotation, CombatantReport, CooldownSample, Simulation, SimulationReport,
};
pub use error::{ErrorSeverity, SimError};
pub use events::{EventLog, EventRecord, Recipient, SimEvent};
pub use ledger::{BuffLedger, BuffOptions, Modifier};
pub use rng::{PcgRng, RngOracle, SequenceRng};
pub use skill::{Schedule, ScheduledAction, Signal};
pub use weapon::{ActionState, Loadout, MachineEvent, WeaponMachine};
