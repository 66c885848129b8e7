//! Immutable definitions consumed by the engine.
//!
//! These are produced by content loaders (or built directly in tests) and
//! never mutated during a run.
mod character;
mod identity;
mod profile;
mod skill;
mod weapon;

pub use character::CombatantDefinition;
pub use identity::{BurstStage, CombatantClass, Element};
pub use profile::{DamageProfile, ProfileFlags};
pub use skill::{
    AttackBasis, BuffSpec, Condition, DamageSpec, DotSpec, Effect, HealAmount, HealSpec, Owner,
    RankOrder, Ranking, SkillDefinition, StackBuffSpec, StackCounterSpec, StackOp, StackScaling,
    StackSide, StageMode, TargetScope, TargetSelector, Trigger, TriggerKind, WeaponSwapSpec,
};
pub use weapon::{FireMode, SpeedLocks, WarmupRow, WarmupTable, WeaponClass, WeaponSpec};
