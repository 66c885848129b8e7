//! Damage computation for weapon shots, skill hits and DoT ticks.
mod formula;
mod hit;

pub use formula::{
    Attacker, DamageLayers, HitOutcome, MIN_DAMAGE, TargetView, compute_damage, effective_attack,
    max_hp,
};
pub use hit::{HitChances, MIN_HIT_SIZE};
