//! Serde formats for content files.
//!
//! Raw types mirror what designers write; each has a `resolve` step that
//! validates it and produces the matching `sim-core` definition.

pub mod character;
pub mod scenario;
pub mod skill;
pub mod weapon;

pub use character::RawCharacter;
pub use scenario::{RawScenario, RosterEntry};
pub use skill::{RawBuff, RawEffect, RawProfile, RawSkill, parse_trigger};
pub use weapon::{RawWeapon, WeaponSource, parse_weapon_class};
