//! Data-driven simulation content and loaders.
//!
//! This crate turns designer-authored files into `sim-core` definitions:
//! - Characters and weapons (RON)
//! - Scenarios: run configuration, enemy and roster (TOML)
//!
//! Numeric skill parameters may be given per skill level; they are resolved
//! once at load time, so the engine never sees levels.

pub mod error;
pub mod level;

#[cfg(feature = "serde")]
pub mod formats;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use error::ContentError;
pub use level::{Leveled, SkillLevel};

#[cfg(feature = "loaders")]
pub use loaders::{
    CharacterLoader, ContentFactory, LoadResult, Scenario, ScenarioLoader, WeaponLoader,
};
