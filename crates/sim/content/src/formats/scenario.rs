//! Raw scenario format.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sim_core::config::{EnemyConfig, SimConfig};

/// A scenario TOML file.
///
/// ```toml
/// burst_rotation = [["Liter"], ["Centi"], ["Rapi", "Modernia"]]
///
/// [simulation]
/// duration_seconds = 180
/// seed = 7
///
/// [enemy]
/// element = "Wind"
/// defense = 140.0
///
/// [[roster]]
/// character = "characters/rapi.ron"
/// level = 10
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawScenario {
    pub simulation: SimConfig,
    pub enemy: EnemyConfig,
    pub roster: Vec<RosterEntry>,
    /// Combatant names per burst stage. Omitted means every combatant fills
    /// its declared stage in roster order.
    pub burst_rotation: Option<[Vec<String>; 3]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Character file, relative to the scenario file.
    pub character: PathBuf,
    #[serde(default = "max_level")]
    pub level: u8,
}

fn max_level() -> u8 {
    crate::level::SkillLevel::MAX
}
