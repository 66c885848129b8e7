//! Scenario loader.

use std::path::Path;

use anyhow::Context;
use sim_core::config::{EnemyConfig, SimConfig};
use sim_core::definition::CombatantDefinition;
use sim_core::engine::{BurstRotation, Simulation};
use sim_core::error::SimError;

use crate::formats::RawScenario;
use crate::level::SkillLevel;
use crate::loaders::{CharacterLoader, LoadResult, read_file, sibling_path};

/// Everything needed to assemble a [`Simulation`].
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub config: SimConfig,
    pub enemy: EnemyConfig,
    pub roster: Vec<CombatantDefinition>,
    pub rotation: BurstRotation,
}

impl Scenario {
    /// Builds a simulation seeded from `config.seed`.
    pub fn into_simulation(self) -> Result<Simulation, SimError> {
        Simulation::seeded(self.config, self.enemy, self.roster, self.rotation)
    }
}

/// Loader for scenarios from TOML files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario and every character it lists.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file; character paths are relative to it
    ///
    /// # Returns
    ///
    /// Returns a Scenario ready to run.
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let raw: RawScenario = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML {}: {}", path.display(), e))?;

        let mut roster = Vec::with_capacity(raw.roster.len());
        for entry in &raw.roster {
            let level = SkillLevel::new(entry.level).with_context(|| {
                format!("Invalid level for {}", entry.character.display())
            })?;
            let character = sibling_path(path, &entry.character);
            roster.push(CharacterLoader::load(&character, level)?);
        }

        Ok(Scenario {
            config: raw.simulation,
            enemy: raw.enemy,
            roster,
            rotation: raw
                .burst_rotation
                .map_or(BurstRotation::ByStage, BurstRotation::Explicit),
        })
    }
}
