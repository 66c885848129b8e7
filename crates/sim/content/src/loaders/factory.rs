//! Content factory for loading definitions from a data directory.

use std::path::{Path, PathBuf};

use sim_core::definition::{CombatantDefinition, WeaponSpec};

use crate::level::SkillLevel;
use crate::loaders::{CharacterLoader, LoadResult, Scenario, ScenarioLoader, WeaponLoader};

/// Content factory that loads content by name from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── characters/
/// │   ├── rapi.ron
/// │   └── liter.ron
/// ├── weapons/
/// │   └── sr_standard.ron
/// └── scenarios/
///     └── solo_boss.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load `characters/{name}.ron` at the given skill level.
    pub fn load_character(&self, name: &str, level: SkillLevel) -> LoadResult<CombatantDefinition> {
        let path = self.data_dir.join("characters").join(format!("{name}.ron"));
        CharacterLoader::load(&path, level)
    }

    /// Load `weapons/{name}.ron`.
    pub fn load_weapon(&self, name: &str) -> LoadResult<WeaponSpec> {
        let path = self.data_dir.join("weapons").join(format!("{name}.ron"));
        WeaponLoader::load(&path)
    }

    /// Load `scenarios/{name}.toml`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{name}.toml"));
        ScenarioLoader::load(&path)
    }
}
