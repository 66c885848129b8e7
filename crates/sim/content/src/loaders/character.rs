//! Character file loader.

use std::path::Path;

use sim_core::definition::{CombatantDefinition, WeaponSpec};

use crate::formats::{RawCharacter, WeaponSource, parse_weapon_class};
use crate::level::SkillLevel;
use crate::loaders::{LoadResult, WeaponLoader, read_file, sibling_path};

/// Loader for characters from RON files.
pub struct CharacterLoader;

impl CharacterLoader {
    /// Load a character and resolve every skill at `level`.
    ///
    /// # Weapon Resolution
    ///
    /// - `Standard(class)`: class defaults
    /// - `File(path)`: a weapon RON file, relative to the character file
    /// - `Inline(weapon)`: defined in place
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a [`RawCharacter`]
    /// * `level` - Skill level applied to every level-indexed value
    ///
    /// # Returns
    ///
    /// Returns a validated CombatantDefinition.
    pub fn load(path: &Path, level: SkillLevel) -> LoadResult<CombatantDefinition> {
        let content = read_file(path)?;
        let raw: RawCharacter = ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse character RON {}: {}", path.display(), e)
        })?;

        let weapon = Self::resolve_weapon(path, &raw)?;
        raw.resolve(weapon, level).map_err(|e| {
            anyhow::anyhow!(
                "Invalid character '{}' in {}: {}",
                raw.name,
                path.display(),
                e
            )
        })
    }

    fn resolve_weapon(path: &Path, raw: &RawCharacter) -> LoadResult<WeaponSpec> {
        let weapon = match &raw.weapon {
            WeaponSource::Standard(class) => {
                let class = parse_weapon_class(class)?;
                WeaponSpec::standard(format!("{}'s {}", raw.name, class), class)
            }
            WeaponSource::File(relative) => {
                WeaponLoader::load(&sibling_path(path, Path::new(relative)))?
            }
            WeaponSource::Inline(weapon) => weapon.resolve()?,
        };
        Ok(weapon)
    }
}
