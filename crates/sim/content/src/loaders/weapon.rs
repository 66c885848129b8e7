//! Weapon file loader.

use std::path::Path;

use sim_core::definition::WeaponSpec;

use crate::formats::RawWeapon;
use crate::loaders::{LoadResult, read_file};

/// Loader for single weapons from RON files.
pub struct WeaponLoader;

impl WeaponLoader {
    /// Load a weapon from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a [`RawWeapon`]
    ///
    /// # Returns
    ///
    /// Returns the weapon with class defaults filled in.
    pub fn load(path: &Path) -> LoadResult<WeaponSpec> {
        let content = read_file(path)?;
        let raw: RawWeapon = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse weapon RON {}: {}", path.display(), e))?;

        raw.resolve()
            .map_err(|e| anyhow::anyhow!("Invalid weapon {}: {}", path.display(), e))
    }
}
