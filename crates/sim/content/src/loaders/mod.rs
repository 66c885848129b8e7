//! Content loaders for reading simulation data from files.
//!
//! Loaders parse the formats in [`crate::formats`] and resolve them into
//! `sim-core` definitions.

pub mod character;
pub mod factory;
pub mod scenario;
pub mod weapon;

pub use character::CharacterLoader;
pub use factory::ContentFactory;
pub use scenario::{Scenario, ScenarioLoader};
pub use weapon::WeaponLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Resolves `relative` against the directory holding `file`.
pub(crate) fn sibling_path(file: &Path, relative: &Path) -> std::path::PathBuf {
    match file.parent() {
        Some(dir) => dir.join(relative),
        None => relative.to_path_buf(),
    }
}
