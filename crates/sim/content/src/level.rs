//! Skill levels and level-indexed values.

use crate::error::ContentError;

/// A validated skill level in `1..=10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Result<Self, ContentError> {
        if level >= Self::MIN && level <= Self::MAX {
            Ok(Self(level))
        } else {
            Err(ContentError::LevelOutOfRange(level))
        }
    }

    pub const fn max() -> Self {
        Self(Self::MAX)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into a full level table.
    const fn index(self) -> usize {
        (self.0 - Self::MIN) as usize
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        Self::max()
    }
}

impl TryFrom<u8> for SkillLevel {
    type Error = ContentError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

/// A numeric skill parameter: either one value for every level or a table
/// with one entry per level.
///
/// ```text
/// value: 0.25
/// value: [0.10, 0.12, 0.14, 0.16, 0.18, 0.20, 0.22, 0.24, 0.26, 0.30]
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Leveled {
    Flat(f64),
    Table(Vec<f64>),
}

impl Leveled {
    /// The value at `level`. A single-entry table behaves like a flat value.
    pub fn at(&self, level: SkillLevel) -> Result<f64, ContentError> {
        match self {
            Self::Flat(value) => Ok(*value),
            Self::Table(values) => match values.as_slice() {
                [value] => Ok(*value),
                values if values.len() == usize::from(SkillLevel::MAX) => {
                    Ok(values[level.index()])
                }
                values => Err(ContentError::BadTableLength(values.len())),
            },
        }
    }
}

impl Default for Leveled {
    fn default() -> Self {
        Self::Flat(0.0)
    }
}

impl From<f64> for Leveled {
    fn from(value: f64) -> Self {
        Self::Flat(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u8) -> SkillLevel {
        SkillLevel::new(n).expect("valid level")
    }

    #[test]
    fn levels_are_bounded() {
        assert_eq!(SkillLevel::new(0), Err(ContentError::LevelOutOfRange(0)));
        assert_eq!(SkillLevel::new(11), Err(ContentError::LevelOutOfRange(11)));
        assert_eq!(SkillLevel::try_from(10).map(SkillLevel::get), Ok(10));
        assert_eq!(SkillLevel::default().get(), 10);
    }

    #[test]
    fn tables_index_by_level() {
        let table = Leveled::Table((1..=10).map(f64::from).collect());
        assert_eq!(table.at(level(1)), Ok(1.0));
        assert_eq!(table.at(level(7)), Ok(7.0));
        assert_eq!(table.at(level(10)), Ok(10.0));
    }

    #[test]
    fn flat_and_single_entry_values_ignore_level() {
        assert_eq!(Leveled::Flat(0.3).at(level(2)), Ok(0.3));
        assert_eq!(Leveled::Table(vec![0.4]).at(level(9)), Ok(0.4));
    }

    #[test]
    fn rejects_partial_tables() {
        let table = Leveled::Table(vec![1.0, 2.0, 3.0]);
        assert_eq!(table.at(level(1)), Err(ContentError::BadTableLength(3)));
        assert_eq!(
            Leveled::Table(Vec::new()).at(level(1)),
            Err(ContentError::BadTableLength(0))
        );
    }
}
