//! Identity attributes of a combatant: element, class and burst stage.

use strum::{Display, EnumString};

/// Elemental affinity of a combatant or of the enemy.
///
/// Advantage cycle: Iron → Electric → Water → Fire → Wind → Iron.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Iron,
    Electric,
    Water,
    Fire,
    Wind,
    #[default]
    None,
}

impl Element {
    /// The element this one has advantage over, if any.
    pub const fn advantage_over(self) -> Option<Element> {
        match self {
            Self::Iron => Some(Self::Electric),
            Self::Electric => Some(Self::Water),
            Self::Water => Some(Self::Fire),
            Self::Fire => Some(Self::Wind),
            Self::Wind => Some(Self::Iron),
            Self::None => None,
        }
    }

    pub fn beats(self, other: Element) -> bool {
        self.advantage_over() == Some(other)
    }
}

/// Combat role. Determines default base stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantClass {
    #[default]
    Attacker,
    Supporter,
    Defender,
}

impl CombatantClass {
    /// Default `(attack, hp)` when a definition does not override them.
    pub const fn base_stats(self) -> (f64, f64) {
        match self {
            Self::Attacker => (25_554.0, 583_734.0),
            Self::Supporter => (21_307.0, 647_453.0),
            Self::Defender => (17_059.0, 711_171.0),
        }
    }
}

/// Which slot of the burst chain a combatant can fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BurstStage {
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
}

impl BurstStage {
    pub const ALL: [BurstStage; 3] = [Self::One, Self::Two, Self::Three];

    /// Zero-based position in the chain.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }

    pub const fn next(self) -> Option<BurstStage> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }

    /// Burst skill cooldown in seconds when the skill does not declare one.
    pub const fn default_cooldown_seconds(self) -> f64 {
        match self {
            Self::One | Self::Two => 20.0,
            Self::Three => 40.0,
        }
    }
}

impl TryFrom<u8> for BurstStage {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn advantage_cycle_is_closed() {
        let mut element = Element::Iron;
        for _ in 0..5 {
            let next = element.advantage_over().expect("cycle member");
            assert!(element.beats(next));
            assert!(!next.beats(element));
            element = next;
        }
        assert_eq!(element, Element::Iron);
        assert!(!Element::None.beats(Element::Iron));
    }

    #[test]
    fn parses_names() {
        assert_eq!(Element::from_str("Water"), Ok(Element::Water));
        assert_eq!(
            CombatantClass::from_str("Defender"),
            Ok(CombatantClass::Defender)
        );
        assert_eq!(BurstStage::try_from(3), Ok(BurstStage::Three));
        assert_eq!(BurstStage::try_from(4), Err(4));
    }
}
