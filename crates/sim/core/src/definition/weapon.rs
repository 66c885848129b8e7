//! Immutable weapon constants.
//!
//! A [`WeaponSpec`] is loaded once per combatant and may be temporarily
//! replaced by a skill-driven swap (see [`crate::weapon::Loadout`]).

use bitflags::bitflags;
use strum::{Display, EnumString};

/// Weapon family. Determines the firing cycle and default geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponClass {
    #[default]
    #[strum(serialize = "AR")]
    Ar,
    #[strum(serialize = "SMG")]
    Smg,
    #[strum(serialize = "SG")]
    Sg,
    #[strum(serialize = "SR")]
    Sr,
    #[strum(serialize = "RL")]
    Rl,
    #[strum(serialize = "MG")]
    Mg,
}

impl WeaponClass {
    pub const fn fire_mode(self) -> FireMode {
        match self {
            Self::Sr | Self::Rl => FireMode::Charge,
            Self::Mg => FireMode::Sustained,
            Self::Ar | Self::Smg | Self::Sg => FireMode::Rapid,
        }
    }

    /// Spread radius used for hit and core probabilities.
    pub const fn default_hit_size(self) -> f64 {
        match self {
            Self::Rl | Self::Sr | Self::Mg => 1.0,
            Self::Smg => 9.0,
            Self::Ar => 6.0,
            Self::Sg => 20.0,
        }
    }

    pub const fn default_pellets(self) -> u32 {
        match self {
            Self::Sg => 10,
            _ => 1,
        }
    }

    /// Charge time in seconds for charge-type weapons.
    pub const fn default_charge_seconds(self) -> f64 {
        match self.fire_mode() {
            FireMode::Charge => 1.0,
            _ => 0.0,
        }
    }
}

/// Firing cycle category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FireMode {
    /// Fixed interval between shots until the magazine is empty.
    Rapid,
    /// Windup, charge, a single shot, winddown.
    Charge,
    /// Fixed windup, then an interval driven by the warmup level.
    Sustained,
}

bitflags! {
    /// Frame categories that ignore speed modifiers for a weapon.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpeedLocks: u8 {
        const ATTACK = 1 << 0;
        const CHARGE = 1 << 1;
        const RELOAD = 1 << 2;
    }
}

/// One row of a warmup table: `shots` consecutive shots at `interval` frames.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarmupRow {
    pub shots: u32,
    pub interval: u32,
}

/// Warmup level → fire interval lookup for sustained-fire weapons.
///
/// Row `i` starts at the warmup level `Σ shots_j × interval_j` for `j < i`.
/// Each shot raises the warmup level by the interval it was fired at, so a
/// weapon fired continuously from zero spends exactly `shots` shots in each
/// row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarmupTable {
    rows: Vec<WarmupRow>,
    starts: Vec<f64>,
}

impl WarmupTable {
    pub fn new(rows: Vec<WarmupRow>) -> Self {
        let mut starts = Vec::with_capacity(rows.len());
        let mut acc = 0.0;
        for row in &rows {
            starts.push(acc);
            acc += f64::from(row.shots) * f64::from(row.interval);
        }
        Self { rows, starts }
    }

    pub fn from_pairs(pairs: &[[u32; 2]]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&[shots, interval]| WarmupRow { shots, interval })
                .collect(),
        )
    }

    /// Interval of the last row whose start is at or below `level`.
    /// Floors at one frame; an empty table always yields one.
    pub fn interval_at(&self, level: f64) -> u32 {
        self.rows
            .iter()
            .zip(&self.starts)
            .rev()
            .find(|&(_, &start)| level >= start)
            .map(|(row, _)| row.interval.max(1))
            .unwrap_or(1)
    }

    /// Start level of the final row; warmup never needs to exceed it.
    pub fn saturation_level(&self) -> f64 {
        self.starts.last().copied().unwrap_or(0.0)
    }

    pub fn rows(&self) -> &[WarmupRow] {
        &self.rows
    }
}

impl Default for WarmupTable {
    fn default() -> Self {
        Self::from_pairs(&[[10, 6], [10, 5], [15, 2], [9999, 1]])
    }
}

/// Per-weapon constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponSpec {
    pub name: String,
    pub class: WeaponClass,
    pub multiplier: f64,
    pub max_ammo: u32,
    pub fire_interval: u32,
    pub windup_frames: u32,
    pub winddown_frames: u32,
    pub reload_frames: u32,
    /// Charge time in seconds; converted with the run's frame rate.
    pub charge_seconds: f64,
    pub charge_multiplier: f64,
    pub hit_size: f64,
    pub pellets: u32,
    pub is_pierce: bool,
    /// Shots always count as fired inside the full-burst window.
    pub force_full_burst: bool,
    pub warmup: WarmupTable,
    pub speed_locks: SpeedLocks,
    /// On revert from a swap that specified its own ammo, refill to max.
    pub reset_ammo_on_revert: bool,
}

impl WeaponSpec {
    pub const DEFAULT_MAX_AMMO: u32 = 60;
    pub const DEFAULT_RELOAD_FRAMES: u32 = 60;
    pub const DEFAULT_WINDUP_FRAMES: u32 = 12;
    pub const DEFAULT_WINDDOWN_FRAMES: u32 = 10;
    pub const DEFAULT_FIRE_INTERVAL: u32 = 5;

    /// Standard weapon of the given class with all defaults applied.
    pub fn standard(name: impl Into<String>, class: WeaponClass) -> Self {
        Self {
            name: name.into(),
            class,
            multiplier: 1.0,
            max_ammo: Self::DEFAULT_MAX_AMMO,
            fire_interval: Self::DEFAULT_FIRE_INTERVAL,
            windup_frames: Self::DEFAULT_WINDUP_FRAMES,
            winddown_frames: Self::DEFAULT_WINDDOWN_FRAMES,
            reload_frames: Self::DEFAULT_RELOAD_FRAMES,
            charge_seconds: class.default_charge_seconds(),
            charge_multiplier: 1.0,
            hit_size: class.default_hit_size(),
            pellets: class.default_pellets(),
            is_pierce: false,
            force_full_burst: false,
            warmup: WarmupTable::default(),
            speed_locks: SpeedLocks::empty(),
            reset_ammo_on_revert: true,
        }
    }

    pub fn fire_mode(&self) -> FireMode {
        self.class.fire_mode()
    }

    /// Highest warmup level the weapon can hold.
    pub fn max_warmup(&self) -> f64 {
        f64::from(self.windup_frames) + self.warmup.saturation_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_rows_start_at_cumulative_frames() {
        let table = WarmupTable::default();
        assert_eq!(table.interval_at(0.0), 6);
        assert_eq!(table.interval_at(59.9), 6);
        assert_eq!(table.interval_at(60.0), 5);
        assert_eq!(table.interval_at(110.0), 2);
        assert_eq!(table.interval_at(140.0), 1);
        assert_eq!(table.saturation_level(), 140.0);
    }

    #[test]
    fn empty_table_floors_at_one_frame() {
        let table = WarmupTable::new(Vec::new());
        assert_eq!(table.interval_at(0.0), 1);
        assert_eq!(table.saturation_level(), 0.0);
    }

    #[test]
    fn class_defaults() {
        let sg = WeaponSpec::standard("shotgun", WeaponClass::Sg);
        assert_eq!(sg.pellets, 10);
        assert_eq!(sg.hit_size, 20.0);
        assert_eq!(sg.fire_mode(), FireMode::Rapid);

        let sr = WeaponSpec::standard("rifle", WeaponClass::Sr);
        assert_eq!(sr.fire_mode(), FireMode::Charge);
        assert_eq!(sr.charge_seconds, 1.0);

        let mg = WeaponSpec::standard("mg", WeaponClass::Mg);
        assert_eq!(mg.max_warmup(), 152.0);
    }
}
