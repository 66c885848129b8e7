//! Raw weapon format.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sim_core::definition::{SpeedLocks, WarmupTable, WeaponClass, WeaponSpec};

use crate::error::ContentError;

/// A weapon as written in a RON file. Unset fields take the class defaults
/// of [`WeaponSpec::standard`].
///
/// ```ron
/// (
///     name: "Sniper",
///     class: "SR",
///     multiplier: 8.64,
///     reload_frames: 90,
///     speed_locks: ["reload"],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeapon {
    pub name: String,
    pub class: String,
    pub multiplier: Option<f64>,
    pub max_ammo: Option<u32>,
    pub fire_interval: Option<u32>,
    pub windup_frames: Option<u32>,
    pub winddown_frames: Option<u32>,
    pub reload_frames: Option<u32>,
    pub charge_seconds: Option<f64>,
    pub charge_multiplier: Option<f64>,
    pub hit_size: Option<f64>,
    pub pellets: Option<u32>,
    pub is_pierce: bool,
    pub force_full_burst: bool,
    /// `[shots, interval]` rows.
    pub warmup: Option<Vec<[u32; 2]>>,
    /// Any of `"attack"`, `"charge"`, `"reload"`.
    pub speed_locks: Vec<String>,
    pub reset_ammo_on_revert: Option<bool>,
}

impl RawWeapon {
    pub fn resolve(&self) -> Result<WeaponSpec, ContentError> {
        let class = parse_weapon_class(&self.class)?;
        let name = if self.name.is_empty() {
            format!("{class} standard")
        } else {
            self.name.clone()
        };
        let mut spec = WeaponSpec::standard(name, class);

        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    spec.$field = value;
                })*
            };
        }
        overlay!(
            multiplier,
            max_ammo,
            fire_interval,
            windup_frames,
            winddown_frames,
            reload_frames,
            charge_seconds,
            charge_multiplier,
            hit_size,
            pellets,
            reset_ammo_on_revert,
        );
        spec.is_pierce = self.is_pierce;
        spec.force_full_burst = self.force_full_burst;
        if let Some(rows) = &self.warmup {
            spec.warmup = WarmupTable::from_pairs(rows);
        }
        spec.speed_locks = parse_speed_locks(&self.speed_locks)?;
        Ok(spec)
    }
}

/// Where a character's weapon comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WeaponSource {
    /// The class defaults, e.g. `Standard("AR")`.
    Standard(String),
    /// A weapon RON file, relative to the character file.
    File(String),
    Inline(RawWeapon),
}

pub fn parse_weapon_class(raw: &str) -> Result<WeaponClass, ContentError> {
    WeaponClass::from_str(&raw.to_ascii_uppercase())
        .map_err(|_| ContentError::UnknownWeaponClass(raw.to_string()))
}

fn parse_speed_locks(raw: &[String]) -> Result<SpeedLocks, ContentError> {
    raw.iter().try_fold(SpeedLocks::empty(), |locks, name| {
        let lock = match name.as_str() {
            "attack" => SpeedLocks::ATTACK,
            "charge" => SpeedLocks::CHARGE,
            "reload" => SpeedLocks::RELOAD,
            other => return Err(ContentError::UnknownSpeedLock(other.to_string())),
        };
        Ok(locks | lock)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_keep_class_defaults() {
        let raw = RawWeapon {
            class: "sg".into(),
            multiplier: Some(0.5),
            ..RawWeapon::default()
        };
        let spec = raw.resolve().expect("valid weapon");
        assert_eq!(spec.class, WeaponClass::Sg);
        assert_eq!(spec.name, "SG standard");
        assert_eq!(spec.multiplier, 0.5);
        assert_eq!(spec.pellets, 10);
        assert_eq!(spec.max_ammo, WeaponSpec::DEFAULT_MAX_AMMO);
    }

    #[test]
    fn parses_locks_and_warmup() {
        let raw = RawWeapon {
            class: "MG".into(),
            warmup: Some(vec![[5, 4], [100, 2]]),
            speed_locks: vec!["attack".into(), "reload".into()],
            ..RawWeapon::default()
        };
        let spec = raw.resolve().expect("valid weapon");
        assert_eq!(spec.warmup.interval_at(0.0), 4);
        assert_eq!(spec.warmup.interval_at(20.0), 2);
        assert_eq!(spec.speed_locks, SpeedLocks::ATTACK | SpeedLocks::RELOAD);
    }

    #[test]
    fn rejects_unknown_names() {
        let raw = RawWeapon {
            class: "bow".into(),
            ..RawWeapon::default()
        };
        assert_eq!(
            raw.resolve(),
            Err(ContentError::UnknownWeaponClass("bow".into()))
        );

        let raw = RawWeapon {
            class: "AR".into(),
            speed_locks: vec!["aim".into()],
            ..RawWeapon::default()
        };
        assert_eq!(raw.resolve(), Err(ContentError::UnknownSpeedLock("aim".into())));
    }
}
