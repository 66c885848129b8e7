//! Per-hit damage profile.

use bitflags::bitflags;

bitflags! {
    /// Properties of a single hit that select damage-formula terms.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProfileFlags: u16 {
        const WEAPON_ATTACK      = 1 << 0;
        const CHARGE_ATTACK      = 1 << 1;
        const PART_DAMAGE        = 1 << 2;
        const PIERCE             = 1 << 3;
        const IGNORE_DEFENSE     = 1 << 4;
        const DOT                = 1 << 5;
        const SPLIT              = 1 << 6;
        const RANGE_BONUS        = 1 << 7;
        const FORCE_FULL_BURST   = 1 << 8;
        const BURST_BUFF_ENABLED = 1 << 9;
        /// Non-weapon hits may roll for core.
        const CORE_HIT           = 1 << 10;
    }
}

impl Default for ProfileFlags {
    fn default() -> Self {
        Self::BURST_BUFF_ENABLED
    }
}

/// Flags plus the two numeric knobs of a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageProfile {
    pub flags: ProfileFlags,
    pub crit_rate: f64,
    pub charge_multiplier: f64,
}

impl DamageProfile {
    pub const BASE_CRIT_RATE: f64 = 0.15;

    pub fn new(flags: ProfileFlags) -> Self {
        Self {
            flags,
            crit_rate: Self::BASE_CRIT_RATE,
            charge_multiplier: 1.0,
        }
    }

    /// Profile of a regular weapon shot.
    pub fn weapon(charge_multiplier: Option<f64>, pierce: bool, force_full_burst: bool) -> Self {
        let mut flags = ProfileFlags::default() | ProfileFlags::WEAPON_ATTACK;
        flags.set(ProfileFlags::CHARGE_ATTACK, charge_multiplier.is_some());
        flags.set(ProfileFlags::PIERCE, pierce);
        flags.set(ProfileFlags::FORCE_FULL_BURST, force_full_burst);
        Self {
            flags,
            crit_rate: Self::BASE_CRIT_RATE,
            charge_multiplier: charge_multiplier.unwrap_or(1.0),
        }
    }

    pub fn has(&self, flag: ProfileFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether this hit gets the full-burst bonus terms.
    pub fn full_burst_applies(&self, full_burst_active: bool) -> bool {
        self.has(ProfileFlags::BURST_BUFF_ENABLED)
            && (full_burst_active || self.has(ProfileFlags::FORCE_FULL_BURST))
    }

    pub fn can_core_hit(&self) -> bool {
        self.flags
            .intersects(ProfileFlags::WEAPON_ATTACK | ProfileFlags::CORE_HIT)
    }
}

impl Default for DamageProfile {
    fn default() -> Self {
        Self::new(ProfileFlags::default())
    }
}
