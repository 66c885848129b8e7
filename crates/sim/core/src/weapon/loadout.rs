//! Base weapon plus an optional temporary swap.

use crate::Frame;
use crate::definition::WeaponSpec;

#[derive(Clone, Debug, PartialEq)]
struct ActiveSwap {
    weapon: WeaponSpec,
    ammo_specified: bool,
    revert_at: Option<Frame>,
}

/// The weapon a combatant is currently firing.
#[derive(Clone, Debug, PartialEq)]
pub struct Loadout {
    base: WeaponSpec,
    swap: Option<ActiveSwap>,
}

impl Loadout {
    pub fn new(base: WeaponSpec) -> Self {
        Self { base, swap: None }
    }

    pub fn current(&self) -> &WeaponSpec {
        self.swap.as_ref().map_or(&self.base, |s| &s.weapon)
    }

    pub fn base(&self) -> &WeaponSpec {
        &self.base
    }

    pub fn is_swapped(&self) -> bool {
        self.swap.is_some()
    }

    /// Whether the active swap's timer has run out.
    pub fn revert_due(&self, now: Frame) -> bool {
        self.swap
            .as_ref()
            .and_then(|s| s.revert_at)
            .is_some_and(|at| now >= at)
    }

    /// Equips `weapon`. Without a declared max ammo the weapon inherits the
    /// current weapon's base magazine.
    pub(super) fn equip(
        &mut self,
        mut weapon: WeaponSpec,
        max_ammo: Option<u32>,
        revert_at: Option<Frame>,
        permanent: bool,
    ) {
        weapon.max_ammo = max_ammo.unwrap_or(self.current().max_ammo);
        if permanent {
            self.base = weapon;
            self.swap = None;
        } else {
            self.swap = Some(ActiveSwap {
                weapon,
                ammo_specified: max_ammo.is_some(),
                revert_at,
            });
        }
    }

    /// Restores the base weapon. Returns whether the magazine should be
    /// refilled, or `None` if nothing was swapped.
    pub(super) fn unequip(&mut self) -> Option<bool> {
        self.swap
            .take()
            .map(|s| s.ammo_specified && s.weapon.reset_ammo_on_revert)
    }
}
