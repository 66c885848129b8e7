//! Per-combatant firing cycle.
//!
//! ```text
//! Ready ──► (Charging) ──► Shooting ──► Winddown ──► Ready
//!                                           └──────► Reloading ──► Ready
//! ```
//!
//! Each state computes its duration once on entry from the weapon's base
//! frames and the owner's speed modifiers. [`WeaponMachine::advance`] moves
//! the machine by one frame and reports a [`MachineEvent`]; when it reports
//! [`MachineEvent::Fire`] the caller resolves the shot (damage, counters,
//! triggers) and then calls [`WeaponMachine::finish_shot`] so that any buffs
//! the shot's triggers applied are visible to the next interval.

use crate::Frame;
use crate::definition::{FireMode, WeaponSpec};
use crate::ledger::{BuffLedger, Modifier};

use super::cadence::{SpeedKind, buffed_frames, round_half_up};
use super::loadout::Loadout;

/// Frames for a fully heated sustained-fire weapon to cool to zero.
const WARMUP_DECAY_FRAMES: f64 = 68.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionState {
    #[default]
    Ready,
    Charging,
    Shooting,
    Winddown,
    Reloading,
}

/// Outcome of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineEvent {
    Idle,
    /// One round left the magazine; ammo is already decremented.
    Fire,
    ReloadStarted { frames: u32 },
    /// Magazine refilled and reload-scoped buffs cleared.
    ReloadComplete,
    /// A swapped weapon ran dry and the base weapon was restored.
    Reverted,
}

#[derive(Clone, Debug)]
pub struct WeaponMachine {
    loadout: Loadout,
    state: ActionState,
    timer: u32,
    duration: u32,
    warmup: f64,
    /// Sustained-fire interval looked up before the pending shot.
    pending_interval: u32,
    ammo: u32,
    max_ammo: u32,
}

impl WeaponMachine {
    pub fn new(weapon: WeaponSpec) -> Self {
        let max_ammo = weapon.max_ammo;
        Self {
            loadout: Loadout::new(weapon),
            state: ActionState::Ready,
            timer: 0,
            duration: 0,
            warmup: 0.0,
            pending_interval: 1,
            ammo: max_ammo,
            max_ammo,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn weapon(&self) -> &WeaponSpec {
        self.loadout.current()
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    pub fn warmup(&self) -> f64 {
        self.warmup
    }

    // ========================================================================
    // Ammo
    // ========================================================================

    /// `base + Σ round_half_up(base × rate) + Σ flat`, at least one round.
    /// Current ammo is clamped down to the new max.
    pub fn recompute_max_ammo(&mut self, ledger: &mut BuffLedger, now: Frame) {
        let base = f64::from(self.weapon().max_ammo);
        let added: f64 = ledger
            .active_values(&Modifier::MaxAmmoRate, now)
            .into_iter()
            .map(|rate| round_half_up(base * rate))
            .sum();
        let flat = ledger.total_value(&Modifier::MaxAmmoFixed, now);
        self.max_ammo = (base + added + flat).max(1.0) as u32;
        self.ammo = self.ammo.min(self.max_ammo);
    }

    /// Adds `round_half_up(max × rate)` rounds. Returns the rounds added.
    pub fn charge_ammo(&mut self, rate: f64) -> u32 {
        let amount = round_half_up(f64::from(self.max_ammo) * rate).max(0.0) as u32;
        let before = self.ammo;
        self.ammo = self.ammo.saturating_add(amount).min(self.max_ammo);
        self.ammo - before
    }

    pub fn set_ammo(&mut self, value: u32) {
        self.ammo = value.min(self.max_ammo);
    }

    fn rescale_ammo(&mut self, old_max: u32) {
        self.ammo = if old_max == 0 {
            self.max_ammo
        } else {
            let scaled = f64::from(self.ammo) * f64::from(self.max_ammo) / f64::from(old_max);
            (round_half_up(scaled) as u32).min(self.max_ammo)
        };
    }

    // ========================================================================
    // Swap
    // ========================================================================

    /// Equips a swap weapon and restarts the cycle from `Ready`.
    ///
    /// A declared max ammo refills the magazine to it; otherwise the ammo
    /// fraction of the previous magazine carries over.
    pub fn swap(
        &mut self,
        weapon: WeaponSpec,
        max_ammo: Option<u32>,
        revert_at: Option<Frame>,
        permanent: bool,
        ledger: &mut BuffLedger,
        now: Frame,
    ) {
        let old_max = self.max_ammo;
        self.loadout.equip(weapon, max_ammo, revert_at, permanent);
        self.recompute_max_ammo_unclamped(ledger, now);
        if max_ammo.is_some() {
            self.ammo = self.max_ammo;
        } else {
            self.rescale_ammo(old_max);
        }
        self.restart();
    }

    /// Restores the base weapon. Returns `false` if nothing was swapped.
    pub fn revert(&mut self, ledger: &mut BuffLedger, now: Frame) -> bool {
        let old_max = self.max_ammo;
        let Some(refill) = self.loadout.unequip() else {
            return false;
        };
        self.recompute_max_ammo_unclamped(ledger, now);
        if refill {
            self.ammo = self.max_ammo;
        } else {
            self.rescale_ammo(old_max);
        }
        self.restart();
        true
    }

    fn recompute_max_ammo_unclamped(&mut self, ledger: &mut BuffLedger, now: Frame) {
        let ammo = self.ammo;
        self.recompute_max_ammo(ledger, now);
        self.ammo = ammo;
    }

    fn restart(&mut self) {
        self.state = ActionState::Ready;
        self.timer = 0;
    }

    // ========================================================================
    // Frame advance
    // ========================================================================

    fn enter(&mut self, state: ActionState) {
        self.state = state;
        self.timer = 0;
    }

    /// Computes the state duration on the first frame and counts one frame.
    /// Returns whether the state is complete.
    fn tick_timed(&mut self, kind: SpeedKind, base: f64, ledger: &mut BuffLedger, now: Frame) -> bool {
        if self.timer == 0 {
            self.duration = buffed_frames(kind, base, self.weapon().speed_locks, ledger, now);
        }
        self.timer += 1;
        self.timer >= self.duration
    }

    /// Advances one frame.
    pub fn advance(&mut self, ledger: &mut BuffLedger, now: Frame, fps: u32) -> MachineEvent {
        let mode = self.weapon().fire_mode();
        let (windup, winddown, reload) = {
            let w = self.weapon();
            (
                f64::from(w.windup_frames),
                f64::from(w.winddown_frames),
                f64::from(w.reload_frames),
            )
        };

        if mode == FireMode::Sustained
            && !matches!(self.state, ActionState::Shooting | ActionState::Ready)
        {
            let decay = self.weapon().max_warmup() / WARMUP_DECAY_FRAMES;
            self.warmup = (self.warmup - decay).max(0.0);
        }

        match self.state {
            ActionState::Ready => {
                if mode == FireMode::Sustained {
                    self.warmup = (self.warmup + 1.0).min(self.weapon().max_warmup());
                }
                if self.tick_timed(SpeedKind::Attack, windup, ledger, now) {
                    match mode {
                        FireMode::Charge => self.enter(ActionState::Charging),
                        FireMode::Sustained => {
                            self.enter(ActionState::Shooting);
                            self.warmup = self.warmup.max(windup);
                        }
                        FireMode::Rapid => self.enter(ActionState::Shooting),
                    }
                }
                MachineEvent::Idle
            }
            ActionState::Charging => {
                let base = (self.weapon().charge_seconds * f64::from(fps)).max(1.0);
                if self.tick_timed(SpeedKind::Charge, base, ledger, now) {
                    self.enter(ActionState::Shooting);
                }
                MachineEvent::Idle
            }
            ActionState::Shooting => {
                if self.ammo == 0 {
                    self.enter(ActionState::Winddown);
                    return MachineEvent::Idle;
                }
                if mode != FireMode::Charge && self.timer > 0 {
                    self.timer -= 1;
                    return MachineEvent::Idle;
                }
                if mode == FireMode::Sustained {
                    self.pending_interval = self.sustained_interval(ledger, now);
                }
                self.ammo -= 1;
                MachineEvent::Fire
            }
            ActionState::Winddown => {
                if !self.tick_timed(SpeedKind::Attack, winddown, ledger, now) {
                    return MachineEvent::Idle;
                }
                self.timer = 0;
                if self.ammo == 0 && self.loadout.is_swapped() {
                    self.revert(ledger, now);
                    return MachineEvent::Reverted;
                }
                let next = if self.ammo == 0 {
                    ActionState::Reloading
                } else {
                    ActionState::Ready
                };
                self.enter(next);
                MachineEvent::Idle
            }
            ActionState::Reloading => {
                let starting = self.timer == 0;
                if self.tick_timed(SpeedKind::Reload, reload, ledger, now) {
                    self.ammo = self.max_ammo;
                    self.enter(ActionState::Ready);
                    ledger.remove_reload_cleared();
                    MachineEvent::ReloadComplete
                } else if starting {
                    MachineEvent::ReloadStarted {
                        frames: self.duration,
                    }
                } else {
                    MachineEvent::Idle
                }
            }
        }
    }

    /// Schedules the next shot after a [`MachineEvent::Fire`].
    pub fn finish_shot(&mut self, ledger: &mut BuffLedger, now: Frame) {
        let mode = self.weapon().fire_mode();

        if mode == FireMode::Sustained {
            let speed = (1.0 + ledger.total_value(&Modifier::MgWarmupSpeed, now)).max(0.0);
            let table_interval = self.weapon().warmup.interval_at(self.warmup_level());
            self.warmup = (self.warmup + f64::from(table_interval) * speed)
                .min(self.weapon().max_warmup());
        }

        if mode == FireMode::Charge || self.ammo == 0 {
            self.enter(ActionState::Winddown);
            return;
        }

        let interval = match mode {
            FireMode::Sustained => self.pending_interval,
            _ => {
                let base = f64::from(self.weapon().fire_interval);
                buffed_frames(
                    SpeedKind::Attack,
                    base,
                    self.weapon().speed_locks,
                    ledger,
                    now,
                )
            }
        };
        self.timer = interval.saturating_sub(1);
    }

    /// Warmup measured from the end of windup.
    fn warmup_level(&self) -> f64 {
        (self.warmup - f64::from(self.weapon().windup_frames)).max(0.0)
    }

    fn sustained_interval(&self, ledger: &mut BuffLedger, now: Frame) -> u32 {
        let forced = ledger.total_value(&Modifier::ForceFireInterval, now);
        if forced > 0.0 {
            return (forced as u32).max(1);
        }
        let table = self.weapon().warmup.interval_at(self.warmup_level());
        buffed_frames(
            SpeedKind::Attack,
            f64::from(table),
            self.weapon().speed_locks,
            ledger,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{WarmupTable, WeaponClass};
    use crate::ledger::BuffOptions;

    const FPS: u32 = 60;

    /// Runs the machine, resolving every shot immediately, and returns the
    /// frames shots were fired on.
    fn run(machine: &mut WeaponMachine, ledger: &mut BuffLedger, frames: Frame) -> Vec<Frame> {
        let mut shots = Vec::new();
        for now in 1..=frames {
            if machine.advance(ledger, now, FPS) == MachineEvent::Fire {
                shots.push(now);
                machine.finish_shot(ledger, now);
            }
        }
        shots
    }

    fn gaps(shots: &[Frame]) -> Vec<Frame> {
        shots.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn rapid_fire_empties_then_reloads_to_max() {
        let mut weapon = WeaponSpec::standard("ar", WeaponClass::Ar);
        weapon.max_ammo = 5;
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();

        let mut reloaded = false;
        for now in 1..=200 {
            match machine.advance(&mut ledger, now, FPS) {
                MachineEvent::Fire => machine.finish_shot(&mut ledger, now),
                MachineEvent::ReloadComplete => {
                    assert_eq!(machine.ammo(), machine.max_ammo());
                    reloaded = true;
                    break;
                }
                _ => {}
            }
            assert!(machine.ammo() <= machine.max_ammo());
        }
        assert!(reloaded);
    }

    #[test]
    fn rapid_fire_cadence_follows_interval() {
        let mut weapon = WeaponSpec::standard("smg", WeaponClass::Smg);
        weapon.max_ammo = 4;
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();

        let shots = run(&mut machine, &mut ledger, 40);
        // windup 12, then one shot every 5 frames
        assert_eq!(shots, vec![13, 18, 23, 28]);
    }

    #[test]
    fn charge_weapon_fires_once_per_cycle() {
        let weapon = WeaponSpec::standard("sr", WeaponClass::Sr);
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();

        let shots = run(&mut machine, &mut ledger, 200);
        // windup 12 + charge 60, fire, winddown 10, then repeat
        assert_eq!(shots[0], 73);
        assert_eq!(gaps(&shots)[0], 1 + 10 + 12 + 60);
    }

    #[test]
    fn reload_clears_reload_scoped_buffs() {
        let mut weapon = WeaponSpec::standard("rl", WeaponClass::Rl);
        weapon.max_ammo = 1;
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();
        ledger.add_modifier(
            Modifier::AtkBuffRate,
            1.0,
            10_000,
            0,
            BuffOptions::new().remove_on_reload(true),
        );

        let mut completed = false;
        for now in 1..=400 {
            match machine.advance(&mut ledger, now, FPS) {
                MachineEvent::Fire => machine.finish_shot(&mut ledger, now),
                MachineEvent::ReloadComplete => {
                    completed = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(completed);
        assert_eq!(machine.ammo(), 1);
        assert_eq!(ledger.total_value(&Modifier::AtkBuffRate, 1), 0.0);
    }

    #[test]
    fn ammo_zeroed_mid_cycle_goes_to_reload_without_firing() {
        let mut machine = WeaponMachine::new(WeaponSpec::standard("ar", WeaponClass::Ar));
        let mut ledger = BuffLedger::new();
        machine.set_ammo(0);

        let shots = run(&mut machine, &mut ledger, 30);
        assert!(shots.is_empty());
        assert_eq!(machine.state(), ActionState::Reloading);
    }

    #[test]
    fn sustained_fire_walks_the_warmup_table() {
        let mut weapon = WeaponSpec::standard("mg", WeaponClass::Mg);
        weapon.max_ammo = 300;
        weapon.warmup = WarmupTable::from_pairs(&[[10, 6], [10, 5], [15, 2], [9999, 1]]);
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();

        let shots = run(&mut machine, &mut ledger, 400);
        assert_eq!(shots[0], 13);
        let gaps = gaps(&shots);
        assert!(gaps[..10].iter().all(|&g| g == 6));
        assert!(gaps[10..20].iter().all(|&g| g == 5));
        assert!(gaps[20..35].iter().all(|&g| g == 2));
        assert!(gaps[35..60].iter().all(|&g| g == 1));
    }

    #[test]
    fn forced_interval_overrides_warmup() {
        let mut weapon = WeaponSpec::standard("mg", WeaponClass::Mg);
        weapon.max_ammo = 50;
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();
        ledger.add_modifier(
            Modifier::ForceFireInterval,
            3.0,
            10_000,
            0,
            BuffOptions::new(),
        );

        let shots = run(&mut machine, &mut ledger, 100);
        assert!(gaps(&shots).iter().all(|&g| g == 3));
    }

    #[test]
    fn warmup_decays_while_reloading() {
        let mut weapon = WeaponSpec::standard("mg", WeaponClass::Mg);
        weapon.max_ammo = 20;
        weapon.reload_frames = 200;
        let mut machine = WeaponMachine::new(weapon);
        let mut ledger = BuffLedger::new();

        let mut peak = 0.0_f64;
        for now in 1..=400 {
            if machine.advance(&mut ledger, now, FPS) == MachineEvent::Fire {
                machine.finish_shot(&mut ledger, now);
            }
            peak = peak.max(machine.warmup());
            if machine.state() == ActionState::Reloading && now > 300 {
                break;
            }
        }
        assert!(peak > 0.0);
        assert_eq!(machine.warmup(), 0.0);
    }

    #[test]
    fn max_ammo_rounds_each_rate_separately() {
        let mut machine = WeaponMachine::new(WeaponSpec::standard("ar", WeaponClass::Ar));
        let mut ledger = BuffLedger::new();
        // 60 × 0.125 = 7.5 → 8, twice
        ledger.add_modifier(Modifier::MaxAmmoRate, 0.125, 100, 0, BuffOptions::new());
        ledger.add_modifier(Modifier::MaxAmmoRate, 0.125, 100, 0, BuffOptions::new());
        ledger.add_modifier(Modifier::MaxAmmoFixed, 3.0, 100, 0, BuffOptions::new());
        machine.recompute_max_ammo(&mut ledger, 1);
        assert_eq!(machine.max_ammo(), 79);

        machine.set_ammo(79);
        machine.recompute_max_ammo(&mut ledger, 101);
        assert_eq!(machine.max_ammo(), 60);
        assert_eq!(machine.ammo(), 60);
    }

    #[test]
    fn swap_without_ammo_figure_round_trips() {
        let mut machine = WeaponMachine::new(WeaponSpec::standard("ar", WeaponClass::Ar));
        let mut ledger = BuffLedger::new();
        machine.set_ammo(30);

        let rocket = WeaponSpec::standard("rocket", WeaponClass::Rl);
        machine.swap(rocket, None, Some(600), false, &mut ledger, 10);
        assert_eq!(machine.weapon().class, WeaponClass::Rl);
        assert_eq!(machine.max_ammo(), 60);
        assert_eq!(machine.ammo(), 30);
        assert!(!machine.loadout().revert_due(599));
        assert!(machine.loadout().revert_due(600));

        assert!(machine.revert(&mut ledger, 600));
        assert_eq!(machine.weapon().class, WeaponClass::Ar);
        assert_eq!((machine.ammo(), machine.max_ammo()), (30, 60));
        assert!(!machine.revert(&mut ledger, 601));
    }

    #[test]
    fn swap_with_ammo_figure_refills_both_ways() {
        let mut machine = WeaponMachine::new(WeaponSpec::standard("ar", WeaponClass::Ar));
        let mut ledger = BuffLedger::new();
        machine.set_ammo(12);

        machine.swap(
            WeaponSpec::standard("cannon", WeaponClass::Sr),
            Some(6),
            None,
            false,
            &mut ledger,
            0,
        );
        assert_eq!((machine.ammo(), machine.max_ammo()), (6, 6));

        machine.revert(&mut ledger, 1);
        assert_eq!((machine.ammo(), machine.max_ammo()), (60, 60));
    }

    #[test]
    fn dry_swap_reverts_after_winddown() {
        let mut machine = WeaponMachine::new(WeaponSpec::standard("ar", WeaponClass::Ar));
        let mut ledger = BuffLedger::new();
        machine.swap(
            WeaponSpec::standard("sr", WeaponClass::Sr),
            Some(1),
            None,
            false,
            &mut ledger,
            0,
        );

        let mut reverted = false;
        for now in 1..=200 {
            match machine.advance(&mut ledger, now, FPS) {
                MachineEvent::Fire => machine.finish_shot(&mut ledger, now),
                MachineEvent::Reverted => {
                    reverted = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(reverted);
        assert_eq!(machine.weapon().class, WeaponClass::Ar);
        assert_eq!(machine.state(), ActionState::Ready);
    }

    #[test]
    fn swap_keeps_buffed_magazine() {
        let mut base = WeaponSpec::standard("ar", WeaponClass::Ar);
        base.max_ammo = 40;
        let mut machine = WeaponMachine::new(base);
        let mut ledger = BuffLedger::new();
        ledger.add_modifier(Modifier::MaxAmmoRate, 0.5, 1_000, 0, BuffOptions::new());
        machine.recompute_max_ammo(&mut ledger, 0);
        machine.set_ammo(30);
        assert_eq!(machine.max_ammo(), 60);

        machine.swap(
            WeaponSpec::standard("mg", WeaponClass::Mg),
            None,
            None,
            false,
            &mut ledger,
            0,
        );
        assert_eq!((machine.ammo(), machine.max_ammo()), (30, 60));
    }
}
