//! Frame counts after speed modifiers.
//!
//! Formulas:
//! - attack = base / (1 + rate) − flat
//! - charge, reload = base × (1 − rate) − flat
//! - reload with a positive fixed-value override = base / (1 + value)
//!
//! Rates at or below −1 are clamped to −0.99 and every result floors at one
//! frame, so no buff combination can stall or invert a state.

use crate::Frame;
use crate::definition::SpeedLocks;
use crate::ledger::{BuffLedger, Modifier};

const MIN_RATE: f64 = -0.99;

/// Which frame count is being adjusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedKind {
    /// Windup, fire interval and winddown.
    Attack,
    Charge,
    Reload,
}

impl SpeedKind {
    fn modifiers(self) -> (Modifier, Modifier) {
        match self {
            Self::Attack => (Modifier::AttackSpeedRate, Modifier::AttackSpeedFixed),
            Self::Charge => (Modifier::ChargeSpeedRate, Modifier::ChargeSpeedFixed),
            Self::Reload => (Modifier::ReloadSpeedRate, Modifier::ReloadSpeedFixed),
        }
    }

    fn lock(self) -> SpeedLocks {
        match self {
            Self::Attack => SpeedLocks::ATTACK,
            Self::Charge => SpeedLocks::CHARGE,
            Self::Reload => SpeedLocks::RELOAD,
        }
    }
}

/// `base` frames adjusted by the ledger's speed modifiers for `kind`.
pub fn buffed_frames(
    kind: SpeedKind,
    base: f64,
    locks: SpeedLocks,
    ledger: &mut BuffLedger,
    now: Frame,
) -> u32 {
    if kind == SpeedKind::Reload {
        let fixed_value = ledger.total_value(&Modifier::ReloadSpeedFixedValue, now);
        if fixed_value > 0.0 {
            return floor_frames(base / (1.0 + fixed_value));
        }
    }
    if locks.contains(kind.lock()) {
        return floor_frames(base);
    }

    let (rate_key, flat_key) = kind.modifiers();
    let rate = ledger.total_value(&rate_key, now).max(MIN_RATE);
    let flat = ledger.total_value(&flat_key, now);

    let frames = match kind {
        SpeedKind::Attack => base / (1.0 + rate) - flat,
        SpeedKind::Charge | SpeedKind::Reload => base * (1.0 - rate) - flat,
    };
    floor_frames(frames)
}

fn floor_frames(frames: f64) -> u32 {
    if frames.is_finite() && frames >= 1.0 {
        frames as u32
    } else {
        1
    }
}

/// Rounds halves away from zero.
pub fn round_half_up(value: f64) -> f64 {
    value.signum() * (value.abs() + 0.5).floor()
}
