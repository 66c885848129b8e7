//! Weapon action machine, cadence math and temporary weapon swaps.
mod cadence;
mod loadout;
mod machine;

pub use cadence::{SpeedKind, buffed_frames, round_half_up};
pub use loadout::Loadout;
pub use machine::{ActionState, MachineEvent, WeaponMachine};
