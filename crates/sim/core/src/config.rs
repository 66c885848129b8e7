//! Simulation configuration constants and tunable parameters.

use crate::Frame;
use crate::definition::Element;
use crate::error::SimError;

/// Run-wide timing and bookkeeping parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SimConfig {
    /// Frames per in-game second.
    pub fps: u32,

    /// Length of the run in seconds.
    pub duration_seconds: u32,

    /// Time spent in `GEN` before the first burst stage opens.
    pub burst_charge_seconds: f64,

    /// Base length of the full-burst window before reductions.
    pub full_burst_seconds: f64,

    /// Sampling period of the ammo and cooldown traces.
    pub trace_interval_frames: u32,

    /// Record a [`crate::events::SimEvent`] for every resolved action.
    pub record_events: bool,

    /// Seed for the default random source. `None` lets the caller choose.
    pub seed: Option<u64>,
}

impl SimConfig {
    // ===== compile-time constants =====
    /// Maximum nesting depth of stage and delayed-action trees.
    pub const MAX_STAGE_DEPTH: usize = 8;
    /// Frames between DoT/HoT ticks, in seconds.
    pub const PERIODIC_TICK_SECONDS: u32 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FPS: u32 = 60;
    pub const DEFAULT_DURATION_SECONDS: u32 = 180;
    pub const DEFAULT_BURST_CHARGE_SECONDS: f64 = 5.0;
    pub const DEFAULT_FULL_BURST_SECONDS: f64 = 10.0;

    pub fn new() -> Self {
        Self {
            fps: Self::DEFAULT_FPS,
            duration_seconds: Self::DEFAULT_DURATION_SECONDS,
            burst_charge_seconds: Self::DEFAULT_BURST_CHARGE_SECONDS,
            full_burst_seconds: Self::DEFAULT_FULL_BURST_SECONDS,
            trace_interval_frames: Self::DEFAULT_FPS,
            record_events: false,
            seed: None,
        }
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_events(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }

    /// Total number of frames simulated by [`crate::engine::Simulation::run`].
    pub fn total_frames(&self) -> Frame {
        Frame::from(self.duration_seconds) * Frame::from(self.fps)
    }

    /// Converts seconds to frames, rounding to the nearest frame.
    pub fn seconds_to_frames(&self, seconds: f64) -> Frame {
        (seconds * f64::from(self.fps)).round() as Frame
    }

    /// Frames between periodic DoT/HoT ticks.
    pub fn periodic_tick_frames(&self) -> Frame {
        Frame::from(self.fps * Self::PERIODIC_TICK_SECONDS)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.fps == 0 {
            return Err(SimError::InvalidConfig("fps must be positive"));
        }
        if self.duration_seconds == 0 {
            return Err(SimError::InvalidConfig("duration must be positive"));
        }
        if self.burst_charge_seconds < 0.0 || self.full_burst_seconds < 0.0 {
            return Err(SimError::InvalidConfig("burst timings must not be negative"));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The single shared target every combatant fires at.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EnemyConfig {
    pub element: Element,
    pub defense: f64,
    /// Body size used for hit probability.
    pub size: f64,
    /// Core size used for core-hit probability.
    pub core_size: f64,
    /// Fire the part-break trigger once per second.
    pub part_break_mode: bool,
}

impl EnemyConfig {
    pub const DEFAULT_SIZE: f64 = 5.0;
    pub const DEFAULT_CORE_SIZE: f64 = 3.0;
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            element: Element::None,
            defense: 0.0,
            size: Self::DEFAULT_SIZE,
            core_size: Self::DEFAULT_CORE_SIZE,
            part_break_mode: false,
        }
    }
}
