//! Hit and core probabilities from target size versus weapon spread.

/// Smallest spread a weapon can be buffed down to.
pub const MIN_HIT_SIZE: f64 = 0.01;

/// Per-hit probabilities derived from geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitChances {
    /// `min(1, (size / spread)²)`
    pub hit: f64,
    /// `min(hit, (core_size / spread)²)`, or `hit` when core hits are forced.
    pub core: f64,
}

impl HitChances {
    /// # Arguments
    ///
    /// * `hit_size` - weapon spread before buffs
    /// * `hit_rate_buff` - fractional spread reduction
    /// * `force_core` - a positive fixed core rate forces every hit to core
    pub fn new(
        target_size: f64,
        core_size: f64,
        hit_size: f64,
        hit_rate_buff: f64,
        force_core: bool,
    ) -> Self {
        let spread = (hit_size * (1.0 - hit_rate_buff)).max(MIN_HIT_SIZE);
        let hit = (target_size / spread).powi(2).min(1.0);
        let core = if force_core {
            1.0
        } else {
            (core_size / spread).powi(2).min(1.0)
        };
        Self {
            hit,
            core: core.min(hit),
        }
    }

    /// Probability of a core hit given that the shot already hit.
    pub fn core_given_hit(&self) -> f64 {
        if self.hit <= 0.0 {
            0.0
        } else {
            self.core / self.hit
        }
    }
}
