//! Shared burst chain.
//!
//! ```text
//! Gen ──► Stage(One) ──► Stage(Two) ──► Stage(Three) ──► Full ──► Gen
//! ```
//!
//! The sequencer only decides *who* bursts and *when* phases change. It
//! reports each decision as a [`BurstStep`] and the engine resolves the
//! skills and triggers that go with it. An activation is two-phase: the
//! sequencer reports [`BurstStep::Activated`] and stays in the stage until
//! [`BurstSequencer::finish_activation`] is called, so that the burst skill
//! can still request a full-burst adjustment or a stage re-entry.

use crate::Frame;
use crate::combatant::CombatantId;
use crate::definition::BurstStage;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BurstPhase {
    /// Charging toward the first stage.
    #[default]
    Gen,
    Stage(BurstStage),
    /// Shared damage-bonus window.
    Full,
}

/// What happened on one sequencer tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstStep {
    Idle,
    /// Charging finished and the first stage opened.
    Charged,
    /// A combatant was picked for the current stage.
    Activated {
        combatant: CombatantId,
        stage: BurstStage,
    },
    /// The full-burst window closed. Carries the stage-three user.
    FullBurstEnded { last_user: Option<CombatantId> },
}

#[derive(Clone, Debug)]
pub struct BurstSequencer {
    phase: BurstPhase,
    timer: Frame,
    charge_frames: Frame,
    full_burst_frames: Frame,
    /// Length of the window currently open.
    window: Frame,
    /// Accumulated extension (positive) or reduction (negative) for the next
    /// window.
    pending_adjustment: Frame,
    rotation: [Vec<CombatantId>; 3],
    cursors: [usize; 3],
    reentry: Option<BurstStage>,
    awaiting: Option<BurstStage>,
    last_user: Option<CombatantId>,
}

impl BurstSequencer {
    pub fn new(rotation: [Vec<CombatantId>; 3], charge_frames: Frame, full_burst_frames: Frame) -> Self {
        Self {
            phase: BurstPhase::Gen,
            timer: 0,
            charge_frames,
            full_burst_frames,
            window: 0,
            pending_adjustment: 0,
            rotation,
            cursors: [0; 3],
            reentry: None,
            awaiting: None,
            last_user: None,
        }
    }

    pub fn phase(&self) -> BurstPhase {
        self.phase
    }

    pub fn is_full_burst(&self) -> bool {
        self.phase == BurstPhase::Full
    }

    /// Combatant who filled stage three most recently.
    pub fn last_user(&self) -> Option<CombatantId> {
        self.last_user
    }

    /// Frames left in the open full-burst window.
    pub fn full_burst_remaining(&self) -> Frame {
        match self.phase {
            BurstPhase::Full => (self.window - self.timer).max(0),
            _ => 0,
        }
    }

    pub fn rotation(&self, stage: BurstStage) -> &[CombatantId] {
        &self.rotation[stage.index()]
    }

    /// Advances one frame. `ready` reports whether a combatant can burst
    /// right now (off cooldown and not stunned).
    pub fn tick(&mut self, ready: impl Fn(CombatantId) -> bool) -> BurstStep {
        match self.phase {
            BurstPhase::Gen => {
                self.timer += 1;
                if self.timer >= self.charge_frames {
                    self.enter(BurstPhase::Stage(BurstStage::One));
                    return BurstStep::Charged;
                }
                BurstStep::Idle
            }
            BurstPhase::Stage(stage) => {
                if self.awaiting.is_some() {
                    return BurstStep::Idle;
                }
                let slice = &self.rotation[stage.index()];
                let start = self.cursors[stage.index()];
                let picked = (0..slice.len())
                    .map(|offset| (start + offset) % slice.len())
                    .find(|&i| ready(slice[i]));
                let Some(i) = picked else {
                    return BurstStep::Idle;
                };

                let combatant = slice[i];
                self.cursors[stage.index()] = (i + 1) % slice.len();
                if stage == BurstStage::Three {
                    self.last_user = Some(combatant);
                }
                self.awaiting = Some(stage);
                BurstStep::Activated { combatant, stage }
            }
            BurstPhase::Full => {
                self.timer += 1;
                if self.timer >= self.window {
                    self.enter(BurstPhase::Gen);
                    self.pending_adjustment = 0;
                    return BurstStep::FullBurstEnded {
                        last_user: self.last_user,
                    };
                }
                BurstStep::Idle
            }
        }
    }

    /// Completes the activation reported by the last [`BurstStep::Activated`]
    /// and returns the phase entered: a requested re-entry stage, the next
    /// stage, or the full-burst window.
    pub fn finish_activation(&mut self) -> BurstPhase {
        let Some(stage) = self.awaiting.take() else {
            return self.phase;
        };
        let next = match (self.reentry.take(), stage.next()) {
            (Some(reentry), _) => BurstPhase::Stage(reentry),
            (None, Some(next)) => BurstPhase::Stage(next),
            (None, None) => BurstPhase::Full,
        };
        self.enter(next);
        if next == BurstPhase::Full {
            self.window = (self.full_burst_frames + self.pending_adjustment).max(0);
        }
        next
    }

    /// Extends (positive) or shortens (negative) the open window, or the next
    /// one when none is open.
    pub fn adjust_full_burst(&mut self, frames: Frame) {
        match self.phase {
            BurstPhase::Full => self.window = (self.window + frames).max(0),
            _ => self.pending_adjustment += frames,
        }
    }

    /// Makes the next completed activation jump to `stage`.
    pub fn request_reentry(&mut self, stage: BurstStage) {
        self.reentry = Some(stage);
    }

    /// Length of the open window, or of the next one.
    pub fn window_frames(&self) -> Frame {
        match self.phase {
            BurstPhase::Full => self.window,
            _ => (self.full_burst_frames + self.pending_adjustment).max(0),
        }
    }

    fn enter(&mut self, phase: BurstPhase) {
        self.phase = phase;
        self.timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CombatantId = CombatantId(0);
    const B: CombatantId = CombatantId(1);
    const C: CombatantId = CombatantId(2);
    const D: CombatantId = CombatantId(3);

    fn sequencer() -> BurstSequencer {
        BurstSequencer::new([vec![A], vec![B], vec![C, D]], 3, 5)
    }

    fn step(seq: &mut BurstSequencer, ready: impl Fn(CombatantId) -> bool) -> BurstStep {
        let step = seq.tick(ready);
        if matches!(step, BurstStep::Activated { .. }) {
            seq.finish_activation();
        }
        step
    }

    #[test]
    fn full_cycle_visits_each_stage_once() {
        let mut seq = sequencer();
        let mut phases = vec![seq.phase()];
        let mut activations = Vec::new();
        for _ in 0..20 {
            if let BurstStep::Activated { combatant, stage } = step(&mut seq, |_| true) {
                activations.push((combatant, stage));
            }
            if phases.last() != Some(&seq.phase()) {
                phases.push(seq.phase());
            }
        }

        assert_eq!(
            &phases[..6],
            &[
                BurstPhase::Gen,
                BurstPhase::Stage(BurstStage::One),
                BurstPhase::Stage(BurstStage::Two),
                BurstPhase::Stage(BurstStage::Three),
                BurstPhase::Full,
                BurstPhase::Gen,
            ]
        );
        assert_eq!(
            &activations[..3],
            &[
                (A, BurstStage::One),
                (B, BurstStage::Two),
                (C, BurstStage::Three),
            ]
        );
        assert_eq!(seq.last_user(), Some(C));
    }

    #[test]
    fn stage_idles_until_a_candidate_is_ready() {
        let mut seq = sequencer();
        for _ in 0..3 {
            step(&mut seq, |_| true);
        }
        assert_eq!(seq.phase(), BurstPhase::Stage(BurstStage::One));

        for _ in 0..50 {
            assert_eq!(step(&mut seq, |id| id != A), BurstStep::Idle);
        }
        assert_eq!(seq.phase(), BurstPhase::Stage(BurstStage::One));

        assert!(matches!(
            step(&mut seq, |_| true),
            BurstStep::Activated { combatant: A, .. }
        ));
        assert_eq!(seq.phase(), BurstPhase::Stage(BurstStage::Two));
    }

    #[test]
    fn round_robin_skips_unavailable_members() {
        let mut seq = BurstSequencer::new([vec![A], vec![B], vec![C, D]], 1, 1);
        let mut stage_three = Vec::new();
        for _ in 0..40 {
            if let BurstStep::Activated {
                combatant,
                stage: BurstStage::Three,
            } = step(&mut seq, |id| id != C || stage_three.is_empty())
            {
                stage_three.push(combatant);
            }
        }
        assert_eq!(&stage_three[..3], &[C, D, D]);
    }

    #[test]
    fn reduction_shortens_next_window_and_extension_the_open_one() {
        let mut seq = sequencer();
        seq.adjust_full_burst(-2);
        while seq.phase() != BurstPhase::Full {
            step(&mut seq, |_| true);
        }
        assert_eq!(seq.window_frames(), 3);

        seq.adjust_full_burst(4);
        assert_eq!(seq.full_burst_remaining(), 7);

        let mut ended = None;
        for frame in 1..=10 {
            if let BurstStep::FullBurstEnded { last_user } = step(&mut seq, |_| true) {
                ended = Some((frame, last_user));
                break;
            }
        }
        assert_eq!(ended, Some((7, Some(C))));
        assert_eq!(seq.window_frames(), 5);
    }

    #[test]
    fn reentry_replaces_normal_advance() {
        let mut seq = sequencer();
        for _ in 0..3 {
            step(&mut seq, |_| true);
        }
        assert!(matches!(
            seq.tick(|_| true),
            BurstStep::Activated { combatant: A, .. }
        ));
        // stays put until the activation is finished
        assert_eq!(seq.tick(|_| true), BurstStep::Idle);
        assert_eq!(seq.phase(), BurstPhase::Stage(BurstStage::One));

        seq.request_reentry(BurstStage::Three);
        assert_eq!(seq.finish_activation(), BurstPhase::Stage(BurstStage::Three));
    }

    #[test]
    fn empty_slice_idles() {
        let mut seq = BurstSequencer::new([vec![], vec![B], vec![C]], 1, 1);
        for _ in 0..10 {
            step(&mut seq, |_| true);
        }
        assert_eq!(seq.phase(), BurstPhase::Stage(BurstStage::One));
    }
}
