//! Matching runtime signals against skill triggers.

use crate::Frame;
use crate::config::SimConfig;
use crate::definition::{BurstStage, Trigger};

/// Something that happened to a combatant and may activate its skills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal<'a> {
    Start,
    Shot { total: u64 },
    Ammo { remaining: u32 },
    PelletHits { total: u64, delta: u64 },
    CritHits { total: u64, delta: u64 },
    CoreHits { total: u64, delta: u64 },
    FullCharges { total: u64 },
    /// Once per frame, for time-based triggers.
    Tick { now: Frame },
    ReloadComplete,
    BurstStageEnter(BurstStage),
    FullBurstEnter,
    UsedBurst,
    BurstEnd,
    PartBreak,
    StackChanged {
        stack: &'a str,
        previous: u32,
        current: u32,
    },
    ReceivedHeal,
}

impl Signal<'_> {
    /// How many times `trigger` fires for this signal.
    ///
    /// Only cumulative hit counters can fire more than once: a shot that
    /// carries the pellet total across several multiples of the threshold
    /// activates the skill once per multiple crossed.
    pub fn activations(
        &self,
        trigger: &Trigger,
        config: &SimConfig,
        last_burst_end: Option<Frame>,
    ) -> u32 {
        match (trigger, *self) {
            (Trigger::OnStart, Self::Start)
            | (Trigger::ReloadComplete, Self::ReloadComplete)
            | (Trigger::FullBurstEnter, Self::FullBurstEnter)
            | (Trigger::OnUseBurstSkill, Self::UsedBurst)
            | (Trigger::BurstEnd, Self::BurstEnd)
            | (Trigger::PartBreak, Self::PartBreak)
            | (Trigger::OnReceiveHeal, Self::ReceivedHeal) => 1,

            (Trigger::ShotCount(n), Self::Shot { total })
            | (Trigger::FullChargeCount(n), Self::FullCharges { total }) => every(*n, total),

            (Trigger::PelletHitCount(n), Self::PelletHits { total, delta })
            | (Trigger::CritHitCount(n), Self::CritHits { total, delta })
            | (Trigger::CoreHitCount(n), Self::CoreHits { total, delta }) => {
                crossings(*n, total, delta)
            }

            (Trigger::AmmoEmpty, Self::Ammo { remaining }) => u32::from(remaining == 0),

            (Trigger::TimeInterval { seconds }, Self::Tick { now }) => {
                periodic(config.seconds_to_frames(*seconds), now)
            }
            (Trigger::IntervalAfterBurstEnd { seconds }, Self::Tick { now }) => {
                match last_burst_end {
                    Some(end) if now > end => {
                        periodic(config.seconds_to_frames(*seconds), now - end)
                    }
                    _ => 0,
                }
            }

            (Trigger::BurstStageEnter(wanted), Self::BurstStageEnter(entered)) => {
                u32::from(*wanted == entered)
            }

            (
                Trigger::StackCountReached { stack, threshold },
                Self::StackChanged {
                    stack: changed,
                    previous,
                    current,
                },
            ) => u32::from(stack == changed && previous < *threshold && *threshold <= current),

            _ => 0,
        }
    }
}

fn every(n: u32, total: u64) -> u32 {
    u32::from(n > 0 && total > 0 && total % u64::from(n) == 0)
}

fn crossings(n: u32, total: u64, delta: u64) -> u32 {
    if n == 0 {
        return 0;
    }
    let n = u64::from(n);
    let crossed = total / n - total.saturating_sub(delta) / n;
    u32::try_from(crossed).unwrap_or(u32::MAX)
}

fn periodic(period: Frame, elapsed: Frame) -> u32 {
    u32::from(period > 0 && elapsed % period == 0)
}
