//! Declarative skill definitions.
//!
//! A skill is a [`Trigger`] plus an [`Effect`], resolved against the targets
//! picked by a [`TargetSelector`] when an optional gating [`Condition`]
//! holds. Multi-part skills nest further definitions inside
//! [`Effect::Stages`] or [`Effect::Delayed`]; nesting depth is bounded by
//! [`crate::config::SimConfig::MAX_STAGE_DEPTH`] and checked when the
//! simulation is assembled.

use strum::{Display, EnumDiscriminants};

use super::identity::{BurstStage, CombatantClass, Element};
use super::profile::DamageProfile;
use super::weapon::{WeaponClass, WeaponSpec};
use crate::ledger::Modifier;

// ============================================================================
// Skill
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub name: String,
    pub trigger: Trigger,
    pub effect: Effect,
    pub target: TargetSelector,

    /// Gating predicate evaluated against the caster before targeting.
    pub condition: Option<Condition>,

    /// Activation chance in percent (0-100). `None` always activates.
    pub probability: Option<f64>,

    /// Tags stripped from every resolved target and from the enemy before
    /// the effect applies.
    pub remove_tags: Vec<String>,

    /// Stop activating after this many successful activations.
    pub max_activations: Option<u32>,
}

impl SkillDefinition {
    pub fn new(name: impl Into<String>, trigger: Trigger, effect: Effect) -> Self {
        Self {
            name: name.into(),
            trigger,
            effect,
            target: TargetSelector::caster(),
            condition: None,
            probability: None,
            remove_tags: Vec::new(),
            max_activations: None,
        }
    }

    pub fn targeting(mut self, target: TargetSelector) -> Self {
        self.target = target;
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_probability(mut self, percent: f64) -> Self {
        self.probability = Some(percent);
        self
    }

    /// Deepest chain of nested [`Effect::Stages`] / [`Effect::Delayed`].
    pub fn nesting_depth(&self) -> usize {
        match &self.effect {
            Effect::Stages { stages, .. } => {
                1 + stages.iter().map(Self::nesting_depth).max().unwrap_or(0)
            }
            Effect::Delayed { action, .. } => 1 + action.nesting_depth(),
            _ => 0,
        }
    }
}

// ============================================================================
// Triggers
// ============================================================================

/// When a skill activates.
///
/// Count thresholds of zero never fire.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TriggerKind), derive(Hash, Display, PartialOrd, Ord))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trigger {
    /// Only fired explicitly (burst skills, stage children, delayed actions).
    Manual,
    OnStart,
    /// Every `n`-th shot fired.
    ShotCount(u32),
    /// Every `n` cumulative pellet hits; may fire several times per shot.
    PelletHitCount(u32),
    CritHitCount(u32),
    CoreHitCount(u32),
    /// Every `n`-th fully charged shot.
    FullChargeCount(u32),
    TimeInterval { seconds: f64 },
    /// Every `seconds` after the caster's most recent full-burst window ended.
    IntervalAfterBurstEnd { seconds: f64 },
    AmmoEmpty,
    ReloadComplete,
    BurstStageEnter(BurstStage),
    FullBurstEnter,
    /// The owner used its burst skill.
    OnUseBurstSkill,
    BurstEnd,
    PartBreak,
    /// A named stack on the owner crossed `threshold` upward.
    StackCountReached { stack: String, threshold: u32 },
    OnReceiveHeal,
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        TriggerKind::from(self)
    }
}

impl TriggerKind {
    /// Triggers that may legitimately activate the same skill several times
    /// within one frame.
    pub const fn bypasses_frame_guard(self) -> bool {
        matches!(
            self,
            Self::Manual | Self::PelletHitCount | Self::CritHitCount
        )
    }
}

// ============================================================================
// Effects
// ============================================================================

/// What a skill does once it activates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    // ========================================================================
    // Ledger
    // ========================================================================
    Buff(BuffSpec),
    StackBuff(StackBuffSpec),
    Shield { value: f64, seconds: f64 },
    StackCounter(StackCounterSpec),
    Stun { seconds: f64 },
    /// Newest-first removal of up to `count` units carrying `tag`.
    Cleanse { tag: String, count: u32 },
    ActivateFlag(String),

    // ========================================================================
    // Damage and healing
    // ========================================================================
    Heal(HealSpec),
    Damage(DamageSpec),
    Dot(DotSpec),

    // ========================================================================
    // Weapon and ammo
    // ========================================================================
    /// Refill `rate × max ammo`, rounded half up.
    AmmoCharge { rate: f64 },
    SetAmmo(u32),
    WeaponSwap(Box<WeaponSwapSpec>),

    // ========================================================================
    // Burst
    // ========================================================================
    /// Reduce every combatant's burst cooldown.
    CooldownReduction { seconds: f64 },
    /// Positive extends the full-burst window, negative shortens it.
    AdjustFullBurst { seconds: f64 },
    /// Jump the burst sequencer to this stage instead of advancing normally.
    ReenterBurstStage(BurstStage),

    // ========================================================================
    // Composition
    // ========================================================================
    Delayed {
        seconds: f64,
        action: Box<SkillDefinition>,
    },
    Stages {
        stages: Vec<SkillDefinition>,
        mode: StageMode,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageMode {
    /// Every stage fires on each activation.
    All,
    /// Activation `k` fires stages `1..=k`.
    #[default]
    Progressive,
}

/// A timed modifier applied to each target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffSpec {
    pub modifier: Modifier,
    pub value: f64,
    /// Replace `value` with `value × caster attack`.
    pub scaling: Option<AttackBasis>,
    pub seconds: f64,
    pub tags: Vec<String>,
    pub shot_life: u32,
    pub remove_on_reload: bool,
    pub linked_tag: Option<String>,
    /// Blocked by an immunity charge on the target.
    pub debuff: bool,
}

impl BuffSpec {
    pub fn new(modifier: Modifier, value: f64, seconds: f64) -> Self {
        Self {
            modifier,
            value,
            scaling: None,
            seconds,
            tags: Vec::new(),
            shot_life: 0,
            remove_on_reload: false,
            linked_tag: None,
            debuff: false,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackBasis {
    Base,
    Current,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackBuffSpec {
    pub buff: BuffSpec,
    pub stack: String,
    pub max_stack: u32,
    /// Stacks added per application.
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackCounterSpec {
    pub stack: String,
    pub op: StackOp,
    pub max_stack: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackOp {
    Set(u32),
    Add(i32),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealSpec {
    pub amount: HealAmount,
    /// Spread over this many seconds as a once-per-second tick instead of
    /// healing instantly.
    pub regen_seconds: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealAmount {
    Flat(f64),
    /// Fraction of the target's current max HP.
    MaxHpRatio(f64),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSpec {
    pub multiplier: f64,
    pub loops: u32,
    pub profile: DamageProfile,
    pub scale_by_stack: Option<StackScaling>,
}

/// Multiply skill damage by a stack count.
///
/// With several targets, only the first resolved target's stack is read.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackScaling {
    pub stack: String,
    pub side: StackSide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackSide {
    Caster,
    Target,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DotSpec {
    /// Key in the caster's DoT table; re-application refreshes this entry.
    pub name: String,
    pub multiplier: f64,
    pub seconds: f64,
    /// Above one, re-application adds a stack instead of replacing.
    pub max_stack: u32,
    pub profile: DamageProfile,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponSwapSpec {
    pub weapon: WeaponSpec,
    /// Max ammo declared by the swapped-in weapon; the magazine is refilled
    /// to it. `None` inherits the current weapon's magazine size and keeps
    /// the ammo fraction.
    pub max_ammo: Option<u32>,
    /// Revert after this many seconds. `None` reverts only when the swapped
    /// weapon runs dry.
    pub seconds: Option<f64>,
    /// Replace the base weapon for the rest of the run.
    pub permanent: bool,
}

// ============================================================================
// Targeting
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSelector {
    pub scope: TargetScope,
    pub filter: Option<Condition>,
    pub ranking: Option<Ranking>,
}

impl TargetSelector {
    pub fn caster() -> Self {
        Self::scoped(TargetScope::Caster)
    }

    pub fn enemy() -> Self {
        Self::scoped(TargetScope::Enemy)
    }

    pub fn allies() -> Self {
        Self::scoped(TargetScope::Allies)
    }

    pub fn scoped(scope: TargetScope) -> Self {
        Self {
            scope,
            filter: None,
            ranking: None,
        }
    }

    pub fn filtered(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn ranked(mut self, order: RankOrder, count: usize) -> Self {
        self.ranking = Some(Ranking { order, count });
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetScope {
    #[default]
    Caster,
    Allies,
    /// The shared enemy.
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranking {
    pub order: RankOrder,
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankOrder {
    HighestAttack,
    LowestHp,
}

// ============================================================================
// Conditions
// ============================================================================

/// Whose state a condition inspects.
///
/// In a target filter `Subject` is the candidate target; in a gating
/// condition it is the caster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Owner {
    #[default]
    Subject,
    Caster,
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    HasTag { owner: Owner, tag: String },
    LacksTag { owner: Owner, tag: String },
    HasFlag(String),
    LacksFlag(String),
    StackBetween {
        owner: Owner,
        stack: String,
        min: u32,
        max: u32,
    },
    HpRatioAtLeast(f64),
    HpRatioAtMost(f64),
    Element(Element),
    WeaponClass(WeaponClass),
    Class(CombatantClass),
    Squad(String),
    BurstStage(BurstStage),
    /// Subject activated the most recent stage-3 burst.
    IsLastBurstUser,
    FullBurstActive,
    /// At least `count` roster members satisfy `filter`.
    RosterCount { filter: Box<Condition>, count: usize },
    /// Percent chance (0-100); consumes one random draw.
    Chance(f64),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}
