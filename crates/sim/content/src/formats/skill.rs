//! Raw skill format.
//!
//! Triggers are written the way designers name them (`"shot_count"`,
//! `"on_burst_3_enter"`, ...) with a numeric `trigger_value`; modifiers are
//! free strings parsed by [`Modifier`]. Numeric effect parameters are
//! [`Leveled`] and resolved against the character's skill level.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sim_core::definition::{
    AttackBasis, BuffSpec, BurstStage, Condition, DamageProfile, DamageSpec, DotSpec, Effect,
    HealAmount, HealSpec, ProfileFlags, Ranking, SkillDefinition, StackBuffSpec,
    StackCounterSpec, StackScaling, StageMode, TargetScope, TargetSelector, Trigger,
    WeaponSwapSpec,
};
use sim_core::ledger::Modifier;

use super::weapon::RawWeapon;
use crate::error::ContentError;
use crate::level::{Leveled, SkillLevel};

fn manual() -> String {
    "manual".to_string()
}

fn one() -> u32 {
    1
}

// ============================================================================
// Skill
// ============================================================================

/// A skill as written in a character file.
///
/// ```ron
/// (
///     name: "Focus",
///     trigger: "shot_count",
///     trigger_value: 10,
///     effect: Buff((modifier: "crit_rate_buff", value: [0.05, 0.055, 0.06, 0.065, 0.07, 0.075, 0.08, 0.085, 0.09, 0.1], seconds: 5)),
///     target: Allies,
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSkill {
    pub name: String,
    #[serde(default = "manual")]
    pub trigger: String,
    #[serde(default)]
    pub trigger_value: f64,
    /// Stack name for `"stack_count"` triggers.
    #[serde(default)]
    pub trigger_stack: Option<String>,
    pub effect: RawEffect,
    #[serde(default)]
    pub target: TargetScope,
    #[serde(default)]
    pub filter: Option<Condition>,
    #[serde(default)]
    pub rank: Option<Ranking>,
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Percent chance to activate.
    #[serde(default)]
    pub probability: Option<Leveled>,
    #[serde(default)]
    pub remove_tags: Vec<String>,
    #[serde(default)]
    pub max_activations: Option<u32>,
}

impl RawSkill {
    pub fn resolve(&self, level: SkillLevel) -> Result<SkillDefinition, ContentError> {
        let trigger = parse_trigger(
            &self.trigger,
            self.trigger_value,
            self.trigger_stack.as_deref(),
        )?;
        let mut skill = SkillDefinition::new(&self.name, trigger, self.effect.resolve(level)?);
        skill.target = TargetSelector {
            scope: self.target,
            filter: self.filter.clone(),
            ranking: self.rank,
        };
        skill.condition = self.condition.clone();
        skill.probability = self
            .probability
            .as_ref()
            .map(|p| p.at(level))
            .transpose()?;
        skill.remove_tags = self.remove_tags.clone();
        skill.max_activations = self.max_activations;
        Ok(skill)
    }
}

// ============================================================================
// Triggers
// ============================================================================

/// Parses a trigger name and its numeric value. Count thresholds round to
/// the nearest whole number.
pub fn parse_trigger(kind: &str, value: f64, stack: Option<&str>) -> Result<Trigger, ContentError> {
    let count = value.round().max(0.0) as u32;
    let trigger = match kind {
        "manual" => Trigger::Manual,
        "on_start" => Trigger::OnStart,
        "shot_count" => Trigger::ShotCount(count),
        "pellet_hit" => Trigger::PelletHitCount(count),
        "critical_hit" => Trigger::CritHitCount(count),
        "core_hit" => Trigger::CoreHitCount(count),
        "full_charge_count" => Trigger::FullChargeCount(count),
        "time_interval" => Trigger::TimeInterval { seconds: value },
        "interval_after_burst_end" => Trigger::IntervalAfterBurstEnd { seconds: value },
        "ammo_empty" => Trigger::AmmoEmpty,
        "reload_complete" => Trigger::ReloadComplete,
        "on_burst_1_enter" => Trigger::BurstStageEnter(BurstStage::One),
        "on_burst_2_enter" => Trigger::BurstStageEnter(BurstStage::Two),
        "on_burst_3_enter" => Trigger::BurstStageEnter(BurstStage::Three),
        "on_burst_enter" => Trigger::FullBurstEnter,
        "on_use_burst_skill" => Trigger::OnUseBurstSkill,
        "on_burst_end" => Trigger::BurstEnd,
        "part_break" => Trigger::PartBreak,
        "on_receive_heal" => Trigger::OnReceiveHeal,
        "stack_count" => Trigger::StackCountReached {
            stack: stack
                .ok_or_else(|| ContentError::MissingTriggerField {
                    trigger: kind.to_string(),
                    field: "trigger_stack",
                })?
                .to_string(),
            threshold: count,
        },
        other => return Err(ContentError::UnknownTrigger(other.to_string())),
    };
    Ok(trigger)
}

// ============================================================================
// Effects
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawEffect {
    Buff(RawBuff),
    StackBuff {
        buff: RawBuff,
        stack: String,
        max_stack: u32,
        #[serde(default = "one")]
        amount: u32,
    },
    Shield {
        value: Leveled,
        seconds: f64,
    },
    StackCounter(StackCounterSpec),
    Stun {
        seconds: f64,
    },
    Cleanse {
        tag: String,
        count: u32,
    },
    ActivateFlag(String),
    Heal {
        amount: Leveled,
        /// `amount` is a fraction of the target's max HP.
        #[serde(default)]
        max_hp_ratio: bool,
        #[serde(default)]
        regen_seconds: Option<f64>,
    },
    Damage {
        multiplier: Leveled,
        #[serde(default = "one")]
        loops: u32,
        #[serde(default)]
        profile: RawProfile,
        #[serde(default)]
        scale_by_stack: Option<StackScaling>,
    },
    Dot {
        name: String,
        multiplier: Leveled,
        seconds: f64,
        #[serde(default = "one")]
        max_stack: u32,
        #[serde(default)]
        profile: RawProfile,
    },
    AmmoCharge {
        rate: Leveled,
    },
    SetAmmo(u32),
    WeaponSwap {
        weapon: RawWeapon,
        #[serde(default)]
        max_ammo: Option<u32>,
        #[serde(default)]
        seconds: Option<f64>,
        #[serde(default)]
        permanent: bool,
    },
    CooldownReduction {
        seconds: Leveled,
    },
    AdjustFullBurst {
        seconds: Leveled,
    },
    ReenterBurstStage(u8),
    Delayed {
        seconds: f64,
        action: Box<RawSkill>,
    },
    Stages {
        stages: Vec<RawSkill>,
        #[serde(default)]
        mode: StageMode,
    },
}

impl RawEffect {
    pub fn resolve(&self, level: SkillLevel) -> Result<Effect, ContentError> {
        let effect = match self {
            Self::Buff(buff) => Effect::Buff(buff.resolve(level)?),
            Self::StackBuff {
                buff,
                stack,
                max_stack,
                amount,
            } => Effect::StackBuff(StackBuffSpec {
                buff: buff.resolve(level)?,
                stack: stack.clone(),
                max_stack: *max_stack,
                amount: *amount,
            }),
            Self::Shield { value, seconds } => Effect::Shield {
                value: value.at(level)?,
                seconds: *seconds,
            },
            Self::StackCounter(spec) => Effect::StackCounter(spec.clone()),
            Self::Stun { seconds } => Effect::Stun { seconds: *seconds },
            Self::Cleanse { tag, count } => Effect::Cleanse {
                tag: tag.clone(),
                count: *count,
            },
            Self::ActivateFlag(flag) => Effect::ActivateFlag(flag.clone()),
            Self::Heal {
                amount,
                max_hp_ratio,
                regen_seconds,
            } => {
                let value = amount.at(level)?;
                Effect::Heal(HealSpec {
                    amount: if *max_hp_ratio {
                        HealAmount::MaxHpRatio(value)
                    } else {
                        HealAmount::Flat(value)
                    },
                    regen_seconds: *regen_seconds,
                })
            }
            Self::Damage {
                multiplier,
                loops,
                profile,
                scale_by_stack,
            } => Effect::Damage(DamageSpec {
                multiplier: multiplier.at(level)?,
                loops: *loops,
                profile: profile.resolve()?,
                scale_by_stack: scale_by_stack.clone(),
            }),
            Self::Dot {
                name,
                multiplier,
                seconds,
                max_stack,
                profile,
            } => Effect::Dot(DotSpec {
                name: name.clone(),
                multiplier: multiplier.at(level)?,
                seconds: *seconds,
                max_stack: *max_stack,
                profile: profile.resolve()?,
            }),
            Self::AmmoCharge { rate } => Effect::AmmoCharge {
                rate: rate.at(level)?,
            },
            Self::SetAmmo(ammo) => Effect::SetAmmo(*ammo),
            Self::WeaponSwap {
                weapon,
                max_ammo,
                seconds,
                permanent,
            } => Effect::WeaponSwap(Box::new(WeaponSwapSpec {
                weapon: weapon.resolve()?,
                max_ammo: *max_ammo,
                seconds: *seconds,
                permanent: *permanent,
            })),
            Self::CooldownReduction { seconds } => Effect::CooldownReduction {
                seconds: seconds.at(level)?,
            },
            Self::AdjustFullBurst { seconds } => Effect::AdjustFullBurst {
                seconds: seconds.at(level)?,
            },
            Self::ReenterBurstStage(stage) => Effect::ReenterBurstStage(
                BurstStage::try_from(*stage).map_err(ContentError::InvalidBurstStage)?,
            ),
            Self::Delayed { seconds, action } => Effect::Delayed {
                seconds: *seconds,
                action: Box::new(action.resolve(level)?),
            },
            Self::Stages { stages, mode } => Effect::Stages {
                stages: stages
                    .iter()
                    .map(|stage| stage.resolve(level))
                    .collect::<Result<_, _>>()?,
                mode: *mode,
            },
        };
        Ok(effect)
    }
}

/// A timed modifier. `modifier` is any key [`Modifier`] understands;
/// unknown keys load as inert modifiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBuff {
    pub modifier: String,
    pub value: Leveled,
    pub scaling: Option<AttackBasis>,
    pub seconds: f64,
    pub tags: Vec<String>,
    pub shot_life: u32,
    pub remove_on_reload: bool,
    pub linked_tag: Option<String>,
    pub debuff: bool,
}

impl RawBuff {
    fn resolve(&self, level: SkillLevel) -> Result<BuffSpec, ContentError> {
        let modifier = Modifier::from_str(&self.modifier)
            .unwrap_or_else(|_| Modifier::Other(self.modifier.clone()));
        Ok(BuffSpec {
            scaling: self.scaling,
            tags: self.tags.clone(),
            shot_life: self.shot_life,
            remove_on_reload: self.remove_on_reload,
            linked_tag: self.linked_tag.clone(),
            debuff: self.debuff,
            ..BuffSpec::new(modifier, self.value.at(level)?, self.seconds)
        })
    }
}

/// Damage profile flags by name, e.g. `["pierce", "ignore_defense"]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    pub flags: Vec<String>,
    /// Hits may profit from full-burst bonuses.
    pub burst_buff: bool,
    pub crit_rate: Option<f64>,
    pub charge_multiplier: Option<f64>,
}

impl Default for RawProfile {
    fn default() -> Self {
        Self {
            flags: Vec::new(),
            burst_buff: true,
            crit_rate: None,
            charge_multiplier: None,
        }
    }
}

impl RawProfile {
    pub fn resolve(&self) -> Result<DamageProfile, ContentError> {
        let mut flags = ProfileFlags::empty();
        for name in &self.flags {
            flags |= ProfileFlags::from_name(&name.to_ascii_uppercase())
                .ok_or_else(|| ContentError::UnknownProfileFlag(name.clone()))?;
        }
        flags.set(ProfileFlags::BURST_BUFF_ENABLED, self.burst_buff);

        let mut profile = DamageProfile::new(flags);
        if let Some(rate) = self.crit_rate {
            profile.crit_rate = rate;
        }
        if let Some(multiplier) = self.charge_multiplier {
            profile.charge_multiplier = multiplier;
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::definition::{StackOp, TriggerKind};

    fn level(n: u8) -> SkillLevel {
        SkillLevel::new(n).expect("valid level")
    }

    fn skill(trigger: &str, value: f64, effect: RawEffect) -> RawSkill {
        RawSkill {
            name: "test".into(),
            trigger: trigger.into(),
            trigger_value: value,
            trigger_stack: None,
            effect,
            target: TargetScope::Caster,
            filter: None,
            rank: None,
            condition: None,
            probability: None,
            remove_tags: Vec::new(),
            max_activations: None,
        }
    }

    #[test]
    fn trigger_names_map_to_variants() {
        assert_eq!(parse_trigger("shot_count", 10.0, None), Ok(Trigger::ShotCount(10)));
        assert_eq!(
            parse_trigger("pellet_hit", 4.6, None),
            Ok(Trigger::PelletHitCount(5))
        );
        assert_eq!(
            parse_trigger("on_burst_3_enter", 0.0, None),
            Ok(Trigger::BurstStageEnter(BurstStage::Three))
        );
        assert_eq!(
            parse_trigger("time_interval", 2.5, None),
            Ok(Trigger::TimeInterval { seconds: 2.5 })
        );
        assert_eq!(
            parse_trigger("on_burst_enter", 0.0, None).map(|t| t.kind()),
            Ok(TriggerKind::FullBurstEnter)
        );
    }

    #[test]
    fn stack_triggers_need_a_stack_name() {
        assert_eq!(
            parse_trigger("stack_count", 3.0, Some("Charge")),
            Ok(Trigger::StackCountReached {
                stack: "Charge".into(),
                threshold: 3,
            })
        );
        assert!(matches!(
            parse_trigger("stack_count", 3.0, None),
            Err(ContentError::MissingTriggerField { .. })
        ));
        assert_eq!(
            parse_trigger("on_dodge", 0.0, None),
            Err(ContentError::UnknownTrigger("on_dodge".into()))
        );
    }

    #[test]
    fn buff_values_resolve_at_level_and_tolerate_unknown_modifiers() {
        let table: Vec<f64> = (1..=10).map(|n| f64::from(n) / 100.0).collect();
        let raw = skill(
            "on_start",
            0.0,
            RawEffect::Buff(RawBuff {
                modifier: "atk_buff_rate".into(),
                value: Leveled::Table(table),
                seconds: 5.0,
                ..RawBuff::default()
            }),
        );
        let resolved = raw.resolve(level(4)).expect("valid skill");
        match resolved.effect {
            Effect::Buff(spec) => {
                assert_eq!(spec.modifier, Modifier::AtkBuffRate);
                assert_eq!(spec.value, 0.04);
            }
            other => panic!("unexpected effect {other:?}"),
        }

        let raw = skill(
            "manual",
            0.0,
            RawEffect::Buff(RawBuff {
                modifier: "lucky_charm".into(),
                value: Leveled::Flat(1.0),
                ..RawBuff::default()
            }),
        );
        let resolved = raw.resolve(level(1)).expect("unknown modifiers load");
        assert!(matches!(
            resolved.effect,
            Effect::Buff(BuffSpec { modifier: Modifier::Other(_), .. })
        ));
    }

    #[test]
    fn nested_stages_resolve_recursively() {
        let child = skill(
            "manual",
            0.0,
            RawEffect::Damage {
                multiplier: Leveled::Table(vec![1.0; 10]),
                loops: 2,
                profile: RawProfile {
                    flags: vec!["pierce".into(), "ignore_defense".into()],
                    ..RawProfile::default()
                },
                scale_by_stack: None,
            },
        );
        let parent = skill(
            "on_use_burst_skill",
            0.0,
            RawEffect::Stages {
                stages: vec![child],
                mode: StageMode::All,
            },
        );
        let resolved = parent.resolve(level(10)).expect("valid skill");
        let Effect::Stages { stages, mode } = resolved.effect else {
            panic!("expected stages");
        };
        assert_eq!(mode, StageMode::All);
        let Effect::Damage(damage) = &stages[0].effect else {
            panic!("expected damage");
        };
        assert_eq!(damage.loops, 2);
        assert!(damage.profile.has(ProfileFlags::PIERCE));
        assert!(damage.profile.has(ProfileFlags::IGNORE_DEFENSE));
        assert!(damage.profile.has(ProfileFlags::BURST_BUFF_ENABLED));
    }

    #[test]
    fn invalid_content_is_reported() {
        let raw = skill(
            "manual",
            0.0,
            RawEffect::Damage {
                multiplier: Leveled::Flat(1.0),
                loops: 1,
                profile: RawProfile {
                    flags: vec!["homing".into()],
                    ..RawProfile::default()
                },
                scale_by_stack: None,
            },
        );
        assert_eq!(
            raw.resolve(level(1)),
            Err(ContentError::UnknownProfileFlag("homing".into()))
        );

        let raw = skill("manual", 0.0, RawEffect::ReenterBurstStage(4));
        assert_eq!(raw.resolve(level(1)), Err(ContentError::InvalidBurstStage(4)));

        let raw = skill(
            "manual",
            0.0,
            RawEffect::AmmoCharge {
                rate: Leveled::Table(vec![0.1, 0.2]),
            },
        );
        assert_eq!(raw.resolve(level(1)), Err(ContentError::BadTableLength(2)));
    }

    #[test]
    fn stack_counters_pass_through() {
        let raw = skill(
            "shot_count",
            1.0,
            RawEffect::StackCounter(StackCounterSpec {
                stack: "heat".into(),
                op: StackOp::Add(1),
                max_stack: 5,
            }),
        );
        let resolved = raw.resolve(level(1)).expect("valid skill");
        assert!(matches!(resolved.effect, Effect::StackCounter(_)));
        assert_eq!(resolved.trigger, Trigger::ShotCount(1));
    }
}
