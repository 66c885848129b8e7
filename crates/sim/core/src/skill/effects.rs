//! Per-effect application.

use crate::combatant::{CombatantId, DotEntry, HotEntry};
use crate::config::SimConfig;
use crate::damage::{HitOutcome, compute_damage};
use crate::definition::{
    AttackBasis, BuffSpec, DamageProfile, DamageSpec, DotSpec, Effect, HealAmount, HealSpec,
    SkillDefinition, StackBuffSpec, StackCounterSpec, StackOp, StackSide, TargetScope,
    WeaponSwapSpec,
};
use crate::events::{Recipient, SimEvent};
use crate::ledger::{BuffLedger, BuffOptions, Modifier, STUN_TAG, TagSet};

use super::resolver::SkillResolver;
use super::trigger::Signal;

fn buff_options(source: &str, spec: &BuffSpec) -> BuffOptions {
    let opts = BuffOptions::new()
        .source(source)
        .tags(TagSet::new(spec.tags.iter()))
        .shot_life(spec.shot_life)
        .remove_on_reload(spec.remove_on_reload);
    match &spec.linked_tag {
        Some(tag) => opts.linked_tag(tag.clone()),
        None => opts,
    }
}

impl SkillResolver<'_> {
    /// Applies a target-based effect.
    pub(super) fn apply_effect(
        &mut self,
        caster: CombatantId,
        skill: &SkillDefinition,
        effect: &Effect,
        targets: &[CombatantId],
    ) {
        let now = self.now;
        match effect {
            Effect::Buff(spec) => self.apply_buff(caster, &skill.name, spec, targets),
            Effect::StackBuff(spec) => self.apply_stack_buff(caster, &skill.name, spec, targets),
            Effect::Shield { value, seconds } => {
                let frames = self.config.seconds_to_frames(*seconds);
                for &target in targets {
                    self.roster[target.index()].ledger.add_modifier(
                        Modifier::Shield,
                        *value,
                        frames,
                        now,
                        BuffOptions::new().source(skill.name.as_str()),
                    );
                    self.record(|| SimEvent::BuffApplied {
                        caster,
                        recipient: Recipient::Combatant(target),
                        skill: skill.name.clone(),
                        modifier: Modifier::Shield,
                        value: *value,
                        frames,
                    });
                }
            }
            Effect::StackCounter(spec) => {
                for &target in targets {
                    self.apply_stack_counter(target, spec);
                }
            }
            Effect::Stun { seconds } => {
                let frames = self.config.seconds_to_frames(*seconds);
                for &target in targets {
                    if self.blocked_by_immunity(caster, target, &skill.name) {
                        continue;
                    }
                    self.roster[target.index()].ledger.add_modifier(
                        Modifier::Counter,
                        0.0,
                        frames,
                        now,
                        BuffOptions::new().source(skill.name.as_str()).tag(STUN_TAG),
                    );
                }
            }
            Effect::Cleanse { tag, count } => {
                if skill.target.scope == TargetScope::Enemy {
                    let removed = self
                        .enemy
                        .ledger_mut()
                        .remove_newest_by_tag_up_to(tag, *count, now);
                    self.record(|| SimEvent::TagsRemoved {
                        recipient: Recipient::Enemy,
                        tag: tag.clone(),
                        removed,
                    });
                    return;
                }
                for &target in targets {
                    let removed = self.roster[target.index()]
                        .ledger
                        .remove_newest_by_tag_up_to(tag, *count, now);
                    self.record(|| SimEvent::TagsRemoved {
                        recipient: Recipient::Combatant(target),
                        tag: tag.clone(),
                        removed,
                    });
                }
            }
            Effect::ActivateFlag(flag) => {
                for &target in targets {
                    self.roster[target.index()].flags.insert(flag.clone());
                    self.record(|| SimEvent::FlagActivated {
                        combatant: target,
                        flag: flag.clone(),
                    });
                }
            }
            Effect::Heal(spec) => {
                for &target in targets {
                    self.apply_heal(target, &skill.name, spec);
                }
            }
            Effect::Damage(spec) => self.apply_damage(caster, &skill.name, spec, targets),
            Effect::AmmoCharge { rate } => {
                for &target in targets {
                    let ammo = {
                        let machine = &mut self.roster[target.index()].machine;
                        machine.charge_ammo(*rate);
                        machine.ammo()
                    };
                    self.record(|| SimEvent::AmmoChanged {
                        combatant: target,
                        ammo,
                    });
                }
            }
            Effect::SetAmmo(value) => {
                for &target in targets {
                    let ammo = {
                        let machine = &mut self.roster[target.index()].machine;
                        machine.set_ammo(*value);
                        machine.ammo()
                    };
                    self.record(|| SimEvent::AmmoChanged {
                        combatant: target,
                        ammo,
                    });
                }
            }
            // Resolved before targeting.
            Effect::Dot(_)
            | Effect::WeaponSwap(_)
            | Effect::CooldownReduction { .. }
            | Effect::AdjustFullBurst { .. }
            | Effect::ReenterBurstStage(_)
            | Effect::Delayed { .. }
            | Effect::Stages { .. } => {}
        }
    }

    // ========================================================================
    // Ledger effects
    // ========================================================================

    /// `value`, or `value × caster attack` for caster-scaled buffs.
    fn buff_value(&mut self, caster: CombatantId, spec: &BuffSpec) -> f64 {
        let now = self.now;
        let combatant = &mut self.roster[caster.index()];
        let attack = match spec.scaling {
            None => return spec.value,
            Some(AttackBasis::Base) => combatant.base_attack(),
            Some(AttackBasis::Current) => combatant.attack(now),
        };
        if attack > 0.0 {
            attack * spec.value
        } else {
            spec.value
        }
    }

    /// Consumes an immunity charge on `target`. Returns whether the debuff is
    /// blocked.
    fn blocked_by_immunity(&mut self, caster: CombatantId, target: CombatantId, skill: &str) -> bool {
        let now = self.now;
        if !self.roster[target.index()].ledger.consume_immunity_charge(now) {
            return false;
        }
        self.record(|| SimEvent::DebuffBlocked {
            caster,
            target,
            skill: skill.to_string(),
        });
        true
    }

    fn apply_buff(&mut self, caster: CombatantId, skill: &str, spec: &BuffSpec, targets: &[CombatantId]) {
        let now = self.now;
        let value = self.buff_value(caster, spec);
        let frames = self.config.seconds_to_frames(spec.seconds);

        if spec.modifier.is_enemy_side() {
            self.enemy.ledger_mut().add_modifier(
                spec.modifier.clone(),
                value,
                frames,
                now,
                buff_options(skill, spec),
            );
            self.record(|| SimEvent::BuffApplied {
                caster,
                recipient: Recipient::Enemy,
                skill: skill.to_string(),
                modifier: spec.modifier.clone(),
                value,
                frames,
            });
            return;
        }

        for &target in targets {
            if spec.debuff && self.blocked_by_immunity(caster, target, skill) {
                continue;
            }
            self.roster[target.index()].ledger.add_modifier(
                spec.modifier.clone(),
                value,
                frames,
                now,
                buff_options(skill, spec),
            );
            self.record(|| SimEvent::BuffApplied {
                caster,
                recipient: Recipient::Combatant(target),
                skill: skill.to_string(),
                modifier: spec.modifier.clone(),
                value,
                frames,
            });
        }
    }

    fn apply_stack_buff(
        &mut self,
        caster: CombatantId,
        skill: &str,
        spec: &StackBuffSpec,
        targets: &[CombatantId],
    ) {
        let value = self.buff_value(caster, &spec.buff);
        let frames = self.config.seconds_to_frames(spec.buff.seconds);
        let now = self.now;
        let push = |ledger: &mut BuffLedger| -> (u32, u32) {
            let previous = ledger.stack_count(&spec.stack, now);
            let count = ledger.add_or_increment_stack(
                &spec.stack,
                spec.buff.modifier.clone(),
                value,
                frames,
                now,
                spec.max_stack,
                spec.amount,
                buff_options(skill, &spec.buff),
            );
            (previous, count)
        };

        if spec.buff.modifier.is_enemy_side() {
            let (_, count) = push(self.enemy.ledger_mut());
            self.record(|| SimEvent::StackChanged {
                recipient: Recipient::Enemy,
                stack: spec.stack.clone(),
                count,
            });
            return;
        }

        for &target in targets {
            if spec.buff.debuff && self.blocked_by_immunity(caster, target, skill) {
                continue;
            }
            let (previous, current) = push(&mut self.roster[target.index()].ledger);
            self.record(|| SimEvent::StackChanged {
                recipient: Recipient::Combatant(target),
                stack: spec.stack.clone(),
                count: current,
            });
            if current > previous {
                self.dispatch(
                    target,
                    Signal::StackChanged {
                        stack: &spec.stack,
                        previous,
                        current,
                    },
                );
            }
        }
    }

    fn apply_stack_counter(&mut self, target: CombatantId, spec: &StackCounterSpec) {
        let now = self.now;
        let ledger = &mut self.roster[target.index()].ledger;
        let previous = ledger.stack_count(&spec.stack, now);
        let wanted = match spec.op {
            StackOp::Set(count) => count,
            StackOp::Add(delta) => {
                let sum = (i64::from(previous) + i64::from(delta)).max(0);
                u32::try_from(sum).unwrap_or(u32::MAX)
            }
        };
        ledger.set_stack_count(&spec.stack, wanted.min(spec.max_stack), spec.max_stack);
        let current = ledger.stack_count(&spec.stack, now);

        self.record(|| SimEvent::StackChanged {
            recipient: Recipient::Combatant(target),
            stack: spec.stack.clone(),
            count: current,
        });
        if current > previous {
            self.dispatch(
                target,
                Signal::StackChanged {
                    stack: &spec.stack,
                    previous,
                    current,
                },
            );
        }
    }

    // ========================================================================
    // Healing
    // ========================================================================

    fn apply_heal(&mut self, target: CombatantId, skill: &str, spec: &HealSpec) {
        let now = self.now;
        let amount = match spec.amount {
            HealAmount::Flat(value) => value,
            HealAmount::MaxHpRatio(ratio) => ratio * self.roster[target.index()].max_hp(now),
        };

        match spec.regen_seconds.filter(|seconds| *seconds > 0.0) {
            Some(seconds) => {
                let ticks = (seconds / f64::from(SimConfig::PERIODIC_TICK_SECONDS))
                    .round()
                    .max(1.0);
                let expires_at = now + self.config.seconds_to_frames(seconds);
                self.roster[target.index()].hots.push(HotEntry {
                    source: skill.to_string(),
                    per_tick: amount / ticks,
                    expires_at,
                });
            }
            None => {
                self.heal(target, amount, skill, false);
            }
        }
    }

    // ========================================================================
    // Damage
    // ========================================================================

    /// One hit from `attacker` against the shared enemy.
    pub(crate) fn strike(
        &mut self,
        attacker: CombatantId,
        profile: &DamageProfile,
        multiplier: f64,
    ) -> HitOutcome {
        let full_burst = self.burst.is_full_burst();
        let mut source = self.roster[attacker.index()].attacker();
        let mut target = self.enemy.view();
        compute_damage(
            &mut source,
            &mut target,
            profile,
            multiplier,
            full_burst,
            self.now,
            &mut *self.rng,
        )
    }

    fn apply_damage(
        &mut self,
        caster: CombatantId,
        skill: &str,
        spec: &DamageSpec,
        targets: &[CombatantId],
    ) {
        let now = self.now;
        let scale = match &spec.scale_by_stack {
            None => 1.0,
            Some(scaling) => {
                let owner = match scaling.side {
                    StackSide::Caster => caster,
                    StackSide::Target => targets.first().copied().unwrap_or(caster),
                };
                f64::from(self.roster[owner.index()].ledger.stack_count(&scaling.stack, now))
            }
        };
        let multiplier = spec.multiplier * scale;

        let mut damage = 0.0;
        let mut hits = 0;
        for _ in 0..spec.loops {
            let outcome = self.strike(caster, &spec.profile, multiplier);
            damage += outcome.damage;
            if outcome.damage > 0.0 {
                hits += 1;
            }
        }

        self.roster[caster.index()].record_damage(skill, damage);
        self.record(|| SimEvent::SkillDamage {
            combatant: caster,
            skill: skill.to_string(),
            damage,
            hits,
        });
    }

    /// Applies or refreshes a DoT on the caster. Stackable DoTs gain a stack
    /// on re-application; others restart from one stack.
    pub(super) fn apply_dot(&mut self, caster: CombatantId, spec: &DotSpec) {
        let expires_at = self.now + self.config.seconds_to_frames(spec.seconds);
        let dots = &mut self.roster[caster.index()].dots;

        let stackable = spec.max_stack > 1;
        let stacks = match dots.get_mut(&spec.name).filter(|_| stackable) {
            Some(dot) => {
                dot.stacks = (dot.stacks + 1).min(spec.max_stack);
                dot.max_stack = spec.max_stack;
                dot.expires_at = expires_at;
                dot.profile = spec.profile;
                dot.stacks
            }
            None => {
                dots.insert(
                    spec.name.clone(),
                    DotEntry {
                        multiplier: spec.multiplier,
                        stacks: 1,
                        max_stack: spec.max_stack.max(1),
                        expires_at,
                        profile: spec.profile,
                    },
                );
                1
            }
        };

        self.record(|| SimEvent::DotApplied {
            combatant: caster,
            name: spec.name.clone(),
            stacks,
            until: expires_at,
        });
    }

    // ========================================================================
    // Weapon
    // ========================================================================

    pub(super) fn swap_weapon(&mut self, caster: CombatantId, spec: &WeaponSwapSpec) {
        let now = self.now;
        let revert_at = spec
            .seconds
            .filter(|seconds| *seconds > 0.0)
            .map(|seconds| now + self.config.seconds_to_frames(seconds));

        let combatant = &mut self.roster[caster.index()];
        combatant.machine.swap(
            spec.weapon.clone(),
            spec.max_ammo,
            revert_at,
            spec.permanent,
            &mut combatant.ledger,
            now,
        );
        let (ammo, max_ammo) = (combatant.machine.ammo(), combatant.machine.max_ammo());
        self.record(|| SimEvent::WeaponSwapped {
            combatant: caster,
            weapon: spec.weapon.name.clone(),
            ammo,
            max_ammo,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DamageProfile, StageMode, TargetSelector, Trigger, WeaponClass, WeaponSpec};
    use crate::ledger::IMMUNITY_TAG;
    use crate::skill::harness::Harness;

    const A: CombatantId = CombatantId(0);
    const B: CombatantId = CombatantId(1);

    fn skill(name: &str, effect: Effect) -> SkillDefinition {
        SkillDefinition::new(name, Trigger::Manual, effect)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn buff_lands_on_every_ally() {
        let mut h = Harness::new(3);
        let rally = skill(
            "rally",
            Effect::Buff(BuffSpec::new(Modifier::AtkBuffRate, 0.1, 5.0)),
        )
        .targeting(TargetSelector::allies());
        assert!(h.resolver(10).resolve(A, &rally, 0));

        for c in h.roster.iter_mut() {
            assert!(close(c.ledger_mut().total_value(&Modifier::AtkBuffRate, 10), 0.1));
            assert!(close(c.ledger_mut().total_value(&Modifier::AtkBuffRate, 310), 0.1));
            assert_eq!(c.ledger_mut().total_value(&Modifier::AtkBuffRate, 311), 0.0);
        }
    }

    #[test]
    fn enemy_side_buff_applies_once() {
        let mut h = Harness::new(3);
        let shred = skill(
            "shred",
            Effect::Buff(BuffSpec::new(Modifier::DefDebuff, 0.2, 5.0)),
        )
        .targeting(TargetSelector::allies());
        h.resolver(0).resolve(A, &shred, 0);

        assert!(close(h.enemy.ledger_mut().total_value(&Modifier::DefDebuff, 0), 0.2));
        assert_eq!(h.enemy.ledger().entries().len(), 1);
        for c in h.roster.iter_mut() {
            assert_eq!(c.ledger_mut().total_value(&Modifier::DefDebuff, 0), 0.0);
        }
    }

    #[test]
    fn caster_scaled_buff_uses_attack() {
        let mut h = Harness::new(2);
        let mut spec = BuffSpec::new(Modifier::AtkBuffFixed, 0.5, 5.0);
        spec.scaling = Some(AttackBasis::Base);
        let share = skill("share", Effect::Buff(spec)).targeting(TargetSelector::allies());
        h.resolver(0).resolve(A, &share, 0);
        assert!(close(h.roster[1].attack(0), 150.0));
    }

    #[test]
    fn immunity_charge_blocks_one_debuff() {
        let mut h = Harness::new(1);
        h.roster[0].ledger_mut().add_or_increment_stack(
            "ward",
            Modifier::Counter,
            0.0,
            600,
            0,
            1,
            1,
            BuffOptions::new().tag(IMMUNITY_TAG),
        );
        let mut spec = BuffSpec::new(Modifier::AtkBuffRate, -0.2, 5.0);
        spec.debuff = true;
        let curse = skill("curse", Effect::Buff(spec));

        h.resolver(1).resolve(A, &curse, 0);
        assert_eq!(h.roster[0].ledger_mut().total_value(&Modifier::AtkBuffRate, 1), 0.0);
        assert!(
            h.events
                .records()
                .iter()
                .any(|r| matches!(r.event, SimEvent::DebuffBlocked { .. }))
        );

        h.resolver(2).resolve(A, &curse, 0);
        assert!(close(h.roster[0].ledger_mut().total_value(&Modifier::AtkBuffRate, 2), -0.2));
    }

    #[test]
    fn stack_buff_caps_and_fires_threshold_trigger() {
        let mut h = Harness::new(1);
        h.give(
            A,
            SkillDefinition::new(
                "unleash",
                Trigger::StackCountReached {
                    stack: "rage".into(),
                    threshold: 3,
                },
                Effect::ActivateFlag("enraged".into()),
            ),
        );
        let rage = skill(
            "rage",
            Effect::StackBuff(StackBuffSpec {
                buff: BuffSpec::new(Modifier::AtkBuffRate, 0.1, 10.0),
                stack: "rage".into(),
                max_stack: 3,
                amount: 1,
            }),
        );

        for now in 1..=2 {
            h.resolver(now).resolve(A, &rage, 0);
        }
        assert!(!h.roster[0].has_flag("enraged"));
        for now in 3..=4 {
            h.resolver(now).resolve(A, &rage, 0);
        }
        assert!(h.roster[0].has_flag("enraged"));
        assert_eq!(h.roster[0].ledger_mut().stack_count("rage", 4), 3);
        assert!(close(h.roster[0].ledger_mut().total_value(&Modifier::AtkBuffRate, 4), 0.3));
    }

    #[test]
    fn stack_counter_set_and_add_clamp() {
        let mut h = Harness::new(1);
        let counter = |op| {
            skill(
                "count",
                Effect::StackCounter(StackCounterSpec {
                    stack: "charge".into(),
                    op,
                    max_stack: 3,
                }),
            )
        };
        h.resolver(0).resolve(A, &counter(StackOp::Set(5)), 0);
        assert_eq!(h.roster[0].ledger_mut().stack_count("charge", 0), 3);
        h.resolver(0).resolve(A, &counter(StackOp::Add(-5)), 0);
        assert_eq!(h.roster[0].ledger_mut().stack_count("charge", 0), 0);
        h.resolver(0).resolve(A, &counter(StackOp::Add(2)), 0);
        assert_eq!(h.roster[0].ledger_mut().stack_count("charge", 0), 2);
    }

    #[test]
    fn stun_and_cleanse() {
        let mut h = Harness::new(2);
        let stun = skill("stun", Effect::Stun { seconds: 2.0 });
        h.resolver(0).resolve(B, &stun, 0);
        assert!(h.roster[1].is_stunned(60));
        assert!(!h.roster[0].is_stunned(60));

        for (now, source) in [(1, "a"), (2, "b"), (3, "c")] {
            h.roster[0].ledger_mut().add_modifier(
                Modifier::AtkBuffRate,
                -0.1,
                600,
                now,
                BuffOptions::new().source(source).tag("debuff"),
            );
        }
        let cleanse = skill(
            "cleanse",
            Effect::Cleanse {
                tag: "debuff".into(),
                count: 2,
            },
        );
        h.resolver(4).resolve(A, &cleanse, 0);
        let left: Vec<_> = h.roster[0]
            .ledger()
            .entries()
            .iter()
            .filter_map(|e| e.source.clone())
            .collect();
        assert_eq!(left, vec!["a".to_string()]);
    }

    #[test]
    fn remove_tags_strip_targets_before_the_effect() {
        let mut h = Harness::new(1);
        h.roster[0].ledger_mut().add_modifier(
            Modifier::AtkBuffRate,
            0.5,
            600,
            0,
            BuffOptions::new().tag("old"),
        );
        let mut swap_in = skill(
            "swap_in",
            Effect::Buff(BuffSpec::new(Modifier::CritRateBuff, 0.1, 5.0)),
        );
        swap_in.remove_tags = vec!["old".into()];
        h.resolver(1).resolve(A, &swap_in, 0);
        assert!(!h.roster[0].ledger().has_tag("old", 1));
        assert_eq!(h.roster[0].ledger().entries().len(), 1);
    }

    #[test]
    fn damage_is_recorded_under_the_skill_name() {
        let mut h = Harness::new(1);
        let blast = skill(
            "blast",
            Effect::Damage(DamageSpec {
                multiplier: 2.0,
                loops: 3,
                profile: DamageProfile::default(),
                scale_by_stack: None,
            }),
        );
        h.resolver(0).resolve(A, &blast, 0);

        let c = &h.roster[0];
        assert!(c.breakdown()["blast"] > 0.0);
        assert_eq!(c.breakdown()["blast"], c.total_damage());
        let hits = h.events.records().iter().find_map(|r| match &r.event {
            SimEvent::SkillDamage { hits, .. } => Some(*hits),
            _ => None,
        });
        assert_eq!(hits, Some(3));
    }

    #[test]
    fn dots_stack_only_when_stackable() {
        let mut h = Harness::new(1);
        let dot = |name: &str, max_stack| {
            skill(
                name,
                Effect::Dot(DotSpec {
                    name: name.into(),
                    multiplier: 0.5,
                    seconds: 3.0,
                    max_stack,
                    profile: DamageProfile::default(),
                }),
            )
        };
        for now in 0..4 {
            h.resolver(now).resolve(A, &dot("burn", 3), 0);
            h.resolver(now).resolve(A, &dot("bleed", 1), 0);
        }
        let dots = h.roster[0].dots();
        assert_eq!(dots["burn"].stacks, 3);
        assert_eq!(dots["burn"].expires_at, 3 + 180);
        assert_eq!(dots["bleed"].stacks, 1);
        assert!(close(dots["burn"].tick_multiplier(), 1.5));
    }

    #[test]
    fn weapon_swap_schedules_revert() {
        let mut h = Harness::new(1);
        let cannon = skill(
            "cannon",
            Effect::WeaponSwap(Box::new(WeaponSwapSpec {
                weapon: WeaponSpec::standard("cannon", WeaponClass::Rl),
                max_ammo: Some(6),
                seconds: Some(5.0),
                permanent: false,
            })),
        );
        h.resolver(100).resolve(A, &cannon, 0);

        let machine = h.roster[0].machine();
        assert_eq!(machine.weapon().name, "cannon");
        assert_eq!(machine.ammo(), 6);
        assert!(!machine.loadout().revert_due(399));
        assert!(machine.loadout().revert_due(400));
    }

    #[test]
    fn regen_heal_becomes_a_per_second_tick() {
        let mut h = Harness::new(1);
        let regen = skill(
            "regen",
            Effect::Heal(HealSpec {
                amount: HealAmount::MaxHpRatio(0.3),
                regen_seconds: Some(3.0),
            }),
        );
        h.resolver(0).resolve(A, &regen, 0);
        let hot = &h.roster[0].hots[0];
        assert!(close(hot.per_tick, 100.0));
        assert_eq!(hot.expires_at, 180);
    }

    #[test]
    fn stages_inside_effects_are_not_applied_twice() {
        let mut h = Harness::new(1);
        let nested = skill(
            "combo",
            Effect::Stages {
                stages: vec![skill("flag", Effect::ActivateFlag("a".into()))],
                mode: StageMode::All,
            },
        );
        h.resolver(0).resolve(A, &nested, 0);
        assert!(h.roster[0].has_flag("a"));
    }
}
