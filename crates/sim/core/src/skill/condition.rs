//! Condition evaluation.

use crate::combatant::CombatantId;
use crate::definition::{Condition, Owner};
use crate::ledger::BuffLedger;

use super::resolver::SkillResolver;

impl SkillResolver<'_> {
    /// Evaluates `condition` for `subject`, with `caster` as the activating
    /// combatant.
    pub fn check(&mut self, condition: &Condition, caster: CombatantId, subject: CombatantId) -> bool {
        let now = self.now;
        match condition {
            Condition::HasTag { owner, tag } => self.owner_ledger(*owner, caster, subject).has_tag(tag, now),
            Condition::LacksTag { owner, tag } => {
                !self.owner_ledger(*owner, caster, subject).has_tag(tag, now)
            }
            Condition::HasFlag(flag) => self.roster[subject.index()].has_flag(flag),
            Condition::LacksFlag(flag) => !self.roster[subject.index()].has_flag(flag),
            Condition::StackBetween {
                owner,
                stack,
                min,
                max,
            } => {
                let count = self.owner_ledger(*owner, caster, subject).stack_count(stack, now);
                (*min..=*max).contains(&count)
            }
            Condition::HpRatioAtLeast(ratio) => self.roster[subject.index()].hp_ratio(now) >= *ratio,
            Condition::HpRatioAtMost(ratio) => self.roster[subject.index()].hp_ratio(now) <= *ratio,
            Condition::Element(element) => self.roster[subject.index()].element() == *element,
            Condition::WeaponClass(class) => {
                self.roster[subject.index()].machine.weapon().class == *class
            }
            Condition::Class(class) => self.roster[subject.index()].class() == *class,
            Condition::Squad(squad) => self.roster[subject.index()].squad() == squad,
            Condition::BurstStage(stage) => self.roster[subject.index()].burst_stage() == *stage,
            Condition::IsLastBurstUser => self.burst.last_user() == Some(subject),
            Condition::FullBurstActive => self.burst.is_full_burst(),
            Condition::RosterCount { filter, count } => {
                let mut matching = 0;
                for index in 0..self.roster.len() {
                    if self.check(filter, caster, CombatantId(index)) {
                        matching += 1;
                    }
                }
                matching >= *count
            }
            Condition::Chance(percent) => self.rng.chance(percent / 100.0),
            Condition::All(all) => all.iter().all(|c| self.check(c, caster, subject)),
            Condition::Any(any) => any.iter().any(|c| self.check(c, caster, subject)),
            Condition::Not(inner) => !self.check(inner, caster, subject),
        }
    }

    fn owner_ledger(&mut self, owner: Owner, caster: CombatantId, subject: CombatantId) -> &mut BuffLedger {
        match owner {
            Owner::Subject => &mut self.roster[subject.index()].ledger,
            Owner::Caster => &mut self.roster[caster.index()].ledger,
            Owner::Enemy => self.enemy.ledger_mut(),
        }
    }
}
