//! Target resolution.

use std::cmp::Ordering;

use crate::combatant::CombatantId;
use crate::definition::{RankOrder, TargetScope, TargetSelector};

use super::resolver::SkillResolver;

impl SkillResolver<'_> {
    /// Resolves a selector to an ordered, duplicate-free list of roster
    /// members.
    ///
    /// The enemy scope resolves to the caster: enemy-side effects address the
    /// shared enemy ledger through their modifier, not through the target
    /// list. Ranking sorts stably, so ties keep roster order.
    pub fn resolve_targets(&mut self, caster: CombatantId, selector: &TargetSelector) -> Vec<CombatantId> {
        let now = self.now;
        let mut targets = match selector.scope {
            TargetScope::Caster | TargetScope::Enemy => return vec![caster],
            TargetScope::Allies => (0..self.roster.len()).map(CombatantId).collect::<Vec<_>>(),
        };

        if let Some(filter) = &selector.filter {
            let mut kept = Vec::with_capacity(targets.len());
            for id in targets {
                if self.check(filter, caster, id) {
                    kept.push(id);
                }
            }
            targets = kept;
        }

        if let Some(ranking) = selector.ranking {
            let mut keyed: Vec<(CombatantId, f64)> = targets
                .iter()
                .map(|&id| {
                    let combatant = &mut self.roster[id.index()];
                    let key = match ranking.order {
                        RankOrder::HighestAttack => combatant.attack(now),
                        RankOrder::LowestHp => -combatant.hp(),
                    };
                    (id, key)
                })
                .collect();
            keyed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            targets = keyed
                .into_iter()
                .take(ranking.count)
                .map(|(id, _)| id)
                .collect();
        }

        let mut seen = Vec::with_capacity(targets.len());
        targets.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Condition, Element};
    use crate::ledger::{BuffOptions, Modifier};
    use crate::skill::harness::Harness;

    #[test]
    fn caster_and_enemy_scopes_resolve_to_the_caster() {
        let mut h = Harness::new(3);
        let mut r = h.resolver(0);
        assert_eq!(
            r.resolve_targets(CombatantId(1), &TargetSelector::caster()),
            vec![CombatantId(1)]
        );
        let filtered = TargetSelector::enemy().filtered(Condition::Element(Element::Water));
        assert_eq!(r.resolve_targets(CombatantId(2), &filtered), vec![CombatantId(2)]);
    }

    #[test]
    fn allies_filter_then_rank() {
        let mut h = Harness::new(4);
        h.roster[3] = h.member(3, |def| def.with_element(Element::Water));
        h.roster[1] = h.member(1, |def| def.with_element(Element::Water));
        h.roster[0] = h.member(0, |def| def.with_element(Element::Water));
        h.roster[3]
            .ledger_mut()
            .add_modifier(Modifier::AtkBuffRate, 1.0, 600, 0, BuffOptions::new());

        let selector = TargetSelector::allies()
            .filtered(Condition::Element(Element::Water))
            .ranked(RankOrder::HighestAttack, 2);
        let targets = h.resolver(0).resolve_targets(CombatantId(0), &selector);
        // 3 has the highest attack; 0 and 1 tie and keep roster order
        assert_eq!(targets, vec![CombatantId(3), CombatantId(0)]);
    }

    #[test]
    fn lowest_hp_ranks_ascending() {
        let mut h = Harness::new(3);
        h.roster[0].hp = 900.0;
        h.roster[1].hp = 100.0;
        h.roster[2].hp = 500.0;
        let selector = TargetSelector::allies().ranked(RankOrder::LowestHp, 2);
        let targets = h.resolver(0).resolve_targets(CombatantId(0), &selector);
        assert_eq!(targets, vec![CombatantId(1), CombatantId(2)]);
    }
}
