//! Healing, heal sharing and overheal caps.

use crate::combatant::CombatantId;
use crate::events::SimEvent;
use crate::ledger::Modifier;

use super::resolver::SkillResolver;
use super::trigger::Signal;

impl SkillResolver<'_> {
    /// Heals `target` and returns the HP actually restored.
    ///
    /// A target holding a heal-sharing buff splits incoming heals among every
    /// roster member holding one, in proportion to their base HP. Shared
    /// portions are not shared again and do not fire receive-heal triggers.
    pub fn heal(&mut self, target: CombatantId, amount: f64, source: &str, distributed: bool) -> f64 {
        let now = self.now;
        if !distributed && self.shares_heals(target) {
            self.distribute_heal(amount, source);
            return 0.0;
        }

        let combatant = &mut self.roster[target.index()];
        let effectiveness = combatant
            .ledger
            .total_value(&Modifier::HealEffectivenessBuff, now);
        let amount = amount * (1.0 + effectiveness);
        if amount <= 0.0 {
            return 0.0;
        }

        let overflow = combatant.ledger.total_value(&Modifier::MaxHpOverflow, now);
        let cap = combatant.max_hp(now) * (1.0 + overflow);
        let before = combatant.hp;
        combatant.hp = (before + amount).min(cap).max(before);
        let (hp, actual) = (combatant.hp, combatant.hp - before);

        self.record(|| SimEvent::HealApplied {
            target,
            source: source.to_string(),
            amount,
            actual,
            hp,
            distributed,
        });
        if !distributed {
            self.dispatch(target, Signal::ReceivedHeal);
        }
        actual
    }

    fn shares_heals(&mut self, target: CombatantId) -> bool {
        let now = self.now;
        self.roster[target.index()]
            .ledger
            .total_value(&Modifier::DistributeHealBuff, now)
            > 0.0
    }

    fn distribute_heal(&mut self, amount: f64, source: &str) {
        let mut sharers = Vec::new();
        for index in 0..self.roster.len() {
            let id = CombatantId(index);
            let base_hp = self.roster[index].base_hp();
            if base_hp > 0.0 && self.shares_heals(id) {
                sharers.push((id, base_hp));
            }
        }
        let pool: f64 = sharers.iter().map(|(_, base_hp)| base_hp).sum();
        if pool <= 0.0 {
            return;
        }
        for (id, base_hp) in sharers {
            self.heal(id, amount * base_hp / pool, source, true);
        }
    }
}
