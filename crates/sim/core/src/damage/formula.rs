//! Multiplicative damage formula.
//!
//! ```text
//! damage = (ATK − DEF)
//!        × weapon multiplier × (1 + weapon buff)
//!        × (1 + full burst + range + core + crit)
//!        × charge
//!        × (1 + Σ damage-type buffs)
//!        × split
//!        × (1 + taken-damage debuff)
//!        × elemental advantage
//! ```
//!
//! The attacker's ledger supplies every buff; defense and taken-damage
//! debuffs are summed from both the attacker's ledger and the shared enemy
//! ledger. Reads evict expired entries, so both ledgers are borrowed
//! mutably.

use crate::Frame;
use crate::definition::{DamageProfile, Element, ProfileFlags};
use crate::ledger::{BuffLedger, Modifier};
use crate::rng::RngOracle;

use super::hit::HitChances;

/// Damage returned when defense meets or exceeds attack.
pub const MIN_DAMAGE: f64 = 1.0;

const FULL_BURST_BONUS: f64 = 0.5;
const RANGE_BONUS: f64 = 0.3;
const CORE_BONUS: f64 = 1.0;
const CRIT_BONUS: f64 = 0.5;
const ELEMENT_BONUS: f64 = 0.1;

/// Attacker side of a damage computation.
pub struct Attacker<'a> {
    pub base_attack: f64,
    pub base_hp: f64,
    pub element: Element,
    /// Spread of the weapon currently equipped.
    pub hit_size: f64,
    pub ledger: &'a mut BuffLedger,
}

/// The shared enemy as seen by one hit.
pub struct TargetView<'a> {
    pub defense: f64,
    pub element: Element,
    pub size: f64,
    pub core_size: f64,
    pub ledger: &'a mut BuffLedger,
}

/// Each multiplicative layer of one hit, kept for auditing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageLayers {
    pub attack: f64,
    pub weapon: f64,
    pub bonus: f64,
    pub charge: f64,
    pub damage_type: f64,
    pub split: f64,
    pub taken: f64,
    pub elemental: f64,
}

impl DamageLayers {
    pub fn product(&self) -> f64 {
        self.attack
            * self.weapon
            * self.bonus
            * self.charge
            * self.damage_type
            * self.split
            * self.taken
            * self.elemental
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitOutcome {
    pub damage: f64,
    pub is_hit: bool,
    pub is_crit: bool,
    pub is_core: bool,
    /// `None` when the hit was floored or missed.
    pub layers: Option<DamageLayers>,
}

impl HitOutcome {
    fn floored() -> Self {
        Self {
            damage: MIN_DAMAGE,
            is_hit: true,
            is_crit: false,
            is_core: false,
            layers: None,
        }
    }

    fn miss() -> Self {
        Self {
            damage: 0.0,
            is_hit: false,
            is_crit: false,
            is_core: false,
            layers: None,
        }
    }
}

/// Attack after rate, flat and HP-conversion buffs.
pub fn effective_attack(base_attack: f64, base_hp: f64, ledger: &mut BuffLedger, now: Frame) -> f64 {
    let rate = ledger.total_value(&Modifier::AtkBuffRate, now);
    let mut flat = ledger.total_value(&Modifier::AtkBuffFixed, now);
    let conversion = ledger.total_value(&Modifier::ConversionHpToAtk, now);
    if conversion > 0.0 {
        flat += max_hp(base_hp, ledger, now) * conversion;
    }
    base_attack * (1.0 + rate) + flat
}

/// Max HP after the max-HP rate buff.
pub fn max_hp(base_hp: f64, ledger: &mut BuffLedger, now: Frame) -> f64 {
    base_hp * (1.0 + ledger.total_value(&Modifier::MaxHpRate, now))
}

/// Resolves one hit.
///
/// Draw order is fixed: hit, then core (when the profile is core-eligible),
/// then crit. A miss consumes only the hit draw.
pub fn compute_damage(
    attacker: &mut Attacker<'_>,
    target: &mut TargetView<'_>,
    profile: &DamageProfile,
    multiplier: f64,
    full_burst_active: bool,
    now: Frame,
    rng: &mut dyn RngOracle,
) -> HitOutcome {
    let own = &mut *attacker.ledger;
    let enemy = &mut *target.ledger;

    // (1) attack minus defense
    let attack = effective_attack(attacker.base_attack, attacker.base_hp, own, now);
    let defense = if profile.has(ProfileFlags::IGNORE_DEFENSE) {
        0.0
    } else {
        let debuff =
            own.total_value(&Modifier::DefDebuff, now) + enemy.total_value(&Modifier::DefDebuff, now);
        target.defense * (1.0 - debuff)
    };
    let attack_layer = attack - defense;
    if attack_layer <= 0.0 {
        return HitOutcome::floored();
    }

    // (2) weapon / skill multiplier
    let weapon_buff = if profile.has(ProfileFlags::WEAPON_ATTACK) {
        own.total_value(&Modifier::WeaponDmgBuff, now)
    } else {
        0.0
    };
    let weapon_layer = multiplier * (1.0 + weapon_buff);

    // (3) bonus bucket with the probabilistic terms
    let full_burst = profile.full_burst_applies(full_burst_active);
    let mut bonus = 1.0;
    if full_burst {
        bonus += FULL_BURST_BONUS;
    }
    if profile.has(ProfileFlags::RANGE_BONUS) {
        bonus += RANGE_BONUS;
    }

    let chances = HitChances::new(
        target.size,
        target.core_size,
        attacker.hit_size,
        own.total_value(&Modifier::HitRateBuff, now),
        own.total_value(&Modifier::CoreHitRateFixed, now) > 0.0,
    );
    if !rng.chance(chances.hit) {
        return HitOutcome::miss();
    }

    let is_core = profile.can_core_hit() && rng.chance(chances.core_given_hit());
    if is_core {
        bonus += CORE_BONUS + own.total_value(&Modifier::CoreDmgBuff, now);
    }

    let crit_rate = profile.crit_rate + own.total_value(&Modifier::CritRateBuff, now);
    let is_crit = rng.chance(crit_rate);
    if is_crit {
        bonus += CRIT_BONUS + own.total_value(&Modifier::CritDmgBuff, now);
    }

    // (4) charge
    let charge = if profile.has(ProfileFlags::CHARGE_ATTACK) {
        profile.charge_multiplier * (1.0 + own.total_value(&Modifier::ChargeRatioBuff, now))
            + own.total_value(&Modifier::ChargeDmgBuff, now)
    } else {
        1.0
    };

    // (5) damage-type bucket
    let mut damage_type = 1.0 + own.total_value(&Modifier::AtkDmgBuff, now);
    if profile.has(ProfileFlags::PART_DAMAGE) {
        damage_type += own.total_value(&Modifier::PartDmgBuff, now);
    }
    if profile.has(ProfileFlags::PIERCE) || own.total_value(&Modifier::IsPierce, now) > 0.0 {
        damage_type += own.total_value(&Modifier::PierceDmgBuff, now);
    }
    if profile.has(ProfileFlags::IGNORE_DEFENSE) {
        damage_type += own.total_value(&Modifier::IgnoreDefDmgBuff, now);
    }
    if profile.has(ProfileFlags::DOT) {
        damage_type += own.total_value(&Modifier::DotDmgBuff, now);
    }
    if full_burst {
        damage_type += own.total_value(&Modifier::BurstDmgBuff, now);
    }

    // (6) split
    let split = if profile.has(ProfileFlags::SPLIT) {
        1.0 + own.total_value(&Modifier::SplitDmgBuff, now)
    } else {
        1.0
    };

    // (7) damage taken
    let taken = 1.0
        + own.total_value(&Modifier::TakenDmgDebuff, now)
        + enemy.total_value(&Modifier::TakenDmgDebuff, now);

    // (8) elemental advantage
    let elemental = if attacker.element.beats(target.element) {
        1.0 + ELEMENT_BONUS + own.total_value(&Modifier::ElementalBuff, now)
    } else {
        1.0
    };

    let layers = DamageLayers {
        attack: attack_layer,
        weapon: weapon_layer,
        bonus,
        charge,
        damage_type,
        split,
        taken,
        elemental,
    };
    HitOutcome {
        damage: layers.product(),
        is_hit: true,
        is_crit,
        is_core,
        layers: Some(layers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::BuffOptions;
    use crate::rng::SequenceRng;

    fn buff(ledger: &mut BuffLedger, modifier: Modifier, value: f64) {
        ledger.add_modifier(modifier, value, 600, 0, BuffOptions::new());
    }

    fn roll(
        own: &mut BuffLedger,
        enemy: &mut BuffLedger,
        defense: f64,
        profile: &DamageProfile,
        full_burst: bool,
        rng: &mut dyn RngOracle,
    ) -> HitOutcome {
        let mut attacker = Attacker {
            base_attack: 10_000.0,
            base_hp: 100_000.0,
            element: Element::Iron,
            hit_size: 1.0,
            ledger: own,
        };
        let mut target = TargetView {
            defense,
            element: Element::Electric,
            size: 5.0,
            core_size: 3.0,
            ledger: enemy,
        };
        compute_damage(&mut attacker, &mut target, profile, 2.0, full_burst, 1, rng)
    }

    #[test]
    fn defense_at_or_above_attack_floors_to_one() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        let mut rng = SequenceRng::always();
        let out = roll(
            &mut own,
            &mut enemy,
            10_000.0,
            &DamageProfile::default(),
            false,
            &mut rng,
        );
        assert_eq!(out.damage, MIN_DAMAGE);
        assert!(!out.is_crit);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn ignore_defense_bypasses_the_floor() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        let mut rng = SequenceRng::never();
        let profile = DamageProfile::new(ProfileFlags::default() | ProfileFlags::IGNORE_DEFENSE);
        let out = roll(&mut own, &mut enemy, 50_000.0, &profile, false, &mut rng);
        assert!(out.damage > MIN_DAMAGE);
    }

    #[test]
    fn forced_outcome_is_product_of_every_layer() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        buff(&mut own, Modifier::AtkBuffRate, 0.5);
        buff(&mut own, Modifier::AtkBuffFixed, 1_000.0);
        buff(&mut own, Modifier::WeaponDmgBuff, 0.2);
        buff(&mut own, Modifier::CoreDmgBuff, 0.1);
        buff(&mut own, Modifier::CritDmgBuff, 0.4);
        buff(&mut own, Modifier::ChargeRatioBuff, 0.25);
        buff(&mut own, Modifier::ChargeDmgBuff, 0.5);
        buff(&mut own, Modifier::AtkDmgBuff, 0.1);
        buff(&mut own, Modifier::PartDmgBuff, 0.2);
        buff(&mut own, Modifier::PierceDmgBuff, 0.3);
        buff(&mut own, Modifier::BurstDmgBuff, 0.4);
        buff(&mut own, Modifier::SplitDmgBuff, 0.6);
        buff(&mut own, Modifier::ElementalBuff, 0.15);
        buff(&mut enemy, Modifier::DefDebuff, 0.5);
        buff(&mut enemy, Modifier::TakenDmgDebuff, 0.25);

        let flags = ProfileFlags::WEAPON_ATTACK
            | ProfileFlags::CHARGE_ATTACK
            | ProfileFlags::PART_DAMAGE
            | ProfileFlags::PIERCE
            | ProfileFlags::SPLIT
            | ProfileFlags::RANGE_BONUS
            | ProfileFlags::BURST_BUFF_ENABLED;
        let profile = DamageProfile {
            flags,
            crit_rate: 1.0,
            charge_multiplier: 2.5,
        };
        let mut rng = SequenceRng::always();
        let out = roll(&mut own, &mut enemy, 2_000.0, &profile, true, &mut rng);

        assert!(out.is_hit && out.is_core && out.is_crit);
        let attack = 10_000.0 * 1.5 + 1_000.0 - 2_000.0 * 0.5;
        let weapon = 2.0 * 1.2;
        let bonus = 1.0 + 0.5 + 0.3 + (1.0 + 0.1) + (0.5 + 0.4);
        let charge = 2.5 * 1.25 + 0.5;
        let damage_type = 1.0 + 0.1 + 0.2 + 0.3 + 0.4;
        let split = 1.6;
        let taken = 1.25;
        let elemental = 1.0 + 0.1 + 0.15;
        let expected = attack * weapon * bonus * charge * damage_type * split * taken * elemental;
        assert!((out.damage - expected).abs() < 1e-6 * expected);
        assert_eq!(out.layers.map(|l| l.product()), Some(out.damage));
    }

    #[test]
    fn miss_returns_zero_after_single_draw() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        let mut attacker = Attacker {
            base_attack: 10_000.0,
            base_hp: 1.0,
            element: Element::None,
            hit_size: 20.0,
            ledger: &mut own,
        };
        let mut target = TargetView {
            defense: 0.0,
            element: Element::None,
            size: 5.0,
            core_size: 3.0,
            ledger: &mut enemy,
        };
        let mut rng = SequenceRng::new(vec![0.5]);
        let out = compute_damage(
            &mut attacker,
            &mut target,
            &DamageProfile::weapon(None, false, false),
            1.0,
            false,
            0,
            &mut rng,
        );
        assert_eq!(out.damage, 0.0);
        assert!(!out.is_hit);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn non_weapon_hits_skip_the_core_roll() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        // hit succeeds, crit draw fails
        let mut rng = SequenceRng::new(vec![0.0, 0.99]);
        let out = roll(
            &mut own,
            &mut enemy,
            0.0,
            &DamageProfile::default(),
            false,
            &mut rng,
        );
        assert!(!out.is_core);
        assert!(!out.is_crit);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn hp_conversion_adds_flat_attack() {
        let mut ledger = BuffLedger::new();
        buff(&mut ledger, Modifier::ConversionHpToAtk, 0.1);
        buff(&mut ledger, Modifier::MaxHpRate, 1.0);
        let attack = effective_attack(1_000.0, 10_000.0, &mut ledger, 0);
        assert!((attack - (1_000.0 + 20_000.0 * 0.1)).abs() < 1e-9);
    }

    #[test]
    fn full_burst_terms_require_active_window_or_force() {
        let mut own = BuffLedger::new();
        let mut enemy = BuffLedger::new();
        buff(&mut own, Modifier::BurstDmgBuff, 1.0);
        let profile = DamageProfile::new(ProfileFlags::default());

        let mut rng = SequenceRng::new(vec![0.0, 0.99]);
        let outside = roll(&mut own, &mut enemy, 0.0, &profile, false, &mut rng);
        let mut rng = SequenceRng::new(vec![0.0, 0.99]);
        let inside = roll(&mut own, &mut enemy, 0.0, &profile, true, &mut rng);

        let outside_layers = outside.layers.expect("hit");
        let inside_layers = inside.layers.expect("hit");
        assert_eq!(outside_layers.bonus, 1.0);
        assert_eq!(inside_layers.bonus, 1.5);
        assert_eq!(inside_layers.damage_type, 2.0);

        let disabled = DamageProfile::new(ProfileFlags::empty());
        let mut rng = SequenceRng::new(vec![0.0, 0.99]);
        let out = roll(&mut own, &mut enemy, 0.0, &disabled, true, &mut rng);
        assert_eq!(out.layers.expect("hit").bonus, 1.0);
    }
}
