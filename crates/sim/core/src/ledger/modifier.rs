//! Modifier keys understood by the damage formula and the weapon machine.

use std::fmt;

use strum::{EnumString, IntoStaticStr};

/// The quantity a buff entry or stack contributes to.
///
/// Parsing never fails: any unrecognised key becomes [`Modifier::Other`],
/// which no formula reads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    // ===== attack =====
    AtkBuffRate,
    AtkBuffFixed,
    ConversionHpToAtk,
    MaxHpRate,

    // ===== enemy side =====
    DefDebuff,
    TakenDmgDebuff,

    // ===== damage layers =====
    WeaponDmgBuff,
    HitRateBuff,
    CoreHitRateFixed,
    CoreDmgBuff,
    CritRateBuff,
    CritDmgBuff,
    ChargeRatioBuff,
    ChargeDmgBuff,
    AtkDmgBuff,
    PartDmgBuff,
    IsPierce,
    PierceDmgBuff,
    IgnoreDefDmgBuff,
    DotDmgBuff,
    BurstDmgBuff,
    SplitDmgBuff,
    ElementalBuff,

    // ===== cadence =====
    AttackSpeedRate,
    AttackSpeedFixed,
    ChargeSpeedRate,
    ChargeSpeedFixed,
    ReloadSpeedRate,
    ReloadSpeedFixed,
    ReloadSpeedFixedValue,
    MaxAmmoRate,
    MaxAmmoFixed,
    PelletCountAdd,
    PelletCountFixed,
    ForceFireInterval,
    MgWarmupSpeed,

    // ===== sustain =====
    Drain,
    HealEffectivenessBuff,
    MaxHpOverflow,
    DistributeHealBuff,
    Shield,

    /// Pure counter stacks; contributes nothing.
    Counter,

    #[strum(default)]
    Other(String),
}

impl Modifier {
    /// Modifiers stored on the shared enemy ledger rather than on a
    /// combatant.
    pub fn is_enemy_side(&self) -> bool {
        matches!(self, Self::DefDebuff | Self::TakenDmgDebuff)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(key) => f.write_str(key),
            known => f.write_str(<&'static str>::from(known)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_snake_case_keys() {
        assert_eq!(
            Modifier::from_str("atk_buff_rate"),
            Ok(Modifier::AtkBuffRate)
        );
        assert_eq!(
            Modifier::from_str("conversion_hp_to_atk"),
            Ok(Modifier::ConversionHpToAtk)
        );
        assert_eq!(
            Modifier::from_str("reload_speed_fixed_value"),
            Ok(Modifier::ReloadSpeedFixedValue)
        );
    }

    #[test]
    fn unknown_keys_are_inert_other() {
        let parsed = Modifier::from_str("attack-rate-bonus").expect("never fails");
        assert_eq!(parsed, Modifier::Other("attack-rate-bonus".into()));
        assert!(!parsed.is_known());
        assert_eq!(parsed.to_string(), "attack-rate-bonus");
    }

    #[test]
    fn display_round_trips_known_keys() {
        let key = Modifier::TakenDmgDebuff.to_string();
        assert_eq!(key, "taken_dmg_debuff");
        assert_eq!(Modifier::from_str(&key), Ok(Modifier::TakenDmgDebuff));
        assert!(Modifier::TakenDmgDebuff.is_enemy_side());
    }
}
