//! Raw character format.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sim_core::definition::{
    BurstStage, CombatantClass, CombatantDefinition, Element, SkillDefinition, TriggerKind,
    WeaponSpec,
};

use super::skill::RawSkill;
use super::weapon::WeaponSource;
use crate::error::ContentError;
use crate::level::SkillLevel;

/// A character file.
///
/// ```ron
/// (
///     name: "Rapi",
///     class: "Attacker",
///     element: "Fire",
///     burst_stage: 3,
///     weapon: Standard("AR"),
///     skills: [ /* RawSkill */ ],
///     burst_skill: Some(( /* RawSkill */ )),
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCharacter {
    pub name: String,
    #[serde(default = "default_class")]
    pub class: String,
    #[serde(default = "default_element")]
    pub element: String,
    #[serde(default)]
    pub squad: String,
    pub burst_stage: u8,
    /// Overrides the class default.
    #[serde(default)]
    pub base_attack: Option<f64>,
    #[serde(default)]
    pub base_hp: Option<f64>,
    pub weapon: WeaponSource,
    #[serde(default)]
    pub burst_cooldown: Option<f64>,
    #[serde(default)]
    pub skills: Vec<RawSkill>,
    #[serde(default)]
    pub burst_skill: Option<RawSkill>,
}

fn default_class() -> String {
    CombatantClass::Attacker.to_string()
}

fn default_element() -> String {
    Element::Iron.to_string()
}

impl RawCharacter {
    /// Builds the definition around an already resolved weapon.
    ///
    /// Skills sharing both name and trigger kind are kept once, first
    /// occurrence wins.
    pub fn resolve(
        &self,
        weapon: WeaponSpec,
        level: SkillLevel,
    ) -> Result<CombatantDefinition, ContentError> {
        let class = CombatantClass::from_str(&self.class)
            .map_err(|_| ContentError::UnknownClass(self.class.clone()))?;
        let element = Element::from_str(&self.element)
            .map_err(|_| ContentError::UnknownElement(self.element.clone()))?;
        let stage = BurstStage::try_from(self.burst_stage)
            .map_err(ContentError::InvalidBurstStage)?;

        let mut def = CombatantDefinition::new(&self.name, class, stage, weapon)
            .with_element(element);
        def.squad = self.squad.clone();
        if let Some(attack) = self.base_attack {
            def.base_attack = attack;
        }
        if let Some(hp) = self.base_hp {
            def.base_hp = hp;
        }
        def.burst_cooldown_seconds = self.burst_cooldown;

        let skills = self
            .skills
            .iter()
            .map(|skill| skill.resolve(level))
            .collect::<Result<Vec<_>, _>>()?;
        def.skills = dedup_skills(skills);
        def.burst_skill = self
            .burst_skill
            .as_ref()
            .map(|skill| skill.resolve(level))
            .transpose()?;
        Ok(def)
    }
}

fn dedup_skills(skills: Vec<SkillDefinition>) -> Vec<SkillDefinition> {
    let mut seen: HashSet<(String, TriggerKind)> = HashSet::new();
    skills
        .into_iter()
        .filter(|skill| seen.insert((skill.name.clone(), skill.trigger.kind())))
        .collect()
}
