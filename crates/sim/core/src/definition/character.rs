use super::identity::{BurstStage, CombatantClass, Element};
use super::skill::SkillDefinition;
use super::weapon::WeaponSpec;

/// Everything needed to place one combatant on the roster.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantDefinition {
    pub name: String,
    pub squad: String,
    pub element: Element,
    pub class: CombatantClass,
    pub burst_stage: BurstStage,
    pub base_attack: f64,
    pub base_hp: f64,
    pub weapon: WeaponSpec,
    pub skills: Vec<SkillDefinition>,
    /// Resolved when the burst sequencer picks this combatant.
    pub burst_skill: Option<SkillDefinition>,
    /// Overrides [`BurstStage::default_cooldown_seconds`].
    pub burst_cooldown_seconds: Option<f64>,
}

impl CombatantDefinition {
    /// A combatant with class-default stats and no skills.
    pub fn new(
        name: impl Into<String>,
        class: CombatantClass,
        burst_stage: BurstStage,
        weapon: WeaponSpec,
    ) -> Self {
        let (base_attack, base_hp) = class.base_stats();
        Self {
            name: name.into(),
            squad: String::new(),
            element: Element::None,
            class,
            burst_stage,
            base_attack,
            base_hp,
            weapon,
            skills: Vec::new(),
            burst_skill: None,
            burst_cooldown_seconds: None,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_burst_skill(mut self, skill: SkillDefinition) -> Self {
        self.burst_skill = Some(skill);
        self
    }

    pub fn burst_cooldown_seconds(&self) -> f64 {
        self.burst_cooldown_seconds
            .unwrap_or_else(|| self.burst_stage.default_cooldown_seconds())
    }
}
