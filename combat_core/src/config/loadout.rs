//! Skill loadout loading
//!
//! Loadout files hold the starting skill sets per class. An entry with no
//! `classes` list is shared by every class.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::skills::{Skill, SkillCondition};
use crate::types::{ClassId, SkillEffect, SkillTrigger};

/// Container for skill loadout entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadoutConfig {
    #[serde(rename = "skills")]
    pub skills: Vec<LoadoutEntry>,
}

/// One loadout entry: a skill plus the classes it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadoutEntry {
    /// Classes this skill is granted to; empty means every class
    #[serde(default)]
    pub classes: Vec<ClassId>,
    #[serde(flatten)]
    pub skill: Skill,
}

/// Load a skill loadout from a TOML file
pub fn load_skill_loadout(path: &Path, class: ClassId) -> Result<Vec<Skill>, ConfigError> {
    let config: LoadoutConfig = super::load_toml(path)?;
    Ok(skills_for_class(config, class))
}

/// Load a skill loadout from a TOML string
pub fn parse_skill_loadout(content: &str, class: ClassId) -> Result<Vec<Skill>, ConfigError> {
    let config: LoadoutConfig = super::parse_toml(content)?;
    Ok(skills_for_class(config, class))
}

/// The bundled starting loadout for a class
///
/// Falls back to a single self-preservation skill if the bundled file is
/// malformed.
pub fn default_loadout(class: ClassId) -> Vec<Skill> {
    let toml = include_str!("../../config/skills.toml");
    parse_skill_loadout(toml, class).unwrap_or_else(|_| {
        vec![Skill {
            id: "second_wind".to_string(),
            name: "Second Wind".to_string(),
            trigger: SkillTrigger::OnHpBelow,
            effect: SkillEffect::Heal,
            effect_value: 20,
            cooldown: 0,
            once: true,
            priority: 0,
            condition: SkillCondition {
                hp_below: Some(0.3),
                apply_status: None,
            },
        }]
    })
}

fn skills_for_class(config: LoadoutConfig, class: ClassId) -> Vec<Skill> {
    config
        .skills
        .into_iter()
        .filter(|entry| entry.classes.is_empty() || entry.classes.contains(&class))
        .map(|entry| entry.skill)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loadout() {
        let toml = r#"
[[skills]]
classes = ["warrior"]
id = "battle_cry"
name = "Battle Cry"
trigger = "on_start_battle"
effect = "buff_attack"
effect_value = 3
once = true

[[skills]]
id = "second_wind"
name = "Second Wind"
trigger = "on_hp_below"
effect = "heal"
effect_value = 20
once = true

[skills.condition]
hp_below = 0.3
"#;
        let warrior = parse_skill_loadout(toml, ClassId::Warrior).unwrap();
        assert_eq!(warrior.len(), 2);
        assert_eq!(warrior[0].id, "battle_cry");

        // The class-scoped entry is filtered out for everyone else
        let mage = parse_skill_loadout(toml, ClassId::Mage).unwrap();
        assert_eq!(mage.len(), 1);
        assert_eq!(mage[0].id, "second_wind");
        assert_eq!(mage[0].condition.hp_below, Some(0.3));
    }

    #[test]
    fn test_default_loadout_every_class() {
        for &class in ClassId::all() {
            let skills = default_loadout(class);
            assert!(!skills.is_empty(), "no loadout for {class:?}");
        }
    }

    #[test]
    fn test_default_loadout_warrior_contents() {
        let skills = default_loadout(ClassId::Warrior);
        assert!(skills.iter().any(|s| s.id == "battle_cry"));
        assert!(skills.iter().any(|s| s.id == "shield_wall"));
    }

    #[test]
    fn test_fallback_on_malformed_input() {
        let skills = parse_skill_loadout("not valid toml ][", ClassId::Rogue);
        assert!(skills.is_err());

        // default_loadout never errors
        let fallback = default_loadout(ClassId::Rogue);
        assert!(!fallback.is_empty());
    }
}
