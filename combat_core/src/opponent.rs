//! Opponents and session-start input sanitation
//!
//! Opponent hit points are encounter-local: every opponent enters the fray
//! at the configured starting value regardless of what the backend sent,
//! and once reduced to 0 the opponent is permanently out of consideration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::OpponentConstants;
use crate::log::CombatLog;
use crate::types::OpponentKind;

/// An opponent in the ordered encounter list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opponent {
    pub id: String,
    pub name: String,
    pub kind: OpponentKind,
    pub attack: u32,
    /// Encounter-local hit points
    pub hp: u32,
}

impl Opponent {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage, saturating at 0
    pub fn apply_damage(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }

    pub fn is_boss(&self) -> bool {
        self.kind == OpponentKind::Boss
    }
}

/// Raw opponent data as supplied at session start
///
/// Fields may be missing or malformed; [`Opponent::sanitize`] substitutes
/// defaults and narrates each substitution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpponentSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: OpponentKind,
    #[serde(default)]
    pub attack: Option<u32>,
    #[serde(default)]
    pub hp: Option<u32>,
}

impl Opponent {
    /// Turn a raw spec into a combat-ready opponent
    ///
    /// `index` is the opponent's position in the encounter list, used to
    /// synthesize an identifier when the supplied one is unusable.
    pub fn sanitize(
        spec: &OpponentSpec,
        index: usize,
        constants: &OpponentConstants,
        log: &mut CombatLog,
    ) -> Self {
        let id = if spec.id.trim().is_empty() {
            let synthesized = format!("opponent-{}", index + 1);
            warn!(index, "opponent spec missing identifier");
            log.push(format!("An unidentified foe joins as {synthesized}."));
            synthesized
        } else {
            spec.id.trim().to_string()
        };

        let name = if spec.name.trim().is_empty() {
            id.clone()
        } else {
            spec.name.trim().to_string()
        };

        let attack = match spec.attack {
            Some(value) if value > 0 => value,
            _ => {
                warn!(id = %id, default = constants.default_attack, "opponent spec missing attack");
                log.push(format!(
                    "{name} has no recorded attack, assuming {}.",
                    constants.default_attack
                ));
                constants.default_attack
            }
        };

        let hp = spec
            .hp
            .unwrap_or(constants.starting_hp)
            .min(constants.starting_hp)
            .max(1);

        Opponent {
            id,
            name,
            kind: spec.kind,
            attack,
            hp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> OpponentConstants {
        OpponentConstants::default()
    }

    #[test]
    fn test_sanitize_complete_spec() {
        let spec = OpponentSpec {
            id: "slime-1".to_string(),
            name: "Slime".to_string(),
            kind: OpponentKind::Normal,
            attack: Some(8),
            hp: Some(100),
        };
        let mut log = CombatLog::new();

        let opponent = Opponent::sanitize(&spec, 0, &constants(), &mut log);
        assert_eq!(opponent.id, "slime-1");
        assert_eq!(opponent.attack, 8);
        assert_eq!(opponent.hp, 100);
        assert!(log.is_empty());
    }

    #[test]
    fn test_sanitize_blank_id() {
        let spec = OpponentSpec {
            id: "   ".to_string(),
            name: "Slime".to_string(),
            ..OpponentSpec::default()
        };
        let mut log = CombatLog::new();

        let opponent = Opponent::sanitize(&spec, 2, &constants(), &mut log);
        assert_eq!(opponent.id, "opponent-3");
        // Both the identifier and the attack substitution are narrated
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_sanitize_missing_attack() {
        let spec = OpponentSpec {
            id: "golem".to_string(),
            name: "Golem".to_string(),
            attack: Some(0),
            hp: Some(100),
            ..OpponentSpec::default()
        };
        let mut log = CombatLog::new();

        let opponent = Opponent::sanitize(&spec, 0, &constants(), &mut log);
        assert_eq!(opponent.attack, constants().default_attack);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_sanitize_clamps_hp() {
        let spec = OpponentSpec {
            id: "ogre".to_string(),
            hp: Some(9999),
            attack: Some(10),
            ..OpponentSpec::default()
        };
        let mut log = CombatLog::new();

        let opponent = Opponent::sanitize(&spec, 0, &constants(), &mut log);
        assert_eq!(opponent.hp, constants().starting_hp);
    }

    #[test]
    fn test_apply_damage_saturates() {
        let mut opponent = Opponent {
            id: "rat".to_string(),
            name: "Rat".to_string(),
            kind: OpponentKind::Normal,
            attack: 5,
            hp: 10,
        };

        opponent.apply_damage(25);
        assert_eq!(opponent.hp, 0);
        assert!(!opponent.is_alive());
    }
}
