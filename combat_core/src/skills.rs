//! Skill definitions and the trigger/cooldown engine
//!
//! A [`Skill`] is an immutable definition supplied by the external profile
//! at session start (or loaded from a loadout file). All engine-owned
//! mutable state, the cooldown counters and the used-once set, lives in the
//! [`SkillBook`] so a definition is never mutated mid-session.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{SkillEffect, SkillTrigger, StatusKind};

/// Optional trigger refinements for a skill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCondition {
    /// For `on_hp_below`: fire only while `hp / max_hp <= hp_below`
    #[serde(default)]
    pub hp_below: Option<f64>,
    /// Status applied to the opponent when the skill fires
    #[serde(default)]
    pub apply_status: Option<StatusKind>,
}

/// An immutable skill definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique skill identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Event category that makes this skill eligible
    pub trigger: SkillTrigger,
    /// What firing does
    pub effect: SkillEffect,
    /// Magnitude of the effect
    #[serde(default)]
    pub effect_value: u32,
    /// Player turns to wait between firings (0 = every eligible trigger)
    #[serde(default)]
    pub cooldown: u8,
    /// Fires at most once per session
    #[serde(default)]
    pub once: bool,
    /// Higher fires first within one trigger point
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub condition: SkillCondition,
}

/// Record of one skill firing
#[derive(Debug, Clone, PartialEq)]
pub struct SkillActivation {
    /// Source skill id
    pub source: String,
    /// Source skill display name
    pub name: String,
    pub effect: SkillEffect,
    pub value: u32,
    /// Status to place on the opponent, if the skill applies one
    pub status: Option<StatusKind>,
}

/// Engine-owned skill state for one session
#[derive(Debug, Clone, Default)]
pub struct SkillBook {
    skills: Vec<Skill>,
    /// Remaining cooldown per skill id; absent means ready
    cooldowns: HashMap<String, u8>,
    /// Ids of once-only skills already consumed
    used: HashSet<String>,
}

impl SkillBook {
    pub fn new(skills: Vec<Skill>) -> Self {
        SkillBook {
            skills,
            cooldowns: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// The immutable definitions, in supplied order
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Remaining cooldown for a skill id (0 = ready)
    pub fn cooldown_remaining(&self, id: &str) -> u8 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    /// Whether a once-only skill has already been consumed
    pub fn is_consumed(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Fire every eligible skill for a trigger point
    ///
    /// Eligible means: matching trigger, cooldown counter at 0, and the
    /// once flag (if set) not yet consumed. `on_hp_below` skills
    /// additionally require `hp_fraction` at or under their threshold; a
    /// threshold-less `on_hp_below` skill never fires. Selected skills are
    /// returned ordered by descending priority (supplied order on ties),
    /// with their cooldown counters set and once flags consumed.
    pub fn fire(&mut self, trigger: SkillTrigger, hp_fraction: f64) -> Vec<SkillActivation> {
        let mut eligible: Vec<usize> = (0..self.skills.len())
            .filter(|&i| {
                let skill = &self.skills[i];
                if skill.trigger != trigger {
                    return false;
                }
                if self.cooldown_remaining(&skill.id) > 0 {
                    return false;
                }
                if skill.once && self.used.contains(&skill.id) {
                    return false;
                }
                if trigger == SkillTrigger::OnHpBelow {
                    match skill.condition.hp_below {
                        Some(threshold) => hp_fraction <= threshold,
                        None => false,
                    }
                } else {
                    true
                }
            })
            .collect();

        // Stable sort keeps supplied order among equal priorities
        eligible.sort_by(|&a, &b| self.skills[b].priority.cmp(&self.skills[a].priority));

        let mut activations = Vec::with_capacity(eligible.len());
        for index in eligible {
            let skill = &self.skills[index];
            if skill.cooldown > 0 {
                self.cooldowns.insert(skill.id.clone(), skill.cooldown);
            }
            if skill.once {
                self.used.insert(skill.id.clone());
            }
            activations.push(SkillActivation {
                source: skill.id.clone(),
                name: skill.name.clone(),
                effect: skill.effect,
                value: skill.effect_value,
                status: skill.condition.apply_status,
            });
        }
        activations
    }

    /// Decrement every running cooldown by exactly 1
    ///
    /// Called at the end of each player turn, except the turn whose attack
    /// defeated the final opponent.
    pub fn tick_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.cooldowns.retain(|_, remaining| *remaining > 0);
    }
}
