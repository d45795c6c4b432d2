//! Core types shared across the combat engine

use serde::{Deserialize, Serialize};

/// Playable character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassId {
    Warrior,
    Mage,
    Rogue,
    Archer,
}

impl ClassId {
    /// Get all playable classes
    pub fn all() -> &'static [ClassId] {
        &[
            ClassId::Warrior,
            ClassId::Mage,
            ClassId::Rogue,
            ClassId::Archer,
        ]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ClassId::Warrior => "Warrior",
            ClassId::Mage => "Mage",
            ClassId::Rogue => "Rogue",
            ClassId::Archer => "Archer",
        }
    }
}

/// Opponent category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    Normal,
    Boss,
}

impl Default for OpponentKind {
    fn default() -> Self {
        OpponentKind::Normal
    }
}

/// Event category that makes a skill eligible to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTrigger {
    OnStartBattle,
    OnAttack,
    OnReceiveHit,
    OnHpBelow,
}

/// What a fired skill does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillEffect {
    DealDamage,
    GainShield,
    Heal,
    BuffAttack,
    DebuffEnemy,
}

/// Timed condition on the current opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Bleed,
    Poison,
    Confusion,
}

impl StatusKind {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Bleed => "Bleed",
            StatusKind::Poison => "Poison",
            StatusKind::Confusion => "Confusion",
        }
    }
}

/// Terminal result of a combat session
///
/// `Settlement` denotes player defeat; the caller resolves it as an
/// auto-settled encounter rather than a hard game-over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionResult {
    Victory,
    Settlement,
}
