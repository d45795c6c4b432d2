//! Tunable balance constants

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Tunable balance constants for the combat engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConstants {
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub opponent: OpponentConstants,
    #[serde(default)]
    pub damage: DamageConstants,
    #[serde(default)]
    pub status: StatusConstants,
}

impl Default for BalanceConstants {
    fn default() -> Self {
        BalanceConstants {
            crit: CritConstants::default(),
            opponent: OpponentConstants::default(),
            damage: DamageConstants::default(),
            status: StatusConstants::default(),
        }
    }
}

impl BalanceConstants {
    /// Constants baked into the crate at build time
    ///
    /// Falls back to the hard-coded defaults if the bundled file is
    /// malformed.
    pub fn baked() -> Self {
        let toml = include_str!("../../config/balance.toml");
        super::parse_toml(toml).unwrap_or_default()
    }

    /// Load constants from a TOML file
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritConstants {
    /// Critical strike damage multiplier (1.5 = 150%)
    #[serde(default = "default_crit_multiplier")]
    pub multiplier: f64,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            multiplier: 1.5,
        }
    }
}

fn default_crit_multiplier() -> f64 {
    1.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentConstants {
    /// Lower bound of the opponent damage multiplier
    #[serde(default = "default_variance_min")]
    pub variance_min: f64,
    /// Upper bound of the opponent damage multiplier
    #[serde(default = "default_variance_max")]
    pub variance_max: f64,
    /// Substitute for a missing or zero attack value
    #[serde(default = "default_opponent_attack")]
    pub default_attack: u32,
    /// Encounter-local hit points each opponent starts with
    #[serde(default = "default_starting_hp")]
    pub starting_hp: u32,
}

impl Default for OpponentConstants {
    fn default() -> Self {
        OpponentConstants {
            variance_min: 0.7,
            variance_max: 1.2,
            default_attack: 8,
            starting_hp: 100,
        }
    }
}

fn default_variance_min() -> f64 {
    0.7
}
fn default_variance_max() -> f64 {
    1.2
}
fn default_opponent_attack() -> u32 {
    8
}
fn default_starting_hp() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageConstants {
    /// Minimum damage a landed hit deals
    #[serde(default = "default_minimum")]
    pub minimum: u32,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            minimum: 1,
        }
    }
}

fn default_minimum() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConstants {
    /// Opponent turns a freshly applied status lasts
    #[serde(default = "default_applied_duration")]
    pub applied_duration: u8,
    /// Flat component of bleed damage per turn
    #[serde(default = "default_bleed_base")]
    pub bleed_base: f64,
    /// Bleed damage growth per elapsed turn
    #[serde(default = "default_bleed_per_turn")]
    pub bleed_per_turn: f64,
    /// Flat poison damage per turn
    #[serde(default = "default_poison_damage")]
    pub poison_damage: u32,
}

impl Default for StatusConstants {
    fn default() -> Self {
        StatusConstants {
            applied_duration: 3,
            bleed_base: 5.0,
            bleed_per_turn: 1.5,
            poison_damage: 8,
        }
    }
}

fn default_applied_duration() -> u8 {
    3
}
fn default_bleed_base() -> f64 {
    5.0
}
fn default_bleed_per_turn() -> f64 {
    1.5
}
fn default_poison_damage() -> u32 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = BalanceConstants::default();
        assert!((constants.crit.multiplier - 1.5).abs() < f64::EPSILON);
        assert!((constants.opponent.variance_min - 0.7).abs() < f64::EPSILON);
        assert_eq!(constants.damage.minimum, 1);
        assert_eq!(constants.status.applied_duration, 3);
        assert_eq!(constants.status.poison_damage, 8);
    }

    #[test]
    fn test_baked_matches_defaults() {
        let baked = BalanceConstants::baked();
        let defaults = BalanceConstants::default();

        assert!((baked.crit.multiplier - defaults.crit.multiplier).abs() < f64::EPSILON);
        assert_eq!(baked.opponent.default_attack, defaults.opponent.default_attack);
        assert_eq!(baked.status.applied_duration, defaults.status.applied_duration);
    }

    #[test]
    fn test_parse_constants() {
        let toml = r#"
[crit]
multiplier = 2.0

[opponent]
variance_min = 0.5
variance_max = 1.5
default_attack = 12
starting_hp = 100

[damage]
minimum = 2

[status]
applied_duration = 4
bleed_base = 6.0
bleed_per_turn = 2.0
poison_damage = 10
"#;
        let constants: BalanceConstants = toml::from_str(toml).unwrap();
        assert!((constants.crit.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(constants.opponent.default_attack, 12);
        assert_eq!(constants.status.applied_duration, 4);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[opponent]
default_attack = 15
"#;
        let constants: BalanceConstants = toml::from_str(toml).unwrap();
        assert_eq!(constants.opponent.default_attack, 15);
        assert!((constants.opponent.variance_min - 0.7).abs() < f64::EPSILON);
        assert!((constants.crit.multiplier - 1.5).abs() < f64::EPSILON);
    }
}
