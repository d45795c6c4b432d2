//! Combatant stats and hit point bookkeeping
//!
//! Hit points are only ever mutated through the methods here, which keep
//! them inside `[0, max_hp]` with saturating arithmetic. A shield pool
//! granted by skills absorbs incoming damage before hit points do.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::log::CombatLog;

/// Default substitutes for missing fields in a player snapshot
const DEFAULT_HP: u32 = 100;
const DEFAULT_ATTACK: u32 = 10;
const DEFAULT_DEFENSE: u32 = 5;
const DEFAULT_MAGIC_POWER: u32 = 10;
const DEFAULT_SPEED: u32 = 10;
const DEFAULT_CRIT_RATE: f64 = 5.0;
const DEFAULT_EVASION: f64 = 5.0;

/// Mutable combat stats for the player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantStats {
    pub max_hp: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub magic_power: u32,
    pub speed: u32,
    /// Critical strike chance in percentage points
    pub crit_rate: f64,
    /// Base evasion chance in percentage points
    pub evasion: f64,
    /// Absorb pool consumed before hit points
    #[serde(default)]
    pub shield: u32,
}

/// Raw player stats as supplied by the external profile at session start
///
/// Fields may be absent; sanitation substitutes defaults and narrates the
/// substitution in the combat log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub max_hp: Option<u32>,
    #[serde(default)]
    pub attack: Option<u32>,
    #[serde(default)]
    pub defense: Option<u32>,
    #[serde(default)]
    pub magic_power: Option<u32>,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub crit_rate: Option<f64>,
    #[serde(default)]
    pub evasion: Option<f64>,
}

/// Breakdown of a single damage application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedDamage {
    pub shield_absorbed: u32,
    pub hp_lost: u32,
}

impl CombatantStats {
    /// Build combat stats from a raw snapshot, substituting defaults for
    /// anything missing and narrating each substitution.
    pub fn from_snapshot(snapshot: &PlayerSnapshot, log: &mut CombatLog) -> Self {
        let max_hp = snapshot.max_hp.or(snapshot.hp).unwrap_or(DEFAULT_HP).max(1);
        let hp = snapshot.hp.unwrap_or(max_hp).min(max_hp);

        if snapshot.hp.is_none() && snapshot.max_hp.is_none() {
            warn!(default = DEFAULT_HP, "player snapshot missing hp");
            log.push(format!("Missing hit points, assuming {DEFAULT_HP}."));
        }

        let attack = match snapshot.attack {
            Some(value) if value > 0 => value,
            _ => {
                log.push(format!("Missing attack, assuming {DEFAULT_ATTACK}."));
                DEFAULT_ATTACK
            }
        };

        CombatantStats {
            max_hp,
            hp,
            attack,
            defense: snapshot.defense.unwrap_or(DEFAULT_DEFENSE),
            magic_power: snapshot.magic_power.unwrap_or(DEFAULT_MAGIC_POWER),
            speed: snapshot.speed.unwrap_or(DEFAULT_SPEED),
            crit_rate: snapshot.crit_rate.unwrap_or(DEFAULT_CRIT_RATE).max(0.0),
            evasion: snapshot.evasion.unwrap_or(DEFAULT_EVASION).max(0.0),
            shield: 0,
        }
    }

    /// Check whether the combatant is still standing
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Current hit points as a fraction of the maximum, in `[0, 1]`
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    /// Apply incoming damage, shield first, then hit points
    ///
    /// Hit points saturate at 0; the shield pool is consumed before any
    /// hit point is lost.
    pub fn apply_damage(&mut self, damage: u32) -> AppliedDamage {
        let shield_absorbed = damage.min(self.shield);
        self.shield -= shield_absorbed;

        let hp_lost = (damage - shield_absorbed).min(self.hp);
        self.hp -= hp_lost;

        AppliedDamage {
            shield_absorbed,
            hp_lost,
        }
    }

    /// Restore hit points, clamped to the maximum; returns the amount
    /// actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Grow the absorb pool
    pub fn gain_shield(&mut self, amount: u32) {
        self.shield = self.shield.saturating_add(amount);
    }

    /// Permanently raise attack for the rest of the session
    pub fn buff_attack(&mut self, amount: u32) {
        self.attack = self.attack.saturating_add(amount);
    }
}
