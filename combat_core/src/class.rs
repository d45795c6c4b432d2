//! Per-class combat formulas
//!
//! Each playable class is a fixed policy object: how it rolls base damage,
//! how it shrugs off incoming hits, how its critical chance is computed,
//! and any evasion bonus on top of the base stat. The class is selected
//! once at session start and never swapped mid-combat, so dispatch is a
//! closed `match` on [`ClassId`] rather than a lookup table.
//!
//! Formula summary:
//! - Warrior: `attack * uniform(0.7, 1.2)`, halves defense against hits
//! - Mage: `magic_power * uniform(0.8, 1.3)`, wards with magic power
//! - Rogue: `attack * uniform(0.6, 1.4)`, swingy; evades `speed * 0.5`
//!   extra percentage points
//! - Archer: `attack * uniform(0.75, 1.25)`, +25 crit points on the very
//!   first attack against a fresh opponent

use rand::Rng;

use crate::stats::CombatantStats;
use crate::types::ClassId;

/// Extra critical chance for an archer's opening shot, in percentage points
const ARCHER_FIRST_ATTACK_CRIT_BONUS: f64 = 25.0;

/// Extra critical chance for a mage, in percentage points
const MAGE_CRIT_BONUS: f64 = 5.0;

/// Rogue critical chance scaling per point of speed
const ROGUE_CRIT_PER_SPEED: f64 = 0.3;

/// Rogue evasion bonus per point of speed, in percentage points
const ROGUE_EVASION_PER_SPEED: f64 = 0.5;

impl ClassId {
    /// Roll base attack damage with this class's bounded random multiplier
    ///
    /// The result is a non-negative integer; the critical multiplier and
    /// skill bonus damage are applied by the damage resolver, not here.
    pub fn base_damage(&self, stats: &CombatantStats, rng: &mut impl Rng) -> u32 {
        let (stat, lo, hi) = match self {
            ClassId::Warrior => (stats.attack, 0.7, 1.2),
            ClassId::Mage => (stats.magic_power, 0.8, 1.3),
            ClassId::Rogue => (stats.attack, 0.6, 1.4),
            ClassId::Archer => (stats.attack, 0.75, 1.25),
        };
        (stat as f64 * rng.gen_range(lo..=hi)).floor() as u32
    }

    /// Reduce an incoming raw hit using this class's defense formula
    ///
    /// Returns the reduced damage before the resolver's minimum-damage
    /// floor is applied.
    pub fn reduce_incoming(&self, raw: f64, stats: &CombatantStats) -> f64 {
        let reduction = match self {
            ClassId::Warrior => stats.defense as f64 / 2.0,
            ClassId::Mage => stats.defense as f64 / 4.0 + stats.magic_power as f64 / 10.0,
            ClassId::Rogue => stats.defense as f64 / 4.0,
            ClassId::Archer => stats.defense as f64 / 3.0,
        };
        (raw - reduction).max(0.0)
    }

    /// Critical strike chance in percentage points
    ///
    /// `first_attack` is true only for the opening attack against the
    /// current opponent; only the archer profile cares.
    pub fn crit_chance(&self, stats: &CombatantStats, first_attack: bool) -> f64 {
        match self {
            ClassId::Warrior => stats.crit_rate,
            ClassId::Mage => stats.crit_rate + MAGE_CRIT_BONUS,
            ClassId::Rogue => stats.crit_rate + stats.speed as f64 * ROGUE_CRIT_PER_SPEED,
            ClassId::Archer => {
                if first_attack {
                    stats.crit_rate + ARCHER_FIRST_ATTACK_CRIT_BONUS
                } else {
                    stats.crit_rate
                }
            }
        }
    }

    /// Evasion bonus on top of the base evasion stat, in percentage points
    pub fn evasion_bonus(&self, stats: &CombatantStats) -> f64 {
        match self {
            ClassId::Rogue => stats.speed as f64 * ROGUE_EVASION_PER_SPEED,
            _ => 0.0,
        }
    }
}
