//! Damage resolution for player and opponent strikes
//!
//! The only code allowed to move hit points during an attack. Both
//! directions produce an outcome record with before/after values so the
//! caller can narrate and emit presentation events without re-deriving
//! anything. Every random draw is independent per invocation; damage is
//! always a non-negative integer and hit points never leave `[0, max]`.

use rand::Rng;

use crate::config::BalanceConstants;
use crate::opponent::Opponent;
use crate::stats::CombatantStats;
use crate::types::ClassId;

/// Outcome of the player striking the current opponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeOutcome {
    /// Class formula roll before the critical multiplier
    pub base_damage: u32,
    pub critical: bool,
    /// Bonus damage contributed by skills fired on this attack
    pub skill_bonus: u32,
    /// Damage actually dealt
    pub total: u32,
    pub opponent_hp_before: u32,
    pub opponent_hp_after: u32,
    pub defeated: bool,
}

impl StrikeOutcome {
    /// Narrated one-liner for the combat log
    pub fn summary(&self, opponent_name: &str) -> String {
        if self.critical {
            format!(
                "You strike {opponent_name} for {} damage. Critical hit!",
                self.total
            )
        } else {
            format!("You strike {opponent_name} for {} damage.", self.total)
        }
    }
}

/// Outcome of the current opponent striking the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingOutcome {
    pub evaded: bool,
    /// Damage after class reduction and the minimum floor (0 when evaded)
    pub final_damage: u32,
    /// Portion soaked by the shield pool
    pub shield_absorbed: u32,
    pub player_hp_after: u32,
    pub defeated: bool,
}

impl IncomingOutcome {
    /// Narrated one-liner for the combat log
    pub fn summary(&self, opponent_name: &str) -> String {
        if self.evaded {
            format!("You evade {opponent_name}'s attack.")
        } else if self.shield_absorbed > 0 {
            format!(
                "{opponent_name} hits you for {} damage ({} absorbed by your shield).",
                self.final_damage, self.shield_absorbed
            )
        } else {
            format!("{opponent_name} hits you for {} damage.", self.final_damage)
        }
    }
}

/// Resolve the player's attack against the current opponent
///
/// `total = floor(base * crit_multiplier) + skill_bonus`, floored to the
/// configured minimum, then applied to the opponent's encounter-local hit
/// points.
pub fn resolve_player_strike(
    class: ClassId,
    stats: &CombatantStats,
    first_attack: bool,
    skill_bonus: u32,
    opponent: &mut Opponent,
    constants: &BalanceConstants,
    rng: &mut impl Rng,
) -> StrikeOutcome {
    let base_damage = class.base_damage(stats, rng);

    let crit_chance = class.crit_chance(stats, first_attack);
    let critical = rng.gen_range(0.0..100.0) < crit_chance;

    let mut total = if critical {
        (base_damage as f64 * constants.crit.multiplier).floor() as u32
    } else {
        base_damage
    };
    total = (total + skill_bonus).max(constants.damage.minimum);

    let opponent_hp_before = opponent.hp;
    opponent.apply_damage(total);

    StrikeOutcome {
        base_damage,
        critical,
        skill_bonus,
        total,
        opponent_hp_before,
        opponent_hp_after: opponent.hp,
        defeated: !opponent.is_alive(),
    }
}

/// Resolve the current opponent's attack against the player
///
/// An evasion roll against `base_evasion + class_bonus` short-circuits the
/// whole pipeline; a landed hit is reduced by the class defense formula and
/// floored to the configured minimum before it touches shield and hit
/// points.
pub fn resolve_opponent_strike(
    class: ClassId,
    stats: &mut CombatantStats,
    opponent: &Opponent,
    constants: &BalanceConstants,
    rng: &mut impl Rng,
) -> IncomingOutcome {
    let evade_chance = stats.evasion + class.evasion_bonus(stats);
    if rng.gen_range(0.0..100.0) < evade_chance {
        return IncomingOutcome {
            evaded: true,
            final_damage: 0,
            shield_absorbed: 0,
            player_hp_after: stats.hp,
            defeated: false,
        };
    }

    let raw = opponent.attack as f64
        * rng.gen_range(constants.opponent.variance_min..=constants.opponent.variance_max);
    let reduced = class.reduce_incoming(raw, stats);
    let final_damage = (reduced.floor() as u32).max(constants.damage.minimum);

    let applied = stats.apply_damage(final_damage);

    IncomingOutcome {
        evaded: false,
        final_damage,
        shield_absorbed: applied.shield_absorbed,
        player_hp_after: stats.hp,
        defeated: !stats.is_alive(),
    }
}
