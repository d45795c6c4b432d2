//! Timed status effects on the current opponent
//!
//! At most one instance of each [`StatusKind`] can exist on a target; a new
//! application overwrites the old one rather than stacking. Durations are
//! counted in opponent turns: each tick deals the periodic damage, then
//! decrements, then deletes anything that ran out.

use serde::{Deserialize, Serialize};

use crate::config::StatusConstants;
use crate::types::StatusKind;

/// One active status instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    /// Remaining opponent turns
    pub duration: u8,
    /// Skill id that applied the status
    pub source: String,
}

/// Result of resolving statuses for one opponent turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Periodic damage dealt, per effect
    pub damage: Vec<(StatusKind, u32)>,
    pub total_damage: u32,
    /// The opponent was confused this turn and skips its attack
    pub confused: bool,
    /// Effects whose duration ran out this tick
    pub expired: Vec<StatusKind>,
}

/// The set of statuses on the current opponent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSet {
    effects: Vec<ActiveStatus>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active effect of a given kind, if present
    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply a status, overwriting any existing instance of the same kind
    ///
    /// Returns true when an existing instance was overwritten.
    pub fn apply(&mut self, kind: StatusKind, source: impl Into<String>, duration: u8) -> bool {
        let fresh = ActiveStatus {
            kind,
            duration,
            source: source.into(),
        };
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            *existing = fresh;
            true
        } else {
            self.effects.push(fresh);
            false
        }
    }

    /// Drop every effect (a fresh opponent starts clean)
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Resolve statuses for one opponent turn, before the opponent acts
    ///
    /// Deals the periodic damage (bleed scales with the turn count, poison
    /// is flat), decrements every duration by exactly 1, and deletes
    /// effects that reached 0.
    pub fn tick(&mut self, turn_count: u32, constants: &StatusConstants) -> StatusTick {
        let mut result = StatusTick::default();

        for effect in &mut self.effects {
            let damage = match effect.kind {
                StatusKind::Bleed => {
                    (constants.bleed_base + turn_count as f64 * constants.bleed_per_turn).floor()
                        as u32
                }
                StatusKind::Poison => constants.poison_damage,
                StatusKind::Confusion => {
                    result.confused = true;
                    0
                }
            };
            if damage > 0 {
                result.damage.push((effect.kind, damage));
                result.total_damage += damage;
            }

            effect.duration = effect.duration.saturating_sub(1);
            if effect.duration == 0 {
                result.expired.push(effect.kind);
            }
        }

        self.effects.retain(|e| e.duration > 0);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> StatusConstants {
        StatusConstants::default()
    }

    #[test]
    fn test_apply_overwrites_same_kind() {
        let mut set = StatusSet::new();
        assert!(!set.apply(StatusKind::Bleed, "serrated_arrows", 3));
        set.tick(1, &constants());
        assert_eq!(set.get(StatusKind::Bleed).unwrap().duration, 2);

        // Re-application resets duration instead of stacking
        assert!(set.apply(StatusKind::Bleed, "crushing_blow", 3));
        let bleed = set.get(StatusKind::Bleed).unwrap();
        assert_eq!(bleed.duration, 3);
        assert_eq!(bleed.source, "crushing_blow");
    }

    #[test]
    fn test_bleed_scales_with_turn_count() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Bleed, "s", 3);

        // floor(5 + 1 * 1.5) = 6
        let tick = set.tick(1, &constants());
        assert_eq!(tick.total_damage, 6);

        // floor(5 + 4 * 1.5) = 11
        set.apply(StatusKind::Bleed, "s", 3);
        let tick = set.tick(4, &constants());
        assert_eq!(tick.total_damage, 11);
    }

    #[test]
    fn test_poison_is_flat() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Poison, "s", 3);

        let first = set.tick(1, &constants());
        let second = set.tick(9, &constants());
        assert_eq!(first.total_damage, 8);
        assert_eq!(second.total_damage, 8);
    }

    #[test]
    fn test_duration_decrements_and_expires() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Poison, "s", 1);

        // Deals its flat damage once, then is gone the following turn
        let tick = set.tick(1, &constants());
        assert_eq!(tick.total_damage, 8);
        assert_eq!(tick.expired, vec![StatusKind::Poison]);

        let tick = set.tick(2, &constants());
        assert_eq!(tick.total_damage, 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_duration_strictly_decreases() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Bleed, "s", 3);

        for expected in [2u8, 1] {
            set.tick(1, &constants());
            assert_eq!(set.get(StatusKind::Bleed).unwrap().duration, expected);
        }
        set.tick(1, &constants());
        assert!(set.get(StatusKind::Bleed).is_none());
    }

    #[test]
    fn test_confusion_marks_turn_without_damage() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Confusion, "hex", 2);

        let tick = set.tick(1, &constants());
        assert!(tick.confused);
        assert_eq!(tick.total_damage, 0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut set = StatusSet::new();
        set.apply(StatusKind::Bleed, "s", 3);
        set.apply(StatusKind::Poison, "s", 3);

        set.clear();
        assert!(set.is_empty());
    }
}
