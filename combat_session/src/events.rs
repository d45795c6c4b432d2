//! Presentational event stream
//!
//! Events mirror what just happened inside the engine so a UI layer can
//! animate damage numbers, status icons and the reward reveal. They are
//! not required for correctness; the completion signal and the combat log
//! are the authoritative outputs.

use combat_core::{DropBundle, SkillEffect, StatusKind};

use crate::session::SessionOutcome;

/// One presentational event emitted by the session driver
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new combat log line was narrated
    Narrated(String),
    /// The player's attack landed
    PlayerStruck {
        damage: u32,
        critical: bool,
        opponent_hp: u32,
    },
    /// A skill fired
    SkillFired {
        skill: String,
        effect: SkillEffect,
        value: u32,
    },
    /// A status was placed on the opponent
    StatusApplied { kind: StatusKind },
    /// A status dealt its periodic damage
    StatusDamage { kind: StatusKind, damage: u32 },
    /// A status ran out
    StatusExpired { kind: StatusKind },
    /// The opponent attacked (or the attack was evaded)
    OpponentStruck {
        damage: u32,
        evaded: bool,
        player_hp: u32,
    },
    /// A fresh opponent was engaged
    OpponentAdvanced { index: usize, name: String },
    /// Loot arrived and the reveal period started
    RewardRevealed { drops: DropBundle },
    /// The session reached its terminal state
    Completed { outcome: SessionOutcome },
}
