//! combat_core - Turn-based combat resolution engine
//!
//! This library provides:
//! - Encounter: the turn state machine over an ordered opponent list
//! - Damage resolution: per-class attack/defense formulas with crit and
//!   evasion rolls
//! - SkillBook: trigger/cooldown evaluation for profile-supplied skills
//! - StatusSet: timed bleed/poison/confusion effects
//! - Balance and loadout configuration from TOML
//!
//! Everything here is synchronous and free of I/O; the pacing delays and
//! the loot-service call live in the session driver crate.

pub mod class;
pub mod config;
pub mod damage;
pub mod encounter;
pub mod log;
pub mod opponent;
pub mod rewards;
pub mod skills;
pub mod stats;
pub mod status;
pub mod types;

// Re-export core types for convenience
pub use config::{BalanceConstants, ConfigError};
pub use damage::{IncomingOutcome, StrikeOutcome};
pub use encounter::{
    AdvanceReport, Encounter, EncounterError, EncounterSetup, EncounterState, OpponentTurnReport,
    PlayerTurnReport,
};
pub use log::CombatLog;
pub use opponent::{Opponent, OpponentSpec};
pub use rewards::{CardBonus, DropBundle, DropCard, DropItem};
pub use skills::{Skill, SkillActivation, SkillBook, SkillCondition};
pub use stats::{CombatantStats, PlayerSnapshot};
pub use status::{ActiveStatus, StatusSet, StatusTick};
pub use types::{ClassId, OpponentKind, SessionResult, SkillEffect, SkillTrigger, StatusKind};
