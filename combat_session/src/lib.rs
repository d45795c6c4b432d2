//! combat_session - Paced driver for the combat resolution engine
//!
//! This library provides:
//! - spawn: run an [`combat_core::Encounter`] on a tokio task with
//!   wind-up delays between turn transitions
//! - SessionHandle: event subscription, completion signal, teardown
//! - RewardReconciler: the single outbound loot-service call with
//!   timeout, in-flight guarding and failure degradation

pub mod error;
pub mod events;
pub mod reward;
pub mod session;

pub use error::SessionError;
pub use events::SessionEvent;
pub use reward::{
    HttpLootService, LootError, LootRequest, LootResponse, LootService, OpponentRef,
    RewardReconciler,
};
pub use session::{spawn, spawn_with_http, SessionConfig, SessionHandle, SessionOutcome};
