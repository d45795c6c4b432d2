//! The paced session driver
//!
//! One tokio task owns the [`Encounter`] for the lifetime of a session.
//! Turn transitions suspend on fixed wind-up delays (modelling animation
//! pacing); those delays and the loot call are the only suspension points,
//! and at most one transition is ever pending. Tearing the session down
//! cancels whatever is pending, so no state mutates after teardown.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use combat_core::{
    AdvanceReport, BalanceConstants, DropBundle, Encounter, EncounterSetup, EncounterState,
    OpponentTurnReport, PlayerTurnReport, SessionResult,
};

use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::reward::{
    HttpLootService, LootError, LootRequest, LootService, OpponentRef, RewardReconciler,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Pacing and timeout knobs for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wind-up before the player's attack resolves
    pub player_windup: Duration,
    /// Wind-up before the opponent's attack resolves
    pub opponent_windup: Duration,
    /// Reward reveal period after loot arrives
    pub reward_reveal: Duration,
    /// Upper bound on the loot service call
    pub loot_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            player_windup: Duration::from_millis(900),
            opponent_windup: Duration::from_millis(700),
            reward_reveal: Duration::from_secs(3),
            loot_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Zero pacing, for headless drivers and tests
    pub fn instant() -> Self {
        SessionConfig {
            player_windup: Duration::ZERO,
            opponent_windup: Duration::ZERO,
            reward_reveal: Duration::ZERO,
            loot_timeout: Duration::from_secs(10),
        }
    }
}

/// The completion signal, delivered exactly once per session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub result: SessionResult,
    pub remaining_hp: u32,
    /// Loot from a victory whose reconciliation succeeded
    pub drops: Option<DropBundle>,
}

/// Host-facing handle to a running session
///
/// The host reads events for rendering and awaits the completion signal;
/// the driver task is the only writer of combat state.
pub struct SessionHandle {
    event_tx: broadcast::Sender<SessionEvent>,
    completion_rx: oneshot::Receiver<SessionOutcome>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Subscribe to the presentational event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Await the completion signal
    pub async fn completed(self) -> Result<SessionOutcome, SessionError> {
        let SessionHandle {
            completion_rx,
            shutdown_tx,
            task,
            ..
        } = self;
        let outcome = completion_rx.await.map_err(|_| SessionError::TornDown)?;
        let _ = task.await;
        drop(shutdown_tx);
        Ok(outcome)
    }

    /// Tear the session down, cancelling any pending delayed transition
    pub async fn teardown(self) {
        let SessionHandle {
            shutdown_tx, task, ..
        } = self;
        let _ = shutdown_tx.send(());
        let _ = task.await;
    }
}

/// Start a combat session on the current tokio runtime
pub fn spawn(
    setup: EncounterSetup,
    constants: BalanceConstants,
    config: SessionConfig,
    loot: Arc<dyn LootService>,
) -> SessionHandle {
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let (completion_tx, completion_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let encounter = Encounter::new(setup, constants);
    let reconciler = RewardReconciler::new(loot, config.loot_timeout);

    let task = tokio::spawn(drive(
        encounter,
        config,
        reconciler,
        event_tx.clone(),
        completion_tx,
        shutdown_rx,
    ));

    SessionHandle {
        event_tx,
        completion_rx,
        shutdown_tx,
        task,
    }
}

/// Start a session wired to the production HTTP loot service
///
/// The auth token is used solely to authorize the loot call.
pub fn spawn_with_http(
    setup: EncounterSetup,
    constants: BalanceConstants,
    config: SessionConfig,
    endpoint: impl Into<String>,
    auth_token: impl Into<String>,
) -> Result<SessionHandle, LootError> {
    let service = HttpLootService::new(endpoint, auth_token, config.loot_timeout)?;
    Ok(spawn(setup, constants, config, Arc::new(service)))
}

/// Suspend for a wind-up delay; false means the session was torn down
async fn wait(shutdown_rx: &mut oneshot::Receiver<()>, delay: Duration) -> bool {
    tokio::select! {
        _ = &mut *shutdown_rx => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

async fn drive(
    mut encounter: Encounter,
    config: SessionConfig,
    mut reconciler: RewardReconciler,
    event_tx: broadcast::Sender<SessionEvent>,
    completion_tx: oneshot::Sender<SessionOutcome>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut rng = StdRng::from_entropy();
    let mut narrated = 0usize;
    let mut drops: Option<DropBundle> = None;
    emit_narration(&encounter, &mut narrated, &event_tx);

    loop {
        match encounter.state() {
            EncounterState::AwaitingPlayerTurn => {
                if !wait(&mut shutdown_rx, config.player_windup).await {
                    debug!("session torn down during player wind-up");
                    return;
                }
                match encounter.resolve_player_turn(&mut rng) {
                    Ok(report) => emit_player_report(&event_tx, &report),
                    Err(err) => {
                        error!(error = %err, "player turn rejected");
                        return;
                    }
                }
            }
            EncounterState::AwaitingOpponentTurn => {
                if !wait(&mut shutdown_rx, config.opponent_windup).await {
                    debug!("session torn down during opponent wind-up");
                    return;
                }
                match encounter.resolve_opponent_turn(&mut rng) {
                    Ok(report) => emit_opponent_report(&event_tx, &report),
                    Err(err) => {
                        error!(error = %err, "opponent turn rejected");
                        return;
                    }
                }
            }
            EncounterState::AdvancingOpponent => match encounter.advance_opponent() {
                Ok(report) => emit_advance_report(&event_tx, &report),
                Err(err) => {
                    error!(error = %err, "opponent advance rejected");
                    return;
                }
            },
            EncounterState::ReconcilingRewards => {
                let request = LootRequest {
                    opponents: encounter
                        .opponents()
                        .iter()
                        .map(|opponent| OpponentRef {
                            id: opponent.id.clone(),
                            kind: opponent.kind,
                        })
                        .collect(),
                };

                let resolved = tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("session torn down during reward reconciliation");
                        return;
                    }
                    resolved = reconciler.reconcile(request) => resolved,
                };

                if let Some(bundle) = &resolved {
                    let _ = event_tx.send(SessionEvent::RewardRevealed {
                        drops: bundle.clone(),
                    });
                    if !wait(&mut shutdown_rx, config.reward_reveal).await {
                        debug!("session torn down during reward reveal");
                        return;
                    }
                }
                drops = resolved;

                if let Err(err) = encounter.finish_rewards() {
                    error!(error = %err, "reward completion rejected");
                    return;
                }
            }
            EncounterState::Defeated | EncounterState::Completed => {
                emit_narration(&encounter, &mut narrated, &event_tx);
                let outcome = SessionOutcome {
                    result: encounter.result().unwrap_or(SessionResult::Victory),
                    remaining_hp: encounter.player().hp,
                    drops: drops.take(),
                };
                let _ = event_tx.send(SessionEvent::Completed {
                    outcome: outcome.clone(),
                });
                let _ = completion_tx.send(outcome);
                debug!("session completed");
                return;
            }
            state => {
                error!(?state, "driver observed a transient state");
                return;
            }
        }
        emit_narration(&encounter, &mut narrated, &event_tx);
    }
}

/// Forward freshly narrated log lines as events
fn emit_narration(
    encounter: &Encounter,
    narrated: &mut usize,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    for entry in &encounter.log().entries()[*narrated..] {
        let _ = event_tx.send(SessionEvent::Narrated(entry.clone()));
    }
    *narrated = encounter.log().len();
}

fn emit_player_report(event_tx: &broadcast::Sender<SessionEvent>, report: &PlayerTurnReport) {
    for activation in &report.activations {
        let _ = event_tx.send(SessionEvent::SkillFired {
            skill: activation.name.clone(),
            effect: activation.effect,
            value: activation.value,
        });
        if let Some(kind) = activation.status {
            let _ = event_tx.send(SessionEvent::StatusApplied { kind });
        }
    }
    let _ = event_tx.send(SessionEvent::PlayerStruck {
        damage: report.strike.total,
        critical: report.strike.critical,
        opponent_hp: report.strike.opponent_hp_after,
    });
}

fn emit_opponent_report(event_tx: &broadcast::Sender<SessionEvent>, report: &OpponentTurnReport) {
    for &(kind, damage) in &report.status_tick.damage {
        let _ = event_tx.send(SessionEvent::StatusDamage { kind, damage });
    }
    for &kind in &report.status_tick.expired {
        let _ = event_tx.send(SessionEvent::StatusExpired { kind });
    }
    if let Some(outcome) = &report.attack {
        let _ = event_tx.send(SessionEvent::OpponentStruck {
            damage: outcome.final_damage,
            evaded: outcome.evaded,
            player_hp: outcome.player_hp_after,
        });
    }
    for activation in &report.activations {
        let _ = event_tx.send(SessionEvent::SkillFired {
            skill: activation.name.clone(),
            effect: activation.effect,
            value: activation.value,
        });
        if let Some(kind) = activation.status {
            let _ = event_tx.send(SessionEvent::StatusApplied { kind });
        }
    }
}

fn emit_advance_report(event_tx: &broadcast::Sender<SessionEvent>, report: &AdvanceReport) {
    if let Some((index, name)) = &report.next {
        let _ = event_tx.send(SessionEvent::OpponentAdvanced {
            index: *index,
            name: name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pacing() {
        let config = SessionConfig::default();
        assert_eq!(config.reward_reveal, Duration::from_secs(3));
        assert_eq!(config.loot_timeout, Duration::from_secs(10));
        assert!(config.player_windup > Duration::ZERO);
    }

    #[test]
    fn test_instant_pacing_keeps_timeout() {
        let config = SessionConfig::instant();
        assert_eq!(config.player_windup, Duration::ZERO);
        assert_eq!(config.reward_reveal, Duration::ZERO);
        assert!(config.loot_timeout > Duration::ZERO);
    }
}
