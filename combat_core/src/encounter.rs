//! The encounter sequencer
//!
//! Owns the ordered opponent list and the turn state machine for one
//! combat session. Exactly one of player turn or opponent turn is active
//! at any time, and the session is always in exactly one
//! [`EncounterState`]. The transitions here are synchronous; the pacing
//! delays between them and the reward I/O belong to the session driver.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BalanceConstants;
use crate::damage::{resolve_opponent_strike, resolve_player_strike, IncomingOutcome, StrikeOutcome};
use crate::log::CombatLog;
use crate::opponent::{Opponent, OpponentSpec};
use crate::skills::{Skill, SkillActivation, SkillBook};
use crate::stats::{CombatantStats, PlayerSnapshot};
use crate::status::{StatusSet, StatusTick};
use crate::types::{ClassId, SessionResult, SkillEffect, SkillTrigger};

/// The session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterState {
    AwaitingPlayerTurn,
    ResolvingPlayerAttack,
    AwaitingOpponentTurn,
    ResolvingOpponentAttack,
    AdvancingOpponent,
    ReconcilingRewards,
    Defeated,
    Completed,
}

impl EncounterState {
    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, EncounterState::Defeated | EncounterState::Completed)
    }
}

/// Per-opponent flags, reset whenever a fresh opponent is engaged
///
/// Kept as an explicit record so nothing leaks from one opponent to the
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterFlags {
    /// The opening attack against the current opponent has not happened yet
    pub first_attack_available: bool,
}

impl EncounterFlags {
    fn fresh() -> Self {
        EncounterFlags {
            first_attack_available: true,
        }
    }
}

/// Session start parameters supplied by the external profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterSetup {
    pub class: ClassId,
    pub player: PlayerSnapshot,
    pub opponents: Vec<OpponentSpec>,
    pub skills: Vec<Skill>,
}

/// A transition was requested in a state that does not allow it
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncounterError {
    #[error("player turn resolution requested in state {0:?}")]
    NotPlayerTurn(EncounterState),
    #[error("opponent turn resolution requested in state {0:?}")]
    NotOpponentTurn(EncounterState),
    #[error("opponent advance requested in state {0:?}")]
    NotAdvancing(EncounterState),
    #[error("reward completion requested in state {0:?}")]
    NotReconciling(EncounterState),
}

/// Result of one resolved player turn
#[derive(Debug, Clone)]
pub struct PlayerTurnReport {
    /// 1-based count of resolved player turns
    pub turn: u32,
    pub activations: Vec<SkillActivation>,
    pub strike: StrikeOutcome,
    /// State after the transition
    pub state: EncounterState,
}

/// Result of one resolved opponent turn
#[derive(Debug, Clone)]
pub struct OpponentTurnReport {
    pub status_tick: StatusTick,
    /// The opponent's own attack; `None` when it was skipped (confusion,
    /// or the opponent fell to periodic damage first)
    pub attack: Option<IncomingOutcome>,
    pub activations: Vec<SkillActivation>,
    pub state: EncounterState,
}

/// Result of advancing past a fallen opponent
#[derive(Debug, Clone)]
pub struct AdvanceReport {
    /// Index and name of the freshly engaged opponent, if any remain
    pub next: Option<(usize, String)>,
    pub state: EncounterState,
}

/// One combat session against an ordered list of opponents
#[derive(Debug, Clone)]
pub struct Encounter {
    class: ClassId,
    player: CombatantStats,
    opponents: Vec<Opponent>,
    current: usize,
    state: EncounterState,
    flags: EncounterFlags,
    skills: SkillBook,
    statuses: StatusSet,
    log: CombatLog,
    turn: u32,
    constants: BalanceConstants,
}

impl Encounter {
    /// Start a session from raw setup parameters
    ///
    /// Inputs are sanitized with defaults substituted and narrated; the
    /// player always acts first. Start-of-battle skills fire here.
    pub fn new(setup: EncounterSetup, constants: BalanceConstants) -> Self {
        let mut log = CombatLog::new();
        let player = CombatantStats::from_snapshot(&setup.player, &mut log);
        let opponents: Vec<Opponent> = setup
            .opponents
            .iter()
            .enumerate()
            .map(|(index, spec)| Opponent::sanitize(spec, index, &constants.opponent, &mut log))
            .collect();

        let mut encounter = Encounter {
            class: setup.class,
            player,
            opponents,
            current: 0,
            state: EncounterState::AwaitingPlayerTurn,
            flags: EncounterFlags::fresh(),
            skills: SkillBook::new(setup.skills),
            statuses: StatusSet::new(),
            log,
            turn: 0,
            constants,
        };

        if encounter.opponents.is_empty() {
            encounter
                .log
                .push("No opponents presented themselves.".to_string());
            encounter.state = EncounterState::ReconcilingRewards;
            return encounter;
        }

        encounter.narrate_engagement();

        let hp_fraction = encounter.player.hp_fraction();
        let opening = encounter.skills.fire(SkillTrigger::OnStartBattle, hp_fraction);
        encounter.apply_activations(&opening, false);
        if !encounter.opponents[encounter.current].is_alive() {
            encounter.narrate_opponent_down();
            encounter.state = EncounterState::AdvancingOpponent;
        }

        encounter
    }

    // === Accessors (read-only to the host) ===

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn player(&self) -> &CombatantStats {
        &self.player
    }

    pub fn opponents(&self) -> &[Opponent] {
        &self.opponents
    }

    pub fn current_opponent(&self) -> Option<&Opponent> {
        self.opponents.get(self.current)
    }

    pub fn statuses(&self) -> &StatusSet {
        &self.statuses
    }

    pub fn skills(&self) -> &SkillBook {
        &self.skills
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// 1-based count of resolved player turns
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Terminal result, once one of the terminal states is reached
    pub fn result(&self) -> Option<SessionResult> {
        match self.state {
            EncounterState::Completed => Some(SessionResult::Victory),
            EncounterState::Defeated => Some(SessionResult::Settlement),
            _ => None,
        }
    }

    // === Transitions ===

    /// Resolve one player attack
    ///
    /// Fires on-attack skills, rolls the strike, and moves the machine to
    /// the opponent's turn, or to advancing when the opponent fell. Skill
    /// cooldowns tick down at the end of the turn unless this very attack
    /// defeated the final opponent.
    pub fn resolve_player_turn(
        &mut self,
        rng: &mut impl Rng,
    ) -> Result<PlayerTurnReport, EncounterError> {
        if self.state != EncounterState::AwaitingPlayerTurn {
            return Err(EncounterError::NotPlayerTurn(self.state));
        }
        self.state = EncounterState::ResolvingPlayerAttack;
        self.turn += 1;

        let activations = self
            .skills
            .fire(SkillTrigger::OnAttack, self.player.hp_fraction());
        let skill_bonus = self.apply_activations(&activations, true);

        let first_attack = self.flags.first_attack_available;
        self.flags.first_attack_available = false;

        let strike = resolve_player_strike(
            self.class,
            &self.player,
            first_attack,
            skill_bonus,
            &mut self.opponents[self.current],
            &self.constants,
            rng,
        );
        self.log
            .push(strike.summary(&self.opponents[self.current].name));

        if strike.defeated {
            self.narrate_opponent_down();
            self.state = EncounterState::AdvancingOpponent;
            // The turn that fells the last opponent ends the battle; no
            // cooldown ticks after it.
            if self.remaining_after_current() > 0 {
                self.skills.tick_cooldowns();
            }
        } else {
            self.state = EncounterState::AwaitingOpponentTurn;
            self.skills.tick_cooldowns();
        }

        Ok(PlayerTurnReport {
            turn: self.turn,
            activations,
            strike,
            state: self.state,
        })
    }

    /// Resolve one opponent turn
    ///
    /// Statuses resolve first, before the opponent's own attack. A
    /// confused opponent, or one felled by its wounds, does not attack.
    /// Hit-reaction and low-hp skills fire after damage lands.
    pub fn resolve_opponent_turn(
        &mut self,
        rng: &mut impl Rng,
    ) -> Result<OpponentTurnReport, EncounterError> {
        if self.state != EncounterState::AwaitingOpponentTurn {
            return Err(EncounterError::NotOpponentTurn(self.state));
        }
        self.state = EncounterState::ResolvingOpponentAttack;

        let status_tick = self.statuses.tick(self.turn, &self.constants.status);
        self.narrate_status_tick(&status_tick);
        if status_tick.total_damage > 0 {
            self.opponents[self.current].apply_damage(status_tick.total_damage);
        }

        if !self.opponents[self.current].is_alive() {
            self.narrate_opponent_down();
            self.state = EncounterState::AdvancingOpponent;
            return Ok(OpponentTurnReport {
                status_tick,
                attack: None,
                activations: Vec::new(),
                state: self.state,
            });
        }

        let mut activations = Vec::new();
        let attack = if status_tick.confused {
            self.log.push(format!(
                "{} is confused and fumbles its attack.",
                self.opponents[self.current].name
            ));
            None
        } else {
            let outcome = resolve_opponent_strike(
                self.class,
                &mut self.player,
                &self.opponents[self.current],
                &self.constants,
                rng,
            );
            self.log
                .push(outcome.summary(&self.opponents[self.current].name));

            if !outcome.evaded {
                let fired = self
                    .skills
                    .fire(SkillTrigger::OnReceiveHit, self.player.hp_fraction());
                self.apply_activations(&fired, false);
                activations.extend(fired);
            }
            Some(outcome)
        };

        // Low-hp skills are checked once per opponent turn, after damage
        // has been applied.
        let fired = self
            .skills
            .fire(SkillTrigger::OnHpBelow, self.player.hp_fraction());
        self.apply_activations(&fired, false);
        activations.extend(fired);

        if !self.player.is_alive() {
            self.log
                .push("You collapse. The encounter is settled.".to_string());
            self.state = EncounterState::Defeated;
        } else if !self.opponents[self.current].is_alive() {
            // A hit-reaction skill finished the opponent off
            self.narrate_opponent_down();
            self.state = EncounterState::AdvancingOpponent;
        } else {
            self.state = EncounterState::AwaitingPlayerTurn;
        }

        Ok(OpponentTurnReport {
            status_tick,
            attack,
            activations,
            state: self.state,
        })
    }

    /// Step past a fallen opponent
    ///
    /// The next opponent (if any) enters at full local hit points with a
    /// clean status slate and the opening-attack flag restored, and the
    /// player gets the next attack. With no opponents left the machine
    /// moves to reward reconciliation.
    pub fn advance_opponent(&mut self) -> Result<AdvanceReport, EncounterError> {
        if self.state != EncounterState::AdvancingOpponent {
            return Err(EncounterError::NotAdvancing(self.state));
        }

        let next = if self.remaining_after_current() > 0 {
            self.current += 1;
            self.opponents[self.current].hp = self.constants.opponent.starting_hp;
            self.flags = EncounterFlags::fresh();
            self.statuses.clear();
            self.state = EncounterState::AwaitingPlayerTurn;
            self.narrate_engagement();
            Some((self.current, self.opponents[self.current].name.clone()))
        } else {
            self.log.push("Victory! Claiming the spoils...".to_string());
            self.state = EncounterState::ReconcilingRewards;
            None
        };

        Ok(AdvanceReport {
            next,
            state: self.state,
        })
    }

    /// Close out reward reconciliation and complete the session
    ///
    /// Called by the driver whether the loot request succeeded or failed;
    /// either way the session terminates as a victory.
    pub fn finish_rewards(&mut self) -> Result<(), EncounterError> {
        if self.state != EncounterState::ReconcilingRewards {
            return Err(EncounterError::NotReconciling(self.state));
        }
        self.log.push("The encounter is over.".to_string());
        self.state = EncounterState::Completed;
        Ok(())
    }

    // === Internals ===

    fn remaining_after_current(&self) -> usize {
        self.opponents.len().saturating_sub(self.current + 1)
    }

    /// Apply fired skills to the battlefield
    ///
    /// With `gather_bonus` set, deal-damage effects accumulate into the
    /// returned bonus for the strike being resolved instead of landing
    /// immediately.
    fn apply_activations(&mut self, activations: &[SkillActivation], gather_bonus: bool) -> u32 {
        let mut bonus = 0;
        for activation in activations {
            match activation.effect {
                SkillEffect::DealDamage => {
                    if gather_bonus {
                        bonus += activation.value;
                        self.log.push(format!(
                            "{} charges the attack with {} bonus damage.",
                            activation.name, activation.value
                        ));
                    } else if let Some(opponent) = self.opponents.get_mut(self.current) {
                        opponent.apply_damage(activation.value);
                        self.log.push(format!(
                            "{} strikes {} for {} damage.",
                            activation.name, opponent.name, activation.value
                        ));
                    }
                }
                SkillEffect::GainShield => {
                    self.player.gain_shield(activation.value);
                    self.log.push(format!(
                        "{} raises a {}-point shield.",
                        activation.name, activation.value
                    ));
                }
                SkillEffect::Heal => {
                    let healed = self.player.heal(activation.value);
                    self.log.push(format!(
                        "{} restores {healed} hit points.",
                        activation.name
                    ));
                }
                SkillEffect::BuffAttack => {
                    self.player.buff_attack(activation.value);
                    self.log.push(format!(
                        "{} raises your attack by {}.",
                        activation.name, activation.value
                    ));
                }
                SkillEffect::DebuffEnemy => {
                    if let Some(opponent) = self.opponents.get_mut(self.current) {
                        opponent.attack = opponent.attack.saturating_sub(activation.value).max(1);
                        self.log.push(format!(
                            "{} saps {}'s attack by {}.",
                            activation.name, opponent.name, activation.value
                        ));
                    }
                }
            }

            if let Some(kind) = activation.status {
                if let Some(opponent) = self.opponents.get(self.current) {
                    let name = opponent.name.clone();
                    self.statuses.apply(
                        kind,
                        activation.source.clone(),
                        self.constants.status.applied_duration,
                    );
                    self.log
                        .push(format!("{name} is afflicted with {}.", kind.name()));
                }
            }
        }
        bonus
    }

    fn narrate_engagement(&mut self) {
        let opponent = &self.opponents[self.current];
        let line = if opponent.is_boss() {
            format!("{} blocks your path!", opponent.name)
        } else {
            format!("{} steps forward!", opponent.name)
        };
        self.log.push(line);
    }

    fn narrate_opponent_down(&mut self) {
        let name = self.opponents[self.current].name.clone();
        self.log.push(format!("{name} is defeated!"));
    }

    fn narrate_status_tick(&mut self, tick: &StatusTick) {
        let name = self.opponents[self.current].name.clone();
        for (kind, damage) in &tick.damage {
            self.log
                .push(format!("{name} suffers {damage} {} damage.", kind.name()));
        }
        for kind in &tick.expired {
            self.log
                .push(format!("{} on {name} wears off.", kind.name()));
        }
    }
}
