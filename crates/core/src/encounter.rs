//! Encounter facade - the command surface of the simulation
//!
//! An [`Encounter`] owns the board, the duel state, the ladder and the RNG.
//! Callers issue commands (`submit_swap`, `activate_ability`,
//! `request_hint`, `next_level`) and then pump [`Encounter::advance`] until it
//! returns `None`, pausing between phases as they see fit. At most one resolve
//! is in flight; commands that arrive meanwhile are rejected with
//! [`CommandError::Busy`].
//!
//! # Example
//!
//! ```
//! use krush_core::{Encounter, EncounterConfig};
//! use krush_core::types::{EncounterStatus, PieceKind};
//!
//! let mut enc = Encounter::start(EncounterConfig {
//!     character: PieceKind::SubZero,
//!     seed: 7,
//!     ..EncounterConfig::default()
//! })
//! .unwrap();
//!
//! let (a, b) = enc.request_hint().unwrap();
//! let from = enc.board().find_id(a).unwrap();
//! let to = enc.board().find_id(b).unwrap();
//! enc.submit_swap(from, to).unwrap();
//! enc.run_to_settle().unwrap();
//!
//! assert!(enc.combat().opponent_health < enc.opponent().max_health);
//! assert_eq!(enc.status(), EncounterStatus::Playing);
//! ```

use arrayvec::ArrayVec;

use crate::ability::Ability;
use crate::advisor::find_possible_move;
use crate::board::{Board, PieceId};
use crate::cascade::{Cascade, Phase, Table, Trigger};
use crate::combat::{CombatState, MeterPolicy, OpponentTurn};
use crate::error::{CommandError, CoreError, EncounterError};
use crate::event::EngineEvent;
use crate::generator::{create_initial_board, regenerate};
use crate::ladder::{active_pool, build_ladder, Opponent};
use crate::rng::SimpleRng;
use crate::snapshot::{EncounterSnapshot, OpponentSnapshot};
use crate::types::{
    AbilityPhase, Difficulty, EncounterStatus, Outcome, PieceKind, Pos, ABILITY_METER_MAX,
    PLAYER_MAX_HEALTH,
};

/// Everything needed to start a ladder run
#[derive(Debug, Clone)]
pub struct EncounterConfig {
    pub character: PieceKind,
    pub difficulty: Difficulty,
    pub seed: u32,
    /// Floor player health at 1 (tutorial-style play)
    pub non_lethal: bool,
    pub meter_policy: MeterPolicy,
    /// Use these opponents instead of drawing a ladder
    pub ladder: Option<Vec<Opponent>>,
    /// Start from this board instead of generating one
    pub board: Option<Board>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            character: PieceKind::SubZero,
            difficulty: Difficulty::Normal,
            seed: 1,
            non_lethal: false,
            meter_policy: MeterPolicy::OwnKind,
            ladder: None,
            board: None,
        }
    }
}

/// Result of an accepted `activate_ability` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityProgress {
    /// Waiting for more targets
    Aiming { remaining: usize },
    /// Aiming was cancelled; the ability is ready again
    Cancelled,
    /// The ability fired; pump `advance` to resolve it
    Executing,
}

pub struct Encounter {
    character: PieceKind,
    ability: Ability,
    difficulty: Difficulty,
    seed: u32,
    non_lethal: bool,
    meter_policy: MeterPolicy,
    ladder: Vec<Opponent>,
    level: usize,
    pool: ArrayVec<PieceKind, 9>,
    board: Board,
    combat: CombatState,
    rng: SimpleRng,
    status: EncounterStatus,
    cascade: Option<Cascade>,
    aim: ArrayVec<Pos, 2>,
    events: Vec<EngineEvent>,
}

impl Encounter {
    /// Start a ladder run at its first opponent
    pub fn start(config: EncounterConfig) -> Result<Self, CoreError> {
        let mut rng = SimpleRng::new(config.seed);
        let ladder = match config.ladder {
            Some(ladder) => ladder,
            None => build_ladder(config.character, config.difficulty, &mut rng),
        };
        let first = ladder.first().ok_or(CoreError::EmptyLadder)?;
        let combat = CombatState::new(first);
        let pool = active_pool(config.character, &ladder);
        let board = match config.board {
            Some(board) => board,
            None => create_initial_board(&pool, &mut rng)?,
        };

        tracing::info!(
            character = config.character.as_str(),
            difficulty = config.difficulty.as_str(),
            seed = config.seed,
            opponent = %first.name,
            "encounter started"
        );

        Ok(Self {
            character: config.character,
            ability: Ability::for_character(config.character),
            difficulty: config.difficulty,
            seed: config.seed,
            non_lethal: config.non_lethal,
            meter_policy: config.meter_policy,
            ladder,
            level: 0,
            pool,
            board,
            combat,
            rng,
            status: EncounterStatus::Playing,
            cascade: None,
            aim: ArrayVec::new(),
            events: Vec::new(),
        })
    }

    // Accessors

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn combat(&self) -> &CombatState {
        &self.combat
    }

    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    pub fn character(&self) -> PieceKind {
        self.character
    }

    pub fn ability(&self) -> Ability {
        self.ability
    }

    pub fn ability_phase(&self) -> AbilityPhase {
        self.combat.ability_phase
    }

    /// Current opponent
    pub fn opponent(&self) -> &Opponent {
        // `level` only ever indexes a non-empty ladder within bounds
        &self.ladder[self.level.min(self.ladder.len() - 1)]
    }

    pub fn ladder(&self) -> &[Opponent] {
        &self.ladder
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn pool(&self) -> &[PieceKind] {
        &self.pool
    }

    pub fn is_busy(&self) -> bool {
        self.cascade.is_some()
    }

    fn ensure_idle_and_playing(&self) -> Result<(), CommandError> {
        if self.is_busy() {
            return Err(CommandError::Busy);
        }
        if !self.status.is_playing() {
            return Err(CommandError::NotPlaying);
        }
        Ok(())
    }

    // Commands

    /// Queue a swap of two orthogonally adjacent cells
    pub fn submit_swap(&mut self, from: Pos, to: Pos) -> Result<(), CommandError> {
        self.ensure_idle_and_playing()?;
        if !from.in_bounds() {
            return Err(CommandError::OutOfBounds(from));
        }
        if !to.in_bounds() {
            return Err(CommandError::OutOfBounds(to));
        }
        if from == to {
            return Err(CommandError::SameCell);
        }
        if !from.is_adjacent(to) {
            return Err(CommandError::NotAdjacent { from, to });
        }
        tracing::debug!(?from, ?to, "swap accepted");
        self.cascade = Some(Cascade::new(Trigger::Swap { from, to }));
        Ok(())
    }

    /// Drive the ability lifecycle
    ///
    /// From `Ready`, an untargeted ability fires immediately; a targeted one
    /// enters `Aiming` (consuming `target` if one is given). While aiming,
    /// each target is validated and collected until the ability's arity is
    /// reached; calling with `None` cancels back to `Ready`.
    pub fn activate_ability(&mut self, target: Option<Pos>) -> Result<AbilityProgress, CommandError> {
        self.ensure_idle_and_playing()?;
        let arity = self.ability.arity();

        match self.combat.ability_phase {
            AbilityPhase::Idle => Err(CommandError::AbilityNotReady),
            AbilityPhase::Ready if arity == 0 => Ok(self.fire()),
            AbilityPhase::Ready => {
                if let Some(pos) = target {
                    self.check_target(pos, arity)?;
                }
                self.aim.clear();
                self.combat.ability_phase = AbilityPhase::Aiming;
                match target {
                    Some(pos) => Ok(self.take_aim(pos, arity)),
                    None => Ok(AbilityProgress::Aiming { remaining: arity }),
                }
            }
            AbilityPhase::Aiming => match target {
                Some(pos) => {
                    self.check_target(pos, arity)?;
                    Ok(self.take_aim(pos, arity))
                }
                None => {
                    self.aim.clear();
                    self.combat.ability_phase = AbilityPhase::Ready;
                    Ok(AbilityProgress::Cancelled)
                }
            },
        }
    }

    fn check_target(&self, pos: Pos, arity: usize) -> Result<(), CommandError> {
        if !pos.in_bounds() {
            return Err(CommandError::OutOfBounds(pos));
        }
        if !self.ability.accepts_target(&self.board, pos) || self.aim.len() >= arity {
            return Err(CommandError::InvalidTarget(pos));
        }
        match self.aim.first() {
            Some(&first) if !first.is_adjacent(pos) => Err(CommandError::InvalidTarget(pos)),
            _ => Ok(()),
        }
    }

    fn take_aim(&mut self, pos: Pos, arity: usize) -> AbilityProgress {
        self.aim.push(pos);
        if self.aim.len() >= arity {
            return self.fire();
        }
        AbilityProgress::Aiming {
            remaining: arity - self.aim.len(),
        }
    }

    fn fire(&mut self) -> AbilityProgress {
        let targets = std::mem::take(&mut self.aim);
        self.combat.reset_meter();
        tracing::debug!(ability = self.ability.name(), "ability activated");
        self.cascade = Some(Cascade::new(Trigger::Ability {
            ability: self.ability,
            targets,
        }));
        AbilityProgress::Executing
    }

    /// Ids of a swap that would create a match; never mutates state
    pub fn request_hint(&self) -> Option<(PieceId, PieceId)> {
        if self.is_busy() || !self.status.is_playing() {
            return None;
        }
        let (a, b) = find_possible_move(&self.board)?;
        Some((self.board.get(a)?.id, self.board.get(b)?.id))
    }

    /// Move on to the next ladder opponent after a won level
    pub fn next_level(&mut self) -> Result<(), EncounterError> {
        if self.is_busy() {
            return Err(CommandError::Busy.into());
        }
        match self.status {
            EncounterStatus::LevelWon => {}
            EncounterStatus::LadderComplete => return Err(CommandError::LadderExhausted.into()),
            _ => return Err(CommandError::LevelNotWon.into()),
        }
        let next = self.level + 1;
        let Some(opponent) = self.ladder.get(next) else {
            return Err(CommandError::LadderExhausted.into());
        };

        regenerate(&mut self.board, &self.pool, &mut self.rng)?;
        self.combat.next_level(opponent);
        self.level = next;
        self.aim.clear();
        self.status = EncounterStatus::Playing;
        tracing::info!(level = next, opponent = %opponent.name, "next level");
        Ok(())
    }

    // Resolution

    /// Run the in-flight resolve up to its next visible phase
    ///
    /// Returns `Ok(None)` when nothing is in flight.
    pub fn advance(&mut self) -> Result<Option<Phase>, CoreError> {
        let Some(cascade) = self.cascade.as_mut() else {
            return Ok(None);
        };

        let mut table = Table {
            board: &mut self.board,
            combat: &mut self.combat,
            rng: &mut self.rng,
            pool: &self.pool,
            actor: self.character,
            meter_policy: self.meter_policy,
            playing: self.status.is_playing(),
            events: &mut self.events,
        };
        let phase = cascade.advance(&mut table)?;
        let any_matches = cascade.any_matches();

        self.check_victory();

        match phase {
            Some(Phase::Settled) => {
                self.cascade = None;
                self.board.reset_states();
                if any_matches && self.status.is_playing() {
                    self.opponent_turn();
                }
            }
            Some(_) => {}
            None => self.cascade = None,
        }
        Ok(phase)
    }

    /// Pump `advance` until the resolve settles, returning the visited phases
    pub fn run_to_settle(&mut self) -> Result<Vec<Phase>, CoreError> {
        let mut phases = Vec::new();
        while let Some(phase) = self.advance()? {
            phases.push(phase);
        }
        Ok(phases)
    }

    /// Drain accumulated events
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_victory(&mut self) {
        if !self.status.is_playing() || !self.combat.opponent_defeated() {
            return;
        }
        let outcome = if self.level + 1 >= self.ladder.len() {
            self.status = EncounterStatus::LadderComplete;
            Outcome::Win
        } else {
            self.status = EncounterStatus::LevelWon;
            Outcome::LevelComplete
        };
        tracing::info!(
            level = self.level,
            score = self.combat.score,
            outcome = outcome.as_str(),
            "opponent defeated"
        );
        self.events.push(EngineEvent::Outcome { outcome });
    }

    fn opponent_turn(&mut self) {
        let opponent = &self.ladder[self.level.min(self.ladder.len() - 1)];
        match self.combat.opponent_turn(opponent, self.non_lethal) {
            OpponentTurn::Waiting { .. } => {}
            OpponentTurn::Attacked {
                damage,
                new_player_health,
            } => {
                tracing::debug!(damage, new_player_health, "opponent attacked");
                self.events.push(EngineEvent::OpponentAttack {
                    damage,
                    new_player_health,
                });
                if self.combat.player_defeated() {
                    self.status = EncounterStatus::Defeated;
                    tracing::info!(level = self.level, score = self.combat.score, "player defeated");
                    self.events.push(EngineEvent::Outcome {
                        outcome: Outcome::Loss,
                    });
                }
            }
        }
    }

    // Snapshots

    /// Write a snapshot into an existing buffer, reusing its allocations
    pub fn snapshot_into(&self, out: &mut EncounterSnapshot) {
        out.write_board(&self.board);
        let opponent = self.opponent();
        out.character = self.character;
        out.ability = self.ability;
        out.ability_phase = self.combat.ability_phase;
        out.aim_targets.clear();
        out.aim_targets.extend(self.aim.iter().copied());
        out.meter = self.combat.meter;
        out.meter_max = ABILITY_METER_MAX;
        out.player_health = self.combat.player_health;
        out.player_max_health = PLAYER_MAX_HEALTH;
        out.opponent = OpponentSnapshot {
            name: opponent.name.clone(),
            kind: opponent.kind,
            health: self.combat.opponent_health,
            max_health: opponent.max_health,
            attack: opponent.attack,
            moves_per_attack: opponent.moves_per_attack,
            moves_until_attack: self.combat.moves_until_attack,
        };
        out.combo = self.combat.combo;
        out.max_combo = self.combat.max_combo;
        out.score = self.combat.score;
        out.difficulty = self.difficulty;
        out.level = self.level;
        out.ladder_len = self.ladder.len();
        out.status = self.status;
        out.busy = self.is_busy();
        out.seed = self.seed;
    }

    pub fn snapshot(&self) -> EncounterSnapshot {
        let mut s = EncounterSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(character: PieceKind, seed: u32) -> Encounter {
        Encounter::start(EncounterConfig {
            character,
            seed,
            ..EncounterConfig::default()
        })
        .unwrap()
    }

    fn play_hint(enc: &mut Encounter) -> Vec<Phase> {
        let (a, b) = enc.request_hint().unwrap();
        let from = enc.board().find_id(a).unwrap();
        let to = enc.board().find_id(b).unwrap();
        enc.submit_swap(from, to).unwrap();
        enc.run_to_settle().unwrap()
    }

    #[test]
    fn test_start_builds_ladder_and_settled_board() {
        let enc = start(PieceKind::Kano, 3);
        assert_eq!(enc.ladder().len(), 5);
        assert_eq!(enc.pool().len(), 6);
        assert_eq!(enc.pool()[0], PieceKind::Kano);
        assert!(crate::matching::find_matches(enc.board()).is_empty());
        assert_eq!(enc.status(), EncounterStatus::Playing);
        assert_eq!(enc.combat().opponent_health, enc.opponent().max_health);
    }

    #[test]
    fn test_empty_ladder_rejected() {
        let err = Encounter::start(EncounterConfig {
            ladder: Some(Vec::new()),
            ..EncounterConfig::default()
        })
        .err();
        assert_eq!(err, Some(CoreError::EmptyLadder));
    }

    #[test]
    fn test_swap_validation() {
        let mut enc = start(PieceKind::SubZero, 1);
        let p = Pos::new(3, 3);
        assert_eq!(enc.submit_swap(p, p), Err(CommandError::SameCell));
        assert_eq!(
            enc.submit_swap(p, Pos::new(4, 4)),
            Err(CommandError::NotAdjacent {
                from: p,
                to: Pos::new(4, 4)
            })
        );
        assert_eq!(
            enc.submit_swap(Pos::new(8, 0), Pos::new(7, 0)),
            Err(CommandError::OutOfBounds(Pos::new(8, 0)))
        );
        assert!(!enc.is_busy());
    }

    #[test]
    fn test_busy_rejects_commands() {
        let mut enc = start(PieceKind::SubZero, 1);
        let (a, b) = enc.request_hint().unwrap();
        let from = enc.board().find_id(a).unwrap();
        let to = enc.board().find_id(b).unwrap();
        enc.submit_swap(from, to).unwrap();
        assert_eq!(enc.advance().unwrap(), Some(Phase::Swapped));
        assert!(enc.is_busy());
        assert_eq!(enc.submit_swap(from, to), Err(CommandError::Busy));
        assert_eq!(enc.activate_ability(None), Err(CommandError::Busy));
        assert_eq!(enc.request_hint(), None);
        enc.run_to_settle().unwrap();
        assert!(!enc.is_busy());
    }

    #[test]
    fn test_hinted_swap_deals_damage_and_ticks_countdown() {
        let mut enc = start(PieceKind::SubZero, 5);
        let moves = enc.combat().moves_until_attack;
        let phases = play_hint(&mut enc);
        assert_eq!(phases[0], Phase::Swapped);
        assert_eq!(phases[1], Phase::Cleared);
        assert_eq!(phases[2], Phase::Refilled);
        assert_eq!(*phases.last().unwrap(), Phase::Settled);
        assert!(enc.combat().opponent_health < enc.opponent().max_health);
        assert_eq!(enc.combat().moves_until_attack, moves - 1);
        assert!(crate::matching::find_matches(enc.board()).is_empty());
        assert!(crate::advisor::has_possible_moves(enc.board()));
        assert!(enc.board().cells().iter().all(|p| p.state == crate::types::PieceState::Idle));
    }

    #[test]
    fn test_ability_not_ready_when_meter_empty() {
        let mut enc = start(PieceKind::Raiden, 1);
        assert_eq!(enc.activate_ability(None), Err(CommandError::AbilityNotReady));
    }

    #[test]
    fn test_next_level_requires_win() {
        let mut enc = start(PieceKind::SubZero, 1);
        assert!(matches!(
            enc.next_level(),
            Err(EncounterError::Command(CommandError::LevelNotWon))
        ));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let enc = start(PieceKind::Sonya, 2);
        let snap = enc.snapshot();
        assert_eq!(snap.pieces.len(), 64);
        assert_eq!(snap.character, PieceKind::Sonya);
        assert_eq!(snap.opponent.health, enc.opponent().max_health);
        assert_eq!(snap.player_health, PLAYER_MAX_HEALTH);
        assert!(snap.playable());
        let piece = snap.piece_at(Pos::new(2, 5)).unwrap();
        assert_eq!((piece.row, piece.col), (2, 5));
    }
}
