//! Greedy headless player used by `krush-sim` and the integration tests.
//!
//! Fires the ability as soon as it is ready (aiming at the most common piece
//! kind), otherwise plays the first hinted swap. Level wins advance the
//! ladder automatically.

use krush_core::{AbilityProgress, CoreError, Encounter, EncounterError};
use krush_types::{AbilityPhase, EncounterStatus, Pos};

/// Summary of an automated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub actions: u32,
    pub abilities: u32,
    pub levels_cleared: usize,
    pub status: EncounterStatus,
    pub score: u32,
    pub max_combo: u32,
}

/// Cell holding the kind with the most pieces on the board
pub fn busiest_cell(enc: &Encounter) -> Option<Pos> {
    let board = enc.board();
    let kind = board
        .kinds_present()
        .into_iter()
        .max_by_key(|&k| board.count_kind(k))?;
    board
        .iter()
        .find(|(_, piece)| piece.kind == Some(kind))
        .map(|(pos, _)| pos)
}

/// What a turn did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Swap,
    Ability,
    NextLevel,
    Idle,
}

/// Take one action and resolve it
pub fn play_turn(enc: &mut Encounter) -> Result<Turn, CoreError> {
    if enc.status() == EncounterStatus::LevelWon {
        return match enc.next_level() {
            Ok(()) => Ok(Turn::NextLevel),
            Err(EncounterError::Core(err)) => Err(err),
            Err(EncounterError::Command(_)) => Ok(Turn::Idle),
        };
    }
    if !enc.status().is_playing() {
        return Ok(Turn::Idle);
    }

    if enc.ability_phase() == AbilityPhase::Ready {
        let target = busiest_cell(enc);
        match enc.activate_ability(target) {
            Ok(AbilityProgress::Executing) => {
                enc.run_to_settle()?;
                return Ok(Turn::Ability);
            }
            Ok(AbilityProgress::Aiming { .. }) => {
                let _ = enc.activate_ability(None);
            }
            Ok(AbilityProgress::Cancelled) | Err(_) => {}
        }
    }

    let Some((a, b)) = enc.request_hint() else {
        return Ok(Turn::Idle);
    };
    let (Some(from), Some(to)) = (enc.board().find_id(a), enc.board().find_id(b)) else {
        return Ok(Turn::Idle);
    };
    if enc.submit_swap(from, to).is_err() {
        return Ok(Turn::Idle);
    }
    enc.run_to_settle()?;
    Ok(Turn::Swap)
}

/// Play until the ladder ends, the player falls, or `max_actions` is reached
pub fn run(enc: &mut Encounter, max_actions: u32) -> Result<RunSummary, CoreError> {
    let mut actions = 0;
    let mut abilities = 0;
    let mut levels_cleared = 0;

    while actions < max_actions {
        match play_turn(enc)? {
            Turn::Idle => break,
            Turn::NextLevel => {
                levels_cleared += 1;
                continue;
            }
            Turn::Ability => abilities += 1,
            Turn::Swap => {}
        }
        actions += 1;
        tracing::debug!(
            actions,
            opponent_health = enc.combat().opponent_health,
            player_health = enc.combat().player_health,
            "turn played"
        );
    }
    if enc.status() == EncounterStatus::LadderComplete {
        levels_cleared += 1;
    }

    Ok(RunSummary {
        actions,
        abilities,
        levels_cleared,
        status: enc.status(),
        score: enc.combat().score,
        max_combo: enc.combat().max_combo,
    })
}
