//! Error types for the simulation core
//!
//! Two families are kept apart:
//!
//! - [`CommandError`]: a caller asked for something the current state does
//!   not allow. Rejections never change state; they carry a stable
//!   snake_case [`code`](CommandError::code) for presentation layers.
//! - [`CoreError`]: an internal invariant could not be upheld (board
//!   generation ran out of attempts, bad configuration). These propagate out
//!   of `Encounter::start`, `Encounter::advance` and `Encounter::next_level`.

use thiserror::Error;

use crate::types::Pos;

/// Rejected command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("cells {from:?} and {to:?} are not orthogonally adjacent")]
    NotAdjacent { from: Pos, to: Pos },

    #[error("cell {0:?} is outside the board")]
    OutOfBounds(Pos),

    #[error("cannot swap a cell with itself")]
    SameCell,

    #[error("a resolve is already in flight")]
    Busy,

    #[error("the encounter is not in active play")]
    NotPlaying,

    #[error("the ability meter is not full")]
    AbilityNotReady,

    #[error("invalid ability target {0:?}")]
    InvalidTarget(Pos),

    #[error("the current level has not been won")]
    LevelNotWon,

    #[error("no opponents remain on the ladder")]
    LadderExhausted,
}

impl CommandError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::NotAdjacent { .. } => "not_adjacent",
            CommandError::OutOfBounds(_) => "out_of_bounds",
            CommandError::SameCell => "same_cell",
            CommandError::Busy => "busy",
            CommandError::NotPlaying => "not_playing",
            CommandError::AbilityNotReady => "ability_not_ready",
            CommandError::InvalidTarget(_) => "invalid_target",
            CommandError::LevelNotWon => "level_not_won",
            CommandError::LadderExhausted => "ladder_exhausted",
        }
    }
}

/// Internal invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("board generation gave up after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("piece pool needs at least 3 distinct kinds, got {len}")]
    PoolTooSmall { len: usize },

    #[error("ladder has no opponents")]
    EmptyLadder,
}

/// Failure of a command that can also hit an internal invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_snake_case() {
        let all = [
            CommandError::NotAdjacent {
                from: Pos::new(0, 0),
                to: Pos::new(2, 2),
            },
            CommandError::OutOfBounds(Pos::new(9, 0)),
            CommandError::SameCell,
            CommandError::Busy,
            CommandError::NotPlaying,
            CommandError::AbilityNotReady,
            CommandError::InvalidTarget(Pos::new(1, 1)),
            CommandError::LevelNotWon,
            CommandError::LadderExhausted,
        ];
        for err in all {
            let code = err.code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_core_error_messages() {
        let err = CoreError::GenerationExhausted { attempts: 10 };
        assert_eq!(err.to_string(), "board generation gave up after 10 attempts");
        assert!(CoreError::PoolTooSmall { len: 2 }.to_string().contains('2'));
    }
}
