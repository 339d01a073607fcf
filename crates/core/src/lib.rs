//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains every rule of the match-3 duel: the board, match
//! detection, specials, abilities, the cascade state machine and combat. It
//! has **no dependencies** on rendering, timing or I/O, making it:
//!
//! - **Deterministic**: the same seed replays the same encounter
//! - **Testable**: every rule is reachable from plain unit tests
//! - **Portable**: runs headless, in a terminal, or behind a paced driver
//! - **Allocation-light**: boards, matches and flood fills live in fixed arrays
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 arena of pieces with id allocation
//! - [`matching`]: row/column run detection
//! - [`advisor`]: exhaustive adjacent-swap search (hints, solvability)
//! - [`generator`]: rejection-sampled boards, gravity and refill
//! - [`special`]: flood-fill activation and creation of special tiles
//! - [`ability`]: the nine character abilities
//! - [`cascade`]: step-wise resolve of a swap or ability
//! - [`combat`]: damage, meter and opponent countdown
//! - [`ladder`]: opponent roster and difficulty scaling
//! - [`encounter`]: command facade tying everything together
//!
//! # Rules Summary
//!
//! - **Matches**: 3 or more identical pieces in a row or column
//! - **Specials**: a 4-run leaves a row/column clear, 5+ leaves a dragon
//! - **Cascades**: each further round of matches raises the combo multiplier
//! - **Damage**: 1.5 per own-kind piece, 1.0 otherwise, +15 per special, times combo
//! - **Opponent**: attacks every `moves_per_attack` player actions
//! - **Settle**: a swap without matches is reverted; a board without moves is regenerated
//!
//! # Example
//!
//! ```
//! use krush_core::{Encounter, EncounterConfig, Phase};
//! use krush_core::types::PieceKind;
//!
//! let mut enc = Encounter::start(EncounterConfig {
//!     character: PieceKind::Kano,
//!     seed: 99,
//!     ..EncounterConfig::default()
//! })
//! .unwrap();
//!
//! let (a, b) = enc.request_hint().unwrap();
//! let (from, to) = (enc.board().find_id(a).unwrap(), enc.board().find_id(b).unwrap());
//! enc.submit_swap(from, to).unwrap();
//!
//! assert_eq!(enc.advance().unwrap(), Some(Phase::Swapped));
//! assert_eq!(enc.advance().unwrap(), Some(Phase::Cleared));
//! let phases = enc.run_to_settle().unwrap();
//! assert_eq!(phases.last(), Some(&Phase::Settled));
//! assert!(!enc.take_events().is_empty());
//! ```

pub mod ability;
pub mod advisor;
pub mod board;
pub mod cascade;
pub mod combat;
pub mod encounter;
pub mod error;
pub mod event;
pub mod generator;
pub mod ladder;
pub mod matching;
pub mod rng;
pub mod snapshot;
pub mod special;

pub use krush_types as types;

// Re-export commonly used types for convenience
pub use ability::{Ability, AbilityOutcome};
pub use advisor::{find_possible_move, has_possible_moves};
pub use board::{Board, Piece, PieceId};
pub use cascade::{Cascade, Phase};
pub use combat::{CombatState, MeterPolicy};
pub use encounter::{AbilityProgress, Encounter, EncounterConfig};
pub use error::{CommandError, CoreError, EncounterError};
pub use event::{EngineEvent, IterationReport};
pub use generator::{apply_gravity, create_initial_board, refill_board, regenerate};
pub use ladder::{active_pool, build_ladder, Opponent};
pub use matching::{find_matches, Match};
pub use rng::SimpleRng;
pub use snapshot::{EncounterSnapshot, OpponentSnapshot, PieceSnapshot};
pub use special::{resolve, CellSet, Resolution};
