//! Events emitted by an encounter
//!
//! Events accumulate inside the [`Encounter`](crate::Encounter) as it
//! advances and are drained with `take_events()`. Presentation layers use
//! them to drive effects; snapshots carry the resulting state.

use crate::ability::Ability;
use crate::special::{ActivatedSpecial, CreatedSpecial};
use crate::types::{Outcome, PieceKind, Pos};

/// Summary of one cascade iteration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationReport {
    pub damage_dealt: u32,
    pub combo: u32,
    pub cleared_count: usize,
    pub specials_activated: Vec<ActivatedSpecial>,
    pub special_created: Option<CreatedSpecial>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EngineEvent {
    SwapApplied {
        from: Pos,
        to: Pos,
    },
    AbilityUsed {
        character: PieceKind,
        ability: Ability,
        affected: Vec<Pos>,
    },
    Iteration(IterationReport),
    SwapReverted {
        from: Pos,
        to: Pos,
    },
    BoardRegenerated,
    /// The meter filled and the ability can be activated
    AbilityReady,
    OpponentAttack {
        damage: u32,
        new_player_health: u32,
    },
    Outcome {
        outcome: Outcome,
    },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::SwapApplied { .. } => "swap_applied",
            EngineEvent::AbilityUsed { .. } => "ability_used",
            EngineEvent::Iteration(_) => "iteration",
            EngineEvent::SwapReverted { .. } => "swap_reverted",
            EngineEvent::BoardRegenerated => "board_regenerated",
            EngineEvent::AbilityReady => "ability_ready",
            EngineEvent::OpponentAttack { .. } => "opponent_attack",
            EngineEvent::Outcome { .. } => "outcome",
        }
    }
}
