//! Cascade engine - step-wise resolution of a swap or ability
//!
//! A resolve is a small state machine. Each call to [`Cascade::advance`]
//! runs internal steps until the next visible [`Phase`] and returns it, so a
//! caller can pause between phases for animation without the core knowing
//! anything about time.
//!
//! ```text
//! Apply ──► Detect ──► (matches) ──► Cleared ──► Collapse ──► Refilled ──► Detect ...
//!              │
//!              └──► (no matches) ──► Settle ──► Reverted | Regenerated ──► Settled
//! ```
//!
//! # Pacing
//!
//! | Phase | Pause after (ms) |
//! |-------|------------------|
//! | `Swapped` / `AbilityApplied` | 300 |
//! | `Cleared` | 450 |
//! | `Refilled` | 300 |
//! | `Reverted` | 300 |
//! | `Regenerated` | 500 |
//! | `Settled` | 0 |

use arrayvec::ArrayVec;

use crate::ability::Ability;
use crate::advisor::has_possible_moves;
use crate::board::Board;
use crate::combat::{base_half_points, iteration_damage, CombatState, MeterPolicy};
use crate::error::CoreError;
use crate::event::{EngineEvent, IterationReport};
use crate::generator::{apply_gravity, refill_board, regenerate};
use crate::matching::{find_matches, Matches};
use crate::rng::SimpleRng;
use crate::special::{resolve, Resolution};
use crate::types::{
    PieceKind, PieceState, Pos, CELL_COUNT, CLEAR_PAUSE_MS, REFILL_PAUSE_MS, REGENERATION_PAUSE_MS,
    SWAP_PAUSE_MS,
};

/// Visible checkpoint of a resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    Swapped,
    AbilityApplied,
    Cleared,
    Refilled,
    Reverted,
    Regenerated,
    Settled,
}

impl Phase {
    /// How long a presentation layer should hold this phase on screen
    pub fn pause_ms(&self) -> u32 {
        match self {
            Phase::Swapped | Phase::AbilityApplied => SWAP_PAUSE_MS,
            Phase::Cleared => CLEAR_PAUSE_MS,
            Phase::Refilled => REFILL_PAUSE_MS,
            Phase::Reverted => SWAP_PAUSE_MS,
            Phase::Regenerated => REGENERATION_PAUSE_MS,
            Phase::Settled => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Swapped => "swapped",
            Phase::AbilityApplied => "ability_applied",
            Phase::Cleared => "cleared",
            Phase::Refilled => "refilled",
            Phase::Reverted => "reverted",
            Phase::Regenerated => "regenerated",
            Phase::Settled => "settled",
        }
    }
}

/// What started the resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Swap { from: Pos, to: Pos },
    Ability { ability: Ability, targets: ArrayVec<Pos, 2> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Apply,
    Detect,
    Collapse,
    Settle,
    Finish,
    Done,
}

/// Everything a resolve reads or writes, borrowed from the encounter
pub struct Table<'a> {
    pub board: &'a mut Board,
    pub combat: &'a mut CombatState,
    pub rng: &'a mut SimpleRng,
    pub pool: &'a [PieceKind],
    pub actor: PieceKind,
    pub meter_policy: MeterPolicy,
    /// Whether the level is still being fought; a won or lost level skips
    /// regeneration
    pub playing: bool,
    pub events: &'a mut Vec<EngineEvent>,
}

/// An in-flight resolve
#[derive(Debug, Clone)]
pub struct Cascade {
    trigger: Trigger,
    step: Step,
    combo: u32,
    any_matches: bool,
    swap_cell: Option<Pos>,
    before: Option<Board>,
    seeded: Option<Matches>,
    pending: Option<Resolution>,
}

impl Cascade {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            step: Step::Apply,
            combo: 1,
            any_matches: false,
            swap_cell: None,
            before: None,
            seeded: None,
            pending: None,
        }
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Whether any clear (or any ability) happened, which makes the resolve
    /// count as a player action
    pub fn any_matches(&self) -> bool {
        self.any_matches
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }

    fn is_ability(&self) -> bool {
        matches!(self.trigger, Trigger::Ability { .. })
    }

    /// Run until the next visible phase; None once settled
    pub fn advance(&mut self, t: &mut Table<'_>) -> Result<Option<Phase>, CoreError> {
        loop {
            match self.step {
                Step::Apply => return Ok(Some(self.apply(t))),
                Step::Detect => {
                    let matches = match self.seeded.take() {
                        Some(m) => m,
                        None => find_matches(t.board),
                    };
                    if matches.is_empty() {
                        self.step = Step::Settle;
                        continue;
                    }
                    self.clear(t, &matches);
                    self.step = Step::Collapse;
                    return Ok(Some(Phase::Cleared));
                }
                Step::Collapse => {
                    self.collapse(t);
                    self.step = Step::Detect;
                    return Ok(Some(Phase::Refilled));
                }
                Step::Settle => {
                    t.combat.combo = 1;
                    if let Trigger::Swap { from, to } = self.trigger {
                        if !self.any_matches {
                            if let Some(before) = self.before.take() {
                                *t.board = before;
                            }
                            tracing::debug!(?from, ?to, "swap produced no match, reverted");
                            t.events.push(EngineEvent::SwapReverted { from, to });
                            self.step = Step::Finish;
                            return Ok(Some(Phase::Reverted));
                        }
                    }
                    if t.playing && !has_possible_moves(t.board) {
                        regenerate(t.board, t.pool, t.rng)?;
                        tracing::debug!("no moves left, board regenerated");
                        t.events.push(EngineEvent::BoardRegenerated);
                        self.step = Step::Finish;
                        return Ok(Some(Phase::Regenerated));
                    }
                    self.step = Step::Done;
                    return Ok(Some(Phase::Settled));
                }
                Step::Finish => {
                    self.step = Step::Done;
                    return Ok(Some(Phase::Settled));
                }
                Step::Done => return Ok(None),
            }
        }
    }

    fn apply(&mut self, t: &mut Table<'_>) -> Phase {
        self.step = Step::Detect;
        match &self.trigger {
            Trigger::Swap { from, to } => {
                let (from, to) = (*from, *to);
                self.before = Some(t.board.clone());
                t.board.swap(from, to);
                self.swap_cell = Some(to);
                t.events.push(EngineEvent::SwapApplied { from, to });
                Phase::Swapped
            }
            Trigger::Ability { ability, targets } => {
                let ability = *ability;
                let outcome = ability.execute(t.board, t.actor, targets, t.rng);
                let mut matches = find_matches(t.board);
                if let Some(pseudo) = outcome.destroyed {
                    if matches.try_push(pseudo).is_err() {
                        tracing::warn!("match list full, ability clear dropped");
                    }
                }
                self.any_matches = true;
                self.seeded = Some(matches);
                tracing::debug!(
                    ability = ability.name(),
                    affected = outcome.affected.len(),
                    "ability applied"
                );
                t.events.push(EngineEvent::AbilityUsed {
                    character: t.actor,
                    ability,
                    affected: outcome.affected.to_vec(),
                });
                Phase::AbilityApplied
            }
        }
    }

    fn clear(&mut self, t: &mut Table<'_>, matches: &Matches) {
        self.any_matches = true;
        let allow_creation = !(self.is_ability() && self.combo == 1);
        let res = resolve(t.board, matches, self.swap_cell, allow_creation, t.rng);

        let kinds: ArrayVec<PieceKind, CELL_COUNT> =
            res.cleared.iter().filter_map(|p| t.board.kind_at(p)).collect();
        let own = kinds.iter().filter(|&&k| k == t.actor).count();
        let damage = iteration_damage(
            base_half_points(kinds.iter().copied(), t.actor),
            res.special_damage,
            self.combo,
        );

        t.combat.record_combo(self.combo);
        t.combat.deal_damage(damage);
        if t.combat.charge_meter(t.meter_policy.points(kinds.len(), own)) {
            t.events.push(EngineEvent::AbilityReady);
        }

        let keep = res.created.map(|c| c.pos);
        for pos in res.cleared.iter() {
            if Some(pos) != keep {
                t.board.set_state(pos, PieceState::Matched);
            }
        }

        tracing::trace!(
            combo = self.combo,
            cleared = res.cleared_count(),
            damage,
            "cascade iteration"
        );
        t.events.push(EngineEvent::Iteration(IterationReport {
            damage_dealt: damage,
            combo: self.combo,
            cleared_count: res.cleared_count(),
            specials_activated: res.activated.to_vec(),
            special_created: res.created,
        }));
        self.pending = Some(res);
    }

    fn collapse(&mut self, t: &mut Table<'_>) {
        if let Some(res) = self.pending.take() {
            let keep = res.created.map(|c| c.pos);
            for pos in res.cleared.iter() {
                if Some(pos) != keep {
                    t.board.clear_cell(pos);
                }
            }
        }
        apply_gravity(t.board);
        refill_board(t.board, t.pool, t.rng);
        self.combo = self.combo.saturating_add(1);
        self.swap_cell = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::Opponent;
    use crate::types::Difficulty;

    // Six kinds in diagonal bands leave no move anywhere except the swap of
    // (0,2) and (0,3), which clears the Sub-Zero three at the top left. The
    // refill pool shares no kind with the rest of the board.
    const STUCK: [&str; 8] = [
        "ZZRZLTZR", "RPKLTZRP", "PKLTZRPK", "KLTZRPKL", "LTZRPKLT", "TZRPKLTZ", "ZRPKLTZR",
        "RPKLTZRP",
    ];
    const POOL: [PieceKind; 3] = [PieceKind::Scorpion, PieceKind::Mileena, PieceKind::Sonya];

    fn run(playing: bool) -> (Board, Vec<Phase>, Vec<EngineEvent>) {
        let mut board = Board::from_rows(&STUCK).unwrap();
        let mut combat = CombatState::new(&Opponent::canonical(PieceKind::Kano, Difficulty::Normal));
        let mut rng = SimpleRng::new(3);
        let mut events = Vec::new();
        let mut phases = Vec::new();

        let mut cascade = Cascade::new(Trigger::Swap {
            from: Pos::new(0, 3),
            to: Pos::new(0, 2),
        });
        let mut table = Table {
            board: &mut board,
            combat: &mut combat,
            rng: &mut rng,
            pool: &POOL,
            actor: PieceKind::SubZero,
            meter_policy: MeterPolicy::OwnKind,
            playing,
            events: &mut events,
        };
        while let Some(phase) = cascade.advance(&mut table).unwrap() {
            phases.push(phase);
        }
        assert!(cascade.is_done());
        (board, phases, events)
    }

    #[test]
    fn test_settle_without_moves_regenerates() {
        let (board, phases, events) = run(true);
        assert_eq!(&phases[..3], &[Phase::Swapped, Phase::Cleared, Phase::Refilled]);
        assert_eq!(&phases[phases.len() - 2..], &[Phase::Regenerated, Phase::Settled]);
        assert_eq!(events.last(), Some(&EngineEvent::BoardRegenerated));

        assert!(find_matches(&board).is_empty());
        assert!(has_possible_moves(&board));
        assert!(board.iter().all(|(_, p)| p.kind.is_some_and(|k| POOL.contains(&k))));
    }

    #[test]
    fn test_finished_level_is_not_regenerated() {
        let (board, phases, events) = run(false);
        assert_eq!(phases.last(), Some(&Phase::Settled));
        assert!(!phases.contains(&Phase::Regenerated));
        assert!(!events.contains(&EngineEvent::BoardRegenerated));
        assert!(!has_possible_moves(&board));
    }
}
