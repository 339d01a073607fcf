//! Special tile resolution
//!
//! Turning a set of matches into the final cleared set is a flood fill over
//! special tiles, driven by an explicit FIFO worklist and a visited bitset:
//!
//! | Special | Activation enqueues | Damage |
//! |---------|---------------------|--------|
//! | `RowClear` | every cell of its row | +15 |
//! | `ColClear` | every cell of its column | +15 |
//! | `Dragon` | every piece of one random kind not yet queued | +15 |
//!
//! After the fill, at most one new special is created from the triggering
//! matches: a 4-run yields a row or column clear along its axis, a run of 5
//! or more yields a dragon.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::matching::Match;
use crate::rng::SimpleRng;
use crate::types::{
    Orientation, PieceKind, Pos, SpecialKind, CELL_COUNT, GRID_SIZE, SPECIAL_ACTIVATION_DAMAGE,
};

/// Set of board cells backed by a 64-bit mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSet(u64);

impl CellSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Insert a cell, returning true if it was not present
    pub fn insert(&mut self, pos: Pos) -> bool {
        let bit = 1u64 << pos.index();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn remove(&mut self, pos: Pos) {
        self.0 &= !(1u64 << pos.index());
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.0 & (1u64 << pos.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..CELL_COUNT)
            .filter(move |i| self.0 & (1u64 << i) != 0)
            .filter_map(Pos::from_index)
    }
}

/// A special that fired during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivatedSpecial {
    pub pos: Pos,
    pub kind: SpecialKind,
    /// Kind swept by a dragon, if any
    pub target: Option<PieceKind>,
}

/// A special awarded by this resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatedSpecial {
    pub pos: Pos,
    pub kind: SpecialKind,
}

/// Outcome of resolving one iteration's matches
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Every cell that counts as cleared for damage and meter purposes.
    /// Includes the cell of a newly created special, which stays on the board.
    pub cleared: CellSet,
    /// Flat special damage (15 per activation)
    pub special_damage: u32,
    pub activated: ArrayVec<ActivatedSpecial, CELL_COUNT>,
    pub created: Option<CreatedSpecial>,
}

impl Resolution {
    pub fn cleared_count(&self) -> usize {
        self.cleared.len()
    }
}

/// Special awarded for a run, if any
pub fn special_for(m: &Match) -> SpecialKind {
    match m.len() {
        n if n >= 5 => SpecialKind::Dragon,
        4 => match m.orientation {
            Orientation::Row => SpecialKind::RowClear,
            Orientation::Col => SpecialKind::ColClear,
        },
        _ => SpecialKind::None,
    }
}

/// Expand matches into the full cleared set and pick a special to create
///
/// `swap_cell` is the destination of the swap that triggered this resolve,
/// if any. Created specials are written to the board immediately; cleared
/// pieces are left in place for the caller to remove.
pub fn resolve(
    board: &mut Board,
    matches: &[Match],
    swap_cell: Option<Pos>,
    allow_creation: bool,
    rng: &mut SimpleRng,
) -> Resolution {
    let mut res = Resolution::default();
    let mut queued = CellSet::new();
    let mut activated = CellSet::new();
    let mut worklist: ArrayVec<Pos, CELL_COUNT> = ArrayVec::new();
    let mut head = 0usize;

    for pos in matches.iter().flat_map(|m| m.cells.iter().copied()) {
        if queued.insert(pos) {
            worklist.push(pos);
        }
    }

    while head < worklist.len() {
        let pos = worklist[head];
        head += 1;
        res.cleared.insert(pos);

        let Some(piece) = board.get(pos).copied() else {
            continue;
        };
        if !piece.special.is_special() || !activated.insert(pos) {
            continue;
        }
        res.special_damage = res.special_damage.saturating_add(SPECIAL_ACTIVATION_DAMAGE);

        let mut target = None;
        match piece.special {
            SpecialKind::RowClear => {
                for col in 0..GRID_SIZE {
                    enqueue(board, Pos::new(pos.row, col), &mut queued, &mut worklist);
                }
            }
            SpecialKind::ColClear => {
                for row in 0..GRID_SIZE {
                    enqueue(board, Pos::new(row, pos.col), &mut queued, &mut worklist);
                }
            }
            SpecialKind::Dragon => {
                let mut candidates: ArrayVec<PieceKind, 9> = ArrayVec::new();
                for (p, piece) in board.iter() {
                    if let Some(kind) = piece.kind {
                        if !queued.contains(p) && !candidates.contains(&kind) {
                            candidates.push(kind);
                        }
                    }
                }
                target = rng.pick(&candidates);
                if let Some(kind) = target {
                    let hits: ArrayVec<Pos, CELL_COUNT> = board
                        .iter()
                        .filter(|(_, piece)| piece.kind == Some(kind))
                        .map(|(p, _)| p)
                        .collect();
                    for p in hits {
                        enqueue(board, p, &mut queued, &mut worklist);
                    }
                }
            }
            SpecialKind::None => {}
        }
        tracing::trace!(?pos, special = piece.special.as_str(), ?target, "special activated");
        res.activated.push(ActivatedSpecial {
            pos,
            kind: piece.special,
            target,
        });
    }

    if allow_creation {
        res.created = pick_creation(board, matches, swap_cell, &activated);
        if let Some(created) = res.created {
            board.set_special(created.pos, created.kind);
            tracing::debug!(pos = ?created.pos, special = created.kind.as_str(), "special created");
        }
    }

    res
}

fn enqueue(board: &Board, pos: Pos, queued: &mut CellSet, worklist: &mut ArrayVec<Pos, CELL_COUNT>) {
    if board.is_empty_at(pos) {
        return;
    }
    if queued.insert(pos) {
        worklist.push(pos);
    }
}

fn pick_creation(
    board: &Board,
    matches: &[Match],
    swap_cell: Option<Pos>,
    activated: &CellSet,
) -> Option<CreatedSpecial> {
    let untouched = |m: &&Match| !m.cells.iter().any(|&p| activated.contains(p));

    if let Some(swap) = swap_cell {
        let at_swap = matches
            .iter()
            .filter(untouched)
            .find(|m| m.contains(swap))
            .map(special_for)
            .filter(SpecialKind::is_special);
        if let Some(kind) = at_swap {
            if board.get(swap).is_some_and(|p| !p.is_empty()) {
                return Some(CreatedSpecial { pos: swap, kind });
            }
        }
    }

    matches.iter().filter(untouched).find_map(|m| {
        let kind = special_for(m);
        let pos = m.first()?;
        kind.is_special().then_some(CreatedSpecial { pos, kind })
    })
}
