//! Board generation, gravity and refill
//!
//! Fresh boards are produced by rejection sampling. Cells are filled row-major,
//! each drawing uniformly from the pool kinds that would not complete a run
//! with the two cells to its left or the two above it, so a sample never
//! contains a match. A sample is kept only if it has at least one possible
//! move. Sampling is bounded by [`MAX_GENERATION_ATTEMPTS`] so a pathological
//! pool surfaces as an error instead of spinning forever.
//!
//! Refill and gravity carry no guarantees; the cascade loop resolves whatever
//! matches they happen to create.

use arrayvec::ArrayVec;

use crate::advisor::has_possible_moves;
use crate::board::Board;
use crate::error::CoreError;
use crate::matching::has_match;
use crate::rng::SimpleRng;
use crate::types::{PieceKind, Pos, CELL_COUNT, GRID_SIZE, MAX_GENERATION_ATTEMPTS, MIN_ACTIVE_TYPES};

/// Reject pools with fewer than three distinct kinds
pub fn validate_pool(pool: &[PieceKind]) -> Result<(), CoreError> {
    distinct_kinds(pool).map(|_| ())
}

fn distinct_kinds(pool: &[PieceKind]) -> Result<ArrayVec<PieceKind, 9>, CoreError> {
    let mut distinct: ArrayVec<PieceKind, 9> = ArrayVec::new();
    for &kind in pool {
        if !distinct.contains(&kind) {
            distinct.push(kind);
        }
    }
    if distinct.len() < MIN_ACTIVE_TYPES {
        return Err(CoreError::PoolTooSmall {
            len: distinct.len(),
        });
    }
    Ok(distinct)
}

fn random_kind(pool: &[PieceKind], rng: &mut SimpleRng) -> PieceKind {
    pool[rng.next_index(pool.len())]
}

fn completes_run(board: &Board, pos: Pos, kind: PieceKind) -> bool {
    let same = |dr: i16, dc: i16| pos.offset(dr, dc).and_then(|p| board.kind_at(p)) == Some(kind);
    (same(0, -1) && same(0, -2)) || (same(-1, 0) && same(-2, 0))
}

/// Draw a kind for `pos` that does not extend a run to its left or above
///
/// With three or more distinct kinds at most two are ever excluded.
fn run_free_kind(board: &Board, pos: Pos, kinds: &[PieceKind], rng: &mut SimpleRng) -> PieceKind {
    let allowed: ArrayVec<PieceKind, 9> = kinds
        .iter()
        .copied()
        .filter(|&k| !completes_run(board, pos, k))
        .collect();
    if allowed.is_empty() {
        random_kind(kinds, rng)
    } else {
        random_kind(&allowed, rng)
    }
}

/// Build a settled, solvable board from scratch
pub fn create_initial_board(pool: &[PieceKind], rng: &mut SimpleRng) -> Result<Board, CoreError> {
    let mut board = Board::new();
    regenerate(&mut board, pool, rng)?;
    Ok(board)
}

/// Replace every piece on `board`, continuing its id sequence
///
/// On error the board holds the last rejected sample.
pub fn regenerate(board: &mut Board, pool: &[PieceKind], rng: &mut SimpleRng) -> Result<(), CoreError> {
    let kinds = distinct_kinds(pool)?;
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        for index in 0..CELL_COUNT {
            if let Some(pos) = Pos::from_index(index) {
                let kind = run_free_kind(board, pos, &kinds, rng);
                board.place(pos, kind);
            }
        }
        if !has_match(board) && has_possible_moves(board) {
            tracing::trace!(attempt, "board generated");
            return Ok(());
        }
    }
    Err(CoreError::GenerationExhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

/// Fill every empty cell with a random kind, row-major
///
/// Returns the refilled positions in fill order.
pub fn refill_board(
    board: &mut Board,
    pool: &[PieceKind],
    rng: &mut SimpleRng,
) -> ArrayVec<Pos, CELL_COUNT> {
    let mut filled = ArrayVec::new();
    if pool.is_empty() {
        return filled;
    }
    for index in 0..CELL_COUNT {
        let Some(pos) = Pos::from_index(index) else {
            continue;
        };
        if board.is_empty_at(pos) {
            board.place(pos, random_kind(pool, rng));
            filled.push(pos);
        }
    }
    filled
}

/// Compact each column downward, preserving order
///
/// Vacated cells receive fresh empty placeholders. Returns true if any piece
/// moved.
pub fn apply_gravity(board: &mut Board) -> bool {
    let mut moved = false;
    for col in 0..GRID_SIZE {
        let mut write = GRID_SIZE as i16 - 1;
        for row in (0..GRID_SIZE).rev() {
            let from = Pos::new(row, col);
            if board.is_empty_at(from) {
                continue;
            }
            let to = Pos::new(write as u8, col);
            if to != from {
                board.swap(from, to);
                board.clear_cell(from);
                moved = true;
            }
            write -= 1;
        }
    }
    moved
}
