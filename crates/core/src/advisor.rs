//! Move advisor - exhaustive adjacent-swap search
//!
//! Walks the board in row-major order and, for each cell, tries swapping with
//! its right neighbour and then its down neighbour on a scratch copy. The
//! first swap that produces a match is returned. No randomness is involved, so
//! the same board always yields the same hint.

use crate::board::Board;
use crate::matching::has_match;
use crate::types::Pos;

/// Find the first swap (in scan order) that creates a match
pub fn find_possible_move(board: &Board) -> Option<(Pos, Pos)> {
    let mut scratch = board.clone();
    for (pos, _) in board.iter() {
        for (dr, dc) in [(0i16, 1i16), (1, 0)] {
            let Some(other) = pos.offset(dr, dc) else {
                continue;
            };
            if scratch.is_empty_at(pos) || scratch.is_empty_at(other) {
                continue;
            }
            scratch.swap(pos, other);
            let found = has_match(&scratch);
            scratch.swap(pos, other);
            if found {
                return Some((pos, other));
            }
        }
    }
    None
}

/// Whether any legal swap creates a match
pub fn has_possible_moves(board: &Board) -> bool {
    find_possible_move(board).is_some()
}
