//! Match detection - row and column run-length scan
//!
//! Rows are scanned left to right first, then columns top to bottom. Every
//! run of at least [`MIN_MATCH_LEN`] identical, non-empty pieces yields one
//! [`Match`]. Runs never overlap within an axis; a cell that belongs to both a
//! horizontal and a vertical run shows up in two matches and is deduplicated
//! downstream by the special resolver.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{Orientation, PieceKind, Pos, CELL_COUNT, GRID_SIZE, MIN_MATCH_LEN};

/// Upper bound on matches one scan can report (two runs per line, 16 lines)
pub const MAX_MATCHES: usize = 32;

/// A run of identical pieces, or a synthesized set of destroyed cells
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    pub cells: ArrayVec<Pos, CELL_COUNT>,
    pub orientation: Orientation,
}

impl Match {
    /// Wrap an arbitrary cell set as a match so ability clears can go through
    /// the normal clearing path.
    pub fn pseudo(cells: &[Pos]) -> Self {
        let mut out = ArrayVec::new();
        for &pos in cells.iter().take(CELL_COUNT) {
            if !out.contains(&pos) {
                out.push(pos);
            }
        }
        Self {
            cells: out,
            orientation: Orientation::Col,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// First cell in scan order
    pub fn first(&self) -> Option<Pos> {
        self.cells.first().copied()
    }
}

/// Matches found by one scan
pub type Matches = ArrayVec<Match, MAX_MATCHES>;

fn scan_line(board: &Board, orientation: Orientation, line: u8, out: &mut Matches) {
    let at = |i: u8| match orientation {
        Orientation::Row => Pos::new(line, i),
        Orientation::Col => Pos::new(i, line),
    };

    let mut start = 0u8;
    while start < GRID_SIZE {
        let Some(kind) = board.kind_at(at(start)) else {
            start += 1;
            continue;
        };
        let mut end = start + 1;
        while end < GRID_SIZE && board.kind_at(at(end)) == Some(kind) {
            end += 1;
        }
        if (end - start) as usize >= MIN_MATCH_LEN {
            let mut cells = ArrayVec::new();
            for i in start..end {
                cells.push(at(i));
            }
            out.push(Match { cells, orientation });
        }
        start = end;
    }
}

/// Find every match on the board, rows first then columns
pub fn find_matches(board: &Board) -> Matches {
    let mut out = Matches::new();
    for row in 0..GRID_SIZE {
        scan_line(board, Orientation::Row, row, &mut out);
    }
    for col in 0..GRID_SIZE {
        scan_line(board, Orientation::Col, col, &mut out);
    }
    out
}

/// Cheaper check for "is there at least one match"
pub fn has_match(board: &Board) -> bool {
    fn run_at(board: &Board, pos: Pos, kind: PieceKind, dr: i16, dc: i16) -> bool {
        (1..MIN_MATCH_LEN as i16)
            .all(|step| matches!(pos.offset(dr * step, dc * step), Some(p) if board.kind_at(p) == Some(kind)))
    }

    board.iter().any(|(pos, piece)| match piece.kind {
        Some(kind) => run_at(board, pos, kind, 0, 1) || run_at(board, pos, kind, 1, 0),
        None => false,
    })
}
