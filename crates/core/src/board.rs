//! Board module - owns the 8x8 grid of pieces
//!
//! The board is a flat arena of [`CELL_COUNT`] slots addressed by
//! `row * 8 + col`. Moving a piece means reassigning slot contents; a piece's
//! position is always the slot it currently sits in.
//!
//! The board also owns the id allocator. Every new piece (fills, refills,
//! fresh empty placeholders) takes the next id, so ids never repeat within
//! the lifetime of a board, including across regeneration.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, PieceState, Pos, SpecialKind, CELL_COUNT, GRID_SIZE};

/// Unique piece identity
pub type PieceId = u32;

/// A single tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub id: PieceId,
    /// `None` marks an empty cell
    pub kind: Option<PieceKind>,
    pub state: PieceState,
    pub special: SpecialKind,
}

impl Piece {
    pub const fn empty(id: PieceId) -> Self {
        Self {
            id,
            kind: None,
            state: PieceState::Idle,
            special: SpecialKind::None,
        }
    }

    pub const fn new(id: PieceId, kind: PieceKind) -> Self {
        Self {
            id,
            kind: Some(kind),
            state: PieceState::Idle,
            special: SpecialKind::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }
}

/// The playfield - 8 columns x 8 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of pieces, row-major order (row * 8 + col)
    cells: [Piece; CELL_COUNT],
    next_id: PieceId,
}

impl Board {
    /// Create a board of empty placeholders with ids 0..64
    pub fn new() -> Self {
        let mut cells = [Piece::empty(0); CELL_COUNT];
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.id = i as PieceId;
        }
        Self {
            cells,
            next_id: CELL_COUNT as PieceId,
        }
    }

    /// Build a board from text rows of piece glyphs
    ///
    /// Each row must hold exactly 8 characters. `.` marks an empty cell and
    /// letters follow [`PieceKind::glyph`]. Specials are added afterwards with
    /// [`Board::set_special`].
    ///
    /// # Examples
    ///
    /// ```
    /// use krush_core::Board;
    /// use krush_core::types::{PieceKind, Pos};
    ///
    /// let board = Board::from_rows(&[
    ///     "ZRPKLTMY",
    ///     "RPKLTMYZ",
    ///     "ZRPKLTMY",
    ///     "RPKLTMYZ",
    ///     "ZRPKLTMY",
    ///     "RPKLTMYZ",
    ///     "ZRPKLTMY",
    ///     "RPKLTMY.",
    /// ]).unwrap();
    /// assert_eq!(board.kind_at(Pos::new(0, 0)), Some(PieceKind::SubZero));
    /// assert_eq!(board.kind_at(Pos::new(7, 7)), None);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        if rows.len() != GRID_SIZE as usize {
            return None;
        }
        let mut board = Self::new();
        for (r, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = line.chars().collect();
            if glyphs.len() != GRID_SIZE as usize {
                return None;
            }
            for (c, glyph) in glyphs.into_iter().enumerate() {
                let pos = Pos::new(r as u8, c as u8);
                if glyph == '.' {
                    continue;
                }
                board.place(pos, PieceKind::from_glyph(glyph)?);
            }
        }
        Some(board)
    }

    /// Render the board as text rows (inverse of [`Board::from_rows`])
    pub fn to_rows(&self) -> Vec<String> {
        (0..GRID_SIZE)
            .map(|r| {
                (0..GRID_SIZE)
                    .map(|c| {
                        self.kind_at(Pos::new(r, c))
                            .map(|k| k.glyph())
                            .unwrap_or('.')
                    })
                    .collect()
            })
            .collect()
    }

    /// Calculate flat index, returning None when out of bounds
    #[inline(always)]
    fn index(pos: Pos) -> Option<usize> {
        if !pos.in_bounds() {
            return None;
        }
        Some(pos.index())
    }

    fn alloc_id(&mut self) -> PieceId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Next id the allocator will hand out
    pub fn next_id(&self) -> PieceId {
        self.next_id
    }

    /// Piece at `pos`, or None if out of bounds
    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        Self::index(pos).map(|idx| &self.cells[idx])
    }

    /// Kind at `pos`; None for empty cells and out-of-bounds positions
    pub fn kind_at(&self, pos: Pos) -> Option<PieceKind> {
        self.get(pos).and_then(|p| p.kind)
    }

    pub fn is_empty_at(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(p) if p.is_empty())
    }

    /// Position of the piece with the given id
    pub fn find_id(&self, id: PieceId) -> Option<Pos> {
        self.cells
            .iter()
            .position(|p| p.id == id)
            .and_then(Pos::from_index)
    }

    /// Swap the contents of two slots
    /// Returns false if either position is out of bounds
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        match (Self::index(a), Self::index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// Replace the piece at `pos` with a fresh empty placeholder
    pub fn clear_cell(&mut self, pos: Pos) -> bool {
        let Some(idx) = Self::index(pos) else {
            return false;
        };
        let id = self.alloc_id();
        self.cells[idx] = Piece::empty(id);
        true
    }

    /// Put a brand-new piece of `kind` at `pos`
    pub fn place(&mut self, pos: Pos, kind: PieceKind) -> bool {
        let Some(idx) = Self::index(pos) else {
            return false;
        };
        let id = self.alloc_id();
        self.cells[idx] = Piece::new(id, kind);
        true
    }

    /// Change the kind of the existing piece at `pos`, keeping its identity
    pub fn set_kind(&mut self, pos: Pos, kind: Option<PieceKind>) -> bool {
        match Self::index(pos) {
            Some(idx) => {
                self.cells[idx].kind = kind;
                true
            }
            None => false,
        }
    }

    pub fn set_special(&mut self, pos: Pos, special: SpecialKind) -> bool {
        match Self::index(pos) {
            Some(idx) => {
                self.cells[idx].special = special;
                true
            }
            None => false,
        }
    }

    pub fn set_state(&mut self, pos: Pos, state: PieceState) -> bool {
        match Self::index(pos) {
            Some(idx) => {
                self.cells[idx].state = state;
                true
            }
            None => false,
        }
    }

    /// Reset every piece's presentation state to idle
    pub fn reset_states(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.state = PieceState::Idle;
        }
    }

    /// Iterate over `(pos, piece)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, p)| Pos::from_index(i).map(|pos| (pos, p)))
    }

    /// Raw slot slice, row-major
    pub fn cells(&self) -> &[Piece; CELL_COUNT] {
        &self.cells
    }

    /// Distinct kinds on the board in first-seen row-major order
    pub fn kinds_present(&self) -> ArrayVec<PieceKind, 9> {
        let mut out = ArrayVec::new();
        for kind in self.cells.iter().filter_map(|p| p.kind) {
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        out
    }

    pub fn count_kind(&self, kind: PieceKind) -> usize {
        self.cells.iter().filter(|p| p.kind == Some(kind)).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|p| p.is_empty()).count()
    }

    /// Compare kinds and specials cell by cell, ignoring ids and states
    pub fn same_layout(&self, other: &Board) -> bool {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .all(|(a, b)| a.kind == b.kind && a.special == b.special)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: [&str; 8] = [
        "ZRPKLTMY", "RPKLTMYZ", "ZRPKLTMY", "RPKLTMYZ", "ZRPKLTMY", "RPKLTMYZ", "ZRPKLTMY",
        "RPKLTMYZ",
    ];

    #[test]
    fn test_new_board_is_empty_with_unique_ids() {
        let board = Board::new();
        assert_eq!(board.empty_count(), CELL_COUNT);
        let mut ids: Vec<_> = board.cells().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), CELL_COUNT);
        assert_eq!(board.next_id(), 64);
    }

    #[test]
    fn test_from_rows_roundtrip() {
        let board = Board::from_rows(&LAYOUT).unwrap();
        let rows = board.to_rows();
        assert_eq!(rows, LAYOUT.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Board::from_rows(&LAYOUT[..7]).is_none());
        let mut bad = LAYOUT;
        bad[0] = "ZRPKLTM";
        assert!(Board::from_rows(&bad).is_none());
        bad[0] = "ZRPKLTMYZ";
        assert!(Board::from_rows(&bad).is_none());
        bad[0] = "ZRPKLTMX";
        assert!(Board::from_rows(&bad).is_none());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::new();
        assert!(board.get(Pos::new(8, 0)).is_none());
        assert!(board.get(Pos::new(0, 8)).is_none());
        assert_eq!(board.kind_at(Pos::new(9, 9)), None);
    }

    #[test]
    fn test_swap_moves_identity() {
        let mut board = Board::from_rows(&LAYOUT).unwrap();
        let a = Pos::new(0, 0);
        let b = Pos::new(0, 1);
        let id_a = board.get(a).unwrap().id;
        let id_b = board.get(b).unwrap().id;
        assert!(board.swap(a, b));
        assert_eq!(board.get(a).unwrap().id, id_b);
        assert_eq!(board.get(b).unwrap().id, id_a);
        assert_eq!(board.find_id(id_a), Some(b));
        assert!(!board.swap(a, Pos::new(8, 0)));
    }

    #[test]
    fn test_clear_cell_assigns_fresh_id() {
        let mut board = Board::from_rows(&LAYOUT).unwrap();
        let pos = Pos::new(3, 3);
        let old = board.get(pos).unwrap().id;
        assert!(board.clear_cell(pos));
        let new = board.get(pos).unwrap();
        assert!(new.is_empty());
        assert!(new.id > old);
    }

    #[test]
    fn test_same_layout_ignores_ids() {
        let a = Board::from_rows(&LAYOUT).unwrap();
        let mut b = a.clone();
        b.set_kind(Pos::new(0, 0), Some(PieceKind::SubZero));
        b.clear_cell(Pos::new(1, 1));
        b.place(Pos::new(1, 1), PieceKind::Reptile);
        assert!(a.same_layout(&b));
        b.set_special(Pos::new(2, 2), SpecialKind::Dragon);
        assert!(!a.same_layout(&b));
    }

    #[test]
    fn test_kinds_present_first_seen_order() {
        let board = Board::from_rows(&LAYOUT).unwrap();
        let kinds = board.kinds_present();
        assert_eq!(kinds[0], PieceKind::SubZero);
        assert_eq!(kinds[1], PieceKind::Raiden);
        assert_eq!(kinds.len(), 8);
        assert_eq!(board.count_kind(PieceKind::Scorpion), 0);
    }
}
