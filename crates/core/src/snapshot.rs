use crate::ability::Ability;
use crate::board::{Board, PieceId};
use crate::types::{
    AbilityPhase, Difficulty, EncounterStatus, PieceKind, PieceState, Pos, SpecialKind, GRID_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub kind: Option<PieceKind>,
    pub row: u8,
    pub col: u8,
    pub state: PieceState,
    pub special: SpecialKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpponentSnapshot {
    pub name: String,
    pub kind: PieceKind,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub moves_per_attack: u32,
    pub moves_until_attack: u32,
}

/// Read-only view of an encounter
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSnapshot {
    /// Kind codes per cell (0 = empty), see [`PieceKind::code`]
    pub grid: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize],
    pub pieces: Vec<PieceSnapshot>,
    pub character: PieceKind,
    pub ability: Ability,
    pub ability_phase: AbilityPhase,
    pub aim_targets: Vec<Pos>,
    pub meter: u32,
    pub meter_max: u32,
    pub player_health: u32,
    pub player_max_health: u32,
    pub opponent: OpponentSnapshot,
    pub combo: u32,
    pub max_combo: u32,
    pub score: u32,
    pub difficulty: Difficulty,
    pub level: usize,
    pub ladder_len: usize,
    pub status: EncounterStatus,
    pub busy: bool,
    pub seed: u32,
}

impl EncounterSnapshot {
    /// Copy board contents, reusing the `pieces` allocation
    pub fn write_board(&mut self, board: &Board) {
        self.pieces.clear();
        for (pos, piece) in board.iter() {
            self.grid[pos.row as usize][pos.col as usize] = piece.kind.map(|k| k.code()).unwrap_or(0);
            self.pieces.push(PieceSnapshot {
                id: piece.id,
                kind: piece.kind,
                row: pos.row,
                col: pos.col,
                state: piece.state,
                special: piece.special,
            });
        }
    }

    pub fn piece_at(&self, pos: Pos) -> Option<&PieceSnapshot> {
        self.pieces.get(pos.index())
    }

    /// Whether swaps and abilities are currently accepted
    pub fn playable(&self) -> bool {
        self.status.is_playing() && !self.busy
    }
}

impl Default for EncounterSnapshot {
    fn default() -> Self {
        Self {
            grid: [[0u8; GRID_SIZE as usize]; GRID_SIZE as usize],
            pieces: Vec::with_capacity(crate::types::CELL_COUNT),
            character: PieceKind::SubZero,
            ability: Ability::for_character(PieceKind::SubZero),
            ability_phase: AbilityPhase::Idle,
            aim_targets: Vec::new(),
            meter: 0,
            meter_max: 0,
            player_health: 0,
            player_max_health: 0,
            opponent: OpponentSnapshot {
                name: String::new(),
                kind: PieceKind::Kano,
                health: 0,
                max_health: 0,
                attack: 0,
                moves_per_attack: 0,
                moves_until_attack: 0,
            },
            combo: 1,
            max_combo: 1,
            score: 0,
            difficulty: Difficulty::Normal,
            level: 0,
            ladder_len: 0,
            status: EncounterStatus::Playing,
            busy: false,
            seed: 0,
        }
    }
}
