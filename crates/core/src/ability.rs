//! Character abilities
//!
//! Every character owns exactly one ability. Abilities either destroy a set
//! of cells (returned as a pseudo-match so the normal clearing, damage and
//! combo path applies) or rearrange the board in place (the cascade then
//! re-runs match detection).
//!
//! | Ability | Character | Targets | Effect |
//! |---------|-----------|---------|--------|
//! | Lightning Strike | Raiden | 0 | 2x2 block at a random anchor |
//! | Ice Shatter | Sub-Zero | 1 | 2x2 block anchored at the target, clamped |
//! | Kano Ball | Kano | 0 | one random full row |
//! | Acid Spit | Reptile | 0 | one random full column |
//! | Netherrealm Flame | Scorpion | 1 | every piece of the target's kind |
//! | Dragon Fire | Liu Kang | 0 | converts one random other kind to Liu Kang |
//! | Fan Lift | Kitana | 1 | permutes kinds inside a clamped 3x3 |
//! | Energy Ring | Sonya | 1 | target plus orthogonal neighbours |
//! | Teleport Strike | Mileena | 0 | 3 distinct random pieces |

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::matching::Match;
use crate::rng::SimpleRng;
use crate::types::{PieceKind, Pos, CELL_COUNT, GRID_SIZE, RANDOM_STRIKE_COUNT};

/// Ability variants, keyed by effect shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Ability {
    /// 2x2 block at a random anchor
    AreaRandom,
    /// 2x2 block anchored at the target
    TargetedArea,
    /// A random full row
    RowRandom,
    /// A random full column
    ColumnRandom,
    /// Every piece of the target cell's kind
    TypeAnnihilate,
    /// Convert one other kind into the actor's kind
    Conversion,
    /// Permute kinds in the 3x3 around the target
    Scramble,
    /// Target cell and its orthogonal neighbours
    PlusShape,
    /// `count` distinct random pieces
    RandomN { count: usize },
}

impl Ability {
    pub fn for_character(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Raiden => Ability::AreaRandom,
            PieceKind::SubZero => Ability::TargetedArea,
            PieceKind::Kano => Ability::RowRandom,
            PieceKind::Reptile => Ability::ColumnRandom,
            PieceKind::Scorpion => Ability::TypeAnnihilate,
            PieceKind::LiuKang => Ability::Conversion,
            PieceKind::Kitana => Ability::Scramble,
            PieceKind::Sonya => Ability::PlusShape,
            PieceKind::Mileena => Ability::RandomN {
                count: RANDOM_STRIKE_COUNT,
            },
        }
    }

    /// Number of target cells the ability consumes before it fires
    pub const fn arity(&self) -> usize {
        match self {
            Ability::TargetedArea
            | Ability::TypeAnnihilate
            | Ability::Scramble
            | Ability::PlusShape => 1,
            Ability::AreaRandom
            | Ability::RowRandom
            | Ability::ColumnRandom
            | Ability::Conversion
            | Ability::RandomN { .. } => 0,
        }
    }

    /// Whether the ability rearranges the board instead of destroying pieces
    pub const fn mutates_board(&self) -> bool {
        matches!(self, Ability::Conversion | Ability::Scramble)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::AreaRandom => "Lightning Strike",
            Ability::TargetedArea => "Ice Shatter",
            Ability::RowRandom => "Kano Ball",
            Ability::ColumnRandom => "Acid Spit",
            Ability::TypeAnnihilate => "Netherrealm Flame",
            Ability::Conversion => "Dragon Fire",
            Ability::Scramble => "Fan Lift",
            Ability::PlusShape => "Energy Ring",
            Ability::RandomN { .. } => "Teleport Strike",
        }
    }

    /// Check a target before it is accepted for aiming
    pub fn accepts_target(&self, board: &Board, target: Pos) -> bool {
        if !target.in_bounds() {
            return false;
        }
        match self {
            Ability::TypeAnnihilate => !board.is_empty_at(target),
            _ => true,
        }
    }

    /// Apply the ability to `board`
    ///
    /// `targets` must hold exactly [`arity`](Ability::arity) validated cells.
    pub fn execute(
        &self,
        board: &mut Board,
        actor: PieceKind,
        targets: &[Pos],
        rng: &mut SimpleRng,
    ) -> AbilityOutcome {
        let mut cells: ArrayVec<Pos, CELL_COUNT> = ArrayVec::new();
        let last = GRID_SIZE - 1;
        let target = targets.first().copied();

        match *self {
            Ability::AreaRandom => {
                let row = rng.next_range(last as u32) as u8;
                let col = rng.next_range(last as u32) as u8;
                push_block(&mut cells, row, col, 2);
            }
            Ability::TargetedArea => {
                if let Some(t) = target {
                    push_block(&mut cells, t.row.min(GRID_SIZE - 2), t.col.min(GRID_SIZE - 2), 2);
                }
            }
            Ability::RowRandom => {
                let row = rng.next_range(GRID_SIZE as u32) as u8;
                cells.extend((0..GRID_SIZE).map(|c| Pos::new(row, c)));
            }
            Ability::ColumnRandom => {
                let col = rng.next_range(GRID_SIZE as u32) as u8;
                cells.extend((0..GRID_SIZE).map(|r| Pos::new(r, col)));
            }
            Ability::TypeAnnihilate => {
                if let Some(kind) = target.and_then(|t| board.kind_at(t)) {
                    cells.extend(board.iter().filter(|(_, p)| p.kind == Some(kind)).map(|(p, _)| p));
                }
            }
            Ability::PlusShape => {
                if let Some(t) = target {
                    cells.push(t);
                    for (dr, dc) in [(-1i16, 0i16), (1, 0), (0, -1), (0, 1)] {
                        if let Some(n) = t.offset(dr, dc) {
                            cells.push(n);
                        }
                    }
                }
            }
            Ability::RandomN { count } => {
                let mut pool: ArrayVec<Pos, CELL_COUNT> = board
                    .iter()
                    .filter(|(_, p)| !p.is_empty())
                    .map(|(p, _)| p)
                    .collect();
                for _ in 0..count {
                    if pool.is_empty() {
                        break;
                    }
                    let i = rng.next_index(pool.len());
                    cells.push(pool.remove(i));
                }
            }
            Ability::Conversion => {
                let others: ArrayVec<PieceKind, 9> =
                    board.kinds_present().into_iter().filter(|&k| k != actor).collect();
                if let Some(victim) = rng.pick(&others) {
                    let hits: ArrayVec<Pos, CELL_COUNT> = board
                        .iter()
                        .filter(|(_, p)| p.kind == Some(victim))
                        .map(|(p, _)| p)
                        .collect();
                    for &pos in &hits {
                        board.set_kind(pos, Some(actor));
                    }
                    cells = hits;
                }
            }
            Ability::Scramble => {
                if let Some(t) = target {
                    let (r0, r1) = (t.row.saturating_sub(1), (t.row + 1).min(last));
                    let (c0, c1) = (t.col.saturating_sub(1), (t.col + 1).min(last));
                    for r in r0..=r1 {
                        for c in c0..=c1 {
                            cells.push(Pos::new(r, c));
                        }
                    }
                    let mut kinds: ArrayVec<Option<PieceKind>, 9> =
                        cells.iter().map(|&p| board.kind_at(p)).collect();
                    rng.shuffle(&mut kinds);
                    for (&pos, kind) in cells.iter().zip(kinds) {
                        board.set_kind(pos, kind);
                    }
                }
            }
        }

        let destroyed = if self.mutates_board() || cells.is_empty() {
            None
        } else {
            Some(Match::pseudo(&cells))
        };

        AbilityOutcome {
            ability: *self,
            affected: cells,
            destroyed,
        }
    }
}

fn push_block(cells: &mut ArrayVec<Pos, CELL_COUNT>, row: u8, col: u8, size: u8) {
    for r in row..row + size {
        for c in col..col + size {
            cells.push(Pos::new(r, c));
        }
    }
}

/// What an ability touched
#[derive(Debug, Clone)]
pub struct AbilityOutcome {
    pub ability: Ability,
    /// Cells destroyed, converted or scrambled
    pub affected: ArrayVec<Pos, CELL_COUNT>,
    /// Pseudo-match for destroying abilities
    pub destroyed: Option<Match>,
}
