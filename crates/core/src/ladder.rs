//! Ladder of opponents and difficulty scaling
//!
//! A run draws [`LADDER_LENGTH`] opponents from the roster (never the
//! player's own character), shuffled. Difficulty scales each opponent:
//!
//! | Difficulty | Health | Attack | Moves per attack |
//! |------------|--------|--------|------------------|
//! | Easy | x0.8 | x0.8 | +1 |
//! | Normal | x1.0 | x1.0 | +0 |
//! | Hard | x1.2 | x1.2 | -1 (min 2) |

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{Difficulty, PieceKind, ACTIVE_POOL_SIZE, LADDER_LENGTH};

/// An opponent on the ladder; immutable for the duration of a level
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opponent {
    pub name: String,
    /// Affinity kind, added to the active piece pool
    pub kind: PieceKind,
    pub max_health: u32,
    pub attack: u32,
    pub moves_per_attack: u32,
}

impl Opponent {
    /// Canonical opponent for `kind` at the given difficulty
    pub fn canonical(kind: PieceKind, difficulty: Difficulty) -> Self {
        let (health, attack, moves) = base_stats(kind);
        let (health, attack, moves) = match difficulty {
            Difficulty::Easy => (scale(health, 8), scale(attack, 8), moves + 1),
            Difficulty::Normal => (health, attack, moves),
            Difficulty::Hard => (scale(health, 12), scale(attack, 12), moves.saturating_sub(1).max(2)),
        };
        Self {
            name: kind.display_name().to_string(),
            kind,
            max_health: health,
            attack,
            moves_per_attack: moves,
        }
    }
}

/// Roster order of the canonical ladder
pub const ROSTER: [PieceKind; 9] = [
    PieceKind::Kano,
    PieceKind::Sonya,
    PieceKind::Reptile,
    PieceKind::LiuKang,
    PieceKind::Kitana,
    PieceKind::Raiden,
    PieceKind::SubZero,
    PieceKind::Mileena,
    PieceKind::Scorpion,
];

/// (health, attack, moves per attack) at normal difficulty
fn base_stats(kind: PieceKind) -> (u32, u32, u32) {
    match kind {
        PieceKind::Kano => (100, 15, 5),
        PieceKind::Sonya => (110, 17, 5),
        PieceKind::Reptile => (120, 19, 5),
        PieceKind::LiuKang => (130, 21, 4),
        PieceKind::Kitana => (140, 23, 4),
        PieceKind::Raiden => (150, 25, 4),
        PieceKind::SubZero => (160, 27, 4),
        PieceKind::Mileena => (170, 29, 3),
        PieceKind::Scorpion => (180, 31, 3),
    }
}

/// `value * tenths / 10`, rounded half-up
fn scale(value: u32, tenths: u32) -> u32 {
    (value.saturating_mul(tenths) + 5) / 10
}

/// Draw a shuffled ladder that excludes the player's character
pub fn build_ladder(character: PieceKind, difficulty: Difficulty, rng: &mut SimpleRng) -> Vec<Opponent> {
    let mut pool: ArrayVec<PieceKind, 9> = ROSTER.into_iter().filter(|&k| k != character).collect();
    rng.shuffle(&mut pool);
    pool.into_iter()
        .take(LADDER_LENGTH)
        .map(|kind| Opponent::canonical(kind, difficulty))
        .collect()
}

/// Kinds in play: the player's character, then ladder affinities, topped up
/// from the roster until the pool holds [`ACTIVE_POOL_SIZE`] kinds
pub fn active_pool(character: PieceKind, ladder: &[Opponent]) -> ArrayVec<PieceKind, 9> {
    let mut pool = ArrayVec::new();
    let candidates = std::iter::once(character)
        .chain(ladder.iter().map(|o| o.kind))
        .chain(ROSTER);
    for kind in candidates {
        if pool.len() >= ACTIVE_POOL_SIZE {
            break;
        }
        if !pool.contains(&kind) {
            pool.push(kind);
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_stats() {
        let kano = Opponent::canonical(PieceKind::Kano, Difficulty::Normal);
        assert_eq!((kano.max_health, kano.attack, kano.moves_per_attack), (100, 15, 5));
        let scorpion = Opponent::canonical(PieceKind::Scorpion, Difficulty::Normal);
        assert_eq!((scorpion.max_health, scorpion.attack, scorpion.moves_per_attack), (180, 31, 3));
    }

    #[test]
    fn test_difficulty_scaling() {
        let easy = Opponent::canonical(PieceKind::Sonya, Difficulty::Easy);
        assert_eq!((easy.max_health, easy.attack, easy.moves_per_attack), (88, 14, 6));
        let hard = Opponent::canonical(PieceKind::Sonya, Difficulty::Hard);
        assert_eq!((hard.max_health, hard.attack, hard.moves_per_attack), (132, 20, 4));
        let hard_mileena = Opponent::canonical(PieceKind::Mileena, Difficulty::Hard);
        assert_eq!(hard_mileena.moves_per_attack, 2);
    }

    #[test]
    fn test_ladder_excludes_player_and_is_deterministic() {
        let a = build_ladder(PieceKind::Kano, Difficulty::Normal, &mut SimpleRng::new(3));
        let b = build_ladder(PieceKind::Kano, Difficulty::Normal, &mut SimpleRng::new(3));
        assert_eq!(a, b);
        assert_eq!(a.len(), LADDER_LENGTH);
        assert!(a.iter().all(|o| o.kind != PieceKind::Kano));
        let mut kinds: Vec<_> = a.iter().map(|o| o.kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), LADDER_LENGTH);
    }

    #[test]
    fn test_active_pool_starts_with_character_then_affinities() {
        let ladder = build_ladder(PieceKind::SubZero, Difficulty::Normal, &mut SimpleRng::new(9));
        let pool = active_pool(PieceKind::SubZero, &ladder);
        assert_eq!(pool.len(), ACTIVE_POOL_SIZE);
        assert_eq!(pool[0], PieceKind::SubZero);
        for (i, opp) in ladder.iter().enumerate() {
            assert_eq!(pool[i + 1], opp.kind);
        }
    }

    #[test]
    fn test_active_pool_tops_up_short_ladder() {
        let ladder = vec![Opponent::canonical(PieceKind::Kano, Difficulty::Normal)];
        let pool = active_pool(PieceKind::Kano, &ladder);
        assert_eq!(pool.len(), ACTIVE_POOL_SIZE);
        assert_eq!(pool[0], PieceKind::Kano);
        assert_eq!(pool[1], PieceKind::Sonya);
    }
}
