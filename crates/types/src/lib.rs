//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no required dependencies, so it can be
//! used by the simulation core, the pacing engine and any presentation layer.
//!
//! # Board Dimensions
//!
//! The playfield is a fixed 8x8 grid addressed by `(row, col)`:
//!
//! - **Rows**: 0-7, top to bottom
//! - **Columns**: 0-7, left to right
//! - **Slot index**: `row * 8 + col`
//!
//! # Pacing Constants
//!
//! Timing values are in milliseconds and only matter to whoever paces the
//! engine between phases:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `ANIMATION_DELAY_MS` | 150 | Base pacing unit |
//! | `SWAP_PAUSE_MS` | 300 | After a swap or ability is applied |
//! | `CLEAR_PAUSE_MS` | 450 | After matched pieces are marked |
//! | `REFILL_PAUSE_MS` | 300 | After gravity and refill |
//! | `REGENERATION_PAUSE_MS` | 500 | Before an unsolvable board is replaced |
//!
//! # Examples
//!
//! ```
//! use krush_types::{Difficulty, PieceKind, Pos, GRID_SIZE};
//!
//! let kind = PieceKind::from_str("subzero").unwrap();
//! assert_eq!(kind, PieceKind::SubZero);
//! assert_eq!(kind.as_str(), "subzero");
//!
//! let a = Pos::new(2, 3);
//! assert!(a.is_adjacent(Pos::new(2, 4)));
//! assert!(!a.is_adjacent(Pos::new(3, 4)));
//!
//! assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
//! assert_eq!(GRID_SIZE, 8);
//! ```

/// Board side length in cells
pub const GRID_SIZE: u8 = 8;

/// Total number of cells on the board
pub const CELL_COUNT: usize = (GRID_SIZE as usize) * (GRID_SIZE as usize);

/// Minimum run length that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Player health at the start of every ladder level
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Meter points needed to unlock the character ability
pub const ABILITY_METER_MAX: u32 = 18;

/// Flat damage added for every special tile activation
pub const SPECIAL_ACTIVATION_DAMAGE: u32 = 15;

/// Damage weight numerator for pieces of the player's own kind (3/2 = 1.5x)
pub const OWN_KIND_NUMERATOR: u32 = 3;

/// Damage weight denominator (every other piece weighs 2/2 = 1.0x)
pub const DAMAGE_DENOMINATOR: u32 = 2;

/// Number of piece kinds in play during an encounter
pub const ACTIVE_POOL_SIZE: usize = 6;

/// Smallest pool the generator accepts
pub const MIN_ACTIVE_TYPES: usize = 3;

/// Number of opponents drawn for a ladder run
pub const LADDER_LENGTH: usize = 5;

/// Upper bound on rejection-sampling attempts when generating a board
pub const MAX_GENERATION_ATTEMPTS: u32 = 10_000;

/// Pieces destroyed by the random-N ability
pub const RANDOM_STRIKE_COUNT: usize = 3;

/// Base pacing unit in milliseconds
pub const ANIMATION_DELAY_MS: u32 = 150;

/// Pause after a swap or an ability lands
pub const SWAP_PAUSE_MS: u32 = ANIMATION_DELAY_MS * 2;

/// Pause while cleared pieces are shown as matched
pub const CLEAR_PAUSE_MS: u32 = ANIMATION_DELAY_MS * 3;

/// Pause after gravity and refill
pub const REFILL_PAUSE_MS: u32 = ANIMATION_DELAY_MS * 2;

/// Pause before an unsolvable board is replaced
pub const REGENERATION_PAUSE_MS: u32 = 500;


/// A cell address on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build a position from signed coordinates, returning None when off the board
    pub fn checked(row: i16, col: i16) -> Option<Self> {
        let size = GRID_SIZE as i16;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    /// Whether both coordinates are on the board
    pub fn in_bounds(self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// Flat slot index (`row * 8 + col`)
    #[inline(always)]
    pub fn index(self) -> usize {
        (self.row as usize) * (GRID_SIZE as usize) + (self.col as usize)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= CELL_COUNT {
            return None;
        }
        let size = GRID_SIZE as usize;
        Some(Self::new((index / size) as u8, (index % size) as u8))
    }

    /// Orthogonal neighbour check (Manhattan distance of exactly 1)
    pub fn is_adjacent(self, other: Pos) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }

    /// Offset this position, returning None when the result leaves the board
    pub fn offset(self, dr: i16, dc: i16) -> Option<Self> {
        Self::checked(self.row as i16 + dr, self.col as i16 + dc)
    }
}

/// The playable characters, which double as the tile kinds on the board
///
/// Each character also owns exactly one ability (see the core crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PieceKind {
    Scorpion,
    SubZero,
    Raiden,
    Reptile,
    Kano,
    LiuKang,
    Kitana,
    Mileena,
    Sonya,
}

impl PieceKind {
    /// Every kind in roster order
    pub const ALL: [PieceKind; 9] = [
        PieceKind::Scorpion,
        PieceKind::SubZero,
        PieceKind::Reptile,
        PieceKind::Kano,
        PieceKind::Raiden,
        PieceKind::LiuKang,
        PieceKind::Kitana,
        PieceKind::Mileena,
        PieceKind::Sonya,
    ];

    /// Parse a kind from its identifier (case-insensitive, `-`/`_`/spaces ignored)
    ///
    /// # Examples
    ///
    /// ```
    /// use krush_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("Sub-Zero"), Some(PieceKind::SubZero));
    /// assert_eq!(PieceKind::from_str("kano"), Some(PieceKind::Kano));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "scorpion" => Some(PieceKind::Scorpion),
            "subzero" => Some(PieceKind::SubZero),
            "raiden" => Some(PieceKind::Raiden),
            "reptile" => Some(PieceKind::Reptile),
            "kano" => Some(PieceKind::Kano),
            "liukang" => Some(PieceKind::LiuKang),
            "kitana" => Some(PieceKind::Kitana),
            "mileena" => Some(PieceKind::Mileena),
            "sonya" => Some(PieceKind::Sonya),
            _ => None,
        }
    }

    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Scorpion => "scorpion",
            PieceKind::SubZero => "subzero",
            PieceKind::Raiden => "raiden",
            PieceKind::Reptile => "reptile",
            PieceKind::Kano => "kano",
            PieceKind::LiuKang => "liukang",
            PieceKind::Kitana => "kitana",
            PieceKind::Mileena => "mileena",
            PieceKind::Sonya => "sonya",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            PieceKind::Scorpion => "Scorpion",
            PieceKind::SubZero => "Sub-Zero",
            PieceKind::Raiden => "Raiden",
            PieceKind::Reptile => "Reptile",
            PieceKind::Kano => "Kano",
            PieceKind::LiuKang => "Liu Kang",
            PieceKind::Kitana => "Kitana",
            PieceKind::Mileena => "Mileena",
            PieceKind::Sonya => "Sonya",
        }
    }

    /// Single-letter glyph used by text board layouts
    pub fn glyph(&self) -> char {
        match self {
            PieceKind::Scorpion => 'S',
            PieceKind::SubZero => 'Z',
            PieceKind::Raiden => 'R',
            PieceKind::Reptile => 'P',
            PieceKind::Kano => 'K',
            PieceKind::LiuKang => 'L',
            PieceKind::Kitana => 'T',
            PieceKind::Mileena => 'M',
            PieceKind::Sonya => 'Y',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        PieceKind::ALL.into_iter().find(|k| k.glyph() == c)
    }

    /// Small numeric code used by compact grid snapshots (0 is reserved for empty)
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::Scorpion => 1,
            PieceKind::SubZero => 2,
            PieceKind::Raiden => 3,
            PieceKind::Reptile => 4,
            PieceKind::Kano => 5,
            PieceKind::LiuKang => 6,
            PieceKind::Kitana => 7,
            PieceKind::Mileena => 8,
            PieceKind::Sonya => 9,
        }
    }
}

/// Bonus clear behaviour carried by a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecialKind {
    #[default]
    None,
    /// Clears its whole row when activated
    RowClear,
    /// Clears its whole column when activated
    ColClear,
    /// Clears every piece of one randomly chosen kind
    Dragon,
}

impl SpecialKind {
    pub fn is_special(&self) -> bool {
        !matches!(self, SpecialKind::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::None => "none",
            SpecialKind::RowClear => "row",
            SpecialKind::ColClear => "col",
            SpecialKind::Dragon => "dragon",
        }
    }
}

/// Presentation hint attached to a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PieceState {
    #[default]
    Idle,
    Matched,
    Frozen,
    Fatality,
}

/// Axis of a match run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    Row,
    Col,
}

/// Lifecycle of the character ability
///
/// The cycle goes: Idle → Ready (meter full) → Aiming (targeted abilities only) → Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityPhase {
    #[default]
    Idle,
    Ready,
    Aiming,
}

/// Ladder difficulty applied to every opponent of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

/// Where an encounter stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EncounterStatus {
    /// Accepting swaps and abilities
    Playing,
    /// Current opponent beaten, more opponents remain
    LevelWon,
    /// Final opponent beaten
    LadderComplete,
    /// Player health reached zero
    Defeated,
}

impl EncounterStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, EncounterStatus::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EncounterStatus::Playing => "playing",
            EncounterStatus::LevelWon => "level_won",
            EncounterStatus::LadderComplete => "ladder_complete",
            EncounterStatus::Defeated => "defeated",
        }
    }
}

/// Terminal result of a ladder level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    /// The last opponent of the ladder was defeated
    Win,
    /// The player was defeated
    Loss,
    /// An opponent was defeated and the ladder continues
    LevelComplete,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::LevelComplete => "level_complete",
        }
    }
}
