//! Combat resolution - damage, ability meter and the opponent countdown
//!
//! # Damage
//!
//! Each cascade iteration deals
//!
//! ```text
//! round((sum(weight of each cleared piece) + special damage) * combo)
//! ```
//!
//! where a piece of the player's own kind weighs 1.5 and every other piece
//! 1.0. The sum is kept in exact half-points (3 and 2) and rounded half-up at
//! the end, so results never depend on floating point.
//!
//! | Cleared | Own kind | Specials | Combo | Damage |
//! |---------|----------|----------|-------|--------|
//! | 4 | 0 | 0 | 1 | 4 |
//! | 4 | 4 | 0 | 1 | 6 |
//! | 3 | 3 | 0 | 1 | 5 (4.5 rounds up) |
//! | 11 | 0 | 1 | 1 | 26 |
//! | 3 | 0 | 0 | 2 | 6 |

use crate::ladder::Opponent;
use crate::types::{
    AbilityPhase, PieceKind, ABILITY_METER_MAX, DAMAGE_DENOMINATOR, OWN_KIND_NUMERATOR,
    PLAYER_MAX_HEALTH,
};

/// Which cleared pieces charge the ability meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeterPolicy {
    /// +1 per cleared piece of the player's own kind
    #[default]
    OwnKind,
    /// +1 per cleared piece
    AllCleared,
}

impl MeterPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "own" | "own_kind" => Some(MeterPolicy::OwnKind),
            "all" | "all_cleared" => Some(MeterPolicy::AllCleared),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeterPolicy::OwnKind => "own",
            MeterPolicy::AllCleared => "all",
        }
    }

    /// Meter points earned for a clear
    pub fn points(&self, cleared: usize, own_kind: usize) -> u32 {
        match self {
            MeterPolicy::OwnKind => own_kind as u32,
            MeterPolicy::AllCleared => cleared as u32,
        }
    }
}

/// Base damage of a clear, in half-points
pub fn base_half_points(kinds: impl IntoIterator<Item = PieceKind>, actor: PieceKind) -> u32 {
    kinds.into_iter().fold(0u32, |acc, kind| {
        let weight = if kind == actor {
            OWN_KIND_NUMERATOR
        } else {
            DAMAGE_DENOMINATOR
        };
        acc.saturating_add(weight)
    })
}

/// Final damage for one iteration, rounded half-up
pub fn iteration_damage(base_half_points: u32, special_damage: u32, combo: u32) -> u32 {
    let halves = base_half_points
        .saturating_add(special_damage.saturating_mul(DAMAGE_DENOMINATOR))
        .saturating_mul(combo.max(1));
    halves.saturating_add(DAMAGE_DENOMINATOR / 2) / DAMAGE_DENOMINATOR
}

/// Result of one opponent turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentTurn {
    /// Countdown ticked without an attack
    Waiting { moves_until_attack: u32 },
    /// The opponent struck
    Attacked { damage: u32, new_player_health: u32 },
}

/// Mutable duel state for the current ladder level
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub player_health: u32,
    pub opponent_health: u32,
    pub moves_until_attack: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub meter: u32,
    pub ability_phase: AbilityPhase,
    /// Cumulative damage dealt across the ladder run
    pub score: u32,
}

impl CombatState {
    pub fn new(opponent: &Opponent) -> Self {
        Self {
            player_health: PLAYER_MAX_HEALTH,
            opponent_health: opponent.max_health,
            moves_until_attack: opponent.moves_per_attack,
            combo: 1,
            max_combo: 1,
            meter: 0,
            ability_phase: AbilityPhase::Idle,
            score: 0,
        }
    }

    /// Reset for the next ladder level; score and max combo carry over
    pub fn next_level(&mut self, opponent: &Opponent) {
        let score = self.score;
        let max_combo = self.max_combo;
        *self = Self::new(opponent);
        self.score = score;
        self.max_combo = max_combo;
    }

    /// Subtract damage from the opponent, floored at zero
    ///
    /// Returns true when this hit emptied the opponent's health.
    pub fn deal_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.opponent_health > 0;
        self.opponent_health = self.opponent_health.saturating_sub(amount);
        self.score = self.score.saturating_add(amount);
        was_alive && self.opponent_health == 0
    }

    pub fn opponent_defeated(&self) -> bool {
        self.opponent_health == 0
    }

    pub fn player_defeated(&self) -> bool {
        self.player_health == 0
    }

    pub fn record_combo(&mut self, combo: u32) {
        self.combo = combo;
        self.max_combo = self.max_combo.max(combo);
    }

    /// Add meter points, capped; a full meter makes an idle ability ready
    ///
    /// An ability already being aimed stays in `Aiming`. Returns true when
    /// this charge filled the meter.
    pub fn charge_meter(&mut self, points: u32) -> bool {
        let was_full = self.meter >= ABILITY_METER_MAX;
        self.meter = self.meter.saturating_add(points).min(ABILITY_METER_MAX);
        if self.meter < ABILITY_METER_MAX {
            return false;
        }
        if self.ability_phase == AbilityPhase::Idle {
            self.ability_phase = AbilityPhase::Ready;
        }
        !was_full
    }

    pub fn reset_meter(&mut self) {
        self.meter = 0;
        self.ability_phase = AbilityPhase::Idle;
    }

    /// Tick the attack countdown after a player action
    ///
    /// With `non_lethal` set the player is never brought below 1 health.
    pub fn opponent_turn(&mut self, opponent: &Opponent, non_lethal: bool) -> OpponentTurn {
        self.moves_until_attack = self.moves_until_attack.saturating_sub(1);
        if self.moves_until_attack > 0 {
            return OpponentTurn::Waiting {
                moves_until_attack: self.moves_until_attack,
            };
        }

        let floor = if non_lethal { 1 } else { 0 };
        let before = self.player_health;
        self.player_health = before.saturating_sub(opponent.attack).max(floor.min(before));
        self.moves_until_attack = opponent.moves_per_attack;
        OpponentTurn::Attacked {
            damage: before - self.player_health,
            new_player_health: self.player_health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::Opponent;

    fn opponent() -> Opponent {
        Opponent {
            name: "Kano".to_string(),
            kind: PieceKind::Kano,
            max_health: 100,
            attack: 15,
            moves_per_attack: 2,
        }
    }

    #[test]
    fn test_damage_table() {
        use PieceKind::*;
        let actor = SubZero;
        assert_eq!(iteration_damage(base_half_points([Kano; 4], actor), 0, 1), 4);
        assert_eq!(iteration_damage(base_half_points([SubZero; 4], actor), 0, 1), 6);
        assert_eq!(iteration_damage(base_half_points([SubZero; 3], actor), 0, 1), 5);
        assert_eq!(iteration_damage(base_half_points([Kano; 11], actor), 15, 1), 26);
        assert_eq!(iteration_damage(base_half_points([Kano; 3], actor), 0, 2), 6);
        assert_eq!(iteration_damage(base_half_points([SubZero; 3], actor), 0, 3), 14);
    }

    #[test]
    fn test_deal_damage_floors_at_zero_and_scores() {
        let mut state = CombatState::new(&opponent());
        assert!(!state.deal_damage(40));
        assert!(state.deal_damage(100));
        assert_eq!(state.opponent_health, 0);
        assert_eq!(state.score, 140);
        assert!(!state.deal_damage(5));
    }

    #[test]
    fn test_meter_caps_and_flips_ready() {
        let mut state = CombatState::new(&opponent());
        assert!(!state.charge_meter(10));
        assert_eq!(state.ability_phase, AbilityPhase::Idle);
        assert!(state.charge_meter(10));
        assert_eq!(state.meter, ABILITY_METER_MAX);
        assert_eq!(state.ability_phase, AbilityPhase::Ready);
        state.reset_meter();
        assert_eq!(state.meter, 0);
        assert_eq!(state.ability_phase, AbilityPhase::Idle);
    }

    #[test]
    fn test_charging_while_aiming_keeps_aim() {
        let mut state = CombatState::new(&opponent());
        state.charge_meter(ABILITY_METER_MAX);
        state.ability_phase = AbilityPhase::Aiming;
        assert!(!state.charge_meter(4));
        assert_eq!(state.ability_phase, AbilityPhase::Aiming);
    }

    #[test]
    fn test_meter_policy_points() {
        assert_eq!(MeterPolicy::OwnKind.points(7, 2), 2);
        assert_eq!(MeterPolicy::AllCleared.points(7, 2), 7);
        assert_eq!(MeterPolicy::from_str("ALL"), Some(MeterPolicy::AllCleared));
        assert_eq!(MeterPolicy::from_str("bogus"), None);
    }

    #[test]
    fn test_opponent_countdown_and_attack() {
        let opp = opponent();
        let mut state = CombatState::new(&opp);
        assert_eq!(
            state.opponent_turn(&opp, false),
            OpponentTurn::Waiting {
                moves_until_attack: 1
            }
        );
        assert_eq!(
            state.opponent_turn(&opp, false),
            OpponentTurn::Attacked {
                damage: 15,
                new_player_health: 85
            }
        );
        assert_eq!(state.moves_until_attack, 2);
    }

    #[test]
    fn test_non_lethal_keeps_one_health() {
        let opp = opponent();
        let mut state = CombatState::new(&opp);
        state.player_health = 10;
        state.moves_until_attack = 1;
        let turn = state.opponent_turn(&opp, true);
        assert_eq!(
            turn,
            OpponentTurn::Attacked {
                damage: 9,
                new_player_health: 1
            }
        );

        state.moves_until_attack = 1;
        state.opponent_turn(&opp, false);
        assert!(state.player_defeated());
    }

    #[test]
    fn test_next_level_keeps_score_and_max_combo() {
        let opp = opponent();
        let mut state = CombatState::new(&opp);
        state.deal_damage(30);
        state.record_combo(4);
        state.record_combo(1);
        state.charge_meter(5);
        state.player_health = 20;
        state.next_level(&opp);
        assert_eq!(state.score, 30);
        assert_eq!(state.max_combo, 4);
        assert_eq!(state.meter, 0);
        assert_eq!(state.player_health, PLAYER_MAX_HEALTH);
    }
}
