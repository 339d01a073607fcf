//! Session configuration
//!
//! Plain data; `krush-sim` fills it from flags and `KRUSH_*` variables.

use std::time::Duration;

use krush_core::{EncounterConfig, MeterPolicy, Phase};
use krush_types::{Difficulty, PieceKind, ANIMATION_DELAY_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub seed: u32,
    pub character: PieceKind,
    pub difficulty: Difficulty,
    pub animation_ms: u32,
    pub non_lethal: bool,
    pub meter_policy: MeterPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            character: PieceKind::SubZero,
            difficulty: Difficulty::Normal,
            animation_ms: ANIMATION_DELAY_MS,
            non_lethal: false,
            meter_policy: MeterPolicy::OwnKind,
        }
    }
}

impl SessionConfig {
    pub fn encounter_config(&self) -> EncounterConfig {
        EncounterConfig {
            character: self.character,
            difficulty: self.difficulty,
            seed: self.seed,
            non_lethal: self.non_lethal,
            meter_policy: self.meter_policy,
            ..EncounterConfig::default()
        }
    }

    /// Pause after `phase`, scaled by the configured animation unit
    pub fn pause_for(&self, phase: Phase) -> Duration {
        let ms = u64::from(phase.pause_ms()) * u64::from(self.animation_ms) / u64::from(ANIMATION_DELAY_MS);
        Duration::from_millis(ms)
    }
}
