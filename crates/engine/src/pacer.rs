//! Paced driver - turns `Encounter::advance` into timed frames
//!
//! The core never sleeps. The pacer pumps `advance()`, publishes a [`Frame`]
//! per visible phase on a `tokio::sync::mpsc` channel, and waits the phase's
//! pause before the next step.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use krush_core::{CommandError, Encounter, EncounterSnapshot, EngineEvent, Phase};
use krush_types::Pos;

use crate::config::SessionConfig;

/// Unit of output for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// State after a command that did not start a resolve
    Snapshot {
        snapshot: Box<EncounterSnapshot>,
        events: Vec<EngineEvent>,
    },
    /// A visible checkpoint of an in-flight resolve
    Phase {
        phase: Phase,
        snapshot: Box<EncounterSnapshot>,
        events: Vec<EngineEvent>,
    },
    /// Answer to a hint request
    Hint { cells: Option<(Pos, Pos)> },
    /// A command was refused; state is unchanged
    Rejected { code: String, message: String },
}

impl Frame {
    pub fn snapshot(enc: &mut Encounter) -> Self {
        Frame::Snapshot {
            snapshot: Box::new(enc.snapshot()),
            events: enc.take_events(),
        }
    }

    pub fn phase(phase: Phase, enc: &mut Encounter) -> Self {
        Frame::Phase {
            phase,
            snapshot: Box::new(enc.snapshot()),
            events: enc.take_events(),
        }
    }

    pub fn rejected(err: &CommandError) -> Self {
        Frame::Rejected {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn hint(enc: &Encounter) -> Self {
        let cells = enc.request_hint().and_then(|(a, b)| {
            let board = enc.board();
            Some((board.find_id(a)?, board.find_id(b)?))
        });
        Frame::Hint { cells }
    }
}

/// Publishes frames and holds each phase for its pause
#[derive(Debug, Clone)]
pub struct Pacer {
    config: SessionConfig,
    frames: mpsc::Sender<Frame>,
}

impl Pacer {
    pub fn new(config: SessionConfig, frames: mpsc::Sender<Frame>) -> Self {
        Self { config, frames }
    }

    pub fn pause_for(&self, phase: Phase) -> Duration {
        self.config.pause_for(phase)
    }

    /// Send a frame; false once the receiving side has gone away
    pub async fn publish(&self, frame: Frame) -> bool {
        self.frames.send(frame).await.is_ok()
    }

    /// Advance one phase and publish it
    ///
    /// Returns the phase and how long to hold it. The hold is zero once
    /// nobody is listening.
    pub async fn step(&self, enc: &mut Encounter) -> Result<Option<(Phase, Duration)>> {
        let Some(phase) = enc.advance()? else {
            return Ok(None);
        };
        if !self.publish(Frame::phase(phase, enc)).await {
            tracing::debug!(phase = phase.as_str(), "frame receiver closed");
            return Ok(Some((phase, Duration::ZERO)));
        }
        Ok(Some((phase, self.pause_for(phase))))
    }

    /// Pump the encounter until it settles, sleeping between phases
    ///
    /// Returns the phases visited.
    pub async fn drive(&self, enc: &mut Encounter) -> Result<Vec<Phase>> {
        let mut phases = Vec::new();
        while let Some((phase, pause)) = self.step(enc).await? {
            phases.push(phase);
            if !pause.is_zero() {
                tracing::trace!(phase = phase.as_str(), ?pause, "pacing");
                tokio::time::sleep(pause).await;
            }
        }
        Ok(phases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krush_core::EncounterConfig;
    use krush_types::PieceKind;
    use tokio::time::Instant;

    fn encounter() -> Encounter {
        Encounter::start(EncounterConfig {
            character: PieceKind::Kitana,
            seed: 17,
            ..EncounterConfig::default()
        })
        .unwrap()
    }

    fn hinted_swap(enc: &mut Encounter) {
        let (a, b) = enc.request_hint().unwrap();
        let from = enc.board().find_id(a).unwrap();
        let to = enc.board().find_id(b).unwrap();
        enc.submit_swap(from, to).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_waits_between_phases() {
        let (tx, mut rx) = mpsc::channel(64);
        let pacer = Pacer::new(SessionConfig::default(), tx);
        let mut enc = encounter();
        hinted_swap(&mut enc);

        let started = Instant::now();
        let phases = pacer.drive(&mut enc).await.unwrap();
        let expected: Duration = phases.iter().map(|&p| pacer.pause_for(p)).sum();
        assert_eq!(started.elapsed(), expected);
        assert!(expected >= Duration::from_millis(300 + 450 + 300));

        let mut received = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            if let Frame::Phase { phase, .. } = frame {
                received.push(phase);
            }
        }
        assert_eq!(received, phases);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_animation_never_sleeps() {
        let (tx, _rx) = mpsc::channel(64);
        let config = SessionConfig {
            animation_ms: 0,
            ..SessionConfig::default()
        };
        let pacer = Pacer::new(config, tx);
        let mut enc = encounter();
        hinted_swap(&mut enc);

        let started = Instant::now();
        pacer.drive(&mut enc).await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_drive_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let pacer = Pacer::new(SessionConfig::default(), tx);
        let mut enc = encounter();
        hinted_swap(&mut enc);
        let phases = pacer.drive(&mut enc).await.unwrap();
        assert_eq!(phases.last(), Some(&Phase::Settled));
        assert!(!enc.is_busy());
    }

    #[test]
    fn test_hint_frame_points_at_adjacent_cells() {
        let enc = encounter();
        match Frame::hint(&enc) {
            Frame::Hint { cells: Some((a, b)) } => assert!(a.is_adjacent(b)),
            other => panic!("unexpected frame {other:?}"),
        }
    }
}
