//! Session loop - serializes commands against one encounter
//!
//! Commands arrive on an mpsc channel. While a resolve is being paced, new
//! commands are answered immediately: `snapshot` is served, `shutdown` is
//! deferred until the board settles, everything else (including `hint`,
//! which has no answer on a moving board) is rejected with the `busy` code.
//! A resolve is never cut short.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use krush_core::{AbilityProgress, CommandError, Encounter, EncounterError};
use krush_types::Pos;

use crate::config::SessionConfig;
use crate::pacer::{Frame, Pacer};

/// Inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    Swap {
        from: Pos,
        to: Pos,
    },
    /// Activate, aim (with a target) or cancel aiming (without one)
    Ability {
        #[serde(default)]
        target: Option<Pos>,
    },
    Hint,
    NextLevel,
    Snapshot,
    Shutdown,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Swap { .. } => "swap",
            SessionCommand::Ability { .. } => "ability",
            SessionCommand::Hint => "hint",
            SessionCommand::NextLevel => "next_level",
            SessionCommand::Snapshot => "snapshot",
            SessionCommand::Shutdown => "shutdown",
        }
    }
}

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Run a session until `Shutdown` or until the command channel closes
///
/// Publishes an initial snapshot, then one frame per command (and one per
/// phase of every resolve). Returns the encounter in its final state.
pub async fn run_session(
    config: SessionConfig,
    mut commands: mpsc::Receiver<SessionCommand>,
    frames: mpsc::Sender<Frame>,
) -> Result<Encounter> {
    let mut enc = Encounter::start(config.encounter_config()).context("starting encounter")?;
    let pacer = Pacer::new(config, frames);

    pacer.publish(Frame::snapshot(&mut enc)).await;

    while let Some(cmd) = commands.recv().await {
        tracing::debug!(command = cmd.name(), "command received");
        if handle(&pacer, &mut enc, cmd, &mut commands).await? == Flow::Stop {
            break;
        }
    }

    tracing::info!(
        level = enc.level(),
        score = enc.combat().score,
        status = enc.status().as_str(),
        "session finished"
    );
    Ok(enc)
}

async fn handle(
    pacer: &Pacer,
    enc: &mut Encounter,
    cmd: SessionCommand,
    commands: &mut mpsc::Receiver<SessionCommand>,
) -> Result<Flow> {
    let frame = match cmd {
        SessionCommand::Swap { from, to } => match enc.submit_swap(from, to) {
            Ok(()) => return resolve(pacer, enc, commands).await,
            Err(err) => reject(err),
        },
        SessionCommand::Ability { target } => match enc.activate_ability(target) {
            Ok(AbilityProgress::Executing) => return resolve(pacer, enc, commands).await,
            Ok(AbilityProgress::Aiming { .. } | AbilityProgress::Cancelled) => Frame::snapshot(enc),
            Err(err) => reject(err),
        },
        SessionCommand::NextLevel => match enc.next_level() {
            Ok(()) => Frame::snapshot(enc),
            Err(EncounterError::Command(err)) => reject(err),
            Err(EncounterError::Core(err)) => {
                return Err(err).context("regenerating board for next level");
            }
        },
        SessionCommand::Hint => Frame::hint(enc),
        SessionCommand::Snapshot => Frame::snapshot(enc),
        SessionCommand::Shutdown => return Ok(Flow::Stop),
    };
    pacer.publish(frame).await;
    Ok(Flow::Continue)
}

fn reject(err: CommandError) -> Frame {
    tracing::debug!(code = err.code(), %err, "command rejected");
    Frame::rejected(&err)
}

/// Pace the in-flight resolve, answering commands during each hold
async fn resolve(
    pacer: &Pacer,
    enc: &mut Encounter,
    commands: &mut mpsc::Receiver<SessionCommand>,
) -> Result<Flow> {
    let mut flow = Flow::Continue;
    let mut open = true;

    while let Some((_, pause)) = pacer.step(enc).await.context("resolving")? {
        if pause.is_zero() {
            continue;
        }
        let hold = tokio::time::sleep(pause);
        tokio::pin!(hold);
        loop {
            tokio::select! {
                _ = &mut hold => break,
                cmd = commands.recv(), if open => match cmd {
                    Some(SessionCommand::Shutdown) => flow = Flow::Stop,
                    Some(SessionCommand::Snapshot) => {
                        pacer.publish(Frame::snapshot(enc)).await;
                    }
                    Some(other) => {
                        tracing::debug!(command = other.name(), "rejected while resolving");
                        pacer.publish(Frame::rejected(&CommandError::Busy)).await;
                    }
                    None => {
                        open = false;
                        flow = Flow::Stop;
                    }
                },
            }
        }
    }
    Ok(flow)
}
