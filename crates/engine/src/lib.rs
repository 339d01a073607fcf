//! Paced async driver for the simulation core
//!
//! The core resolves a move in discrete phases and never waits. This crate
//! adds the clock: a [`Pacer`] holds each phase for its animation pause, and
//! [`run_session`] serializes commands from a channel against one
//! encounter, answering anything that arrives mid-resolve with a `busy`
//! rejection.
//!
//! | Phase | Hold |
//! |-------|------|
//! | swapped | 300 ms |
//! | ability_applied | 300 ms |
//! | cleared | 450 ms |
//! | refilled | 300 ms |
//! | reverted | 300 ms |
//! | regenerated | 500 ms |
//! | settled | 0 |
//!
//! Holds scale linearly with `KRUSH_ANIMATION_MS` (150 = as listed).

pub mod config;
pub mod feed;
pub mod pacer;
pub mod session;

pub use config::SessionConfig;
pub use feed::{decode_command, encode_frame, read_commands, spawn_writer};
pub use pacer::{Frame, Pacer};
pub use session::{run_session, SessionCommand};
