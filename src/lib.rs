//! Kombat Krush (workspace facade crate).
//!
//! Re-exports the layered crates under one roof: `types` for shared
//! constants and enums, `core` for the deterministic simulation, and
//! `engine` for the paced async driver.

pub use krush_core as core;
pub use krush_engine as engine;
pub use krush_types as types;

pub mod autoplay;
