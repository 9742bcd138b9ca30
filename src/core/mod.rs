//! Pure, deterministic logic for the tutoring dialogue.
//!
//! Nothing in this module performs I/O or calls the model. The engine layers
//! these pieces over the [`crate::io`] collaborators.

pub mod extract;
pub mod intent;
pub mod outcome;
pub mod trackers;
