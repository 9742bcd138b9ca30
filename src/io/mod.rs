//! Side-effecting collaborators: model client, configuration, prompts.

pub mod client;
pub mod config;
pub mod prompt;
