//! Turn-by-turn algorithm tutoring dialogue engine.
//!
//! A learner works an algorithm problem in a chat; after each message the
//! engine decides whether to evaluate submitted code, ask guiding questions,
//! pose follow-up questions, or teach the answer. The architecture enforces a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (intent keyword rules, progress
//!   trackers, response normalization). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (model client, configuration,
//!   prompt construction). Isolated to enable scripted fakes in tests.
//!
//! The [`engine`] module coordinates core logic with the model client to
//! drive the per-session phase machine.

pub mod core;
pub mod engine;
pub mod io;
pub mod logging;
pub mod problems;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
