//! Progress trackers for the guidance and follow-up cycles.
//!
//! Both trackers have monotonic counters within a cycle and are reset exactly
//! when their mode is (re-)entered. The engine owns when that happens; the
//! trackers only enforce the counting rules.

use serde::{Deserialize, Serialize};

/// Attempt counting and hint escalation for a guidance cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceTracker {
    /// Guided turns taken in the current cycle.
    pub attempts: u32,
    /// Attempts allowed before the engine teaches the answer.
    pub max_attempts: u32,
    /// Hint intensity in `1..=3`, escalating as attempts accumulate.
    pub hint_level: u8,
}

impl Default for GuidanceTracker {
    fn default() -> Self {
        Self {
            attempts: 0,
            max_attempts: 5,
            hint_level: 1,
        }
    }
}

impl GuidanceTracker {
    /// Count one guided turn.
    ///
    /// Escalates the hint level by one tier (capped at 3) once the learner
    /// has used three attempts. Returns `true` while attempts remain after
    /// the increment.
    pub fn increment(&mut self) -> bool {
        self.attempts += 1;
        if self.attempts >= 3 {
            self.hint_level = (self.hint_level + 1).min(3);
        }
        self.attempts < self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.hint_level = 1;
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

/// Question counting for a follow-up cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTracker {
    /// Questions asked so far; always equals `history.len()`.
    pub asked: u32,
    /// Questions to ask before the topic is closed.
    pub total: u32,
    /// The questions asked this cycle, in order.
    pub history: Vec<String>,
}

impl Default for FollowUpTracker {
    fn default() -> Self {
        Self {
            asked: 0,
            total: 3,
            history: Vec::new(),
        }
    }
}

impl FollowUpTracker {
    /// Record a question that was just asked.
    pub fn record(&mut self, question: impl Into<String>) {
        self.history.push(question.into());
        self.asked += 1;
    }

    /// The most recently asked question, if any.
    pub fn last_question(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.asked >= self.total
    }

    pub fn reset(&mut self) {
        self.asked = 0;
        self.history.clear();
    }
}
