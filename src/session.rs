//! Session state for one tutoring conversation.
//!
//! A session owns its transcript and its two progress trackers, and holds a
//! shared reference to a catalog-owned problem. Phase changes go through the
//! named transition methods so the tracker-reset rules stay in one place.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::trackers::{FollowUpTracker, GuidanceTracker};
use crate::problems::Problem;

/// Position of a session in the tutoring protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingProblem,
    AwaitingCode,
    Guiding,
    Followup,
    Teaching,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Read-only view of session progress for status surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub problem_title: Option<String>,
    pub guidance_attempts: u32,
    /// `asked/total`, e.g. `"1/3"`.
    pub followup_progress: String,
}

/// One active tutoring conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub phase: Phase,
    pub problem: Option<Arc<Problem>>,
    /// Append-only; never truncated or reordered.
    pub transcript: Vec<Message>,
    /// Last code-like text the learner submitted; overwritten, not history.
    pub submitted_code: Option<String>,
    pub guidance: GuidanceTracker,
    pub followup: FollowUpTracker,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            phase: Phase::AwaitingProblem,
            problem: None,
            transcript: Vec::new(),
            submitted_code: None,
            guidance: GuidanceTracker::default(),
            followup: FollowUpTracker::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(Message::new(role, content));
        self.updated_at = Utc::now();
    }

    /// The last `n` transcript entries, oldest first.
    pub fn recent_transcript(&self, n: usize) -> &[Message] {
        let start = self.transcript.len().saturating_sub(n);
        &self.transcript[start..]
    }

    pub fn transition_to(&mut self, phase: Phase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }

    /// Enter guidance mode, resetting the attempt cycle.
    pub fn enter_guidance(&mut self) {
        self.guidance.reset();
        self.transition_to(Phase::Guiding);
    }

    /// Enter follow-up mode, resetting the question cycle.
    pub fn enter_followup(&mut self) {
        self.followup.reset();
        self.transition_to(Phase::Followup);
    }

    pub fn enter_teaching(&mut self) {
        self.transition_to(Phase::Teaching);
    }

    pub fn complete(&mut self) {
        self.transition_to(Phase::Completed);
    }

    /// Clear per-topic state for a fresh problem. The transcript is kept so
    /// the conversation stays continuous.
    pub fn reset_for_new_problem(&mut self) {
        self.problem = None;
        self.submitted_code = None;
        self.guidance.reset();
        self.followup.reset();
        self.transition_to(Phase::AwaitingProblem);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            problem_title: self.problem.as_ref().map(|p| p.title.clone()),
            guidance_attempts: self.guidance.attempts,
            followup_progress: format!("{}/{}", self.followup.asked, self.followup.total),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory keyed storage for sessions.
///
/// Sessions are independent; callers must serialize turns per session id if
/// deployed under concurrent access.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new session, returning its id.
    pub fn create(&mut self) -> String {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_awaiting_problem() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::AwaitingProblem);
        assert!(session.transcript.is_empty());
        assert!(session.problem.is_none());
    }

    #[test]
    fn push_message_appends_in_order_and_touches_updated_at() {
        let mut session = Session::new();
        let before = session.updated_at;
        session.push_message(Role::User, "Hello");
        session.push_message(Role::Assistant, "Hi there!");

        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[0].role, Role::User);
        assert_eq!(session.transcript[1].role, Role::Assistant);
        assert!(session.updated_at >= before);
    }

    #[test]
    fn recent_transcript_returns_tail() {
        let mut session = Session::new();
        for i in 0..5 {
            session.push_message(Role::User, format!("m{i}"));
        }
        let tail = session.recent_transcript(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content, "m3");
        assert_eq!(tail[1].content, "m4");
        // Asking for more than exists returns everything.
        assert_eq!(session.recent_transcript(100).len(), 5);
    }

    #[test]
    fn entering_modes_resets_their_trackers() {
        let mut session = Session::new();
        session.guidance.increment();
        session.followup.record("Q1");

        session.enter_guidance();
        assert_eq!(session.phase, Phase::Guiding);
        assert_eq!(session.guidance.attempts, 0);

        session.enter_followup();
        assert_eq!(session.phase, Phase::Followup);
        assert_eq!(session.followup.asked, 0);
        assert!(session.followup.history.is_empty());
    }

    #[test]
    fn reset_for_new_problem_keeps_transcript() {
        let mut session = Session::new();
        session.push_message(Role::User, "old turn");
        session.submitted_code = Some("def f(): pass".to_string());
        session.guidance.increment();
        session.complete();

        session.reset_for_new_problem();
        assert_eq!(session.phase, Phase::AwaitingProblem);
        assert!(session.problem.is_none());
        assert!(session.submitted_code.is_none());
        assert_eq!(session.guidance.attempts, 0);
        assert_eq!(session.transcript.len(), 1);
    }

    #[test]
    fn store_creates_and_finds_sessions() {
        let mut store = SessionStore::new();
        let id = store.create();
        assert!(store.get(&id).is_some());
        assert!(store.get("unknown").is_none());
    }
}
