//! Typed structured outcomes decoded from model output.
//!
//! One schema per request kind. Every field has a documented default so a
//! partially well-formed response still yields a usable outcome; the verdict
//! enums carry a catch-all variant for unrecognized tags. Decoding goes
//! through [`crate::core::extract::normalize`] and therefore never fails:
//! the worst case is a default verdict with the raw text as the reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::extract::normalize;
use crate::core::intent::Intent;

/// Question used when follow-up generation returns nothing usable.
pub const FALLBACK_FOLLOWUP: &str =
    "Can you walk me through the time complexity of your solution?";

/// Verdict on a code submission. Anything not clearly correct keeps the
/// learner in guidance, so the default is `Incorrect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Correct,
    Partial,
    CannotEvaluate,
    #[default]
    #[serde(other)]
    Incorrect,
}

/// Verdict on a follow-up answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnswerQuality {
    Good,
    Partial,
    #[default]
    #[serde(other)]
    Incorrect,
}

/// Decode one field from the normalized map, defaulting independently.
///
/// Fields degrade one at a time: a mistyped value falls back to that field's
/// default without discarding its well-formed siblings.
fn field<T: Default + for<'de> Deserialize<'de>>(map: &Map<String, Value>, key: &str) -> T {
    map.get(key)
        .cloned()
        .map(serde_json::from_value)
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Model-classified intent plus a conversational reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntentOutcome {
    pub intent: Intent,
    pub reply: String,
}

/// Result of evaluating a code submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeReview {
    pub evaluation: Evaluation,
    pub reply: String,
    pub issues: Vec<String>,
    pub test_result: String,
}

/// Result of one guided dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuidanceTurn {
    pub user_on_right_track: bool,
    pub user_current_understanding: String,
    pub what_user_is_missing: String,
    pub reply: String,
    pub hint_used: String,
}

/// A freshly generated follow-up question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowUpQuestion {
    pub question: String,
    pub expected_direction: String,
    pub difficulty: String,
}

/// Result of evaluating a follow-up answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowUpReview {
    pub answer_quality: AnswerQuality,
    pub correct_answer: String,
    pub user_understanding: String,
    pub reply: String,
    pub next_question: Option<String>,
}

/// Reply to an explicit help request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelpTurn {
    pub reply: String,
    pub hint_type: String,
}

impl IntentOutcome {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        Self {
            intent: field(&map, "intent"),
            reply: field(&map, "reply"),
        }
    }
}

impl CodeReview {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        Self {
            evaluation: field(&map, "evaluation"),
            reply: field(&map, "reply"),
            issues: field(&map, "issues"),
            test_result: field(&map, "test_result"),
        }
    }
}

impl GuidanceTurn {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        Self {
            user_on_right_track: field(&map, "user_on_right_track"),
            user_current_understanding: field(&map, "user_current_understanding"),
            what_user_is_missing: field(&map, "what_user_is_missing"),
            reply: field(&map, "reply"),
            hint_used: field(&map, "hint_used"),
        }
    }
}

impl FollowUpQuestion {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        let mut outcome = Self {
            question: field(&map, "question"),
            expected_direction: field(&map, "expected_direction"),
            difficulty: field(&map, "difficulty"),
        };
        if outcome.question.trim().is_empty() {
            outcome.question = FALLBACK_FOLLOWUP.to_string();
        }
        outcome
    }
}

impl FollowUpReview {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        let mut outcome = Self {
            answer_quality: field(&map, "answer_quality"),
            correct_answer: field(&map, "correct_answer"),
            user_understanding: field(&map, "user_understanding"),
            reply: field(&map, "reply"),
            next_question: field(&map, "next_question"),
        };
        if outcome
            .next_question
            .as_deref()
            .is_some_and(|q| q.trim().is_empty())
        {
            outcome.next_question = None;
        }
        outcome
    }
}

impl HelpTurn {
    pub fn from_text(text: &str) -> Self {
        let map = normalize(text);
        let mut outcome = Self {
            reply: field(&map, "reply"),
            hint_type: field(&map, "hint_type"),
        };
        if outcome.reply.trim().is_empty() {
            outcome.reply =
                "Let's take it one step at a time. What's your first instinct here?".to_string();
        }
        outcome
    }
}
