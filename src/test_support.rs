//! Test-only helpers: a scripted model client and problem builders.

use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::io::client::ModelClient;
use crate::problems::{Difficulty, Problem, TestCase};

/// A [`ModelClient`] that replays scripted replies without any network.
///
/// Replies are consumed in order, one per `generate` call. Every prompt is
/// recorded for assertions. When the script runs out, `generate` returns the
/// configured fallback text.
pub struct ScriptedClient {
    script: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    fallback: String,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
            fallback: r#"{"reply": "ok"}"#.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

impl ModelClient for ScriptedClient {
    fn generate(&self, prompt: &str, _system: Option<&str>) -> Result<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(prompt.to_string());
        let mut script = self.script.lock().expect("script lock");
        if script.is_empty() {
            Ok(self.fallback.clone())
        } else {
            Ok(script.remove(0))
        }
    }
}

/// A [`ModelClient`] that always fails, for transactional-turn tests.
pub struct FailingClient;

impl ModelClient for FailingClient {
    fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String> {
        Err(anyhow!("model unavailable"))
    }
}

/// Create a deterministic problem with one test case and one hint.
pub fn problem(title: &str) -> Problem {
    Problem {
        title: title.to_string(),
        statement: format!("{title} statement"),
        difficulty: Difficulty::Easy,
        expected_complexity: Some("O(n)".to_string()),
        test_cases: vec![TestCase {
            input: "input".to_string(),
            expected: "expected".to_string(),
        }],
        hints: vec![format!("{title} hint")],
    }
}
