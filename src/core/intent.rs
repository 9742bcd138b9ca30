//! Deterministic keyword classification of learner input.
//!
//! Keyword rules win over the model classifier for the safety-critical
//! branches (skip/help/code) so behavior stays predictable and testable
//! without a live model. The rule chain is ordered and short-circuits.

use serde::{Deserialize, Serialize};

/// What the learner is trying to do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SubmitCode,
    AskForHelp,
    AnswerQuestion,
    AskQuestion,
    SkipProblem,
    #[default]
    #[serde(other)]
    Other,
}

/// Phrases that mean "move on to another problem".
const SKIP_KEYWORDS: &[&str] = &["skip", "next problem", "pass on this", "different problem"];

/// Phrases that mean "I need guidance".
const HELP_KEYWORDS: &[&str] = &[
    "help",
    "hint",
    "don't know",
    "dont know",
    "no idea",
    "stuck",
    "not sure how",
    "how do i start",
];

/// Substrings that indicate the message carries code.
const CODE_INDICATORS: &[&str] = &[
    "def ", "fn ", "function", "class ", "for ", "while ", "if ", "return", "=>", "```",
];

/// The ordered rule chain. Earlier rules win.
fn rules() -> [(Intent, &'static [&'static str]); 3] {
    [
        (Intent::SkipProblem, SKIP_KEYWORDS),
        (Intent::AskForHelp, HELP_KEYWORDS),
        (Intent::SubmitCode, CODE_INDICATORS),
    ]
}

/// Classify input by keyword alone, if any rule matches.
///
/// Case-insensitive substring match. Returns `None` when no rule fires; the
/// caller then falls back to the model classifier.
pub fn keyword_intent(input: &str) -> Option<Intent> {
    let lowered = input.to_lowercase();
    rules()
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(intent, _)| intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_keyword_wins_regardless_of_other_content() {
        assert_eq!(
            keyword_intent("help me or just skip it"),
            Some(Intent::SkipProblem)
        );
        assert_eq!(keyword_intent("Next Problem please"), Some(Intent::SkipProblem));
    }

    #[test]
    fn help_keyword_wins_over_code_indicators() {
        assert_eq!(
            keyword_intent("give me a hint for this for loop"),
            Some(Intent::AskForHelp)
        );
        assert_eq!(keyword_intent("I DON'T KNOW"), Some(Intent::AskForHelp));
    }

    #[test]
    fn code_indicators_detect_submissions() {
        assert_eq!(
            keyword_intent("def two_sum(nums, target):\n    seen = {}"),
            Some(Intent::SubmitCode)
        );
        assert_eq!(keyword_intent("```\nlet x = 1;\n```"), Some(Intent::SubmitCode));
        assert_eq!(keyword_intent("x => x * 2"), Some(Intent::SubmitCode));
    }

    #[test]
    fn plain_prose_matches_no_rule() {
        assert_eq!(keyword_intent("what a nice puzzle"), None);
        assert_eq!(keyword_intent(""), None);
    }

    #[test]
    fn unknown_intent_tag_decodes_to_other() {
        let intent: Intent = serde_json::from_str("\"reticulating\"").expect("decode");
        assert_eq!(intent, Intent::Other);
        let intent: Intent = serde_json::from_str("\"submit_code\"").expect("decode");
        assert_eq!(intent, Intent::SubmitCode);
    }
}
