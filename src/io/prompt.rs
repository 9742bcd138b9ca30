//! Prompt construction for every model request kind.
//!
//! Templates are minijinja, embedded at compile time, and structured with
//! HTML section markers so a byte budget can drop less critical sections
//! before the prompt is sent. Required sections (the task contract, the
//! problem, the learner's message) are never dropped.

use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

use crate::core::trackers::{FollowUpTracker, GuidanceTracker};
use crate::problems::Problem;
use crate::session::{Message, Phase, Role};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");
const INTENT_TEMPLATE: &str = include_str!("prompts/intent.md");
const EVALUATE_TEMPLATE: &str = include_str!("prompts/evaluate.md");
const GUIDE_TEMPLATE: &str = include_str!("prompts/guide.md");
const FOLLOWUP_QUESTION_TEMPLATE: &str = include_str!("prompts/followup_question.md");
const FOLLOWUP_REVIEW_TEMPLATE: &str = include_str!("prompts/followup_review.md");
const TEACH_TEMPLATE: &str = include_str!("prompts/teach.md");
const HELP_TEMPLATE: &str = include_str!("prompts/help.md");
const QA_TEMPLATE: &str = include_str!("prompts/qa.md");

/// Per-message cap when formatting transcript context.
const TRANSCRIPT_MESSAGE_CHARS: usize = 200;

/// The coaching persona and safety rules, sent as the system instruction
/// with every request.
pub fn system_instruction() -> &'static str {
    SYSTEM_TEMPLATE
}

/// Problem fields exposed to template rendering.
#[derive(Debug, Clone, Serialize)]
struct ProblemContext {
    title: String,
    statement: String,
    expected_complexity: Option<String>,
}

impl ProblemContext {
    fn from_problem(problem: &Problem) -> Self {
        Self {
            title: problem.title.clone(),
            statement: problem.statement.clone(),
            expected_complexity: problem.expected_complexity.clone(),
        }
    }
}

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("intent", INTENT_TEMPLATE),
            ("evaluate", EVALUATE_TEMPLATE),
            ("guide", GUIDE_TEMPLATE),
            ("followup_question", FOLLOWUP_QUESTION_TEMPLATE),
            ("followup_review", FOLLOWUP_REVIEW_TEMPLATE),
            ("teach", TEACH_TEMPLATE),
            ("help", HELP_TEMPLATE),
            ("qa", QA_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("embedded template should be valid");
        }
        Self { env }
    }
}

/// A parsed section from rendered template output.
#[derive(Debug, Clone)]
struct ParsedSection {
    /// Section identifier (e.g., "contract", "transcript").
    key: String,
    /// Whether this section is required (cannot be dropped).
    required: bool,
    /// Full section content including header.
    content: String,
}

/// Parse sections from rendered template output using HTML comment markers.
///
/// Markers follow format: `<!-- section:KEY required|droppable -->`
fn parse_sections(rendered: &str) -> Vec<ParsedSection> {
    use std::sync::LazyLock;
    static SECTION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"<!--\s*section:(\w+)\s+(required|droppable)\s*-->").unwrap()
    });

    let mut sections = Vec::new();
    let matches: Vec<_> = SECTION_RE.captures_iter(rendered).collect();

    for (i, caps) in matches.iter().enumerate() {
        let key = caps.get(1).unwrap().as_str().to_string();
        let required = caps.get(2).unwrap().as_str() == "required";
        let start = caps.get(0).unwrap().end();
        let end = matches
            .get(i + 1)
            .map(|m| m.get(0).unwrap().start())
            .unwrap_or(rendered.len());

        let content = rendered[start..end].trim().to_string();
        if !content.is_empty() || required {
            sections.push(ParsedSection {
                key,
                required,
                content,
            });
        }
    }

    sections
}

/// Apply budget to parsed sections, dropping droppable sections as needed.
///
/// Drop order: transcript -> asked -> hints -> cases -> code
fn apply_budget_to_sections(sections: &mut Vec<ParsedSection>, budget: usize) {
    let total_len =
        |secs: &[ParsedSection]| -> usize { secs.iter().map(|s| s.content.len()).sum() };

    if total_len(sections) <= budget {
        return;
    }

    let drop_order = ["transcript", "asked", "hints", "cases", "code"];
    for key in drop_order {
        if total_len(sections) <= budget {
            break;
        }
        if let Some(idx) = sections.iter().position(|s| s.key == key && !s.required) {
            let dropped_len = sections[idx].content.len();
            debug!(
                section = key,
                bytes_dropped = dropped_len,
                "dropped section for budget"
            );
            sections.remove(idx);
        }
    }

    // If still over budget, truncate the last section
    if total_len(sections) > budget
        && let Some(split) = sections.len().checked_sub(1)
    {
        let other_len: usize = sections[..split].iter().map(|s| s.content.len()).sum();
        let allowed = budget.saturating_sub(other_len);
        let last = &mut sections[split];
        if last.content.len() > allowed {
            let cut = last
                .content
                .char_indices()
                .map(|(i, _)| i)
                .take_while(|&i| i <= allowed.saturating_sub(12))
                .last()
                .unwrap_or(0);
            last.content.truncate(cut);
            last.content.push_str("\n[truncated]");
        }
    }
}

/// Render sections back to a single string.
fn render_sections(sections: &[ParsedSection]) -> String {
    sections
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A rendered prompt ready to send to the model.
#[derive(Debug, Clone)]
pub struct PromptPack {
    content: String,
}

impl PromptPack {
    /// Get the rendered prompt content.
    pub fn render(&self) -> String {
        self.content.clone()
    }
}

/// Format transcript entries for prompt context, newest last.
///
/// Long messages are cut to keep one rambling turn from crowding out the
/// rest of the window.
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            let speaker = match message.role {
                Role::User => "Learner",
                Role::Assistant => "Coach",
            };
            let mut content = message.content.clone();
            if content.chars().count() > TRANSCRIPT_MESSAGE_CHARS {
                content = content.chars().take(TRANSCRIPT_MESSAGE_CHARS).collect();
                content.push_str("...");
            }
            format!("{speaker}: {content}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_test_cases(problem: &Problem) -> String {
    problem
        .test_cases
        .iter()
        .enumerate()
        .map(|(i, case)| format!("case {}: input={}, expected={}", i + 1, case.input, case.expected))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_hints(problem: &Problem) -> String {
    problem
        .hints
        .iter()
        .map(|hint| format!("- {hint}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hint_instruction(level: u8) -> &'static str {
    match level {
        1 => "Intensity 1 (light): ask leading questions only; give no concrete direction.",
        2 => "Intensity 2 (medium): you may hint at the kind of data structure or algorithm \
              to consider, without saying how to use it.",
        _ => "Intensity 3 (heavy): you may point at the direction explicitly and explain by \
              analogy, but still give no code.",
    }
}

/// Builds prompts within a byte budget, dropping less critical sections first.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    budget_bytes: usize,
}

/// Inputs shared by the intent-classification request.
#[derive(Debug, Clone)]
pub struct IntentInputs<'a> {
    pub problem: Option<&'a Problem>,
    pub phase: Phase,
    pub guidance: &'a GuidanceTracker,
    pub followup: &'a FollowUpTracker,
    pub transcript: &'a [Message],
    pub input: &'a str,
}

/// Inputs for one guided dialogue turn.
#[derive(Debug, Clone)]
pub struct GuidanceInputs<'a> {
    pub problem: &'a Problem,
    pub code: Option<&'a str>,
    pub guidance: &'a GuidanceTracker,
    pub transcript: &'a [Message],
    pub input: &'a str,
}

impl PromptBuilder {
    /// Create a builder with the given byte budget.
    pub fn new(budget_bytes: usize) -> Self {
        Self { budget_bytes }
    }

    fn build(&self, template: &str, ctx: minijinja::Value) -> PromptPack {
        let engine = PromptEngine::new();
        let rendered = engine
            .env
            .get_template(template)
            .expect("registered template")
            .render(ctx)
            .expect("template rendering should not fail");

        let mut sections = parse_sections(&rendered);
        apply_budget_to_sections(&mut sections, self.budget_bytes);

        PromptPack {
            content: render_sections(&sections),
        }
    }

    pub fn build_intent(&self, inputs: &IntentInputs<'_>) -> PromptPack {
        self.build(
            "intent",
            context! {
                problem => inputs.problem.map(ProblemContext::from_problem),
                phase => format!("{:?}", inputs.phase),
                guidance_attempts => inputs.guidance.attempts,
                guidance_max => inputs.guidance.max_attempts,
                followup_progress => format!("{}/{}", inputs.followup.asked, inputs.followup.total),
                transcript => non_empty(format_transcript(inputs.transcript)),
                input => inputs.input,
            },
        )
    }

    pub fn build_evaluate(&self, problem: &Problem, code: &str) -> PromptPack {
        self.build(
            "evaluate",
            context! {
                problem => ProblemContext::from_problem(problem),
                test_cases => non_empty(format_test_cases(problem)),
                code => code,
            },
        )
    }

    pub fn build_guide(&self, inputs: &GuidanceInputs<'_>) -> PromptPack {
        self.build(
            "guide",
            context! {
                problem => ProblemContext::from_problem(inputs.problem),
                hints => non_empty(format_hints(inputs.problem)),
                code => inputs.code.map(str::trim).filter(|s| !s.is_empty()),
                attempts => inputs.guidance.attempts,
                remaining => inputs.guidance.remaining(),
                hint_level => inputs.guidance.hint_level,
                hint_instruction => hint_instruction(inputs.guidance.hint_level),
                transcript => non_empty(format_transcript(inputs.transcript)),
                input => inputs.input,
            },
        )
    }

    pub fn build_followup_question(
        &self,
        problem: &Problem,
        code: Option<&str>,
        previous_questions: &[String],
        number: u32,
        total: u32,
    ) -> PromptPack {
        let asked = previous_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.build(
            "followup_question",
            context! {
                problem => ProblemContext::from_problem(problem),
                code => code.map(str::trim).filter(|s| !s.is_empty()),
                previous_questions => non_empty(asked),
                number => number,
                total => total,
            },
        )
    }

    pub fn build_followup_review(
        &self,
        problem: &Problem,
        code: Option<&str>,
        question: &str,
        answer: &str,
        number: u32,
        total: u32,
    ) -> PromptPack {
        self.build(
            "followup_review",
            context! {
                problem => ProblemContext::from_problem(problem),
                code => code.map(str::trim).filter(|s| !s.is_empty()),
                question => question,
                answer => answer,
                number => number,
                total => total,
            },
        )
    }

    pub fn build_teach(
        &self,
        problem: &Problem,
        code: Option<&str>,
        transcript: &[Message],
    ) -> PromptPack {
        self.build(
            "teach",
            context! {
                problem => ProblemContext::from_problem(problem),
                code => code.map(str::trim).filter(|s| !s.is_empty()),
                transcript => non_empty(format_transcript(transcript)),
            },
        )
    }

    pub fn build_help(
        &self,
        problem: &Problem,
        code: Option<&str>,
        hint_level: u8,
        input: &str,
    ) -> PromptPack {
        self.build(
            "help",
            context! {
                problem => ProblemContext::from_problem(problem),
                code => code.map(str::trim).filter(|s| !s.is_empty()),
                hint_level => hint_level,
                hint_instruction => hint_instruction(hint_level),
                input => input,
            },
        )
    }

    pub fn build_qa(&self, problem: &Problem, input: &str) -> PromptPack {
        self.build(
            "qa",
            context! {
                problem => ProblemContext::from_problem(problem),
                input => input,
            },
        )
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
