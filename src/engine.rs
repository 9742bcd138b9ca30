//! The phase controller: a finite-state dialogue engine.
//!
//! One learner message is handled start to finish: intent is classified (for
//! the code/help/skip-sensitive phases), the phase handler builds a prompt,
//! calls the model, decodes the structured outcome, updates the trackers, and
//! possibly transitions the phase. The transcript and session state are
//! committed only after the handler succeeds; a failed model call leaves the
//! session exactly as it was.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{info, instrument};

use crate::core::intent::{Intent, keyword_intent};
use crate::core::outcome::{
    CodeReview, Evaluation, FollowUpQuestion, FollowUpReview, GuidanceTurn, HelpTurn,
    IntentOutcome,
};
use crate::io::client::ModelClient;
use crate::io::config::CoachConfig;
use crate::io::prompt::{GuidanceInputs, IntentInputs, PromptBuilder, system_instruction};
use crate::problems::Problem;
use crate::session::{Phase, Role, Session, SessionSnapshot, SessionStore};

const CHOOSE_PROBLEM_REPLY: &str = "Pick a problem first so we can get started.";

const TOPIC_CLOSED_REPLY: &str =
    "We've wrapped up this problem. Pick a new one whenever you're ready to keep practicing.";

const CLOSING_REMARK: &str =
    "Great work! You've completed every challenge for this problem. Congratulations!";

const CHAT_NUDGE_REPLY: &str =
    "Happy to chat - send me your code whenever you're ready, or ask for a hint.";

/// The tutoring dialogue engine.
///
/// Holds the session store and a model client; the problem catalog stays with
/// the caller, which hands problems in by reference on assignment.
pub struct CoachEngine<C> {
    client: C,
    prompts: PromptBuilder,
    store: SessionStore,
    history_window: usize,
}

impl<C: ModelClient> CoachEngine<C> {
    pub fn new(client: C, config: &CoachConfig) -> Self {
        Self {
            client,
            prompts: PromptBuilder::new(config.prompt_budget_bytes),
            store: SessionStore::new(),
            history_window: config.history_window,
        }
    }

    /// Create a new session in the awaiting-problem phase.
    pub fn create_session(&mut self) -> String {
        self.store.create()
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.store.get(id)
    }

    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot> {
        self.store
            .get(id)
            .map(Session::snapshot)
            .ok_or_else(|| anyhow!("unknown session: {id}"))
    }

    /// Assign a problem and return the opening message.
    ///
    /// Reassignment starts a fresh topic: code and trackers are cleared, the
    /// transcript is kept so the conversation stays continuous.
    #[instrument(skip_all, fields(session = %id, problem = %problem.title))]
    pub fn assign_problem(&mut self, id: &str, problem: Arc<Problem>) -> Result<String> {
        let session = self
            .store
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown session: {id}"))?;

        session.reset_for_new_problem();
        session.problem = Some(problem.clone());
        session.transition_to(Phase::AwaitingCode);

        let opening = format!(
            "Let's work on **{}** ({}).\n\n{}\n\nTake your time - send me your code when \
             you're ready, or ask for a hint if you'd rather talk it through first.",
            problem.title,
            problem.difficulty.as_str(),
            problem.statement,
        );
        session.push_message(Role::Assistant, &opening);
        info!("problem assigned");
        Ok(opening)
    }

    /// Handle one learner message and return the reply.
    ///
    /// State mutation is transactional: the handler runs against a working
    /// copy, and the copy replaces the stored session only on success. A
    /// model failure therefore commits nothing, and the caller may retry the
    /// whole turn.
    #[instrument(skip_all, fields(session = %id))]
    pub fn process_turn(&mut self, id: &str, input: &str) -> Result<String> {
        let session = self
            .store
            .get(id)
            .ok_or_else(|| anyhow!("unknown session: {id}"))?;

        let mut draft = session.clone();
        let phase_before = draft.phase;
        let reply = self.dispatch(&mut draft, input)?;
        draft.push_message(Role::User, input);
        draft.push_message(Role::Assistant, &reply);

        if phase_before != draft.phase {
            info!(from = ?phase_before, to = ?draft.phase, "phase transition");
        }
        if let Some(slot) = self.store.get_mut(id) {
            *slot = draft;
        }
        Ok(reply)
    }

    fn dispatch(&self, session: &mut Session, input: &str) -> Result<String> {
        match session.phase {
            Phase::AwaitingProblem => Ok(CHOOSE_PROBLEM_REPLY.to_string()),
            Phase::AwaitingCode => self.handle_awaiting_code(session, input),
            Phase::Guiding => self.handle_guiding(session, input),
            Phase::Followup => self.handle_followup(session, input),
            Phase::Teaching => self.handle_teaching(session, input),
            Phase::Completed => Ok(TOPIC_CLOSED_REPLY.to_string()),
        }
    }

    /// Classify the learner's message: keyword rules first, model second.
    fn classify(&self, session: &Session, input: &str) -> Result<(Intent, String)> {
        if let Some(intent) = keyword_intent(input) {
            return Ok((intent, String::new()));
        }
        let pack = self.prompts.build_intent(&IntentInputs {
            problem: session.problem.as_deref(),
            phase: session.phase,
            guidance: &session.guidance,
            followup: &session.followup,
            transcript: session.recent_transcript(self.history_window),
            input,
        });
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        let outcome = IntentOutcome::from_text(&raw);
        Ok((outcome.intent, outcome.reply))
    }

    fn handle_awaiting_code(&self, session: &mut Session, input: &str) -> Result<String> {
        let (intent, model_reply) = self.classify(session, input)?;
        match intent {
            Intent::SubmitCode => self.evaluate_and_respond(session, input),
            Intent::AskForHelp => {
                session.enter_guidance();
                self.help_turn(session, input)
            }
            Intent::SkipProblem => self.skip(session),
            _ => {
                if model_reply.trim().is_empty() {
                    Ok(CHAT_NUDGE_REPLY.to_string())
                } else {
                    Ok(model_reply)
                }
            }
        }
    }

    fn handle_guiding(&self, session: &mut Session, input: &str) -> Result<String> {
        if session.guidance.is_exhausted() {
            return self.teach(session);
        }
        // Catch a new code submission or a skip mid-guidance; everything else
        // is a guided turn.
        let (intent, _) = self.classify(session, input)?;
        match intent {
            Intent::SubmitCode => self.evaluate_and_respond(session, input),
            Intent::SkipProblem => self.skip(session),
            _ => self.guided_turn(session, input),
        }
    }

    fn handle_followup(&self, session: &mut Session, input: &str) -> Result<String> {
        let problem = required_problem(session)?;

        if session.followup.asked == 0 {
            let question = self.next_followup_question(session, &problem)?;
            session.followup.record(&question);
            return Ok(question);
        }

        let question = session
            .followup
            .last_question()
            .unwrap_or_default()
            .to_string();
        let pack = self.prompts.build_followup_review(
            &problem,
            session.submitted_code.as_deref(),
            &question,
            input,
            session.followup.asked,
            session.followup.total,
        );
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        let review = FollowUpReview::from_text(&raw);
        let mut reply = review.reply;

        if !session.followup.is_complete() {
            // The reviewer may hand over the next question directly; when it
            // does not, generate one so the cycle always advances.
            let next = match review.next_question {
                Some(next) => next,
                None => self.next_followup_question(session, &problem)?,
            };
            session.followup.record(&next);
            if !session.followup.is_complete() && !reply.contains(&next) {
                reply = join_replies(&reply, &next);
            }
        }

        if session.followup.is_complete() {
            session.complete();
            info!("follow-up cycle complete");
            if !has_closing_remark(&reply) {
                reply = join_replies(&reply, CLOSING_REMARK);
            }
        }
        Ok(reply)
    }

    fn handle_teaching(&self, session: &mut Session, input: &str) -> Result<String> {
        let problem = required_problem(session)?;
        let pack = self.prompts.build_qa(&problem, input);
        // Teaching answers are free text, not structured.
        self.client.generate(&pack.render(), Some(system_instruction()))
    }

    /// Evaluate a code submission and route on the verdict.
    fn evaluate_and_respond(&self, session: &mut Session, code: &str) -> Result<String> {
        let problem = required_problem(session)?;
        session.submitted_code = Some(code.to_string());

        let pack = self.prompts.build_evaluate(&problem, code);
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        let review = CodeReview::from_text(&raw);
        info!(evaluation = ?review.evaluation, "code evaluated");

        match review.evaluation {
            Evaluation::Correct => {
                session.enter_followup();
                let question = self.next_followup_question(session, &problem)?;
                session.followup.record(&question);
                Ok(join_replies(&review.reply, &question))
            }
            _ => {
                // Mid-guidance resubmissions stay in the current cycle; the
                // attempt counter only moves on guided turns.
                if session.phase != Phase::Guiding {
                    session.enter_guidance();
                }
                Ok(review.reply)
            }
        }
    }

    /// One guided dialogue turn, counted against the attempt budget.
    fn guided_turn(&self, session: &mut Session, input: &str) -> Result<String> {
        let problem = required_problem(session)?;
        let pack = self.prompts.build_guide(&GuidanceInputs {
            problem: &problem,
            code: session.submitted_code.as_deref(),
            guidance: &session.guidance,
            transcript: session.recent_transcript(self.history_window),
            input,
        });
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        let turn = GuidanceTurn::from_text(&raw);

        let attempts_remain = session.guidance.increment();
        if !turn.user_on_right_track && !attempts_remain {
            // Out of attempts with no breakthrough: teach instead of the
            // guidance reply.
            return self.teach(session);
        }
        Ok(turn.reply)
    }

    /// An explicit help request, counted as the first guided turn.
    fn help_turn(&self, session: &mut Session, input: &str) -> Result<String> {
        let problem = required_problem(session)?;
        let pack = self.prompts.build_help(
            &problem,
            session.submitted_code.as_deref(),
            session.guidance.hint_level,
            input,
        );
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        let turn = HelpTurn::from_text(&raw);
        session.guidance.increment();
        Ok(turn.reply)
    }

    /// Disclose the full solution and enter the teaching phase.
    fn teach(&self, session: &mut Session) -> Result<String> {
        let problem = required_problem(session)?;
        let pack = self.prompts.build_teach(
            &problem,
            session.submitted_code.as_deref(),
            session.recent_transcript(self.history_window),
        );
        let content = self.client.generate(&pack.render(), Some(system_instruction()))?;
        session.enter_teaching();
        info!("solution taught");
        Ok(content)
    }

    /// Close the topic on a skip: a short teaching message, then done.
    fn skip(&self, session: &mut Session) -> Result<String> {
        let problem = required_problem(session)?;
        let pack = self.prompts.build_teach(
            &problem,
            session.submitted_code.as_deref(),
            session.recent_transcript(self.history_window),
        );
        let teaching = self.client.generate(&pack.render(), Some(system_instruction()))?;
        session.complete();
        info!("problem skipped");
        Ok(format!(
            "No worries - let's close this one out. Here's the idea behind {}:\n\n{}\n\n\
             Whenever you're ready, pick the next problem and we'll keep going.",
            problem.title, teaching,
        ))
    }

    fn next_followup_question(&self, session: &Session, problem: &Problem) -> Result<String> {
        let pack = self.prompts.build_followup_question(
            problem,
            session.submitted_code.as_deref(),
            &session.followup.history,
            session.followup.asked + 1,
            session.followup.total,
        );
        let raw = self.client.generate(&pack.render(), Some(system_instruction()))?;
        Ok(FollowUpQuestion::from_text(&raw).question)
    }
}

fn required_problem(session: &Session) -> Result<Arc<Problem>> {
    session
        .problem
        .clone()
        .ok_or_else(|| anyhow!("session {} has no assigned problem", session.id))
}

fn join_replies(first: &str, second: &str) -> String {
    if first.trim().is_empty() {
        second.to_string()
    } else {
        format!("{first}\n\n{second}")
    }
}

fn has_closing_remark(reply: &str) -> bool {
    let lowered = reply.to_lowercase();
    lowered.contains("congrat") || lowered.contains("complet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::ProblemLibrary;
    use crate::test_support::{FailingClient, ScriptedClient, problem};

    fn engine(client: &ScriptedClient) -> CoachEngine<&ScriptedClient> {
        CoachEngine::new(client, &CoachConfig::default())
    }

    fn with_problem(coach: &mut CoachEngine<&ScriptedClient>) -> String {
        let id = coach.create_session();
        let p = ProblemLibrary::with_builtins()
            .by_title("Two Sum")
            .expect("builtin problem");
        coach.assign_problem(&id, p).expect("assign");
        id
    }

    const CORRECT_EVAL: &str =
        r#"{"evaluation": "correct", "reply": "Correct, clean use of a hash map.", "issues": []}"#;
    const FIRST_QUESTION: &str =
        r#"{"question": "What is the time complexity of your solution?", "difficulty": "easy"}"#;

    /// Before a problem is assigned, turns get a fixed nudge with no model call.
    #[test]
    fn awaiting_problem_asks_for_a_problem() {
        let client = ScriptedClient::new(Vec::<String>::new());
        let mut coach = engine(&client);
        let id = coach.create_session();

        let reply = coach.process_turn(&id, "hello").expect("turn");
        assert_eq!(reply, CHOOSE_PROBLEM_REPLY);
        assert_eq!(coach.session(&id).expect("session").phase, Phase::AwaitingProblem);
        assert_eq!(client.call_count(), 0);
        // Both sides of the exchange were committed.
        assert_eq!(coach.session(&id).expect("session").transcript.len(), 2);
    }

    /// Assigning a problem emits an opening message naming it and moves the
    /// session to awaiting-code.
    #[test]
    fn assigning_a_problem_opens_with_its_title() {
        let client = ScriptedClient::new(Vec::<String>::new());
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::AwaitingCode);
        let opening = &session.transcript[0].content;
        assert!(opening.contains("Two Sum"));
        assert!(opening.contains("indices"));
    }

    /// A correct submission moves to follow-up and the reply carries the
    /// first generated question.
    #[test]
    fn correct_submission_enters_followup_with_a_question() {
        let client = ScriptedClient::new([CORRECT_EVAL, FIRST_QUESTION]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        let reply = coach
            .process_turn(&id, "def two_sum(nums, target):\n    seen = {}")
            .expect("turn");

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::Followup);
        assert!(reply.contains("Correct, clean use of a hash map."));
        assert!(reply.contains("What is the time complexity of your solution?"));
        assert_eq!(session.followup.asked, 1);
        assert_eq!(
            session.followup.last_question(),
            Some("What is the time complexity of your solution?")
        );
        assert!(session.submitted_code.as_deref().unwrap().contains("def two_sum"));
    }

    /// An incorrect submission enters guidance with a fresh attempt cycle.
    #[test]
    fn incorrect_submission_enters_guidance() {
        let client = ScriptedClient::new([
            r#"{"evaluation": "incorrect", "reply": "What happens with duplicates?", "issues": ["duplicate handling"]}"#,
        ]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        let reply = coach
            .process_turn(&id, "def two_sum(nums, target):\n    return [0, 0]")
            .expect("turn");

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::Guiding);
        assert_eq!(session.guidance.attempts, 0);
        assert_eq!(reply, "What happens with duplicates?");
    }

    /// "skip" closes the topic with a short explanation before the invitation.
    #[test]
    fn skip_completes_with_explanation_then_invitation() {
        let client = ScriptedClient::new(["The trick is a single-pass hash map."]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        let reply = coach.process_turn(&id, "let's skip this one").expect("turn");

        assert_eq!(coach.session(&id).expect("session").phase, Phase::Completed);
        let explanation = reply.find("single-pass hash map").expect("explanation");
        let invitation = reply.find("pick the next problem").expect("invitation");
        assert!(explanation < invitation);
    }

    /// A help request plus repeated off-track turns exhausts the five
    /// attempts; the exhausting turn teaches the solution instead.
    #[test]
    fn exhausted_guidance_falls_back_to_teaching() {
        let mut script = vec![r#"{"reply": "What structure gives O(1) lookup?", "hint_type": "leading question"}"#.to_string()];
        for _ in 0..4 {
            // Model intent classification, then the guided turn itself.
            script.push(r#"{"intent": "answer_question", "reply": "noted"}"#.to_string());
            script.push(r#"{"user_on_right_track": false, "reply": "Think about lookups."}"#.to_string());
        }
        script.push(
            "Here is the full solution:\n```python\ndef two_sum(nums, target):\n    seen = {}\n    for i, n in enumerate(nums):\n        if target - n in seen:\n            return [seen[target - n], i]\n        seen[n] = i\n```"
                .to_string(),
        );
        let client = ScriptedClient::new(script);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        coach.process_turn(&id, "I could use a hint").expect("help turn");
        assert_eq!(coach.session(&id).expect("session").phase, Phase::Guiding);
        assert_eq!(coach.session(&id).expect("session").guidance.attempts, 1);

        let mut last = String::new();
        for _ in 0..4 {
            last = coach
                .process_turn(&id, "Could it be about sorting?")
                .expect("guided turn");
        }

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::Teaching);
        assert_eq!(session.guidance.attempts, 5);
        assert!(last.contains("def two_sum"), "teaching reply has the reference solution");
    }

    /// Hint intensity escalates across a guidance cycle and shows up in the
    /// prompts sent to the model.
    #[test]
    fn hint_level_escalates_in_later_guidance_prompts() {
        let mut script = vec![r#"{"reply": "First instinct?", "hint_type": "opener"}"#.to_string()];
        for _ in 0..4 {
            script.push(r#"{"intent": "answer_question", "reply": "noted"}"#.to_string());
            script.push(r#"{"user_on_right_track": false, "reply": "Keep going."}"#.to_string());
        }
        script.push("Full solution: use a hash map.".to_string());
        let client = ScriptedClient::new(script);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        coach.process_turn(&id, "I'm stuck").expect("help turn");
        for _ in 0..4 {
            coach.process_turn(&id, "Could it be about sorting?").expect("guided turn");
        }

        assert_eq!(coach.session(&id).expect("session").guidance.hint_level, 3);
        let prompts = client.prompts();
        // The exhausting guided turn (the prompt just before the teaching
        // request) carries the top intensity.
        assert!(prompts[prompts.len() - 2].contains("hint intensity: 3/3"));
        // The opening help request started at the lightest tier.
        assert!(prompts[0].contains("Hint Intensity 1/3"));
    }

    /// Mid-cycle follow-up reviews append the next question and self-loop.
    #[test]
    fn followup_review_appends_next_question() {
        let client = ScriptedClient::new([
            CORRECT_EVAL,
            FIRST_QUESTION,
            r#"{"answer_quality": "good", "reply": "Right, one pass over the array.", "next_question": "How much extra space does it use?"}"#,
        ]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        coach
            .process_turn(&id, "def two_sum(nums, target):\n    seen = {}")
            .expect("submission");
        let reply = coach.process_turn(&id, "It's O(n), one pass.").expect("answer");

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::Followup);
        assert_eq!(session.followup.asked, 2);
        assert!(reply.contains("one pass over the array"));
        assert!(reply.contains("How much extra space does it use?"));
    }

    /// Answering the last follow-up completes the topic and appends a
    /// closing remark when the review reply has none.
    #[test]
    fn completing_followups_closes_with_a_remark() {
        let client = ScriptedClient::new([
            CORRECT_EVAL,
            FIRST_QUESTION,
            r#"{"answer_quality": "good", "reply": "Yes.", "next_question": "And the space cost?"}"#,
            // Review of the second answer supplies no next question...
            r#"{"answer_quality": "good", "reply": "Right."}"#,
            // ...so the engine generates the third itself.
            r#"{"question": "When would a sorted two-pointer approach win?", "difficulty": "medium"}"#,
        ]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        coach
            .process_turn(&id, "def two_sum(nums, target):\n    seen = {}")
            .expect("submission");
        coach.process_turn(&id, "O(n) time.").expect("first answer");
        assert_eq!(coach.session(&id).expect("session").followup.asked, 2);

        let reply = coach.process_turn(&id, "O(n) space.").expect("second answer");

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::Completed);
        assert_eq!(session.followup.asked, 3);
        assert!(reply.to_lowercase().contains("congrat"), "closing remark appended");
        // The cycle-closing question is recorded but not asked.
        assert!(!reply.contains("two-pointer"));
    }

    /// Teaching answers post-teaching questions as free text and never
    /// changes phase.
    #[test]
    fn teaching_phase_answers_questions_in_place() {
        let client = ScriptedClient::new([
            "Full solution: use a hash map.",
            "A hash map lookup is O(1) on average because of hashing.",
        ]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);
        // Drive straight to teaching.
        if let Some(session) = coach.store.get_mut(&id) {
            for _ in 0..5 {
                session.guidance.increment();
            }
            session.transition_to(Phase::Guiding);
        }

        let teaching = coach.process_turn(&id, "anything").expect("teach turn");
        assert!(teaching.contains("hash map"));
        assert_eq!(coach.session(&id).expect("session").phase, Phase::Teaching);

        let answer = coach.process_turn(&id, "why O(1)?").expect("qa turn");
        assert!(answer.contains("hashing"));
        assert_eq!(coach.session(&id).expect("session").phase, Phase::Teaching);
    }

    /// Completed sessions give a fixed reply without calling the model.
    #[test]
    fn completed_phase_reply_is_fixed() {
        let client = ScriptedClient::new(["The trick is a single-pass hash map."]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);
        coach.process_turn(&id, "skip").expect("skip");
        let calls_before = client.call_count();

        let reply = coach.process_turn(&id, "so what now").expect("turn");
        assert_eq!(reply, TOPIC_CLOSED_REPLY);
        assert_eq!(client.call_count(), calls_before);
    }

    /// Prose with no keyword falls through to the model classifier, whose
    /// conversational reply is used directly.
    #[test]
    fn ambiguous_input_uses_model_classifier_reply() {
        let client = ScriptedClient::new([
            r#"{"intent": "ask_question", "reply": "It's a classic! Hash maps make it elegant."}"#,
        ]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);

        let reply = coach.process_turn(&id, "what a nice puzzle").expect("turn");
        assert_eq!(reply, "It's a classic! Hash maps make it elegant.");
        assert_eq!(coach.session(&id).expect("session").phase, Phase::AwaitingCode);
    }

    /// A failed model call commits nothing: no transcript entries, no code,
    /// no phase change.
    #[test]
    fn failed_model_call_rolls_back_the_turn() {
        let mut coach = CoachEngine::new(FailingClient, &CoachConfig::default());
        let id = coach.create_session();
        let p = Arc::new(problem("Sample"));
        coach.assign_problem(&id, p).expect("assign");
        let transcript_before = coach.session(&id).expect("session").transcript.len();

        let err = coach
            .process_turn(&id, "def solve():\n    return 42")
            .unwrap_err();
        assert!(err.to_string().contains("model unavailable"));

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::AwaitingCode);
        assert_eq!(session.transcript.len(), transcript_before);
        assert!(session.submitted_code.is_none());
    }

    /// Unknown session ids fail fast on every entry point.
    #[test]
    fn unknown_session_id_is_an_error() {
        let client = ScriptedClient::new(Vec::<String>::new());
        let mut coach = engine(&client);

        assert!(coach.process_turn("nope", "hi").is_err());
        assert!(coach.snapshot("nope").is_err());
        let p = Arc::new(problem("Sample"));
        assert!(coach.assign_problem("nope", p).is_err());
    }

    /// Reassigning a problem resets per-topic state but keeps the transcript.
    #[test]
    fn reassignment_starts_a_fresh_topic() {
        let client = ScriptedClient::new(["The trick is a single-pass hash map."]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);
        coach.process_turn(&id, "skip").expect("skip");
        let transcript_len = coach.session(&id).expect("session").transcript.len();

        let p = ProblemLibrary::with_builtins()
            .by_title("Binary Search")
            .expect("builtin problem");
        coach.assign_problem(&id, p).expect("assign");

        let session = coach.session(&id).expect("session");
        assert_eq!(session.phase, Phase::AwaitingCode);
        assert_eq!(session.guidance.attempts, 0);
        assert_eq!(session.followup.asked, 0);
        assert!(session.submitted_code.is_none());
        assert_eq!(session.transcript.len(), transcript_len + 1);
        assert_eq!(
            session.problem.as_ref().map(|p| p.title.as_str()),
            Some("Binary Search")
        );
    }

    /// Snapshot exposes phase, title, and tracker progress.
    #[test]
    fn snapshot_reports_progress() {
        let client = ScriptedClient::new([CORRECT_EVAL, FIRST_QUESTION]);
        let mut coach = engine(&client);
        let id = with_problem(&mut coach);
        coach
            .process_turn(&id, "def two_sum(nums, target):\n    seen = {}")
            .expect("submission");

        let snapshot = coach.snapshot(&id).expect("snapshot");
        assert_eq!(snapshot.phase, Phase::Followup);
        assert_eq!(snapshot.problem_title.as_deref(), Some("Two Sum"));
        assert_eq!(snapshot.followup_progress, "1/3");
    }
}
