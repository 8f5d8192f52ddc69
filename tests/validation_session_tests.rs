//! Tests for the explain-it-back session state machine.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use feynman::validation::{
    Evaluator, EvaluatorError, Phase, SessionError, SessionHost, SubmitOutcome, TerminalAction,
    UnderstandingLevel, ValidationRequest, ValidationSession, ValidationVerdict,
};
use reqwest::StatusCode;

/// Answers every request with a fixed verdict, or fails when none is set.
#[derive(Default)]
struct FakeEvaluator {
    verdict:  Option<ValidationVerdict>,
    calls:    AtomicUsize,
    requests: Mutex<Vec<ValidationRequest>>,
}

impl FakeEvaluator {
    fn answering(verdict: ValidationVerdict) -> Self {
        Self {
            verdict: Some(verdict),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Evaluator for FakeEvaluator {
    async fn evaluate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, EvaluatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.verdict
            .clone()
            .ok_or(EvaluatorError::Status(StatusCode::INTERNAL_SERVER_ERROR))
    }
}

#[derive(Default)]
struct RecordingHost {
    completions: Vec<(bool, String)>,
    closes:      usize,
}

impl SessionHost for RecordingHost {
    fn on_validation_complete(&mut self, passed: bool, feedback: &str) {
        self.completions.push((passed, feedback.to_string()));
    }

    fn on_close(&mut self) {
        self.closes += 1;
    }
}

fn excellent() -> ValidationVerdict {
    ValidationVerdict::builder()
        .passed(true)
        .understanding_level(UnderstandingLevel::Excellent)
        .feedback("Nice work")
        .build()
}

fn partial() -> ValidationVerdict {
    ValidationVerdict::builder()
        .passed(false)
        .understanding_level(UnderstandingLevel::Partial)
        .feedback("You missed the base case.")
        .concepts_covered(vec!["recursion".to_string()])
        .concepts_missed(vec!["base case".to_string()])
        .follow_up_questions(vec!["What stops the recursion?".to_string()])
        .build()
}

fn session() -> ValidationSession {
    ValidationSession::new("def f(n):\n    return 1 if n == 0 else n * f(n - 1)", "python")
}

#[test]
fn starts_explaining_without_verdict() {
    let session = session();
    assert_eq!(session.phase(), Phase::Explaining);
    assert!(session.verdict().is_none());
    assert_eq!(session.draft(), "");

    let view = session.view();
    assert!(view.draft_editable);
    assert!(!view.submit_enabled);
    assert!(!view.busy);
    assert!(!view.offer_retry);
}

#[tokio::test]
async fn success_stores_verdict_and_notifies_host_once() {
    let evaluator = FakeEvaluator::answering(excellent());
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("It computes the factorial recursively.");
    let outcome = session.submit(&evaluator, &mut host).await;

    assert_eq!(outcome, SubmitOutcome::Evaluated);
    assert_eq!(session.phase(), Phase::Result);
    assert_eq!(session.verdict(), Some(&excellent()));
    assert_eq!(host.completions, vec![(true, "Nice work".to_string())]);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn request_carries_code_language_and_explanation() {
    let evaluator = FakeEvaluator::answering(excellent());
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("  factorial  ");
    session.submit(&evaluator, &mut host).await;

    let requests = evaluator.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].code, session.code());
    assert_eq!(requests[0].language, "python");
    assert_eq!(requests[0].explanation, "  factorial  ");
}

#[tokio::test]
async fn failure_substitutes_degraded_verdict_without_notifying() {
    let evaluator = FakeEvaluator::failing();
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("It multiplies numbers.");
    let outcome = session.submit(&evaluator, &mut host).await;

    assert_eq!(outcome, SubmitOutcome::Degraded);
    assert_eq!(session.phase(), Phase::Result);
    let verdict = session.verdict().expect("verdict");
    assert!(!verdict.passed);
    assert_eq!(verdict.understanding_level, UnderstandingLevel::NeedsWork);
    assert_eq!(verdict.feedback, "Failed to validate your explanation. Please try again.");
    assert!(verdict.concepts_covered.is_empty());
    assert!(verdict.concepts_missed.is_empty());
    assert!(verdict.follow_up_questions.is_empty());
    assert!(host.completions.is_empty());
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn blank_explanations_are_ignored() {
    let evaluator = FakeEvaluator::answering(excellent());
    let mut host = RecordingHost::default();
    let mut session = session();

    for blank in ["", "   ", "\n\t "] {
        session.set_draft(blank);
        let outcome = session.submit(&evaluator, &mut host).await;
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(session.phase(), Phase::Explaining);
    }

    assert_eq!(evaluator.calls(), 0);
    assert_eq!(session.attempt(), 0);
}

#[test]
fn second_submit_while_validating_is_a_no_op() {
    let mut session = session();
    session.set_draft("It computes n!.");

    let first = session.begin_submit().expect("first submit accepted");
    assert_eq!(session.phase(), Phase::Validating);
    assert!(session.begin_submit().is_none());
    assert_eq!(session.phase(), Phase::Validating);
    assert_eq!(first.attempt(), 1);
    assert_eq!(session.attempt(), 1);

    let view = session.view();
    assert!(view.busy);
    assert!(!view.submit_enabled);
    assert!(!view.draft_editable);
}

#[test]
fn draft_is_frozen_outside_explaining() {
    let mut session = session();
    session.set_draft("first");
    let _ticket = session.begin_submit().expect("accepted");

    assert!(!session.set_draft("second"));
    assert_eq!(session.draft(), "first");
}

#[test]
fn verdict_absent_while_validating() {
    let mut session = session();
    session.set_draft("explanation");
    session.begin_submit().expect("accepted");
    assert!(session.verdict().is_none());
}

#[tokio::test]
async fn retry_after_failure_resets_draft() {
    let evaluator = FakeEvaluator::answering(partial());
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("It loops.");
    session.submit(&evaluator, &mut host).await;

    let view = session.view();
    assert!(view.offer_retry);
    assert_eq!(view.terminal_action, TerminalAction::Close);

    session.retry().expect("retry allowed");
    assert_eq!(session.phase(), Phase::Explaining);
    assert!(session.verdict().is_none());
    assert_eq!(session.draft(), "");

    session.set_draft("It recurses until n is zero.");
    session.submit(&evaluator, &mut host).await;
    assert_eq!(evaluator.calls(), 2);
    assert_eq!(session.attempt(), 2);
}

#[tokio::test]
async fn retry_is_available_after_degraded_verdict() {
    let evaluator = FakeEvaluator::failing();
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("It multiplies.");
    session.submit(&evaluator, &mut host).await;

    assert!(session.view().offer_retry);
    assert!(session.retry().is_ok());
}

#[tokio::test]
async fn retry_after_pass_is_rejected() {
    let evaluator = FakeEvaluator::answering(excellent());
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("Factorial.");
    session.submit(&evaluator, &mut host).await;

    let view = session.view();
    assert!(!view.offer_retry);
    assert_eq!(view.terminal_action, TerminalAction::Continue);
    assert_eq!(view.terminal_action.label(), "Continue");

    assert_eq!(session.retry(), Err(SessionError::AlreadyPassed));
    assert_eq!(session.phase(), Phase::Result);
    assert_eq!(session.verdict(), Some(&excellent()));
}

#[test]
fn retry_without_result_is_rejected() {
    let mut session = session();
    assert_eq!(session.retry(), Err(SessionError::NoResult));

    session.set_draft("text");
    session.begin_submit().expect("accepted");
    assert_eq!(session.retry(), Err(SessionError::NoResult));
}

#[tokio::test]
async fn pass_with_low_level_is_kept_as_is() {
    let odd = ValidationVerdict::builder()
        .passed(true)
        .understanding_level(UnderstandingLevel::NeedsWork)
        .feedback("Passed anyway")
        .build();
    let evaluator = FakeEvaluator::answering(odd.clone());
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("Something.");
    session.submit(&evaluator, &mut host).await;

    assert_eq!(session.verdict(), Some(&odd));
    assert_eq!(session.view().terminal_action, TerminalAction::Continue);
    assert_eq!(session.retry(), Err(SessionError::AlreadyPassed));
}

#[tokio::test]
async fn close_resets_from_every_phase() {
    let evaluator = FakeEvaluator::answering(partial());
    let mut host = RecordingHost::default();

    let mut explaining = session();
    explaining.set_draft("half-written");
    explaining.close(&mut host);
    assert_eq!(explaining.draft(), "");
    assert!(explaining.verdict().is_none());

    let mut validating = session();
    validating.set_draft("in flight");
    validating.begin_submit().expect("accepted");
    validating.close(&mut host);
    assert_eq!(validating.draft(), "");
    assert!(validating.verdict().is_none());

    let mut result = session();
    result.set_draft("done");
    result.submit(&evaluator, &mut host).await;
    result.close(&mut host);
    assert_eq!(result.draft(), "");
    assert!(result.verdict().is_none());

    assert_eq!(host.closes, 3);
}

#[test]
fn outcome_after_close_is_discarded() {
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("in flight");
    let ticket = session.begin_submit().expect("accepted");
    session.close(&mut host);

    let outcome = session.complete(ticket, Ok(excellent()), &mut host);

    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert_eq!(session.phase(), Phase::Explaining);
    assert!(session.verdict().is_none());
    assert!(host.completions.is_empty());
}

#[test]
fn reopened_session_waits_for_the_outstanding_call() {
    let mut host = RecordingHost::default();
    let mut session = session();

    session.set_draft("first");
    let stale = session.begin_submit().expect("accepted");
    session.close(&mut host);

    assert!(session.set_draft("second"));
    assert!(session.is_awaiting_evaluator());
    assert!(!session.can_submit());
    assert!(session.begin_submit().is_none());
    assert!(session.view().busy);

    assert_eq!(
        session.complete(stale, Ok(excellent()), &mut host),
        SubmitOutcome::Discarded
    );
    assert!(!session.is_awaiting_evaluator());
    assert_eq!(session.phase(), Phase::Explaining);
    assert_eq!(session.draft(), "second");

    let current = session.begin_submit().expect("accepted after the old call returned");
    assert_eq!(current.attempt(), 2);
    assert_eq!(
        session.complete(current, Ok(partial()), &mut host),
        SubmitOutcome::Evaluated
    );
    assert_eq!(session.verdict(), Some(&partial()));
    assert_eq!(host.completions.len(), 1);
}
