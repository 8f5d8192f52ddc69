#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use uuid::Uuid;

use super::{
    evaluator::{Evaluator, EvaluatorError, ValidationRequest},
    verdict::ValidationVerdict,
    view::{SessionView, TerminalAction},
};

/// Where a session is in the explain, validate, review loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The learner is writing an explanation.
    Explaining,
    /// An evaluator call is in flight.
    Validating,
    /// A verdict is on screen.
    Result,
}

/// Internal state; the verdict only exists alongside the result phase.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    /// See [`Phase::Explaining`].
    Explaining,
    /// See [`Phase::Validating`].
    Validating,
    /// See [`Phase::Result`].
    Result(ValidationVerdict),
}

/// Callbacks a session makes into the application hosting it.
pub trait SessionHost {
    /// Called once per genuine evaluator response. Never called for the
    /// synthetic verdict that replaces a failed call.
    fn on_validation_complete(&mut self, passed: bool, feedback: &str);

    /// Called when the session is closed and its view should be unmounted.
    fn on_close(&mut self) {}
}

/// Rejected transitions that the caller asked for explicitly.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Retry was requested before any verdict arrived.
    #[error("There is no validation result to retry from.")]
    NoResult,
    /// Retry was requested after the explanation passed.
    #[error("The explanation already passed; there is nothing to retry.")]
    AlreadyPassed,
}

/// Proof that a submit was accepted. Hand it back to
/// [`ValidationSession::complete`] with the evaluator's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    /// Attempt this ticket belongs to.
    attempt: u64,
    /// Payload for the evaluator.
    request: ValidationRequest,
}

impl SubmissionTicket {
    /// Returns the request to send to the evaluator.
    pub fn request(&self) -> &ValidationRequest {
        &self.request
    }

    /// Returns the attempt number this ticket was issued for.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }
}

/// What happened to a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The guard rejected the submit; nothing changed and nothing was sent.
    Ignored,
    /// The evaluator answered and its verdict is on screen.
    Evaluated,
    /// The evaluator failed and the degraded verdict is on screen.
    Degraded,
    /// The call finished after the session moved on, so it was dropped.
    Discarded,
}

/// One explain-it-back interaction for a single code snippet.
#[derive(Debug)]
pub struct ValidationSession {
    /// Correlates log lines for this session.
    id:        Uuid,
    /// Snippet under discussion.
    code:      String,
    /// Language of the snippet.
    language:  String,
    /// The learner's current explanation.
    draft:     String,
    /// Current state.
    stage:     Stage,
    /// Number of accepted submits so far.
    attempt:   u64,
    /// Attempt whose evaluator call has not been handed back yet. Survives
    /// `close`, so a reopened session cannot start a second call.
    in_flight: Option<u64>,
}

impl ValidationSession {
    /// Opens a session for `code` written in `language`.
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        let session = Self {
            id:        Uuid::new_v4(),
            code:      code.into(),
            language:  language.into(),
            draft:     String::new(),
            stage:     Stage::Explaining,
            attempt:   0,
            in_flight: None,
        };
        tracing::debug!(
            session = %session.id,
            language = %session.language,
            "Opened validation session"
        );
        session
    }

    /// Returns the session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the snippet under discussion.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the snippet's language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the current explanation draft.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Returns the number of accepted submits.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Explaining => Phase::Explaining,
            Stage::Validating => Phase::Validating,
            Stage::Result(_) => Phase::Result,
        }
    }

    /// Returns the verdict on screen, present only in [`Phase::Result`].
    pub fn verdict(&self) -> Option<&ValidationVerdict> {
        match &self.stage {
            Stage::Result(verdict) => Some(verdict),
            Stage::Explaining | Stage::Validating => None,
        }
    }

    /// Replaces the draft. Returns `false` and leaves the draft alone unless
    /// the learner is still explaining.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        if self.stage != Stage::Explaining {
            tracing::debug!(session = %self.id, phase = ?self.phase(), "Ignoring draft edit");
            return false;
        }
        self.draft = text.into();
        true
    }

    /// Whether an evaluator call is outstanding, including one left running
    /// by [`ValidationSession::close`].
    pub fn is_awaiting_evaluator(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a submit right now would be accepted.
    pub fn can_submit(&self) -> bool {
        self.stage == Stage::Explaining
            && self.in_flight.is_none()
            && !self.draft.trim().is_empty()
    }

    /// Moves to [`Phase::Validating`] and returns the request to send, or
    /// `None` when the draft is blank, the session is not explaining, or an
    /// earlier call is still outstanding.
    ///
    /// The ticket must be handed back to [`ValidationSession::complete`];
    /// until then no further submit is accepted.
    pub fn begin_submit(&mut self) -> Option<SubmissionTicket> {
        if !self.can_submit() {
            tracing::debug!(session = %self.id, phase = ?self.phase(), "Ignoring submit");
            return None;
        }

        self.attempt += 1;
        self.in_flight = Some(self.attempt);
        self.stage = Stage::Validating;
        tracing::info!(
            session = %self.id,
            attempt = self.attempt,
            "Submitting explanation for validation"
        );

        Some(SubmissionTicket {
            attempt: self.attempt,
            request: ValidationRequest {
                code:         self.code.clone(),
                language:     self.language.clone(),
                explanation: self.draft.clone(),
            },
        })
    }

    /// Applies the evaluator's outcome for `ticket`.
    ///
    /// A successful verdict is stored verbatim and reported to `host`. A
    /// failure stores the degraded verdict and does not notify `host`.
    /// Outcomes for a ticket the session no longer waits on are dropped.
    pub fn complete<H: SessionHost + ?Sized>(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<ValidationVerdict, EvaluatorError>,
        host: &mut H,
    ) -> SubmitOutcome {
        if self.in_flight == Some(ticket.attempt) {
            self.in_flight = None;
        }
        if self.stage != Stage::Validating || ticket.attempt != self.attempt {
            tracing::debug!(
                session = %self.id,
                attempt = ticket.attempt,
                "Dropping evaluator outcome for a stale submission"
            );
            return SubmitOutcome::Discarded;
        }

        match outcome {
            Ok(verdict) => {
                tracing::info!(
                    session = %self.id,
                    attempt = self.attempt,
                    passed = verdict.passed,
                    level = ?verdict.understanding_level,
                    "Explanation validated"
                );
                host.on_validation_complete(verdict.passed, &verdict.feedback);
                self.stage = Stage::Result(verdict);
                SubmitOutcome::Evaluated
            }
            Err(err) => {
                tracing::warn!(
                    session = %self.id,
                    attempt = self.attempt,
                    "Validation failed: {err}"
                );
                self.stage = Stage::Result(ValidationVerdict::degraded());
                SubmitOutcome::Degraded
            }
        }
    }

    /// Submits the current draft: one guarded evaluator call, then the
    /// transition to [`Phase::Result`].
    pub async fn submit<E, H>(&mut self, evaluator: &E, host: &mut H) -> SubmitOutcome
    where
        E: Evaluator,
        H: SessionHost + ?Sized,
    {
        let Some(ticket) = self.begin_submit() else {
            return SubmitOutcome::Ignored;
        };
        let outcome = evaluator.evaluate(ticket.request()).await;
        self.complete(ticket, outcome, host)
    }

    /// Goes back to explaining after a failed verdict, with an empty draft.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        let passed = match &self.stage {
            Stage::Result(verdict) => verdict.passed,
            Stage::Explaining | Stage::Validating => return Err(SessionError::NoResult),
        };
        if passed {
            return Err(SessionError::AlreadyPassed);
        }

        tracing::debug!(session = %self.id, attempt = self.attempt, "Retrying explanation");
        self.stage = Stage::Explaining;
        self.draft.clear();
        Ok(())
    }

    /// Resets the draft and verdict and asks `host` to unmount. Allowed from
    /// any phase; an evaluator call still in flight is left to finish and its
    /// outcome is discarded. No new submit is accepted until that happens.
    pub fn close<H: SessionHost + ?Sized>(&mut self, host: &mut H) {
        tracing::debug!(session = %self.id, phase = ?self.phase(), "Closing validation session");
        self.draft.clear();
        self.stage = Stage::Explaining;
        host.on_close();
    }

    /// Returns what the UI should offer right now.
    pub fn view(&self) -> SessionView {
        let verdict = self.verdict();
        SessionView {
            draft_editable:  self.stage == Stage::Explaining,
            submit_enabled:  self.can_submit(),
            busy:            self.in_flight.is_some(),
            offer_retry:     verdict.is_some_and(|v| !v.passed),
            terminal_action: match verdict {
                Some(v) if v.passed => TerminalAction::Continue,
                _ => TerminalAction::Close,
            },
        }
    }
}
