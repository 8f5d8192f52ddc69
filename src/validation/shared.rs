#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    evaluator::Evaluator,
    session::{SessionError, SessionHost, SubmitOutcome, ValidationSession},
    verdict::ValidationVerdict,
    view::SessionView,
};

/// A session and its host, guarded together.
struct Inner<H> {
    /// The state machine.
    session: ValidationSession,
    /// Receives completion and close callbacks.
    host:    H,
}

/// A [`ValidationSession`] that several UI tasks can drive at once.
///
/// The lock is released while the evaluator call is pending, so the session
/// stays observable (and closable) during validation. Concurrent submits
/// race for the guard; exactly one wins.
pub struct SharedSession<H> {
    /// Shared state.
    inner: Arc<Mutex<Inner<H>>>,
}

impl<H> Clone for SharedSession<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: SessionHost> SharedSession<H> {
    /// Wraps `session`, reporting to `host`.
    pub fn new(session: ValidationSession, host: H) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { session, host })),
        }
    }

    /// Locks the shared state.
    fn lock(&self) -> MutexGuard<'_, Inner<H>> {
        self.inner.lock().expect("validation session poisoned")
    }

    /// Replaces the draft; see [`ValidationSession::set_draft`].
    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        self.lock().session.set_draft(text)
    }

    /// Submits the current draft; see [`ValidationSession::submit`].
    pub async fn submit<E: Evaluator>(&self, evaluator: &E) -> SubmitOutcome {
        let ticket = {
            let mut guard = self.lock();
            guard.session.begin_submit()
        };
        let Some(ticket) = ticket else {
            return SubmitOutcome::Ignored;
        };

        let outcome = evaluator.evaluate(ticket.request()).await;

        let mut guard = self.lock();
        let Inner { session, host } = &mut *guard;
        session.complete(ticket, outcome, host)
    }

    /// Goes back to explaining; see [`ValidationSession::retry`].
    pub fn retry(&self) -> Result<(), SessionError> {
        self.lock().session.retry()
    }

    /// Closes the session; see [`ValidationSession::close`].
    pub fn close(&self) {
        let mut guard = self.lock();
        let Inner { session, host } = &mut *guard;
        session.close(host);
    }

    /// Returns what the UI should offer right now.
    pub fn view(&self) -> SessionView {
        self.lock().session.view()
    }

    /// Returns a copy of the verdict on screen, if any.
    pub fn verdict(&self) -> Option<ValidationVerdict> {
        self.lock().session.verdict().cloned()
    }

    /// Runs `f` against a snapshot of the session.
    pub fn inspect<T>(&self, f: impl FnOnce(&ValidationSession, &H) -> T) -> T {
        let guard = self.lock();
        f(&guard.session, &guard.host)
    }
}
