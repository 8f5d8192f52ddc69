#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The explain-it-back workflow.
//!
//! A [`ValidationSession`] owns one snippet and walks the learner through
//! explaining it, having an [`Evaluator`] judge the explanation, and then
//! either retrying or closing. Evaluator failures never escape the session;
//! they become a fixed `needs_work` verdict so the retry path stays open.

/// The evaluator boundary and its transports.
pub mod evaluator;
/// The session state machine.
pub mod session;
/// A session shareable across tasks.
pub mod shared;
/// Verdicts and understanding levels.
pub mod verdict;
/// Headless rendering policy.
pub mod view;

pub use evaluator::{
    ConfiguredEvaluator, Evaluator, EvaluatorError, HttpEvaluator, OpenAiEvaluator,
    ValidationRequest,
};
pub use session::{
    Phase, SessionError, SessionHost, SubmissionTicket, SubmitOutcome, ValidationSession,
};
pub use shared::SharedSession;
pub use verdict::{LevelStyle, UnderstandingLevel, ValidationVerdict};
pub use view::{SessionView, TerminalAction};
