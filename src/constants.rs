#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Feedback attached to the synthetic verdict used when the evaluator could
/// not be reached or answered with something unusable.
pub const VALIDATION_FAILED_FEEDBACK: &str =
    "Failed to validate your explanation. Please try again.";

/// Nudge shown when the same error keeps coming back.
pub const REPEATED_ERROR_MESSAGE: &str =
    "I noticed you're encountering the same error repeatedly. Would you like a hint?";

/// Nudge shown when the learner has not made meaningful progress.
pub const NO_PROGRESS_MESSAGE: &str =
    "You've been working on this for a while. Need some guidance?";

/// Nudge shown when the learner's approach looks off.
pub const APPROACH_MESSAGE: &str =
    "Your approach might need adjusting. Want me to point you in the right direction?";

/// Fallback nudge for unrecognised reasons.
pub const DEFAULT_STUCK_MESSAGE: &str = "Looks like you might be stuck. Would you like some help?";

/// Default timeout for the HTTP evaluator transport, in seconds.
pub const DEFAULT_EVALUATOR_TIMEOUT_SECS: u64 = 60;

/// Character cap applied to the code snippet embedded in the LLM judge prompt.
pub const PROMPT_TRUNCATE: usize = 15000;
