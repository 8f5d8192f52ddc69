#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Turns a stuck-detector reason into the message and choices of the nudge
//! pop-up.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        APPROACH_MESSAGE, DEFAULT_STUCK_MESSAGE, NO_PROGRESS_MESSAGE, REPEATED_ERROR_MESSAGE,
    },
    types::Location,
};

/// What the upstream stuck detector reports.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct StuckSignal {
    /// Free-form diagnostic string.
    pub reason_code: String,
    /// Where the learner was working, if known.
    #[serde(default)]
    pub location:    Option<Location>,
}

/// A choice offered alongside the advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeAction {
    /// The learner wants help.
    RequestHelp,
    /// The learner wants to be left alone.
    Dismiss,
}

impl NudgeAction {
    /// Button text for this action.
    pub fn label(self) -> &'static str {
        match self {
            NudgeAction::RequestHelp => "Get help",
            NudgeAction::Dismiss => "I'm fine",
        }
    }
}

/// What the nudge pop-up shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    /// Message for the learner.
    pub message:      &'static str,
    /// Short `file:line` hint, when a location was reported.
    pub context_line: Option<String>,
    /// Choices, in display order.
    pub actions:      [NudgeAction; 2],
}

/// A message selected when the reason contains any of `needles`.
struct Rule {
    /// Case-sensitive substrings, any of which selects the rule.
    needles: &'static [&'static str],
    /// Message for the learner.
    message: &'static str,
}

/// Evaluated top to bottom; the first matching rule wins.
const RULES: &[Rule] = &[
    Rule {
        needles: &["repeated", "Repeated"],
        message: REPEATED_ERROR_MESSAGE,
    },
    Rule {
        needles: &["no progress", "No significant"],
        message: NO_PROGRESS_MESSAGE,
    },
    Rule {
        needles: &["logic", "approach"],
        message: APPROACH_MESSAGE,
    },
];

/// Maps a reason code to a learner-facing message. Total: anything no rule
/// recognises, including the empty string, gets the default message.
pub fn classify(reason_code: &str) -> &'static str {
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| reason_code.contains(needle)))
        .map_or(DEFAULT_STUCK_MESSAGE, |rule| rule.message)
}

/// Renders `location` as `file:line` using only the last path segment.
pub fn context_line(location: Option<&Location>) -> Option<String> {
    location.map(|loc| format!("{}:{}", loc.file_name(), loc.line))
}

/// Builds the full advisory for `signal`.
pub fn advise(signal: &StuckSignal) -> Advisory {
    Advisory {
        message:      classify(&signal.reason_code),
        context_line: context_line(signal.location.as_ref()),
        actions:      [NudgeAction::RequestHelp, NudgeAction::Dismiss],
    }
}
