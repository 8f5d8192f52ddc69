#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

/// Label for the action that ends the interaction. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    /// The explanation passed; the learner moves on.
    Continue,
    /// Anything else; the learner dismisses the pop-up.
    Close,
}

impl TerminalAction {
    /// Button text for this action.
    pub fn label(self) -> &'static str {
        match self {
            TerminalAction::Continue => "Continue",
            TerminalAction::Close => "Close",
        }
    }
}

impl Display for TerminalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which controls a front end should enable for the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    /// The explanation text box accepts edits.
    pub draft_editable:  bool,
    /// The submit control is enabled.
    pub submit_enabled:  bool,
    /// A busy indicator should replace the submit label. Set while an
    /// evaluator call is outstanding.
    pub busy:            bool,
    /// "Try again" is offered.
    pub offer_retry:     bool,
    /// Label of the closing action.
    pub terminal_action: TerminalAction,
}
