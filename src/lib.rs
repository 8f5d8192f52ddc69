//! # feynman
//!
//! Headless core of a coding tutor's learner check-ins: explain-it-back
//! validation sessions and stuck-learner nudges.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven configuration
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Reason classification for the nudge pop-up
pub mod nudge;
/// Shared value types
pub mod types;
/// The explain-it-back workflow
pub mod validation;

pub use nudge::{Advisory, NudgeAction, StuckSignal, advise, classify};
pub use types::Location;
pub use validation::{Phase, ValidationSession, ValidationVerdict};
