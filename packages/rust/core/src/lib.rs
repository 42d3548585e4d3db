//! Pipeline orchestration core for askmail.
//!
//! A run threads a [`StateRecord`] through an ordered list of [`Step`]s and
//! ends in a single [`TerminalStep`] that either delivers the answer or
//! reports why it could not. Collaborators are reached only through the
//! traits in [`ports`].

pub mod failure;
pub mod messages;
pub mod pipeline;
pub mod ports;
pub mod state;
pub mod step;
pub mod steps;

#[cfg(test)]
mod testing;

pub use failure::Failure;
pub use pipeline::{Collaborators, Pipeline, ProgressReporter, RunReport, SilentProgress};
pub use ports::{ArtifactGuard, DocumentRenderer, InputSource, LanguageModel, MailDispatcher};
pub use state::{StateRecord, StateUpdate};
pub use step::{Outcome, Stage, Step, StepResult, TerminalStep};
