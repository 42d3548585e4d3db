//! Contracts between the runner and the units of work it sequences.

use async_trait::async_trait;

use crate::failure::Failure;
use crate::state::{StateRecord, StateUpdate};

/// Position of a step in the run's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Input,
    IntentAnalysis,
    AnswerGeneration,
    Delivery,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::IntentAnalysis => "intent_analysis",
            Self::AnswerGeneration => "answer_generation",
            Self::Delivery => "delivery",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a business step hands back to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Fields to merge into the state.
    Update(StateUpdate),
    /// The run cannot continue; only `error` is recorded.
    Failure(Failure),
}

impl From<Failure> for StepResult {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

/// How a run ended. Produced once, by the terminal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document was mailed.
    Delivered {
        recipient: String,
        subject: String,
        attachment: String,
    },
    /// Nothing was delivered; the reason is attached.
    Reported(Failure),
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Reported(failure) => Some(failure),
            Self::Delivered { .. } => None,
        }
    }
}

/// One business step of the pipeline.
///
/// Implementations read the state, may perform a single side effect through
/// a collaborator, and must map every collaborator error to a [`Failure`].
#[async_trait]
pub trait Step: Send + Sync {
    fn stage(&self) -> Stage;

    async fn run(&self, state: &StateRecord) -> StepResult;
}

/// The final step. Runs exactly once per run, failed or not.
#[async_trait]
pub trait TerminalStep: Send + Sync {
    fn stage(&self) -> Stage {
        Stage::Delivery
    }

    async fn finish(&self, state: &StateRecord) -> Outcome;
}
