//! The four steps of the question → answer → mail pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use askmail_shared::AskmailError;

use crate::failure::Failure;
use crate::messages;
use crate::ports::{ArtifactGuard, DocumentRenderer, InputSource, LanguageModel, MailDispatcher};
use crate::state::{StateRecord, StateUpdate};
use crate::step::{Outcome, Stage, Step, StepResult, TerminalStep};

// ---------------------------------------------------------------------------
// Acquire input
// ---------------------------------------------------------------------------

/// Reads the question and the delivery address.
pub struct AcquireInput {
    input: Arc<dyn InputSource>,
}

impl AcquireInput {
    pub fn new(input: Arc<dyn InputSource>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl Step for AcquireInput {
    fn stage(&self) -> Stage {
        Stage::Input
    }

    async fn run(&self, _state: &StateRecord) -> StepResult {
        let question = match self.input.read_line(messages::QUESTION_PROMPT).await {
            Ok(line) => line,
            Err(e) => return input_unavailable(e),
        };
        let recipient = match self.input.read_line(messages::RECIPIENT_PROMPT).await {
            Ok(line) => line.trim().to_string(),
            Err(e) => return input_unavailable(e),
        };

        debug!(question_chars = question.chars().count(), %recipient, "input acquired");
        StepResult::Update(StateUpdate::new().question(question).recipient(recipient))
    }
}

fn input_unavailable(err: AskmailError) -> StepResult {
    let detail = match err {
        AskmailError::InputUnavailable(detail) => detail,
        other => other.to_string(),
    };
    Failure::InputUnavailable(detail).into()
}

// ---------------------------------------------------------------------------
// Analyze intention
// ---------------------------------------------------------------------------

/// Asks the model for a one-sentence summary of what the user wants.
pub struct AnalyzeIntention {
    model: Arc<dyn LanguageModel>,
}

impl AnalyzeIntention {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Step for AnalyzeIntention {
    fn stage(&self) -> Stage {
        Stage::IntentAnalysis
    }

    async fn run(&self, state: &StateRecord) -> StepResult {
        let prompt = messages::intent_prompt(state.question());
        match self.model.complete(&prompt).await {
            Ok(intention) => {
                info!(%intention, "intention detected");
                StepResult::Update(StateUpdate::new().intention(intention))
            }
            Err(e) => Failure::IntentAnalysisFailed(e.to_string()).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generate answer
// ---------------------------------------------------------------------------

/// Sends the question itself to the model.
///
/// Does not read `intention`; it only runs after intent analysis succeeded.
pub struct GenerateAnswer {
    model: Arc<dyn LanguageModel>,
}

impl GenerateAnswer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Step for GenerateAnswer {
    fn stage(&self) -> Stage {
        Stage::AnswerGeneration
    }

    async fn run(&self, state: &StateRecord) -> StepResult {
        match self.model.complete(state.question()).await {
            Ok(answer) => {
                info!(answer_chars = answer.chars().count(), "answer generated");
                StepResult::Update(StateUpdate::new().answer(answer))
            }
            Err(e) => Failure::AnswerGenerationFailed(e.to_string()).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Deliver output (terminal)
// ---------------------------------------------------------------------------

/// Renders the answer, mails it, and always releases the rendered file.
/// On a failed run it only reports the recorded error.
pub struct DeliverOutput {
    renderer: Arc<dyn DocumentRenderer>,
    mailer: Arc<dyn MailDispatcher>,
}

impl DeliverOutput {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, mailer: Arc<dyn MailDispatcher>) -> Self {
        Self { renderer, mailer }
    }
}

#[async_trait]
impl TerminalStep for DeliverOutput {
    async fn finish(&self, state: &StateRecord) -> Outcome {
        if let Some(failure) = state.error() {
            warn!(kind = failure.kind(), error = %failure, "run interrupted, nothing delivered");
            return Outcome::Reported(failure.clone());
        }
        if state.answer().is_empty() {
            warn!("delivery reached without an answer");
            return Outcome::Reported(Failure::IncompleteState("answer"));
        }

        let title = messages::document_title(state.question());
        let artifact = match self.renderer.render(&title, state.answer()) {
            Ok(artifact) => artifact,
            Err(e) => return Outcome::Reported(Failure::from_delivery(e)),
        };
        info!(artifact = %artifact, "document rendered");

        let guard = ArtifactGuard::new(self.renderer.as_ref(), artifact);
        let subject = messages::mail_subject(state.question());
        let sent = self
            .mailer
            .send(state.recipient(), &subject, messages::MAIL_BODY, guard.artifact())
            .await;

        match sent {
            Ok(()) => {
                info!(recipient = %state.recipient(), "answer mailed");
                Outcome::Delivered {
                    recipient: state.recipient().to_string(),
                    subject,
                    attachment: guard.artifact().file_name.clone(),
                }
            }
            Err(e) => Outcome::Reported(Failure::from_delivery(e)),
        }
    }
}
