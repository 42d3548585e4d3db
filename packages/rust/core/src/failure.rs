//! Reasons a run can end without delivering its answer.

use std::path::PathBuf;

use askmail_shared::AskmailError;

/// Terminal failure of a single pipeline run.
///
/// Every variant is final: the runner records the first one in the state
/// and skips straight to the delivery step, which only reports it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// The user input channel was closed or missing.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// The language model failed while summarizing the question's intent.
    #[error("intent analysis failed: {0}")]
    IntentAnalysisFailed(String),

    /// The language model failed while answering the question.
    #[error("answer generation failed: {0}")]
    AnswerGenerationFailed(String),

    /// The answer could not be rendered into a document.
    #[error("render failed: {0}")]
    Render(String),

    /// Sender credentials are missing or still placeholders.
    #[error("mail credentials missing: {0}")]
    CredentialsMissing(String),

    /// The rendered document vanished before it could be attached.
    #[error("attachment not found at {0:?}")]
    AttachmentNotFound(PathBuf),

    /// The mail transport rejected or failed to deliver the message.
    #[error("transport error: {0}")]
    Transport(String),

    /// Delivery was reached without an error but with nothing to deliver.
    #[error("incomplete state: {0} is empty")]
    IncompleteState(&'static str),
}

impl Failure {
    /// Stable identifier for logs and exit summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputUnavailable(_) => "input_unavailable",
            Self::IntentAnalysisFailed(_) => "intent_analysis_failed",
            Self::AnswerGenerationFailed(_) => "answer_generation_failed",
            Self::Render(_) => "render_error",
            Self::CredentialsMissing(_) => "credentials_missing",
            Self::AttachmentNotFound(_) => "attachment_not_found",
            Self::Transport(_) => "transport_error",
            Self::IncompleteState(_) => "incomplete_state",
        }
    }

    /// Classify an error raised while rendering or dispatching the document.
    pub fn from_delivery(err: AskmailError) -> Self {
        match err {
            AskmailError::Render(detail) => Self::Render(detail),
            AskmailError::CredentialsMissing(detail) => Self::CredentialsMissing(detail),
            AskmailError::AttachmentNotFound { path } => Self::AttachmentNotFound(path),
            AskmailError::Transport(detail) => Self::Transport(detail),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_errors_keep_their_kind() {
        let f = Failure::from_delivery(AskmailError::CredentialsMissing("EMAIL_HOST_USER".into()));
        assert_eq!(f, Failure::CredentialsMissing("EMAIL_HOST_USER".into()));

        let f = Failure::from_delivery(AskmailError::AttachmentNotFound {
            path: PathBuf::from("/tmp/a.pdf"),
        });
        assert_eq!(f.kind(), "attachment_not_found");

        let f = Failure::from_delivery(AskmailError::Render("font".into()));
        assert_eq!(f, Failure::Render("font".into()));
    }

    #[test]
    fn unexpected_delivery_errors_become_transport() {
        let f = Failure::from_delivery(AskmailError::io(
            "/tmp/a.pdf",
            std::io::Error::other("disk gone"),
        ));
        assert_eq!(f.kind(), "transport_error");
        assert!(f.to_string().contains("disk gone"));
    }

    #[test]
    fn config_errors_at_delivery_become_transport() {
        let f = Failure::from_delivery(AskmailError::config("bad relay"));
        assert_eq!(f, Failure::Transport("config error: bad relay".into()));
    }
}
