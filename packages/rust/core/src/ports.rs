//! Collaborator interfaces the pipeline steps call out to.
//!
//! Concrete implementations live in the adapter crates (`askmail-llm`,
//! `askmail-artifacts`, `askmail-mail`) and in the CLI.

use async_trait::async_trait;
use tracing::{debug, warn};

use askmail_shared::{Artifact, Result};

/// Blocking prompt/answer source, typically the terminal.
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Show `prompt` and return one line of input without its line ending.
    async fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Text completion service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Turns a title and body into a document on disk.
pub trait DocumentRenderer: Send + Sync {
    /// Newlines in `body` must survive as line breaks in the output.
    fn render(&self, title: &str, body: &str) -> Result<Artifact>;

    /// Delete a previously rendered artifact.
    fn release(&self, artifact: &Artifact) -> Result<()>;
}

/// Outgoing mail with a single attachment.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str, attachment: &Artifact)
    -> Result<()>;
}

// ---------------------------------------------------------------------------
// Scoped artifact release
// ---------------------------------------------------------------------------

/// Releases its artifact through the renderer when dropped, on every exit
/// path of the scope that holds it.
pub struct ArtifactGuard<'a> {
    renderer: &'a dyn DocumentRenderer,
    artifact: Artifact,
}

impl<'a> ArtifactGuard<'a> {
    pub fn new(renderer: &'a dyn DocumentRenderer, artifact: Artifact) -> Self {
        Self { renderer, artifact }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}

impl Drop for ArtifactGuard<'_> {
    fn drop(&mut self) {
        match self.renderer.release(&self.artifact) {
            Ok(()) => debug!(artifact = %self.artifact, "released temporary artifact"),
            Err(e) => warn!(artifact = %self.artifact, error = %e, "failed to release artifact"),
        }
    }
}
