//! In-memory collaborators for pipeline tests.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use askmail_shared::{Artifact, AskmailError, Result};

use crate::ports::{DocumentRenderer, InputSource, LanguageModel, MailDispatcher};

/// Answers prompts from a fixed script; runs dry afterwards.
pub(crate) struct ScriptedInput {
    lines: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub(crate) fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.lines
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AskmailError::InputUnavailable("end of input".into()))
    }
}

/// Replays canned completions in order and records every prompt.
pub(crate) struct FakeModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub(crate) fn script<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<&'static str, &'static str>>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self::script(replies.into_iter().map(Ok))
    }

    pub(crate) fn failing(detail: &'static str) -> Self {
        Self::script([Err(detail)])
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(detail)) => Err(AskmailError::Llm(detail)),
            None => Err(AskmailError::Llm("no scripted reply left".into())),
        }
    }
}

/// Writes tiny real files so handles resolve until released.
pub(crate) struct FakeRenderer {
    dir: PathBuf,
    fail_with: Option<&'static str>,
    renders: Mutex<Vec<(String, String)>>,
    live: Mutex<HashSet<PathBuf>>,
    releases: AtomicUsize,
}

impl FakeRenderer {
    pub(crate) fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("askmail-core-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        Self {
            dir,
            fail_with: None,
            renders: Mutex::new(Vec::new()),
            live: Mutex::new(HashSet::new()),
            releases: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(detail: &'static str) -> Self {
        Self {
            fail_with: Some(detail),
            ..Self::new()
        }
    }

    /// `(title, body)` of every render call.
    pub(crate) fn renders(&self) -> Vec<(String, String)> {
        self.renders.lock().unwrap().clone()
    }

    pub(crate) fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub(crate) fn live_artifacts(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl DocumentRenderer for FakeRenderer {
    fn render(&self, title: &str, body: &str) -> Result<Artifact> {
        self.renders
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        if let Some(detail) = self.fail_with {
            return Err(AskmailError::Render(detail.into()));
        }

        let path = self
            .dir
            .join(format!("respuesta_ia-{}.pdf", uuid::Uuid::now_v7()));
        std::fs::write(&path, body).map_err(|e| AskmailError::io(&path, e))?;
        self.live.lock().unwrap().insert(path.clone());
        Ok(Artifact::pdf(path, "respuesta_ia.pdf"))
    }

    fn release(&self, artifact: &Artifact) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().remove(&artifact.path);
        std::fs::remove_file(&artifact.path).map_err(|e| AskmailError::io(&artifact.path, e))
    }
}

/// One recorded `send` call.
#[derive(Debug, Clone)]
pub(crate) struct SentMail {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
    pub(crate) attachment_resolved: bool,
}

type ErrorFactory = Box<dyn Fn() -> AskmailError + Send + Sync>;

/// Records dispatches; optionally rejects each one.
pub(crate) struct FakeMailer {
    reject: Option<ErrorFactory>,
    sent: Mutex<Vec<SentMail>>,
}

impl FakeMailer {
    pub(crate) fn accepting() -> Self {
        Self {
            reject: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rejecting(make_error: impl Fn() -> AskmailError + Send + Sync + 'static) -> Self {
        Self {
            reject: Some(Box::new(make_error)),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailDispatcher for FakeMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: &Artifact,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            attachment_resolved: attachment.resolves(),
        });
        match &self.reject {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}
