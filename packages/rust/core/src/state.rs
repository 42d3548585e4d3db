//! The record threaded through one pipeline run.

use crate::failure::Failure;

/// Mutable context of a single run. Created empty, discarded at the end.
///
/// Steps only ever see a shared reference; the runner produces each new
/// version through [`StateRecord::merge`] or [`StateRecord::fail`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateRecord {
    question: String,
    recipient: String,
    intention: String,
    answer: String,
    error: Option<Failure>,
}

impl StateRecord {
    /// A record with every field empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn intention(&self) -> &str {
        &self.intention
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn error(&self) -> Option<&Failure> {
        self.error.as_ref()
    }

    /// Whether an earlier step has failed.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Return a copy with the fields present in `update` overwritten.
    pub fn merge(&self, update: StateUpdate) -> Self {
        let mut next = self.clone();
        if let Some(question) = update.question {
            next.question = question;
        }
        if let Some(recipient) = update.recipient {
            next.recipient = recipient;
        }
        if let Some(intention) = update.intention {
            next.intention = intention;
        }
        if let Some(answer) = update.answer {
            next.answer = answer;
        }
        next
    }

    /// Return a copy carrying `failure`. An existing error is kept.
    pub fn fail(&self, failure: Failure) -> Self {
        let mut next = self.clone();
        if next.error.is_none() {
            next.error = Some(failure);
        }
        next
    }
}

/// Partial set of fields returned by a successful step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    question: Option<String>,
    recipient: Option<String>,
    intention: Option<String>,
    answer: Option<String>,
}

impl StateUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn intention(mut self, intention: impl Into<String>) -> Self {
        self.intention = Some(intention.into());
        self
    }

    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.recipient.is_none()
            && self.intention.is_none()
            && self.answer.is_none()
    }

    /// Names of fields this update would overwrite in `state` that are
    /// already set there.
    pub fn conflicts_with(&self, state: &StateRecord) -> Vec<&'static str> {
        let mut taken = Vec::new();
        if self.question.is_some() && !state.question.is_empty() {
            taken.push("question");
        }
        if self.recipient.is_some() && !state.recipient.is_empty() {
            taken.push("recipient");
        }
        if self.intention.is_some() && !state.intention.is_empty() {
            taken.push("intention");
        }
        if self.answer.is_some() && !state.answer.is_empty() {
            taken.push("answer");
        }
        taken
    }
}
