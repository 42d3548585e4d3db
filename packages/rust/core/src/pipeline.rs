//! Linear pipeline runner: input → intent → answer → delivery.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::ports::{DocumentRenderer, InputSource, LanguageModel, MailDispatcher};
use crate::state::StateRecord;
use crate::step::{Outcome, Stage, Step, StepResult, TerminalStep};
use crate::steps::{AcquireInput, AnalyzeIntention, DeliverOutput, GenerateAnswer};

/// Collaborators injected into the standard pipeline at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub input: Arc<dyn InputSource>,
    pub model: Arc<dyn LanguageModel>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub mailer: Arc<dyn MailDispatcher>,
}

/// Result of a single run.
#[derive(Debug)]
pub struct RunReport {
    /// Run identifier (UUID v7).
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// State as left by the last step.
    pub state: StateRecord,
    /// What the terminal step did.
    pub outcome: Outcome,
    /// Stages that actually executed, in order.
    pub executed: Vec<Stage>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a stage executes.
    fn phase(&self, stage: Stage);
    /// Called once the terminal step has produced its outcome.
    fn done(&self, outcome: &Outcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _stage: Stage) {}
    fn done(&self, _outcome: &Outcome) {}
}

/// Ordered business steps followed by one terminal step.
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
    terminal: Box<dyn TerminalStep>,
}

impl Pipeline {
    pub fn new(steps: Vec<Box<dyn Step>>, terminal: Box<dyn TerminalStep>) -> Self {
        Self { steps, terminal }
    }

    /// The question-answering pipeline wired to the given collaborators.
    pub fn standard(collaborators: Collaborators) -> Self {
        let Collaborators {
            input,
            model,
            renderer,
            mailer,
        } = collaborators;

        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(AcquireInput::new(input)),
            Box::new(AnalyzeIntention::new(model.clone())),
            Box::new(GenerateAnswer::new(model)),
        ];
        Self::new(steps, Box::new(DeliverOutput::new(renderer, mailer)))
    }

    /// Declared stage order, terminal stage last.
    pub fn stages(&self) -> Vec<Stage> {
        self.steps
            .iter()
            .map(|step| step.stage())
            .chain(std::iter::once(self.terminal.stage()))
            .collect()
    }

    /// Run once from an empty state.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> RunReport {
        self.run_from(StateRecord::new(), progress).await
    }

    /// Run once from `initial`.
    ///
    /// Steps execute strictly in order. After the first failure no further
    /// business step runs; the terminal step always runs exactly once.
    #[instrument(skip_all, fields(run_id))]
    pub async fn run_from(
        &self,
        initial: StateRecord,
        progress: &dyn ProgressReporter,
    ) -> RunReport {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        info!(%run_id, stages = self.steps.len() + 1, "starting pipeline run");

        let mut state = initial;
        let mut executed = Vec::with_capacity(self.steps.len() + 1);

        for step in &self.steps {
            if state.is_failed() {
                debug!(stage = %step.stage(), "skipping remaining steps after failure");
                break;
            }

            progress.phase(step.stage());
            executed.push(step.stage());

            match step.run(&state).await {
                StepResult::Update(update) => {
                    let taken = update.conflicts_with(&state);
                    if !taken.is_empty() {
                        warn!(
                            stage = %step.stage(),
                            fields = ?taken,
                            "step overwrote fields set earlier"
                        );
                    }
                    state = state.merge(update);
                }
                StepResult::Failure(failure) => {
                    warn!(
                        stage = %step.stage(),
                        kind = failure.kind(),
                        error = %failure,
                        "step failed"
                    );
                    state = state.fail(failure);
                }
            }
        }

        progress.phase(self.terminal.stage());
        executed.push(self.terminal.stage());
        let outcome = self.terminal.finish(&state).await;

        if let Outcome::Reported(failure) = &outcome {
            if !state.is_failed() {
                state = state.fail(failure.clone());
            }
        }

        progress.done(&outcome);

        let report = RunReport {
            run_id,
            started_at,
            state,
            outcome,
            executed,
            elapsed: start.elapsed(),
        };

        info!(
            %run_id,
            delivered = report.outcome.is_delivered(),
            failure = report.outcome.failure().map(|f| f.kind()),
            elapsed_ms = report.elapsed.as_millis(),
            "pipeline run complete"
        );

        report
    }
}
