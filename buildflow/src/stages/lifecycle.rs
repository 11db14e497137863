//! Lifecycle bookkeeping shared by every stage.

use crate::core::{StageEvent, StageKind, StageOutcome, StageStatus, Tone};
use crate::errors::BuildflowError;
use crate::events::{emit_event, EventSink};
use crate::process::{CommandRunner, CommandSpec};
use crate::utils::elapsed_ms;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tracks status and progress of one stage execution and reports them.
///
/// Progress only moves forward and stays where it was when a sub-step
/// fails. 100 is reached only by a stage that completed every sub-step.
pub struct StageRun {
    name: String,
    kind: StageKind,
    status: StageStatus,
    progress: u8,
    started_at: Option<Instant>,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for StageRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRun")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl StageRun {
    /// Creates a pending run.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: StageKind, sink: Arc<dyn EventSink>) -> Self {
        Self {
            name: name.into(),
            kind,
            status: StageStatus::Pending,
            progress: 0,
            started_at: None,
            sink,
        }
    }

    /// Moves `Pending → Running`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildflowError::AlreadyExecuted`] if the stage has already
    /// started; its recorded state is left untouched.
    pub fn begin(&mut self) -> Result<(), BuildflowError> {
        if self.status != StageStatus::Pending {
            warn!(stage = %self.name, status = %self.status, "Stage already executed");
            return Err(BuildflowError::already_executed(&self.name));
        }

        self.status = StageStatus::Running;
        self.started_at = Some(Instant::now());
        info!(stage = %self.name, kind = %self.kind, "Stage started");
        emit_event(self.sink.as_ref(), &StageEvent::started(&self.name));
        Ok(())
    }

    /// Emits a narration line.
    pub fn narrate(&self, message: impl AsRef<str>, tone: Tone) {
        let message = message.as_ref();
        debug!(stage = %self.name, ?tone, "{message}");
        emit_event(self.sink.as_ref(), &StageEvent::narration(&self.name, message, tone));
    }

    /// Emits every line of a multi-line narration.
    pub fn narrate_lines(&self, text: &str, tone: Tone) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.narrate(line, tone);
        }
    }

    /// Raises progress to `percent`; lower values are ignored.
    pub fn advance(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.progress {
            self.progress = percent;
            emit_event(self.sink.as_ref(), &StageEvent::progress(&self.name, percent));
        }
    }

    /// Records the end of a sub-step and returns whether it passed.
    ///
    /// Only a passing sub-step moves progress to `checkpoint`.
    pub fn complete_step(&mut self, checkpoint: u8, passed: bool) -> bool {
        if passed {
            self.advance(checkpoint);
        }
        passed
    }

    /// Marks the stage succeeded with progress 100. Returns `true`.
    pub fn succeed(&mut self, message: impl AsRef<str>) -> bool {
        self.advance(100);
        self.status = StageStatus::Succeeded;
        self.narrate(message, Tone::Success);

        let duration_ms = self.duration_ms();
        info!(stage = %self.name, duration_ms, "Stage succeeded");
        emit_event(self.sink.as_ref(), &StageEvent::succeeded(&self.name, duration_ms));
        true
    }

    /// Marks the stage failed, keeping its progress. Returns `false`.
    pub fn fail(&mut self, message: impl AsRef<str>) -> bool {
        self.status = StageStatus::Failed;
        self.narrate(message, Tone::Failure);

        let duration_ms = self.duration_ms();
        warn!(stage = %self.name, progress = self.progress, duration_ms, "Stage failed");
        emit_event(
            self.sink.as_ref(),
            &StageEvent::failed(&self.name, self.progress, duration_ms),
        );
        false
    }

    /// Runs a command, narrating its output, and returns whether it passed.
    ///
    /// Launch failures and non-zero exits are narrated, never propagated.
    pub async fn run_command(&self, runner: &dyn CommandRunner, command: &CommandSpec) -> bool {
        self.narrate(format!("$ {command}"), Tone::Info);
        match runner.run(command).await {
            Ok(output) => {
                for line in output.lines() {
                    self.narrate(line, Tone::Info);
                }
                true
            }
            Err(err) => {
                warn!(stage = %self.name, error = ?err.to_dict(), "Command failed");
                self.narrate(err.to_string(), Tone::Failure);
                if let Some(output) = err.output() {
                    self.narrate_lines(output, Tone::Failure);
                }
                false
            }
        }
    }

    /// The stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage kind.
    #[must_use]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// The current status.
    #[must_use]
    pub fn status(&self) -> StageStatus {
        self.status
    }

    /// The progress reached so far.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// The outcome as it stands now.
    #[must_use]
    pub fn outcome(&self) -> StageOutcome {
        StageOutcome::new(&self.name, self.kind, self.status.is_success(), self.progress)
    }

    fn duration_ms(&self) -> f64 {
        self.started_at.map_or(0.0, elapsed_ms)
    }
}
