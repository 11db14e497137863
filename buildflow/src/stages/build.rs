//! Build stage: compile/run work items, smoke-test them, package.

use super::{Stage, StageRun};
use crate::context::PipelineContext;
use crate::core::{StageKind, StageStatus, Tone};
use crate::dispatch::WorkItem;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Progress after the compile/run sub-step.
const COMPILED: u8 = 33;
/// Progress after the smoke-test sub-step.
const SMOKE_TESTED: u8 = 66;
/// Progress after packaging.
const PACKAGED: u8 = 100;

/// Compiles or runs every configured work item, then smoke-tests and
/// packages them.
#[derive(Debug)]
pub struct BuildStage {
    ctx: Arc<PipelineContext>,
    run: StageRun,
}

impl BuildStage {
    /// Creates a build stage named `build`.
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self::named("build", ctx)
    }

    /// Creates a build stage with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>, ctx: Arc<PipelineContext>) -> Self {
        let run = StageRun::new(name, StageKind::Build, Arc::clone(ctx.event_sink()));
        Self { ctx, run }
    }

    async fn compile(&self, items: &[String]) -> bool {
        self.run.narrate("Compiling/Running source files...", Tone::Info);

        for name in items {
            let item = WorkItem::new(name.as_str());

            match &self.ctx.config().scripts_dir {
                Some(dir) => {
                    let path = dir.join(item.name());
                    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                        self.run
                            .narrate(format!("Source file not found: {item}"), Tone::Failure);
                        return false;
                    }
                    self.run
                        .narrate(format!("Processing {}...", path.display()), Tone::Info);
                }
                None => self.run.narrate(format!("Processing {item}..."), Tone::Info),
            }

            match self.ctx.handlers().dispatch(&item).await {
                Ok(result) => {
                    let tone = if result.passed { Tone::Info } else { Tone::Failure };
                    self.run.narrate_lines(&result.narration, tone);
                    if !result.passed {
                        debug!(item = %item, "Work item failed");
                        return false;
                    }
                }
                Err(err) => {
                    self.run.narrate(err.to_string(), Tone::Failure);
                    return false;
                }
            }
        }

        self.run.narrate("Compilation/Execution successful.", Tone::Success);
        true
    }

    async fn smoke_test(&self, items: &[String]) -> bool {
        self.run.narrate("Running tests...", Tone::Info);

        for name in items {
            let result = self.ctx.smoke_test_runner().run_test(name).await;
            if !result.passed {
                self.run.narrate_lines(&result.narration, Tone::Failure);
                self.run.narrate(format!("Test failed in: {name}"), Tone::Failure);
                return false;
            }
            self.run.narrate_lines(&result.narration, Tone::Info);
        }

        self.run.narrate("All tests passed.", Tone::Success);
        true
    }

    fn package(&self) -> bool {
        self.run
            .narrate("Packaging the project into a JAR file...", Tone::Info);

        match self.ctx.config().artifact_name() {
            Some(artifact) => {
                self.run.narrate("Packaging successful.", Tone::Success);
                self.run
                    .narrate(format!("JAR file created: {artifact}"), Tone::Info);
                true
            }
            None => {
                self.run.narrate(
                    "Packaging failed due to missing version in configuration",
                    Tone::Failure,
                );
                false
            }
        }
    }
}

#[async_trait]
impl Stage for BuildStage {
    fn name(&self) -> &str {
        self.run.name()
    }

    fn kind(&self) -> StageKind {
        StageKind::Build
    }

    fn status(&self) -> StageStatus {
        self.run.status()
    }

    fn progress(&self) -> u8 {
        self.run.progress()
    }

    async fn execute(&mut self) -> bool {
        if self.run.begin().is_err() {
            return false;
        }
        self.run.narrate("Executing build stage...", Tone::Info);

        let config = Arc::clone(self.ctx.config());
        let items = match config.scripts.as_deref() {
            Some(items) if !items.is_empty() => items,
            _ => return self.run.fail("No source files to compile."),
        };

        let compiled = self.compile(items).await;
        // Compilation reports its checkpoint even when an item fails.
        self.run.advance(COMPILED);
        if !compiled {
            return self.run.fail("Compilation/Execution failed.");
        }

        let tested = self.smoke_test(items).await;
        if !self.run.complete_step(SMOKE_TESTED, tested) {
            return self.run.fail("Tests failed.");
        }

        let packaged = self.package();
        if !self.run.complete_step(PACKAGED, packaged) {
            return self.run.fail("Packaging failed.");
        }

        self.run.succeed("Build successful.")
    }
}
