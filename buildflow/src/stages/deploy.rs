//! Deploy stage: push the working tree to the configured repository.

use super::{Stage, StageRun};
use crate::context::PipelineContext;
use crate::core::{StageKind, StageStatus, Tone};
use crate::process::{authenticated_url, redact_credentials, CommandSpec};
use async_trait::async_trait;
use std::sync::Arc;

/// Commit message used for automated deployments.
pub const COMMIT_MESSAGE: &str = "Automated deployment from pipeline";

/// Configures git credentials, then stages, commits and pushes.
#[derive(Debug)]
pub struct DeployStage {
    ctx: Arc<PipelineContext>,
    run: StageRun,
}

impl DeployStage {
    /// Creates a deploy stage named `deploy`.
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self::named("deploy", ctx)
    }

    /// Creates a deploy stage with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>, ctx: Arc<PipelineContext>) -> Self {
        let run = StageRun::new(name, StageKind::Deploy, Arc::clone(ctx.event_sink()));
        Self { ctx, run }
    }

    async fn git<const N: usize>(&self, args: [&str; N]) -> bool {
        let command = CommandSpec::new("git", args);
        self.run
            .run_command(self.ctx.commands().as_ref(), &command)
            .await
    }

    async fn configure_credentials(&self, username: &str, token: &str, repo_url: &str) -> bool {
        if !self
            .git(["config", "--global", "credential.helper", "store"])
            .await
        {
            return false;
        }

        match authenticated_url(repo_url, username, token) {
            Some(url) => self.git(["remote", "set-url", "origin", url.as_str()]).await,
            None => {
                self.run.narrate(
                    format!(
                        "Repository URL has no scheme: {}",
                        redact_credentials(repo_url)
                    ),
                    Tone::Failure,
                );
                false
            }
        }
    }
}

#[async_trait]
impl Stage for DeployStage {
    fn name(&self) -> &str {
        self.run.name()
    }

    fn kind(&self) -> StageKind {
        StageKind::Deploy
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

        let config = Arc::clone(self.ctx.config());
        let Ok((username, token, repo_url)) = config.credentials.complete() else {
            return self
                .run
                .fail("GitHub credentials or repository URL are missing.");
        };

        let configured = self.configure_credentials(username, token, repo_url).await;
        if !self.run.complete_step(25, configured) {
            return self.run.fail("Failed to configure git credentials.");
        }

        let staged = self.git(["add", "."]).await;
        if !self.run.complete_step(50, staged) {
            return self.run.fail("Failed to stage changes.");
        }

        let committed = self.git(["commit", "-m", COMMIT_MESSAGE]).await;
        if !self.run.complete_step(75, committed) {
            return self.run.fail("Failed to commit changes.");
        }

        let pushed = self.git(["push", repo_url]).await;
        if !self.run.complete_step(100, pushed) {
            return self.run.fail("Failed to push to GitHub.");
        }

        self.run.succeed("Deployment to GitHub successful.")
    }
}
