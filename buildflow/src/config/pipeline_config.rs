//! Typed, immutable pipeline configuration.

use super::ConfigStore;
use crate::dispatch::HandlerId;
use crate::errors::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Configuration keys understood by the pipeline.
pub mod keys {
    /// Comma-separated work-item file names for Build.
    pub const SCRIPTS: &str = "scripts";
    /// Directory every work item must exist in, when set.
    pub const SCRIPTS_DIR: &str = "scripts.dir";
    /// Comma-separated test identifiers for Test.
    pub const TESTS: &str = "tests";
    /// Application name used in the package artifact.
    pub const APP_NAME: &str = "app.name";
    /// Application version, required for packaging.
    pub const APP_VERSION: &str = "app.version";
    /// Deploy username.
    pub const GITHUB_USERNAME: &str = "github.username";
    /// Deploy token.
    pub const GITHUB_TOKEN: &str = "github.token";
    /// Deploy repository URL.
    pub const GITHUB_REPO_URL: &str = "github.repo_url";
    /// Program run by the Validate stage.
    pub const VALIDATE_COMMAND: &str = "validate.command";
    /// Substring that makes a simulated handler or test fail.
    pub const FAILURE_MARKER: &str = "pipeline.failure_marker";
    /// Program that runs one test identifier (appended as last argument).
    pub const TEST_COMMAND: &str = "tests.command";
    /// Prefix for per-extension tool commands, e.g. `handler.py=python3`.
    pub const HANDLER_PREFIX: &str = "handler.";
}

/// Credentials needed by the Deploy stage.
///
/// Every field is optional; Deploy checks them as a precondition.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DeployCredentials {
    /// Account name.
    pub username: Option<String>,
    /// Access token.
    pub token: Option<String>,
    /// Repository to push to.
    pub repo_url: Option<String>,
}

impl fmt::Debug for DeployCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployCredentials")
            .field("username", &self.username)
            .field("has_token", &self.token.is_some())
            .field("repo_url", &self.repo_url)
            .finish()
    }
}

impl DeployCredentials {
    /// Returns `(username, token, repo_url)` when all three are present.
    ///
    /// # Errors
    ///
    /// Returns the first missing key.
    pub fn complete(&self) -> Result<(&str, &str, &str), ConfigError> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| ConfigError::missing(keys::GITHUB_USERNAME))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ConfigError::missing(keys::GITHUB_TOKEN))?;
        let repo_url = self
            .repo_url
            .as_deref()
            .ok_or_else(|| ConfigError::missing(keys::GITHUB_REPO_URL))?;
        Ok((username, token, repo_url))
    }
}

/// Immutable snapshot of everything the stages read from configuration.
///
/// Absent keys stay `None`; nothing is defaulted here so that each stage can
/// decide whether a missing value fails its preconditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Work items for Build.
    pub scripts: Option<Vec<String>>,
    /// Directory the work items live in.
    pub scripts_dir: Option<PathBuf>,
    /// Test identifiers for Test.
    pub tests: Option<Vec<String>>,
    /// Application name.
    pub app_name: Option<String>,
    /// Application version.
    pub app_version: Option<String>,
    /// Deploy credentials.
    pub credentials: DeployCredentials,
    /// Program run by Validate.
    pub validate_command: Option<String>,
    /// Override for the simulated failure marker.
    pub failure_marker: Option<String>,
    /// Program that runs a test identifier, replacing the simulated runner.
    pub test_command: Option<String>,
    /// Real tools replacing the simulated handler for specific languages.
    pub handler_commands: BTreeMap<HandlerId, String>,
}

impl PipelineConfig {
    /// Projects a store into a typed configuration.
    #[must_use]
    pub fn from_store(store: &ConfigStore) -> Self {
        Self {
            scripts: list(store, keys::SCRIPTS),
            scripts_dir: scalar(store, keys::SCRIPTS_DIR).map(PathBuf::from),
            tests: list(store, keys::TESTS),
            app_name: scalar(store, keys::APP_NAME),
            app_version: scalar(store, keys::APP_VERSION),
            credentials: DeployCredentials {
                username: scalar(store, keys::GITHUB_USERNAME),
                token: scalar(store, keys::GITHUB_TOKEN),
                repo_url: scalar(store, keys::GITHUB_REPO_URL),
            },
            validate_command: scalar(store, keys::VALIDATE_COMMAND),
            failure_marker: scalar(store, keys::FAILURE_MARKER),
            test_command: scalar(store, keys::TEST_COMMAND),
            handler_commands: handler_commands(store),
        }
    }

    /// Sets the Build work items.
    #[must_use]
    pub fn with_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts = Some(scripts.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the Test identifiers.
    #[must_use]
    pub fn with_tests<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests = Some(tests.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the application version.
    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    /// Sets the deploy credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        token: impl Into<String>,
        repo_url: impl Into<String>,
    ) -> Self {
        self.credentials = DeployCredentials {
            username: Some(username.into()),
            token: Some(token.into()),
            repo_url: Some(repo_url.into()),
        };
        self
    }

    /// Sets the Validate program.
    #[must_use]
    pub fn with_validate_command(mut self, command: impl Into<String>) -> Self {
        self.validate_command = Some(command.into());
        self
    }

    /// Returns the name used for the packaged artifact.
    #[must_use]
    pub fn artifact_name(&self) -> Option<String> {
        let version = self.app_version.as_deref()?;
        let name = self.app_name.as_deref().unwrap_or("app");
        Some(format!("{name}-{version}.jar"))
    }
}

fn scalar(store: &ConfigStore, key: &str) -> Option<String> {
    store
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn handler_commands(store: &ConfigStore) -> BTreeMap<HandlerId, String> {
    store
        .entries_with_prefix(keys::HANDLER_PREFIX)
        .filter_map(|(ext, command)| {
            let command = command.trim();
            if command.is_empty() {
                return None;
            }
            match HandlerId::for_extension(ext) {
                Some(id) => Some((id, command.to_string())),
                None => {
                    warn!(extension = %ext, "Ignoring handler command for unsupported extension");
                    None
                }
            }
        })
        .collect()
}

fn list(store: &ConfigStore, key: &str) -> Option<Vec<String>> {
    store.get(key).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
