//! External command execution.
//!
//! Deploy, Validate and process-backed handlers all go through the
//! [`CommandRunner`] port so that tests and dry runs can substitute the
//! real process spawn.

mod redact;
mod runner;

pub use redact::{authenticated_url, redact_credentials};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, DryRunCommandRunner, TokioCommandRunner};

#[cfg(test)]
pub use runner::MockCommandRunner;
