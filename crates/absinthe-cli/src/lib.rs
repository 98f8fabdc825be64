//! Absinthe CLI Library
//!
//! Terminal console for the campaign/points/API-key backend. Screens hold
//! the per-form workflows; subcommands drive them one action at a time and
//! the interactive console drives them from prompts.

pub mod account_cmd;
pub mod app;
pub mod campaign_cmd;
pub mod console;
pub mod fmt;
pub mod key_cmd;
pub mod points_cmd;
pub mod screens;

use std::io::{self, Write};

use app::{Notification, Phase, ValidationError, Workflow};

/// How a subcommand ended. Failures map to a non-zero exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

impl Outcome {
    /// Print the workflow's notification and classify it.
    pub fn report(w: &mut impl Write, workflow: &Workflow) -> io::Result<Self> {
        let notification = workflow.notification();
        if let Some(n) = notification {
            fmt::write_notification(w, n)?;
        }
        let failed =
            workflow.phase() == Phase::Failed || notification.is_some_and(Notification::is_error);
        Ok(if failed { Self::Failed } else { Self::Done })
    }

    pub(crate) fn rejected(w: &mut impl Write, err: &ValidationError) -> io::Result<Self> {
        writeln!(w, "[error] {err}")?;
        Ok(Self::Failed)
    }
}
