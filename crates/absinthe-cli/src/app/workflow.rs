//! Per-form submission state machine.
//!
//! `Idle -> Submitting -> (Succeeded | Failed) -> Idle`. Entering
//! `Submitting` requires a valid form and no call already in flight; leaving
//! it always records a notification. Dismissing the notification returns to
//! `Idle`, and a settled workflow accepts a new submission directly.

use std::fmt::Display;

use tracing::{error, warn};

use absinthe_client::UserMessage;

use super::form::{Form, ValidationError};
use super::notification::Notification;

/// Where a workflow is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Why a submission did not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// A call from this workflow is still outstanding.
    Busy,
    Invalid(ValidationError),
}

/// Submission state for one form.
#[derive(Debug, Clone)]
pub struct Workflow {
    phase: Phase,
    notification: Option<Notification>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            notification: None,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    pub const fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Whether the submit control is enabled for `form`.
    pub fn can_submit<F: Form>(&self, form: &F) -> bool {
        !self.is_submitting() && form.validate().is_ok()
    }

    /// Validate `form` and enter `Submitting`.
    pub fn begin<F: Form>(&mut self, form: &F) -> Result<F::Submission, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::Busy);
        }
        match form.validate() {
            Ok(submission) => {
                self.start();
                Ok(submission)
            }
            Err(e) => {
                self.reject(e.clone());
                Err(SubmitError::Invalid(e))
            }
        }
    }

    /// Enter `Submitting` for an action that has no form.
    pub fn begin_action(&mut self) -> Result<(), SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::Busy);
        }
        self.start();
        Ok(())
    }

    fn start(&mut self) {
        self.phase = Phase::Submitting;
        self.notification = None;
    }

    /// Record a client-side rejection. The phase is left untouched.
    pub fn reject(&mut self, error: ValidationError) {
        warn!(%error, "Submission rejected");
        self.notification = Some(Notification::error("Invalid input", error.to_string()));
    }

    pub fn succeed(&mut self, notification: Notification) {
        self.phase = Phase::Succeeded;
        self.notification = Some(notification);
    }

    /// Settle as failed, preferring the server's message over `fallback`.
    pub fn fail<E>(&mut self, title: &str, fallback: &str, err: &E)
    where
        E: Display + UserMessage,
    {
        error!(error = %err, "{}", title);
        let message = err
            .server_message()
            .unwrap_or_else(|| fallback.to_string());
        self.phase = Phase::Failed;
        self.notification = Some(Notification::error(title, message));
    }

    /// Close the notification and return to `Idle`.
    pub fn dismiss(&mut self) -> Option<Notification> {
        if !self.is_submitting() {
            self.phase = Phase::Idle;
        }
        self.notification.take()
    }
}
