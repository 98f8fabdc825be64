//! Account screen: create an anonymous account or forget the current one.

use absinthe_client::ConsoleApi;
use absinthe_core::SessionContext;

use crate::app::{Notification, Phase, ValidationError, Workflow};

/// The only screen allowed to write the session.
pub struct AccountScreen<'a, A> {
    api: &'a A,
    session: &'a SessionContext,
    create: Workflow,
}

impl<'a, A: ConsoleApi> AccountScreen<'a, A> {
    pub const fn new(api: &'a A, session: &'a SessionContext) -> Self {
        Self {
            api,
            session,
            create: Workflow::new(),
        }
    }

    pub const fn create_workflow(&self) -> &Workflow {
        &self.create
    }

    /// The id the console currently acts as.
    pub fn status(&self) -> Option<String> {
        self.session.current_user()
    }

    /// Register a new account and connect to it.
    pub async fn create(&mut self) -> Phase {
        if self.session.current_user().is_some() {
            self.create.reject(ValidationError::AlreadyConnected);
            return self.create.phase();
        }
        if self.create.begin_action().is_err() {
            return self.create.phase();
        }
        match self.api.create_user().await {
            Ok(user) => {
                self.session.connect(&user.id);
                self.create.succeed(Notification::success(
                    "Success",
                    format!("Account {} created.", user.id),
                ));
            }
            Err(e) => self.create.fail(
                "Failed to create the account",
                "Could not reach the server. Please try again.",
                &e,
            ),
        }
        self.create.phase()
    }

    /// Forget the account locally. Returns the id that was dropped.
    pub fn disconnect(&self) -> Option<String> {
        let previous = self.session.current_user();
        self.session.disconnect();
        previous
    }
}
