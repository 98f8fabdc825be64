//! Account subcommands: create, disconnect, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use absinthe_client::ConsoleApi;
use absinthe_core::SessionContext;

use crate::Outcome;
use crate::screens::AccountScreen;

/// Account subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AccountAction {
    /// Create an anonymous account and act as it.
    Create,
    /// Forget the current account on this machine.
    Disconnect,
    /// Show which account the console acts as.
    Status,
}

/// Execute an account subcommand.
pub async fn run<A: ConsoleApi>(
    api: &A,
    session: &SessionContext,
    action: AccountAction,
) -> anyhow::Result<Outcome> {
    let mut out = io::stdout();
    let mut screen = AccountScreen::new(api, session);
    match action {
        AccountAction::Create => {
            screen.create().await;
            Ok(Outcome::report(&mut out, screen.create_workflow())?)
        }
        AccountAction::Disconnect => {
            match screen.disconnect() {
                Some(id) => writeln!(out, "Disconnected from account {id}")?,
                None => writeln!(out, "No account connected")?,
            }
            Ok(Outcome::Done)
        }
        AccountAction::Status => {
            match screen.status() {
                Some(id) => writeln!(out, "Connected as: {id}")?,
                None => writeln!(out, "Not connected")?,
            }
            Ok(Outcome::Done)
        }
    }
}
