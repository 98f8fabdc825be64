//! API key subcommands: list, create.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use absinthe_client::ConsoleApi;
use absinthe_core::SessionHandle;
use absinthe_core::models::{CampaignId, KeyPermission};

use crate::Outcome;
use crate::app::ValidationError;
use crate::fmt::{write_fetch_error, write_key_table};
use crate::screens::KeysScreen;

/// Key subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum KeyAction {
    /// List API keys of the current account.
    List {
        /// Only keys scoped to this campaign.
        #[arg(long)]
        campaign: Option<CampaignId>,
    },
    /// Mint an API key. The secret is printed once.
    Create {
        /// FULL, GET, POST, DELETE, PUT or PATCH. Repeatable. Defaults to FULL.
        #[arg(short, long = "permission", value_delimiter = ',')]
        permissions: Vec<KeyPermission>,
        /// Expiry date, YYYY-MM-DD or RFC 3339.
        #[arg(long)]
        end: Option<String>,
        /// Scope the key to one campaign.
        #[arg(long)]
        campaign: Option<CampaignId>,
    },
}

/// Execute a key subcommand.
pub async fn run<A: ConsoleApi>(
    api: &A,
    session: SessionHandle,
    action: KeyAction,
) -> anyhow::Result<Outcome> {
    let mut out = io::stdout();
    let mut screen = KeysScreen::new(api, session);
    if !screen.is_available() {
        return Ok(Outcome::rejected(&mut out, &ValidationError::NotConnected)?);
    }
    match action {
        KeyAction::List { campaign } => {
            screen.campaign_filter = campaign;
            if let Err(e) = screen.refresh().await {
                write_fetch_error(&mut out, "keys", &e)?;
                return Ok(Outcome::Failed);
            }
            write_key_table(&mut out, screen.keys())?;
            Ok(Outcome::Done)
        }
        KeyAction::Create {
            permissions,
            end,
            campaign,
        } => {
            if !permissions.is_empty() {
                screen.form.set_permissions(permissions);
            }
            screen.form.end_date = end.unwrap_or_default();
            screen.form.campaign_id = campaign.map(|id| id.to_string()).unwrap_or_default();
            screen.create().await;
            Ok(Outcome::report(&mut out, screen.create_workflow())?)
        }
    }
}
