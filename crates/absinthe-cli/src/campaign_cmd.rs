//! Campaign subcommands: list, get, create, toggle, update.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use absinthe_client::{ConsoleApi, PointsConnector};
use absinthe_core::SessionHandle;
use absinthe_core::models::CampaignId;

use crate::Outcome;
use crate::app::ValidationError;
use crate::fmt::{write_campaign_detail, write_campaign_table, write_fetch_error};
use crate::screens::{CampaignDetailScreen, CampaignForm, CampaignUpdateForm, CampaignsScreen};

/// Campaign subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum CampaignAction {
    /// List campaigns owned by the current account.
    List,
    /// Show a single campaign.
    Get {
        /// Campaign ID.
        id: CampaignId,
    },
    /// Create a campaign. It starts OFF.
    Create {
        /// Campaign name.
        #[arg(short, long)]
        name: String,
        /// Start date, YYYY-MM-DD or RFC 3339. Defaults to now.
        #[arg(long)]
        start: Option<String>,
        /// End date, YYYY-MM-DD or RFC 3339.
        #[arg(long)]
        end: Option<String>,
    },
    /// Turn a campaign ON or OFF.
    Toggle {
        /// Campaign ID.
        id: CampaignId,
    },
    /// Change a campaign's name, dates or status.
    Update {
        /// Campaign ID.
        id: CampaignId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// ON or OFF.
        #[arg(long)]
        status: Option<String>,
    },
}

/// Execute a campaign subcommand.
pub async fn run<A: ConsoleApi, C: PointsConnector>(
    api: &A,
    connector: C,
    session: SessionHandle,
    action: CampaignAction,
) -> anyhow::Result<Outcome> {
    let mut out = io::stdout();
    // Reading one campaign needs no account; everything else is per owner.
    if !session.is_connected() && !matches!(action, CampaignAction::Get { .. }) {
        return Ok(Outcome::rejected(&mut out, &ValidationError::NotConnected)?);
    }
    match action {
        CampaignAction::List => {
            let mut screen = CampaignsScreen::new(api, session);
            if let Err(e) = screen.refresh().await {
                write_fetch_error(&mut out, "campaigns", &e)?;
                return Ok(Outcome::Failed);
            }
            write_campaign_table(&mut out, screen.campaigns())?;
            Ok(Outcome::Done)
        }
        CampaignAction::Get { id } => {
            let mut screen = CampaignDetailScreen::new(api, session, connector, id);
            if let Err(e) = screen.load().await {
                write_fetch_error(&mut out, "campaign", &e)?;
                return Ok(Outcome::Failed);
            }
            if let Some(campaign) = screen.campaign() {
                write_campaign_detail(&mut out, campaign)?;
            }
            Ok(Outcome::Done)
        }
        CampaignAction::Create { name, start, end } => {
            let mut screen = CampaignsScreen::new(api, session);
            screen.form = CampaignForm {
                name,
                start_date: start.unwrap_or_default(),
                end_date: end.unwrap_or_default(),
            };
            screen.create().await;
            let outcome = Outcome::report(&mut out, screen.create_workflow())?;
            if let (Outcome::Done, Some(created)) = (outcome, screen.campaigns().last()) {
                write_campaign_detail(&mut out, created)?;
            }
            Ok(outcome)
        }
        CampaignAction::Toggle { id } => {
            let mut screen = CampaignDetailScreen::new(api, session, connector, id);
            if let Err(e) = screen.load().await {
                write_fetch_error(&mut out, "campaign", &e)?;
                return Ok(Outcome::Failed);
            }
            screen.toggle().await;
            Ok(Outcome::report(&mut out, screen.toggle_workflow())?)
        }
        CampaignAction::Update {
            id,
            name,
            start,
            end,
            status,
        } => {
            let mut screen = CampaignsScreen::new(api, session);
            if let Err(e) = screen.refresh().await {
                write_fetch_error(&mut out, "campaigns", &e)?;
                return Ok(Outcome::Failed);
            }
            screen.update_form = CampaignUpdateForm {
                name: name.unwrap_or_default(),
                start_date: start.unwrap_or_default(),
                end_date: end.unwrap_or_default(),
                status: status.unwrap_or_default(),
            };
            screen.update(id).await;
            let outcome = Outcome::report(&mut out, screen.update_workflow())?;
            let updated = screen.campaigns().iter().find(|c| c.id == id);
            if let (Outcome::Done, Some(updated)) = (outcome, updated) {
                write_campaign_detail(&mut out, updated)?;
            }
            Ok(outcome)
        }
    }
}
