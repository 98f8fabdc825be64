//! Points subcommands: distribute, search.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io;

use absinthe_client::PointsConnector;
use absinthe_core::models::CampaignId;

use crate::Outcome;
use crate::fmt::write_point_records;
use crate::screens::{PointsForm, PointsScreen, PointsSearchForm};

/// Points subcommand actions. Both act with an API key, not the session.
#[derive(clap::Subcommand, Debug)]
pub enum PointsAction {
    /// Add points to an address.
    Distribute {
        #[arg(short, long)]
        campaign: CampaignId,
        /// API key scoped to the campaign.
        #[arg(short = 'k', long = "api-key", env = "ABSINTHE_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Recipient address.
        #[arg(short, long)]
        address: String,
        /// Number of points.
        #[arg(short, long, allow_hyphen_values = true)]
        points: String,
        /// Event the points are credited for.
        #[arg(short, long)]
        event: String,
        /// Extra JSON attached to the event.
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Look up points of an address.
    Search {
        #[arg(short, long)]
        campaign: CampaignId,
        #[arg(short = 'k', long = "api-key", env = "ABSINTHE_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(short, long)]
        address: String,
        /// Only records for this event.
        #[arg(short, long)]
        event: Option<String>,
    },
}

/// Execute a points subcommand.
pub async fn run<C: PointsConnector>(connector: C, action: PointsAction) -> anyhow::Result<Outcome> {
    let mut out = io::stdout();
    let mut screen = PointsScreen::new(connector);
    match action {
        PointsAction::Distribute {
            campaign,
            api_key,
            address,
            points,
            event,
            metadata,
        } => {
            screen.form = PointsForm {
                campaign_id: campaign.to_string(),
                api_key,
                address,
                points,
                event_name: event,
                metadata: metadata.unwrap_or_default(),
            };
            screen.distribute().await;
            Ok(Outcome::report(&mut out, screen.distribute_workflow())?)
        }
        PointsAction::Search {
            campaign,
            api_key,
            address,
            event,
        } => {
            screen.search_form = PointsSearchForm {
                campaign_id: campaign.to_string(),
                api_key,
                address,
                event_name: event.unwrap_or_default(),
            };
            screen.search().await;
            let outcome = Outcome::report(&mut out, screen.search_workflow())?;
            if outcome == Outcome::Done {
                write_point_records(&mut out, screen.records())?;
            }
            Ok(outcome)
        }
    }
}
