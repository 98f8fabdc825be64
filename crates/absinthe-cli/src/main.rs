//! Absinthe CLI
//!
//! Terminal console for the Absinthe campaign backend. Runs one subcommand
//! or, with `console`, an interactive menu.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use absinthe_cli::Outcome;
use absinthe_cli::account_cmd::{self, AccountAction};
use absinthe_cli::campaign_cmd::{self, CampaignAction};
use absinthe_cli::console;
use absinthe_cli::key_cmd::{self, KeyAction};
use absinthe_cli::points_cmd::{self, PointsAction};
use absinthe_client::{ApiClient, ApiConfig, HttpPointsConnector};
use absinthe_core::config::load_config;
use absinthe_core::tracing_init::{default_filter, init_tracing};
use absinthe_core::{FileIdentityStore, IdentityStore, MemoryIdentityStore, SessionContext};

#[derive(Parser, Debug)]
#[command(name = "absinthe")]
#[command(version, about = "Manage Absinthe campaigns, API keys and points", long_about = None)]
struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = "ABSINTHE_API_URL")]
    api_url: Option<String>,

    /// Points service base URL (defaults to the API URL)
    #[arg(long, global = true, env = "ABSINTHE_POINTS_URL")]
    points_url: Option<String>,

    /// Identity file holding the connected account id
    #[arg(long, global = true, env = "ABSINTHE_STORAGE_PATH")]
    storage: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Campaign management
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },
    /// API key management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Points distribution and lookup
    Points {
        #[command(subcommand)]
        action: PointsAction,
    },
    /// Interactive console
    Console,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(url) = cli.points_url {
        config.points_url = Some(url);
    }
    if let Some(path) = cli.storage {
        config.storage_path = Some(path);
    }

    init_tracing(&default_filter(&config.log_level), cli.log_json);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_url = %config.api_url,
        "Starting absinthe CLI"
    );

    let store: Arc<dyn IdentityStore> = match config.identity_path() {
        Some(path) => Arc::new(FileIdentityStore::new(path)),
        None => {
            warn!("No home directory; the connected account will not persist");
            Arc::new(MemoryIdentityStore::new())
        }
    };
    let session = SessionContext::hydrate(store);

    let timeout = config.request_timeout_secs.map(Duration::from_secs);
    let api = ApiClient::new(&ApiConfig {
        base_url: config.api_url.clone(),
        timeout,
    })?;
    let connector = HttpPointsConnector {
        base_url: config.points_base_url().to_string(),
        timeout,
    };

    let outcome = match cli.command {
        Command::Account { action } => account_cmd::run(&api, &session, action).await?,
        Command::Campaign { action } => {
            campaign_cmd::run(&api, connector, session.handle(), action).await?
        }
        Command::Key { action } => key_cmd::run(&api, session.handle(), action).await?,
        Command::Points { action } => points_cmd::run(connector, action).await?,
        Command::Console => {
            console::run(&api, connector, &session).await?;
            Outcome::Done
        }
    };

    Ok(match outcome {
        Outcome::Done => ExitCode::SUCCESS,
        Outcome::Failed => ExitCode::FAILURE,
    })
}
