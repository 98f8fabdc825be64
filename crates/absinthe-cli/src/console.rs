//! Interactive console.
//!
//! A prompt-driven menu over the screens. Every action settles into a
//! notification that is printed before the menu comes back; nothing here
//! ends the loop except the user choosing to quit or closing stdin.

use std::io::{self, Write};

use anyhow::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use absinthe_client::{ConsoleApi, PointsConnector};
use absinthe_core::SessionContext;
use absinthe_core::models::{CampaignId, KeyPermission};

use crate::Outcome;
use crate::fmt::{
    write_campaign_detail, write_campaign_table, write_fetch_error, write_key_table,
    write_point_records,
};
use crate::screens::{
    AccountScreen, CampaignDetailScreen, CampaignsScreen, KeysScreen, PointsForm, PointsScreen,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    CreateAccount,
    Campaigns,
    CampaignDetail,
    Keys,
    DistributePoints,
    SearchPoints,
    Disconnect,
    Quit,
}

impl MenuItem {
    const fn label(self) -> &'static str {
        match self {
            Self::CreateAccount => "Create account",
            Self::Campaigns => "Campaigns",
            Self::CampaignDetail => "Open a campaign",
            Self::Keys => "API keys",
            Self::DistributePoints => "Distribute points",
            Self::SearchPoints => "Search points",
            Self::Disconnect => "Disconnect",
            Self::Quit => "Quit",
        }
    }

    /// Campaign and key screens need an account; points only need an API key.
    fn available(connected: bool) -> Vec<Self> {
        if connected {
            vec![
                Self::Campaigns,
                Self::CampaignDetail,
                Self::Keys,
                Self::DistributePoints,
                Self::SearchPoints,
                Self::Disconnect,
                Self::Quit,
            ]
        } else {
            vec![
                Self::CreateAccount,
                Self::DistributePoints,
                Self::SearchPoints,
                Self::Quit,
            ]
        }
    }
}

/// Run the interactive console until the user quits.
pub async fn run<A, C>(api: &A, connector: C, session: &SessionContext) -> Result<()>
where
    A: ConsoleApi,
    C: PointsConnector + Clone,
{
    let mut out = io::stdout();
    // Kept for the whole console so campaign and key survive between distributions.
    let mut points = PointsScreen::new(connector.clone());

    loop {
        let user = session.current_user();
        match &user {
            Some(id) => writeln!(out, "\nConnected as {id}")?,
            None => writeln!(out, "\nNot connected")?,
        }
        let items = MenuItem::available(user.is_some());
        let labels: Vec<&str> = items.iter().map(|i| i.label()).collect();
        let choice = Select::new()
            .with_prompt("What do you want to do?")
            .items(&labels)
            .default(0)
            .interact_opt()?;
        let Some(item) = choice.and_then(|i| items.get(i).copied()) else {
            return Ok(());
        };

        match item {
            MenuItem::CreateAccount => {
                let mut screen = AccountScreen::new(api, session);
                screen.create().await;
                Outcome::report(&mut out, screen.create_workflow())?;
            }
            MenuItem::Disconnect => {
                let confirmed = Confirm::new()
                    .with_prompt("Forget this account on this machine?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    AccountScreen::new(api, session).disconnect();
                    writeln!(out, "Disconnected")?;
                }
            }
            MenuItem::Campaigns => campaigns_menu(api, session, &mut out).await?,
            MenuItem::CampaignDetail => {
                let id = ask_id("Campaign ID")?;
                campaign_menu(api, connector.clone(), session, id, &mut out).await?;
            }
            MenuItem::Keys => keys_menu(api, session, &mut out).await?,
            MenuItem::DistributePoints => {
                points.form.campaign_id = ask_default("Campaign ID", &points.form.campaign_id)?;
                points.form.api_key = ask_default("API key", &points.form.api_key)?;
                fill_distribution(&mut points.form)?;
                points.distribute().await;
                Outcome::report(&mut out, points.distribute_workflow())?;
            }
            MenuItem::SearchPoints => {
                let search = &mut points.search_form;
                search.campaign_id = ask_default("Campaign ID", &points.form.campaign_id)?;
                search.api_key = ask_default("API key", &points.form.api_key)?;
                search.address = ask("Address")?;
                search.event_name = ask_optional("Event name (blank for all)")?;
                points.search().await;
                if Outcome::report(&mut out, points.search_workflow())? == Outcome::Done {
                    write_point_records(&mut out, points.records())?;
                }
            }
            MenuItem::Quit => return Ok(()),
        }
    }
}

async fn campaigns_menu<A: ConsoleApi>(
    api: &A,
    session: &SessionContext,
    out: &mut impl Write,
) -> Result<()> {
    let mut screen = CampaignsScreen::new(api, session.handle());
    if let Err(e) = screen.refresh().await {
        write_fetch_error(out, "campaigns", &e)?;
        return Ok(());
    }
    loop {
        write_campaign_table(out, screen.campaigns())?;
        let actions = ["Create campaign", "Toggle campaign", "Update campaign", "Back"];
        let Some(action) = Select::new()
            .with_prompt("Campaigns")
            .items(&actions)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };
        match action {
            0 => {
                screen.form.name = ask("Campaign name")?;
                screen.form.start_date = ask_optional("Start date (YYYY-MM-DD, blank for now)")?;
                screen.form.end_date = ask_optional("End date (YYYY-MM-DD, optional)")?;
                screen.create().await;
                Outcome::report(out, screen.create_workflow())?;
            }
            1 => {
                if let Some(id) = pick_campaign(&screen)? {
                    screen.toggle(id).await;
                    Outcome::report(out, screen.toggle_workflow())?;
                }
            }
            2 => {
                if let Some(id) = pick_campaign(&screen)? {
                    let form = &mut screen.update_form;
                    form.name = ask_optional("New name (blank to keep)")?;
                    form.start_date = ask_optional("New start date (blank to keep)")?;
                    form.end_date = ask_optional("New end date (blank to keep)")?;
                    form.status = ask_optional("New status ON/OFF (blank to keep)")?;
                    screen.update(id).await;
                    Outcome::report(out, screen.update_workflow())?;
                }
            }
            _ => return Ok(()),
        }
    }
}

fn pick_campaign<A: ConsoleApi>(screen: &CampaignsScreen<'_, A>) -> Result<Option<CampaignId>> {
    let campaigns = screen.campaigns();
    if campaigns.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = campaigns
        .iter()
        .map(|c| format!("{} {} ({})", c.id, c.name, c.status))
        .collect();
    let choice = Select::new()
        .with_prompt("Campaign")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.and_then(|i| campaigns.get(i)).map(|c| c.id))
}

async fn campaign_menu<A, C>(
    api: &A,
    connector: C,
    session: &SessionContext,
    id: CampaignId,
    out: &mut impl Write,
) -> Result<()>
where
    A: ConsoleApi,
    C: PointsConnector,
{
    let mut screen = CampaignDetailScreen::new(api, session.handle(), connector, id);
    if let Err(e) = screen.load().await {
        write_fetch_error(out, "campaign", &e)?;
        return Ok(());
    }
    loop {
        if let Some(campaign) = screen.campaign() {
            write_campaign_detail(out, campaign)?;
        }
        let actions = ["Turn ON/OFF", "Distribute points", "Back"];
        let Some(action) = Select::new()
            .with_prompt(format!("Campaign {id}"))
            .items(&actions)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };
        match action {
            0 => {
                screen.toggle().await;
                Outcome::report(out, screen.toggle_workflow())?;
            }
            1 => {
                screen.points.form.api_key = ask_default("API key", &screen.points.form.api_key)?;
                fill_distribution(&mut screen.points.form)?;
                screen.distribute().await;
                Outcome::report(out, screen.points.distribute_workflow())?;
            }
            _ => return Ok(()),
        }
    }
}

async fn keys_menu<A: ConsoleApi>(
    api: &A,
    session: &SessionContext,
    out: &mut impl Write,
) -> Result<()> {
    let mut screen = KeysScreen::new(api, session.handle());
    if let Err(e) = screen.refresh().await {
        write_fetch_error(out, "keys", &e)?;
        return Ok(());
    }
    loop {
        write_key_table(out, screen.keys())?;
        let actions = ["Create API key", "Back"];
        let action = Select::new()
            .with_prompt("API keys")
            .items(&actions)
            .default(0)
            .interact_opt()?;
        if action != Some(0) {
            return Ok(());
        }

        let labels: Vec<&str> = KeyPermission::ALL.iter().map(|p| p.as_str()).collect();
        let defaults: Vec<bool> = KeyPermission::ALL
            .iter()
            .map(|p| screen.form.permissions().contains(p))
            .collect();
        let picked = MultiSelect::new()
            .with_prompt("Permissions (space to select)")
            .items(&labels)
            .defaults(&defaults)
            .interact()?;
        screen.form.set_permissions(
            picked
                .into_iter()
                .filter_map(|i| KeyPermission::ALL.get(i).copied()),
        );
        screen.form.end_date = ask_optional("Expiry date (YYYY-MM-DD, optional)")?;
        screen.form.campaign_id = ask_optional("Campaign ID (optional)")?;
        screen.create().await;
        Outcome::report(out, screen.create_workflow())?;
    }
}

fn fill_distribution(form: &mut PointsForm) -> Result<()> {
    form.address = ask("Address")?;
    form.points = ask("Points")?;
    form.event_name = ask("Event name")?;
    form.metadata = ask_optional("Metadata JSON (optional)")?;
    Ok(())
}

fn ask(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

fn ask_optional(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

fn ask_default(prompt: &str, current: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?)
}

fn ask_id(prompt: &str) -> Result<CampaignId> {
    Ok(Input::<CampaignId>::new().with_prompt(prompt).interact_text()?)
}
