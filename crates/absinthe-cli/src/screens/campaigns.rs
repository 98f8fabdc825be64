//! Campaigns screen: list, create, toggle and update.

use tracing::{debug, error};

use absinthe_client::{ApiError, ConsoleApi};
use absinthe_core::SessionHandle;
use absinthe_core::models::{Campaign, CampaignId, CampaignStatus, CreateCampaign, UpdateCampaign};
use chrono::{DateTime, Utc};

use crate::app::{Form, Notification, Phase, ValidationError, Workflow, parse_date, require};

/// Campaign creation form.
#[derive(Debug, Clone, Default)]
pub struct CampaignForm {
    pub name: String,
    /// Optional, defaults to now.
    pub start_date: String,
    pub end_date: String,
}

/// Validated campaign creation fields.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Form for CampaignForm {
    type Submission = NewCampaign;

    fn validate(&self) -> Result<NewCampaign, ValidationError> {
        let name = require("Campaign name", &self.name)?.to_string();
        let start_date = parse_date("Start date", &self.start_date)?.unwrap_or_else(Utc::now);
        let end_date = parse_date("End date", &self.end_date)?;
        Ok(NewCampaign {
            name,
            start_date,
            end_date,
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Campaign update form. Blank fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CampaignUpdateForm {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

/// Validated update fields, without the owner id.
#[derive(Debug, Clone, Default)]
pub struct CampaignChanges {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<CampaignStatus>,
}

impl Form for CampaignUpdateForm {
    type Submission = CampaignChanges;

    fn validate(&self) -> Result<CampaignChanges, ValidationError> {
        let name = Some(self.name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let status = match self.status.trim() {
            "" => None,
            s => match s.parse::<CampaignStatus>() {
                Ok(CampaignStatus::Completed) | Err(_) => {
                    return Err(ValidationError::Status(s.to_string()));
                }
                Ok(status) => Some(status),
            },
        };
        let changes = CampaignChanges {
            name,
            start_date: parse_date("Start date", &self.start_date)?,
            end_date: parse_date("End date", &self.end_date)?,
            status,
        };
        if changes.name.is_none()
            && changes.start_date.is_none()
            && changes.end_date.is_none()
            && changes.status.is_none()
        {
            return Err(ValidationError::NothingToUpdate);
        }
        Ok(changes)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Flip `campaign` between ON and OFF on the server, then locally.
pub(crate) async fn toggle_campaign<A: ConsoleApi>(
    api: &A,
    workflow: &mut Workflow,
    user_id: Option<String>,
    campaign: &mut Campaign,
) -> Phase {
    let Some(user_id) = user_id else {
        workflow.reject(ValidationError::NotConnected);
        return workflow.phase();
    };
    let Some(next) = campaign.status.toggled() else {
        workflow.reject(ValidationError::Completed {
            name: campaign.name.clone(),
        });
        return workflow.phase();
    };
    if workflow.begin_action().is_err() {
        return workflow.phase();
    }
    match api
        .update_campaign(campaign.id, &UpdateCampaign::status(user_id, next))
        .await
    {
        Ok(_) => {
            campaign.status = next;
            workflow.succeed(Notification::success(
                "Success",
                format!("Campaign {} turned {}.", campaign.name, next),
            ));
        }
        Err(e) => workflow.fail(
            "Failed to update campaign status",
            "Could not reach the server. Please try again.",
            &e,
        ),
    }
    workflow.phase()
}

/// Campaigns owned by the current account.
pub struct CampaignsScreen<'a, A> {
    api: &'a A,
    session: SessionHandle,
    campaigns: Vec<Campaign>,
    pub form: CampaignForm,
    pub update_form: CampaignUpdateForm,
    create: Workflow,
    toggle: Workflow,
    update: Workflow,
}

impl<'a, A: ConsoleApi> CampaignsScreen<'a, A> {
    pub fn new(api: &'a A, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            campaigns: Vec::new(),
            form: CampaignForm::default(),
            update_form: CampaignUpdateForm::default(),
            create: Workflow::new(),
            toggle: Workflow::new(),
            update: Workflow::new(),
        }
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub const fn create_workflow(&self) -> &Workflow {
        &self.create
    }

    pub const fn toggle_workflow(&self) -> &Workflow {
        &self.toggle
    }

    pub const fn update_workflow(&self) -> &Workflow {
        &self.update
    }

    /// Reload the list. Disconnected sessions see an empty list.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let Some(user_id) = self.session.current_user() else {
            self.campaigns.clear();
            return Ok(());
        };
        match self.api.find_campaigns(&user_id).await {
            Ok(campaigns) => {
                debug!(count = campaigns.len(), "Fetched campaigns");
                self.campaigns = campaigns;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch campaigns");
                Err(e)
            }
        }
    }

    /// Create a campaign from the form and append it to the list.
    pub async fn create(&mut self) -> Phase {
        let Some(user_id) = self.session.current_user() else {
            self.create.reject(ValidationError::NotConnected);
            return self.create.phase();
        };
        let Ok(new) = self.create.begin(&self.form) else {
            return self.create.phase();
        };
        let body = CreateCampaign {
            name: new.name,
            user_id,
            start_date: new.start_date,
            end_date: new.end_date,
        };
        match self.api.create_campaign(&body).await {
            Ok(campaign) => {
                self.campaigns.push(campaign);
                self.form.reset();
                self.create.succeed(Notification::success(
                    "Success",
                    "Campaign successfully created!",
                ));
            }
            Err(e) => self.create.fail(
                "Failed to create the campaign",
                "Could not reach the server. Please try again.",
                &e,
            ),
        }
        self.create.phase()
    }

    /// Turn a listed campaign ON or OFF.
    pub async fn toggle(&mut self, id: CampaignId) -> Phase {
        let user_id = self.session.current_user();
        let Some(campaign) = self.campaigns.iter_mut().find(|c| c.id == id) else {
            self.toggle.reject(ValidationError::UnknownCampaign(id));
            return self.toggle.phase();
        };
        toggle_campaign(self.api, &mut self.toggle, user_id, campaign).await
    }

    /// Apply the update form to a listed campaign.
    pub async fn update(&mut self, id: CampaignId) -> Phase {
        let Some(user_id) = self.session.current_user() else {
            self.update.reject(ValidationError::NotConnected);
            return self.update.phase();
        };
        let Some(current) = self.campaigns.iter().find(|c| c.id == id) else {
            self.update.reject(ValidationError::UnknownCampaign(id));
            return self.update.phase();
        };
        // Completed campaigns keep their status; other fields stay editable.
        if current.status == CampaignStatus::Completed && !self.update_form.status.trim().is_empty()
        {
            self.update.reject(ValidationError::Completed {
                name: current.name.clone(),
            });
            return self.update.phase();
        }
        let Ok(changes) = self.update.begin(&self.update_form) else {
            return self.update.phase();
        };
        let body = UpdateCampaign {
            user_id,
            name: changes.name,
            start_date: changes.start_date,
            end_date: changes.end_date,
            status: changes.status,
        };
        match self.api.update_campaign(id, &body).await {
            Ok(updated) => {
                if let Some(c) = self.campaigns.iter_mut().find(|c| c.id == id) {
                    *c = updated;
                }
                self.update_form.reset();
                self.update.succeed(Notification::success(
                    "Success",
                    format!("Campaign {id} updated."),
                ));
            }
            Err(e) => self.update.fail(
                "Failed to update the campaign",
                "Could not reach the server. Please try again.",
                &e,
            ),
        }
        self.update.phase()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::screens::test_support::{FakeApi, campaign, connected_session, disconnected_session};

    #[tokio::test]
    async fn refresh_loads_campaigns_for_user() {
        let api = FakeApi::with_campaigns(vec![campaign(1, "Launch", CampaignStatus::On)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());

        screen.refresh().await.unwrap();
        assert_eq!(screen.campaigns().len(), 1);
        assert_eq!(api.calls.borrow().as_slice(), ["find_campaigns u1"]);
    }

    #[tokio::test]
    async fn refresh_while_disconnected_skips_the_network() {
        let api = FakeApi::with_campaigns(vec![campaign(1, "Launch", CampaignStatus::On)]);
        let session = disconnected_session();
        let mut screen = CampaignsScreen::new(&api, session.handle());

        screen.refresh().await.unwrap();
        assert!(screen.campaigns().is_empty());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn create_appends_one_off_campaign_without_refetch() {
        let api = FakeApi::default();
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.form.name = "Launch".into();

        assert_eq!(screen.create().await, Phase::Succeeded);

        assert_eq!(screen.campaigns().len(), 1);
        let created = &screen.campaigns()[0];
        assert_eq!(created.name, "Launch");
        assert_eq!(created.status, CampaignStatus::Off);
        assert!(created.id > 0);
        assert!(created.end_date.is_none());
        assert!(screen.form.name.is_empty());
        assert_eq!(api.calls.borrow().as_slice(), ["create_campaign Launch u1"]);
        assert_eq!(
            screen.create_workflow().notification().unwrap().message,
            "Campaign successfully created!"
        );
    }

    #[tokio::test]
    async fn create_with_blank_name_is_blocked() {
        let api = FakeApi::default();
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.form.name = "   ".into();

        assert!(!screen.create_workflow().can_submit(&screen.form));
        assert_eq!(screen.create().await, Phase::Idle);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn create_while_disconnected_is_blocked() {
        let api = FakeApi::default();
        let session = disconnected_session();
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.form.name = "Launch".into();

        screen.create().await;
        assert_eq!(api.call_count(), 0);
        assert!(screen.create_workflow().notification().unwrap().is_error());
    }

    #[tokio::test]
    async fn failed_create_keeps_form_and_shows_server_message() {
        let api = FakeApi::default();
        api.fail(400, Some("name must be unique"));
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.form.name = "Launch".into();
        screen.form.end_date = "2026-12-31".into();

        assert_eq!(screen.create().await, Phase::Failed);
        assert!(screen.campaigns().is_empty());
        assert_eq!(screen.form.name, "Launch");
        assert_eq!(screen.form.end_date, "2026-12-31");
        let n = screen.create_workflow().notification().unwrap();
        assert_eq!(n.title, "Failed to create the campaign");
        assert_eq!(n.message, "name must be unique");
    }

    #[tokio::test]
    async fn toggling_twice_restores_status() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Drop", CampaignStatus::Off)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();

        assert_eq!(screen.toggle(4).await, Phase::Succeeded);
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::On);
        assert_eq!(
            screen.toggle_workflow().notification().unwrap().message,
            "Campaign Drop turned ON."
        );

        assert_eq!(screen.toggle(4).await, Phase::Succeeded);
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::Off);
    }

    #[tokio::test]
    async fn failed_toggle_leaves_status_unchanged() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Drop", CampaignStatus::On)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();
        api.fail(500, None);

        assert_eq!(screen.toggle(4).await, Phase::Failed);
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::On);
        assert_eq!(
            screen.toggle_workflow().notification().unwrap().message,
            "Could not reach the server. Please try again."
        );
    }

    #[tokio::test]
    async fn completed_campaign_cannot_be_toggled() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Done", CampaignStatus::Completed)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();
        let before = api.call_count();

        screen.toggle(4).await;
        assert_eq!(api.call_count(), before);
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn completed_campaign_cannot_be_reopened_through_update() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Done", CampaignStatus::Completed)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();
        let before = api.call_count();
        screen.update_form.status = "on".into();

        assert_eq!(screen.update(4).await, Phase::Idle);
        assert_eq!(api.call_count(), before);
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::Completed);
        assert_eq!(
            screen.update_workflow().notification().unwrap().message,
            "Campaign Done is completed and cannot be turned on or off"
        );
        assert_eq!(screen.update_form.status, "on");
    }

    #[tokio::test]
    async fn completed_campaign_can_still_be_renamed() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Done", CampaignStatus::Completed)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();
        screen.update_form.name = "Finished".into();

        assert_eq!(screen.update(4).await, Phase::Succeeded);
        assert_eq!(screen.campaigns()[0].name, "Finished");
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn update_applies_server_response() {
        let api = FakeApi::with_campaigns(vec![campaign(4, "Drop", CampaignStatus::Off)]);
        let session = connected_session("u1");
        let mut screen = CampaignsScreen::new(&api, session.handle());
        screen.refresh().await.unwrap();
        screen.update_form.name = "Airdrop".into();
        screen.update_form.status = "on".into();

        assert_eq!(screen.update(4).await, Phase::Succeeded);
        assert_eq!(screen.campaigns()[0].name, "Airdrop");
        assert_eq!(screen.campaigns()[0].status, CampaignStatus::On);
        assert!(screen.update_form.name.is_empty());
    }

    #[test]
    fn update_form_rejects_completed_and_empty() {
        let form = CampaignUpdateForm {
            status: "COMPLETED".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::Status("COMPLETED".into())
        );
        assert_eq!(
            CampaignUpdateForm::default().validate().unwrap_err(),
            ValidationError::NothingToUpdate
        );
    }

    #[test]
    fn blank_start_date_defaults_to_now() {
        let form = CampaignForm {
            name: "Launch".into(),
            ..Default::default()
        };
        let before = Utc::now();
        let new = form.validate().unwrap();
        assert!(new.start_date >= before);
        assert!(new.end_date.is_none());
    }
}
