//! Single-campaign screen: inspect, toggle, and distribute points scoped to it.

use tracing::error;

use absinthe_client::{ApiError, ConsoleApi, PointsConnector};
use absinthe_core::SessionHandle;
use absinthe_core::models::{Campaign, CampaignId};

use super::campaigns::toggle_campaign;
use super::points::PointsScreen;
use crate::app::{Phase, ValidationError, Workflow};

pub struct CampaignDetailScreen<'a, A, C> {
    api: &'a A,
    session: SessionHandle,
    id: CampaignId,
    campaign: Option<Campaign>,
    toggle: Workflow,
    /// Points form with the campaign id pinned to this campaign.
    pub points: PointsScreen<C>,
}

impl<'a, A: ConsoleApi, C: PointsConnector> CampaignDetailScreen<'a, A, C> {
    pub fn new(api: &'a A, session: SessionHandle, connector: C, id: CampaignId) -> Self {
        let mut points = PointsScreen::new(connector);
        points.form.campaign_id = id.to_string();
        Self {
            api,
            session,
            id,
            campaign: None,
            toggle: Workflow::new(),
            points,
        }
    }

    pub const fn campaign(&self) -> Option<&Campaign> {
        self.campaign.as_ref()
    }

    pub const fn toggle_workflow(&self) -> &Workflow {
        &self.toggle
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.api.find_campaign(self.id).await {
            Ok(campaign) => {
                self.campaign = Some(campaign);
                Ok(())
            }
            Err(e) => {
                error!(id = self.id, error = %e, "Failed to fetch campaign");
                Err(e)
            }
        }
    }

    pub async fn toggle(&mut self) -> Phase {
        let user_id = self.session.current_user();
        let Some(campaign) = self.campaign.as_mut() else {
            self.toggle.reject(ValidationError::UnknownCampaign(self.id));
            return self.toggle.phase();
        };
        toggle_campaign(self.api, &mut self.toggle, user_id, campaign).await
    }

    /// Distribute points on this campaign.
    pub async fn distribute(&mut self) -> Phase {
        self.points.form.campaign_id = self.id.to_string();
        self.points.distribute().await
    }
}
