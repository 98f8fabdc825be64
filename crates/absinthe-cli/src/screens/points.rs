//! Points screen: distribute points and search past records.
//!
//! The points client is opaque here: a fresh one is connected for every
//! submission, scoped to the API key and campaign typed into the form.

use absinthe_client::{PointsApi, PointsConnector};
use absinthe_core::models::{CampaignId, PointRecord, PointsData};

use crate::app::{Form, Notification, Phase, ValidationError, Workflow, require};

/// Channel every console distribution is sent on.
pub const POINTS_CHANNEL: &str = "points";

/// Points distribution form.
#[derive(Debug, Clone, Default)]
pub struct PointsForm {
    pub campaign_id: String,
    pub api_key: String,
    pub address: String,
    pub points: String,
    pub event_name: String,
    /// Free-text JSON, optional.
    pub metadata: String,
}

/// Validated distribution request.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub campaign_id: CampaignId,
    pub api_key: String,
    pub data: PointsData,
}

fn parse_campaign_id(value: &str) -> Result<CampaignId, ValidationError> {
    let value = require("Campaign ID", value)?;
    value.parse().map_err(|_| ValidationError::Number {
        field: "Campaign ID",
        value: value.to_string(),
    })
}

impl Form for PointsForm {
    type Submission = Distribution;

    fn validate(&self) -> Result<Distribution, ValidationError> {
        let campaign_id = parse_campaign_id(&self.campaign_id)?;
        let api_key = require("API key", &self.api_key)?.to_string();
        let address = require("Address", &self.address)?.to_string();
        let points_raw = require("Points", &self.points)?;
        let event_name = require("Event name", &self.event_name)?.to_string();

        let points = points_raw
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| ValidationError::Number {
                field: "Points",
                value: points_raw.to_string(),
            })?;

        let metadata = match self.metadata.trim() {
            "" => None,
            text => Some(
                serde_json::from_str(text)
                    .map_err(|e| ValidationError::Metadata(e.to_string()))?,
            ),
        };

        Ok(Distribution {
            campaign_id,
            api_key,
            data: PointsData {
                points,
                address,
                event_name,
                metadata,
            },
        })
    }

    /// Keeps campaign and key so the operator can keep distributing.
    fn reset(&mut self) {
        self.address.clear();
        self.points.clear();
        self.event_name.clear();
        self.metadata.clear();
    }
}

/// Points search form.
#[derive(Debug, Clone, Default)]
pub struct PointsSearchForm {
    pub campaign_id: String,
    pub api_key: String,
    pub address: String,
    /// Optional event filter.
    pub event_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsQuery {
    pub campaign_id: CampaignId,
    pub api_key: String,
    pub address: String,
    pub event_name: Option<String>,
}

impl Form for PointsSearchForm {
    type Submission = PointsQuery;

    fn validate(&self) -> Result<PointsQuery, ValidationError> {
        Ok(PointsQuery {
            campaign_id: parse_campaign_id(&self.campaign_id)?,
            api_key: require("API key", &self.api_key)?.to_string(),
            address: require("Address", &self.address)?.to_string(),
            event_name: Some(self.event_name.trim())
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        })
    }

    fn reset(&mut self) {}
}

/// Distribute and look up points for any campaign.
pub struct PointsScreen<C> {
    connector: C,
    pub form: PointsForm,
    pub search_form: PointsSearchForm,
    distribute: Workflow,
    search: Workflow,
    records: Vec<PointRecord>,
}

impl<C: PointsConnector> PointsScreen<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            form: PointsForm::default(),
            search_form: PointsSearchForm::default(),
            distribute: Workflow::new(),
            search: Workflow::new(),
            records: Vec::new(),
        }
    }

    pub const fn distribute_workflow(&self) -> &Workflow {
        &self.distribute
    }

    pub const fn search_workflow(&self) -> &Workflow {
        &self.search
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    /// Submit the distribution form.
    pub async fn distribute(&mut self) -> Phase {
        let Ok(submission) = self.distribute.begin(&self.form) else {
            return self.distribute.phase();
        };
        let result = match self
            .connector
            .connect(&submission.api_key, submission.campaign_id)
        {
            Ok(client) => client.distribute(POINTS_CHANNEL, &submission.data).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => {
                self.form.reset();
                self.distribute
                    .succeed(Notification::success("Success", "Points successfully added!"));
            }
            Err(e) => self.distribute.fail(
                "Error",
                "Failed to add points. Please try again.",
                &e,
            ),
        }
        self.distribute.phase()
    }

    /// Submit the search form, replacing the shown records on success.
    pub async fn search(&mut self) -> Phase {
        let Ok(query) = self.search.begin(&self.search_form) else {
            return self.search.phase();
        };
        let result = match self.connector.connect(&query.api_key, query.campaign_id) {
            Ok(client) => {
                client
                    .get_points(&query.address, query.event_name.as_deref())
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(records) => {
                let message = format!("Found {} point record(s).", records.len());
                self.records = records;
                self.search.succeed(Notification::success("Success", message));
            }
            Err(e) => self.search.fail(
                "Error",
                "Failed to fetch points. Please try again.",
                &e,
            ),
        }
        self.search.phase()
    }
}
