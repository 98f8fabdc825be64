//! Points service client.
//!
//! A client is scoped to one API key and one campaign. Screens only see the
//! [`PointsApi`] and [`PointsConnector`] traits and display whatever error
//! comes back.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use absinthe_core::models::{CampaignId, PointRecord, PointsData};

use crate::error::{UserMessage, extract_message};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Points service errors.
#[derive(Debug, Error)]
pub enum PointsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Points service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Points service error ({status}): {reason}")]
    Status { status: u16, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl UserMessage for PointsError {
    fn server_message(&self) -> Option<String> {
        match self {
            Self::Rejected { message, .. } => Some(message.clone()),
            _ => None,
        }
    }
}

/// Points distribution and lookup for one campaign.
pub trait PointsApi {
    /// Record `data` on the `event_name` channel.
    fn distribute(
        &self,
        event_name: &str,
        data: &PointsData,
    ) -> impl Future<Output = Result<serde_json::Value, PointsError>>;

    /// Past point records for `address`, optionally filtered by event name.
    fn get_points(
        &self,
        address: &str,
        event_name: Option<&str>,
    ) -> impl Future<Output = Result<Vec<PointRecord>, PointsError>>;
}

/// Builds points clients scoped to an API key and campaign.
pub trait PointsConnector {
    type Client: PointsApi;

    fn connect(&self, api_key: &str, campaign_id: CampaignId)
    -> Result<Self::Client, PointsError>;
}

/// Configuration for a single points client.
#[derive(Debug, Clone)]
pub struct PointsConfig {
    pub api_key: String,
    pub campaign_id: CampaignId,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// reqwest-backed [`PointsApi`].
#[derive(Debug, Clone)]
pub struct PointsClient {
    http: reqwest::Client,
    base_url: String,
    campaign_id: CampaignId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DistributeBody<'a> {
    campaign_id: CampaignId,
    #[serde(flatten)]
    data: &'a PointsData,
}

impl PointsClient {
    pub fn new(config: &PointsConfig) -> Result<Self, PointsError> {
        if config.base_url.trim().is_empty() {
            return Err(PointsError::Config("base_url is empty".into()));
        }
        if config.api_key.trim().is_empty() {
            return Err(PointsError::Config("api key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let key_val = HeaderValue::from_str(config.api_key.trim())
            .map_err(|_| PointsError::Config("Invalid api key format".into()))?;
        headers.insert(API_KEY_HEADER, key_val);

        // The `Err` case just means a provider was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            campaign_id: config.campaign_id,
        })
    }

    pub const fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    /// `{base}/{segment}`, with `segment` percent-encoded as a single path segment.
    pub(crate) fn url(&self, segment: &str) -> Result<Url, PointsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PointsError::Config(format!("Invalid points URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PointsError::Config(format!("Invalid points URL: {}", self.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PointsError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match extract_message(&body) {
            Some(message) => PointsError::Rejected {
                status: status.as_u16(),
                message,
            },
            None => PointsError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").into(),
            },
        })
    }
}

impl PointsApi for PointsClient {
    async fn distribute(
        &self,
        event_name: &str,
        data: &PointsData,
    ) -> Result<serde_json::Value, PointsError> {
        if event_name.trim().is_empty() {
            return Err(PointsError::Config("event name is empty".into()));
        }
        let url = self.url(event_name)?;
        debug!(%url, campaign_id = self.campaign_id, "POST");
        let body = DistributeBody {
            campaign_id: self.campaign_id,
            data,
        };
        let resp = Self::check(self.http.post(url).json(&body).send().await?).await?;
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    async fn get_points(
        &self,
        address: &str,
        event_name: Option<&str>,
    ) -> Result<Vec<PointRecord>, PointsError> {
        let mut url = self.url("points")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("campaignId", &self.campaign_id.to_string());
            query.append_pair("address", address);
            if let Some(event_name) = event_name {
                query.append_pair("eventName", event_name);
            }
        }
        debug!(%url, "GET");
        let resp = Self::check(self.http.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }
}

/// Connector producing [`PointsClient`]s against one points service.
#[derive(Debug, Clone)]
pub struct HttpPointsConnector {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl PointsConnector for HttpPointsConnector {
    type Client = PointsClient;

    fn connect(&self, api_key: &str, campaign_id: CampaignId) -> Result<PointsClient, PointsError> {
        PointsClient::new(&PointsConfig {
            api_key: api_key.to_string(),
            campaign_id,
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        })
    }
}
