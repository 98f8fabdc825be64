//! Campaign/key/user REST API client.
//!
//! Every operation is one bare request/response round trip: no retries, no
//! caching, no deduplication.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use absinthe_core::models::{
    Campaign, CampaignId, CreateCampaign, CreateKey, CreateKeyResponse, Key, UpdateCampaign, User,
};

use crate::error::{ApiError, error_from_response};

/// Configuration for connecting to the backend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., "<http://localhost:3000>").
    pub base_url: String,
    /// Per-request timeout. `None` keeps the reqwest default.
    pub timeout: Option<Duration>,
}

/// Backend operations used by the console screens.
pub trait ConsoleApi {
    fn create_user(&self) -> impl Future<Output = Result<User, ApiError>>;

    fn create_campaign(
        &self,
        campaign: &CreateCampaign,
    ) -> impl Future<Output = Result<Campaign, ApiError>>;

    fn find_campaigns(&self, user_id: &str)
    -> impl Future<Output = Result<Vec<Campaign>, ApiError>>;

    fn find_campaign(&self, id: CampaignId) -> impl Future<Output = Result<Campaign, ApiError>>;

    fn update_campaign(
        &self,
        id: CampaignId,
        update: &UpdateCampaign,
    ) -> impl Future<Output = Result<Campaign, ApiError>>;

    fn create_key(
        &self,
        key: &CreateKey,
    ) -> impl Future<Output = Result<CreateKeyResponse, ApiError>>;

    fn find_keys(
        &self,
        user_id: Option<&str>,
        campaign_id: Option<CampaignId>,
    ) -> impl Future<Output = Result<Vec<Key>, ApiError>>;
}

/// reqwest-backed [`ConsoleApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Build the URL for a given path.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::Config(format!("Invalid API URL: {e}")))
    }

    async fn send<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }
        Ok(resp.json().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.api_url(path)?;
        debug!(%url, "POST");
        Self::send(self.http.post(url).json(body)).await
    }
}

impl ConsoleApi for ApiClient {
    async fn create_user(&self) -> Result<User, ApiError> {
        let url = self.api_url("/users")?;
        debug!(%url, "POST");
        Self::send(self.http.post(url)).await
    }

    async fn create_campaign(&self, campaign: &CreateCampaign) -> Result<Campaign, ApiError> {
        self.post("/campaigns", campaign).await
    }

    async fn find_campaigns(&self, user_id: &str) -> Result<Vec<Campaign>, ApiError> {
        let mut url = self.api_url("/campaigns")?;
        url.query_pairs_mut().append_pair("userId", user_id);
        debug!(%url, "GET");
        Self::send(self.http.get(url)).await
    }

    async fn find_campaign(&self, id: CampaignId) -> Result<Campaign, ApiError> {
        let url = self.api_url(&format!("/campaigns/{id}"))?;
        debug!(%url, "GET");
        Self::send(self.http.get(url)).await
    }

    async fn update_campaign(
        &self,
        id: CampaignId,
        update: &UpdateCampaign,
    ) -> Result<Campaign, ApiError> {
        let url = self.api_url(&format!("/campaigns/{id}"))?;
        debug!(%url, "PATCH");
        Self::send(self.http.patch(url).json(update)).await
    }

    async fn create_key(&self, key: &CreateKey) -> Result<CreateKeyResponse, ApiError> {
        self.post("/keys", key).await
    }

    async fn find_keys(
        &self,
        user_id: Option<&str>,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<Key>, ApiError> {
        let mut url = self.api_url("/keys")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(user_id) = user_id {
                query.append_pair("userId", user_id);
            }
            if let Some(campaign_id) = campaign_id {
                query.append_pair("campaignId", &campaign_id.to_string());
            }
        }
        // An empty query still leaves a trailing '?'.
        if url.query() == Some("") {
            url.set_query(None);
        }
        debug!(%url, "GET");
        Self::send(self.http.get(url)).await
    }
}
