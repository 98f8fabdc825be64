//! In-memory fakes for screen tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use absinthe_client::{ApiError, ConsoleApi, PointsApi, PointsConnector, PointsError};
use absinthe_core::models::{
    Campaign, CampaignId, CampaignStatus, CreateCampaign, CreateKey, CreateKeyResponse, Key,
    PointRecord, PointsData, Role, SubscriptionTier, UpdateCampaign, User,
};
use absinthe_core::{MemoryIdentityStore, SessionContext};

pub fn connected_session(user_id: &str) -> SessionContext {
    let ctx = SessionContext::hydrate(Arc::new(MemoryIdentityStore::new()));
    ctx.connect(user_id);
    ctx
}

pub fn disconnected_session() -> SessionContext {
    SessionContext::hydrate(Arc::new(MemoryIdentityStore::new()))
}

pub fn campaign(id: CampaignId, name: &str, status: CampaignStatus) -> Campaign {
    let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    Campaign {
        id,
        name: name.into(),
        created_at: t,
        start_date: t,
        end_date: None,
        status,
    }
}

/// Backend fake that records every call and can be told to fail.
#[derive(Default)]
pub struct FakeApi {
    pub calls: RefCell<Vec<String>>,
    pub campaigns: RefCell<Vec<Campaign>>,
    pub keys: RefCell<Vec<Key>>,
    /// When set, every call fails with this status and optional server message.
    pub fail_with: RefCell<Option<(u16, Option<String>)>>,
    /// Restricts `fail_with` to calls whose log line starts with this prefix.
    pub fail_only: RefCell<Option<String>>,
    next_id: Cell<CampaignId>,
}

impl FakeApi {
    pub fn with_campaigns(campaigns: Vec<Campaign>) -> Self {
        let next = campaigns.iter().map(|c| c.id).max().unwrap_or(0);
        let api = Self::default();
        *api.campaigns.borrow_mut() = campaigns;
        api.next_id.set(next);
        api
    }

    pub fn fail(&self, status: u16, message: Option<&str>) {
        *self.fail_with.borrow_mut() = Some((status, message.map(str::to_string)));
    }

    /// Fail only the calls whose log line starts with `prefix`.
    pub fn fail_calls(&self, prefix: &str, status: u16, message: Option<&str>) {
        *self.fail_only.borrow_mut() = Some(prefix.to_string());
        self.fail(status, message);
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn call(&self, line: String) -> Result<(), ApiError> {
        let targeted = self
            .fail_only
            .borrow()
            .as_deref()
            .is_none_or(|prefix| line.starts_with(prefix));
        self.calls.borrow_mut().push(line);
        if !targeted {
            return Ok(());
        }
        match self.fail_with.borrow().clone() {
            Some((status, Some(message))) => Err(ApiError::Api { status, message }),
            Some((status, None)) => Err(ApiError::Status {
                status,
                reason: "Internal Server Error".into(),
            }),
            None => Ok(()),
        }
    }
}

impl ConsoleApi for FakeApi {
    async fn create_user(&self) -> Result<User, ApiError> {
        self.call("create_user".into())?;
        Ok(User {
            id: "u-new".into(),
            created_at: Utc::now(),
            role: Role::User,
            tier: SubscriptionTier::Free,
            campaigns: Vec::new(),
            keys: Vec::new(),
        })
    }

    async fn create_campaign(&self, body: &CreateCampaign) -> Result<Campaign, ApiError> {
        self.call(format!("create_campaign {} {}", body.name, body.user_id))?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let mut created = campaign(id, &body.name, CampaignStatus::Off);
        created.start_date = body.start_date;
        created.end_date = body.end_date;
        self.campaigns.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn find_campaigns(&self, user_id: &str) -> Result<Vec<Campaign>, ApiError> {
        self.call(format!("find_campaigns {user_id}"))?;
        Ok(self.campaigns.borrow().clone())
    }

    async fn find_campaign(&self, id: CampaignId) -> Result<Campaign, ApiError> {
        self.call(format!("find_campaign {id}"))?;
        self.campaigns
            .borrow()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: "Campaign not found".into(),
            })
    }

    async fn update_campaign(
        &self,
        id: CampaignId,
        update: &UpdateCampaign,
    ) -> Result<Campaign, ApiError> {
        self.call(format!("update_campaign {id} {}", update.user_id))?;
        let mut campaigns = self.campaigns.borrow_mut();
        let c = campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: "Campaign not found".into(),
            })?;
        if let Some(status) = update.status {
            c.status = status;
        }
        if let Some(name) = &update.name {
            c.name.clone_from(name);
        }
        if let Some(start) = update.start_date {
            c.start_date = start;
        }
        if update.end_date.is_some() {
            c.end_date = update.end_date;
        }
        Ok(c.clone())
    }

    async fn create_key(&self, key: &CreateKey) -> Result<CreateKeyResponse, ApiError> {
        self.call(format!(
            "create_key {} {:?} {:?}",
            key.user_id, key.permissions, key.campaign_id
        ))?;
        let n = self.keys.borrow().len() + 1;
        self.keys.borrow_mut().push(Key {
            id: format!("k{n}"),
            hashed_key: format!("hash{n}"),
            created_at: Utc::now(),
            end_date: key.end_date,
            permissions: key.permissions.clone(),
            user: None,
            campaign: None,
        });
        Ok(CreateKeyResponse {
            api_key: format!("abs_secret_{n}"),
        })
    }

    async fn find_keys(
        &self,
        user_id: Option<&str>,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<Key>, ApiError> {
        self.call(format!("find_keys {user_id:?} {campaign_id:?}"))?;
        Ok(self.keys.borrow().clone())
    }
}

/// Points fake: every connect and call is appended to `log`.
#[derive(Clone, Default)]
pub struct FakePoints {
    pub log: Rc<RefCell<Vec<String>>>,
    /// When set, every points call is rejected with this server message.
    pub reject_with: Option<String>,
    pub records: Vec<PointRecord>,
}

impl FakePoints {
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

pub struct FakePointsClient {
    source: FakePoints,
}

impl PointsConnector for FakePoints {
    type Client = FakePointsClient;

    fn connect(&self, api_key: &str, campaign_id: CampaignId) -> Result<FakePointsClient, PointsError> {
        self.log
            .borrow_mut()
            .push(format!("connect {api_key} {campaign_id}"));
        Ok(FakePointsClient {
            source: self.clone(),
        })
    }
}

impl PointsApi for FakePointsClient {
    async fn distribute(
        &self,
        event_name: &str,
        data: &PointsData,
    ) -> Result<serde_json::Value, PointsError> {
        self.source.log.borrow_mut().push(format!(
            "distribute {event_name} {} {} {} {:?}",
            data.address, data.points, data.event_name, data.metadata
        ));
        if let Some(message) = &self.source.reject_with {
            return Err(PointsError::Rejected {
                status: 401,
                message: message.clone(),
            });
        }
        Ok(serde_json::json!({"ok": true}))
    }

    async fn get_points(
        &self,
        address: &str,
        event_name: Option<&str>,
    ) -> Result<Vec<PointRecord>, PointsError> {
        self.source
            .log
            .borrow_mut()
            .push(format!("get_points {address} {event_name:?}"));
        if let Some(message) = &self.source.reject_with {
            return Err(PointsError::Rejected {
                status: 401,
                message: message.clone(),
            });
        }
        Ok(self.source.records.clone())
    }
}
