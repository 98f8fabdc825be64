//! API keys screen: list and mint keys for the current account.

use tracing::{debug, error, warn};

use absinthe_client::{ApiError, ConsoleApi};
use absinthe_core::SessionHandle;
use absinthe_core::models::{CampaignId, CreateKey, Key, KeyPermission};
use chrono::{DateTime, Utc};

use crate::app::{Form, Notification, Phase, ValidationError, Workflow, parse_date, parse_optional_id};

/// Key creation form.
#[derive(Debug, Clone)]
pub struct KeyForm {
    pub end_date: String,
    pub campaign_id: String,
    permissions: Vec<KeyPermission>,
}

impl Default for KeyForm {
    fn default() -> Self {
        Self {
            end_date: String::new(),
            campaign_id: String::new(),
            permissions: vec![KeyPermission::Full],
        }
    }
}

impl KeyForm {
    pub fn permissions(&self) -> &[KeyPermission] {
        &self.permissions
    }

    /// Check or uncheck one permission box.
    pub fn toggle_permission(&mut self, permission: KeyPermission) {
        if let Some(pos) = self.permissions.iter().position(|p| *p == permission) {
            self.permissions.remove(pos);
        } else {
            self.permissions.push(permission);
        }
    }

    pub fn set_permissions(&mut self, permissions: impl IntoIterator<Item = KeyPermission>) {
        self.permissions.clear();
        for p in permissions {
            if !self.permissions.contains(&p) {
                self.permissions.push(p);
            }
        }
    }
}

/// Validated key request, without the owner id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKey {
    pub end_date: Option<DateTime<Utc>>,
    pub permissions: Vec<KeyPermission>,
    pub campaign_id: Option<CampaignId>,
}

impl Form for KeyForm {
    type Submission = NewKey;

    fn validate(&self) -> Result<NewKey, ValidationError> {
        if self.permissions.is_empty() {
            return Err(ValidationError::NoPermissions);
        }
        Ok(NewKey {
            end_date: parse_date("End date", &self.end_date)?,
            permissions: self.permissions.clone(),
            campaign_id: parse_optional_id("Campaign ID", &self.campaign_id)?,
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct KeysScreen<'a, A> {
    api: &'a A,
    session: SessionHandle,
    keys: Vec<Key>,
    /// Restricts the list to keys scoped to one campaign.
    pub campaign_filter: Option<CampaignId>,
    pub form: KeyForm,
    create: Workflow,
}

impl<'a, A: ConsoleApi> KeysScreen<'a, A> {
    pub fn new(api: &'a A, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            keys: Vec::new(),
            campaign_filter: None,
            form: KeyForm::default(),
            create: Workflow::new(),
        }
    }

    /// The keys screen is unusable without an account.
    pub fn is_available(&self) -> bool {
        self.session.is_connected()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub const fn create_workflow(&self) -> &Workflow {
        &self.create
    }

    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let Some(user_id) = self.session.current_user() else {
            self.keys.clear();
            return Ok(());
        };
        debug!(user_id, "Fetching keys");
        match self.api.find_keys(Some(&user_id), self.campaign_filter).await {
            Ok(keys) => {
                self.keys = keys;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch keys");
                Err(e)
            }
        }
    }

    /// Mint a key. The success notification carries the raw secret, which
    /// the backend never returns again.
    pub async fn create(&mut self) -> Phase {
        let Some(user_id) = self.session.current_user() else {
            self.create.reject(ValidationError::NotConnected);
            return self.create.phase();
        };
        let Ok(new) = self.create.begin(&self.form) else {
            return self.create.phase();
        };
        let body = CreateKey {
            end_date: new.end_date,
            permissions: new.permissions,
            user_id,
            campaign_id: new.campaign_id,
        };
        match self.api.create_key(&body).await {
            Ok(resp) => {
                self.form.reset();
                self.create.succeed(
                    Notification::success(
                        "API Key successfully created!",
                        "Copy this key, you won't be able to get it back.",
                    )
                    .with_detail(resp.api_key),
                );
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Key created but the key list could not be reloaded");
                }
            }
            Err(e) => self.create.fail(
                "Failed to create the key",
                "Could not reach the server. Please try again.",
                &e,
            ),
        }
        self.create.phase()
    }
}
