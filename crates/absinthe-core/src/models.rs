//! Backend data model.
//!
//! Wire shapes of the campaign/key/user REST API and of the points service.
//! Field names are camelCase on the wire; enum encodings follow the backend
//! (integers for campaign status and tier, strings for role and permission).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Numeric campaign identifier.
pub type CampaignId = u64;

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum CampaignStatus {
    Off = 0,
    On = 1,
    Completed = 2,
}

impl CampaignStatus {
    /// The status an owner toggle moves to. Completed campaigns cannot be toggled.
    pub const fn toggled(self) -> Option<Self> {
        match self {
            Self::Off => Some(Self::On),
            Self::On => Some(Self::Off),
            Self::Completed => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" | "0" => Ok(Self::Off),
            "ON" | "1" => Ok(Self::On),
            "COMPLETED" | "2" => Ok(Self::Completed),
            other => Err(format!("unknown campaign status: {other}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum SubscriptionTier {
    Free = 0,
    Basic = 1,
    Premium = 2,
}

/// Anonymous account, identified only by its server-issued id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub role: Role,
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub keys: Vec<Key>,
}

/// A named, time-bounded unit grouping points distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaign {
    pub name: String,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial campaign update. `user_id` is always required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaign {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
}

impl UpdateCampaign {
    pub fn status(user_id: impl Into<String>, status: CampaignStatus) -> Self {
        Self {
            user_id: user_id.into(),
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Operation an API key may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyPermission {
    Full,
    Get,
    Post,
    Delete,
    Put,
    Patch,
}

impl KeyPermission {
    pub const ALL: [Self; 6] = [
        Self::Full,
        Self::Get,
        Self::Post,
        Self::Delete,
        Self::Put,
        Self::Patch,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for KeyPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for KeyPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown key permission: {s}"))
    }
}

/// API key as listed by the backend. The raw secret is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub hashed_key: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub permissions: Vec<KeyPermission>,
    #[serde(default)]
    pub user: Option<Box<User>>,
    #[serde(default)]
    pub campaign: Option<Campaign>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub permissions: Vec<KeyPermission>,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
}

/// Returned once, at key creation. The only time the raw secret is visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyResponse {
    pub api_key: String,
}

/// Points awarded to an address under a named event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsData {
    pub points: f64,
    pub address: String,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A past points record returned by the points service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub address: String,
    pub points: f64,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
