//! Form records and field validation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use absinthe_core::models::CampaignId;

/// Client-side rejection. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    Number { field: &'static str, value: String },

    #[error("{field} must be a date (YYYY-MM-DD), got {value:?}")]
    Date { field: &'static str, value: String },

    #[error("Metadata is not valid JSON: {0}")]
    Metadata(String),

    #[error("Select at least one permission")]
    NoPermissions,

    #[error("Status {0} cannot be set from the console")]
    Status(String),

    #[error("Nothing to update")]
    NothingToUpdate,

    #[error("Campaign {name} is completed and cannot be turned on or off")]
    Completed { name: String },

    #[error("Campaign {0} is not loaded")]
    UnknownCampaign(CampaignId),

    #[error("You need to create an account first")]
    NotConnected,

    #[error("An account is already connected")]
    AlreadyConnected,
}

/// A defined form record, validated into a typed submission.
pub trait Form {
    type Submission;

    fn validate(&self) -> Result<Self::Submission, ValidationError>;

    /// Clear the fields a successful submission consumed.
    fn reset(&mut self);
}

/// Trimmed value of a required field.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(value)
    }
}

/// Optional date field. Accepts `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_date(
    field: &'static str,
    value: &str,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date.and_time(NaiveTime::MIN).and_utc()));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| ValidationError::Date {
            field,
            value: value.to_string(),
        })
}

/// Optional numeric id field.
pub fn parse_optional_id(
    field: &'static str,
    value: &str,
) -> Result<Option<CampaignId>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::Number {
            field,
            value: value.to_string(),
        })
}
