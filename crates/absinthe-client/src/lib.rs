//! Absinthe HTTP clients.
//!
//! Provides reqwest-based clients for the campaign/key/user REST API and for
//! the API-key authenticated points service, plus the traits screens use to
//! stay independent of the transport.

mod api;
mod error;
mod points;


pub use api::{ApiClient, ApiConfig, ConsoleApi};
pub use error::{ApiError, UserMessage};
pub use points::{
    HttpPointsConnector, PointsApi, PointsClient, PointsConfig, PointsConnector, PointsError,
};
