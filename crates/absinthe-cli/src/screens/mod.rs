//! Console screens.
//!
//! Each screen owns its forms and one [`Workflow`](crate::app::Workflow) per
//! form. Screens read the session through a `SessionHandle`; only the
//! account screen writes it.

mod account;
mod campaign_detail;
mod campaigns;
mod keys;
mod points;

#[cfg(test)]
pub(crate) mod test_support;

pub use account::AccountScreen;
pub use campaign_detail::CampaignDetailScreen;
pub use campaigns::{CampaignChanges, CampaignForm, CampaignUpdateForm, CampaignsScreen, NewCampaign};
pub use keys::{KeyForm, KeysScreen, NewKey};
pub use points::{
    Distribution, POINTS_CHANNEL, PointsForm, PointsQuery, PointsScreen, PointsSearchForm,
};
