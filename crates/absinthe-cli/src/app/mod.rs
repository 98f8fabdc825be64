//! Workflow state shared by every screen.

mod form;
mod notification;
mod workflow;

pub use form::{Form, ValidationError, parse_date, parse_optional_id, require};
pub use notification::{Notification, NotificationKind};
pub use workflow::{Phase, SubmitError, Workflow};
