//! Absinthe Core Library
//!
//! Shared functionality for the Absinthe console:
//! - Data model for users, campaigns, API keys and points
//! - Configuration resolution and hierarchy
//! - Persistent identity store and session context
//! - Common error types

pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod session;
pub mod tracing_init;

pub use config::ConsoleConfig;
pub use error::{Error, Result};
pub use identity::{FileIdentityStore, IdentityStore, MemoryIdentityStore, StorageKey};
pub use session::{SessionContext, SessionHandle};
