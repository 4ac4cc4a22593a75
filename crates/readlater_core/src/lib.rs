//! Core domain logic for ReadLater.
//! This crate is the single source of truth for item and session invariants.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{AuthConfig, ConfigError, CoreConfig};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status};
pub use model::item::{Item, ItemDraft, ItemId, ItemPatch, ItemValidationError};
pub use model::timestamp::Timestamp;
pub use repo::item_repo::{ItemRepository, KvItemRepository, RepoError, RepoResult, ITEMS_KEY};
pub use service::item_service::{ItemService, ItemServiceError, ItemServiceResult};
pub use session::appwrite::AppwriteGateway;
pub use session::gateway::{Account, AuthError, AuthResult, Session, SessionGateway};
pub use session::state::{AuthStatus, SessionState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
