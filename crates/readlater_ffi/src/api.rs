//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core errors into plain envelopes the UI can render.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Item use-cases run one at a time behind a process-wide lock, so the
//!   read-modify-write cycle of the item store is never interleaved.
//! - Timestamps cross the boundary as ISO-8601 UTC strings with millisecond
//!   precision.

use log::warn;
use readlater_core::db::open_db;
use readlater_core::model::timestamp::{parse_iso, to_iso};
use readlater_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppwriteGateway, AuthError, AuthStatus, CoreConfig, Item, ItemDraft, ItemPatch, ItemService,
    ItemServiceResult, KvItemRepository, SessionState, SqliteKeyValueStore, Timestamp,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const FALLBACK_DB_FILE_NAME: &str = "readlater.sqlite3";
const AUTH_NOT_INITIALIZED: &str = "auth is not initialized; call auth_init first";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());
static SESSION: Mutex<Option<SessionState<AppwriteGateway>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Item projection handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub url: Option<String>,
    /// ISO-8601 UTC, millisecond precision.
    pub due_date: String,
    pub read_later: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            due_date: to_iso(&item.due_date),
            created_at: to_iso(&item.created_at),
            updated_at: to_iso(&item.updated_at),
            id: item.id,
            name: item.name,
            category: item.category,
            url: item.url,
            read_later: item.read_later,
            notes: item.notes,
        }
    }
}

/// List envelope; `items` is in display order (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListResponse {
    pub items: Vec<ItemView>,
    pub message: String,
}

/// Single-item envelope for get/create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// `None` on failure, or when a lookup matched nothing.
    pub item: Option<ItemView>,
    pub message: String,
}

impl ItemResponse {
    fn success(message: impl Into<String>, item: Option<Item>) -> Self {
        Self {
            ok: true,
            item: item.map(ItemView::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDeleteResponse {
    pub ok: bool,
    /// `false` when no item had the given id.
    pub deleted: bool,
    pub message: String,
}

/// Auth envelope shared by all session calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    /// `checking|signed_out|signed_in`.
    pub status: String,
    pub user_id: Option<String>,
    /// Provider message on failure, verbatim.
    pub message: String,
}

impl AuthResponse {
    fn from_status(ok: bool, status: &AuthStatus, message: impl Into<String>) -> Self {
        let (label, user_id) = match status {
            AuthStatus::Checking => ("checking", None),
            AuthStatus::SignedOut => ("signed_out", None),
            AuthStatus::SignedIn { user_id } => ("signed_in", Some(user_id.clone())),
        };
        Self {
            ok,
            status: label.to_string(),
            user_id,
            message: message.into(),
        }
    }
}

/// Lists every stored item, newest first.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never fails: storage problems yield an empty list plus a message.
#[flutter_rust_bridge::frb(sync)]
pub fn items_list() -> ItemListResponse {
    match with_item_service(|service| Ok(service.list_items())) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No items.".to_string()
            } else {
                format!("Found {} item(s).", items.len())
            };
            ItemListResponse {
                items: items.into_iter().map(ItemView::from).collect(),
                message,
            }
        }
        Err(err) => ItemListResponse {
            items: Vec::new(),
            message: format!("items_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_get(id: String) -> ItemResponse {
    match with_item_service(|service| service.get_item(id.trim())) {
        Ok(Some(item)) => ItemResponse::success("Item found.", Some(item)),
        Ok(None) => ItemResponse::success("Item not found.", None),
        Err(err) => ItemResponse::failure(format!("item_get failed: {err}")),
    }
}

/// Creates an item.
///
/// Input semantics:
/// - `due_date`: ISO-8601 string; `None` means "now".
/// - blank `url` / `notes` are stored as absent.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; returns the stored record on success.
#[flutter_rust_bridge::frb(sync)]
pub fn item_create(
    name: String,
    category: String,
    url: Option<String>,
    due_date: Option<String>,
    read_later: bool,
    notes: Option<String>,
) -> ItemResponse {
    let due_date = match parse_optional_date(due_date.as_deref()) {
        Ok(value) => value,
        Err(message) => return ItemResponse::failure(format!("item_create failed: {message}")),
    };
    let draft = ItemDraft {
        name: name.trim().to_string(),
        category: category.trim().to_string(),
        url,
        due_date,
        read_later,
        notes,
    };
    match with_item_service(|service| service.add_item(&draft)) {
        Ok(item) => ItemResponse::success("Item created.", Some(item)),
        Err(err) => ItemResponse::failure(format!("item_create failed: {err}")),
    }
}

/// Applies a partial update to one item.
///
/// Input semantics:
/// - `None` leaves a field untouched.
/// - `Some("")` for `url` or `notes` clears the field.
#[flutter_rust_bridge::frb(sync)]
pub fn item_update(
    id: String,
    name: Option<String>,
    category: Option<String>,
    url: Option<String>,
    due_date: Option<String>,
    read_later: Option<bool>,
    notes: Option<String>,
) -> ItemResponse {
    let due_date = match parse_optional_date(due_date.as_deref()) {
        Ok(value) => value,
        Err(message) => return ItemResponse::failure(format!("item_update failed: {message}")),
    };
    let patch = ItemPatch {
        id: id.trim().to_string(),
        name: name.map(|value| value.trim().to_string()),
        category: category.map(|value| value.trim().to_string()),
        url: url.map(Some),
        due_date,
        read_later,
        notes: notes.map(Some),
    };
    match with_item_service(|service| service.update_item(&patch)) {
        Ok(item) => ItemResponse::success("Item updated.", Some(item)),
        Err(err) => ItemResponse::failure(format!("item_update failed: {err}")),
    }
}

/// Deletes one item; deleting a missing id succeeds with `deleted=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(id: String) -> ItemDeleteResponse {
    match with_item_service(|service| service.delete_item(id.trim())) {
        Ok(deleted) => ItemDeleteResponse {
            ok: true,
            deleted,
            message: if deleted {
                "Item deleted.".to_string()
            } else {
                "Item not found.".to_string()
            },
        },
        Err(err) => ItemDeleteResponse {
            ok: false,
            deleted: false,
            message: format!("item_delete failed: {err}"),
        },
    }
}

/// Builds the session gateway from environment config and resolves the
/// startup status.
///
/// # FFI contract
/// - Sync call; performs one network round trip.
/// - Replaces any previous session context.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_init() -> AuthResponse {
    let gateway = CoreConfig::from_env()
        .map_err(|err| err.to_string())
        .and_then(|config| AppwriteGateway::new(&config.auth).map_err(|err| err.to_string()));
    let gateway = match gateway {
        Ok(gateway) => gateway,
        Err(message) => {
            return AuthResponse::from_status(
                false,
                &AuthStatus::SignedOut,
                format!("auth_init failed: {message}"),
            )
        }
    };

    let mut session = lock_session();
    let state = session.insert(SessionState::new(gateway));
    let status = state.initialize().clone();
    AuthResponse::from_status(true, &status, "Session resolved.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_in(email: String, password: String) -> AuthResponse {
    with_session(|state| state.sign_in(&email, &password).map(|_| ()), "Signed in.")
}

/// Registers an account and signs in with the same credentials.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_up(email: String, password: String, name: String) -> AuthResponse {
    with_session(
        |state| state.sign_up(&email, &password, &name).map(|_| ()),
        "Account created.",
    )
}

/// Ends the current session. On failure the status stays signed in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_out() -> AuthResponse {
    with_session(|state| state.sign_out().map(|_| ()), "Signed out.")
}

/// Reports the cached status without calling the provider.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_status() -> AuthResponse {
    match lock_session().as_ref() {
        Some(state) => AuthResponse::from_status(true, state.status(), ""),
        None => AuthResponse::from_status(true, &AuthStatus::Checking, ""),
    }
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_iso(value)
            .map(Some)
            .map_err(|err| format!("invalid due_date `{value}`: {err}")),
        None => Ok(None),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| match CoreConfig::from_env() {
            Ok(config) => config.db_path,
            Err(err) => {
                warn!("event=config_resolve module=ffi status=degraded error={err}");
                std::env::temp_dir().join(FALLBACK_DB_FILE_NAME)
            }
        })
        .clone()
}

fn with_item_service<T>(
    f: impl FnOnce(&ItemService<KvItemRepository<SqliteKeyValueStore<'_>>>) -> ItemServiceResult<T>,
) -> Result<T, String> {
    let _guard = lock_store();
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("item DB open failed: {err}"))?;
    let service = ItemService::new(KvItemRepository::new(SqliteKeyValueStore::new(&conn)));
    f(&service).map_err(|err| err.to_string())
}

fn with_session(
    f: impl FnOnce(&mut SessionState<AppwriteGateway>) -> Result<(), AuthError>,
    success_message: &str,
) -> AuthResponse {
    let mut session = lock_session();
    let Some(state) = session.as_mut() else {
        return AuthResponse::from_status(false, &AuthStatus::Checking, AUTH_NOT_INITIALIZED);
    };
    match f(state) {
        Ok(()) => AuthResponse::from_status(true, state.status(), success_message),
        Err(err) => AuthResponse::from_status(false, state.status(), err.to_string()),
    }
}

fn lock_store() -> MutexGuard<'static, ()> {
    STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=store_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn lock_session() -> MutexGuard<'static, Option<SessionState<AppwriteGateway>>> {
    SESSION.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}
