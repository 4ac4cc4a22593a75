//! Item store: repository contract and key-value implementation.
//!
//! # Responsibility
//! - Provide CRUD over the item collection stored under one storage key.
//! - Assign ids and timestamps; callers never supply them.
//!
//! # Invariants
//! - The stored JSON array is the only source of truth; every operation reads
//!   it, mutates a local copy, and writes the whole array back in one call.
//! - Item ids are unique within the collection.
//! - `updated_at` strictly increases on every successful update.
//! - Mutations never overwrite a collection they failed to parse.
//! - No locking: callers serialize dependent operations themselves.

use crate::kv::{KeyValueStore, KvError};
use crate::model::item::{Item, ItemDraft, ItemId, ItemPatch};
use crate::model::timestamp::{now, Timestamp};
use log::{debug, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage key owning the serialized item collection.
pub const ITEMS_KEY: &str = "items";

const ID_SUFFIX_LEN: usize = 11;

pub type RepoResult<T> = Result<T, RepoError>;

/// Item store error.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying storage read or write failed.
    Storage(KvError),
    /// Stored collection could not be decoded.
    InvalidData(String),
    /// Collection could not be encoded for writing.
    Encode(serde_json::Error),
    NotFound(ItemId),
    /// Update/delete was called without a usable id.
    InvalidId,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::Encode(err) => write!(f, "failed to encode items: {err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidId => write!(f, "item id must not be empty"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) | Self::NotFound(_) | Self::InvalidId => None,
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    /// Reads the full collection, surfacing read and decode failures.
    fn load_items(&self) -> RepoResult<Vec<Item>>;

    /// Reads the full collection; any failure yields an empty list.
    fn list_items(&self) -> Vec<Item> {
        match self.load_items() {
            Ok(items) => items,
            Err(err) => {
                warn!("event=item_list module=repo status=degraded error={err}");
                Vec::new()
            }
        }
    }

    fn get_item(&self, id: &str) -> RepoResult<Option<Item>>;
    fn add_item(&self, draft: &ItemDraft) -> RepoResult<Item>;
    fn update_item(&self, patch: &ItemPatch) -> RepoResult<Item>;
    /// Returns whether a record was removed.
    ///
    /// A delete that matches nothing does not write, so it never creates the
    /// storage key and leaves the stored bytes as they were.
    fn delete_item(&self, id: &str) -> RepoResult<bool>;
}

/// Item repository persisting one JSON array through a key-value store.
pub struct KvItemRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvItemRepository<S> {
    /// Uses the default [`ITEMS_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, ITEMS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn write_items(&self, items: &[Item]) -> RepoResult<()> {
        let encoded = serde_json::to_string(items).map_err(RepoError::Encode)?;
        self.store.set_item(&self.key, &encoded)?;
        Ok(())
    }
}

impl<S: KeyValueStore> ItemRepository for KvItemRepository<S> {
    fn load_items(&self) -> RepoResult<Vec<Item>> {
        match self.store.get_item(&self.key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|err| RepoError::InvalidData(format!("key `{}`: {err}", self.key))),
            None => Ok(Vec::new()),
        }
    }

    fn get_item(&self, id: &str) -> RepoResult<Option<Item>> {
        let id = require_id(id)?;
        Ok(self.load_items()?.into_iter().find(|item| item.id == id))
    }

    fn add_item(&self, draft: &ItemDraft) -> RepoResult<Item> {
        let mut items = self.load_items()?;
        let created_at = now();
        let existing: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        let id = generate_item_id(created_at, &existing);

        let item = Item::from_draft(id, draft, created_at);
        items.push(item.clone());
        self.write_items(&items)?;

        debug!("event=item_add module=repo status=ok count={}", items.len());
        Ok(item)
    }

    fn update_item(&self, patch: &ItemPatch) -> RepoResult<Item> {
        let id = require_id(&patch.id)?;
        let mut items = self.load_items()?;
        let Some(index) = items.iter().position(|item| item.id == id) else {
            return Err(RepoError::NotFound(id.to_string()));
        };

        let mut merged = items[index].clone();
        patch.apply_to(&mut merged);
        merged.updated_at = next_updated_at(merged.updated_at, now());
        items[index] = merged.clone();
        self.write_items(&items)?;

        debug!("event=item_update module=repo status=ok");
        Ok(merged)
    }

    fn delete_item(&self, id: &str) -> RepoResult<bool> {
        let id = require_id(id)?;
        let mut items = self.load_items()?;
        let before = items.len();
        items.retain(|item| item.id != id);

        let removed = items.len() != before;
        if removed {
            self.write_items(&items)?;
        }

        debug!("event=item_delete module=repo status=ok removed={removed}");
        Ok(removed)
    }
}

fn require_id(id: &str) -> RepoResult<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidId);
    }
    Ok(trimmed)
}

/// Base-36 creation millis followed by a random suffix; redrawn on collision.
fn generate_item_id(created_at: Timestamp, existing: &HashSet<&str>) -> ItemId {
    let millis = u128::try_from(created_at.timestamp_millis()).unwrap_or_default();
    let prefix = to_base36(millis);
    loop {
        let random = to_base36(Uuid::new_v4().as_u128());
        let suffix = &random[random.len().saturating_sub(ID_SUFFIX_LEN)..];
        let candidate = format!("{prefix}{suffix}");
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
    }
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn next_updated_at(previous: Timestamp, current: Timestamp) -> Timestamp {
    if current > previous {
        current
    } else {
        previous + chrono::Duration::milliseconds(1)
    }
}
