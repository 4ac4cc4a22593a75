//! Item use-case service.
//!
//! # Responsibility
//! - Validate caller input before it reaches the item store.
//! - Present the collection in display order (newest first).
//! - Map store-level `NotFound` into a distinct service error.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Listing never fails; storage problems degrade to an empty list.

use crate::model::item::{Item, ItemDraft, ItemId, ItemPatch, ItemValidationError};
use crate::repo::item_repo::{ItemRepository, RepoError};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ItemServiceResult<T> = Result<T, ItemServiceError>;

/// Service error for item use-cases.
#[derive(Debug)]
pub enum ItemServiceError {
    /// Input rejected before any storage access.
    Validation(ItemValidationError),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ItemNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ItemValidationError> for ItemServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Use-case service wrapper for item CRUD operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists items sorted by `created_at DESC, id ASC`.
    pub fn list_items(&self) -> Vec<Item> {
        let mut items = self.repo.list_items();
        items.sort_by(display_order);
        items
    }

    pub fn get_item(&self, id: &str) -> ItemServiceResult<Option<Item>> {
        Ok(self.repo.get_item(id)?)
    }

    /// Validates and creates an item.
    ///
    /// # Contract
    /// - Rejects a blank name or a non-absolute URL without touching storage.
    /// - Returns the stored record including assigned id and timestamps.
    pub fn add_item(&self, draft: &ItemDraft) -> ItemServiceResult<Item> {
        draft.validate()?;
        Ok(self.repo.add_item(draft)?)
    }

    /// Validates the set fields of `patch` and merges it into the stored item.
    pub fn update_item(&self, patch: &ItemPatch) -> ItemServiceResult<Item> {
        patch.validate()?;
        Ok(self.repo.update_item(patch)?)
    }

    /// Deletes by id; `Ok(false)` when nothing matched.
    pub fn delete_item(&self, id: &str) -> ItemServiceResult<bool> {
        Ok(self.repo.delete_item(id)?)
    }
}

fn display_order(left: &Item, right: &Item) -> Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| left.id.cmp(&right.id))
}
