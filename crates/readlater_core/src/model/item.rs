//! Item domain model.
//!
//! # Responsibility
//! - Define the persisted read/do-later record and its JSON wire shape.
//! - Define caller-side inputs: `ItemDraft` for creation, `ItemPatch` for
//!   partial updates.
//! - Provide caller-side field validation (required name, absolute URL).
//!
//! # Invariants
//! - `id`, `created_at` are never changed after creation.
//! - Blank optional text (`url`, `notes`) is stored as absent.
//! - Wire field names are camelCase; legacy `todos` is read as `notes`
//!   and never written back.

use crate::model::timestamp::{iso_millis, truncate, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned item identifier.
pub type ItemId = String;

/// One read/do-later record owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredItem")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(with = "iso_millis")]
    pub due_date: Timestamp,
    pub read_later: bool,
    /// Free-text notes or comma-separated to-dos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: Timestamp,
    #[serde(with = "iso_millis")]
    pub updated_at: Timestamp,
}

/// Read-side shape of a persisted record.
///
/// Older records carry `todos` instead of (or next to) `notes`; both are
/// accepted and `notes` wins when both are non-blank.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: ItemId,
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    url: Option<String>,
    #[serde(with = "iso_millis")]
    due_date: Timestamp,
    #[serde(default)]
    read_later: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    todos: Option<String>,
    #[serde(with = "iso_millis")]
    created_at: Timestamp,
    #[serde(with = "iso_millis")]
    updated_at: Timestamp,
}

impl From<StoredItem> for Item {
    fn from(stored: StoredItem) -> Self {
        Self {
            id: stored.id,
            name: stored.name,
            category: stored.category,
            url: stored.url,
            due_date: stored.due_date,
            read_later: stored.read_later,
            notes: stored.notes.or(stored.todos),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

impl Item {
    /// Builds a new record from a draft with store-assigned fields.
    ///
    /// `due_date` falls back to `now` when the draft leaves it unset.
    pub fn from_draft(id: ItemId, draft: &ItemDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            category: draft.category.clone(),
            url: non_blank(draft.url.as_deref()),
            due_date: draft.due_date.map(truncate).unwrap_or(now),
            read_later: draft.read_later,
            notes: non_blank(draft.notes.as_deref()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation input. Store-assigned fields cannot be expressed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub url: Option<String>,
    /// Defaults to creation time when `None`.
    pub due_date: Option<Timestamp>,
    pub read_later: bool,
    pub notes: Option<String>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks caller-side constraints before the draft reaches the store.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_name(&self.name)?;
        if let Some(url) = self.url.as_deref() {
            validate_url(url)?;
        }
        Ok(())
    }
}

/// Partial update keyed by `id`. `None` leaves a field untouched.
///
/// `url` and `notes` use a nested option so callers can clear them with
/// `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub id: ItemId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub url: Option<Option<String>>,
    pub due_date: Option<Timestamp>,
    pub read_later: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl ItemPatch {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Validates only the fields the patch actually sets.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if let Some(name) = self.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(Some(url)) = self.url.as_ref() {
            validate_url(url)?;
        }
        Ok(())
    }

    /// Overwrites every field set in this patch. Timestamps are left to the
    /// caller.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(url) = &self.url {
            item.url = non_blank(url.as_deref());
        }
        if let Some(due_date) = self.due_date {
            item.due_date = truncate(due_date);
        }
        if let Some(read_later) = self.read_later {
            item.read_later = read_later;
        }
        if let Some(notes) = &self.notes {
            item.notes = non_blank(notes.as_deref());
        }
    }
}

/// Field validation failure reported before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    InvalidUrl { url: String, reason: String },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name is required"),
            Self::InvalidUrl { url, reason } => write!(f, "invalid url `{url}`: {reason}"),
        }
    }
}

impl Error for ItemValidationError {}

fn validate_name(name: &str) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<(), ItemValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    reqwest::Url::parse(trimmed).map_err(|err| ItemValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(raw.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::{ItemDraft, ItemPatch, ItemValidationError};

    #[test]
    fn draft_requires_non_blank_name() {
        let draft = ItemDraft::new("   ");
        assert_eq!(draft.validate(), Err(ItemValidationError::EmptyName));
    }

    #[test]
    fn draft_rejects_relative_url() {
        let mut draft = ItemDraft::new("docs");
        draft.url = Some("example.com/page".to_string());
        assert!(matches!(
            draft.validate(),
            Err(ItemValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn draft_treats_blank_url_as_absent() {
        let mut draft = ItemDraft::new("docs");
        draft.url = Some("  ".to_string());
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn patch_validates_only_set_fields() {
        let mut patch = ItemPatch::new("abc");
        assert_eq!(patch.validate(), Ok(()));

        patch.name = Some(String::new());
        assert_eq!(patch.validate(), Err(ItemValidationError::EmptyName));

        patch.name = Some("ok".to_string());
        patch.url = Some(Some("not a url".to_string()));
        assert!(patch.validate().is_err());

        patch.url = Some(None);
        assert_eq!(patch.validate(), Ok(()));
    }
}
