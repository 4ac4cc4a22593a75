//! Domain model for read/do-later items.
//!
//! # Responsibility
//! - Define the persisted `Item` record and its caller-side input shapes.
//! - Own the timestamp wire format shared by all records.
//!
//! # Invariants
//! - Every item is identified by a store-assigned, immutable `ItemId`.
//! - `created_at <= updated_at` for every persisted item.

pub mod item;
pub mod timestamp;
