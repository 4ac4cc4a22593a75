//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item store contract used by services and adapters.
//! - Isolate JSON encoding and key-value details from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidId`) in
//!   addition to storage errors.
//! - Field contents are validated by callers, not re-validated here.

pub mod item_repo;
