//! Authentication session boundary.
//!
//! # Responsibility
//! - Define the consumed account/session contract (`SessionGateway`).
//! - Provide the Appwrite HTTP adapter for that contract.
//! - Hold explicit app auth state (`SessionState`) instead of a global flag.
//!
//! # Invariants
//! - Credentials and e-mail addresses are never written to logs.
//! - Gateway errors reach callers unchanged; nothing is retried.

pub mod appwrite;
pub mod gateway;
pub mod state;
