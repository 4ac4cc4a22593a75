//! Flutter bridge surface for ReadLater core.

pub mod api;
