//! Flutter bridge for PocketNote core.

pub mod api;
