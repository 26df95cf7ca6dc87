//! Flutter-facing bindings for the semester grade tracker core.

pub mod api;
