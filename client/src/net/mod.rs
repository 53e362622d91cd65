//! Network layer: CSRF-aware transport and error normalization.

pub mod api;
pub mod error;
pub mod types;
