//! Client-side state.

pub mod auth;
