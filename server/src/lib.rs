//! Cookie-session authentication backend for a separate-origin SPA.
//!
//! Exposed as a library so integration tests (and the thin binary) can
//! assemble the router against any `UserRepository` / federated exchange.

pub mod config;
pub mod routes;
pub mod services;
pub mod state;
