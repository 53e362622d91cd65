//! Domain services behind the HTTP surface.

pub mod auth;
pub mod federated;
pub mod session;
pub mod users;
pub mod validate;
