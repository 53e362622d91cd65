//! Route metadata and the navigation guard.

pub mod guard;
pub mod routes;
