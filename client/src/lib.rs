//! Client half of the cookie-session auth protocol.
//!
//! ARCHITECTURE
//! ============
//! Three layers, leaf-first:
//! - `net`: the CSRF-aware request pipeline over reqwest with a real cookie
//!   jar, normalizing every failure into one tagged error type.
//! - `state`: the auth-state cache with exactly-once startup resolution.
//! - `router`: route metadata and the navigation guard that consults the
//!   cache before every navigation.

pub mod net;
pub mod router;
pub mod state;
