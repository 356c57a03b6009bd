//! HTTP middleware: sessions and the admin gate.

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, Tenant, session_keys};
pub use session::{SESSION_COOKIE_NAME, session_layer};
