//! Authentication extractors.
//!
//! The admin surface is gated by a single shared password; logging in sets a
//! session flag that [`RequireAdmin`] checks. The tenant identifier is
//! ambient session state read by [`Tenant`] - the services never infer it.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::DEFAULT_INSTANCE_NAME;

/// Session keys.
pub mod session_keys {
    /// Key for the admin login flag.
    pub const IS_ADMIN: &str = "is_admin";

    /// Key for the ambient tenant identifier.
    pub const INSTANCE_NAME: &str = "instance_name";
}

/// Extractor that requires the admin session flag.
///
/// Rejects with 401 when the caller has not logged in through the admin
/// password gate.
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Admin login required".to_string()))?;

        let is_admin = session
            .get::<bool>(session_keys::IS_ADMIN)
            .await
            .ok()
            .flatten()
            .unwrap_or(false);

        if is_admin {
            Ok(Self)
        } else {
            Err(AppError::Unauthorized("Admin login required".to_string()))
        }
    }
}

/// Extractor for the ambient tenant identifier.
///
/// Reads `instance_name` from the session, falling back to the default
/// tenant. Never fails: a missing session simply means the default tenant.
pub struct Tenant(pub String);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance_name = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<String>(session_keys::INSTANCE_NAME)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string()),
            None => DEFAULT_INSTANCE_NAME.to_string(),
        };

        Ok(Self(instance_name))
    }
}
