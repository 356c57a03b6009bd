//! Admin route handlers.
//!
//! The admin surface is gated by one shared password. Logging in sets the
//! session's admin flag; settings read and write the session's ambient
//! tenant; clear-data wipes everything the current tenant owns.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{RequireAdmin, Tenant, session_keys};
use crate::services::DataService;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/settings", get(get_settings).post(update_settings))
        .route("/admin/clear-data", post(clear_data))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Admin login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin settings update request.
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub instance_name: String,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    instance_name: String,
}

#[derive(Debug, Serialize)]
struct ClearDataResponse {
    success: bool,
    deleted_count: u64,
    message: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Log in with the shared admin password.
///
/// POST /admin/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if request.password != state.config().admin_password.expose_secret() {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    session
        .insert(session_keys::IS_ADMIN, true)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to persist admin session");
            AppError::Unauthorized("Login failed".to_string())
        })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Clear the admin flag.
///
/// POST /admin/logout
async fn logout(session: Session) -> Json<SuccessResponse> {
    let _ = session.remove::<bool>(session_keys::IS_ADMIN).await;
    Json(SuccessResponse { success: true })
}

/// Read the ambient tenant.
///
/// GET /admin/settings
async fn get_settings(
    _admin: RequireAdmin,
    Tenant(instance_name): Tenant,
) -> Json<SettingsResponse> {
    Json(SettingsResponse { instance_name })
}

/// Set the ambient tenant for this session.
///
/// POST /admin/settings
async fn update_settings(
    _admin: RequireAdmin,
    session: Session,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    session
        .insert(session_keys::INSTANCE_NAME, request.instance_name)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to persist settings");
            AppError::BadRequest("Failed to update settings".to_string())
        })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Delete everything the current tenant owns.
///
/// POST /admin/clear-data
async fn clear_data(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
) -> Result<Json<ClearDataResponse>, AppError> {
    let service = DataService::new(state.store(), state.gateway());
    let deleted_count = service.wipe_tenant(&instance_name).await?;

    Ok(Json(ClearDataResponse {
        success: true,
        deleted_count,
        message: format!("Successfully deleted all data for instance \"{instance_name}\""),
    }))
}
