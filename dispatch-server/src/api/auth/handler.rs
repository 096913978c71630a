//! Authentication Handlers
//!
//! Handles login, session introspection, and logout

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::User;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Login response with session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/login - 按用户名登录
///
/// The register has no passwords on file: login succeeds iff the username
/// exists, and maps it to the display name shown in the UI.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::validation("Username is required"));
    }

    let user = user::find_by_username(&state.pool, username)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            security_log!("WARN", "login_failed", username = username.to_string());
            AppError::unknown_user()
        })?;

    let token = state
        .get_jwt_service()
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/me - 当前登录用户
///
/// [`CurrentUser`] validates the bearer token itself when the middleware has
/// not already attached it.
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// POST /api/auth/logout - 退出登录
///
/// Stateless sessions: the client drops its token; the server only records
/// the event.
pub async fn logout(Extension(current_user): Extension<CurrentUser>) -> Json<ApiResponse<()>> {
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        "User logged out"
    );
    Json(ApiResponse::ok())
}
