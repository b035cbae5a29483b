//! Account endpoints and bearer-token middleware
//!
//! Protected routes require `Authorization: Bearer <token>`. Any missing,
//! malformed, wrongly signed or expired token is answered with 401. Admin
//! routes additionally require the caller's stored role to be `admin`.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uspshare_common::api::{hash_password, verify_password};
use uspshare_common::db::{NewUser, Role};
use uuid::Uuid;

use super::ApiJson;
use crate::{ApiError, ApiResult, AppState};

/// Identity of the authenticated caller, inserted by [`auth_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Bearer token middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing or malformed authorization header".to_string()))?;

    let claims = state.keys.validate(token).map_err(|e| {
        warn!(error = %e, "Rejected bearer token");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(AuthUser { id: claims.user_id });
    Ok(next.run(request).await)
}

/// Admin role gate; runs after [`auth_middleware`]
pub async fn admin_middleware(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = state.store.find_user_by_id(user.id).await?;
    match account {
        Some(account) if account.role == Role::Admin => Ok(next.run(request).await),
        _ => Err(ApiError::Forbidden("Admin access required".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "User signed up");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub name: String,
    pub email: String,
    pub initial: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash).await? {
        return Err(invalid());
    }

    let token = state.keys.issue(user.id)?;
    let initial = user
        .name
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_default();

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            name: user.name,
            email: user.email,
            initial,
        },
    }))
}
