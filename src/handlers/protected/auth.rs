// /api/auth handlers for the already-authenticated user

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::cookies;
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::bad_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

/// GET /api/auth/me - current user's profile
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(
        "User data retrieved successfully",
        json!({ "user": auth.0.profile() }),
    ))
}

/// POST /api/auth/logout - clear the auth cookie if one is set
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response = ApiResponse::message_only("Logout successful").into_response();

    let cookie = cookies::clear_token_cookie(state.config.security.secure_cookies);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    response
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// PUT /api/auth/profile - change name and/or email
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    if let Some(name) = &body.name {
        validation::name(&mut errors, "name", name);
    }
    if let Some(email) = &body.email {
        validation::email(&mut errors, "email", email);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    if let Some(email) = &body.email {
        if users::email_taken_by_other(&state.pool, email, auth.id()).await? {
            return Err(ApiError::bad_request("Email is already taken"));
        }
    }

    let updated = users::update_profile(
        &state.pool,
        auth.id(),
        body.name.as_deref().map(str::trim),
        body.email.as_deref(),
        None,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        json!({ "user": updated.profile() }),
    ))
}
