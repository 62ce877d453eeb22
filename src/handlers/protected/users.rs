// /api/users handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::database::users;
use crate::error::ApiError;
use crate::handlers::bad_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub theme: Option<String>,
    pub notifications: Option<bool>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

/// GET /api/users/search?email= - find collaborators to invite
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<UserSearchQuery>,
) -> ApiResult<Value> {
    let fragment = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email query parameter is required"))?;

    let users = users::search_by_email(&state.pool, fragment, auth.id()).await?;
    Ok(ApiResponse::success(
        "Users search completed",
        json!({ "users": users }),
    ))
}

/// GET /api/users/:id - public profile fields only
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;

    let user = users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(
        "User retrieved successfully",
        json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "avatar": user.avatar,
                "createdAt": user.created_at,
            }
        }),
    ))
}

/// PUT /api/users/profile - display name and avatar
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateUserProfileRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    if let Some(name) = &body.name {
        validation::name(&mut errors, "name", name);
    }
    if let Some(avatar) = &body.avatar {
        validation::url(&mut errors, "avatar", avatar, "Avatar");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let updated = users::update_profile(
        &state.pool,
        auth.id(),
        body.name.as_deref().map(str::trim),
        None,
        body.avatar.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        json!({ "user": updated.profile() }),
    ))
}

/// PUT /api/users/preferences - merge the given keys into stored preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdatePreferencesRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut patch = Map::new();
    if let Some(theme) = body.theme {
        patch.insert("theme".to_string(), Value::String(theme));
    }
    if let Some(notifications) = body.notifications {
        patch.insert("notifications".to_string(), Value::Bool(notifications));
    }
    if let Some(language) = body.language {
        patch.insert("language".to_string(), Value::String(language));
    }
    if let Some(timezone) = body.timezone {
        patch.insert("timezone".to_string(), Value::String(timezone));
    }

    let updated = users::update_preferences(&state.pool, auth.id(), &Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(
        "Preferences updated successfully",
        json!({ "user": updated.profile() }),
    ))
}

/// GET /api/users/stats - board and card counts for the caller
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let stats = users::stats(&state.pool, auth.id()).await?;
    Ok(ApiResponse::success(
        "User statistics retrieved successfully",
        json!({ "stats": stats }),
    ))
}

/// DELETE /api/users/account - removes the user; owned boards cascade
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let deleted = users::delete(&state.pool, auth.id()).await?;
    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse {
        status: axum::http::StatusCode::OK,
        message: "Account deleted successfully".to_string(),
        data: None,
    })
}
