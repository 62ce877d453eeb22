// /api/boards handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::policy_for;
use crate::database::boards;
use crate::database::models::{NewBoard, Role, UpdateBoard};
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::bad_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    pub description: Option<String>,
    pub background: Option<String>,
    pub is_private: Option<bool>,
    pub is_starred: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub background: Option<String>,
    pub is_private: Option<bool>,
    pub is_starred: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: Option<String>,
}

/// GET /api/boards - every board the caller owns or belongs to
pub async fn index(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let boards = boards::list_for_user(&state.pool, auth.id()).await?;
    Ok(ApiResponse::success(
        "Boards retrieved successfully",
        json!({ "boards": boards }),
    ))
}

/// GET /api/boards/:id - fully nested board view
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;

    let board = boards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let view = boards::view(&state.pool, board, true).await?;
    Ok(ApiResponse::success(
        "Board retrieved successfully",
        json!({ "board": view }),
    ))
}

/// POST /api/boards
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::title(&mut errors, "title", &body.title, 100);
    if let Some(description) = &body.description {
        validation::max_length(&mut errors, "description", description, 500, "Description");
    }
    if let Some(background) = &body.background {
        validation::background(&mut errors, "background", background);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let board = boards::create(
        &state.pool,
        auth.id(),
        NewBoard {
            title: body.title.trim().to_string(),
            description: body.description,
            background: body.background,
            is_private: body.is_private,
            is_starred: body.is_starred,
        },
    )
    .await?;

    let view = boards::view(&state.pool, board, false).await?;
    Ok(ApiResponse::created(
        "Board created successfully",
        json!({ "board": view }),
    ))
}

/// PUT /api/boards/:id - owner or admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBoardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    if let Some(title) = &body.title {
        validation::title(&mut errors, "title", title, 100);
    }
    if let Some(description) = &body.description {
        validation::max_length(&mut errors, "description", description, 500, "Description");
    }
    if let Some(background) = &body.background {
        validation::background(&mut errors, "background", background);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let board = boards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_admin(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let updated = boards::update(
        &state.pool,
        id,
        UpdateBoard {
            title: body.title.map(|t| t.trim().to_string()),
            description: body.description,
            background: body.background,
            is_private: body.is_private,
            is_starred: body.is_starred,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let view = boards::view(&state.pool, updated, false).await?;
    Ok(ApiResponse::success(
        "Board updated successfully",
        json!({ "board": view }),
    ))
}

/// DELETE /api/boards/:id - owner only; lists, cards and comments cascade
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;

    let board = boards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    if board.owner_id != auth.id() {
        return Err(ApiError::forbidden("Only board owner can delete board"));
    }

    boards::delete(&state.pool, id).await?;

    Ok(ApiResponse {
        status: axum::http::StatusCode::OK,
        message: "Board deleted successfully".to_string(),
        data: None,
    })
}

/// POST /api/boards/:id/members - owner or admin only
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::email(&mut errors, "email", &body.email);
    if let Some(role) = &body.role {
        validation::member_role(&mut errors, "role", role);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let board = boards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_admin(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let user_to_add = users::find_by_email(&state.pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if policy.role_for(user_to_add.id).is_some() {
        return Err(ApiError::bad_request("User is already a member of this board"));
    }

    let role = body
        .role
        .as_deref()
        .and_then(Role::parse_member)
        .unwrap_or(Role::Editor);

    boards::add_member(&state.pool, id, user_to_add.id, role).await?;

    let view = boards::view(&state.pool, board, false).await?;
    Ok(ApiResponse::success(
        "Member added to board successfully",
        json!({ "board": view }),
    ))
}

/// DELETE /api/boards/:id/members/:memberId - owner or admin only
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, member_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let member_id: Uuid = member_id.parse()?;

    let board = boards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_admin(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    if member_id == board.owner_id {
        return Err(ApiError::bad_request("Cannot remove board owner"));
    }

    boards::remove_member(&state.pool, id, member_id).await?;

    let view = boards::view(&state.pool, board, false).await?;
    Ok(ApiResponse::success(
        "Member removed from board successfully",
        json!({ "board": view }),
    ))
}
