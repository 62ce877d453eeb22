// /api/lists handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::policy_for;
use crate::database::models::{Board, List};
use crate::database::{boards, lists};
use crate::error::{ApiError, FieldError};
use crate::handlers::bad_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
    /// Owning board id.
    pub board: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderListRequest {
    pub position: i32,
}

/// Load the parent board of a list; a dangling reference is a 404.
async fn parent_board(state: &AppState, list: &List) -> Result<Board, ApiError> {
    boards::find(&state.pool, list.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))
}

/// GET /api/lists/board/:boardId - lists with their cards, ordered
pub async fn by_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(board_id): Path<String>,
) -> ApiResult<Value> {
    let board_id: Uuid = board_id.parse()?;

    let board = boards::find(&state.pool, board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let lists = lists::views_by_board(&state.pool, board_id).await?;
    Ok(ApiResponse::success(
        "Lists retrieved successfully",
        json!({ "lists": lists }),
    ))
}

/// POST /api/lists - append a list to a board
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateListRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::title(&mut errors, "title", &body.title, 100);
    let board_id: Uuid = match body.board.parse() {
        Ok(id) => id,
        Err(_) => {
            errors.push(FieldError::new("board", "Valid board ID is required"));
            return Err(ApiError::validation(errors));
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let board = boards::find(&state.pool, board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can create lists",
        ));
    }

    let list = lists::create(&state.pool, board_id, body.title.trim()).await?;
    Ok(ApiResponse::created(
        "List created successfully",
        json!({ "list": list }),
    ))
}

/// PUT /api/lists/:id - rename
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateListRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::title(&mut errors, "title", &body.title, 100);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let list = lists::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let board = parent_board(&state, &list).await?;
    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can edit lists",
        ));
    }

    let updated = lists::rename(&state.pool, id, body.title.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    Ok(ApiResponse::success(
        "List updated successfully",
        json!({ "list": updated }),
    ))
}

/// PUT /api/lists/:id/reorder - move a list within its board
pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<ReorderListRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::position(&mut errors, "position", body.position);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let list = lists::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let board = parent_board(&state, &list).await?;
    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can reorder lists",
        ));
    }

    let updated = lists::reorder(&state.pool, &list, body.position).await?;
    Ok(ApiResponse::success(
        "List reordered successfully",
        json!({ "list": updated }),
    ))
}

/// DELETE /api/lists/:id - cards and their comments go with it
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;

    let list = lists::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let board = parent_board(&state, &list).await?;
    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can delete lists",
        ));
    }

    lists::delete(&state.pool, &list).await?;

    Ok(ApiResponse {
        status: axum::http::StatusCode::OK,
        message: "List deleted successfully".to_string(),
        data: None,
    })
}
