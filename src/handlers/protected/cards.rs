// /api/cards handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::policy_for;
use crate::database::activities::{self, ActivityKind};
use crate::database::models::{Label, NewCard, UpdateCard};
use crate::database::{boards, cards, comments, lists};
use crate::error::{ApiError, FieldError};
use crate::handlers::bad_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub title: String,
    pub description: Option<String>,
    /// Owning list id.
    pub list: String,
    pub due_date: Option<String>,
    pub labels: Option<Vec<Label>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub labels: Option<Vec<Label>>,
    pub completed: Option<bool>,
    pub members: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub list_id: String,
    pub position: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub board_id: Option<String>,
    pub label: Option<String>,
    pub due_date: Option<String>,
}

/// GET /api/cards/list/:listId - cards of a list, ordered
pub async fn by_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(list_id): Path<String>,
) -> ApiResult<Value> {
    let list_id: Uuid = list_id.parse()?;

    let list = lists::find(&state.pool, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let board = boards::find(&state.pool, list.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let cards = cards::views_by_list(&state.pool, list_id).await?;
    Ok(ApiResponse::success(
        "Cards retrieved successfully",
        json!({ "cards": cards }),
    ))
}

/// GET /api/cards/search - filtered search across the caller's boards
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Value> {
    let mut errors = Vec::new();

    let board_id = match &query.board_id {
        Some(raw) => Some(raw.parse::<Uuid>()?),
        None => None,
    };

    let due_on = match &query.due_date {
        Some(raw) => match raw.parse::<chrono::NaiveDate>() {
            Ok(day) => Some(day),
            Err(_) => {
                errors.push(FieldError::new("dueDate", "Due date must be a valid date"));
                None
            }
        },
        None => None,
    };
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let filters = cards::CardSearch {
        text: query.q.clone().filter(|s| !s.is_empty()),
        board_id,
        label: query.label.clone().filter(|s| !s.is_empty()),
        due_on,
    };

    let hits = cards::search(&state.pool, auth.id(), &filters).await?;
    Ok(ApiResponse::success(
        "Cards search completed",
        json!({ "cards": hits }),
    ))
}

/// POST /api/cards - append a card to a list
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateCardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::title(&mut errors, "title", &body.title, 200);
    if let Some(description) = &body.description {
        validation::max_length(&mut errors, "description", description, 2000, "Description");
    }
    let due_date = body
        .due_date
        .as_deref()
        .and_then(|raw| validation::datetime(&mut errors, "dueDate", raw, "Due date"));
    let list_id: Uuid = match body.list.parse() {
        Ok(id) => id,
        Err(_) => {
            errors.push(FieldError::new("list", "Valid list ID is required"));
            return Err(ApiError::validation(errors));
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let list = lists::find(&state.pool, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let board = boards::find(&state.pool, list.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can create cards",
        ));
    }

    let card = cards::create(
        &state.pool,
        &list,
        NewCard {
            title: body.title.trim().to_string(),
            description: body.description,
            due_date,
            labels: body.labels.unwrap_or_default(),
        },
    )
    .await?;

    activities::record(
        &state.pool,
        card.id,
        auth.id(),
        ActivityKind::CardCreated,
        &format!("Created card \"{}\"", card.title),
        json!({}),
    )
    .await?;

    let view = cards::view(&state.pool, card).await?;
    Ok(ApiResponse::created(
        "Card created successfully",
        json!({ "card": view }),
    ))
}

/// PUT /api/cards/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    if let Some(title) = &body.title {
        validation::title(&mut errors, "title", title, 200);
    }
    if let Some(description) = &body.description {
        validation::max_length(&mut errors, "description", description, 2000, "Description");
    }
    let due_date = body
        .due_date
        .as_deref()
        .and_then(|raw| validation::datetime(&mut errors, "dueDate", raw, "Due date"));
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let card = cards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let board = boards::find(&state.pool, card.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can edit cards",
        ));
    }

    let old_title = card.title.clone();

    let updated = cards::update(
        &state.pool,
        id,
        UpdateCard {
            title: body.title.map(|t| t.trim().to_string()),
            description: body.description,
            due_date,
            labels: body.labels,
            completed: body.completed,
            members: body.members,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Card not found"))?;

    if old_title != updated.title {
        activities::record(
            &state.pool,
            updated.id,
            auth.id(),
            ActivityKind::CardUpdated,
            &format!("Renamed card from \"{}\" to \"{}\"", old_title, updated.title),
            json!({}),
        )
        .await?;
    }

    let view = cards::view(&state.pool, updated).await?;
    Ok(ApiResponse::success(
        "Card updated successfully",
        json!({ "card": view }),
    ))
}

/// PUT /api/cards/:id/move - reposition within or across lists
pub async fn move_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<MoveCardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::position(&mut errors, "position", body.position);
    let dest_list_id: Uuid = match body.list_id.parse() {
        Ok(id) => id,
        Err(_) => {
            errors.push(FieldError::new("listId", "Valid list ID is required"));
            return Err(ApiError::validation(errors));
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let card = cards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let dest = lists::find(&state.pool, dest_list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Target list not found"))?;

    let source_board = boards::find(&state.pool, card.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    // Both ends of the move are re-authorized against fresh rows.
    let source_policy = policy_for(&state.pool, &source_board).await?;
    let dest_policy = if dest.board_id == source_board.id {
        source_policy.clone()
    } else {
        let dest_board = boards::find(&state.pool, dest.board_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Board not found"))?;
        policy_for(&state.pool, &dest_board).await?
    };

    if !source_policy.can_view(auth.id()) || !dest_policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !source_policy.can_edit_content(auth.id()) || !dest_policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can move cards",
        ));
    }

    let source_list = lists::find(&state.pool, card.list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    let moved = cards::move_to(&state.pool, &card, &dest, body.position).await?;

    activities::record(
        &state.pool,
        moved.id,
        auth.id(),
        ActivityKind::CardMoved,
        &format!(
            "Moved card \"{}\" from \"{}\" to \"{}\"",
            moved.title, source_list.title, dest.title
        ),
        json!({ "fromList": source_list.title, "toList": dest.title }),
    )
    .await?;

    let view = cards::view(&state.pool, moved).await?;
    Ok(ApiResponse::success(
        "Card moved successfully",
        json!({ "card": view }),
    ))
}

/// DELETE /api/cards/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;

    let card = cards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let board = boards::find(&state.pool, card.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !policy.can_edit_content(auth.id()) {
        return Err(ApiError::forbidden(
            "Only board owners, admins, and editors can delete cards",
        ));
    }

    cards::delete(&state.pool, &card).await?;

    Ok(ApiResponse {
        status: axum::http::StatusCode::OK,
        message: "Card deleted successfully".to_string(),
        data: None,
    })
}

/// POST /api/cards/:id/comments - anyone with board access may comment
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id: Uuid = id.parse()?;
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::comment_text(&mut errors, "text", &body.text);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let card = cards::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let board = boards::find(&state.pool, card.board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    let policy = policy_for(&state.pool, &board).await?;
    if !policy.can_view(auth.id()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let comment = comments::create(&state.pool, card.id, &auth.0, body.text.trim()).await?;

    activities::record(
        &state.pool,
        card.id,
        auth.id(),
        ActivityKind::CommentAdded,
        &format!("Added a comment to \"{}\"", card.title),
        json!({}),
    )
    .await?;

    Ok(ApiResponse::created(
        "Comment added successfully",
        json!({ "comment": comment }),
    ))
}
