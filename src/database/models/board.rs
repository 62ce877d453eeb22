use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::list::ListView;
use super::user::UserSummary;
use super::{Ref, Role};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub background: String,
    pub is_private: bool,
    pub is_starred: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a board.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub title: String,
    pub description: Option<String>,
    pub background: Option<String>,
    pub is_private: Option<bool>,
    pub is_starred: Option<bool>,
}

/// Fields accepted when updating a board; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub background: Option<String>,
    pub is_private: Option<bool>,
    pub is_starred: Option<bool>,
}

/// One membership row with its user resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMemberView {
    pub user: Ref<UserSummary>,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// Board with owner and members resolved; lists carry no cards here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub background: String,
    pub is_private: bool,
    pub is_starred: bool,
    pub owner: Ref<UserSummary>,
    pub members: Vec<BoardMemberView>,
    pub lists: Vec<ListView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal `{ id, title }` projection used by card search results.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardSummary {
    pub id: Uuid,
    pub title: String,
}
