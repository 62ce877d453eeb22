use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::board::BoardSummary;
use super::comment::CommentView;
use super::list::ListSummary;
use super::user::UserSummary;
use super::Ref;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Card {
    pub id: Uuid,
    pub list_id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Json<Vec<Label>>,
    pub completed: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn into_view(self, members: Vec<UserSummary>, comments: Vec<CommentView>) -> CardView {
        CardView {
            id: self.id,
            list_id: self.list_id,
            board_id: self.board_id,
            title: self.title,
            description: self.description,
            position: self.position,
            due_date: self.due_date,
            labels: self.labels.0,
            completed: self.completed,
            members,
            comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Option<Vec<Label>>,
    pub completed: Option<bool>,
    /// Replaces the full assignee set when present.
    pub members: Option<Vec<Uuid>>,
}

/// Card with members and comments resolved, as embedded under a list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: Uuid,
    pub list_id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    pub completed: bool,
    pub members: Vec<UserSummary>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search hit: the card plus `{ id, title }` projections of its list and
/// board so the client can show where it lives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSearchView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    pub completed: bool,
    pub list: Ref<ListSummary>,
    pub board: Ref<BoardSummary>,
    pub members: Vec<UserSummary>,
    pub updated_at: DateTime<Utc>,
}
