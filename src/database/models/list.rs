use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::card::CardView;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List with its cards resolved and ordered by position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
    pub cards: Vec<CardView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListView {
    pub fn from_row(list: List, cards: Vec<CardView>) -> Self {
        Self {
            id: list.id,
            board_id: list.board_id,
            title: list.title,
            position: list.position,
            cards,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

/// Minimal `{ id, title }` projection used by card search results.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ListSummary {
    pub id: Uuid,
    pub title: String,
}
