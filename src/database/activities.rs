use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

/// What happened to a card, for the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    CardCreated,
    CardUpdated,
    CardMoved,
    CommentAdded,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::CardCreated => "card_created",
            ActivityKind::CardUpdated => "card_updated",
            ActivityKind::CardMoved => "card_moved",
            ActivityKind::CommentAdded => "comment_added",
        }
    }
}

/// Append one entry to a card's activity log.
pub async fn record(
    pool: &PgPool,
    card_id: Uuid,
    user_id: Uuid,
    kind: ActivityKind,
    description: &str,
    metadata: Value,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO activities (id, card_id, user_id, kind, description, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(card_id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(description)
    .bind(sqlx::types::Json(metadata))
    .execute(pool)
    .await?;

    Ok(())
}
