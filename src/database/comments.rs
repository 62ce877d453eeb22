use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Comment, CommentView, Ref, User};
use super::StoreResult;

/// Insert a comment and return it with its author resolved.
pub async fn create(
    pool: &PgPool,
    card_id: Uuid,
    author: &User,
    text: &str,
) -> StoreResult<CommentView> {
    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (id, card_id, author_id, text) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(card_id)
    .bind(author.id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    Ok(CommentView {
        id: comment.id,
        card_id: comment.card_id,
        text: comment.text,
        author: Ref::Resolved(author.summary()),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    })
}
