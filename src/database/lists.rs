use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use super::cards;
use super::models::list::ListView;
use super::models::List;
use super::StoreResult;
use crate::services::ordering;

pub async fn find(pool: &PgPool, id: Uuid) -> StoreResult<Option<List>> {
    let list = sqlx::query_as::<_, List>("SELECT * FROM lists WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(list)
}

pub async fn by_board(pool: &PgPool, board_id: Uuid) -> StoreResult<Vec<List>> {
    let lists =
        sqlx::query_as::<_, List>("SELECT * FROM lists WHERE board_id = $1 ORDER BY position")
            .bind(board_id)
            .fetch_all(pool)
            .await?;
    Ok(lists)
}

/// Lists of a board with their cards resolved, both ordered by position.
pub async fn views_by_board(pool: &PgPool, board_id: Uuid) -> StoreResult<Vec<ListView>> {
    let rows = by_board(pool, board_id).await?;

    let mut cards_by_list: HashMap<Uuid, Vec<_>> = HashMap::new();
    for card in cards::views_by_board(pool, board_id).await? {
        cards_by_list.entry(card.list_id).or_default().push(card);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let cards = cards_by_list.remove(&row.id).unwrap_or_default();
            ListView::from_row(row, cards)
        })
        .collect())
}

/// Append a list at the end of the board's ordering.
pub async fn create(pool: &PgPool, board_id: Uuid, title: &str) -> StoreResult<List> {
    let list = sqlx::query_as::<_, List>(
        "INSERT INTO lists (id, board_id, title, position) \
         VALUES ($1, $2, $3, (SELECT COALESCE(MAX(position) + 1, 0) FROM lists WHERE board_id = $2)) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(board_id)
    .bind(title)
    .fetch_one(pool)
    .await?;

    Ok(list)
}

pub async fn rename(pool: &PgPool, id: Uuid, title: &str) -> StoreResult<Option<List>> {
    let list = sqlx::query_as::<_, List>(
        "UPDATE lists SET title = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .fetch_optional(pool)
    .await?;
    Ok(list)
}

/// Move a list to a new position within its board. Siblings between the old
/// and new slots shift by one inside the same transaction, so the board's
/// positions stay contiguous.
pub async fn reorder(pool: &PgPool, list: &List, new_position: i32) -> StoreResult<List> {
    let mut tx = pool.begin().await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lists WHERE board_id = $1")
        .bind(list.board_id)
        .fetch_one(&mut *tx)
        .await?;
    let target = new_position.min((count as i32 - 1).max(0));

    if let Some((lo, hi, delta)) = ordering::reorder_window(list.position, target) {
        sqlx::query(
            "UPDATE lists SET position = position + $1, updated_at = now() \
             WHERE board_id = $2 AND position BETWEEN $3 AND $4 AND id <> $5",
        )
        .bind(delta)
        .bind(list.board_id)
        .bind(lo)
        .bind(hi)
        .bind(list.id)
        .execute(&mut *tx)
        .await?;
    }

    let updated = sqlx::query_as::<_, List>(
        "UPDATE lists SET position = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(list.id)
    .bind(target)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Delete a list (its cards and their comments cascade) and close the gap it
/// leaves in the board's ordering.
pub async fn delete(pool: &PgPool, list: &List) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(list.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE lists SET position = position - 1 WHERE board_id = $1 AND position > $2",
    )
    .bind(list.board_id)
    .bind(list.position)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
