use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{User, UserStats, UserSummary};
use super::StoreResult;

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn exists_by_email(pool: &PgPool, email: &str) -> StoreResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Whether another user already holds this email.
pub async fn email_taken_by_other(pool: &PgPool, email: &str, user_id: Uuid) -> StoreResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
    )
    .bind(email)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn summary_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Option<UserSummary>> {
    let summary =
        sqlx::query_as::<_, UserSummary>("SELECT id, name, email, avatar FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(summary)
}

/// Untouched fields stay as they are.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    avatar: Option<&str>,
) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET \
             name = COALESCE($2, name), \
             email = COALESCE($3, email), \
             avatar = COALESCE($4, avatar), \
             updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(avatar)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Shallow-merge the given keys into the stored preferences object.
pub async fn update_preferences(
    pool: &PgPool,
    id: Uuid,
    patch: &Value,
) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET preferences = preferences || $2::jsonb, updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(sqlx::types::Json(patch))
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Case-insensitive email search, excluding the caller, capped at 10 rows.
pub async fn search_by_email(
    pool: &PgPool,
    fragment: &str,
    exclude: Uuid,
) -> StoreResult<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, email, avatar FROM users \
         WHERE email ILIKE '%' || $1 || '%' AND id <> $2 \
         ORDER BY email LIMIT 10",
    )
    .bind(fragment)
    .bind(exclude)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn stats(pool: &PgPool, user_id: Uuid) -> StoreResult<UserStats> {
    let owned_boards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards WHERE owner_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let member_boards: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM board_members m \
         JOIN boards b ON b.id = m.board_id \
         WHERE m.user_id = $1 AND b.owner_id <> $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let assigned_cards: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM card_members WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let overdue_cards: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM card_members m \
         JOIN cards c ON c.id = m.card_id \
         WHERE m.user_id = $1 AND c.due_date < now() AND NOT c.completed",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let completed_cards: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM card_members m \
         JOIN cards c ON c.id = m.card_id \
         WHERE m.user_id = $1 AND c.completed",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(UserStats {
        total_boards: owned_boards + member_boards,
        owned_boards,
        member_boards,
        assigned_cards,
        overdue_cards,
        completed_cards,
    })
}
