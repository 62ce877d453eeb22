use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use super::models::board::BoardSummary;
use super::models::list::ListSummary;
use super::models::{
    Card, CardSearchView, CardView, CommentView, Label, List, NewCard, Ref, UpdateCard, UserSummary,
};
use super::StoreResult;

pub async fn find(pool: &PgPool, id: Uuid) -> StoreResult<Option<Card>> {
    let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(card)
}

pub async fn views_by_list(pool: &PgPool, list_id: Uuid) -> StoreResult<Vec<CardView>> {
    let rows =
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE list_id = $1 ORDER BY position")
            .bind(list_id)
            .fetch_all(pool)
            .await?;
    attach_views(pool, rows).await
}

pub async fn views_by_board(pool: &PgPool, board_id: Uuid) -> StoreResult<Vec<CardView>> {
    let rows = sqlx::query_as::<_, Card>(
        "SELECT * FROM cards WHERE board_id = $1 ORDER BY list_id, position",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;
    attach_views(pool, rows).await
}

pub async fn view(pool: &PgPool, card: Card) -> StoreResult<CardView> {
    let mut views = attach_views(pool, vec![card]).await?;
    Ok(views.remove(0))
}

#[derive(FromRow)]
struct CardMemberRow {
    card_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
    avatar: Option<String>,
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    card_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    name: String,
    email: String,
    avatar: Option<String>,
}

/// Resolve members and comments for a batch of cards in two queries,
/// preserving the incoming card order.
async fn attach_views(pool: &PgPool, cards: Vec<Card>) -> StoreResult<Vec<CardView>> {
    if cards.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = cards.iter().map(|c| c.id).collect();

    let member_rows = sqlx::query_as::<_, CardMemberRow>(
        "SELECT cm.card_id, u.id, u.name, u.email, u.avatar \
         FROM card_members cm JOIN users u ON u.id = cm.user_id \
         WHERE cm.card_id = ANY($1) ORDER BY u.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let comment_rows = sqlx::query_as::<_, CommentRow>(
        "SELECT c.id, c.card_id, c.text, c.created_at, c.updated_at, \
                u.id AS author_id, u.name, u.email, u.avatar \
         FROM comments c JOIN users u ON u.id = c.author_id \
         WHERE c.card_id = ANY($1) ORDER BY c.created_at",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut members: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    for row in member_rows {
        members.entry(row.card_id).or_default().push(UserSummary {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
        });
    }

    let mut comments: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for row in comment_rows {
        comments.entry(row.card_id).or_default().push(CommentView {
            id: row.id,
            card_id: row.card_id,
            text: row.text,
            author: Ref::Resolved(UserSummary {
                id: row.author_id,
                name: row.name,
                email: row.email,
                avatar: row.avatar,
            }),
            created_at: row.created_at,
            updated_at: row.updated_at,
        });
    }

    Ok(cards
        .into_iter()
        .map(|card| {
            let m = members.remove(&card.id).unwrap_or_default();
            let c = comments.remove(&card.id).unwrap_or_default();
            card.into_view(m, c)
        })
        .collect())
}

/// Append a card at the end of the list's ordering.
pub async fn create(pool: &PgPool, list: &List, new: NewCard) -> StoreResult<Card> {
    let card = sqlx::query_as::<_, Card>(
        "INSERT INTO cards (id, list_id, board_id, title, description, position, due_date, labels) \
         VALUES ($1, $2, $3, $4, $5, \
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM cards WHERE list_id = $2), $6, $7) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(list.id)
    .bind(list.board_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.due_date)
    .bind(Json(new.labels))
    .fetch_one(pool)
    .await?;

    Ok(card)
}

pub async fn update(pool: &PgPool, id: Uuid, changes: UpdateCard) -> StoreResult<Option<Card>> {
    let mut tx = pool.begin().await?;

    let card = sqlx::query_as::<_, Card>(
        "UPDATE cards SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             due_date = COALESCE($4, due_date), \
             labels = COALESCE($5, labels), \
             completed = COALESCE($6, completed), \
             updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.due_date)
    .bind(changes.labels.map(Json))
    .bind(changes.completed)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(card) = card else {
        return Ok(None);
    };

    if let Some(member_ids) = changes.members {
        sqlx::query("DELETE FROM card_members WHERE card_id = $1")
            .bind(card.id)
            .execute(&mut *tx)
            .await?;
        for user_id in member_ids {
            sqlx::query(
                "INSERT INTO card_members (card_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(card.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(Some(card))
}

/// Move a card to `requested` position in the destination list, within or
/// across lists. The source collection closes the gap, the destination opens
/// one, and the card is re-pointed, all in one transaction. The requested
/// position is clamped so the destination stays contiguous.
pub async fn move_to(
    pool: &PgPool,
    card: &Card,
    dest: &List,
    requested: i32,
) -> StoreResult<Card> {
    let mut tx = pool.begin().await?;

    let dest_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE list_id = $1")
        .bind(dest.id)
        .fetch_one(&mut *tx)
        .await?;
    let max_position = if dest.id == card.list_id {
        (dest_count as i32 - 1).max(0)
    } else {
        dest_count as i32
    };
    let position = requested.clamp(0, max_position);

    // Close the gap in the source list.
    sqlx::query("UPDATE cards SET position = position - 1 WHERE list_id = $1 AND position > $2")
        .bind(card.list_id)
        .bind(card.position)
        .execute(&mut *tx)
        .await?;

    // Open a slot in the destination. In the same-list case the moved card
    // may be shifted here too; its final position is written below.
    sqlx::query("UPDATE cards SET position = position + 1 WHERE list_id = $1 AND position >= $2")
        .bind(dest.id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

    let moved = sqlx::query_as::<_, Card>(
        "UPDATE cards SET list_id = $2, board_id = $3, position = $4, updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(card.id)
    .bind(dest.id)
    .bind(dest.board_id)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(moved)
}

/// Delete a card (comments and activities cascade) and close the gap it
/// leaves in its list.
pub async fn delete(pool: &PgPool, card: &Card) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM cards WHERE id = $1")
        .bind(card.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE cards SET position = position - 1 WHERE list_id = $1 AND position > $2")
        .bind(card.list_id)
        .bind(card.position)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Filters for the cross-board card search.
#[derive(Debug, Clone, Default)]
pub struct CardSearch {
    pub text: Option<String>,
    pub board_id: Option<Uuid>,
    pub label: Option<String>,
    pub due_on: Option<NaiveDate>,
}

#[derive(FromRow)]
struct SearchRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    position: i32,
    due_date: Option<DateTime<Utc>>,
    labels: Json<Vec<Label>>,
    completed: bool,
    updated_at: DateTime<Utc>,
    list_id: Uuid,
    list_title: String,
    board_id: Uuid,
    board_title: String,
}

/// Search cards across every board the user can see (owned or joined),
/// newest activity first.
pub async fn search(
    pool: &PgPool,
    user_id: Uuid,
    filters: &CardSearch,
) -> StoreResult<Vec<CardSearchView>> {
    let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
        "SELECT c.id, c.title, c.description, c.position, c.due_date, c.labels, c.completed, \
                c.updated_at, l.id AS list_id, l.title AS list_title, \
                b.id AS board_id, b.title AS board_title \
         FROM cards c \
         JOIN lists l ON l.id = c.list_id \
         JOIN boards b ON b.id = c.board_id \
         WHERE c.board_id IN ( \
             SELECT b2.id FROM boards b2 \
             LEFT JOIN board_members m ON m.board_id = b2.id \
             WHERE b2.owner_id = ",
    );
    qb.push_bind(user_id);
    qb.push(" OR m.user_id = ");
    qb.push_bind(user_id);
    qb.push(")");

    if let Some(text) = &filters.text {
        let pattern = format!("%{}%", text);
        qb.push(" AND (c.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR c.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(board_id) = filters.board_id {
        qb.push(" AND c.board_id = ");
        qb.push_bind(board_id);
    }

    if let Some(label) = &filters.label {
        qb.push(
            " AND EXISTS (SELECT 1 FROM jsonb_array_elements(c.labels) lab \
              WHERE lab->>'name' ILIKE ",
        );
        qb.push_bind(format!("%{}%", label));
        qb.push(")");
    }

    if let Some(day) = filters.due_on {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);
        qb.push(" AND c.due_date >= ");
        qb.push_bind(start);
        qb.push(" AND c.due_date < ");
        qb.push_bind(end);
    }

    qb.push(" ORDER BY c.updated_at DESC");

    let rows: Vec<SearchRow> = qb.build_query_as().fetch_all(pool).await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut members: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    if !ids.is_empty() {
        let member_rows = sqlx::query_as::<_, CardMemberRow>(
            "SELECT cm.card_id, u.id, u.name, u.email, u.avatar \
             FROM card_members cm JOIN users u ON u.id = cm.user_id \
             WHERE cm.card_id = ANY($1) ORDER BY u.name",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for row in member_rows {
            members.entry(row.card_id).or_default().push(UserSummary {
                id: row.id,
                name: row.name,
                email: row.email,
                avatar: row.avatar,
            });
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| CardSearchView {
            id: row.id,
            title: row.title,
            description: row.description,
            position: row.position,
            due_date: row.due_date,
            labels: row.labels.0,
            completed: row.completed,
            list: Ref::Resolved(ListSummary {
                id: row.list_id,
                title: row.list_title,
            }),
            board: Ref::Resolved(BoardSummary {
                id: row.board_id,
                title: row.board_title,
            }),
            members: members.remove(&row.id).unwrap_or_default(),
            updated_at: row.updated_at,
        })
        .collect())
}
