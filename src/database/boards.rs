use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::cards;
use super::models::list::ListView;
use super::models::{Board, BoardMemberView, BoardView, NewBoard, Ref, Role, UpdateBoard, UserSummary};
use super::StoreResult;

/// Membership row with its user resolved.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(FromRow)]
struct MemberRow {
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
    name: String,
    email: String,
    avatar: Option<String>,
}

impl From<MemberRow> for MemberRecord {
    fn from(row: MemberRow) -> Self {
        MemberRecord {
            user_id: row.user_id,
            // unknown stored roles degrade to least privilege
            role: Role::parse_member(&row.role).unwrap_or(Role::Viewer),
            joined_at: row.joined_at,
            user: UserSummary {
                id: row.user_id,
                name: row.name,
                email: row.email,
                avatar: row.avatar,
            },
        }
    }
}

impl MemberRecord {
    pub fn into_view(self) -> BoardMemberView {
        BoardMemberView {
            user: Ref::Resolved(self.user),
            role: self.role,
            joined_at: self.joined_at,
        }
    }
}

pub async fn find(pool: &PgPool, id: Uuid) -> StoreResult<Option<Board>> {
    let board = sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(board)
}

pub async fn members(pool: &PgPool, board_id: Uuid) -> StoreResult<Vec<MemberRecord>> {
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT m.user_id, m.role, m.joined_at, u.name, u.email, u.avatar \
         FROM board_members m JOIN users u ON u.id = m.user_id \
         WHERE m.board_id = $1 ORDER BY m.joined_at",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Create the board and record the owner as an admin member in one
/// transaction.
pub async fn create(pool: &PgPool, owner_id: Uuid, new: NewBoard) -> StoreResult<Board> {
    let mut tx = pool.begin().await?;

    let board = sqlx::query_as::<_, Board>(
        "INSERT INTO boards (id, title, description, owner_id, background, is_private, is_starred) \
         VALUES ($1, $2, $3, $4, COALESCE($5, '#0079bf'), COALESCE($6, TRUE), COALESCE($7, FALSE)) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&new.title)
    .bind(&new.description)
    .bind(owner_id)
    .bind(&new.background)
    .bind(new.is_private)
    .bind(new.is_starred)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES ($1, $2, 'admin')")
        .bind(board.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(board)
}

pub async fn update(pool: &PgPool, id: Uuid, changes: UpdateBoard) -> StoreResult<Option<Board>> {
    let board = sqlx::query_as::<_, Board>(
        "UPDATE boards SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             background = COALESCE($4, background), \
             is_private = COALESCE($5, is_private), \
             is_starred = COALESCE($6, is_starred), \
             updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.background)
    .bind(changes.is_private)
    .bind(changes.is_starred)
    .fetch_optional(pool)
    .await?;

    Ok(board)
}

/// Cascading foreign keys take the board's lists, cards, comments and
/// activities down with it.
pub async fn delete(pool: &PgPool, id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_member(pool: &PgPool, board_id: Uuid, user_id: Uuid, role: Role) -> StoreResult<()> {
    sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(board_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_member(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Boards the user owns or belongs to, most recently updated first, with
/// owner, members and lists resolved (cards omitted at this level).
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<BoardView>> {
    let boards = sqlx::query_as::<_, Board>(
        "SELECT DISTINCT b.* FROM boards b \
         LEFT JOIN board_members m ON m.board_id = b.id \
         WHERE b.owner_id = $1 OR m.user_id = $1 \
         ORDER BY b.updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut views = Vec::with_capacity(boards.len());
    for board in boards {
        views.push(view(pool, board, false).await?);
    }
    Ok(views)
}

/// Resolve one board into its API view. When `with_cards` is set the lists
/// carry their cards (ordered, with members and comments); otherwise the
/// lists come back empty-handed.
pub async fn view(pool: &PgPool, board: Board, with_cards: bool) -> StoreResult<BoardView> {
    let owner = super::users::summary_by_id(pool, board.owner_id)
        .await?
        .map_or(Ref::Unresolved(board.owner_id), Ref::Resolved);

    let members = members(pool, board.id)
        .await?
        .into_iter()
        .map(MemberRecord::into_view)
        .collect();

    let list_rows = super::lists::by_board(pool, board.id).await?;

    let mut cards_by_list: HashMap<Uuid, Vec<_>> = HashMap::new();
    if with_cards {
        for card in cards::views_by_board(pool, board.id).await? {
            cards_by_list.entry(card.list_id).or_default().push(card);
        }
    }

    let lists = list_rows
        .into_iter()
        .map(|row| {
            let cards = cards_by_list.remove(&row.id).unwrap_or_default();
            ListView::from_row(row, cards)
        })
        .collect();

    Ok(BoardView {
        id: board.id,
        title: board.title,
        description: board.description,
        background: board.background,
        is_private: board.is_private,
        is_starred: board.is_starred,
        owner,
        members,
        lists,
        created_at: board.created_at,
        updated_at: board.updated_at,
    })
}
