pub mod auth;
pub mod boards;
pub mod cards;
pub mod lists;
pub mod users;

use sqlx::PgPool;

use crate::database::boards as board_store;
use crate::database::models::Board;
use crate::error::ApiError;
use crate::services::access::BoardPolicy;

/// Load the board's membership rows and build the per-request access policy.
/// Roles are always derived from freshly loaded rows, never from the request.
pub(crate) async fn policy_for(pool: &PgPool, board: &Board) -> Result<BoardPolicy, ApiError> {
    let members = board_store::members(pool, board.id).await?;
    Ok(BoardPolicy::new(
        board,
        members.into_iter().map(|m| (m.user_id, m.role)).collect(),
    ))
}
