//! Board access control.
//!
//! Every mutating endpoint re-derives the caller's role from the freshly
//! loaded board and membership rows; nothing is cached from the request.

use uuid::Uuid;

use crate::database::models::{Board, Role};

/// Snapshot of who may do what on one board, built per-request from the
/// board row and its membership rows.
#[derive(Debug, Clone)]
pub struct BoardPolicy {
    owner: Uuid,
    is_private: bool,
    members: Vec<(Uuid, Role)>,
}

impl BoardPolicy {
    pub fn new(board: &Board, members: Vec<(Uuid, Role)>) -> Self {
        Self {
            owner: board.owner_id,
            is_private: board.is_private,
            members,
        }
    }

    /// owner if the board is theirs, else the recorded membership role,
    /// else none.
    pub fn role_for(&self, user: Uuid) -> Option<Role> {
        if self.owner == user {
            return Some(Role::Owner);
        }
        self.members
            .iter()
            .find(|(id, _)| *id == user)
            .map(|(_, role)| *role)
    }

    /// Board access: owner or member, or any authenticated user when the
    /// board is not private.
    pub fn can_view(&self, user: Uuid) -> bool {
        !self.is_private || self.role_for(user).is_some()
    }

    /// Admin access: gates board edits and membership changes.
    pub fn can_admin(&self, user: Uuid) -> bool {
        matches!(self.role_for(user), Some(Role::Owner | Role::Admin))
    }

    /// Content access: gates create/edit/move/delete of lists and cards.
    pub fn can_edit_content(&self, user: Uuid) -> bool {
        matches!(
            self.role_for(user),
            Some(Role::Owner | Role::Admin | Role::Editor)
        )
    }

    pub fn is_owner(&self, user: Uuid) -> bool {
        self.owner == user
    }

    pub fn is_member(&self, user: Uuid) -> bool {
        self.members.iter().any(|(id, _)| *id == user)
    }
}
