use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod board;
pub mod card;
pub mod comment;
pub mod list;
pub mod user;

pub use board::{Board, BoardMemberView, BoardSummary, BoardView, NewBoard, UpdateBoard};
pub use card::{Card, CardSearchView, CardView, Label, NewCard, UpdateCard};
pub use comment::{Comment, CommentView};
pub use list::{List, ListView};
pub use user::{User, UserProfile, UserStats, UserSummary};

/// Board-scoped role. `Owner` is derived from `boards.owner_id` and never
/// stored in the membership table; the other three are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Parse a stored membership role. Owner is not a valid stored role.
    pub fn parse_member(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// A reference field that is returned either as a bare id or as an embedded
/// document, made explicit instead of duck-typed. Store rows always hold the
/// id; views resolve to the embedded form at the data-access boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Unresolved(Uuid),
    Resolved(T),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_roles_round_trip() {
        for role in [Role::Admin, Role::Editor, Role::Viewer] {
            assert_eq!(Role::parse_member(role.as_str()), Some(role));
        }
    }

    #[test]
    fn owner_is_not_a_stored_role() {
        assert_eq!(Role::parse_member("owner"), None);
        assert_eq!(Role::parse_member("superuser"), None);
    }

    #[test]
    fn unresolved_ref_serializes_as_bare_id() {
        let id = Uuid::new_v4();
        let r: Ref<UserSummary> = Ref::Unresolved(id);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            serde_json::Value::String(id.to_string())
        );
    }

    #[test]
    fn resolved_ref_serializes_as_object() {
        let summary = UserSummary {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: None,
        };
        let r: Ref<UserSummary> = Ref::Resolved(summary);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["name"], "Ada");
    }
}
