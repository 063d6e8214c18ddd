//! Visibility rule for moderated content.
//!
//! Pending (unapproved) topics and replies exist only for their owner and
//! for admins; everyone else gets the same answer as for a missing id, so
//! hidden content never leaks through error responses.

use crate::middleware::auth::AuthUser;

/// Who is looking. Anonymous viewers have no user id and no admin bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<i32>,
    pub is_admin: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_owner(&self, owner_id: i32) -> bool {
        self.user_id == Some(owner_id)
    }
}

impl From<&AuthUser> for Viewer {
    fn from(auth: &AuthUser) -> Self {
        Self {
            user_id: Some(auth.user_id),
            is_admin: auth.is_admin(),
        }
    }
}

impl From<Option<&AuthUser>> for Viewer {
    fn from(auth: Option<&AuthUser>) -> Self {
        auth.map(Viewer::from).unwrap_or_default()
    }
}

/// Approved content is public. Pending content is visible only to its
/// owner and to admins.
pub fn can_view(is_approved: bool, owner_id: i32, viewer: Viewer) -> bool {
    is_approved || viewer.is_owner(owner_id) || viewer.is_admin
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: i32 = 10;

    fn anonymous() -> Viewer {
        Viewer::anonymous()
    }

    fn owner() -> Viewer {
        Viewer {
            user_id: Some(OWNER),
            is_admin: false,
        }
    }

    fn other_user() -> Viewer {
        Viewer {
            user_id: Some(99),
            is_admin: false,
        }
    }

    fn admin() -> Viewer {
        Viewer {
            user_id: Some(1),
            is_admin: true,
        }
    }

    #[test]
    fn approved_content_visible_to_everyone() {
        for viewer in [anonymous(), owner(), other_user(), admin()] {
            assert!(can_view(true, OWNER, viewer));
        }
    }

    #[test]
    fn pending_content_visible_to_owner() {
        assert!(can_view(false, OWNER, owner()));
    }

    #[test]
    fn pending_content_visible_to_admin() {
        assert!(can_view(false, OWNER, admin()));
    }

    #[test]
    fn pending_content_hidden_from_other_users() {
        assert!(!can_view(false, OWNER, other_user()));
    }

    #[test]
    fn pending_content_hidden_from_anonymous() {
        assert!(!can_view(false, OWNER, anonymous()));
    }

    #[test]
    fn anonymous_viewer_is_never_owner() {
        assert!(!anonymous().is_owner(OWNER));
    }
}
