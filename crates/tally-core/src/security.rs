use crate::{
    domain::{ChatId, UserId},
    messaging::port::ChatDirectory,
};

// ============== Admin Authorization ==============

/// Result of checking whether a user may run an admin-only command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminCheck {
    /// The user is an administrator or the creator of the chat.
    Allowed,
    /// The platform reported a non-admin role.
    Denied,
    /// The role lookup failed; callers stop without replying.
    Unavailable,
}

pub async fn check_admin(
    directory: &dyn ChatDirectory,
    chat_id: ChatId,
    user_id: UserId,
) -> AdminCheck {
    match directory.member_status(chat_id, user_id).await {
        Ok(status) if status.is_admin() => AdminCheck::Allowed,
        Ok(_) => AdminCheck::Denied,
        Err(e) => {
            tracing::debug!(chat_id = chat_id.0, user_id = user_id.0, "role lookup failed: {e}");
            AdminCheck::Unavailable
        }
    }
}
