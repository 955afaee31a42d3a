//! teloxide types → `tally-core` types.

use teloxide::types::{ChatMemberKind, ChatMemberUpdated, Message, User};

use tally_core::{
    domain::{ChatId, MemberStatus, MessageId, MessageRef, UserId, UserProfile},
    errors::Error,
    messaging::types::{MembershipChange, TextMessage},
    Result,
};

/// Telegram user ids are unsigned but fit in 52 bits; the store keeps `i64`.
pub fn user_id_from(id: teloxide::types::UserId) -> Result<UserId> {
    i64::try_from(id.0)
        .map(UserId)
        .map_err(|_| Error::External(format!("user id {} out of range", id.0)))
}

pub fn profile_from(user: &User) -> Result<UserProfile> {
    Ok(UserProfile {
        id: user_id_from(user.id)?,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    })
}

pub fn status_from(kind: &ChatMemberKind) -> MemberStatus {
    match kind {
        ChatMemberKind::Owner(_) => MemberStatus::Creator,
        ChatMemberKind::Administrator(_) => MemberStatus::Administrator,
        ChatMemberKind::Member => MemberStatus::Member,
        ChatMemberKind::Restricted(_) => MemberStatus::Restricted,
        ChatMemberKind::Left => MemberStatus::Left,
        ChatMemberKind::Banned(_) => MemberStatus::Kicked,
    }
}

/// The new status reported by a chat-member update.
pub fn change_from(update: &ChatMemberUpdated) -> Result<MembershipChange> {
    Ok(MembershipChange {
        chat_id: ChatId(update.chat.id.0),
        user: profile_from(&update.new_chat_member.user)?,
        status: status_from(&update.new_chat_member.kind),
    })
}

pub fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

/// Text messages only; `None` for media and service messages.
pub fn text_message(msg: &Message) -> Result<Option<TextMessage>> {
    if msg.text().is_none() {
        return Ok(None);
    }
    Ok(Some(TextMessage {
        message: message_ref(msg),
        from: msg.from().map(profile_from).transpose()?,
        reply_to: msg.reply_to_message().map(message_ref),
    }))
}
