use async_trait::async_trait;

use crate::{
    domain::{ChatId, MemberStatus, MessageRef, UserId, UserProfile},
    messaging::types::OutgoingMessage,
    Result,
};

/// Outbound messaging operations.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(&self, chat_id: ChatId, msg: OutgoingMessage) -> Result<MessageRef>;
    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;
    async fn pin(&self, msg: MessageRef) -> Result<()>;
}

/// Chat membership lookups answered by the platform.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberStatus>;
    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserProfile>>;
}
