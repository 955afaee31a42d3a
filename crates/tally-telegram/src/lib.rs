//! Telegram adapter (teloxide).
//!
//! This crate implements the `tally-core` ports over the Telegram Bot API and
//! wires the dispatcher for both bots.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

pub mod convert;
pub mod handlers;
pub mod router;

use tally_core::{
    domain::{ChatId, MemberStatus, MessageId, MessageRef, UserId, UserProfile},
    errors::Error,
    messaging::{
        port::{ChatDirectory, MessagingPort},
        types::{OutgoingMessage, TextFormat},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_user(user_id: UserId) -> Result<teloxide::types::UserId> {
        u64::try_from(user_id.0)
            .map(teloxide::types::UserId)
            .map_err(|_| Error::External(format!("invalid user id {}", user_id.0)))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send(&self, chat_id: ChatId, msg: OutgoingMessage) -> Result<MessageRef> {
        let mut req = self.bot.send_message(Self::tg_chat(chat_id), msg.text);
        if msg.format == TextFormat::Html {
            req = req.parse_mode(ParseMode::Html);
        }
        if msg.disable_link_preview {
            req = req.disable_web_page_preview(true);
        }
        if let Some(id) = msg.reply_to {
            req = req.reply_to_message_id(Self::tg_msg_id(id));
        }
        let sent = req.await.map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.id.0),
        })
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(
                Self::tg_chat(msg.chat_id),
                Self::tg_msg_id(msg.message_id),
                text.to_string(),
            )
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn pin(&self, msg: MessageRef) -> Result<()> {
        self.bot
            .pin_chat_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

#[async_trait]
impl ChatDirectory for TelegramMessenger {
    async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberStatus> {
        let member = self
            .bot
            .get_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id)?)
            .await
            .map_err(Self::map_err)?;
        Ok(convert::status_from(&member.kind))
    }

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserProfile>> {
        let admins = self
            .bot
            .get_chat_administrators(Self::tg_chat(chat_id))
            .await
            .map_err(Self::map_err)?;
        admins
            .iter()
            .map(|m| convert::profile_from(&m.user))
            .collect()
    }
}
