//! Sign-up list kept in a single pinned message.
//!
//! Replies to the tracked message are appended (duplicates allowed) and the
//! message is edited in place to show the full list. State lives in memory
//! only; a new `/start` replaces it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{MessageRef, UserId},
    errors::BestEffort,
    messaging::{
        port::MessagingPort,
        types::{Command, OutgoingMessage, TextMessage},
    },
    Result,
};

pub const PROMPT_TEXT: &str = "Reply to this message to add yourself to the list.";
pub const TRACKING_TEXT: &str = "Tracked list message set (in-memory).";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListEntry {
    pub index: u32,
    pub user_id: UserId,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TrackedList {
    message: MessageRef,
    next_index: u32,
    entries: Vec<ListEntry>,
}

impl TrackedList {
    pub fn new(message: MessageRef) -> Self {
        Self {
            message,
            next_index: 1,
            entries: Vec::new(),
        }
    }

    pub fn message(&self) -> MessageRef {
        self.message
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn is_tracking(&self, target: MessageRef) -> bool {
        self.message == target
    }

    pub fn append(&mut self, user_id: UserId, name: String) -> &ListEntry {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.push(ListEntry {
            index,
            user_id,
            name,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "Current list: (empty)".to_string();
        }
        let lines = self
            .entries
            .iter()
            .map(|e| format!("{}. {}", e.index, e.name))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Current list:\n{lines}")
    }
}

pub struct SignupBoard {
    messenger: Arc<dyn MessagingPort>,
    slot: Mutex<Option<TrackedList>>,
}

impl SignupBoard {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            messenger,
            slot: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Option<TrackedList> {
        self.slot.lock().await.clone()
    }

    /// Post a new prompt, try to pin it and start tracking it with an empty list.
    pub async fn start(&self, cmd: &Command) -> Result<MessageRef> {
        let chat_id = cmd.chat_id();
        let prompt = self
            .messenger
            .send(
                chat_id,
                OutgoingMessage::plain(PROMPT_TEXT).reply_to(cmd.message.message_id),
            )
            .await?;

        // The bot may lack pin rights.
        let pinned: BestEffort<()> = self.messenger.pin(prompt).await.into();
        if let BestEffort::Skipped(e) = pinned {
            tracing::debug!(chat_id = chat_id.0, "pin skipped: {e}");
        }

        *self.slot.lock().await = Some(TrackedList::new(prompt));
        tracing::info!(
            chat_id = chat_id.0,
            message_id = prompt.message_id.0,
            "tracking new list"
        );

        self.messenger
            .send(
                chat_id,
                OutgoingMessage::plain(TRACKING_TEXT).reply_to(cmd.message.message_id),
            )
            .await?;
        Ok(prompt)
    }

    /// Append the sender of a reply to the tracked message and refresh it.
    ///
    /// Returns `false` when the message is not a reply to the tracked message.
    pub async fn handle_reply(&self, msg: &TextMessage) -> Result<bool> {
        let Some(target) = msg.reply_to else {
            return Ok(false);
        };
        let Some(from) = msg.from.as_ref() else {
            return Ok(false);
        };

        let mut slot = self.slot.lock().await;
        let Some(list) = slot.as_mut() else {
            return Ok(false);
        };
        if msg.message.chat_id != target.chat_id || !list.is_tracking(target) {
            return Ok(false);
        }

        list.append(from.id, from.list_label());
        let body = list.render();
        let tracked = list.message();

        if let Err(e) = self.messenger.edit_text(tracked, &body).await {
            tracing::warn!(
                chat_id = tracked.chat_id.0,
                message_id = tracked.message_id.0,
                "failed to edit tracked message: {e}"
            );
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId, UserProfile};
    use crate::testing::{user, FakeMessenger};

    const CHAT: ChatId = ChatId(-42);

    fn start_cmd(message_id: i32) -> Command {
        Command {
            message: MessageRef {
                chat_id: CHAT,
                message_id: MessageId(message_id),
            },
            from: user(1, "Admin"),
            name: "start".to_string(),
            addressee: None,
        }
    }

    fn reply(chat_id: ChatId, target: MessageRef, from: UserProfile) -> TextMessage {
        TextMessage {
            message: MessageRef {
                chat_id,
                message_id: MessageId(900),
            },
            from: Some(from),
            reply_to: Some(target),
        }
    }

    fn alice() -> UserProfile {
        UserProfile {
            username: Some("A".to_string()),
            ..user(10, "Alice")
        }
    }

    #[test]
    fn renders_empty_and_numbered_lists() {
        let mut list = TrackedList::new(MessageRef {
            chat_id: CHAT,
            message_id: MessageId(1),
        });
        assert_eq!(list.render(), "Current list: (empty)");
        list.append(UserId(1), "A".to_string());
        list.append(UserId(2), "B".to_string());
        assert_eq!(list.render(), "Current list:\n1. A\n2. B");
    }

    #[tokio::test]
    async fn start_posts_pins_and_resets() {
        let messenger = Arc::new(FakeMessenger::default());
        let board = SignupBoard::new(messenger.clone());

        let prompt = board.start(&start_cmd(5)).await.unwrap();

        assert_eq!(
            messenger.sent_texts(),
            vec![PROMPT_TEXT.to_string(), TRACKING_TEXT.to_string()]
        );
        assert_eq!(messenger.pins(), vec![prompt]);
        let list = board.snapshot().await.unwrap();
        assert_eq!(list.message(), prompt);
        assert!(list.entries().is_empty());
    }

    #[tokio::test]
    async fn start_survives_pin_failure() {
        let messenger = Arc::new(FakeMessenger::default());
        messenger.fail_pin();
        let board = SignupBoard::new(messenger.clone());

        let prompt = board.start(&start_cmd(5)).await.unwrap();

        assert!(messenger.pins().is_empty());
        assert_eq!(board.snapshot().await.unwrap().message(), prompt);
    }

    #[tokio::test]
    async fn replies_are_appended_without_dedup() {
        let messenger = Arc::new(FakeMessenger::default());
        let board = SignupBoard::new(messenger.clone());
        let prompt = board.start(&start_cmd(5)).await.unwrap();

        assert!(board.handle_reply(&reply(CHAT, prompt, alice())).await.unwrap());
        assert!(board.handle_reply(&reply(CHAT, prompt, alice())).await.unwrap());

        let edits = messenger.edits();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0], (prompt, "Current list:\n1. A".to_string()));
        assert_eq!(edits[1], (prompt, "Current list:\n1. A\n2. A".to_string()));
    }

    #[tokio::test]
    async fn replies_to_other_messages_are_ignored() {
        let messenger = Arc::new(FakeMessenger::default());
        let board = SignupBoard::new(messenger.clone());

        // Nothing tracked yet.
        let early = MessageRef {
            chat_id: CHAT,
            message_id: MessageId(77),
        };
        assert!(!board.handle_reply(&reply(CHAT, early, alice())).await.unwrap());

        let prompt = board.start(&start_cmd(5)).await.unwrap();
        let other = MessageRef {
            chat_id: CHAT,
            message_id: MessageId(prompt.message_id.0 + 100),
        };
        assert!(!board.handle_reply(&reply(CHAT, other, alice())).await.unwrap());

        // Same message id, different chat.
        let elsewhere = MessageRef {
            chat_id: ChatId(-7),
            message_id: prompt.message_id,
        };
        assert!(!board
            .handle_reply(&reply(ChatId(-7), elsewhere, alice()))
            .await
            .unwrap());

        let mut not_a_reply = reply(CHAT, prompt, alice());
        not_a_reply.reply_to = None;
        assert!(!board.handle_reply(&not_a_reply).await.unwrap());

        assert!(messenger.edits().is_empty());
        assert!(board.snapshot().await.unwrap().entries().is_empty());
    }

    #[tokio::test]
    async fn new_start_resets_the_list() {
        let messenger = Arc::new(FakeMessenger::default());
        let board = SignupBoard::new(messenger.clone());
        let first = board.start(&start_cmd(5)).await.unwrap();
        board.handle_reply(&reply(CHAT, first, alice())).await.unwrap();

        let second = board.start(&start_cmd(6)).await.unwrap();
        assert!(!board.handle_reply(&reply(CHAT, first, alice())).await.unwrap());
        board
            .handle_reply(&reply(CHAT, second, user(11, "Bob")))
            .await
            .unwrap();

        let list = board.snapshot().await.unwrap();
        assert_eq!(
            list.entries(),
            &[ListEntry {
                index: 1,
                user_id: UserId(11),
                name: "Bob".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn edit_failure_is_not_surfaced() {
        let messenger = Arc::new(FakeMessenger::default());
        messenger.fail_edit();
        let board = SignupBoard::new(messenger.clone());
        let prompt = board.start(&start_cmd(5)).await.unwrap();

        assert!(board.handle_reply(&reply(CHAT, prompt, alice())).await.unwrap());
        assert_eq!(board.snapshot().await.unwrap().entries().len(), 1);
        // Only the two /start messages; no error reply.
        assert_eq!(messenger.sent().len(), 2);
    }
}
