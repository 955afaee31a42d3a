use crate::domain::{ChatId, MemberStatus, MessageId, MessageRef, UserProfile};

/// A `/command` sent to a chat the bot is in.
#[derive(Clone, Debug)]
pub struct Command {
    pub message: MessageRef,
    pub from: UserProfile,
    pub name: String,
    /// Bot username after `@` in `/name@bot`, if present.
    pub addressee: Option<String>,
}

impl Command {
    pub fn chat_id(&self) -> ChatId {
        self.message.chat_id
    }

    /// Unaddressed commands are for every bot in the chat; addressed ones only
    /// for the named bot. With an unknown own username only unaddressed
    /// commands match.
    pub fn is_for(&self, bot_username: Option<&str>) -> bool {
        match (self.addressee.as_deref(), bot_username) {
            (None, _) => true,
            (Some(to), Some(me)) => to.eq_ignore_ascii_case(me),
            (Some(_), None) => false,
        }
    }
}

/// A plain (non-command) text message.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub message: MessageRef,
    pub from: Option<UserProfile>,
    /// Message this one replies to, if any.
    pub reply_to: Option<MessageRef>,
}

/// A status transition for one user in one chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipChange {
    pub chat_id: ChatId,
    pub user: UserProfile,
    pub status: MemberStatus,
}

/// The two shapes under which the platform reports membership changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatMemberNotice {
    /// Another member's status changed.
    Member(MembershipChange),
    /// The bot's own status changed.
    OwnMembership(MembershipChange),
}

impl ChatMemberNotice {
    pub fn into_change(self) -> MembershipChange {
        match self {
            ChatMemberNotice::Member(c) | ChatMemberNotice::OwnMembership(c) => c,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<MessageId>,
    pub disable_link_preview: bool,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
            disable_link_preview: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::plain(text)
        }
    }

    pub fn reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn without_link_preview(mut self) -> Self {
        self.disable_link_preview = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn both_notice_shapes_normalize_to_the_change() {
        let change = MembershipChange {
            chat_id: ChatId(-100),
            user: UserProfile {
                id: UserId(1),
                first_name: "A".to_string(),
                last_name: None,
                username: None,
            },
            status: MemberStatus::Left,
        };
        assert_eq!(
            ChatMemberNotice::Member(change.clone()).into_change(),
            change
        );
        assert_eq!(
            ChatMemberNotice::OwnMembership(change.clone()).into_change(),
            change
        );
    }

    fn command(addressee: Option<&str>) -> Command {
        Command {
            message: MessageRef {
                chat_id: ChatId(-100),
                message_id: MessageId(1),
            },
            from: UserProfile {
                id: UserId(1),
                first_name: "A".to_string(),
                last_name: None,
                username: None,
            },
            name: "start".to_string(),
            addressee: addressee.map(str::to_string),
        }
    }

    #[test]
    fn commands_for_other_bots_are_not_ours() {
        assert!(command(None).is_for(Some("tally_bot")));
        assert!(command(Some("Tally_Bot")).is_for(Some("tally_bot")));
        assert!(!command(Some("some_other_bot")).is_for(Some("tally_bot")));
        assert!(command(None).is_for(None));
        assert!(!command(Some("tally_bot")).is_for(None));
    }

    #[test]
    fn outgoing_builder() {
        let m = OutgoingMessage::html("<b>x</b>")
            .reply_to(MessageId(9))
            .without_link_preview();
        assert_eq!(m.format, TextFormat::Html);
        assert_eq!(m.reply_to, Some(MessageId(9)));
        assert!(m.disable_link_preview);
        assert!(!OutgoingMessage::plain("x").disable_link_preview);
    }
}
